use crate::error::MeshResult;
use crate::negotiation::{Coordinator, NegotiationRole, NegotiationState, PeerSession};
use crate::transport::PeerKey;
use pearmo_core::{ConnectionDoc, ConnectionRef, ParticipantId, RoomId, Timestamp};
use tracing::{error, info};

impl Coordinator {
    /// Starts negotiation with `remote` as the offering side and writes the connection
    /// document. A failed attempt is abandoned and not retried.
    pub(crate) async fn create_offer(
        &mut self,
        room: &RoomId,
        remote: ParticipantId,
    ) -> MeshResult<()> {
        if let Some(previous) = self.sessions.remove(&remote) {
            info!("Replacing existing session with {}", remote);
            self.peers_data.remove(&remote);
            previous.close().await;
        }

        let connection = ConnectionRef::allocate(room);
        let transport = self
            .engine
            .create_peer(
                PeerKey::new(remote.clone(), connection.clone()),
                self.transport_tx.clone(),
            )
            .await?;
        let mut session =
            PeerSession::open(remote.clone(), connection, NegotiationRole::Offerer, transport);
        session.transition(NegotiationState::Offering);

        match self.send_offer(&mut session).await {
            Ok(()) => {
                session.transition(NegotiationState::OfferSent);
                self.sessions.insert(remote, session);
                Ok(())
            }
            Err(e) => {
                error!("Offer from {} to {} abandoned: {}", self.participant_id, remote, e);
                session.close().await;
                Err(e)
            }
        }
    }

    async fn send_offer(&self, session: &mut PeerSession) -> MeshResult<()> {
        session
            .transport
            .open_data_channel(&self.config.data_channel_label)
            .await?;
        self.collect_candidates(session).await?;

        let offer = session.transport.create_offer().await?;
        session.transport.set_local_description(offer.clone()).await?;

        let offer_time = Timestamp::now();
        let doc = ConnectionDoc::offer(
            self.participant_id.clone(),
            session.remote.clone(),
            offer,
            offer_time,
        );
        self.store.create_connection(&session.connection, doc).await?;

        info!(
            "Offer {} -> {} written to {} at {}",
            self.participant_id, session.remote, session.connection, offer_time
        );
        Ok(())
    }
}
