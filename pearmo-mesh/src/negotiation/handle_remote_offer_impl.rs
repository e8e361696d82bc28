use crate::error::{MeshError, MeshResult};
use crate::negotiation::{Coordinator, NegotiationRole, NegotiationState, PeerSession};
use crate::transport::PeerKey;
use pearmo_core::{ConnectionAnswer, ConnectionRef, ParticipantId, SessionDescription, Timestamp};
use tracing::{error, info};

impl Coordinator {
    /// Answers an offer addressed to this participant and adds the answer to the existing
    /// connection document.
    pub(crate) async fn handle_remote_offer(
        &mut self,
        connection: ConnectionRef,
        from: ParticipantId,
        offer_time: Timestamp,
        offer: SessionDescription,
    ) {
        info!("Offer from {} received on {}", from, connection);
        self.offer_times.insert(from.clone(), offer_time);

        if let Some(previous) = self.sessions.remove(&from) {
            info!("Replacing existing session with {}", from);
            self.peers_data.remove(&from);
            previous.close().await;
        }

        let transport = match self
            .engine
            .create_peer(
                PeerKey::new(from.clone(), connection.clone()),
                self.transport_tx.clone(),
            )
            .await
        {
            Ok(transport) => transport,
            Err(e) => {
                error!("Failed to create peer connection for {}: {}", from, e);
                return;
            }
        };

        let mut session =
            PeerSession::open(from.clone(), connection, NegotiationRole::Answerer, transport);
        session.transition(NegotiationState::Answering);

        match self.send_answer(&mut session, offer).await {
            Ok(()) => {
                session.transition(NegotiationState::AnswerSent);
                self.sessions.insert(from, session);
            }
            Err(e) => {
                error!("Answer from {} to {} abandoned: {}", self.participant_id, from, e);
                session.close().await;
            }
        }
    }

    async fn send_answer(
        &self,
        session: &mut PeerSession,
        offer: SessionDescription,
    ) -> MeshResult<()> {
        self.collect_candidates(session).await?;

        session
            .apply_remote_description(offer)
            .await
            .map_err(|e| MeshError::DescriptionApplyFailed {
                participant: session.remote.clone(),
                reason: e.to_string(),
            })?;

        let answer = session.transport.create_answer().await?;
        session.transport.set_local_description(answer.clone()).await?;

        let answer_time = Timestamp::now();
        self.store
            .update_connection(
                &session.connection,
                ConnectionAnswer {
                    answer_time,
                    answer,
                },
            )
            .await?;

        info!(
            "Answer {} -> {} written to {} at {}",
            self.participant_id, session.remote, session.connection, answer_time
        );
        Ok(())
    }
}
