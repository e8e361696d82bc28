use crate::negotiation::{Coordinator, PeerSession};
use crate::transport::{PeerKey, TransportEvent};
use pearmo_core::ParticipantId;
use tracing::{debug, info};

impl Coordinator {
    pub(crate) async fn handle_transport_event(&mut self, event: TransportEvent) {
        match event {
            TransportEvent::CandidateGenerated(key, candidate) => {
                self.handle_local_candidate(key, candidate).await;
            }

            TransportEvent::DataChannelOpen(key) => {
                let Some(session) = self.live_session(&key) else {
                    debug!("Data channel of {} opened without live session", key);
                    return;
                };
                info!("Participant {} reachable over data channel", key.remote);
                let transport = session.transport.clone();
                self.peers_data.insert(key.remote.clone(), transport);

                let ctx = self.context();
                self.behavior.on_join(&ctx, key.remote).await;
            }

            TransportEvent::Message(key, data) => {
                if self.live_session(&key).is_none() {
                    debug!("Dropping message from replaced transport {}", key);
                    return;
                }
                let ctx = self.context();
                self.behavior.on_message(&ctx, key.remote, data).await;
            }

            TransportEvent::DataChannelClosed(key) | TransportEvent::Disconnected(key) => {
                if self.live_session(&key).is_none() {
                    debug!("Ignoring shutdown of replaced transport {}", key);
                    return;
                }
                self.remove_peer_with_notify(&key.remote).await;
            }
        }
    }

    /// The session `key` belongs to, unless it has been replaced or closed since.
    pub(crate) fn live_session(&self, key: &PeerKey) -> Option<&PeerSession> {
        self.sessions
            .get(&key.remote)
            .filter(|session| session.connection == key.connection)
    }

    /// Notifies the behavior once for a participant that had an open data channel.
    pub(crate) async fn remove_peer_with_notify(&mut self, remote: &ParticipantId) {
        if self.peers_data.remove(remote).is_some() {
            info!("Participant {} left", remote);
            let ctx = self.context();
            self.behavior.on_leave(&ctx, remote.clone()).await;
        }
    }
}
