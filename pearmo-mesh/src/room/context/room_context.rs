use crate::transport::PeerTransport;
use bytes::Bytes;
use dashmap::DashMap;
use pearmo_core::ParticipantId;
use std::sync::Arc;
use tracing::error;

/// Access to the participants whose data channel is currently open.
/// Cheap to clone and safe to move across tasks.
#[derive(Clone)]
pub struct RoomContext {
    peers: Arc<DashMap<ParticipantId, Arc<dyn PeerTransport>>>,
}

impl RoomContext {
    pub(crate) fn new(peers: Arc<DashMap<ParticipantId, Arc<dyn PeerTransport>>>) -> Self {
        Self { peers }
    }

    /// Sends `data` over the data channel shared with `participant`.
    pub async fn send(&self, participant: &ParticipantId, data: Bytes) {
        let Some(transport) = self.peers.get(participant).map(|entry| entry.value().clone())
        else {
            error!(
                "Attempted to send message to disconnected participant {}",
                participant
            );
            return;
        };

        if let Err(e) = transport.send(data).await {
            error!("Failed to send message to {}: {}", participant, e);
        }
    }

    /// Sends `data` to every connected participant.
    pub async fn broadcast(&self, data: Bytes) {
        // Collected first so no map guard is held across an await.
        let transports: Vec<Arc<dyn PeerTransport>> =
            self.peers.iter().map(|entry| entry.value().clone()).collect();

        for transport in transports {
            let data = data.clone();
            tokio::spawn(async move {
                if let Err(e) = transport.send(data).await {
                    error!("Broadcast to {} failed: {}", transport.remote(), e);
                }
            });
        }
    }

    pub fn list_participants(&self) -> Vec<ParticipantId> {
        let mut participants: Vec<ParticipantId> =
            self.peers.iter().map(|entry| entry.key().clone()).collect();
        participants.sort();
        participants
    }

    pub fn contains_participant(&self, participant: &ParticipantId) -> bool {
        self.peers.contains_key(participant)
    }
}
