use crate::room::context::RoomContext;
use async_trait::async_trait;
use bytes::Bytes;
use pearmo_core::ParticipantId;
use tracing::info;

/// Application hooks driven by data channel lifecycle.
#[async_trait]
pub trait RoomBehavior: Send + Sync + 'static {
    /// The data channel with `participant` is open.
    async fn on_join(&self, ctx: &RoomContext, participant: ParticipantId);

    async fn on_message(&self, ctx: &RoomContext, participant: ParticipantId, data: Bytes);

    /// Called once per joined participant, when its channel closes or on hang-up.
    async fn on_leave(&self, ctx: &RoomContext, participant: ParticipantId);
}

/// Logs every event and does nothing else.
#[derive(Debug, Clone, Copy, Default)]
pub struct LoggingBehavior;

#[async_trait]
impl RoomBehavior for LoggingBehavior {
    async fn on_join(&self, _ctx: &RoomContext, participant: ParticipantId) {
        info!("Participant {} connected", participant);
    }

    async fn on_message(&self, _ctx: &RoomContext, participant: ParticipantId, data: Bytes) {
        match std::str::from_utf8(&data) {
            Ok(text) => info!("Message from {}: {}", participant, text),
            Err(_) => info!("Message from {}: {} bytes", participant, data.len()),
        }
    }

    async fn on_leave(&self, _ctx: &RoomContext, participant: ParticipantId) {
        info!("Participant {} disconnected", participant);
    }
}
