use pearmo_core::{ParticipantId, RoomId};

/// Outcome of a successful join. Offers are attempted independently, so some may fail
/// without failing the join.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JoinReport {
    pub room: RoomId,
    /// Identifier used in the room, regenerated if the original one collided.
    pub participant_id: ParticipantId,
    pub offered: Vec<ParticipantId>,
    pub failed: Vec<ParticipantId>,
}
