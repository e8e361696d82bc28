use crate::store::StoreError;
use pearmo_core::{ParticipantId, RoomId};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum MeshError {
    #[error("Room not found: {0}")]
    RoomNotFound(RoomId),

    #[error("No free participant id after {attempts} attempts")]
    IdentifierExhausted { attempts: u32 },

    #[error("Signaling store failed: {0}")]
    StoreUnavailable(StoreError),

    /// A document the operation relies on was deleted, typically by a participant leaving.
    #[error("Signaling document missing: {0}")]
    DocumentMissing(String),

    #[error("Failed to apply session description for {participant}: {reason}")]
    DescriptionApplyFailed {
        participant: ParticipantId,
        reason: String,
    },

    #[error("Failed to ingest ICE candidate from {participant}: {reason}")]
    CandidateIngestFailed {
        participant: ParticipantId,
        reason: String,
    },

    #[error("Peer engine error: {0}")]
    Engine(#[from] anyhow::Error),

    #[error("Already in room {0}")]
    AlreadyInRoom(RoomId),

    #[error("Coordinator is no longer running")]
    CoordinatorClosed,
}

impl From<StoreError> for MeshError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::NotFound(path) => MeshError::DocumentMissing(path),
            unavailable => MeshError::StoreUnavailable(unavailable),
        }
    }
}

pub type MeshResult<T> = std::result::Result<T, MeshError>;
