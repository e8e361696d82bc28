use crate::model::connection::ConnectionRef;
use crate::model::participant::ParticipantId;
use crate::model::signaling::IceCandidate;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

#[derive(Debug, Serialize, Deserialize, Clone, Hash, Eq, PartialEq)]
#[serde(transparent)]
pub struct CandidateId(pub String);

impl CandidateId {
    pub fn new() -> Self {
        Self(Uuid::new_v4().simple().to_string())
    }
}

impl Default for CandidateId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for CandidateId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// `rooms/{roomId}/connections/{connectionId}/{side}/{candidateId}`
///
/// `side` is the participant that gathered the candidate.
#[derive(Debug, Clone, Hash, Eq, PartialEq)]
pub struct CandidateRef {
    pub connection: ConnectionRef,
    pub side: ParticipantId,
    pub id: CandidateId,
}

impl fmt::Display for CandidateRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}/{}", self.connection.path(), self.side, self.id)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CandidateSnapshot {
    pub reference: CandidateRef,
    pub candidate: IceCandidate,
}
