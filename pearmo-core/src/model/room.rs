use crate::model::participant::ParticipantId;
use crate::model::timestamp::Timestamp;
use crate::utils::ROOMS_COLLECTION;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Store-generated room identifier, shared out of band so others can join.
#[derive(Debug, Serialize, Deserialize, Clone, Hash, Eq, PartialEq)]
#[serde(transparent)]
pub struct RoomId(pub String);

impl RoomId {
    pub fn new() -> Self {
        Self(Uuid::new_v4().simple().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn path(&self) -> String {
        format!("{}/{}", ROOMS_COLLECTION, self.0)
    }
}

impl Default for RoomId {
    fn default() -> Self {
        Self::new()
    }
}

impl From<&str> for RoomId {
    fn from(s: &str) -> Self {
        Self(s.to_owned())
    }
}

impl From<String> for RoomId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl fmt::Display for RoomId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// `rooms/{roomId}`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoomDoc {
    /// Join order, no duplicates.
    pub participants: Vec<ParticipantId>,
    pub created: Timestamp,
}

impl RoomDoc {
    pub fn contains(&self, participant: &ParticipantId) -> bool {
        self.participants.contains(participant)
    }

    /// Everyone in the room except `participant`, in join order.
    pub fn others<'a>(
        &'a self,
        participant: &'a ParticipantId,
    ) -> impl Iterator<Item = &'a ParticipantId> + 'a {
        self.participants.iter().filter(move |p| *p != participant)
    }
}

/// Data supplied when creating a room; `created` is assigned by the store.
#[derive(Debug, Clone)]
pub struct NewRoom {
    pub participants: Vec<ParticipantId>,
}
