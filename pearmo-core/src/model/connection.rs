use crate::model::participant::ParticipantId;
use crate::model::room::RoomId;
use crate::model::signaling::SessionDescription;
use crate::model::timestamp::Timestamp;
use crate::utils::CONNECTIONS_COLLECTION;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

#[derive(Debug, Serialize, Deserialize, Clone, Hash, Eq, PartialEq)]
#[serde(transparent)]
pub struct ConnectionId(pub String);

impl ConnectionId {
    pub fn new() -> Self {
        Self(Uuid::new_v4().simple().to_string())
    }
}

impl Default for ConnectionId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Location of a connection document. May be allocated before the document is written so that
/// candidates can be collected against it while the offer is still being produced.
#[derive(Debug, Clone, Hash, Eq, PartialEq)]
pub struct ConnectionRef {
    pub room: RoomId,
    pub id: ConnectionId,
}

impl ConnectionRef {
    pub fn allocate(room: &RoomId) -> Self {
        Self {
            room: room.clone(),
            id: ConnectionId::new(),
        }
    }

    pub fn path(&self) -> String {
        format!("{}/{}/{}", self.room.path(), CONNECTIONS_COLLECTION, self.id)
    }
}

impl fmt::Display for ConnectionRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.path())
    }
}

/// `rooms/{roomId}/connections/{connectionId}`
///
/// Written whole by the offering side, then updated exactly once by the answering side.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectionDoc {
    pub from: ParticipantId,
    pub to: ParticipantId,
    pub offer_time: Option<Timestamp>,
    pub offer: Option<SessionDescription>,
    pub answer_time: Option<Timestamp>,
    pub answer: Option<SessionDescription>,
}

impl ConnectionDoc {
    pub fn offer(
        from: ParticipantId,
        to: ParticipantId,
        offer: SessionDescription,
        offer_time: Timestamp,
    ) -> Self {
        Self {
            from,
            to,
            offer_time: Some(offer_time),
            offer: Some(offer),
            answer_time: None,
            answer: None,
        }
    }

    pub fn pending_offer(&self) -> Option<(Timestamp, &SessionDescription)> {
        match (self.offer_time, &self.offer) {
            (Some(time), Some(offer)) => Some((time, offer)),
            _ => None,
        }
    }

    /// The answer, only when both `answer` and `answerTime` are set.
    pub fn answered(&self) -> Option<(Timestamp, &SessionDescription)> {
        match (self.answer_time, &self.answer) {
            (Some(time), Some(answer)) => Some((time, answer)),
            _ => None,
        }
    }

    pub fn apply_answer(&mut self, answer: ConnectionAnswer) {
        self.answer_time = Some(answer.answer_time);
        self.answer = Some(answer.answer);
    }
}

/// The answering side's single update. Both fields travel together.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectionAnswer {
    pub answer_time: Timestamp,
    pub answer: SessionDescription,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ConnectionSnapshot {
    pub reference: ConnectionRef,
    pub doc: ConnectionDoc,
}
