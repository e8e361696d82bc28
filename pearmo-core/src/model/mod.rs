mod candidate;
mod connection;
mod participant;
mod room;
mod signaling;
mod timestamp;

pub use candidate::{CandidateId, CandidateRef, CandidateSnapshot};
pub use connection::{ConnectionAnswer, ConnectionDoc, ConnectionId, ConnectionRef, ConnectionSnapshot};
pub use participant::ParticipantId;
pub use room::{NewRoom, RoomDoc, RoomId};
pub use signaling::{IceCandidate, IceServerConfig, SdpType, SessionDescription};
pub use timestamp::Timestamp;
