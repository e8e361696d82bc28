use bytes::Bytes;
use pearmo_core::{ConnectionRef, IceCandidate, ParticipantId};
use std::fmt;

/// Names one peer transport: the remote participant and the connection document it is
/// negotiated over. A replacement transport for the same remote gets a new key.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PeerKey {
    pub remote: ParticipantId,
    pub connection: ConnectionRef,
}

impl PeerKey {
    pub fn new(remote: ParticipantId, connection: ConnectionRef) -> Self {
        Self { remote, connection }
    }
}

impl fmt::Display for PeerKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.remote, self.connection.id)
    }
}

/// Emitted by a peer transport into the coordinator loop, tagged with the key the transport
/// was created for.
#[derive(Debug, Clone)]
pub enum TransportEvent {
    CandidateGenerated(PeerKey, IceCandidate),
    DataChannelOpen(PeerKey),
    Message(PeerKey, Bytes),
    DataChannelClosed(PeerKey),
    Disconnected(PeerKey),
}
