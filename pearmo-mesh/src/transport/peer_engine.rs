use crate::transport::{PeerKey, TransportEvent};
use anyhow::Result;
use async_trait::async_trait;
use bytes::Bytes;
use pearmo_core::{IceCandidate, ParticipantId, SessionDescription};
use std::sync::Arc;
use tokio::sync::mpsc;

/// Creates one peer transport per remote participant.
#[async_trait]
pub trait PeerEngine: Send + Sync {
    /// The transport reports locally gathered candidates, data channel lifecycle and
    /// connection loss through `events`, each tagged with `key`.
    async fn create_peer(
        &self,
        key: PeerKey,
        events: mpsc::Sender<TransportEvent>,
    ) -> Result<Arc<dyn PeerTransport>>;
}

/// A single peer connection with at most one data channel.
///
/// Candidates passed to [`PeerTransport::add_ice_candidate`] must only arrive after the remote
/// description is set; callers buffer the early ones.
#[async_trait]
pub trait PeerTransport: Send + Sync {
    fn remote(&self) -> &ParticipantId;

    /// Opens the data channel from this side. The answering side never calls this and instead
    /// captures the channel announced by the remote.
    async fn open_data_channel(&self, label: &str) -> Result<()>;

    async fn create_offer(&self) -> Result<SessionDescription>;

    async fn create_answer(&self) -> Result<SessionDescription>;

    async fn set_local_description(&self, desc: SessionDescription) -> Result<()>;

    async fn set_remote_description(&self, desc: SessionDescription) -> Result<()>;

    async fn add_ice_candidate(&self, candidate: IceCandidate) -> Result<()>;

    /// Fails when the data channel is not open.
    async fn send(&self, data: Bytes) -> Result<()>;

    async fn close(&self) -> Result<()>;
}
