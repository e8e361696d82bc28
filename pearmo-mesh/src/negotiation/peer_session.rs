use crate::negotiation::{NegotiationRole, NegotiationState};
use crate::store::Subscription;
use crate::transport::PeerTransport;
use anyhow::Result;
use pearmo_core::{CandidateId, ConnectionRef, IceCandidate, ParticipantId, SessionDescription};
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{debug, warn};

/// Negotiation with one remote participant: the engine handle, the connection document it
/// signals through and the watch on the remote's candidates.
pub(crate) struct PeerSession {
    pub(crate) remote: ParticipantId,
    pub(crate) connection: ConnectionRef,
    pub(crate) role: NegotiationRole,
    pub(crate) state: NegotiationState,
    pub(crate) transport: Arc<dyn PeerTransport>,
    candidate_watch: Option<Subscription>,
    seen_candidates: HashSet<CandidateId>,
    pending_candidates: Vec<IceCandidate>,
    remote_applied: bool,
}

impl PeerSession {
    pub(crate) fn open(
        remote: ParticipantId,
        connection: ConnectionRef,
        role: NegotiationRole,
        transport: Arc<dyn PeerTransport>,
    ) -> Self {
        Self {
            remote,
            connection,
            role,
            state: NegotiationState::Idle,
            transport,
            candidate_watch: None,
            seen_candidates: HashSet::new(),
            pending_candidates: Vec::new(),
            remote_applied: false,
        }
    }

    /// Returns `false` and keeps the current state when the move is not allowed.
    pub(crate) fn transition(&mut self, next: NegotiationState) -> bool {
        if !self.state.can_transition_to(next) {
            warn!(
                "Ignoring negotiation transition {} -> {} with {}",
                self.state, next, self.remote
            );
            return false;
        }
        debug!("Negotiation with {}: {} -> {}", self.remote, self.state, next);
        self.state = next;
        true
    }

    pub(crate) fn attach_candidate_watch(&mut self, watch: Subscription) {
        self.candidate_watch = Some(watch);
    }

    /// `true` the first time a candidate id is seen.
    pub(crate) fn remember(&mut self, id: &CandidateId) -> bool {
        self.seen_candidates.insert(id.clone())
    }

    /// Hands the candidate to the engine, or holds it until the remote description is set.
    pub(crate) async fn add_remote_candidate(&mut self, candidate: IceCandidate) -> Result<()> {
        if !self.remote_applied {
            debug!("Buffering candidate from {} until remote description", self.remote);
            self.pending_candidates.push(candidate);
            return Ok(());
        }
        self.transport.add_ice_candidate(candidate).await
    }

    /// Applies the remote description and flushes buffered candidates. Candidates the engine
    /// rejects are logged and skipped.
    pub(crate) async fn apply_remote_description(
        &mut self,
        desc: SessionDescription,
    ) -> Result<()> {
        self.transport.set_remote_description(desc).await?;
        self.remote_applied = true;

        for candidate in std::mem::take(&mut self.pending_candidates) {
            if let Err(e) = self.transport.add_ice_candidate(candidate).await {
                warn!("Skipping buffered candidate from {}: {}", self.remote, e);
            }
        }
        Ok(())
    }

    /// Releases the candidate watch and closes the engine handle.
    pub(crate) async fn close(mut self) {
        if let Some(watch) = self.candidate_watch.take() {
            watch.unsubscribe();
        }
        self.transition(NegotiationState::Closed);
        if let Err(e) = self.transport.close().await {
            warn!("Failed to close connection with {}: {}", self.remote, e);
        }
    }
}
