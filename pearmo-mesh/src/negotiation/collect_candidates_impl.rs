use crate::error::{MeshError, MeshResult};
use crate::negotiation::{Coordinator, NegotiationState, PeerSession};
use crate::transport::PeerKey;
use pearmo_core::{CandidateSnapshot, IceCandidate};
use tracing::{debug, error, warn};

impl Coordinator {
    /// Watches the remote side's candidate collection of the session's connection.
    /// Local candidates reach the store through [`Coordinator::handle_local_candidate`].
    pub(crate) async fn collect_candidates(&self, session: &mut PeerSession) -> MeshResult<()> {
        let watch = self
            .store
            .watch_candidates(
                &session.connection,
                &session.remote,
                self.candidate_tx.clone(),
            )
            .await?;
        session.attach_candidate_watch(watch);
        Ok(())
    }

    /// Writes a locally gathered candidate to this participant's side of the connection.
    pub(crate) async fn handle_local_candidate(&self, key: PeerKey, candidate: IceCandidate) {
        let Some(session) = self.live_session(&key) else {
            debug!("Dropping local candidate of {}: no live session", key);
            return;
        };
        if session.state == NegotiationState::Closed {
            return;
        }

        match self
            .store
            .add_candidate(&session.connection, &self.participant_id, candidate)
            .await
        {
            Ok(reference) => debug!("Local candidate for {} stored at {}", key.remote, reference),
            Err(e) => error!("Failed to store local candidate for {}: {}", key.remote, e),
        }
    }

    /// Hands a candidate added by the remote side to the session's engine, at most once per
    /// candidate document.
    pub(crate) async fn handle_remote_candidate(&mut self, snapshot: CandidateSnapshot) {
        let CandidateSnapshot {
            reference,
            candidate,
        } = snapshot;

        let Some(session) = self.sessions.get_mut(&reference.side) else {
            debug!("Dropping candidate {}: no session", reference);
            return;
        };
        if session.connection != reference.connection {
            debug!("Dropping candidate {} of a replaced session", reference);
            return;
        }
        if !session.remember(&reference.id) {
            debug!("Candidate {} already ingested", reference);
            return;
        }

        if let Err(e) = session.add_remote_candidate(candidate).await {
            let failure = MeshError::CandidateIngestFailed {
                participant: reference.side,
                reason: e.to_string(),
            };
            warn!("{}", failure);
        }
    }
}
