use crate::error::MeshError;
use crate::negotiation::{Coordinator, NegotiationState};
use pearmo_core::{ConnectionRef, ParticipantId, SessionDescription, Timestamp};
use tracing::{debug, error, info, warn};

impl Coordinator {
    pub(crate) async fn handle_remote_answer(
        &mut self,
        connection: ConnectionRef,
        to: ParticipantId,
        answer_time: Timestamp,
        answer: SessionDescription,
    ) {
        info!("Answer from {} received on {}", to, connection);
        self.answer_times.insert(to.clone(), answer_time);

        let Some(session) = self.sessions.get_mut(&to) else {
            warn!("Answer from {} has no matching session", to);
            return;
        };
        if session.connection != connection {
            debug!("Answer on stale connection {} ignored", connection);
            return;
        }
        if session.state != NegotiationState::OfferSent {
            warn!("Answer from {} arrived in state {}, ignoring", to, session.state);
            return;
        }

        match session.apply_remote_description(answer).await {
            Ok(()) => {
                session.transition(NegotiationState::Answered);
                info!("Negotiation {} -> {} complete", self.participant_id, to);
            }
            Err(e) => {
                let failure = MeshError::DescriptionApplyFailed {
                    participant: to,
                    reason: e.to_string(),
                };
                error!("{}", failure);
            }
        }
    }
}
