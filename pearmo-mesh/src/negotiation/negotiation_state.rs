use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NegotiationRole {
    Offerer,
    Answerer,
}

/// Progress of the offer/answer exchange with one remote participant.
///
/// ```text
/// Idle -> Offering -> OfferSent -> Answered     (offering side)
/// Idle -> Answering -> AnswerSent               (answering side)
/// ```
///
/// Any state may move to `Closed` on teardown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NegotiationState {
    Idle,
    Offering,
    OfferSent,
    Answered,
    Answering,
    AnswerSent,
    Closed,
}

impl NegotiationState {
    pub fn can_transition_to(self, next: NegotiationState) -> bool {
        use NegotiationState::*;

        match (self, next) {
            (Closed, _) => false,
            (_, Closed) => true,
            (Idle, Offering) | (Offering, OfferSent) | (OfferSent, Answered) => true,
            (Idle, Answering) | (Answering, AnswerSent) => true,
            _ => false,
        }
    }

    /// Negotiation with the remote is over, successfully or not.
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            NegotiationState::Answered | NegotiationState::AnswerSent | NegotiationState::Closed
        )
    }
}

impl fmt::Display for NegotiationState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            NegotiationState::Idle => "idle",
            NegotiationState::Offering => "offering",
            NegotiationState::OfferSent => "offer-sent",
            NegotiationState::Answered => "answered",
            NegotiationState::Answering => "answering",
            NegotiationState::AnswerSent => "answer-sent",
            NegotiationState::Closed => "closed",
        };
        f.write_str(name)
    }
}
