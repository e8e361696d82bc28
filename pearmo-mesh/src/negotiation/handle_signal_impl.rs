use crate::negotiation::Coordinator;
use pearmo_core::ConnectionSnapshot;
use tracing::debug;

impl Coordinator {
    /// Routes a connection document delivered by the room watch. An offer or answer is applied
    /// only when its time is newer than the last one applied for that participant, so
    /// redelivered and late stale documents are dropped here.
    pub(crate) async fn handle_signal(&mut self, snapshot: ConnectionSnapshot) {
        let Some(active) = &self.room else {
            debug!("Dropping {} delivered outside a room", snapshot.reference);
            return;
        };
        if snapshot.reference.room != active.id {
            debug!("Dropping {} from a previous room", snapshot.reference);
            return;
        }

        let ConnectionSnapshot { reference, doc } = snapshot;

        if doc.from == self.participant_id {
            let Some((answer_time, answer)) = doc.answered() else {
                return;
            };
            if self.answer_times.get(&doc.to).is_some_and(|last| answer_time <= *last) {
                debug!("Answer from {} at {} is not newer, dropping", doc.to, answer_time);
                return;
            }
            let answer = answer.clone();
            self.handle_remote_answer(reference, doc.to, answer_time, answer).await;
        } else if doc.to == self.participant_id {
            let Some((offer_time, offer)) = doc.pending_offer() else {
                return;
            };
            if self.offer_times.get(&doc.from).is_some_and(|last| offer_time <= *last) {
                debug!("Offer from {} at {} is not newer, dropping", doc.from, offer_time);
                return;
            }
            let offer = offer.clone();
            self.handle_remote_offer(reference, doc.from, offer_time, offer).await;
        }
    }
}
