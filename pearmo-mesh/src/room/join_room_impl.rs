use crate::error::{MeshError, MeshResult};
use crate::negotiation::{ActiveRoom, Coordinator};
use crate::room::JoinReport;
use crate::store::{ParticipantsUpdate, StoreError};
use pearmo_core::{ParticipantId, RoomDoc, RoomId};
use tracing::{error, info, warn};

impl Coordinator {
    /// Adds this participant to an existing room and offers to every participant already in
    /// it. Existing participants never offer to the newcomer.
    pub(crate) async fn join_room(&mut self, room: RoomId) -> MeshResult<JoinReport> {
        if let Some(active) = &self.room {
            return Err(MeshError::AlreadyInRoom(active.id.clone()));
        }

        let Some(doc) = self.store.get_room(&room).await? else {
            return Err(MeshError::RoomNotFound(room));
        };
        let participant_id = self.resolve_participant_id(&doc)?;

        match self
            .store
            .update_room_participants(&room, ParticipantsUpdate::Add(participant_id.clone()))
            .await
        {
            Ok(()) => {}
            Err(StoreError::NotFound(_)) => return Err(MeshError::RoomNotFound(room)),
            Err(e) => return Err(e.into()),
        }

        let watch = match self.subscribe_negotiator(&room).await {
            Ok(watch) => watch,
            Err(e) => {
                let leave = ParticipantsUpdate::Remove(participant_id);
                if let Err(cleanup) = self.store.update_room_participants(&room, leave).await {
                    warn!("Failed to leave unwatched room {}: {}", room, cleanup);
                }
                return Err(e);
            }
        };

        self.participant_id = participant_id;
        self.room = Some(ActiveRoom {
            id: room.clone(),
            connection_watch: Some(watch),
        });
        info!("{} joined room {}", self.participant_id, room);

        let others: Vec<ParticipantId> = doc.others(&self.participant_id).cloned().collect();
        let mut report = JoinReport {
            room: room.clone(),
            participant_id: self.participant_id.clone(),
            offered: Vec::with_capacity(others.len()),
            failed: Vec::new(),
        };

        for remote in others {
            match self.create_offer(&room, remote.clone()).await {
                Ok(()) => report.offered.push(remote),
                Err(e) => {
                    error!("Offer to {} in room {} failed: {}", remote, room, e);
                    report.failed.push(remote);
                }
            }
        }

        Ok(report)
    }

    /// The id to join `doc` with: the current one, or a regenerated one if it collides with a
    /// member. The current id is left untouched.
    fn resolve_participant_id(&self, doc: &RoomDoc) -> MeshResult<ParticipantId> {
        let mut candidate = self.participant_id.clone();
        let mut attempts = 0;

        while doc.contains(&candidate) {
            if attempts >= self.config.max_id_retries {
                return Err(MeshError::IdentifierExhausted { attempts });
            }
            let next = (self.id_generator)();
            warn!("Participant id {} already taken, retrying as {}", candidate, next);
            candidate = next;
            attempts += 1;
        }

        Ok(candidate)
    }
}
