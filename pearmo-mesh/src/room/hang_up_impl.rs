use crate::error::{MeshError, MeshResult};
use crate::negotiation::Coordinator;
use crate::store::{DocumentRef, ParticipantsUpdate};
use futures::future::join_all;
use pearmo_core::{ConnectionRef, ParticipantId, RoomId};
use tracing::{debug, error, info, warn};

impl Coordinator {
    /// Leaves the current room. Local teardown always completes; the returned error, if any,
    /// is the first store failure met while cleaning up.
    pub(crate) async fn hang_up(&mut self) -> MeshResult<()> {
        let Some(active) = self.room.take() else {
            debug!("{} is not in a room, nothing to hang up", self.participant_id);
            return Ok(());
        };

        if let Some(watch) = active.connection_watch {
            watch.unsubscribe();
        }
        self.close_sessions().await;
        self.offer_times.clear();
        self.answer_times.clear();

        let cleanup = self.clean_up_store(&active.id).await;
        let prune = self.prune_room(&active.id).await;
        info!("{} left room {}", self.participant_id, active.id);

        cleanup.and(prune)
    }

    async fn close_sessions(&mut self) {
        let sessions: Vec<_> = self.sessions.drain().collect();
        for (remote, session) in sessions {
            session.close().await;
            self.remove_peer_with_notify(&remote).await;
        }
        self.peers_data.clear();
    }

    /// Deletes every connection this participant authored, with both candidate collections,
    /// one batch per connection.
    async fn clean_up_store(&self, room: &RoomId) -> MeshResult<()> {
        let connections = match self.store.connections_from(room, &self.participant_id).await {
            Ok(connections) => connections,
            Err(e) => {
                error!(
                    "Failed to list connections of {} in {}: {}",
                    self.participant_id, room, e
                );
                return Err(e.into());
            }
        };

        let batches = connections
            .into_iter()
            .map(|snapshot| self.delete_connection(snapshot.reference, snapshot.doc.to));
        join_all(batches).await;
        Ok(())
    }

    async fn delete_connection(&self, connection: ConnectionRef, to: ParticipantId) {
        let mut refs = Vec::new();
        for side in [&self.participant_id, &to] {
            match self.store.list_candidates(&connection, side).await {
                Ok(candidates) => refs.extend(candidates.into_iter().map(DocumentRef::Candidate)),
                Err(e) => warn!("Failed to list candidates of {} on {}: {}", side, connection, e),
            }
        }
        refs.push(DocumentRef::Connection(connection.clone()));

        match self.store.batch_delete(refs).await {
            Ok(()) => debug!("Deleted {}", connection),
            Err(e) => warn!("Failed to delete {}: {}", connection, e),
        }
    }

    /// Removes this participant from the room, or deletes the room once it is small enough.
    async fn prune_room(&self, room: &RoomId) -> MeshResult<()> {
        let result = match self.store.get_room(room).await {
            Ok(Some(doc)) if doc.participants.len() > self.config.delete_threshold => {
                let leave = ParticipantsUpdate::Remove(self.participant_id.clone());
                self.store.update_room_participants(room, leave).await
            }
            Ok(Some(_)) => {
                info!("Deleting room {}", room);
                self.store.delete_room(room).await
            }
            Ok(None) => Ok(()),
            Err(e) => Err(e),
        };

        if let Err(e) = &result {
            error!("Failed to prune room {}: {}", room, e);
        }
        result.map_err(MeshError::from)
    }
}
