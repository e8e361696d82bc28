use crate::error::{MeshError, MeshResult};
use crate::negotiation::{ActiveRoom, Coordinator};
use crate::store::Subscription;
use pearmo_core::{NewRoom, RoomId};
use tracing::{info, warn};

impl Coordinator {
    /// Creates a room with this participant as its only member and starts watching it for
    /// incoming offers.
    pub(crate) async fn create_room(&mut self) -> MeshResult<RoomId> {
        if let Some(active) = &self.room {
            return Err(MeshError::AlreadyInRoom(active.id.clone()));
        }

        let room = self
            .store
            .create_room(NewRoom {
                participants: vec![self.participant_id.clone()],
            })
            .await?;

        let watch = match self.subscribe_negotiator(&room).await {
            Ok(watch) => watch,
            Err(e) => {
                if let Err(cleanup) = self.store.delete_room(&room).await {
                    warn!("Failed to remove unwatched room {}: {}", room, cleanup);
                }
                return Err(e);
            }
        };

        self.room = Some(ActiveRoom {
            id: room.clone(),
            connection_watch: Some(watch),
        });
        info!("Room {} created by {}", room, self.participant_id);
        Ok(room)
    }

    /// Feeds every connection document of `room` into the coordinator loop.
    pub(crate) async fn subscribe_negotiator(&self, room: &RoomId) -> MeshResult<Subscription> {
        let watch = self
            .store
            .watch_connections(room, self.connection_tx.clone())
            .await?;
        Ok(watch)
    }
}
