use async_trait::async_trait;
use pearmo_core::{
    CandidateRef, CandidateSnapshot, ConnectionAnswer, ConnectionDoc, ConnectionRef,
    ConnectionSnapshot, IceCandidate, NewRoom, ParticipantId, RoomDoc, RoomId,
};
use pearmo_mesh::store::{DocumentRef, ParticipantsUpdate, StoreResult};
use pearmo_mesh::{MemoryStore, SignalingStore, Subscription};
use tokio::sync::mpsc;

/// Store whose watches deliver every document twice, as an at-least-once backend may.
#[derive(Clone, Default)]
pub struct DuplicatingStore {
    inner: MemoryStore,
}

impl DuplicatingStore {
    pub fn new(inner: MemoryStore) -> Self {
        Self { inner }
    }
}

fn forward_twice<T: Clone + Send + 'static>(
    mut rx: mpsc::UnboundedReceiver<T>,
    tx: mpsc::UnboundedSender<T>,
) {
    tokio::spawn(async move {
        while let Some(item) = rx.recv().await {
            if tx.send(item.clone()).is_err() || tx.send(item).is_err() {
                break;
            }
        }
    });
}

#[async_trait]
impl SignalingStore for DuplicatingStore {
    async fn create_room(&self, data: NewRoom) -> StoreResult<RoomId> {
        self.inner.create_room(data).await
    }

    async fn get_room(&self, room: &RoomId) -> StoreResult<Option<RoomDoc>> {
        self.inner.get_room(room).await
    }

    async fn update_room_participants(
        &self,
        room: &RoomId,
        update: ParticipantsUpdate,
    ) -> StoreResult<()> {
        self.inner.update_room_participants(room, update).await
    }

    async fn delete_room(&self, room: &RoomId) -> StoreResult<()> {
        self.inner.delete_room(room).await
    }

    async fn create_connection(
        &self,
        connection: &ConnectionRef,
        data: ConnectionDoc,
    ) -> StoreResult<()> {
        self.inner.create_connection(connection, data).await
    }

    async fn update_connection(
        &self,
        connection: &ConnectionRef,
        answer: ConnectionAnswer,
    ) -> StoreResult<()> {
        self.inner.update_connection(connection, answer).await
    }

    async fn connections_from(
        &self,
        room: &RoomId,
        author: &ParticipantId,
    ) -> StoreResult<Vec<ConnectionSnapshot>> {
        self.inner.connections_from(room, author).await
    }

    async fn watch_connections(
        &self,
        room: &RoomId,
        tx: mpsc::UnboundedSender<ConnectionSnapshot>,
    ) -> StoreResult<Subscription> {
        let (inner_tx, inner_rx) = mpsc::unbounded_channel();
        let watch = self.inner.watch_connections(room, inner_tx).await?;
        forward_twice(inner_rx, tx);
        Ok(watch)
    }

    async fn add_candidate(
        &self,
        connection: &ConnectionRef,
        side: &ParticipantId,
        candidate: IceCandidate,
    ) -> StoreResult<CandidateRef> {
        self.inner.add_candidate(connection, side, candidate).await
    }

    async fn list_candidates(
        &self,
        connection: &ConnectionRef,
        side: &ParticipantId,
    ) -> StoreResult<Vec<CandidateRef>> {
        self.inner.list_candidates(connection, side).await
    }

    async fn watch_candidates(
        &self,
        connection: &ConnectionRef,
        side: &ParticipantId,
        tx: mpsc::UnboundedSender<CandidateSnapshot>,
    ) -> StoreResult<Subscription> {
        let (inner_tx, inner_rx) = mpsc::unbounded_channel();
        let watch = self.inner.watch_candidates(connection, side, inner_tx).await?;
        forward_twice(inner_rx, tx);
        Ok(watch)
    }

    async fn batch_delete(&self, refs: Vec<DocumentRef>) -> StoreResult<()> {
        self.inner.batch_delete(refs).await
    }
}
