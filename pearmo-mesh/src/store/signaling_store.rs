use crate::store::{StoreResult, Subscription};
use async_trait::async_trait;
use pearmo_core::{
    CandidateRef, CandidateSnapshot, ConnectionAnswer, ConnectionDoc, ConnectionRef,
    ConnectionSnapshot, IceCandidate, NewRoom, ParticipantId, RoomDoc, RoomId,
};
use tokio::sync::mpsc;

/// Membership change applied atomically by the store (array union / array remove).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParticipantsUpdate {
    Add(ParticipantId),
    Remove(ParticipantId),
}

/// A document that can be part of a batched delete.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum DocumentRef {
    Room(RoomId),
    Connection(ConnectionRef),
    Candidate(CandidateRef),
}

/// Typed client over the shared document store used as the signaling channel.
///
/// Watches deliver into the supplied channel at-least-once and without ordering across
/// documents. Consumers must treat a redelivered, unchanged document as a no-op.
#[async_trait]
pub trait SignalingStore: Send + Sync {
    /// Persists a new room and returns its store-generated id.
    async fn create_room(&self, data: NewRoom) -> StoreResult<RoomId>;

    async fn get_room(&self, room: &RoomId) -> StoreResult<Option<RoomDoc>>;

    /// Fails with [`StoreError::NotFound`](crate::store::StoreError::NotFound) when the room
    /// does not exist.
    async fn update_room_participants(
        &self,
        room: &RoomId,
        update: ParticipantsUpdate,
    ) -> StoreResult<()>;

    async fn delete_room(&self, room: &RoomId) -> StoreResult<()>;

    /// Writes the full connection document at a previously allocated reference.
    async fn create_connection(
        &self,
        connection: &ConnectionRef,
        data: ConnectionDoc,
    ) -> StoreResult<()>;

    /// Adds the answer to an existing connection document without replacing it.
    async fn update_connection(
        &self,
        connection: &ConnectionRef,
        answer: ConnectionAnswer,
    ) -> StoreResult<()>;

    /// Connection documents in `room` whose `from` is `author`.
    async fn connections_from(
        &self,
        room: &RoomId,
        author: &ParticipantId,
    ) -> StoreResult<Vec<ConnectionSnapshot>>;

    /// Delivers every existing connection of the room, then every addition and modification.
    async fn watch_connections(
        &self,
        room: &RoomId,
        tx: mpsc::UnboundedSender<ConnectionSnapshot>,
    ) -> StoreResult<Subscription>;

    async fn add_candidate(
        &self,
        connection: &ConnectionRef,
        side: &ParticipantId,
        candidate: IceCandidate,
    ) -> StoreResult<CandidateRef>;

    async fn list_candidates(
        &self,
        connection: &ConnectionRef,
        side: &ParticipantId,
    ) -> StoreResult<Vec<CandidateRef>>;

    /// Delivers additions to one side's candidate sub-collection, existing ones included.
    async fn watch_candidates(
        &self,
        connection: &ConnectionRef,
        side: &ParticipantId,
        tx: mpsc::UnboundedSender<CandidateSnapshot>,
    ) -> StoreResult<Subscription>;

    /// Deletes all documents or none.
    async fn batch_delete(&self, refs: Vec<DocumentRef>) -> StoreResult<()>;
}
