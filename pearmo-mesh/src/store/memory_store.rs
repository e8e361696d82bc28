use crate::store::{
    DocumentRef, ParticipantsUpdate, SignalingStore, StoreError, StoreResult, Subscription,
};
use async_trait::async_trait;
use dashmap::DashMap;
use pearmo_core::{
    CandidateId, CandidateRef, CandidateSnapshot, ConnectionAnswer, ConnectionDoc,
    ConnectionRef, ConnectionSnapshot, IceCandidate, NewRoom, ParticipantId, RoomDoc, RoomId,
    Timestamp,
};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Weak};
use tokio::sync::mpsc;
use tracing::{debug, info};

type CandidateKey = (ConnectionRef, ParticipantId);

struct ConnectionWatcher {
    room: RoomId,
    tx: mpsc::UnboundedSender<ConnectionSnapshot>,
}

struct CandidateWatcher {
    key: CandidateKey,
    tx: mpsc::UnboundedSender<CandidateSnapshot>,
}

struct MemoryInner {
    available: AtomicBool,
    rooms: DashMap<RoomId, RoomDoc>,
    connections: DashMap<ConnectionRef, ConnectionDoc>,
    candidates: DashMap<CandidateKey, Vec<(CandidateId, IceCandidate)>>,
    connection_watchers: DashMap<u64, ConnectionWatcher>,
    candidate_watchers: DashMap<u64, CandidateWatcher>,
    next_watcher: AtomicU64,
}

/// In-process [`SignalingStore`]. Every clone shares the same documents, so several
/// coordinators in one process can signal each other through it.
#[derive(Clone)]
pub struct MemoryStore {
    inner: Arc<MemoryInner>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(MemoryInner {
                available: AtomicBool::new(true),
                rooms: DashMap::new(),
                connections: DashMap::new(),
                candidates: DashMap::new(),
                connection_watchers: DashMap::new(),
                candidate_watchers: DashMap::new(),
                next_watcher: AtomicU64::new(1),
            }),
        }
    }

    /// While unavailable, every operation fails with [`StoreError::Unavailable`].
    pub fn set_available(&self, available: bool) {
        self.inner.available.store(available, Ordering::SeqCst);
    }

    /// All connection documents of a room.
    pub fn connections(&self, room: &RoomId) -> Vec<ConnectionSnapshot> {
        self.inner
            .connections
            .iter()
            .filter(|entry| &entry.key().room == room)
            .map(|entry| ConnectionSnapshot {
                reference: entry.key().clone(),
                doc: entry.value().clone(),
            })
            .collect()
    }

    pub fn candidates(
        &self,
        connection: &ConnectionRef,
        side: &ParticipantId,
    ) -> Vec<CandidateSnapshot> {
        let key = (connection.clone(), side.clone());
        self.inner
            .candidates
            .get(&key)
            .map(|entries| {
                entries
                    .iter()
                    .map(|(id, candidate)| CandidateSnapshot {
                        reference: CandidateRef {
                            connection: connection.clone(),
                            side: side.clone(),
                            id: id.clone(),
                        },
                        candidate: candidate.clone(),
                    })
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Number of live watches, connection and candidate ones together.
    pub fn watcher_count(&self) -> usize {
        self.inner.connection_watchers.len() + self.inner.candidate_watchers.len()
    }

    fn ensure_available(&self) -> StoreResult<()> {
        if self.inner.available.load(Ordering::SeqCst) {
            Ok(())
        } else {
            Err(StoreError::Unavailable("memory store switched off".to_owned()))
        }
    }

    fn next_watcher_id(&self) -> u64 {
        self.inner.next_watcher.fetch_add(1, Ordering::Relaxed)
    }

    fn notify_connection(&self, snapshot: &ConnectionSnapshot) {
        let targets: Vec<(u64, mpsc::UnboundedSender<ConnectionSnapshot>)> = self
            .inner
            .connection_watchers
            .iter()
            .filter(|entry| entry.value().room == snapshot.reference.room)
            .map(|entry| (*entry.key(), entry.value().tx.clone()))
            .collect();

        for (id, tx) in targets {
            if tx.send(snapshot.clone()).is_err() {
                self.inner.connection_watchers.remove(&id);
            }
        }
    }

    fn notify_candidate(&self, snapshot: &CandidateSnapshot) {
        let key = (
            snapshot.reference.connection.clone(),
            snapshot.reference.side.clone(),
        );
        let targets: Vec<(u64, mpsc::UnboundedSender<CandidateSnapshot>)> = self
            .inner
            .candidate_watchers
            .iter()
            .filter(|entry| entry.value().key == key)
            .map(|entry| (*entry.key(), entry.value().tx.clone()))
            .collect();

        for (id, tx) in targets {
            if tx.send(snapshot.clone()).is_err() {
                self.inner.candidate_watchers.remove(&id);
            }
        }
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SignalingStore for MemoryStore {
    async fn create_room(&self, data: NewRoom) -> StoreResult<RoomId> {
        self.ensure_available()?;

        let mut participants: Vec<ParticipantId> = Vec::with_capacity(data.participants.len());
        for participant in data.participants {
            if !participants.contains(&participant) {
                participants.push(participant);
            }
        }

        let room_id = RoomId::new();
        self.inner.rooms.insert(
            room_id.clone(),
            RoomDoc {
                participants,
                created: Timestamp::now(),
            },
        );
        info!("Stored room {}", room_id.path());
        Ok(room_id)
    }

    async fn get_room(&self, room: &RoomId) -> StoreResult<Option<RoomDoc>> {
        self.ensure_available()?;
        Ok(self.inner.rooms.get(room).map(|doc| doc.clone()))
    }

    async fn update_room_participants(
        &self,
        room: &RoomId,
        update: ParticipantsUpdate,
    ) -> StoreResult<()> {
        self.ensure_available()?;

        let mut doc = self
            .inner
            .rooms
            .get_mut(room)
            .ok_or_else(|| StoreError::NotFound(room.path()))?;

        match update {
            ParticipantsUpdate::Add(participant) => {
                if !doc.participants.contains(&participant) {
                    doc.participants.push(participant);
                }
            }
            ParticipantsUpdate::Remove(participant) => {
                doc.participants.retain(|p| p != &participant);
            }
        }
        Ok(())
    }

    async fn delete_room(&self, room: &RoomId) -> StoreResult<()> {
        self.ensure_available()?;
        self.inner.rooms.remove(room);
        Ok(())
    }

    async fn create_connection(
        &self,
        connection: &ConnectionRef,
        data: ConnectionDoc,
    ) -> StoreResult<()> {
        self.ensure_available()?;

        self.inner.connections.insert(connection.clone(), data.clone());
        self.notify_connection(&ConnectionSnapshot {
            reference: connection.clone(),
            doc: data,
        });
        Ok(())
    }

    async fn update_connection(
        &self,
        connection: &ConnectionRef,
        answer: ConnectionAnswer,
    ) -> StoreResult<()> {
        self.ensure_available()?;

        let snapshot = {
            let mut doc = self
                .inner
                .connections
                .get_mut(connection)
                .ok_or_else(|| StoreError::NotFound(connection.path()))?;
            doc.apply_answer(answer);
            ConnectionSnapshot {
                reference: connection.clone(),
                doc: doc.clone(),
            }
        };

        self.notify_connection(&snapshot);
        Ok(())
    }

    async fn connections_from(
        &self,
        room: &RoomId,
        author: &ParticipantId,
    ) -> StoreResult<Vec<ConnectionSnapshot>> {
        self.ensure_available()?;
        Ok(self
            .connections(room)
            .into_iter()
            .filter(|snapshot| &snapshot.doc.from == author)
            .collect())
    }

    async fn watch_connections(
        &self,
        room: &RoomId,
        tx: mpsc::UnboundedSender<ConnectionSnapshot>,
    ) -> StoreResult<Subscription> {
        self.ensure_available()?;

        // Registered before the initial replay: a concurrent write may then be delivered
        // twice, but never lost.
        let id = self.next_watcher_id();
        self.inner.connection_watchers.insert(
            id,
            ConnectionWatcher {
                room: room.clone(),
                tx: tx.clone(),
            },
        );

        for snapshot in self.connections(room) {
            let _ = tx.send(snapshot);
        }

        let weak: Weak<MemoryInner> = Arc::downgrade(&self.inner);
        let label = format!("{}/connections", room.path());
        debug!("Watching {}", label);
        Ok(Subscription::new(label, move || {
            if let Some(inner) = weak.upgrade() {
                inner.connection_watchers.remove(&id);
            }
        }))
    }

    async fn add_candidate(
        &self,
        connection: &ConnectionRef,
        side: &ParticipantId,
        candidate: IceCandidate,
    ) -> StoreResult<CandidateRef> {
        self.ensure_available()?;

        let reference = CandidateRef {
            connection: connection.clone(),
            side: side.clone(),
            id: CandidateId::new(),
        };
        self.inner
            .candidates
            .entry((connection.clone(), side.clone()))
            .or_default()
            .push((reference.id.clone(), candidate.clone()));

        self.notify_candidate(&CandidateSnapshot {
            reference: reference.clone(),
            candidate,
        });
        Ok(reference)
    }

    async fn list_candidates(
        &self,
        connection: &ConnectionRef,
        side: &ParticipantId,
    ) -> StoreResult<Vec<CandidateRef>> {
        self.ensure_available()?;
        Ok(self
            .candidates(connection, side)
            .into_iter()
            .map(|snapshot| snapshot.reference)
            .collect())
    }

    async fn watch_candidates(
        &self,
        connection: &ConnectionRef,
        side: &ParticipantId,
        tx: mpsc::UnboundedSender<CandidateSnapshot>,
    ) -> StoreResult<Subscription> {
        self.ensure_available()?;

        let id = self.next_watcher_id();
        self.inner.candidate_watchers.insert(
            id,
            CandidateWatcher {
                key: (connection.clone(), side.clone()),
                tx: tx.clone(),
            },
        );

        for snapshot in self.candidates(connection, side) {
            let _ = tx.send(snapshot);
        }

        let weak: Weak<MemoryInner> = Arc::downgrade(&self.inner);
        let label = format!("{}/{}", connection.path(), side);
        debug!("Watching {}", label);
        Ok(Subscription::new(label, move || {
            if let Some(inner) = weak.upgrade() {
                inner.candidate_watchers.remove(&id);
            }
        }))
    }

    async fn batch_delete(&self, refs: Vec<DocumentRef>) -> StoreResult<()> {
        self.ensure_available()?;

        for reference in refs {
            match reference {
                DocumentRef::Room(room) => {
                    self.inner.rooms.remove(&room);
                }
                DocumentRef::Connection(connection) => {
                    self.inner.connections.remove(&connection);
                }
                DocumentRef::Candidate(candidate) => {
                    let key = (candidate.connection.clone(), candidate.side.clone());
                    let now_empty = match self.inner.candidates.get_mut(&key) {
                        Some(mut entries) => {
                            entries.retain(|(id, _)| id != &candidate.id);
                            entries.is_empty()
                        }
                        None => false,
                    };
                    if now_empty {
                        self.inner.candidates.remove(&key);
                    }
                }
            }
        }
        Ok(())
    }
}
