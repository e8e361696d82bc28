use pearmo_core::ParticipantId;
use pearmo_mesh::{Coordinator, MemoryStore, MeshError, RoomConfig, SignalingStore};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::integration::{init_tracing, spawn_peer};
use crate::utils::{FakeEngine, TestRoomBehavior};

/// Yields `ids` in order, then keeps repeating the last one.
fn sequence(ids: &'static [&'static str]) -> impl Fn() -> ParticipantId + Send + Sync + 'static {
    let next = AtomicUsize::new(0);
    move || {
        let index = next.fetch_add(1, Ordering::SeqCst).min(ids.len() - 1);
        ParticipantId::from(ids[index])
    }
}

#[tokio::test]
async fn test_colliding_id_is_regenerated() {
    init_tracing();

    let store = MemoryStore::new();
    let a1 = spawn_peer(Arc::new(store.clone()), "a1");
    let room = a1.handle.create_room().await.unwrap();

    let engine = FakeEngine::new("joiner");
    let joiner = Coordinator::new(
        Arc::new(store.clone()),
        Arc::new(engine.clone()),
        Box::new(TestRoomBehavior::new()),
        RoomConfig::default(),
    )
    .with_id_generator(sequence(&["a1", "b2"]))
    .spawn();

    assert_eq!(joiner.participant_id().await.unwrap(), ParticipantId::from("a1"));

    let report = joiner.join_room(room.clone()).await.unwrap();
    assert_eq!(report.participant_id, ParticipantId::from("b2"));
    assert_eq!(report.offered, vec![a1.id.clone()]);
    assert_eq!(joiner.participant_id().await.unwrap(), ParticipantId::from("b2"));

    let doc = store.get_room(&room).await.unwrap().unwrap();
    assert_eq!(doc.participants, vec![a1.id, ParticipantId::from("b2")]);

    let connections = store.connections(&room);
    assert_eq!(connections.len(), 1);
    assert_eq!(connections[0].doc.from, ParticipantId::from("b2"));
}

#[tokio::test]
async fn test_identifier_exhausted() {
    init_tracing();

    let store = MemoryStore::new();
    let a1 = spawn_peer(Arc::new(store.clone()), "a1");
    let room = a1.handle.create_room().await.unwrap();

    let config = RoomConfig {
        max_id_retries: 3,
        ..RoomConfig::default()
    };
    let joiner = Coordinator::new(
        Arc::new(store.clone()),
        Arc::new(FakeEngine::new("joiner")),
        Box::new(TestRoomBehavior::new()),
        config,
    )
    .with_id_generator(sequence(&["a1"]))
    .spawn();

    let result = joiner.join_room(room.clone()).await;
    assert!(matches!(
        result,
        Err(MeshError::IdentifierExhausted { attempts: 3 })
    ));

    let doc = store.get_room(&room).await.unwrap().unwrap();
    assert_eq!(doc.participants, vec![a1.id]);
    assert!(store.connections(&room).is_empty());

    let status = joiner.status().await.unwrap();
    assert!(status.room.is_none());
}

#[tokio::test]
async fn test_exhausted_join_keeps_previous_id() {
    init_tracing();

    let store = MemoryStore::new();
    let a1 = spawn_peer(Arc::new(store.clone()), "a1");
    let b2 = spawn_peer(Arc::new(store.clone()), "b2");
    let room = a1.handle.create_room().await.unwrap();
    b2.handle.join_room(room.clone()).await.unwrap();

    let config = RoomConfig {
        max_id_retries: 3,
        ..RoomConfig::default()
    };
    // Starts as "a1", every regenerated id is "b2": both are taken.
    let joiner = Coordinator::new(
        Arc::new(store.clone()),
        Arc::new(FakeEngine::new("joiner")),
        Box::new(TestRoomBehavior::new()),
        config,
    )
    .with_id_generator(sequence(&["a1", "b2"]))
    .spawn();

    let result = joiner.join_room(room.clone()).await;
    assert!(matches!(
        result,
        Err(MeshError::IdentifierExhausted { attempts: 3 })
    ));
    assert_eq!(joiner.participant_id().await.unwrap(), a1.id);

    let doc = store.get_room(&room).await.unwrap().unwrap();
    assert_eq!(doc.participants, vec![a1.id, b2.id.clone()]);
    assert!(
        store
            .connections(&room)
            .iter()
            .all(|c| c.doc.from == b2.id)
    );
}
