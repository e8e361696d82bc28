use bytes::Bytes;
use pearmo_mesh::{Coordinator, MemoryStore, MeshConfig, TransportConfig};
use std::sync::Arc;

use crate::integration::init_tracing;
use crate::utils::TestRoomBehavior;

fn local_config() -> MeshConfig {
    MeshConfig {
        transport: TransportConfig::local(),
        ..MeshConfig::default()
    }
}

#[tokio::test]
async fn test_webrtc_peers_exchange_messages() {
    init_tracing();

    let store = Arc::new(MemoryStore::new());
    let a1_behavior = TestRoomBehavior::new();
    let b2_behavior = TestRoomBehavior::new();

    let a1 = Coordinator::with_webrtc(store.clone(), Box::new(a1_behavior.clone()), local_config())
        .with_participant_id("a1")
        .spawn();
    let b2 = Coordinator::with_webrtc(store.clone(), Box::new(b2_behavior.clone()), local_config())
        .with_participant_id("b2")
        .spawn();

    let room = a1.create_room().await.expect("Failed to create room");
    b2.join_room(room).await.expect("Failed to join room");

    assert!(
        a1_behavior.wait_for_join(&"b2".into(), 10_000).await,
        "Answerer data channel never opened"
    );
    assert!(
        b2_behavior.wait_for_join(&"a1".into(), 10_000).await,
        "Offerer data channel never opened"
    );

    b2.context()
        .send(&"a1".into(), Bytes::from_static(b"Hello from b2"))
        .await;
    a1.context()
        .send(&"b2".into(), Bytes::from_static(b"Hello from a1"))
        .await;

    assert!(a1_behavior.wait_for_events(2, 5000).await);
    assert!(b2_behavior.wait_for_events(2, 5000).await);
    assert_eq!(
        a1_behavior.messages_from(&"b2".into()).await,
        vec![Bytes::from_static(b"Hello from b2")]
    );
    assert_eq!(
        b2_behavior.messages_from(&"a1".into()).await,
        vec![Bytes::from_static(b"Hello from a1")]
    );

    b2.hang_up().await.expect("Hang-up failed");
    a1.hang_up().await.expect("Hang-up failed");
    assert_eq!(store.watcher_count(), 0);
}
