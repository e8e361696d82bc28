use pearmo_mesh::MemoryStore;
use std::sync::Arc;

use crate::integration::{init_tracing, spawn_peer};
use crate::utils::{wait_for_status, wait_until};

#[tokio::test]
async fn test_three_peers_form_full_mesh() {
    init_tracing();

    let store = MemoryStore::new();
    let a1 = spawn_peer(Arc::new(store.clone()), "a1");
    let b2 = spawn_peer(Arc::new(store.clone()), "b2");
    let c3 = spawn_peer(Arc::new(store.clone()), "c3");

    let room = a1.handle.create_room().await.unwrap();
    b2.handle.join_room(room.clone()).await.unwrap();
    c3.handle.join_room(room.clone()).await.unwrap();

    let all_answered = wait_until(2000, || {
        let connections = store.connections(&room);
        connections.len() == 3 && connections.iter().all(|c| c.doc.answered().is_some())
    })
    .await;
    assert!(all_answered, "Not every pair was answered");

    let mut pairs: Vec<(String, String)> = store
        .connections(&room)
        .into_iter()
        .map(|c| (c.doc.from.to_string(), c.doc.to.to_string()))
        .collect();
    pairs.sort();
    assert_eq!(
        pairs,
        vec![
            ("b2".to_owned(), "a1".to_owned()),
            ("c3".to_owned(), "a1".to_owned()),
            ("c3".to_owned(), "b2".to_owned()),
        ]
    );

    for (peer, others) in [
        (&a1, [&b2.id, &c3.id]),
        (&b2, [&a1.id, &c3.id]),
        (&c3, [&a1.id, &b2.id]),
    ] {
        for other in others {
            assert!(
                peer.behavior.wait_for_join(other, 2000).await,
                "{} never saw {}",
                peer.id,
                other
            );
        }
    }

    let ctx = b2.handle.context();
    assert_eq!(ctx.list_participants(), vec![a1.id.clone(), c3.id.clone()]);

    for peer in [&a1, &b2, &c3] {
        let (settled, status) = wait_for_status(&peer.handle, 2000, |s| {
            s.sessions.len() == 2 && s.is_settled()
        })
        .await;
        assert!(settled, "{} still negotiating: {:?}", peer.id, status.sessions);
    }
}
