use bytes::Bytes;
use pearmo_core::IceCandidate;
use pearmo_mesh::negotiation::NegotiationState;
use pearmo_mesh::{MemoryStore, SignalingStore};
use std::sync::Arc;

use crate::integration::{init_tracing, spawn_peer};
use crate::utils::{wait_for_status, wait_until};

#[tokio::test]
async fn test_candidates_cross_over_exactly_once() {
    init_tracing();

    let store = MemoryStore::new();
    let a1 = spawn_peer(Arc::new(store.clone()), "a1");
    let b2 = spawn_peer(Arc::new(store.clone()), "b2");

    let room = a1.handle.create_room().await.unwrap();
    b2.handle.join_room(room.clone()).await.unwrap();

    assert!(wait_until(2000, || a1.engine.transport(&b2.id).is_some()).await);
    let answerer = a1.engine.transport(&b2.id).unwrap();
    let offerer = b2.engine.transport(&a1.id).unwrap();

    let exchanged = wait_until(2000, || {
        answerer.state().candidates.len() == 1 && offerer.state().candidates.len() == 1
    })
    .await;
    assert!(exchanged, "Candidates were not exchanged");

    assert_eq!(answerer.state().candidates[0].candidate, offerer.local_candidate());
    assert_eq!(offerer.state().candidates[0].candidate, answerer.local_candidate());
    assert_eq!(answerer.state().candidates[0].sdp_m_line_index, Some(0));

    // Each side wrote to its own sub-collection of the single connection.
    let connection = store.connections(&room).remove(0).reference;
    let from_b2 = store.candidates(&connection, &b2.id);
    let from_a1 = store.candidates(&connection, &a1.id);
    assert_eq!(from_b2.len(), 1);
    assert_eq!(from_a1.len(), 1);
    assert_eq!(from_b2[0].candidate.candidate, offerer.local_candidate());

    // A late candidate is ingested too, and only once.
    store
        .add_candidate(&connection, &b2.id, IceCandidate::new("candidate:late"))
        .await
        .unwrap();
    assert!(wait_until(2000, || answerer.state().candidates.len() == 2).await);
    tokio::time::sleep(std::time::Duration::from_millis(50)).await;
    assert_eq!(answerer.state().candidates.len(), 2);
    assert_eq!(offerer.state().candidates.len(), 1);
}

#[tokio::test]
async fn test_malformed_candidate_is_skipped() {
    init_tracing();

    let store = MemoryStore::new();
    let a1 = spawn_peer(Arc::new(store.clone()), "a1");
    let b2 = spawn_peer(Arc::new(store.clone()), "b2");

    let room = a1.handle.create_room().await.unwrap();
    b2.handle.join_room(room.clone()).await.unwrap();

    let (done, _) = wait_for_status(&b2.handle, 2000, |s| {
        s.session(&a1.id)
            .is_some_and(|session| session.state == NegotiationState::Answered)
    })
    .await;
    assert!(done);

    let answerer = a1.engine.transport(&b2.id).unwrap();
    assert!(wait_until(2000, || answerer.state().candidates.len() == 1).await);

    let connection = store.connections(&room).remove(0).reference;
    store
        .add_candidate(&connection, &b2.id, IceCandidate::new(""))
        .await
        .unwrap();
    store
        .add_candidate(&connection, &b2.id, IceCandidate::new("candidate:after"))
        .await
        .unwrap();

    assert!(wait_until(2000, || answerer.state().candidates.len() == 2).await);
    let candidates = answerer.state().candidates;
    assert_eq!(candidates[1].candidate, "candidate:after");

    // The pair is still usable.
    assert!(a1.behavior.wait_for_join(&b2.id, 2000).await);
    a1.handle.context().send(&b2.id, Bytes::from_static(b"ping")).await;
    assert!(wait_until(2000, || answerer.state().sent.len() == 1).await);
}
