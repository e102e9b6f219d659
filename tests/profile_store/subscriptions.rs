//! State stream delivery tests.

use std::time::Duration;

use profile_store::{FetchError, InMemoryProfileSource, ProfileStore, ViewState};
use tokio::time::timeout;
use tokio_stream::StreamExt;

use crate::support::{alice_bob, loaded_store, names};

#[tokio::test]
async fn subscriber_sees_current_state_then_transitions() {
    let store = ProfileStore::new(InMemoryProfileSource::with_profiles(alice_bob()));
    let mut states = store.subscribe();

    store.load().outcome().await;

    let published = states.drain();
    assert_eq!(published.len(), 2, "got {:?}", published);
    assert_eq!(published[0], ViewState::Loading);
    assert_eq!(names(&published[1]), vec!["Alice", "Bob"]);
}

#[tokio::test]
async fn reload_publishes_loading_then_result() {
    let (store, source) = loaded_store(alice_bob()).await;
    let mut states = store.subscribe();
    assert!(matches!(states.recv().await, Some(ViewState::Success(_))));

    source.push_err(FetchError::Network("connection reset".into()));
    store.load().outcome().await;

    assert_eq!(
        states.drain(),
        vec![
            ViewState::Loading,
            ViewState::Error("Failed to load profiles: connection reset".into()),
        ]
    );
}

#[tokio::test]
async fn every_subscriber_observes_the_same_sequence() {
    let store = ProfileStore::new(InMemoryProfileSource::with_profiles(alice_bob()));
    let mut first = store.subscribe();
    let mut second = store.subscribe();

    store.load().outcome().await;
    store.load().outcome().await;

    let a = first.drain();
    let b = second.drain();
    assert_eq!(a.len(), 4);
    assert_eq!(a, b);
}

#[tokio::test]
async fn unsubscribe_stops_delivery() {
    let (store, _) = loaded_store(alice_bob()).await;
    let keep = store.subscribe();
    let leave = store.subscribe();
    assert_eq!(store.subscriber_count(), 2);

    leave.unsubscribe();
    assert_eq!(store.subscriber_count(), 1);

    drop(keep);
    assert_eq!(store.subscriber_count(), 0);
}

#[tokio::test]
async fn clones_share_state_and_subscribers() {
    let (store, _) = loaded_store(alice_bob()).await;
    let view_side = store.clone();
    let mut states = view_side.subscribe();
    states.drain();

    store.apply_edit(profile_store::Profile::new(1, "Alicia", 21, ""));

    assert_eq!(names(&view_side.state()), vec!["Alicia", "Bob"]);
    assert_eq!(states.drain().len(), 1);
    assert_eq!(store.subscriber_count(), 1);
}

#[tokio::test]
async fn subscription_works_as_a_stream() {
    let store = ProfileStore::new(InMemoryProfileSource::with_profiles(alice_bob()));
    let states = store.subscribe();

    store.load().outcome().await;

    let collected: Vec<ViewState> = states.take(2).collect().await;
    assert_eq!(collected[0], ViewState::Loading);
    assert_eq!(names(&collected[1]), vec!["Alice", "Bob"]);
}

#[tokio::test]
async fn recv_ends_once_the_store_is_dropped() {
    let (store, _) = loaded_store(alice_bob()).await;
    let mut states = store.subscribe();
    states.drain();

    drop(store);

    let next = timeout(Duration::from_secs(2), states.recv()).await;
    assert_eq!(next, Ok(None));
}

#[tokio::test]
async fn stream_ends_after_buffered_states_once_the_store_is_dropped() {
    let store = ProfileStore::new(InMemoryProfileSource::with_profiles(alice_bob()));
    let states = store.subscribe();
    store.load().outcome().await;
    let view_side = store.clone();

    drop(store);
    drop(view_side);

    let collected: Vec<ViewState> = timeout(Duration::from_secs(2), states.collect())
        .await
        .expect("stream should end");
    assert_eq!(collected.len(), 2);
    assert_eq!(collected[0], ViewState::Loading);
}

#[tokio::test(start_paused = true)]
async fn pending_query_does_not_keep_the_store_alive() {
    let (store, _) = loaded_store(alice_bob()).await;
    let mut states = store.subscribe();
    states.drain();

    store.set_query("bo");
    drop(store);

    assert_eq!(states.recv().await, None);
}
