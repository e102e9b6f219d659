//! Debounced search tests. All run on a paused clock.

use std::time::Duration;

use profile_store::{filter_profiles, ProfileStore, StoreConfig, ViewState};

use crate::support::{alice_bob, loaded_store, names, raw, trio};

async fn advance(ms: u64) {
    tokio::time::sleep(Duration::from_millis(ms)).await;
}

#[tokio::test(start_paused = true)]
async fn query_filters_after_the_debounce_window() {
    let (store, _) = loaded_store(alice_bob()).await;

    store.set_query("al");
    assert_eq!(store.query(), "al");

    advance(299).await;
    assert_eq!(names(&store.state()), vec!["Alice", "Bob"]);

    advance(2).await;
    assert_eq!(names(&store.state()), vec!["Alice"]);
    assert_eq!(store.state().profiles().unwrap()[0].id, 1);
}

#[tokio::test(start_paused = true)]
async fn only_the_last_query_in_a_burst_is_applied() {
    let (store, _) = loaded_store(trio()).await;
    let mut states = store.subscribe();
    states.drain();

    store.set_query("m");
    advance(100).await;
    store.set_query("bo");
    advance(100).await;
    store.set_query("alic");
    assert!(store.has_pending_query());

    advance(400).await;

    let published = states.drain();
    assert_eq!(published.len(), 1, "got {:?}", published);
    assert_eq!(names(&published[0]), vec!["Alice"]);
    assert!(!store.has_pending_query());
}

#[tokio::test(start_paused = true)]
async fn matching_is_case_insensitive_substring() {
    let (store, _) = loaded_store(trio()).await;

    store.set_query("AL");
    advance(301).await;
    assert_eq!(names(&store.state()), vec!["Alice", "Malia"]);

    store.set_query("LIA");
    advance(301).await;
    assert_eq!(names(&store.state()), vec!["Malia"]);
}

#[tokio::test(start_paused = true)]
async fn empty_query_restores_the_full_list_in_order() {
    let (store, _) = loaded_store(trio()).await;

    store.set_query("bob");
    advance(301).await;
    assert_eq!(names(&store.state()), vec!["Bob"]);

    store.set_query("");
    advance(301).await;
    assert_eq!(names(&store.state()), vec!["Alice", "Bob", "Malia"]);
}

#[tokio::test(start_paused = true)]
async fn projection_equals_filtered_canonical_list_for_any_query() {
    let (store, _) = loaded_store(trio()).await;

    for query in ["", "a", "A", "li", "ice", "o", "xyz", "MALIA", "b"] {
        store.set_query(query);
        advance(301).await;

        let expected = filter_profiles(&store.profiles(), query);
        assert_eq!(store.state(), ViewState::Success(expected), "query {:?}", query);
    }
}

#[tokio::test(start_paused = true)]
async fn query_during_fetch_filters_the_previous_list() {
    let (store, source) = loaded_store(alice_bob()).await;
    source.push_ok_after(Duration::from_secs(1), vec![raw(3, "Carol"), raw(4, "Alicia")]);

    let handle = store.load();
    assert_eq!(store.state(), ViewState::Loading);

    store.set_query("ali");
    advance(301).await;
    assert_eq!(names(&store.state()), vec!["Alice"]);

    handle.outcome().await;
    assert_eq!(names(&store.state()), vec!["Alicia"]);
}

#[tokio::test(start_paused = true)]
async fn debounce_window_is_configurable() {
    let source = profile_store::InMemoryProfileSource::with_profiles(alice_bob());
    let store = ProfileStore::builder(source)
        .config(StoreConfig::default().with_debounce(Duration::from_millis(50)))
        .build();
    store.load().outcome().await;

    store.set_query("bob");
    advance(51).await;
    assert_eq!(names(&store.state()), vec!["Bob"]);
}

#[tokio::test(start_paused = true)]
async fn filtering_never_touches_the_canonical_list() {
    let (store, _) = loaded_store(trio()).await;
    let before = store.profiles();

    store.set_query("zzz");
    advance(301).await;

    assert_eq!(store.state(), ViewState::Success(vec![]));
    assert_eq!(store.profiles(), before);
}
