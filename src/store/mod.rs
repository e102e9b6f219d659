//! ProfileStore: canonical profile list, active query and the published
//! view state.
//!
//! ## Architecture
//!
//! ```text
//!  view layer                         ProfileStore
//! ┌───────────┐ load()/set_query() ┌────────────────────────────────────┐
//! │           │ apply_edit()       │ Mutex<StoreState>                  │
//! │           │ ─────────────────▶ │   canonical: Vec<Profile>          │
//! │           │                    │   query, generations, view         │
//! │           │ ◀───────────────── │ Subscribers (unbounded channels)   │
//! └───────────┘  ViewState stream  └────────────────────────────────────┘
//!                                     │ tokio::spawn      │ Debouncer
//!                                     ▼                   ▼
//!                              dyn ProfileSource     delayed re-filter
//! ```
//!
//! Every mutation of the canonical list and every publication happens under
//! the one state mutex, so all subscribers observe the same sequence of
//! states. Only changes are published: recomputing a state equal to the
//! current one notifies nobody. Calls that spawn work (`load`, `set_query`) must run inside a
//! tokio runtime.
//!
//! ## Example
//!
//! ```
//! use profile_store::{InMemoryProfileSource, ProfileStore, RawProfile, ViewState};
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() {
//! let source = InMemoryProfileSource::with_profiles(vec![
//!     RawProfile::new(1, "Alice"),
//!     RawProfile::new(2, "Bob"),
//! ]);
//! let store = ProfileStore::new(source);
//! let mut states = store.subscribe();
//!
//! store.load().outcome().await;
//!
//! assert_eq!(states.recv().await, Some(ViewState::Loading));
//! match states.recv().await {
//!     Some(ViewState::Success(profiles)) => assert_eq!(profiles.len(), 2),
//!     other => panic!("unexpected state: {:?}", other),
//! }
//! # }
//! ```

mod debounce;
mod subscription;

use std::collections::HashSet;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use serde::Serialize;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::config::{StalePolicy, StoreConfig};
use crate::edit::EditSession;
use crate::error::FetchError;
use crate::profile::{filter_profiles, PlaceholderMapper, Profile, ProfileId, ProfileMapper, RawProfile};
use crate::source::ProfileSource;

use debounce::Debouncer;
use subscription::Subscribers;

pub use subscription::{Subscription, SubscriptionId};

/// Prefix of every `ViewState::Error` message produced by a failed load.
pub const LOAD_FAILURE_PREFIX: &str = "Failed to load profiles";

/// What the view layer renders. Exactly one variant is current at a time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", content = "data", rename_all = "snake_case")]
pub enum ViewState {
    Loading,
    /// Canonical profiles matching the active query, in canonical order.
    Success(Vec<Profile>),
    Error(String),
}

impl ViewState {
    pub fn is_loading(&self) -> bool {
        matches!(self, ViewState::Loading)
    }

    pub fn profiles(&self) -> Option<&[Profile]> {
        match self {
            ViewState::Success(profiles) => Some(profiles),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            ViewState::Error(message) => Some(message),
            _ => None,
        }
    }
}

/// How a single `load()` ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadOutcome {
    /// The canonical list was replaced with this many profiles.
    Loaded(usize),
    /// The fetch failed; the store now shows `ViewState::Error`.
    Failed(FetchError),
    /// A newer load was issued before this one resolved; its result was
    /// dropped.
    Superseded,
    /// The fetch task panicked or was cancelled by runtime shutdown.
    Interrupted,
}

/// Handle to an in-flight load. Dropping it does not cancel the fetch.
#[derive(Debug)]
pub struct LoadHandle {
    generation: u64,
    task: JoinHandle<LoadOutcome>,
}

impl LoadHandle {
    /// Sequence number of this load; later calls get larger numbers.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }

    pub async fn outcome(self) -> LoadOutcome {
        self.task.await.unwrap_or(LoadOutcome::Interrupted)
    }
}

struct StoreState {
    canonical: Vec<Profile>,
    query: String,
    view: ViewState,
    load_generation: u64,
    query_generation: u64,
}

impl StoreState {
    /// Recompute the filtered projection. `Error` stays published until
    /// the next load.
    fn refilter(&mut self, subscribers: &Subscribers) {
        if matches!(self.view, ViewState::Error(_)) {
            debug!(query = %self.query, "keeping error state; projection not republished");
            return;
        }
        let visible = filter_profiles(&self.canonical, &self.query);
        debug!(query = %self.query, visible = visible.len(), total = self.canonical.len(), "filtered profiles");
        self.publish(ViewState::Success(visible), subscribers);
    }

    /// Make `view` current and notify subscribers. Republishing the current
    /// state is not a transition and is skipped.
    fn publish(&mut self, view: ViewState, subscribers: &Subscribers) {
        if self.view == view {
            return;
        }
        self.view = view;
        subscribers.broadcast(&self.view);
    }
}

struct Inner {
    state: Mutex<StoreState>,
    subscribers: Subscribers,
    debouncer: Debouncer,
    source: Arc<dyn ProfileSource>,
    mapper: Arc<dyn ProfileMapper>,
    config: StoreConfig,
}

impl Inner {
    fn lock(&self) -> MutexGuard<'_, StoreState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    async fn fetch(&self) -> Result<Vec<RawProfile>, FetchError> {
        match self.config.fetch_timeout() {
            Some(limit) => tokio::time::timeout(limit, self.source.fetch_all())
                .await
                .unwrap_or(Err(FetchError::Timeout)),
            None => self.source.fetch_all().await,
        }
    }

    async fn run_load(&self, generation: u64) -> LoadOutcome {
        let result = self.fetch().await.map(|raw| self.map_unique(raw));

        let mut state = self.lock();
        if self.config.stale_policy == StalePolicy::DiscardStale
            && generation != state.load_generation
        {
            debug!(generation, latest = state.load_generation, "discarding stale profile response");
            return LoadOutcome::Superseded;
        }

        match result {
            Ok(profiles) => {
                let count = profiles.len();
                state.canonical = profiles;
                let visible = filter_profiles(&state.canonical, &state.query);
                state.publish(ViewState::Success(visible), &self.subscribers);
                info!(generation, count, "profiles loaded");
                LoadOutcome::Loaded(count)
            }
            Err(err) => {
                warn!(generation, error = %err, "failed to load profiles");
                let message = format!("{}: {}", LOAD_FAILURE_PREFIX, err);
                state.publish(ViewState::Error(message), &self.subscribers);
                LoadOutcome::Failed(err)
            }
        }
    }

    /// Map raw records, keeping the first occurrence of each id.
    fn map_unique(&self, raw: Vec<RawProfile>) -> Vec<Profile> {
        let mut seen = HashSet::with_capacity(raw.len());
        let mut profiles = Vec::with_capacity(raw.len());
        for record in &raw {
            if !seen.insert(record.id) {
                warn!(id = record.id, "duplicate profile id in response; keeping first");
                continue;
            }
            profiles.push(self.mapper.map(record));
        }
        profiles
    }

    fn apply_query(&self, generation: u64) {
        let mut state = self.lock();
        if state.query_generation != generation {
            return;
        }
        state.refilter(&self.subscribers);
    }
}

/// Builder for [`ProfileStore`].
pub struct ProfileStoreBuilder {
    source: Arc<dyn ProfileSource>,
    mapper: Arc<dyn ProfileMapper>,
    config: StoreConfig,
}

impl ProfileStoreBuilder {
    pub fn config(mut self, config: StoreConfig) -> Self {
        self.config = config;
        self
    }

    pub fn mapper<M: ProfileMapper + 'static>(mut self, mapper: M) -> Self {
        self.mapper = Arc::new(mapper);
        self
    }

    pub fn build(self) -> ProfileStore {
        ProfileStore {
            inner: Arc::new(Inner {
                state: Mutex::new(StoreState {
                    canonical: Vec::new(),
                    query: String::new(),
                    view: ViewState::Loading,
                    load_generation: 0,
                    query_generation: 0,
                }),
                subscribers: Subscribers::default(),
                debouncer: Debouncer::default(),
                source: self.source,
                mapper: self.mapper,
                config: self.config,
            }),
        }
    }
}

/// Profile list state controller.
///
/// Clone-friendly via `Arc`; clones share state, subscribers and the
/// pending debounce.
#[derive(Clone)]
pub struct ProfileStore {
    inner: Arc<Inner>,
}

impl ProfileStore {
    /// Store with default config and the placeholder mapper.
    pub fn new<S: ProfileSource + 'static>(source: S) -> Self {
        Self::builder(source).build()
    }

    pub fn builder<S: ProfileSource + 'static>(source: S) -> ProfileStoreBuilder {
        ProfileStoreBuilder {
            source: Arc::new(source),
            mapper: Arc::new(PlaceholderMapper::default()),
            config: StoreConfig::default(),
        }
    }

    pub fn config(&self) -> &StoreConfig {
        &self.inner.config
    }

    /// Start a fetch. Publishes `Loading` before returning; the fetch runs
    /// on its own task and publishes `Success` or `Error` when it resolves.
    pub fn load(&self) -> LoadHandle {
        let generation = {
            let mut state = self.inner.lock();
            state.load_generation += 1;
            state.publish(ViewState::Loading, &self.inner.subscribers);
            state.load_generation
        };
        info!(generation, "loading profiles");

        let inner = Arc::clone(&self.inner);
        let task = tokio::spawn(async move { inner.run_load(generation).await });
        LoadHandle { generation, task }
    }

    /// Same as [`load`](Self::load); the retry path after an error.
    pub fn refresh(&self) -> LoadHandle {
        self.load()
    }

    /// Record `query` as the active query and re-filter once no newer
    /// query has arrived for the debounce window.
    pub fn set_query(&self, query: impl Into<String>) {
        let generation = {
            let mut state = self.inner.lock();
            state.query = query.into();
            state.query_generation += 1;
            state.query_generation
        };

        let inner = Arc::downgrade(&self.inner);
        self.inner
            .debouncer
            .schedule(self.inner.config.debounce(), move || {
                if let Some(inner) = inner.upgrade() {
                    inner.apply_query(generation);
                }
            });
    }

    pub fn query(&self) -> String {
        self.inner.lock().query.clone()
    }

    /// Whether a debounced re-filter is still waiting to fire.
    pub fn has_pending_query(&self) -> bool {
        self.inner.debouncer.is_pending()
    }

    /// Replace the canonical profile with the same id, keeping its position,
    /// and re-filter immediately. Returns `false` (and changes nothing) when
    /// the id is unknown.
    pub fn apply_edit(&self, profile: Profile) -> bool {
        let mut state = self.inner.lock();
        let Some(slot) = state.canonical.iter_mut().find(|p| p.id == profile.id) else {
            debug!(id = profile.id, "ignoring edit for unknown profile");
            return false;
        };
        *slot = profile;
        state.refilter(&self.inner.subscribers);
        true
    }

    pub fn get_by_id(&self, id: ProfileId) -> Option<Profile> {
        self.inner.lock().canonical.iter().find(|p| p.id == id).cloned()
    }

    /// Open a typed edit channel for the canonical profile `id`.
    pub fn begin_edit(&self, id: ProfileId) -> Option<EditSession> {
        self.get_by_id(id).map(EditSession::new)
    }

    pub fn state(&self) -> ViewState {
        self.inner.lock().view.clone()
    }

    /// Snapshot of the canonical (unfiltered) list.
    pub fn profiles(&self) -> Vec<Profile> {
        self.inner.lock().canonical.clone()
    }

    /// Register a listener. It first receives the current state.
    pub fn subscribe(&self) -> Subscription {
        let state = self.inner.lock();
        self.inner.subscribers.subscribe(&state.view)
    }

    pub fn subscriber_count(&self) -> usize {
        self.inner.subscribers.len()
    }
}

impl std::fmt::Debug for ProfileStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.inner.lock();
        f.debug_struct("ProfileStore")
            .field("view", &state.view)
            .field("query", &state.query)
            .field("profiles", &state.canonical.len())
            .finish()
    }
}
