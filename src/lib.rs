//! Profile list state controller.
//!
//! [`ProfileStore`] owns a canonical list of profiles fetched from a
//! [`ProfileSource`], an active search query applied with a trailing-edge
//! debounce, and in-memory edits reconciled by id. It publishes a single
//! [`ViewState`] (`Loading`, `Success`, `Error`) to any number of
//! [`Subscription`]s.
//!
//! Rendering, routing and persistence belong to the consuming view layer.

mod config;
mod edit;
mod error;
mod profile;
mod source;
mod store;

pub use config::{
    SourceConfig, StalePolicy, StoreConfig, DEFAULT_BASE_URL, DEFAULT_DEBOUNCE_MS,
    DEFAULT_USERS_PATH,
};
pub use edit::{EditReceipt, EditRequest, EditSession};
pub use error::{ConfigError, FetchError};
pub use profile::{
    filter_profiles, PlaceholderMapper, Profile, ProfileDraft, ProfileId, ProfileMapper,
    RawProfile, PLACEHOLDER_IMAGE_URL,
};
#[cfg(feature = "http")]
pub use source::HttpProfileSource;
pub use source::{InMemoryProfileSource, ProfileSource};
pub use store::{
    LoadHandle, LoadOutcome, ProfileStore, ProfileStoreBuilder, Subscription, SubscriptionId,
    ViewState, LOAD_FAILURE_PREFIX,
};

// Re-exported so implementors of `ProfileSource` need not depend on it directly.
pub use async_trait::async_trait;
