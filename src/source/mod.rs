//! Profile sources: the single collaborator the store fetches from.
//!
//! ```text
//! ┌──────────────┐  fetch_all()   ┌──────────────────────────────┐
//! │ ProfileStore │ ─────────────▶ │ dyn ProfileSource            │
//! └──────────────┘                │  - HttpProfileSource (http)  │
//!                                 │  - InMemoryProfileSource     │
//!                                 └──────────────────────────────┘
//! ```
//!
//! The store owns the mapping from [`RawProfile`] to [`Profile`](crate::Profile);
//! a source only delivers records or fails.

#[cfg(feature = "http")]
mod http;
mod in_memory;

use std::sync::Arc;

use async_trait::async_trait;

use crate::error::FetchError;
use crate::profile::RawProfile;

#[cfg(feature = "http")]
pub use http::HttpProfileSource;
pub use in_memory::InMemoryProfileSource;

/// Remote collaborator delivering the full profile listing.
#[async_trait]
pub trait ProfileSource: Send + Sync {
    async fn fetch_all(&self) -> Result<Vec<RawProfile>, FetchError>;
}

#[async_trait]
impl<S: ProfileSource + ?Sized> ProfileSource for Arc<S> {
    async fn fetch_all(&self) -> Result<Vec<RawProfile>, FetchError> {
        (**self).fetch_all().await
    }
}
