//! In-memory profile source for tests, demos and offline development.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use async_trait::async_trait;

use super::ProfileSource;
use crate::error::FetchError;
use crate::profile::RawProfile;

#[derive(Clone)]
enum Reply {
    Ready {
        result: Result<Vec<RawProfile>, FetchError>,
        delay: Duration,
    },
    /// Never resolves.
    Hang,
}

#[derive(Default)]
struct Script {
    queue: VecDeque<Reply>,
    fallback: Option<Reply>,
    calls: usize,
}

/// Scripted profile source.
///
/// Queued replies are handed out one per `fetch_all` call, in order. Once
/// the queue is empty the fallback reply (if any) is repeated. Clones share
/// the same script, so a test can keep a handle after giving one to a store.
///
/// ```
/// use profile_store::{FetchError, InMemoryProfileSource, RawProfile};
///
/// let source = InMemoryProfileSource::with_profiles(vec![RawProfile::new(1, "Alice")]);
/// source.push_err(FetchError::Timeout);
/// assert_eq!(source.pending(), 1);
/// ```
#[derive(Clone, Default)]
pub struct InMemoryProfileSource {
    script: Arc<Mutex<Script>>,
}

impl InMemoryProfileSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// A source that always answers with `profiles`.
    pub fn with_profiles(profiles: Vec<RawProfile>) -> Self {
        let source = Self::new();
        source.set_fallback(Ok(profiles));
        source
    }

    pub fn push_ok(&self, profiles: Vec<RawProfile>) {
        self.push_ok_after(Duration::ZERO, profiles);
    }

    pub fn push_ok_after(&self, delay: Duration, profiles: Vec<RawProfile>) {
        self.push(Reply::Ready {
            result: Ok(profiles),
            delay,
        });
    }

    pub fn push_err(&self, error: FetchError) {
        self.push_err_after(Duration::ZERO, error);
    }

    pub fn push_err_after(&self, delay: Duration, error: FetchError) {
        self.push(Reply::Ready {
            result: Err(error),
            delay,
        });
    }

    /// Queue a reply that never arrives.
    pub fn push_hang(&self) {
        self.push(Reply::Hang);
    }

    pub fn set_fallback(&self, result: Result<Vec<RawProfile>, FetchError>) {
        self.lock().fallback = Some(Reply::Ready {
            result,
            delay: Duration::ZERO,
        });
    }

    /// Number of `fetch_all` calls so far.
    pub fn calls(&self) -> usize {
        self.lock().calls
    }

    /// Number of queued replies not yet consumed.
    pub fn pending(&self) -> usize {
        self.lock().queue.len()
    }

    fn push(&self, reply: Reply) {
        self.lock().queue.push_back(reply);
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Script> {
        self.script.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn next_reply(&self) -> Option<Reply> {
        let mut script = self.lock();
        script.calls += 1;
        script.queue.pop_front().or_else(|| script.fallback.clone())
    }
}

#[async_trait]
impl ProfileSource for InMemoryProfileSource {
    async fn fetch_all(&self) -> Result<Vec<RawProfile>, FetchError> {
        match self.next_reply() {
            Some(Reply::Ready { result, delay }) => {
                if !delay.is_zero() {
                    tokio::time::sleep(delay).await;
                }
                result
            }
            Some(Reply::Hang) => std::future::pending().await,
            None => Err(FetchError::Network("no scripted response".into())),
        }
    }
}
