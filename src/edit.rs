//! Typed hand-off of a profile to a detail view and back.
//!
//! The list side opens a session with [`ProfileStore::begin_edit`], gives
//! the [`EditRequest`] half to the detail view and awaits the
//! [`EditReceipt`] half. The detail view either submits an edited profile
//! or cancels; dropping the request counts as cancelling.
//!
//! ```
//! use profile_store::{InMemoryProfileSource, ProfileDraft, ProfileStore, RawProfile};
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() {
//! let store = ProfileStore::new(InMemoryProfileSource::with_profiles(vec![
//!     RawProfile::new(1, "Alice"),
//! ]));
//! store.load().outcome().await;
//!
//! let (request, receipt) = store.begin_edit(1).unwrap().split();
//! request.submit_draft(ProfileDraft::new("Alicia", "33"));
//!
//! let applied = receipt.apply_to(&store).await.unwrap();
//! assert_eq!(store.get_by_id(1), Some(applied));
//! # }
//! ```

use tokio::sync::oneshot;

use crate::profile::{Profile, ProfileDraft, ProfileId};
use crate::store::ProfileStore;

/// Both halves of an open edit.
#[derive(Debug)]
pub struct EditSession {
    request: EditRequest,
    receipt: EditReceipt,
}

impl EditSession {
    pub fn new(profile: Profile) -> Self {
        let (reply, rx) = oneshot::channel();
        let id = profile.id;
        Self {
            request: EditRequest { profile, reply },
            receipt: EditReceipt { id, rx },
        }
    }

    pub fn profile(&self) -> &Profile {
        &self.request.profile
    }

    pub fn split(self) -> (EditRequest, EditReceipt) {
        (self.request, self.receipt)
    }
}

/// The detail view's half: the profile being edited, by value.
#[derive(Debug)]
pub struct EditRequest {
    profile: Profile,
    reply: oneshot::Sender<Option<Profile>>,
}

impl EditRequest {
    pub fn profile(&self) -> &Profile {
        &self.profile
    }

    pub fn draft(&self) -> ProfileDraft {
        self.profile.draft()
    }

    /// Return an edited profile. Its id is forced to the original one.
    pub fn submit(self, edited: Profile) {
        let edited = Profile {
            id: self.profile.id,
            ..edited
        };
        // The receipt may already be gone; nobody is waiting then.
        let _ = self.reply.send(Some(edited));
    }

    pub fn submit_draft(self, draft: ProfileDraft) {
        let edited = draft.into_profile(&self.profile);
        let _ = self.reply.send(Some(edited));
    }

    pub fn cancel(self) {
        let _ = self.reply.send(None);
    }
}

/// The list side's half: resolves to the edit result.
#[derive(Debug)]
pub struct EditReceipt {
    id: ProfileId,
    rx: oneshot::Receiver<Option<Profile>>,
}

impl EditReceipt {
    pub fn id(&self) -> ProfileId {
        self.id
    }

    /// `None` when the edit was cancelled or the request dropped.
    pub async fn outcome(self) -> Option<Profile> {
        self.rx.await.ok().flatten()
    }

    /// Wait for the result and apply it to `store`. Returns the profile
    /// that was applied, or `None` if nothing changed.
    pub async fn apply_to(self, store: &ProfileStore) -> Option<Profile> {
        let edited = self.outcome().await?;
        store.apply_edit(edited.clone()).then_some(edited)
    }
}
