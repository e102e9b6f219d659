//! Profile records: the raw shape a source returns, the domain value the
//! store keeps, and the editable draft a detail view works on.

mod mapper;

use serde::{Deserialize, Serialize};

pub use mapper::{PlaceholderMapper, ProfileMapper, PLACEHOLDER_IMAGE_URL};

pub type ProfileId = u64;

/// Domain profile. Immutable value; edits produce a replacement with the
/// same `id`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Profile {
    pub id: ProfileId,
    pub name: String,
    pub age: u32,
    pub image_url: String,
}

impl Profile {
    pub fn new(
        id: ProfileId,
        name: impl Into<String>,
        age: u32,
        image_url: impl Into<String>,
    ) -> Self {
        Self {
            id,
            name: name.into(),
            age,
            image_url: image_url.into(),
        }
    }

    /// Case-insensitive substring match on the name. The empty query
    /// matches every profile.
    pub fn matches(&self, query: &str) -> bool {
        query.is_empty() || self.name.to_lowercase().contains(&query.to_lowercase())
    }

    pub fn draft(&self) -> ProfileDraft {
        ProfileDraft::from(self)
    }
}

/// A record as delivered by a profile source, before mapping.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawProfile {
    pub id: ProfileId,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

impl RawProfile {
    pub fn new(id: ProfileId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            email: None,
        }
    }

    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }
}

/// Text-field state of an edit form.
///
/// The age is kept as entered; [`ProfileDraft::into_profile`] falls back to
/// the previous age when it does not parse.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ProfileDraft {
    pub name: String,
    pub age: String,
}

impl ProfileDraft {
    pub fn new(name: impl Into<String>, age: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            age: age.into(),
        }
    }

    /// Build the edited profile. `id` and `image_url` always come from
    /// `original`.
    pub fn into_profile(self, original: &Profile) -> Profile {
        let age = self.age.trim().parse().unwrap_or(original.age);
        Profile {
            id: original.id,
            name: self.name,
            age,
            image_url: original.image_url.clone(),
        }
    }
}

impl From<&Profile> for ProfileDraft {
    fn from(profile: &Profile) -> Self {
        Self {
            name: profile.name.clone(),
            age: profile.age.to_string(),
        }
    }
}

/// Profiles whose name matches `query`, in canonical order.
pub fn filter_profiles(profiles: &[Profile], query: &str) -> Vec<Profile> {
    if query.is_empty() {
        return profiles.to_vec();
    }
    profiles
        .iter()
        .filter(|p| p.matches(query))
        .cloned()
        .collect()
}
