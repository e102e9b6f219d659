use super::{Profile, RawProfile};

pub const PLACEHOLDER_IMAGE_URL: &str = "https://via.placeholder.com/50";

/// Pure mapping from a source record to a domain profile.
///
/// Implementations must be deterministic: the store may map the same
/// record more than once and expects identical output.
pub trait ProfileMapper: Send + Sync {
    fn map(&self, raw: &RawProfile) -> Profile;
}

impl<F> ProfileMapper for F
where
    F: Fn(&RawProfile) -> Profile + Send + Sync,
{
    fn map(&self, raw: &RawProfile) -> Profile {
        self(raw)
    }
}

/// Synthesises the fields the profile service does not provide: the age is
/// `base_age + id` and every profile shares one placeholder image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlaceholderMapper {
    pub base_age: u32,
    pub image_url: String,
}

impl Default for PlaceholderMapper {
    fn default() -> Self {
        Self {
            base_age: 20,
            image_url: PLACEHOLDER_IMAGE_URL.to_string(),
        }
    }
}

impl ProfileMapper for PlaceholderMapper {
    fn map(&self, raw: &RawProfile) -> Profile {
        let offset = u32::try_from(raw.id).unwrap_or(u32::MAX);
        Profile {
            id: raw.id,
            name: raw.name.clone(),
            age: self.base_age.saturating_add(offset),
            image_url: self.image_url.clone(),
        }
    }
}
