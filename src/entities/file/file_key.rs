use super::MimeType;
use chrono::{DateTime, Utc};
use derive_more::Into;
use ulid::Ulid;

/// Storage name for an uploaded document, unique per upload.
#[derive(Clone, Debug, Eq, PartialEq, Hash, PartialOrd, Ord, Into)]
pub struct FileKey(String);

impl FileKey {
    pub fn generate(now: DateTime<Utc>, mime_type: &MimeType) -> Self {
        let key = format!("{}.{}", Ulid::from_datetime(now.into()), mime_type.extension());
        Self(key)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}
