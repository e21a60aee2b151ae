use derive_more::Into;
use thiserror::Error;

/// Optimistic concurrency counter; every persisted mutation bumps it.
#[derive(Clone, Debug, Eq, PartialEq, Hash, PartialOrd, Ord, Into, Copy)]
pub struct Version(i32);

impl Version {
    pub fn new() -> Self {
        Self(1)
    }

    pub fn next(&self) -> Self {
        Self(self.0 + 1)
    }
}

impl Default for Version {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Error, Debug, Clone)]
pub enum VersionTryFromError {
    #[error("Version must be positive")]
    NotPositive,
}

impl TryFrom<i32> for Version {
    type Error = VersionTryFromError;

    fn try_from(value: i32) -> Result<Self, Self::Error> {
        if value >= 1 {
            Ok(Self(value))
        } else {
            Err(VersionTryFromError::NotPositive)
        }
    }
}
