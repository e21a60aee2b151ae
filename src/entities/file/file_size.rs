use derive_more::Into;
use thiserror::Error;

// 10 MB
const MAX_FILE_SIZE: i64 = 10 * 1024 * 1024;

#[derive(Error, Debug, Clone)]
pub enum FileSizeTryFromError {
    #[error("File size must be non-negative")]
    NegativeSize,
    #[error("File size exceeds the 10 MB limit")]
    TooLarge,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, PartialOrd, Ord, Into)]
pub struct FileSize(i64);

impl TryFrom<i64> for FileSize {
    type Error = FileSizeTryFromError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        if value < 0 {
            Err(FileSizeTryFromError::NegativeSize)
        } else if value > MAX_FILE_SIZE {
            Err(FileSizeTryFromError::TooLarge)
        } else {
            Ok(Self(value))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bounds() {
        assert!(FileSize::try_from(0).is_ok());
        assert!(FileSize::try_from(MAX_FILE_SIZE).is_ok());
        assert!(FileSize::try_from(MAX_FILE_SIZE + 1).is_err());
        assert!(FileSize::try_from(-1).is_err());
    }
}
