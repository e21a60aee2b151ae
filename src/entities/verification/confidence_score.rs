use derive_more::Into;
use thiserror::Error;

/// Classifier confidence on a 0-100 scale.
#[derive(Clone, Copy, Debug, PartialEq, PartialOrd, Into)]
pub struct ConfidenceScore(f64);

impl ConfidenceScore {
    pub fn value(&self) -> f64 {
        self.0
    }
}

#[derive(Error, Debug, Clone)]
pub enum ConfidenceScoreTryFromError {
    #[error("Confidence score must be a number between 0 and 100, got {0}")]
    OutOfRange(f64),
}

impl TryFrom<f64> for ConfidenceScore {
    type Error = ConfidenceScoreTryFromError;

    fn try_from(value: f64) -> Result<Self, Self::Error> {
        if value.is_finite() && (0.0..=100.0).contains(&value) {
            Ok(Self(value))
        } else {
            Err(ConfidenceScoreTryFromError::OutOfRange(value))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bounds() {
        assert!(ConfidenceScore::try_from(0.0).is_ok());
        assert!(ConfidenceScore::try_from(92.5).is_ok());
        assert!(ConfidenceScore::try_from(100.0).is_ok());
        assert!(ConfidenceScore::try_from(-0.1).is_err());
        assert!(ConfidenceScore::try_from(100.1).is_err());
        assert!(ConfidenceScore::try_from(f64::NAN).is_err());
    }
}
