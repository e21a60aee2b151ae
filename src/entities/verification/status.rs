use std::fmt;
use thiserror::Error;

/// Lifecycle status of a verification record. Transitions only move forward:
/// PENDING -> PROCESSING -> one of the terminal states.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum VerificationStatus {
    Pending,
    Processing,
    Authentic,
    Suspicious,
    Forged,
}

impl VerificationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "PENDING",
            Self::Processing => "PROCESSING",
            Self::Authentic => "AUTHENTIC",
            Self::Suspicious => "SUSPICIOUS",
            Self::Forged => "FORGED",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Authentic | Self::Suspicious | Self::Forged)
    }

    /// Forward-only state machine.
    pub fn can_transition_to(&self, next: VerificationStatus) -> bool {
        match self {
            Self::Pending => next == Self::Processing || next.is_terminal(),
            Self::Processing => next.is_terminal(),
            _ => false,
        }
    }

    /// Maps the classifier's authenticity label onto a terminal status.
    /// Anything unrecognized counts as forged, not as an error.
    pub fn from_classifier_label(label: &str) -> Self {
        match label {
            "AUTHENTIC" => Self::Authentic,
            "SUSPICIOUS" => Self::Suspicious,
            _ => Self::Forged,
        }
    }
}

impl fmt::Display for VerificationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Error, Debug, Clone)]
pub enum VerificationStatusTryFromError {
    #[error("Unknown verification status: {0}")]
    Unknown(String),
}

impl TryFrom<&str> for VerificationStatus {
    type Error = VerificationStatusTryFromError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "PENDING" => Ok(Self::Pending),
            "PROCESSING" => Ok(Self::Processing),
            "AUTHENTIC" => Ok(Self::Authentic),
            "SUSPICIOUS" => Ok(Self::Suspicious),
            "FORGED" => Ok(Self::Forged),
            _ => Err(VerificationStatusTryFromError::Unknown(value.to_string())),
        }
    }
}
