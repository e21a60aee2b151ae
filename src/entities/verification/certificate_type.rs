use thiserror::Error;

/// Certificate category declared by the uploader; never checked against the
/// file content.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum CertificateType {
    Degree,
    Diploma,
    Transcript,
    Certificate,
}

impl CertificateType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Degree => "DEGREE",
            Self::Diploma => "DIPLOMA",
            Self::Transcript => "TRANSCRIPT",
            Self::Certificate => "CERTIFICATE",
        }
    }
}

#[derive(Error, Debug, Clone)]
pub enum CertificateTypeTryFromError {
    #[error("Invalid certificate type: {0}")]
    Unsupported(String),
}

impl TryFrom<&str> for CertificateType {
    type Error = CertificateTypeTryFromError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "DEGREE" => Ok(Self::Degree),
            "DIPLOMA" => Ok(Self::Diploma),
            "TRANSCRIPT" => Ok(Self::Transcript),
            "CERTIFICATE" => Ok(Self::Certificate),
            _ => Err(CertificateTypeTryFromError::Unsupported(value.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_known_values() {
        for value in ["DEGREE", "DIPLOMA", "TRANSCRIPT", "CERTIFICATE"] {
            assert_eq!(CertificateType::try_from(value).unwrap().as_str(), value);
        }
    }

    #[test]
    fn rejects_unknown_values() {
        assert!(CertificateType::try_from("degree").is_err());
        assert!(CertificateType::try_from("").is_err());
    }
}
