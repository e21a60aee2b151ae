use thiserror::Error;

/// MIME type accepted for certificate uploads.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MimeType {
    value: String,
    extension: String,
}

impl MimeType {
    pub fn value(&self) -> &str {
        &self.value
    }

    pub fn extension(&self) -> &str {
        &self.extension
    }
}

#[derive(Error, Debug, Clone)]
pub enum MimeTypeTryFromError {
    #[error("Invalid file type. Only JPG, PNG, and PDF are allowed.")]
    Unsupported(String),
}

impl TryFrom<String> for MimeType {
    type Error = MimeTypeTryFromError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        match value.as_str() {
            "image/jpeg" | "image/jpg" => Ok(Self {
                value,
                extension: "jpg".to_string(),
            }),
            "image/png" => Ok(Self {
                value,
                extension: "png".to_string(),
            }),
            "application/pdf" => Ok(Self {
                value,
                extension: "pdf".to_string(),
            }),
            _ => Err(MimeTypeTryFromError::Unsupported(value)),
        }
    }
}
