use super::{FileSize, MimeType};

/// Metadata of a stored upload, handed to the pipeline at intake.
#[derive(Clone, Debug)]
pub struct Upload {
    /// Name the uploader gave the file.
    pub file_name: String,
    /// Where the file store put the payload.
    pub file_path: String,
    pub size: FileSize,
    pub mime_type: MimeType,
}
