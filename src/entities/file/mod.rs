mod file_key;
mod file_size;
mod mime_type;
mod upload;

pub use file_key::FileKey;
pub use file_size::{FileSize, FileSizeTryFromError};
pub use mime_type::{MimeType, MimeTypeTryFromError};
pub use upload::Upload;
