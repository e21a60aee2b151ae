mod file;
mod one_time_code;
mod page;
mod user;
mod user_id;
mod verification;
mod version;

pub use file::*;
pub use one_time_code::OneTimeCode;
pub use page::{PageRequest, PageRequestError};
pub use user::{User, UserRole, UserRoleTryFromError};
pub use user_id::UserId;
pub use verification::*;
pub use version::{Version, VersionTryFromError};
