mod classifier;
mod common;
mod file_store;
mod notifier;
mod users_repository;
mod verifications_repository;

pub use classifier::*;
pub use common::*;
pub use file_store::*;
pub use notifier::*;
pub use users_repository::*;
pub use verifications_repository::*;
