mod classifier_impl;
mod file_store_impl;
mod notifier_impl;
mod users_repository_impl;
mod verifications_repository_impl;

pub use classifier_impl::HttpClassifier;
pub use file_store_impl::DiskFileStore;
pub use notifier_impl::LogNotifier;
pub use users_repository_impl::UsersRepositoryImpl;
pub use verifications_repository_impl::VerificationsRepositoryImpl;
