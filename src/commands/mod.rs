pub mod account_command;
pub mod verification_command;
