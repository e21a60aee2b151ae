pub mod account_query;
pub mod verification_query;
