pub mod account;
pub mod identity;
pub mod patient;
pub mod provider;
pub mod screening;
