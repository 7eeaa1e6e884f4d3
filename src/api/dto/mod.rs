pub mod identity;
pub mod login;
