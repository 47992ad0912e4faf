pub mod error;
pub mod failure;
pub mod response;
pub mod validation;
