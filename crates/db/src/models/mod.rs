//! Row models and input DTOs for the store's three tables.

pub mod address;
pub mod request;
pub mod volunteer;
