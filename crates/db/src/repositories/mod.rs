//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async methods that
//! accept `&DbPool` as the first argument.

pub mod address_repo;
pub mod request_repo;
pub mod volunteer_repo;

pub use address_repo::AddressRepo;
pub use request_repo::RequestRepo;
pub use volunteer_repo::VolunteerRepo;
