//! Domain types for grocery request coordination.
//!
//! Everything in this crate is free of I/O: identifiers, the request
//! status state machine, the coordinator set, the error vocabulary shared
//! by the store and the lifecycle controller, and the budget heuristic.

pub mod budget;
pub mod error;
pub mod roles;
pub mod status;
pub mod types;
