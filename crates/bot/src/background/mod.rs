//! Long-running background tasks.

pub mod retention;
