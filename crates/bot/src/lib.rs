//! Grocery request coordination bot.
//!
//! Families' requests are created by coordinators, translated, posted to
//! the volunteer group, claimed by exactly one volunteer and marked
//! delivered. The [`lifecycle`] module holds the business rules; everything
//! else is Telegram glue around it.

pub mod background;
pub mod commands;
pub mod config;
pub mod dispatch;
pub mod error;
pub mod format;
pub mod lifecycle;
pub mod notify;
pub mod polling;
pub mod routes;
pub mod state;
pub mod telegram;
