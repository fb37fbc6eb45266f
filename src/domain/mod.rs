//! Domain types and rules for a booking session.
//!
//! Nothing in here performs I/O; collaborators are reached through the
//! traits in [`ports`].

pub mod cart;
pub mod lesson;
pub mod order;
pub mod ports;
pub mod preferences;
pub mod query;
pub mod validation;
