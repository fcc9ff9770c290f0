//! Core types and rules for the Secret Santa coordinator.
//!
//! Nothing here touches HTTP or a database. The crate holds the assignment
//! engine, the group lifecycle state machine and the [`store::GroupStore`]
//! abstraction that persistence backends implement.

pub mod draw;
pub mod error;
pub mod group;
pub mod lifecycle;
pub mod participant;
pub mod store;
pub mod tenant;

pub use error::{Error, Result};
