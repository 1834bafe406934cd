//! Database layer for guestloop.
//!
//! Row models and queries for the tables the feedback subsystem reads and
//! writes. The schema itself is owned by the platform; this crate only
//! assumes the columns it selects.

pub mod error;
pub mod models;
pub mod pool;

pub use error::DbError;
pub use models::*;
pub use pool::{connect, DEFAULT_ACQUIRE_TIMEOUT_SECS, DEFAULT_MAX_CONNECTIONS};
