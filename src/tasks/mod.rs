//! Background Tasks Module
//!
//! Contains background tasks that run periodically during operation.
//!
//! # Tasks
//! - Janitor: sweeps expired entries out of every tier and, on a slower
//!   cadence, relieves aggregate memory pressure

mod janitor;

pub use janitor::{spawn_janitor, JanitorHandle};
