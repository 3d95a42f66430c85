//! # Contracts
//!
//! Frozen interface contracts shared by every crate in the workspace: the
//! replay configuration, geometry primitives, the record-log model and the
//! DTOs exchanged with the simulation backend.
//! All business crates can only depend on this crate, reverse dependencies are prohibited.
//!
//! ## Time Model
//! - `log_time`: position of a record in the log (seconds, f64)
//! - `stamp`: header timestamp carried inside a message (seconds, f64)
//! - Backend-native sensor timestamps are opaque `u64` values used only for
//!   duplicate suppression and never written to the output log

mod backend;
mod blueprint;
mod error;
mod geometry;
mod record;
mod sample;
mod sink;

pub use backend::*;
pub use blueprint::*;
pub use error::*;
pub use geometry::*;
pub use record::*;
pub use sample::*;
pub use sink::*;
