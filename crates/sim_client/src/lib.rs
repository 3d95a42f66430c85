//! # Sim Client
//!
//! Simulation backend access layer.
//!
//! Responsibilities:
//! - Define the `SimClient` trait (the backend surface used during replay)
//! - Establish the backend connection with a bounded timeout
//! - Provide a deterministic `MockSimClient` for tests and offline runs
//!
//! The wire transport of a real backend is provided by implementors of
//! `SimClient`; nothing in this crate depends on one.

pub mod client;
pub mod error;
pub mod mock_client;

pub use client::{connect, SimClient};
pub use error::{Result, SimClientError};
pub use mock_client::{MockCall, MockConfig, MockSimClient};
