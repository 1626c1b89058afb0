//! Native client for the realtime chat backend.
//!
//! The library holds everything that is not drawing pixels: the wire model,
//! the shared real-time connection, the HTTP API wrapper, the per-view
//! reconcilers that merge snapshots with push events, and session storage.

pub mod common;
pub mod config;
pub mod error;
pub mod network;
pub mod reconcile;
pub mod storage;
pub mod timestamp;

pub use error::{ClientError, Result};
