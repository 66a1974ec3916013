//! Home Assistant REST API client
//!
//! The customizer only needs one request: `GET /api/states`. The
//! [`StateSource`] trait is the seam the pipeline depends on, so tests can
//! substitute a fixed entity list for the live hub.

mod client;
mod error;

pub use client::{HaClient, StateSource};
pub use error::{ClientError, ClientResult};
