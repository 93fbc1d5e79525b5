//! Donasi Core - Domain models, workflow state machines, and traits.
//!
//! This crate contains the donation intake and payment tracking logic of the
//! Donasi client. It is transport-agnostic and defines traits that are
//! implemented by the `donasi-client` crate, plus a storage seam implemented
//! by whichever medium the front-end persists to.

pub mod constants;
pub mod donations;
pub mod errors;
pub mod session;
pub mod status;
pub mod storage;
pub mod utils;

// Re-export error types
pub use errors::Error;
pub use errors::Result;
