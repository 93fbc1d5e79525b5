//! Donasi Client - HTTP access to the donation backend.
//!
//! This crate provides the API client for the backend REST API (`/api/v1`)
//! and implements the `donasi-core` API traits on top of it. All failures are
//! normalized into `donasi_core::errors::ApiError` at this boundary.
//!
//! # Usage
//!
//! ```rust,ignore
//! use donasi_client::DonasiApiClient;
//!
//! let client = DonasiApiClient::new("https://api.panti.example.org")?;
//! let programs = client.list_programs().await?;
//! ```

mod client;
mod error;
mod normalize;
mod types;

pub use client::DonasiApiClient;
pub use error::{ClientError, Result};
pub use normalize::{extract_message, normalize_client_error, normalize_error_body};
pub use types::*;
