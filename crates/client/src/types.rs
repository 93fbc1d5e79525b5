//! Wire types shared by the backend endpoints.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Every backend response wraps its payload in `{ "data": ... }`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiEnvelope<T> {
    pub data: T,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// Which endpoint answers donation status lookups.
///
/// The backend exposes two paths that both report a numeric status for a
/// donation id. `Notification` is the dedicated one; `ProgramDonations` is the
/// program-detail path older web front-ends used for the lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum StatusEndpoint {
    #[default]
    Notification,
    ProgramDonations,
}

impl StatusEndpoint {
    /// Path below `/api/v1` for the given donation id.
    pub fn path(&self, donation_id: &str) -> String {
        let id = urlencoding::encode(donation_id);
        match self {
            StatusEndpoint::Notification => format!("/donations-notifikasi-id/{}", id),
            StatusEndpoint::ProgramDonations => format!("/program-donations/{}", id),
        }
    }
}

impl fmt::Display for StatusEndpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StatusEndpoint::Notification => f.write_str("notification"),
            StatusEndpoint::ProgramDonations => f.write_str("program-donations"),
        }
    }
}

impl FromStr for StatusEndpoint {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "notification" | "notifikasi" => Ok(StatusEndpoint::Notification),
            "program-donations" | "program_donations" => Ok(StatusEndpoint::ProgramDonations),
            other => Err(format!("unknown status endpoint '{}'", other)),
        }
    }
}
