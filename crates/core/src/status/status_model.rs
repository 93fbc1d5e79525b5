//! Payment status taxonomy and the view derived from a status lookup.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::donations::DonationStatusRecord;

/// Display status of a donation payment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    Pending,
    Success,
    Failed,
    /// No tracked donation, or a code the backend does not document.
    Unknown,
    /// The status lookup itself failed. Never a payment outcome.
    Error,
}

impl PaymentStatus {
    /// Map the backend's numeric status code.
    pub fn from_code(code: i64) -> Self {
        match code {
            0 => PaymentStatus::Pending,
            1 => PaymentStatus::Success,
            2 => PaymentStatus::Failed,
            _ => PaymentStatus::Unknown,
        }
    }

    /// Success and failure end the tracking of a donation.
    pub fn is_terminal(&self) -> bool {
        matches!(self, PaymentStatus::Success | PaymentStatus::Failed)
    }

    pub fn is_pending(&self) -> bool {
        *self == PaymentStatus::Pending
    }

    pub fn label(&self) -> &'static str {
        match self {
            PaymentStatus::Pending => "Menunggu pembayaran",
            PaymentStatus::Success => "Donasi berhasil",
            PaymentStatus::Failed => "Pembayaran gagal",
            PaymentStatus::Unknown => "Status tidak diketahui",
            PaymentStatus::Error => "Gagal memeriksa status",
        }
    }
}

/// An action offered on the status page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StatusAction {
    ReturnHome,
    /// Back to the intake flow after a failed payment.
    Retry,
}

impl StatusAction {
    pub fn route(&self) -> &'static str {
        match self {
            StatusAction::ReturnHome => "/",
            StatusAction::Retry => "/donasi",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            StatusAction::ReturnHome => "Kembali ke beranda",
            StatusAction::Retry => "Coba lagi",
        }
    }
}

/// Result of resolving the tracked donation's status.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentStatusView {
    pub status: PaymentStatus,
    pub donation_id: Option<String>,
    /// Raw backend code, when the lookup succeeded.
    pub code: Option<i64>,
    pub amount: Option<u64>,
    pub program_title: Option<String>,
    /// Failure message for [`PaymentStatus::Error`].
    pub error: Option<String>,
    pub checked_at: DateTime<Utc>,
}

impl PaymentStatusView {
    /// Nothing is being tracked.
    pub fn unknown() -> Self {
        Self {
            status: PaymentStatus::Unknown,
            donation_id: None,
            code: None,
            amount: None,
            program_title: None,
            error: None,
            checked_at: Utc::now(),
        }
    }

    pub fn from_record(donation_id: &str, record: &DonationStatusRecord) -> Self {
        Self {
            status: record
                .status
                .map_or(PaymentStatus::Unknown, PaymentStatus::from_code),
            donation_id: Some(donation_id.to_string()),
            code: record.status,
            amount: record.amount,
            program_title: record.program_title.clone(),
            error: None,
            checked_at: Utc::now(),
        }
    }

    pub fn error(donation_id: Option<&str>, message: impl Into<String>) -> Self {
        Self {
            status: PaymentStatus::Error,
            donation_id: donation_id.map(str::to_string),
            code: None,
            amount: None,
            program_title: None,
            error: Some(message.into()),
            checked_at: Utc::now(),
        }
    }

    /// Actions to offer for this status. Returning home is always possible.
    pub fn actions(&self) -> Vec<StatusAction> {
        match self.status {
            PaymentStatus::Failed => vec![StatusAction::Retry, StatusAction::ReturnHome],
            _ => vec![StatusAction::ReturnHome],
        }
    }
}
