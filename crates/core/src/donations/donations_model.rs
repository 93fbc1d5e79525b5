//! Donation domain models.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::utils::serde_utils::{
    opt_lenient_i64, opt_lenient_u64, opt_string_or_number, string_or_number,
};

/// A form field subject to validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DonationField {
    Name,
    Address,
    #[serde(rename = "no_wa")]
    PhoneNumber,
    Email,
    Amount,
    Message,
}

impl DonationField {
    pub const ALL: [DonationField; 6] = [
        DonationField::Name,
        DonationField::Address,
        DonationField::PhoneNumber,
        DonationField::Email,
        DonationField::Amount,
        DonationField::Message,
    ];

    /// Name of the field on the wire.
    pub fn as_str(&self) -> &'static str {
        match self {
            DonationField::Name => "name",
            DonationField::Address => "address",
            DonationField::PhoneNumber => "no_wa",
            DonationField::Email => "email",
            DonationField::Amount => "amount",
            DonationField::Message => "message",
        }
    }
}

impl fmt::Display for DonationField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Per-field validation messages, ordered by field.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldErrors(BTreeMap<DonationField, String>);

impl FieldErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, field: DonationField, message: impl Into<String>) {
        self.0.insert(field, message.into());
    }

    pub fn get(&self, field: DonationField) -> Option<&str> {
        self.0.get(&field).map(String::as_str)
    }

    pub fn contains(&self, field: DonationField) -> bool {
        self.0.contains_key(&field)
    }

    pub fn remove(&mut self, field: DonationField) {
        self.0.remove(&field);
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (DonationField, &str)> {
        self.0.iter().map(|(field, message)| (*field, message.as_str()))
    }
}

impl fmt::Display for FieldErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self
            .iter()
            .map(|(field, message)| format!("{}: {}", field, message))
            .collect();
        f.write_str(&parts.join("; "))
    }
}

/// Donor-entered values as typed, before validation.
///
/// The amount is kept as entered so that non-numeric input can be reported
/// as a field error instead of being rejected at the type level.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DonationDraft {
    pub name: String,
    pub address: String,
    pub no_wa: String,
    pub email: String,
    pub amount: String,
    pub message: String,
    pub program_id: Option<String>,
    pub use_default_name: bool,
}

impl DonationDraft {
    pub fn field(&self, field: DonationField) -> &str {
        match field {
            DonationField::Name => &self.name,
            DonationField::Address => &self.address,
            DonationField::PhoneNumber => &self.no_wa,
            DonationField::Email => &self.email,
            DonationField::Amount => &self.amount,
            DonationField::Message => &self.message,
        }
    }

    pub(crate) fn field_mut(&mut self, field: DonationField) -> &mut String {
        match field {
            DonationField::Name => &mut self.name,
            DonationField::Address => &mut self.address,
            DonationField::PhoneNumber => &mut self.no_wa,
            DonationField::Email => &mut self.email,
            DonationField::Amount => &mut self.amount,
            DonationField::Message => &mut self.message,
        }
    }
}

/// Donor input that passed validation, frozen for confirmation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidatedDonation {
    pub name: String,
    pub address: String,
    pub no_wa: String,
    pub email: String,
    pub amount: u64,
    pub message: String,
    pub program_id: Option<String>,
}

/// Payload sent to `POST /donations`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DonationSubmission {
    pub donation: ValidatedDonation,
    pub return_url: Option<String>,
}

impl DonationSubmission {
    /// Multipart fields in wire order.
    ///
    /// `program_id` is left out entirely when absent or blank.
    pub fn form_fields(&self) -> Vec<(&'static str, String)> {
        let donation = &self.donation;
        let mut fields = vec![
            ("name", donation.name.clone()),
            ("address", donation.address.clone()),
            ("no_wa", donation.no_wa.clone()),
            ("email", donation.email.clone()),
            ("amount", donation.amount.to_string()),
            ("message", donation.message.clone()),
        ];
        if let Some(program_id) = donation
            .program_id
            .as_deref()
            .map(str::trim)
            .filter(|id| !id.is_empty())
        {
            fields.push(("program_id", program_id.to_string()));
        }
        if let Some(return_url) = self.return_url.as_deref().filter(|url| !url.is_empty()) {
            fields.push(("return_url", return_url.to_string()));
        }
        fields
    }
}

/// Server projection of a created donation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DonationRecord {
    /// Missing when the server accepted the request but did not create a record.
    #[serde(default, deserialize_with = "opt_string_or_number")]
    pub id: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "opt_lenient_u64")]
    pub amount: Option<u64>,
    #[serde(default)]
    pub snap_url: Option<String>,
    #[serde(default, deserialize_with = "opt_lenient_i64")]
    pub status: Option<i64>,
    #[serde(default, deserialize_with = "opt_string_or_number")]
    pub program_id: Option<String>,
}

impl DonationRecord {
    /// Server-assigned identifier, ignoring blank values.
    pub fn donation_id(&self) -> Option<&str> {
        self.id.as_deref().map(str::trim).filter(|id| !id.is_empty())
    }

    /// Hosted payment page, if the server opened a payment session.
    pub fn payment_url(&self) -> Option<&str> {
        self.snap_url
            .as_deref()
            .map(str::trim)
            .filter(|url| !url.is_empty())
    }
}

/// Server projection returned by the status lookup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DonationStatusRecord {
    #[serde(deserialize_with = "string_or_number")]
    pub id: String,
    #[serde(default, deserialize_with = "opt_lenient_u64")]
    pub amount: Option<u64>,
    /// `None` when the code is missing or not a whole number.
    #[serde(default, deserialize_with = "opt_lenient_i64")]
    pub status: Option<i64>,
    #[serde(default)]
    pub program_title: Option<String>,
}

/// Summary of a donation program, used to pre-fill the intake form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgramSummary {
    #[serde(deserialize_with = "string_or_number")]
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default, deserialize_with = "opt_lenient_u64")]
    pub target_amount: Option<u64>,
    #[serde(default, deserialize_with = "opt_lenient_u64")]
    pub collected_amount: Option<u64>,
}
