//! Field rules for the donation intake form.

use std::sync::OnceLock;

use regex::Regex;

use super::donations_model::{DonationDraft, DonationField, FieldErrors, ValidatedDonation};
use crate::constants::{
    DEFAULT_DONOR_NAME, MIN_ADDRESS_LENGTH, MIN_DONATION_AMOUNT, MIN_NAME_LENGTH,
    MIN_PHONE_DIGITS,
};

static EMAIL_PATTERN: OnceLock<Regex> = OnceLock::new();

fn email_pattern() -> &'static Regex {
    EMAIL_PATTERN.get_or_init(|| {
        Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email pattern is a valid regex")
    })
}

/// Format a rupiah amount with dot thousands separators, e.g. `Rp 10.000`.
pub fn format_rupiah(amount: u64) -> String {
    let digits = amount.to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push('.');
        }
        grouped.push(ch);
    }
    format!("Rp {}", grouped)
}

fn validate_name(draft: &DonationDraft) -> Result<String, String> {
    if draft.use_default_name {
        return Ok(DEFAULT_DONOR_NAME.to_string());
    }
    let name = draft.name.trim();
    if name.is_empty() {
        return Err("Nama wajib diisi".to_string());
    }
    if name.chars().count() < MIN_NAME_LENGTH {
        return Err(format!("Nama minimal {} karakter", MIN_NAME_LENGTH));
    }
    Ok(name.to_string())
}

fn validate_address(value: &str) -> Result<String, String> {
    let address = value.trim();
    if address.is_empty() {
        return Err("Alamat wajib diisi".to_string());
    }
    if address.chars().count() < MIN_ADDRESS_LENGTH {
        return Err(format!("Alamat minimal {} karakter", MIN_ADDRESS_LENGTH));
    }
    Ok(address.to_string())
}

/// Phone numbers are checked untrimmed: any non-digit blocks submission.
fn validate_phone(value: &str) -> Result<String, String> {
    if value.trim().is_empty() {
        return Err("Nomor WhatsApp wajib diisi".to_string());
    }
    if !value.chars().all(|c| c.is_ascii_digit()) {
        return Err("Nomor WhatsApp hanya boleh berisi angka".to_string());
    }
    if value.len() < MIN_PHONE_DIGITS {
        return Err(format!("Nomor WhatsApp minimal {} digit", MIN_PHONE_DIGITS));
    }
    Ok(value.to_string())
}

fn validate_email(value: &str) -> Result<String, String> {
    let email = value.trim();
    if email.is_empty() {
        return Err("Email wajib diisi".to_string());
    }
    if !email_pattern().is_match(email) {
        return Err("Format email tidak valid".to_string());
    }
    Ok(email.to_string())
}

/// Amounts are whole rupiah; there are no decimal subunits.
pub fn parse_amount(value: &str) -> Result<u64, String> {
    let raw = value.trim();
    if raw.is_empty() {
        return Err("Nominal donasi wajib diisi".to_string());
    }
    if !raw.chars().all(|c| c.is_ascii_digit()) {
        return Err("Nominal donasi harus berupa angka bulat".to_string());
    }
    let amount: u64 = raw
        .parse()
        .map_err(|_| "Nominal donasi terlalu besar".to_string())?;
    if amount < MIN_DONATION_AMOUNT {
        return Err(format!(
            "Minimal donasi adalah {}",
            format_rupiah(MIN_DONATION_AMOUNT)
        ));
    }
    Ok(amount)
}

fn validate_message(value: &str) -> Result<String, String> {
    let message = value.trim();
    if message.is_empty() {
        return Err("Pesan wajib diisi".to_string());
    }
    Ok(message.to_string())
}

/// Validate a single field, returning its error message if it fails.
pub fn validate_field(draft: &DonationDraft, field: DonationField) -> Option<String> {
    let result = match field {
        DonationField::Name => validate_name(draft).map(|_| ()),
        DonationField::Address => validate_address(&draft.address).map(|_| ()),
        DonationField::PhoneNumber => validate_phone(&draft.no_wa).map(|_| ()),
        DonationField::Email => validate_email(&draft.email).map(|_| ()),
        DonationField::Amount => parse_amount(&draft.amount).map(|_| ()),
        DonationField::Message => validate_message(&draft.message).map(|_| ()),
    };
    result.err()
}

/// Validate every field of a draft.
///
/// Returns the frozen donation when all rules pass, otherwise every failing
/// field with its message.
pub fn validate_draft(draft: &DonationDraft) -> Result<ValidatedDonation, FieldErrors> {
    let mut errors = FieldErrors::new();

    let name = validate_name(draft)
        .map_err(|e| errors.insert(DonationField::Name, e))
        .ok();
    let address = validate_address(&draft.address)
        .map_err(|e| errors.insert(DonationField::Address, e))
        .ok();
    let no_wa = validate_phone(&draft.no_wa)
        .map_err(|e| errors.insert(DonationField::PhoneNumber, e))
        .ok();
    let email = validate_email(&draft.email)
        .map_err(|e| errors.insert(DonationField::Email, e))
        .ok();
    let amount = parse_amount(&draft.amount)
        .map_err(|e| errors.insert(DonationField::Amount, e))
        .ok();
    let message = validate_message(&draft.message)
        .map_err(|e| errors.insert(DonationField::Message, e))
        .ok();

    match (name, address, no_wa, email, amount, message) {
        (Some(name), Some(address), Some(no_wa), Some(email), Some(amount), Some(message))
            if errors.is_empty() =>
        {
            Ok(ValidatedDonation {
                name,
                address,
                no_wa,
                email,
                amount,
                message,
                program_id: draft
                    .program_id
                    .as_deref()
                    .map(str::trim)
                    .filter(|id| !id.is_empty())
                    .map(str::to_string),
            })
        }
        _ => Err(errors),
    }
}
