//! Donations module - domain models, validation, the intake form and API traits.

mod donations_form;
mod donations_model;
mod donations_traits;
mod donations_validation;
mod return_url;

#[cfg(test)]
mod donations_form_tests;

pub use donations_form::{
    confirmation_summary, DonationForm, FormState, PaymentOutcome, PaymentStep,
    SubmittedDonation, PAYMENT_INSTRUCTIONS,
};
pub use donations_model::{
    DonationDraft, DonationField, DonationRecord, DonationStatusRecord, DonationSubmission,
    FieldErrors, ProgramSummary, ValidatedDonation,
};
pub use donations_traits::{DonationApiTrait, ProgramApiTrait};
pub use donations_validation::{format_rupiah, parse_amount, validate_draft, validate_field};
pub use return_url::{build_return_url, is_payment_return};
