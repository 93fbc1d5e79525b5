//! Donation intake form state machine.
//!
//! `Editing → Confirming → Submitting → Submitted`, with `Confirming → Editing`
//! on cancel, `Submitting → Editing` on a failed or abandoned submission and
//! `Submitted → Editing` when the donor starts over. Nothing in this
//! module touches the network directly; [`DonationForm::submit`] drives an
//! injected [`DonationApiTrait`].

use chrono::{DateTime, Utc};
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};

use super::donations_model::{
    DonationDraft, DonationField, DonationRecord, DonationSubmission, FieldErrors,
    ProgramSummary, ValidatedDonation,
};
use super::donations_traits::DonationApiTrait;
use super::donations_validation::{format_rupiah, validate_draft};
use super::return_url::build_return_url;
use crate::constants::{DEFAULT_DONOR_NAME, GENERIC_SUBMISSION_ERROR};
use crate::errors::{Error, Result};
use crate::storage::CurrentDonationSlot;

/// Steps shown to the donor before leaving for the hosted payment page.
pub const PAYMENT_INSTRUCTIONS: &[&str] = &[
    "Anda akan diarahkan ke halaman pembayaran mitra kami.",
    "Pilih metode pembayaran dan selesaikan transaksi sebelum batas waktu.",
    "Setelah membayar, Anda akan kembali ke halaman status donasi secara otomatis.",
    "Simpan bukti pembayaran sampai status donasi dinyatakan berhasil.",
];

/// What happens after the backend accepted a donation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentOutcome {
    /// A hosted payment session was opened; the donor still has to pay.
    AwaitingPayment { payment_url: String },
    /// No payment session; the flow ends with a thank-you.
    ThankYou,
}

/// A donation the backend accepted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmittedDonation {
    pub donation_id: String,
    pub record: DonationRecord,
    pub donation: ValidatedDonation,
    pub outcome: PaymentOutcome,
    pub submitted_at: DateTime<Utc>,
}

/// Current step of the intake form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormState {
    /// Fields are editable. Carries the last submission error, if any.
    Editing { error: Option<String> },
    /// Input passed validation and is shown back for confirmation.
    Confirming { donation: ValidatedDonation },
    /// The payload is on its way to the backend.
    Submitting { submission: DonationSubmission },
    Submitted(SubmittedDonation),
}

impl FormState {
    pub fn name(&self) -> &'static str {
        match self {
            FormState::Editing { .. } => "editing",
            FormState::Confirming { .. } => "confirming",
            FormState::Submitting { .. } => "submitting",
            FormState::Submitted(_) => "submitted",
        }
    }
}

/// Result of the "proceed to payment" action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PaymentStep {
    /// Show these instructions first; ask again to leave for the payment page.
    Instructions(&'static [&'static str]),
    /// Navigate the donor to this external URL.
    Redirect(String),
}

/// Read-back of a validated donation for the confirmation step.
pub fn confirmation_summary(
    donation: &ValidatedDonation,
    program: Option<&ProgramSummary>,
) -> Vec<(&'static str, String)> {
    let program_label = match (program, donation.program_id.as_deref()) {
        (Some(program), _) => program.title.clone(),
        (None, Some(id)) => format!("Program #{}", id),
        (None, None) => "Donasi umum".to_string(),
    };
    vec![
        ("Nama", donation.name.clone()),
        ("Alamat", donation.address.clone()),
        ("No. WhatsApp", donation.no_wa.clone()),
        ("Email", donation.email.clone()),
        ("Nominal", format_rupiah(donation.amount)),
        ("Pesan", donation.message.clone()),
        ("Program", program_label),
    ]
}

/// Message shown next to the submit action after a failed submission.
fn submission_message(err: &Error) -> String {
    match err {
        Error::Api(api) if !api.message.trim().is_empty() => api.message.clone(),
        _ => GENERIC_SUBMISSION_ERROR.to_string(),
    }
}

/// Intake form for a single donation.
#[derive(Debug, Clone)]
pub struct DonationForm {
    draft: DonationDraft,
    program: Option<ProgramSummary>,
    field_errors: FieldErrors,
    state: FormState,
    instructions_shown: bool,
}

impl DonationForm {
    /// Create a form, optionally pre-filled and bound to a program.
    ///
    /// An explicit `program_id` takes precedence over one in the pre-fill.
    pub fn new(prefill: Option<DonationDraft>, program_id: Option<String>) -> Self {
        let mut draft = prefill.unwrap_or_default();
        if program_id.is_some() {
            draft.program_id = program_id;
        }
        if draft.use_default_name {
            draft.name = DEFAULT_DONOR_NAME.to_string();
        }
        Self {
            draft,
            program: None,
            field_errors: FieldErrors::new(),
            state: FormState::Editing { error: None },
            instructions_shown: false,
        }
    }

    /// Attach an already fetched program summary so it need not be looked up again.
    pub fn with_program(mut self, program: ProgramSummary) -> Self {
        if self.draft.program_id.is_none() {
            self.draft.program_id = Some(program.id.clone());
        }
        self.program = Some(program);
        self
    }

    pub fn draft(&self) -> &DonationDraft {
        &self.draft
    }

    pub fn program(&self) -> Option<&ProgramSummary> {
        self.program.as_ref()
    }

    pub fn state(&self) -> &FormState {
        &self.state
    }

    pub fn field_errors(&self) -> &FieldErrors {
        &self.field_errors
    }

    /// Error from the last failed submission, if the form is back in editing.
    pub fn submission_error(&self) -> Option<&str> {
        match &self.state {
            FormState::Editing { error } => error.as_deref(),
            _ => None,
        }
    }

    /// Whether the name input is locked to the default donor name.
    pub fn is_name_locked(&self) -> bool {
        self.draft.use_default_name
    }

    fn ensure_editing(&self, action: &str) -> Result<()> {
        match self.state {
            FormState::Editing { .. } => Ok(()),
            ref other => Err(Error::InvalidState(format!(
                "cannot {} while the form is {}",
                action,
                other.name()
            ))),
        }
    }

    /// Update one field from donor input and drop its stale error.
    pub fn set_field(&mut self, field: DonationField, value: impl Into<String>) -> Result<()> {
        self.ensure_editing("edit fields")?;
        if field == DonationField::Name && self.draft.use_default_name {
            return Err(Error::InvalidState(
                "name is locked while the default name is in use".to_string(),
            ));
        }
        *self.draft.field_mut(field) = value.into();
        self.field_errors.remove(field);
        Ok(())
    }

    /// Toggle the anonymous donor name.
    ///
    /// Enabling locks the name to the default; disabling clears it.
    pub fn set_use_default_name(&mut self, enabled: bool) -> Result<()> {
        self.ensure_editing("change the donor name")?;
        self.draft.use_default_name = enabled;
        self.draft.name = if enabled {
            DEFAULT_DONOR_NAME.to_string()
        } else {
            String::new()
        };
        self.field_errors.remove(DonationField::Name);
        Ok(())
    }

    /// Validate the draft and move to the confirmation step.
    ///
    /// On failure the per-field errors are kept on the form and returned.
    pub fn request_confirmation(&mut self) -> Result<&ValidatedDonation> {
        self.ensure_editing("confirm")?;
        match validate_draft(&self.draft) {
            Ok(donation) => {
                self.field_errors = FieldErrors::new();
                self.state = FormState::Confirming { donation };
                debug!("[DonationForm] Draft valid, awaiting confirmation");
                match &self.state {
                    FormState::Confirming { donation } => Ok(donation),
                    _ => Err(Error::Unexpected("confirmation state lost".to_string())),
                }
            }
            Err(errors) => {
                debug!("[DonationForm] Validation failed: {}", errors);
                self.field_errors = errors.clone();
                Err(errors.into())
            }
        }
    }

    /// Go back from confirmation to editing, leaving the draft untouched.
    pub fn cancel_confirmation(&mut self) -> Result<()> {
        match self.state {
            FormState::Confirming { .. } => {
                self.state = FormState::Editing { error: None };
                Ok(())
            }
            ref other => Err(Error::InvalidState(format!(
                "nothing to cancel while the form is {}",
                other.name()
            ))),
        }
    }

    /// Freeze the confirmed donation into a payload and mark it in flight.
    pub fn begin_submission(&mut self, origin: &str) -> Result<DonationSubmission> {
        let donation = match &self.state {
            FormState::Confirming { donation } => donation.clone(),
            other => {
                return Err(Error::InvalidState(format!(
                    "cannot submit while the form is {}",
                    other.name()
                )))
            }
        };
        let submission = DonationSubmission {
            donation,
            return_url: Some(build_return_url(origin)?),
        };
        self.state = FormState::Submitting {
            submission: submission.clone(),
        };
        Ok(submission)
    }

    /// Apply the backend's answer to an in-flight submission.
    ///
    /// On success the donation id is stored in `slot` so status tracking can
    /// resume after a reload or an external redirect.
    pub fn finish_submission(
        &mut self,
        slot: &CurrentDonationSlot,
        result: Result<DonationRecord>,
    ) -> Result<SubmittedDonation> {
        let submission = match &self.state {
            FormState::Submitting { submission } => submission.clone(),
            other => {
                return Err(Error::InvalidState(format!(
                    "no submission in flight while the form is {}",
                    other.name()
                )))
            }
        };

        let record = match result {
            Ok(record) => record,
            Err(err) => {
                warn!("[DonationForm] Submission failed: {}", err);
                self.state = FormState::Editing {
                    error: Some(submission_message(&err)),
                };
                return Err(err);
            }
        };

        let Some(donation_id) = record.donation_id().map(str::to_string) else {
            warn!("[DonationForm] Backend response carried no donation id");
            self.state = FormState::Editing {
                error: Some(GENERIC_SUBMISSION_ERROR.to_string()),
            };
            return Err(Error::Unexpected(
                "donation response carried no identifier".to_string(),
            ));
        };

        // The donation exists server-side now; a storage failure must not
        // send the donor back to resubmit.
        if let Err(e) = slot.set(&donation_id) {
            warn!(
                "[DonationForm] Failed to persist donation id {}: {}",
                donation_id, e
            );
        }

        let outcome = match record.payment_url() {
            Some(url) => PaymentOutcome::AwaitingPayment {
                payment_url: url.to_string(),
            },
            None => PaymentOutcome::ThankYou,
        };
        info!(
            "[DonationForm] Donation {} accepted ({})",
            donation_id,
            match outcome {
                PaymentOutcome::AwaitingPayment { .. } => "awaiting payment",
                PaymentOutcome::ThankYou => "no payment session",
            }
        );

        let submitted = SubmittedDonation {
            donation_id,
            record,
            donation: submission.donation,
            outcome,
            submitted_at: Utc::now(),
        };
        self.instructions_shown = false;
        self.state = FormState::Submitted(submitted.clone());
        Ok(submitted)
    }

    /// Send the confirmed donation through `api`.
    ///
    /// The form is `Submitting` while the call is pending. If the returned
    /// future is dropped before it resolves the form stays there; call
    /// [`DonationForm::abandon_submission`] to get back to editing.
    pub async fn submit(
        &mut self,
        api: &dyn DonationApiTrait,
        slot: &CurrentDonationSlot,
        origin: &str,
    ) -> Result<SubmittedDonation> {
        let submission = self.begin_submission(origin)?;
        let result = api.create_donation(&submission).await;
        self.finish_submission(slot, result)
    }

    /// Give up on an in-flight submission whose answer will never be applied.
    ///
    /// The draft is kept so the donor can confirm and send it again. The
    /// backend may still have recorded the donation.
    pub fn abandon_submission(&mut self) -> Result<()> {
        match self.state {
            FormState::Submitting { .. } => {
                warn!("[DonationForm] Submission abandoned before the backend answered");
                self.state = FormState::Editing { error: None };
                Ok(())
            }
            ref other => Err(Error::InvalidState(format!(
                "no submission in flight while the form is {}",
                other.name()
            ))),
        }
    }

    /// The "proceed to payment" action.
    ///
    /// The first call returns the instructions; the next one returns the
    /// hosted payment URL to navigate to.
    pub fn proceed_to_payment(&mut self) -> Result<PaymentStep> {
        let payment_url = match &self.state {
            FormState::Submitted(SubmittedDonation {
                outcome: PaymentOutcome::AwaitingPayment { payment_url },
                ..
            }) => payment_url.clone(),
            FormState::Submitted(_) => {
                return Err(Error::InvalidState(
                    "donation has no payment page".to_string(),
                ))
            }
            other => {
                return Err(Error::InvalidState(format!(
                    "cannot proceed to payment while the form is {}",
                    other.name()
                )))
            }
        };

        if !self.instructions_shown {
            self.instructions_shown = true;
            return Ok(PaymentStep::Instructions(PAYMENT_INSTRUCTIONS));
        }
        info!("[DonationForm] Redirecting donor to payment page");
        Ok(PaymentStep::Redirect(payment_url))
    }

    /// "Start new donation": back to an empty form, program binding included.
    ///
    /// Only offered once a donation has been submitted.
    pub fn reset(&mut self) -> Result<()> {
        match self.state {
            FormState::Submitted(_) => {}
            ref other => {
                return Err(Error::InvalidState(format!(
                    "cannot start a new donation while the form is {}",
                    other.name()
                )))
            }
        }
        self.draft = DonationDraft::default();
        self.program = None;
        self.field_errors = FieldErrors::new();
        self.state = FormState::Editing { error: None };
        self.instructions_shown = false;
        debug!("[DonationForm] Form reset for a new donation");
        Ok(())
    }
}
