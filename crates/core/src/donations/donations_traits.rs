use async_trait::async_trait;

use crate::donations::donations_model::{
    DonationRecord, DonationStatusRecord, DonationSubmission, ProgramSummary,
};
use crate::errors::Result;

/// Trait for the donation endpoints of the backend API.
///
/// Implementations map transport and HTTP failures to [`crate::errors::Error::Api`]
/// and never retry.
#[async_trait]
pub trait DonationApiTrait: Send + Sync {
    /// Create a donation record, opening a hosted payment session if the backend does so.
    async fn create_donation(&self, submission: &DonationSubmission) -> Result<DonationRecord>;

    /// Look up the payment status of a donation.
    async fn get_donation_status(&self, donation_id: &str) -> Result<DonationStatusRecord>;
}

/// Trait for the program endpoints of the backend API.
#[async_trait]
pub trait ProgramApiTrait: Send + Sync {
    async fn get_program(&self, program_id: &str) -> Result<ProgramSummary>;
    async fn list_programs(&self) -> Result<Vec<ProgramSummary>>;
}
