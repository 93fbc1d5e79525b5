//! Donasi API client for the donation backend.
//!
//! This client covers the public endpoints used by the donation workflow:
//! creating a donation, looking up its payment status, and reading programs.

use std::time::Duration;

use async_trait::async_trait;
use log::{debug, error};
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT};
use reqwest::multipart::Form;
use serde::de::DeserializeOwned;

use donasi_core::donations::{
    DonationApiTrait, DonationRecord, DonationStatusRecord, DonationSubmission, ProgramApiTrait,
    ProgramSummary,
};

use crate::error::{ClientError, Result};
use crate::types::{ApiEnvelope, StatusEndpoint};

/// Path prefix of every backend endpoint.
const API_PREFIX: &str = "/api/v1";

/// Client for the Donasi backend REST API.
///
/// Requests are sent once; there is no retry or backoff. Retrying is up to
/// the caller, behind an explicit user action.
#[derive(Debug, Clone)]
pub struct DonasiApiClient {
    client: reqwest::Client,
    base_url: String,
    status_endpoint: StatusEndpoint,
    timeout: Option<Duration>,
}

impl DonasiApiClient {
    /// Create a new client without a request timeout of its own.
    ///
    /// # Arguments
    ///
    /// * `base_url` - The backend origin (e.g., "https://api.panti.example.org");
    ///   `/api/v1` is appended by the client.
    pub fn new(base_url: &str) -> Result<Self> {
        Self::build(base_url, None)
    }

    /// Create a new client that gives up on requests after `timeout`.
    pub fn with_timeout(base_url: &str, timeout: Duration) -> Result<Self> {
        Self::build(base_url, Some(timeout))
    }

    fn build(base_url: &str, timeout: Option<Duration>) -> Result<Self> {
        let base_url = base_url.trim().trim_end_matches('/');
        if !(base_url.starts_with("http://") || base_url.starts_with("https://")) {
            return Err(ClientError::invalid_config(format!(
                "base URL must start with http:// or https://, got '{}'",
                base_url
            )));
        }

        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder.build().map_err(|e| {
            ClientError::invalid_config(format!("Failed to initialize HTTP client: {}", e))
        })?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches(API_PREFIX).to_string(),
            status_endpoint: StatusEndpoint::default(),
            timeout,
        })
    }

    /// Per-request timeout, if one was configured.
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout
    }

    /// Choose which endpoint answers status lookups.
    pub fn with_status_endpoint(mut self, endpoint: StatusEndpoint) -> Self {
        self.status_endpoint = endpoint;
        self
    }

    pub fn status_endpoint(&self) -> StatusEndpoint {
        self.status_endpoint
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}{}", self.base_url, API_PREFIX, path)
    }

    fn headers(&self) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        headers
    }

    /// Parse a JSON response body.
    async fn parse_response<T: DeserializeOwned>(response: reqwest::Response) -> Result<T> {
        let status = response.status();
        let body = response.text().await?;
        debug!("[DonasiApi] Response ({}): {}", status, body);

        if !status.is_success() {
            return Err(ClientError::api(status.as_u16(), body));
        }

        serde_json::from_str(&body).map_err(|e| {
            error!(
                "[DonasiApi] Failed to deserialize response. Body: {}, Error: {}",
                body, e
            );
            ClientError::Json(e)
        })
    }

    /// Make a GET request and unwrap the `data` envelope.
    async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let url = self.url(path);
        debug!("[DonasiApi] GET {}", url);

        let response = self
            .client
            .get(&url)
            .headers(self.headers())
            .send()
            .await?;

        let envelope: ApiEnvelope<T> = Self::parse_response(response).await?;
        Ok(envelope.data)
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Donations
    // ─────────────────────────────────────────────────────────────────────────

    /// Build the multipart body for a submission.
    fn donation_form(submission: &DonationSubmission) -> Form {
        submission
            .form_fields()
            .into_iter()
            .fold(Form::new(), |form, (name, value)| form.text(name, value))
    }

    /// Create a donation.
    ///
    /// POST /api/v1/donations (multipart)
    pub async fn create_donation(&self, submission: &DonationSubmission) -> Result<DonationRecord> {
        let url = self.url("/donations");
        debug!(
            "[DonasiApi] POST {} (amount {}, program {:?})",
            url, submission.donation.amount, submission.donation.program_id
        );

        let response = self
            .client
            .post(&url)
            .headers(self.headers())
            .multipart(Self::donation_form(submission))
            .send()
            .await?;

        let envelope: ApiEnvelope<DonationRecord> = Self::parse_response(response).await?;
        Ok(envelope.data)
    }

    /// Look up the payment status of a donation.
    ///
    /// GET /api/v1/donations-notifikasi-id/{id} or /api/v1/program-donations/{id}
    pub async fn get_donation_status(&self, donation_id: &str) -> Result<DonationStatusRecord> {
        self.get(&self.status_endpoint.path(donation_id)).await
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Programs
    // ─────────────────────────────────────────────────────────────────────────

    /// Get a program by ID.
    ///
    /// GET /api/v1/program-donations/{id}
    pub async fn get_program(&self, program_id: &str) -> Result<ProgramSummary> {
        let path = format!("/program-donations/{}", urlencoding::encode(program_id));
        self.get(&path).await
    }

    /// List programs open for donations.
    ///
    /// GET /api/v1/program-donations
    pub async fn list_programs(&self) -> Result<Vec<ProgramSummary>> {
        self.get("/program-donations").await
    }
}

#[async_trait]
impl DonationApiTrait for DonasiApiClient {
    async fn create_donation(
        &self,
        submission: &DonationSubmission,
    ) -> donasi_core::Result<DonationRecord> {
        Ok(DonasiApiClient::create_donation(self, submission).await?)
    }

    async fn get_donation_status(
        &self,
        donation_id: &str,
    ) -> donasi_core::Result<DonationStatusRecord> {
        Ok(DonasiApiClient::get_donation_status(self, donation_id).await?)
    }
}

#[async_trait]
impl ProgramApiTrait for DonasiApiClient {
    async fn get_program(&self, program_id: &str) -> donasi_core::Result<ProgramSummary> {
        Ok(DonasiApiClient::get_program(self, program_id).await?)
    }

    async fn list_programs(&self) -> donasi_core::Result<Vec<ProgramSummary>> {
        Ok(DonasiApiClient::list_programs(self).await?)
    }
}
