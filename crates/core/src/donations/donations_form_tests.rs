//! Tests for the donation intake form state machine.

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};
    use std::time::Duration;

    use async_trait::async_trait;

    use crate::constants::{DEFAULT_DONOR_NAME, GENERIC_SUBMISSION_ERROR};
    use crate::donations::{
        confirmation_summary, DonationApiTrait, DonationDraft, DonationField, DonationForm,
        DonationRecord, DonationStatusRecord, DonationSubmission, FormState, PaymentOutcome,
        PaymentStep, ProgramSummary, PAYMENT_INSTRUCTIONS,
    };
    use crate::errors::{ApiError, Error, Result};
    use crate::storage::{CurrentDonationSlot, KeyValueStore, MemoryKeyValueStore};

    const ORIGIN: &str = "https://panti.example.org";

    // ==================== Mock API ====================

    #[derive(Clone)]
    enum MockResponse {
        Record(DonationRecord),
        Fail(ApiError),
    }

    struct MockDonationApi {
        response: MockResponse,
        calls: AtomicUsize,
        last_submission: Mutex<Option<DonationSubmission>>,
    }

    impl MockDonationApi {
        fn new(response: MockResponse) -> Self {
            Self {
                response,
                calls: AtomicUsize::new(0),
                last_submission: Mutex::new(None),
            }
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }

        fn last_fields(&self) -> Vec<(&'static str, String)> {
            self.last_submission
                .lock()
                .unwrap()
                .as_ref()
                .map(|s| s.form_fields())
                .unwrap_or_default()
        }
    }

    #[async_trait]
    impl DonationApiTrait for MockDonationApi {
        async fn create_donation(&self, submission: &DonationSubmission) -> Result<DonationRecord> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            *self.last_submission.lock().unwrap() = Some(submission.clone());
            match &self.response {
                MockResponse::Record(record) => Ok(record.clone()),
                MockResponse::Fail(err) => Err(Error::Api(err.clone())),
            }
        }

        async fn get_donation_status(&self, _donation_id: &str) -> Result<DonationStatusRecord> {
            Err(Error::Unexpected("not used by the form".to_string()))
        }
    }

    /// Backend that never answers.
    struct StalledDonationApi;

    #[async_trait]
    impl DonationApiTrait for StalledDonationApi {
        async fn create_donation(&self, _submission: &DonationSubmission) -> Result<DonationRecord> {
            std::future::pending().await
        }

        async fn get_donation_status(&self, _donation_id: &str) -> Result<DonationStatusRecord> {
            std::future::pending().await
        }
    }

    // ==================== Helpers ====================

    fn record(id: Option<&str>, snap_url: Option<&str>) -> DonationRecord {
        DonationRecord {
            id: id.map(str::to_string),
            title: None,
            name: Some("Budi".to_string()),
            amount: Some(50_000),
            snap_url: snap_url.map(str::to_string),
            status: Some(0),
            program_id: None,
        }
    }

    fn slot() -> (Arc<MemoryKeyValueStore>, CurrentDonationSlot) {
        let store = Arc::new(MemoryKeyValueStore::new());
        (store.clone(), CurrentDonationSlot::new(store))
    }

    fn filled_form() -> DonationForm {
        let mut form = DonationForm::new(None, None);
        form.set_field(DonationField::Name, "Budi").unwrap();
        form.set_field(DonationField::Address, "Jl. Mawar 1").unwrap();
        form.set_field(DonationField::PhoneNumber, "081234567890")
            .unwrap();
        form.set_field(DonationField::Email, "budi@example.com")
            .unwrap();
        form.set_field(DonationField::Amount, "50000").unwrap();
        form.set_field(DonationField::Message, "Semangat!").unwrap();
        form
    }

    // ==================== Validation gate ====================

    #[tokio::test]
    async fn test_invalid_amount_blocks_submission_without_network_call() {
        let api = MockDonationApi::new(MockResponse::Record(record(Some("don_1"), None)));
        let (_, slot) = slot();
        let mut form = filled_form();
        form.set_field(DonationField::Amount, "9000").unwrap();

        let err = form.request_confirmation().unwrap_err();
        assert!(matches!(err, Error::Validation(_)));
        assert_eq!(
            form.field_errors().get(DonationField::Amount),
            Some("Minimal donasi adalah Rp 10.000")
        );
        assert_eq!(form.state().name(), "editing");

        // Submitting without a confirmation is refused outright.
        assert!(form.submit(&api, &slot, ORIGIN).await.is_err());
        assert_eq!(api.calls(), 0);
    }

    #[test]
    fn test_editing_a_field_clears_its_error() {
        let mut form = filled_form();
        form.set_field(DonationField::PhoneNumber, "0812-345").unwrap();
        assert!(form.request_confirmation().is_err());
        assert!(form.field_errors().contains(DonationField::PhoneNumber));

        form.set_field(DonationField::PhoneNumber, "081234567890")
            .unwrap();
        assert!(!form.field_errors().contains(DonationField::PhoneNumber));
    }

    // ==================== Default name ====================

    #[test]
    fn test_default_name_toggle_locks_and_clears() {
        let mut form = filled_form();

        form.set_use_default_name(true).unwrap();
        assert_eq!(form.draft().name, DEFAULT_DONOR_NAME);
        assert!(form.is_name_locked());
        assert!(matches!(
            form.set_field(DonationField::Name, "Siti"),
            Err(Error::InvalidState(_))
        ));
        assert_eq!(form.draft().name, DEFAULT_DONOR_NAME);

        form.set_use_default_name(false).unwrap();
        assert_eq!(form.draft().name, "");
        assert!(!form.is_name_locked());
        form.set_field(DonationField::Name, "Siti").unwrap();
        assert_eq!(form.draft().name, "Siti");
    }

    #[test]
    fn test_prefill_with_default_name_is_locked() {
        let prefill = DonationDraft {
            name: "ignored".to_string(),
            use_default_name: true,
            ..DonationDraft::default()
        };
        let form = DonationForm::new(Some(prefill), Some("12".to_string()));
        assert_eq!(form.draft().name, DEFAULT_DONOR_NAME);
        assert_eq!(form.draft().program_id.as_deref(), Some("12"));
    }

    // ==================== Confirmation ====================

    #[test]
    fn test_cancel_confirmation_returns_to_unchanged_draft() {
        let mut form = filled_form();
        let before = form.draft().clone();

        form.request_confirmation().unwrap();
        assert_eq!(form.state().name(), "confirming");
        assert!(form.set_field(DonationField::Message, "changed").is_err());

        form.cancel_confirmation().unwrap();
        assert_eq!(form.state(), &FormState::Editing { error: None });
        assert_eq!(form.draft(), &before);
    }

    #[test]
    fn test_confirmation_summary_reads_back_every_field() {
        let mut form = filled_form().with_program(ProgramSummary {
            id: "3".to_string(),
            title: "Beasiswa Anak Yatim".to_string(),
            description: None,
            target_amount: Some(100_000_000),
            collected_amount: None,
        });
        let donation = form.request_confirmation().unwrap().clone();
        assert_eq!(donation.program_id.as_deref(), Some("3"));

        let summary = confirmation_summary(&donation, form.program());
        assert_eq!(summary.len(), 7);
        assert!(summary.contains(&("Nominal", "Rp 50.000".to_string())));
        assert!(summary.contains(&("Program", "Beasiswa Anak Yatim".to_string())));
    }

    // ==================== Submission ====================

    #[tokio::test]
    async fn test_budi_scenario_persists_id_and_offers_payment() {
        let api = MockDonationApi::new(MockResponse::Record(record(
            Some("don_1"),
            Some("https://pay.example/x"),
        )));
        let (_, slot) = slot();
        let mut form = filled_form();

        form.request_confirmation().unwrap();
        let submitted = form.submit(&api, &slot, ORIGIN).await.unwrap();

        assert_eq!(api.calls(), 1);
        let fields = api.last_fields();
        assert!(!fields.iter().any(|(name, _)| *name == "program_id"));
        assert!(fields.contains(&(
            "return_url",
            "https://panti.example.org/?status=pending".to_string()
        )));

        assert_eq!(submitted.donation_id, "don_1");
        assert_eq!(slot.get().unwrap().as_deref(), Some("don_1"));
        assert_eq!(
            submitted.outcome,
            PaymentOutcome::AwaitingPayment {
                payment_url: "https://pay.example/x".to_string()
            }
        );
        // Nothing navigates until the donor asks to proceed.
        assert_eq!(form.state().name(), "submitted");
    }

    #[tokio::test]
    async fn test_proceed_to_payment_shows_instructions_before_redirect() {
        let api = MockDonationApi::new(MockResponse::Record(record(
            Some("don_1"),
            Some("https://pay.example/x"),
        )));
        let (_, slot) = slot();
        let mut form = filled_form();
        form.request_confirmation().unwrap();
        form.submit(&api, &slot, ORIGIN).await.unwrap();

        assert_eq!(
            form.proceed_to_payment().unwrap(),
            PaymentStep::Instructions(PAYMENT_INSTRUCTIONS)
        );
        assert_eq!(
            form.proceed_to_payment().unwrap(),
            PaymentStep::Redirect("https://pay.example/x".to_string())
        );
    }

    #[tokio::test]
    async fn test_response_without_snap_url_is_a_thank_you() {
        let api = MockDonationApi::new(MockResponse::Record(record(Some("don_2"), Some(""))));
        let (_, slot) = slot();
        let mut form = filled_form();
        form.request_confirmation().unwrap();

        let submitted = form.submit(&api, &slot, ORIGIN).await.unwrap();
        assert_eq!(submitted.outcome, PaymentOutcome::ThankYou);
        assert!(matches!(
            form.proceed_to_payment(),
            Err(Error::InvalidState(_))
        ));
    }

    #[tokio::test]
    async fn test_failed_submission_returns_to_editing_with_server_message() {
        let api = MockDonationApi::new(MockResponse::Fail(ApiError::http(
            422,
            "Email sudah terdaftar",
        )));
        let (store, slot) = slot();
        let mut form = filled_form();
        form.request_confirmation().unwrap();

        assert!(form.submit(&api, &slot, ORIGIN).await.is_err());
        assert_eq!(form.submission_error(), Some("Email sudah terdaftar"));
        assert_eq!(store.get_value("current_donation_id").unwrap(), None);

        // The draft survives and can be confirmed again.
        assert_eq!(form.draft().name, "Budi");
        form.request_confirmation().unwrap();
        assert!(form.submit(&api, &slot, ORIGIN).await.is_err());
        assert_eq!(api.calls(), 2);
    }

    #[tokio::test]
    async fn test_failure_without_message_uses_generic_fallback() {
        let api = MockDonationApi::new(MockResponse::Fail(ApiError::transport("")));
        let (_, slot) = slot();
        let mut form = filled_form();
        form.request_confirmation().unwrap();

        assert!(form.submit(&api, &slot, ORIGIN).await.is_err());
        assert_eq!(form.submission_error(), Some(GENERIC_SUBMISSION_ERROR));
    }

    #[tokio::test]
    async fn test_response_without_id_is_a_failure() {
        let api = MockDonationApi::new(MockResponse::Record(record(None, None)));
        let (_, slot) = slot();
        let mut form = filled_form();
        form.request_confirmation().unwrap();

        assert!(form.submit(&api, &slot, ORIGIN).await.is_err());
        assert_eq!(form.submission_error(), Some(GENERIC_SUBMISSION_ERROR));
        assert_eq!(slot.get().unwrap(), None);
    }

    #[test]
    fn test_in_flight_submission_rejects_edits_and_second_submit() {
        let mut form = filled_form();
        form.request_confirmation().unwrap();
        form.begin_submission(ORIGIN).unwrap();

        assert_eq!(form.state().name(), "submitting");
        assert!(form.set_field(DonationField::Amount, "20000").is_err());
        assert!(form.begin_submission(ORIGIN).is_err());
    }

    #[test]
    fn test_new_donation_overwrites_tracked_id() {
        let (_, slot) = slot();
        let mut form = filled_form();
        form.request_confirmation().unwrap();
        form.begin_submission(ORIGIN).unwrap();
        form.finish_submission(&slot, Ok(record(Some("don_1"), None)))
            .unwrap();

        form.reset().unwrap();
        assert_eq!(form.state(), &FormState::Editing { error: None });
        assert_eq!(form.draft().name, "");

        let mut form = filled_form();
        form.request_confirmation().unwrap();
        form.begin_submission(ORIGIN).unwrap();
        form.finish_submission(&slot, Ok(record(Some("don_2"), None)))
            .unwrap();
        assert_eq!(slot.get().unwrap().as_deref(), Some("don_2"));
    }

    #[test]
    fn test_invalid_origin_keeps_confirmation() {
        let mut form = filled_form();
        form.request_confirmation().unwrap();
        assert!(form.begin_submission("not a url").is_err());
        assert_eq!(form.state().name(), "confirming");
    }

    // ==================== Start over ====================

    #[test]
    fn test_reset_clears_program_binding() {
        let (_, slot) = slot();
        let program = ProgramSummary {
            id: "4".to_string(),
            title: "Renovasi Asrama".to_string(),
            description: None,
            target_amount: None,
            collected_amount: None,
        };
        let mut form = DonationForm::new(Some(filled_form().draft().clone()), None)
            .with_program(program);
        form.request_confirmation().unwrap();
        form.begin_submission(ORIGIN).unwrap();
        form.finish_submission(&slot, Ok(record(Some("don_1"), Some("https://pay.example/x"))))
            .unwrap();
        assert_eq!(
            form.proceed_to_payment().unwrap(),
            PaymentStep::Instructions(PAYMENT_INSTRUCTIONS)
        );

        form.reset().unwrap();
        assert_eq!(form.draft(), &DonationDraft::default());
        assert_eq!(form.draft().program_id, None);
        assert!(form.program().is_none());
        assert!(form.field_errors().is_empty());
        assert_eq!(form.state(), &FormState::Editing { error: None });
        // The tracked donation belongs to the status page, not the form.
        assert_eq!(slot.get().unwrap().as_deref(), Some("don_1"));
    }

    #[test]
    fn test_reset_is_only_offered_after_submission() {
        let mut form = filled_form();
        assert!(matches!(form.reset(), Err(Error::InvalidState(_))));
        assert_eq!(form.draft().name, "Budi");

        form.request_confirmation().unwrap();
        assert!(matches!(form.reset(), Err(Error::InvalidState(_))));
        assert_eq!(form.state().name(), "confirming");

        form.begin_submission(ORIGIN).unwrap();
        assert!(matches!(form.reset(), Err(Error::InvalidState(_))));
        assert_eq!(form.state().name(), "submitting");
    }

    // ==================== Abandoned submission ====================

    #[tokio::test(start_paused = true)]
    async fn test_dropped_submit_can_be_abandoned() {
        let (_, slot) = slot();
        let mut form = filled_form();
        form.request_confirmation().unwrap();

        let sent = tokio::time::timeout(
            Duration::from_secs(60),
            form.submit(&StalledDonationApi, &slot, ORIGIN),
        )
        .await;
        assert!(sent.is_err());
        assert_eq!(form.state().name(), "submitting");
        assert!(form.set_field(DonationField::Amount, "20000").is_err());

        form.abandon_submission().unwrap();
        assert_eq!(form.state(), &FormState::Editing { error: None });
        assert_eq!(form.draft().name, "Budi");
        assert_eq!(slot.get().unwrap(), None);

        // The donor can confirm and send the same draft again.
        form.request_confirmation().unwrap();
        let api = MockDonationApi::new(MockResponse::Record(record(Some("don_3"), None)));
        form.submit(&api, &slot, ORIGIN).await.unwrap();
        assert_eq!(slot.get().unwrap().as_deref(), Some("don_3"));
    }

    #[test]
    fn test_abandon_needs_a_submission_in_flight() {
        let mut form = filled_form();
        assert!(matches!(
            form.abandon_submission(),
            Err(Error::InvalidState(_))
        ));
        form.request_confirmation().unwrap();
        assert!(form.abandon_submission().is_err());
        assert_eq!(form.state().name(), "confirming");
    }
}
