/// Minimum donation amount in rupiah
pub const MIN_DONATION_AMOUNT: u64 = 10_000;

/// Placeholder donor name used when the donor chooses to stay anonymous
pub const DEFAULT_DONOR_NAME: &str = "Hamba Allah";

/// Minimum length of a donor name
pub const MIN_NAME_LENGTH: usize = 2;

/// Minimum length of a donor address
pub const MIN_ADDRESS_LENGTH: usize = 5;

/// Minimum number of digits in a WhatsApp number
pub const MIN_PHONE_DIGITS: usize = 9;

/// Interval between status checks while a payment is pending
pub const STATUS_POLL_INTERVAL_SECS: u64 = 5;

/// Storage key holding the identifier of the donation being tracked
pub const CURRENT_DONATION_KEY: &str = "current_donation_id";

/// Storage key holding the persisted admin session flag
pub const SESSION_KEY: &str = "session";

/// Query parameter appended to the return URL handed to the payment provider
pub const RETURN_STATUS_PARAM: &str = "status";

/// Value of the return marker for a payment that has not settled yet
pub const RETURN_STATUS_PENDING: &str = "pending";

/// Shown when a failed submission carries no usable message
pub const GENERIC_SUBMISSION_ERROR: &str =
    "Terjadi kesalahan saat mengirim donasi. Silakan coba lagi.";
