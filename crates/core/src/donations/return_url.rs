//! Return URL handed to the payment provider and detection of the way back.

use url::Url;

use crate::constants::{RETURN_STATUS_PARAM, RETURN_STATUS_PENDING};
use crate::errors::{Error, Result, ValidationError};

/// Build the URL the payment provider sends the donor back to.
///
/// The path and query of `origin` are dropped; only scheme, host and port are kept.
pub fn build_return_url(origin: &str) -> Result<String> {
    let parsed = Url::parse(origin.trim()).map_err(|e| {
        Error::Validation(ValidationError::InvalidInput(format!(
            "Invalid origin '{}': {}",
            origin, e
        )))
    })?;
    if parsed.cannot_be_a_base() || parsed.host_str().is_none() {
        return Err(Error::Validation(ValidationError::InvalidInput(format!(
            "Origin '{}' has no host",
            origin
        ))));
    }

    let mut url = parsed;
    url.set_path("/");
    url.set_fragment(None);
    url.query_pairs_mut()
        .clear()
        .append_pair(RETURN_STATUS_PARAM, RETURN_STATUS_PENDING);
    Ok(url.to_string())
}

/// Whether the given URL carries the return marker, i.e. the donor is coming
/// back from the payment provider.
pub fn is_payment_return(url: &str) -> bool {
    Url::parse(url)
        .map(|u| u.query_pairs().any(|(key, _)| key == RETURN_STATUS_PARAM))
        .unwrap_or(false)
}
