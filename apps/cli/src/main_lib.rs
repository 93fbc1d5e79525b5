use std::sync::Arc;

use donasi_client::DonasiApiClient;
use donasi_core::{
    session::SessionContext,
    storage::{CurrentDonationSlot, KeyValueStore},
};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::{config::Config, storage::FileKeyValueStore};

/// Everything a command needs, built once at startup.
pub struct AppContext {
    pub config: Config,
    pub client: Arc<DonasiApiClient>,
    pub slot: CurrentDonationSlot,
    pub session: SessionContext,
}

pub fn init_tracing() {
    let log_format = std::env::var("DONASI_LOG_FORMAT").unwrap_or_else(|_| "text".to_string());
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let registry = tracing_subscriber::registry().with(filter);

    // Logs go to stderr; stdout is for the donor-facing output.
    if log_format.eq_ignore_ascii_case("json") {
        registry
            .with(
                fmt::layer()
                    .json()
                    .with_current_span(false)
                    .with_writer(std::io::stderr),
            )
            .init();
    } else {
        registry
            .with(
                fmt::layer()
                    .with_target(true)
                    .with_line_number(true)
                    .with_writer(std::io::stderr),
            )
            .init();
    }
}

pub fn build_context(config: Config) -> anyhow::Result<AppContext> {
    let file_store = FileKeyValueStore::new(config.state_file.clone());
    tracing::debug!("State file in use: {}", file_store.path().display());
    let store: Arc<dyn KeyValueStore> = Arc::new(file_store);

    let session = SessionContext::init(store.clone())?;
    if let Some(info) = session.current() {
        tracing::info!("Signed in as {}", info.user_name);
    }

    let client = match config.request_timeout {
        Some(timeout) => DonasiApiClient::with_timeout(&config.api_url, timeout)?,
        None => DonasiApiClient::new(&config.api_url)?,
    }
    .with_status_endpoint(config.status_endpoint);
    tracing::debug!(
        "Backend {} (status lookups via {})",
        config.api_url,
        config.status_endpoint
    );

    Ok(AppContext {
        slot: CurrentDonationSlot::new(store),
        client: Arc::new(client),
        session,
        config,
    })
}
