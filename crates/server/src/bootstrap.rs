use std::sync::Arc;

use thiserror::Error;
use tidyquote_copy::QuoteCopywriter;
use tidyquote_core::config::{AppConfig, ConfigError, LoadOptions};
use tidyquote_core::rates::RateTableError;
use tidyquote_core::{RateTable, RateTableEngine};
use tracing::info;

use crate::booking_log::BookingLog;

pub struct Application {
    pub config: AppConfig,
    pub rates: Arc<RateTable>,
    pub engine: RateTableEngine,
    pub copywriter: Arc<QuoteCopywriter>,
    pub bookings: Arc<BookingLog>,
}

#[derive(Debug, Error)]
pub enum BootstrapError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Rates(#[from] RateTableError),
}

pub fn bootstrap(options: LoadOptions) -> Result<Application, BootstrapError> {
    let config = AppConfig::load(options)?;
    bootstrap_with_config(config)
}

/// Build the application context. A missing or malformed rate table is
/// fatal here, at startup, and is never caught per-quote.
pub fn bootstrap_with_config(config: AppConfig) -> Result<Application, BootstrapError> {
    info!(
        event_name = "system.bootstrap.start",
        rates_path = %config.pricing.rates_path.display(),
        "starting application bootstrap"
    );

    let rates = Arc::new(RateTable::load(&config.pricing.rates_path)?);
    info!(
        event_name = "system.bootstrap.rates_loaded",
        tenancy_sizes = rates.end_of_tenancy.base.len(),
        communal_blocks = rates.communal.base.len(),
        promo_codes = rates.promo_codes.len(),
        "rate table loaded and validated"
    );

    let copywriter = Arc::new(QuoteCopywriter::from_config(&config.llm));
    let engine = RateTableEngine::new(Arc::clone(&rates));

    Ok(Application {
        config,
        rates,
        engine,
        copywriter,
        bookings: Arc::new(BookingLog::new()),
    })
}
