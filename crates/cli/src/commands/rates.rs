use std::path::{Path, PathBuf};

use tidyquote_core::config::{AppConfig, LoadOptions};
use tidyquote_core::RateTable;

use crate::commands::CommandResult;

pub fn run(path: Option<&Path>) -> CommandResult {
    let path = match resolve_path(path) {
        Ok(path) => path,
        Err(message) => return CommandResult::failure("rates", "config", message, 1),
    };

    match RateTable::load(&path) {
        Ok(rates) => CommandResult::success(
            "rates",
            format!(
                "rate table `{}` is valid: {} tenancy sizes, {} airbnb sizes, {} communal \
                 blocks, {} add-ons, {} promo codes",
                path.display(),
                rates.end_of_tenancy.base.len(),
                rates.airbnb_turnover.base.len(),
                rates.communal.base.len(),
                rates.optional_addons.len(),
                rates.promo_codes.len()
            ),
        ),
        Err(error) => CommandResult::failure("rates", "validation", error.to_string(), 1),
    }
}

fn resolve_path(explicit: Option<&Path>) -> Result<PathBuf, String> {
    if let Some(path) = explicit {
        return Ok(path.to_path_buf());
    }

    AppConfig::load(LoadOptions::default())
        .map(|config| config.pricing.rates_path)
        .map_err(|error| error.to_string())
}
