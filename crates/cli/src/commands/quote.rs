use std::fs;
use std::path::{Path, PathBuf};

use tidyquote_core::config::{AppConfig, LoadOptions};
use tidyquote_core::{format_gbp, price_request, QuoteRequest, RateTable};

use crate::commands::CommandResult;

pub fn run(request_path: &Path, rates_path: Option<&Path>, json: bool) -> CommandResult {
    let rates_path = match resolve_rates_path(rates_path) {
        Ok(path) => path,
        Err(message) => return CommandResult::failure("quote", "config", message, 1),
    };

    let rates = match RateTable::load(&rates_path) {
        Ok(rates) => rates,
        Err(error) => return CommandResult::failure("quote", "rates", error.to_string(), 1),
    };

    let raw = match fs::read_to_string(request_path) {
        Ok(raw) => raw,
        Err(error) => {
            return CommandResult::failure(
                "quote",
                "request",
                format!("could not read request file `{}`: {error}", request_path.display()),
                1,
            )
        }
    };

    // An unknown service tag fails here, uniformly with the server's 400.
    let request: QuoteRequest = match serde_json::from_str(&raw) {
        Ok(request) => request,
        Err(error) => {
            return CommandResult::failure(
                "quote",
                "request",
                format!("could not parse quote request: {error}"),
                1,
            )
        }
    };

    let result = price_request(&rates, &request);

    let output = if json {
        serde_json::to_string_pretty(&result)
            .unwrap_or_else(|error| format!("{{\"error\":\"{error}\"}}"))
    } else {
        render_text(&result)
    };

    CommandResult { exit_code: 0, output }
}

fn resolve_rates_path(explicit: Option<&Path>) -> Result<PathBuf, String> {
    if let Some(path) = explicit {
        return Ok(path.to_path_buf());
    }

    AppConfig::load(LoadOptions::default())
        .map(|config| config.pricing.rates_path)
        .map_err(|error| error.to_string())
}

fn render_text(result: &tidyquote_core::QuoteResult) -> String {
    let width = result.breakdown.iter().map(|line| line.label.len()).max().unwrap_or(0);

    let mut lines: Vec<String> = result
        .breakdown
        .iter()
        .map(|line| format!("{:width$}  {:>10}", line.label, format_gbp(line.amount)))
        .collect();
    lines.push(format!("{:width$}  {:>10}", "Total", format_gbp(result.total)));
    lines.join("\n")
}
