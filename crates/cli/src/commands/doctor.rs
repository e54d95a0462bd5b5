use serde::Serialize;
use tidyquote_core::config::{AppConfig, LoadOptions};
use tidyquote_core::RateTable;

use super::CommandResult;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
enum CheckStatus {
    Pass,
    Fail,
    Skipped,
}

#[derive(Debug, Serialize)]
struct DoctorCheck {
    name: &'static str,
    status: CheckStatus,
    details: String,
}

#[derive(Debug, Serialize)]
struct DoctorReport {
    overall_status: CheckStatus,
    summary: String,
    checks: Vec<DoctorCheck>,
}

pub fn run(json_output: bool) -> CommandResult {
    let report = build_report();
    let exit_code = if report.overall_status == CheckStatus::Pass { 0 } else { 1 };

    let output = if json_output {
        serde_json::to_string_pretty(&report).unwrap_or_else(|error| {
            format!(
                "{{\"overall_status\":\"fail\",\"summary\":\"doctor serialization failed\",\"error\":\"{}\"}}",
                error.to_string().replace('"', "\\\"")
            )
        })
    } else {
        render_human(&report)
    };

    CommandResult { exit_code, output }
}

fn build_report() -> DoctorReport {
    let mut checks = Vec::new();

    match AppConfig::load(LoadOptions::default()) {
        Ok(config) => {
            checks.push(DoctorCheck {
                name: "config_validation",
                status: CheckStatus::Pass,
                details: "configuration loaded and validated".to_string(),
            });
            checks.push(check_rate_table(&config));
            checks.push(check_llm(&config));
        }
        Err(error) => {
            checks.push(DoctorCheck {
                name: "config_validation",
                status: CheckStatus::Fail,
                details: error.to_string(),
            });
            checks.push(DoctorCheck {
                name: "rate_table",
                status: CheckStatus::Skipped,
                details: "skipped because configuration did not load".to_string(),
            });
            checks.push(DoctorCheck {
                name: "llm_readiness",
                status: CheckStatus::Skipped,
                details: "skipped because configuration did not load".to_string(),
            });
        }
    }

    let all_ok =
        checks.iter().all(|check| check.status != CheckStatus::Fail);
    let overall_status = if all_ok { CheckStatus::Pass } else { CheckStatus::Fail };
    let summary = if all_ok {
        "doctor: all readiness checks passed".to_string()
    } else {
        "doctor: one or more readiness checks failed".to_string()
    };

    DoctorReport { overall_status, summary, checks }
}

fn check_rate_table(config: &AppConfig) -> DoctorCheck {
    match RateTable::load(&config.pricing.rates_path) {
        Ok(rates) => DoctorCheck {
            name: "rate_table",
            status: CheckStatus::Pass,
            details: format!(
                "`{}` loaded: {} tenancy sizes, {} communal blocks, {} promo codes",
                config.pricing.rates_path.display(),
                rates.end_of_tenancy.base.len(),
                rates.communal.base.len(),
                rates.promo_codes.len()
            ),
        },
        Err(error) => DoctorCheck {
            name: "rate_table",
            status: CheckStatus::Fail,
            details: error.to_string(),
        },
    }
}

fn check_llm(config: &AppConfig) -> DoctorCheck {
    if !config.llm.enabled {
        return DoctorCheck {
            name: "llm_readiness",
            status: CheckStatus::Skipped,
            details: "llm is disabled; quotes use the plain breakdown rendering".to_string(),
        };
    }

    DoctorCheck {
        name: "llm_readiness",
        status: CheckStatus::Pass,
        details: format!(
            "provider {:?}, model `{}` (credentials validated by config contract)",
            config.llm.provider, config.llm.model
        ),
    }
}

fn render_human(report: &DoctorReport) -> String {
    let mut lines = vec![report.summary.clone()];
    for check in &report.checks {
        let marker = match check.status {
            CheckStatus::Pass => "PASS",
            CheckStatus::Fail => "FAIL",
            CheckStatus::Skipped => "SKIP",
        };
        lines.push(format!("[{marker}] {}: {}", check.name, check.details));
    }
    lines.join("\n")
}
