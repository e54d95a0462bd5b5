use std::fs;
use std::path::PathBuf;

use tempfile::TempDir;
use tidyquote_cli::commands::{quote, rates};

const RATES_JSON: &str = r#"{
  "end_of_tenancy": {
    "base": { "studio": 120, "1_bed": 150, "2_bed": 180 },
    "extra_bathroom": 20,
    "extra_wc": 15
  },
  "airbnb_turnover": {
    "base": { "studio": 45, "1_bed": 55 },
    "extra_bathroom": 10
  },
  "communal": {
    "base": { "small": 100, "medium": 160 },
    "frequency_discounts": { "weekly": 0.2, "monthly": 0.1 },
    "extras": { "lift": 12, "bin_store": 18 }
  },
  "general_clean": {
    "one_off_min": 50,
    "recurring_discounts": { "weekly": 0.15 }
  },
  "carpet": {
    "room": 30, "lounge": 40, "bedroom": 28, "landing_hall": 20,
    "stairs_per_step": 2.5, "stairs_flat": 35, "rug_small": 15, "rug_large": 25
  },
  "optional_addons": { "oven_clean": 35 },
  "surcharges": { "pets": 30, "urgent_same_day": 40, "congestion": 15, "parking_flat": 10 },
  "promo_codes": { "SAVE10": { "active": true, "percent": 10 } },
  "min_charge": 50,
  "vat": 0
}"#;

fn write_files(dir: &TempDir) -> (PathBuf, PathBuf) {
    let rates_path = dir.path().join("rates.json");
    fs::write(&rates_path, RATES_JSON).expect("write rates");

    let request_path = dir.path().join("request.json");
    fs::write(
        &request_path,
        r#"{"service":"end_of_tenancy","size":"2_bed","bathrooms":2,"wcs":1,
            "flags":{"pets":true}}"#,
    )
    .expect("write request");

    (rates_path, request_path)
}

#[test]
fn quote_command_prints_the_breakdown_and_total() {
    let dir = TempDir::new().expect("temp dir");
    let (rates_path, request_path) = write_files(&dir);

    let result = quote::run(&request_path, Some(&rates_path), false);

    assert_eq!(result.exit_code, 0);
    assert!(result.output.contains("End of tenancy clean (2 bed)"));
    assert!(result.output.contains("Pets present"));
    assert!(result.output.contains("\u{a3}245.00"));
}

#[test]
fn quote_command_emits_json_when_requested() {
    let dir = TempDir::new().expect("temp dir");
    let (rates_path, request_path) = write_files(&dir);

    let result = quote::run(&request_path, Some(&rates_path), true);

    assert_eq!(result.exit_code, 0);
    let parsed: serde_json::Value =
        serde_json::from_str(&result.output).expect("output should be JSON");
    assert!(parsed.get("total").is_some());
    assert!(parsed.get("breakdown").and_then(|lines| lines.as_array()).is_some());
}

#[test]
fn quote_command_rejects_unknown_service_tags() {
    let dir = TempDir::new().expect("temp dir");
    let (rates_path, _) = write_files(&dir);

    let request_path = dir.path().join("bad_request.json");
    fs::write(&request_path, r#"{"service":"window_clean"}"#).expect("write request");

    let result = quote::run(&request_path, Some(&rates_path), false);

    assert_eq!(result.exit_code, 1);
    assert!(result.output.contains("request"));
}

#[test]
fn rates_command_accepts_a_valid_table() {
    let dir = TempDir::new().expect("temp dir");
    let (rates_path, _) = write_files(&dir);

    let result = rates::run(Some(&rates_path));

    assert_eq!(result.exit_code, 0);
    assert!(result.output.contains("\"status\":\"ok\""));
}

#[test]
fn rates_command_rejects_a_table_with_negative_prices() {
    let dir = TempDir::new().expect("temp dir");
    let rates_path = dir.path().join("rates.json");
    fs::write(&rates_path, RATES_JSON.replace("\"pets\": 30", "\"pets\": -30"))
        .expect("write rates");

    let result = rates::run(Some(&rates_path));

    assert_eq!(result.exit_code, 1);
    assert!(result.output.contains("surcharges.pets"));
}
