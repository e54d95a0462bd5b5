use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::request::QuoteRequest;

/// One itemized amount. Insertion order is presentation order is
/// computation order. Amounts may be negative (promo) or a top-up.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BreakdownLine {
    pub label: String,
    pub amount: Decimal,
}

impl BreakdownLine {
    pub fn new(label: impl Into<String>, amount: Decimal) -> Self {
        Self { label: label.into(), amount }
    }
}

/// The engine's output: a 2-decimal total and the lines that sum to it.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuoteResult {
    pub total: Decimal,
    pub breakdown: Vec<BreakdownLine>,
}

#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BookingId(pub Uuid);

impl BookingId {
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }
}

impl std::fmt::Display for BookingId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomerDetails {
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub postcode: Option<String>,
}

/// A booked quote as held in the in-memory log. Persisting it is the
/// caller's concern; the engine never touches the log.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BookingRecord {
    pub id: BookingId,
    pub created_at: DateTime<Utc>,
    pub customer: CustomerDetails,
    pub request: QuoteRequest,
    pub result: QuoteResult,
}

impl BookingRecord {
    pub fn new(customer: CustomerDetails, request: QuoteRequest, result: QuoteResult) -> Self {
        Self { id: BookingId::generate(), created_at: Utc::now(), customer, request, result }
    }
}
