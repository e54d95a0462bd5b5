pub mod config;
pub mod domain;
pub mod pricing;
pub mod rates;

pub use domain::quote::{
    BookingId, BookingRecord, BreakdownLine, CustomerDetails, QuoteResult,
};
pub use domain::request::{
    AccessFlags, Cadence, CarpetAreas, PropertySize, QuoteRequest, Service,
};
pub use pricing::{format_gbp, price_request, to_money, PricingEngine, RateTableEngine};
pub use rates::{lookup, RateLookup, RateTable, RateTableError};
