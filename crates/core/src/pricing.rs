//! The pricing engine: a pure function from a quote request to an
//! itemized total, parameterized by the rate table. Every amount is
//! rounded to money at the point of computation so the displayed lines
//! always sum exactly to the displayed total.

use std::sync::Arc;

use rust_decimal::{Decimal, RoundingStrategy};

use crate::domain::quote::{BreakdownLine, QuoteResult};
use crate::domain::request::{CarpetAreas, QuoteRequest, Service};
use crate::rates::{lookup, RateTable};

/// Round to 2-decimal money, half away from zero.
pub fn to_money(amount: Decimal) -> Decimal {
    amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

pub fn format_gbp(amount: Decimal) -> String {
    format!("\u{a3}{amount:.2}")
}

pub trait PricingEngine: Send + Sync {
    fn price(&self, request: &QuoteRequest) -> QuoteResult;
}

/// The production engine: holds a shared immutable rate table and is safe
/// to call from any number of request handlers.
#[derive(Clone)]
pub struct RateTableEngine {
    rates: Arc<RateTable>,
}

impl RateTableEngine {
    pub fn new(rates: Arc<RateTable>) -> Self {
        Self { rates }
    }

    pub fn rates(&self) -> &RateTable {
        &self.rates
    }
}

impl PricingEngine for RateTableEngine {
    fn price(&self, request: &QuoteRequest) -> QuoteResult {
        price_request(&self.rates, request)
    }
}

struct BreakdownBuilder {
    lines: Vec<BreakdownLine>,
    total: Decimal,
}

impl BreakdownBuilder {
    fn new() -> Self {
        Self { lines: Vec::new(), total: Decimal::ZERO }
    }

    fn push(&mut self, label: impl Into<String>, amount: Decimal) {
        let amount = to_money(amount);
        self.total += amount;
        self.lines.push(BreakdownLine::new(label, amount));
    }

    fn total(&self) -> Decimal {
        self.total
    }

    fn finish(self) -> QuoteResult {
        QuoteResult { total: to_money(self.total), breakdown: self.lines }
    }
}

/// Compute a quote. Never fails: missing rates zero-rate, unknown promo
/// and add-on keys are no-ops, zero quantities omit their lines.
pub fn price_request(rates: &RateTable, request: &QuoteRequest) -> QuoteResult {
    let mut quote = BreakdownBuilder::new();

    service_lines(&mut quote, rates, &request.service);
    addon_lines(&mut quote, rates, &request.addons);
    surcharge_lines(&mut quote, rates, request);
    promo_line(&mut quote, rates, request.promo.as_deref());
    minimum_charge_line(&mut quote, rates);
    vat_line(&mut quote, rates);

    quote.finish()
}

fn service_lines(quote: &mut BreakdownBuilder, rates: &RateTable, service: &Service) {
    match service {
        Service::EndOfTenancy { size, bathrooms, wcs } => {
            let base = lookup(&rates.end_of_tenancy.base, &size.rate_key());
            quote.push(format!("End of tenancy clean ({})", size.label()), base.amount());
            extra_bathroom_line(quote, *bathrooms, rates.end_of_tenancy.extra_bathroom);
            if *wcs > 0 {
                let unit = rates.end_of_tenancy.extra_wc;
                quote.push(
                    format!("Extra WC ({wcs} \u{d7} {})", format_gbp(unit)),
                    unit * Decimal::from(*wcs),
                );
            }
        }
        Service::AirbnbTurnover { size, bathrooms } => {
            let base = lookup(&rates.airbnb_turnover.base, &size.rate_key());
            quote.push(format!("Airbnb turnover clean ({})", size.label()), base.amount());
            extra_bathroom_line(quote, *bathrooms, rates.airbnb_turnover.extra_bathroom);
        }
        Service::Communal { block_size, frequency, lifts, bin_store } => {
            let base = lookup(&rates.communal.base, block_size).amount();
            // Unknown frequency means no discount, same silent policy as
            // a missing size key.
            let discount = lookup(&rates.communal.frequency_discounts, frequency).amount();
            quote.push(
                format!("Communal clean ({block_size}, {frequency})"),
                base * (Decimal::ONE - discount),
            );
            if *lifts > 0 {
                let unit = rates.communal.extras.lift;
                quote.push(
                    format!("Lift cleaning ({lifts} \u{d7} {})", format_gbp(unit)),
                    unit * Decimal::from(*lifts),
                );
            }
            if *bin_store {
                quote.push("Bin store cleaning", rates.communal.extras.bin_store);
            }
        }
        Service::General { cadence } => {
            let minimum = rates.general_clean.one_off_min;
            let amount = match cadence.discount_key() {
                Some(key) => {
                    let discount = lookup(&rates.general_clean.recurring_discounts, key).amount();
                    minimum * (Decimal::ONE - discount)
                }
                None => minimum,
            };
            quote.push(format!("General clean ({})", cadence.label()), amount);
        }
        Service::Carpet { areas } => carpet_lines(quote, rates, areas),
    }
}

fn extra_bathroom_line(quote: &mut BreakdownBuilder, bathrooms: u32, unit: Decimal) {
    // First bathroom is included in the base rate.
    let extras = bathrooms.saturating_sub(1);
    if extras > 0 {
        quote.push(
            format!("Extra bathrooms ({extras} \u{d7} {})", format_gbp(unit)),
            unit * Decimal::from(extras),
        );
    }
}

fn carpet_lines(quote: &mut BreakdownBuilder, rates: &RateTable, areas: &CarpetAreas) {
    let items: [(&str, u32, Decimal); 8] = [
        ("rooms", areas.rooms, rates.carpet.room),
        ("lounges", areas.lounges, rates.carpet.lounge),
        ("bedrooms", areas.bedrooms, rates.carpet.bedroom),
        ("landings/halls", areas.landing_halls, rates.carpet.landing_hall),
        ("stair steps", areas.stair_steps, rates.carpet.stairs_per_step),
        ("flights of stairs", areas.stair_flights, rates.carpet.stairs_flat),
        ("small rugs", areas.small_rugs, rates.carpet.rug_small),
        ("large rugs", areas.large_rugs, rates.carpet.rug_large),
    ];

    for (label, count, unit) in items {
        if count > 0 {
            quote.push(
                format!("Carpet: {label} ({count} \u{d7} {})", format_gbp(unit)),
                unit * Decimal::from(count),
            );
        }
    }
}

fn addon_lines(quote: &mut BreakdownBuilder, rates: &RateTable, addons: &[String]) {
    for key in addons {
        // Unknown add-on keys are skipped, not errors.
        if let Some(price) = rates.optional_addons.get(key) {
            quote.push(format!("Add-on: {key}"), *price);
        }
    }
}

fn surcharge_lines(quote: &mut BreakdownBuilder, rates: &RateTable, request: &QuoteRequest) {
    let flags = &request.flags;
    if flags.pets && rates.pets_affect_price {
        quote.push("Pets present", rates.surcharges.pets);
    }
    if flags.urgent {
        quote.push("Urgent same-day service", rates.surcharges.urgent_same_day);
    }
    if flags.congestion {
        quote.push("Congestion zone", rates.surcharges.congestion);
    }
    if flags.parking {
        quote.push("Parking", rates.surcharges.parking_flat);
    }
}

fn promo_line(quote: &mut BreakdownBuilder, rates: &RateTable, promo: Option<&str>) {
    let Some(code) = promo else { return };
    let code = code.trim().to_uppercase();
    let Some(promo) = rates.promo_codes.get(&code) else { return };
    if !promo.active {
        return;
    }

    let discount = to_money(quote.total() * promo.percent / Decimal::ONE_HUNDRED);
    if !discount.is_zero() {
        quote.push(format!("Promo {code} (-{}%)", promo.percent.normalize()), -discount);
    }
}

fn minimum_charge_line(quote: &mut BreakdownBuilder, rates: &RateTable) {
    // Strictly after the promo step: a discount can never push the total
    // below minimum without a visible top-up line.
    if quote.total() < rates.min_charge {
        let shortfall = rates.min_charge - quote.total();
        quote.push("Minimum charge adjustment", shortfall);
    }
}

fn vat_line(quote: &mut BreakdownBuilder, rates: &RateTable) {
    if rates.vat > Decimal::ZERO {
        let vat = to_money(quote.total() * rates.vat);
        let percent = (rates.vat * Decimal::ONE_HUNDRED).normalize();
        quote.push(format!("VAT ({percent}%)"), vat);
    }
}
