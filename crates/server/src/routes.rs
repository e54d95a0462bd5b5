//! Customer-facing quote routes.
//!
//! HTML endpoints:
//! - `GET  /`               — quote form
//! - `POST /quote`          — form submission, rendered result page
//!
//! JSON API endpoints:
//! - `POST /quote/preview`  — price a structured request
//! - `POST /book`           — price and record a booking
//! - `GET  /bookings`       — list recorded bookings

use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    response::Html,
    routing::{get, post},
    Form, Json, Router,
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tera::{Context, Tera};
use tidyquote_copy::QuoteCopywriter;
use tidyquote_core::{
    format_gbp, BookingRecord, BreakdownLine, Cadence, CarpetAreas, CustomerDetails,
    PricingEngine, PropertySize, QuoteRequest, RateTableEngine, Service,
};
use tracing::{info, warn};

use crate::booking_log::BookingLog;

#[derive(Clone)]
pub struct QuoteState {
    pub engine: RateTableEngine,
    pub copywriter: Arc<QuoteCopywriter>,
    pub bookings: Arc<BookingLog>,
    templates: Arc<Tera>,
}

impl QuoteState {
    pub fn new(
        engine: RateTableEngine,
        copywriter: Arc<QuoteCopywriter>,
        bookings: Arc<BookingLog>,
    ) -> Self {
        Self { engine, copywriter, bookings, templates: init_templates() }
    }
}

/// Tera instance with filesystem templates when present and embedded
/// fallbacks otherwise.
fn init_templates() -> Arc<Tera> {
    let mut tera = match Tera::new("templates/**/*") {
        Ok(tera) => tera,
        Err(error) => {
            warn!(
                event_name = "server.templates.filesystem_unavailable",
                error = %error,
                "failed to load templates from filesystem, using embedded templates"
            );
            Tera::default()
        }
    };

    tera.add_raw_template("index.html", include_str!("../../../templates/index.html")).ok();
    tera.add_raw_template("result.html", include_str!("../../../templates/result.html")).ok();

    Arc::new(tera)
}

pub fn router(state: QuoteState) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/quote", post(quote_form))
        .route("/quote/preview", post(preview))
        .route("/book", post(book))
        .route("/bookings", get(bookings))
        .with_state(state)
}

// ---------------------------------------------------------------------------
// Request / Response types
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
pub struct PreviewResponse {
    pub total: Decimal,
    pub breakdown: Vec<BreakdownLine>,
    pub copy: String,
}

#[derive(Debug, Deserialize)]
pub struct BookRequest {
    pub customer: CustomerDetails,
    #[serde(flatten)]
    pub request: QuoteRequest,
}

#[derive(Debug, Serialize)]
pub struct BookResponse {
    pub id: String,
    pub created_at: String,
    pub total: Decimal,
    pub breakdown: Vec<BreakdownLine>,
}

/// Flat quote form as posted by the HTML page. Mapped onto the tagged
/// request; an unknown service token is a 400, never an empty quote.
#[derive(Debug, Default, Deserialize)]
pub struct QuoteForm {
    pub service: String,
    pub size: Option<String>,
    pub bathrooms: Option<u32>,
    pub wcs: Option<u32>,
    pub block_size: Option<String>,
    pub frequency: Option<String>,
    pub lifts: Option<u32>,
    pub bin_store: Option<String>,
    pub cadence: Option<String>,
    pub rooms: Option<u32>,
    pub lounges: Option<u32>,
    pub bedrooms: Option<u32>,
    pub landing_halls: Option<u32>,
    pub stair_steps: Option<u32>,
    pub stair_flights: Option<u32>,
    pub small_rugs: Option<u32>,
    pub large_rugs: Option<u32>,
    pub pets: Option<String>,
    pub urgent: Option<String>,
    pub congestion: Option<String>,
    pub parking: Option<String>,
    pub promo: Option<String>,
    pub addons: Option<String>,
}

impl QuoteForm {
    pub fn into_request(self) -> Result<QuoteRequest, String> {
        let service = match self.service.trim() {
            "end_of_tenancy" => Service::EndOfTenancy {
                size: parse_size(self.size.as_deref())?,
                bathrooms: self.bathrooms.unwrap_or(0),
                wcs: self.wcs.unwrap_or(0),
            },
            "airbnb" | "airbnb_turnover" => Service::AirbnbTurnover {
                size: parse_size(self.size.as_deref())?,
                bathrooms: self.bathrooms.unwrap_or(0),
            },
            "communal" => Service::Communal {
                block_size: self.block_size.unwrap_or_default(),
                frequency: self.frequency.unwrap_or_default(),
                lifts: self.lifts.unwrap_or(0),
                bin_store: checkbox(self.bin_store.as_deref()),
            },
            "general" => Service::General { cadence: parse_cadence(self.cadence.as_deref())? },
            "carpet" => Service::Carpet {
                areas: CarpetAreas {
                    rooms: self.rooms.unwrap_or(0),
                    lounges: self.lounges.unwrap_or(0),
                    bedrooms: self.bedrooms.unwrap_or(0),
                    landing_halls: self.landing_halls.unwrap_or(0),
                    stair_steps: self.stair_steps.unwrap_or(0),
                    stair_flights: self.stair_flights.unwrap_or(0),
                    small_rugs: self.small_rugs.unwrap_or(0),
                    large_rugs: self.large_rugs.unwrap_or(0),
                },
            },
            other => return Err(format!("unknown service `{other}`")),
        };

        let addons = self
            .addons
            .unwrap_or_default()
            .split(',')
            .map(str::trim)
            .filter(|key| !key.is_empty())
            .map(str::to_string)
            .collect();

        Ok(QuoteRequest {
            service,
            flags: tidyquote_core::AccessFlags {
                pets: checkbox(self.pets.as_deref()),
                urgent: checkbox(self.urgent.as_deref()),
                congestion: checkbox(self.congestion.as_deref()),
                parking: checkbox(self.parking.as_deref()),
            },
            promo: self.promo.filter(|code| !code.trim().is_empty()),
            addons,
        })
    }
}

fn checkbox(value: Option<&str>) -> bool {
    matches!(value, Some("on" | "true" | "1" | "yes"))
}

fn parse_size(size: Option<&str>) -> Result<PropertySize, String> {
    let token = size.ok_or_else(|| "property size is required".to_string())?;
    token.parse::<PropertySize>().map_err(|error| error.to_string())
}

fn parse_cadence(cadence: Option<&str>) -> Result<Cadence, String> {
    match cadence.map(str::trim).unwrap_or("") {
        "" | "one_off" => Ok(Cadence::OneOff),
        "weekly" => Ok(Cadence::Weekly),
        "biweekly" => Ok(Cadence::Biweekly),
        "monthly" => Ok(Cadence::Monthly),
        other => Err(format!("unknown cadence `{other}`")),
    }
}

pub fn request_summary(request: &QuoteRequest) -> String {
    let service = match &request.service {
        Service::EndOfTenancy { size, bathrooms, wcs } => {
            format!("end of tenancy clean, {} property, {bathrooms} bathrooms, {wcs} WCs", size.label())
        }
        Service::AirbnbTurnover { size, bathrooms } => {
            format!("Airbnb turnover clean, {} property, {bathrooms} bathrooms", size.label())
        }
        Service::Communal { block_size, frequency, .. } => {
            format!("communal block clean, {block_size} block, {frequency}")
        }
        Service::General { cadence } => format!("general clean, {}", cadence.label()),
        Service::Carpet { .. } => "carpet clean".to_string(),
    };

    let mut notes = Vec::new();
    if request.flags.pets {
        notes.push("pets at the property");
    }
    if request.flags.urgent {
        notes.push("urgent same-day");
    }
    if notes.is_empty() {
        service
    } else {
        format!("{service} ({})", notes.join(", "))
    }
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

pub async fn index(State(state): State<QuoteState>) -> Result<Html<String>, StatusCode> {
    let mut context = Context::new();
    let addons: Vec<&String> = state.engine.rates().optional_addons.keys().collect();
    context.insert("addons", &addons);

    state
        .templates
        .render("index.html", &context)
        .map(Html)
        .map_err(|error| {
            warn!(
                event_name = "server.templates.render_failed",
                template = "index.html",
                error = %error,
                "template rendering failed"
            );
            StatusCode::INTERNAL_SERVER_ERROR
        })
}

pub async fn preview(
    State(state): State<QuoteState>,
    Json(request): Json<QuoteRequest>,
) -> Json<PreviewResponse> {
    let result = state.engine.price(&request);
    let copy = state.copywriter.narrate(&request_summary(&request), &result).await;

    info!(
        event_name = "quote.preview",
        total = %result.total,
        lines = result.breakdown.len(),
        "quote previewed"
    );

    Json(PreviewResponse { total: result.total, breakdown: result.breakdown, copy })
}

pub async fn quote_form(
    State(state): State<QuoteState>,
    Form(form): Form<QuoteForm>,
) -> Result<Html<String>, (StatusCode, Html<String>)> {
    let request = form.into_request().map_err(|message| {
        (
            StatusCode::BAD_REQUEST,
            Html(format!("<p>The quote request could not be processed: {message}</p>")),
        )
    })?;

    let result = state.engine.price(&request);
    let copy = state.copywriter.narrate(&request_summary(&request), &result).await;

    let mut context = Context::new();
    let lines: Vec<(String, String)> = result
        .breakdown
        .iter()
        .map(|line| (line.label.clone(), format_gbp(line.amount)))
        .collect();
    context.insert("lines", &lines);
    context.insert("total", &format_gbp(result.total));
    context.insert("copy", &copy);

    info!(
        event_name = "quote.form_submitted",
        total = %result.total,
        lines = result.breakdown.len(),
        "quote form priced"
    );

    state.templates.render("result.html", &context).map(Html).map_err(|error| {
        warn!(
            event_name = "server.templates.render_failed",
            template = "result.html",
            error = %error,
            "template rendering failed"
        );
        (StatusCode::INTERNAL_SERVER_ERROR, Html("<p>Something went wrong.</p>".to_string()))
    })
}

pub async fn book(
    State(state): State<QuoteState>,
    Json(body): Json<BookRequest>,
) -> (StatusCode, Json<BookResponse>) {
    let result = state.engine.price(&body.request);
    let record = BookingRecord::new(body.customer, body.request, result.clone());

    let response = BookResponse {
        id: record.id.to_string(),
        created_at: record.created_at.to_rfc3339(),
        total: result.total,
        breakdown: result.breakdown,
    };

    state.bookings.record(record).await;
    info!(
        event_name = "quote.booked",
        booking_id = %response.id,
        total = %response.total,
        "quote booked"
    );

    (StatusCode::CREATED, Json(response))
}

pub async fn bookings(State(state): State<QuoteState>) -> Json<Vec<BookingRecord>> {
    Json(state.bookings.list().await)
}

#[cfg(test)]
pub(crate) mod tests {
    use std::collections::BTreeMap;
    use std::sync::Arc;

    use axum::extract::State;
    use axum::Json;
    use rust_decimal::Decimal;
    use tidyquote_copy::QuoteCopywriter;
    use tidyquote_core::rates::{
        CarpetRates, CommunalExtras, CommunalRates, GeneralCleanRates, PromoCode, RateTable,
        SurchargeRates, TenancyRates, TurnoverRates,
    };
    use tidyquote_core::{CustomerDetails, RateTableEngine};

    use crate::booking_log::BookingLog;

    use super::{book, bookings, preview, BookRequest, QuoteForm, QuoteState};

    pub(crate) fn fixture_rates() -> RateTable {
        RateTable {
            end_of_tenancy: TenancyRates {
                base: BTreeMap::from([
                    ("studio".to_string(), Decimal::from(120)),
                    ("2_bed".to_string(), Decimal::from(180)),
                ]),
                extra_bathroom: Decimal::from(20),
                extra_wc: Decimal::from(15),
            },
            airbnb_turnover: TurnoverRates {
                base: BTreeMap::from([("studio".to_string(), Decimal::from(45))]),
                extra_bathroom: Decimal::from(10),
            },
            communal: CommunalRates {
                base: BTreeMap::from([("small".to_string(), Decimal::from(100))]),
                frequency_discounts: BTreeMap::from([(
                    "monthly".to_string(),
                    Decimal::new(10, 2),
                )]),
                extras: CommunalExtras { lift: Decimal::from(12), bin_store: Decimal::from(18) },
            },
            general_clean: GeneralCleanRates {
                one_off_min: Decimal::from(50),
                recurring_discounts: BTreeMap::new(),
            },
            carpet: CarpetRates {
                room: Decimal::from(30),
                lounge: Decimal::from(40),
                bedroom: Decimal::from(28),
                landing_hall: Decimal::from(20),
                stairs_per_step: Decimal::new(250, 2),
                stairs_flat: Decimal::from(35),
                rug_small: Decimal::from(15),
                rug_large: Decimal::from(25),
            },
            optional_addons: BTreeMap::from([("oven_clean".to_string(), Decimal::from(35))]),
            surcharges: SurchargeRates {
                pets: Decimal::from(30),
                urgent_same_day: Decimal::from(40),
                congestion: Decimal::from(15),
                parking_flat: Decimal::from(10),
            },
            promo_codes: BTreeMap::from([(
                "SAVE10".to_string(),
                PromoCode { active: true, percent: Decimal::from(10) },
            )]),
            min_charge: Decimal::from(50),
            vat: Decimal::ZERO,
            pets_affect_price: true,
        }
    }

    fn state() -> QuoteState {
        let engine = RateTableEngine::new(Arc::new(fixture_rates()));
        let copywriter =
            Arc::new(QuoteCopywriter::new(Arc::new(tidyquote_copy::DisabledLlm)));
        QuoteState::new(engine, copywriter, Arc::new(BookingLog::new()))
    }

    #[tokio::test]
    async fn preview_prices_and_falls_back_to_plain_copy() {
        let request = serde_json::from_str(
            r#"{"service":"end_of_tenancy","size":"2_bed","bathrooms":2,"wcs":1,
                "flags":{"pets":true}}"#,
        )
        .expect("request should parse");

        let Json(response) = preview(State(state()), Json(request)).await;

        assert_eq!(response.total, Decimal::from(245));
        assert_eq!(response.breakdown.len(), 4);
        assert!(response.copy.contains("\u{a3}245.00"));
    }

    #[tokio::test]
    async fn book_records_the_quote_and_lists_it() {
        let state = state();
        let body = BookRequest {
            customer: CustomerDetails {
                name: "Alex".to_string(),
                email: "alex@example.com".to_string(),
                postcode: Some("E2 8AA".to_string()),
            },
            request: serde_json::from_str(r#"{"service":"general"}"#).expect("request"),
        };

        let (status, Json(response)) = book(State(state.clone()), Json(body)).await;
        assert_eq!(status, axum::http::StatusCode::CREATED);
        assert_eq!(response.total, Decimal::from(50));

        let Json(list) = bookings(State(state)).await;
        assert_eq!(list.len(), 1);
        assert_eq!(list[0].id.to_string(), response.id);
        assert_eq!(list[0].customer.name, "Alex");
    }

    #[test]
    fn form_maps_checkboxes_tokens_and_addon_lists() {
        let form = QuoteForm {
            service: "end_of_tenancy".to_string(),
            size: Some("2_bed".to_string()),
            bathrooms: Some(2),
            wcs: Some(1),
            pets: Some("on".to_string()),
            promo: Some("save10".to_string()),
            addons: Some("oven_clean, mystery_addon".to_string()),
            ..QuoteForm::default()
        };

        let request = form.into_request().expect("form should map");
        assert!(request.flags.pets);
        assert!(!request.flags.urgent);
        assert_eq!(request.promo.as_deref(), Some("save10"));
        assert_eq!(request.addons, vec!["oven_clean", "mystery_addon"]);
    }

    #[test]
    fn form_rejects_unknown_service_tokens() {
        let form = QuoteForm { service: "window_clean".to_string(), ..QuoteForm::default() };
        let error = form.into_request().expect_err("unknown service should fail");
        assert!(error.contains("window_clean"));
    }

    #[test]
    fn form_requires_a_size_for_property_services() {
        let form = QuoteForm { service: "airbnb".to_string(), ..QuoteForm::default() };
        assert!(form.into_request().is_err());
    }
}
