use std::sync::Arc;

use axum::{extract::State, http::StatusCode, routing::get, Json, Router};
use chrono::Utc;
use serde::Serialize;
use tidyquote_core::RateTable;

#[derive(Clone)]
pub struct HealthState {
    rates: Arc<RateTable>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct HealthCheck {
    pub status: &'static str,
    pub detail: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub service: HealthCheck,
    pub rates: HealthCheck,
    pub checked_at: String,
}

pub fn router(rates: Arc<RateTable>) -> Router {
    Router::new().route("/health", get(health)).with_state(HealthState { rates })
}

pub async fn health(State(state): State<HealthState>) -> (StatusCode, Json<HealthResponse>) {
    let rates = rates_check(&state.rates);
    let ready = rates.status == "ready";

    let payload = HealthResponse {
        status: if ready { "ready" } else { "degraded" },
        service: HealthCheck {
            status: "ready",
            detail: "tidyquote-server runtime initialized".to_string(),
        },
        rates,
        checked_at: Utc::now().to_rfc3339(),
    };

    let status_code = if ready { StatusCode::OK } else { StatusCode::SERVICE_UNAVAILABLE };
    (status_code, Json(payload))
}

fn rates_check(rates: &RateTable) -> HealthCheck {
    let tenancy_sizes = rates.end_of_tenancy.base.len();
    let communal_blocks = rates.communal.base.len();

    if tenancy_sizes == 0 || communal_blocks == 0 {
        return HealthCheck {
            status: "degraded",
            detail: format!(
                "rate table is missing base rates \
                 ({tenancy_sizes} tenancy sizes, {communal_blocks} communal blocks)"
            ),
        };
    }

    HealthCheck {
        status: "ready",
        detail: format!(
            "rate table loaded ({tenancy_sizes} tenancy sizes, {communal_blocks} communal \
             blocks, {} promo codes)",
            rates.promo_codes.len()
        ),
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::{extract::State, http::StatusCode, Json};

    use crate::health::{health, HealthState};
    use crate::routes::tests::fixture_rates;

    #[tokio::test]
    async fn health_is_ready_with_a_populated_rate_table() {
        let (status, Json(payload)) =
            health(State(HealthState { rates: Arc::new(fixture_rates()) })).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(payload.status, "ready");
        assert_eq!(payload.rates.status, "ready");
        assert_eq!(payload.service.status, "ready");
    }

    #[tokio::test]
    async fn health_degrades_when_base_rates_are_missing() {
        let mut rates = fixture_rates();
        rates.end_of_tenancy.base.clear();

        let (status, Json(payload)) =
            health(State(HealthState { rates: Arc::new(rates) })).await;

        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(payload.status, "degraded");
        assert_eq!(payload.rates.status, "degraded");
        assert_eq!(payload.service.status, "ready");
    }
}
