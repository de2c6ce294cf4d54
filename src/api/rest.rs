use std::path::Path;
use std::sync::Arc;
use axum::{
    Router,
    routing::get,
    extract::{Query, State, Json},
    http::header,
    response::IntoResponse,
};
use chrono::Utc;
use serde::Deserialize;
use serde_json::Value;
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use tracing::Instrument;

use crate::api::state::ApiState;
use crate::error::{Error, Result};
use crate::filter::{filter_window, TimeWindow};
use crate::observability::metrics::{self, REQUEST_LATENCY};
use crate::observability::tracing::{trace_price_request, trace_ratio_request};
use crate::pricing::compute_cross_rate;
use crate::types::PriceSeries;

const QUOTE_CURRENCY: &str = "usd";

pub fn create_router(state: Arc<ApiState>, static_dir: impl AsRef<Path>) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/metrics", get(metrics_text))
        .route("/api/ratios", get(get_ratios))
        .route("/api/price-history", get(get_price_history))
        .fallback_service(ServeDir::new(static_dir.as_ref()).append_index_html_on_directories(true))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CorsLayer::permissive()),
        )
        .with_state(state)
}

async fn health_check() -> &'static str {
    "OK"
}

async fn metrics_text() -> impl IntoResponse {
    (
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        metrics::render(),
    )
}

#[derive(Debug, Default, Deserialize)]
struct RatioQuery {
    from: Option<String>,
    to: Option<String>,
}

async fn get_ratios(
    State(state): State<Arc<ApiState>>,
    Query(query): Query<RatioQuery>,
) -> Result<Json<Value>> {
    let timer = REQUEST_LATENCY.start_timer();
    let result = serve_ratios(&state, query)
        .instrument(trace_ratio_request())
        .await;
    timer.observe_duration();

    result.map(Json)
}

async fn serve_ratios(state: &ApiState, query: RatioQuery) -> Result<Value> {
    let window = TimeWindow::from_query(query.from.as_deref(), query.to.as_deref())?;

    let payload = state.ratios.fetch_snapshot().await?;
    let snapshot = state.reconciler.reconcile(payload, Utc::now()).await;
    tracing::info!(
        "Reconciled {} assets ({} live patches, cache written: {})",
        snapshot.assets.len(),
        snapshot.live_patches,
        snapshot.cache_persisted,
    );

    Ok(snapshot.render(window.as_ref()))
}

#[derive(Debug, Default, Deserialize)]
struct PriceHistoryQuery {
    coin: Option<String>,
    currency: Option<String>,
    from: Option<String>,
    to: Option<String>,
}

async fn get_price_history(
    State(state): State<Arc<ApiState>>,
    Query(query): Query<PriceHistoryQuery>,
) -> Result<Json<PriceSeries>> {
    let coin = non_empty(query.coin.as_deref())
        .ok_or(Error::MissingParameter("coin"))?
        .to_string();
    let currency = non_empty(query.currency.as_deref())
        .unwrap_or(QUOTE_CURRENCY)
        .to_lowercase();
    let window = TimeWindow::from_query(query.from.as_deref(), query.to.as_deref())?;

    let timer = REQUEST_LATENCY.start_timer();
    let span = trace_price_request(&coin, &currency);
    let result = serve_price_history(&state, &coin, &currency, window.as_ref())
        .instrument(span)
        .await;
    timer.observe_duration();

    result.map(Json)
}

async fn serve_price_history(
    state: &ApiState,
    coin: &str,
    currency: &str,
    window: Option<&TimeWindow>,
) -> Result<PriceSeries> {
    let series = if currency == QUOTE_CURRENCY {
        state.prices.get_price_series(coin).await?.as_ref().clone()
    } else {
        let base_coin = state.pricing.base_coin_for(currency);
        tracing::info!("Computing {} in {} via {}", coin, currency, base_coin);

        let (target, base) = tokio::try_join!(
            state.prices.get_price_series(coin),
            state.prices.get_price_series(&base_coin),
        )?;
        compute_cross_rate(&target, &base)
    };

    Ok(apply_window(series, window))
}

fn apply_window(series: PriceSeries, window: Option<&TimeWindow>) -> PriceSeries {
    match window {
        Some(window) if series.prices.is_some() => {
            let prices = filter_window(series.points(), Some(window));
            series.with_prices(prices)
        }
        _ => series,
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::PricePoint;

    #[test]
    fn test_window_leaves_missing_prices_alone() {
        let series = PriceSeries::default();
        let window = TimeWindow { from: 0, to: 1 };
        assert_eq!(apply_window(series.clone(), Some(&window)), series);
    }

    #[test]
    fn test_window_trims_prices() {
        let series = PriceSeries::from_points(vec![PricePoint::new(0, 1.0), PricePoint::new(5_000, 2.0)]);
        let window = TimeWindow { from: 1_000, to: 10_000 };
        assert_eq!(apply_window(series, Some(&window)).points(), &[PricePoint::new(5_000, 2.0)]);
    }

    #[test]
    fn test_blank_parameters_count_as_missing() {
        assert_eq!(non_empty(Some("  ")), None);
        assert_eq!(non_empty(Some(" snek ")), Some("snek"));
        assert_eq!(non_empty(None), None);
    }
}
