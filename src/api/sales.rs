use crate::api::errors::ApiError;
use crate::api::params::{SalesParams, SalesQuery};
use crate::query::growth::{self, GrowthBucket};
use crate::query::interval::Granularity;
use crate::query::pagination::{page_count, PageEnvelope};
use crate::query::sales;
use crate::server::AppState;
use axum::extract::{Query, State};
use axum::response::Response;
use std::sync::Arc;

/// GET /api/sales — interval-bucketed sales totals, quarterly totals, or the
/// growth-rate series, selected by the `by*` flags.
///
/// Responds with `{data, noOfPages}` or a literal `null` when the requested
/// window holds no buckets.
pub async fn get_sales(
    State(state): State<Arc<AppState>>,
    Query(params): Query<SalesParams>,
) -> Result<Response, ApiError> {
    let window = params.window(state.default_limit);
    let kind = params.dispatch();

    let cache_key = format!("sales:{kind:?}:{}:{}", window.page, window.limit);
    if let Some(body) = state.cache.get(&cache_key) {
        return Ok(crate::api::json_response(body));
    }

    let store = state.store.clone();
    let body = tokio::task::spawn_blocking(move || -> Result<String, ApiError> {
        let body = match kind {
            SalesQuery::GrowthRate(granularity) => {
                let page =
                    store.with(|conn| growth::orders_by_interval(conn, granularity, window))?;
                let envelope: Option<PageEnvelope<GrowthBucket>> = if page.rows.is_empty() {
                    None
                } else {
                    Some(PageEnvelope {
                        data: growth::derive_growth_rates(&page.rows),
                        no_of_pages: page_count(page.total_buckets, window.limit),
                    })
                };
                serde_json::to_string(&envelope)
            }
            SalesQuery::ByQuarter => {
                let page = store
                    .with(|conn| sales::sales_by_interval(conn, Granularity::Quarter, window))?;
                serde_json::to_string(&page.into_envelope(window.limit))
            }
            SalesQuery::ByInterval(granularity) => {
                let page =
                    store.with(|conn| sales::sales_by_interval(conn, granularity, window))?;
                serde_json::to_string(&page.into_envelope(window.limit))
            }
        };
        body.map_err(|e| ApiError::Internal(format!("Serialization failed: {e}")))
    })
    .await
    .map_err(|e| ApiError::Internal(format!("Query task panicked: {e}")))??;

    state.cache.put(cache_key, body.clone());
    Ok(crate::api::json_response(body))
}
