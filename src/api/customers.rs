use crate::api::errors::ApiError;
use crate::api::params::{CustomersParams, CustomersQuery};
use crate::query::customers;
use crate::server::AppState;
use axum::extract::{Query, State};
use axum::response::Response;
use std::sync::Arc;

/// GET /api/customers — new-customer counts, repeat-customer counts, or the
/// per-city breakdown, selected by the flags. Same `{data, noOfPages}` /
/// `null` envelope as the sales endpoint.
pub async fn get_customers(
    State(state): State<Arc<AppState>>,
    Query(params): Query<CustomersParams>,
) -> Result<Response, ApiError> {
    let window = params.window(state.default_limit);
    let kind = params.dispatch();

    let cache_key = format!("customers:{kind:?}:{}:{}", window.page, window.limit);
    if let Some(body) = state.cache.get(&cache_key) {
        return Ok(crate::api::json_response(body));
    }

    let store = state.store.clone();
    let body = tokio::task::spawn_blocking(move || -> Result<String, ApiError> {
        let body = match kind {
            CustomersQuery::Repeated(granularity) => {
                let page = store
                    .with(|conn| customers::repeat_customers_by_interval(conn, granularity, window))?;
                serde_json::to_string(&page.into_envelope(window.limit))
            }
            CustomersQuery::ByLocation => {
                let page = store.with(|conn| customers::customers_by_location(conn, window))?;
                serde_json::to_string(&page.into_envelope(window.limit))
            }
            CustomersQuery::NewCustomers(granularity) => {
                let page = store
                    .with(|conn| customers::new_customers_by_interval(conn, granularity, window))?;
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
