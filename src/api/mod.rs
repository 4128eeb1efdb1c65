pub mod customers;
pub mod errors;
pub mod params;
pub mod sales;

use axum::http::header;
use axum::response::{IntoResponse, Response};

/// Wrap an already-serialized JSON body (possibly the literal `null`) in a
/// response. Used for both fresh and cached payloads.
pub(crate) fn json_response(body: String) -> Response {
    ([(header::CONTENT_TYPE, "application/json")], body).into_response()
}
