//! Self-hosted e-commerce analytics: DuckDB-backed aggregation pipelines over
//! order and customer exports, a JSON API, and a server-rendered dashboard.

pub mod api;
pub mod chart;
pub mod config;
pub mod dashboard;
pub mod query;
pub mod server;
pub mod storage;
