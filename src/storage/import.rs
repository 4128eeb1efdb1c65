use chrono::{DateTime, NaiveDateTime};
use duckdb::Connection;
use serde::Deserialize;
use std::path::Path;

/// Errors raised while loading the JSON exports.
#[derive(Debug)]
pub enum ImportError {
    Io(std::io::Error),
    Json(serde_json::Error),
    Db(duckdb::Error),
}

impl std::fmt::Display for ImportError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io(e) => write!(f, "read error: {e}"),
            Self::Json(e) => write!(f, "parse error: {e}"),
            Self::Db(e) => write!(f, "database error: {e}"),
        }
    }
}

impl std::error::Error for ImportError {}

impl From<std::io::Error> for ImportError {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e)
    }
}

impl From<serde_json::Error> for ImportError {
    fn from(e: serde_json::Error) -> Self {
        Self::Json(e)
    }
}

impl From<duckdb::Error> for ImportError {
    fn from(e: duckdb::Error) -> Self {
        Self::Db(e)
    }
}

/// One order from a Shopify-shaped export. Only the fields the pipelines
/// read are deserialized; everything else in the export is ignored.
#[derive(Debug, Deserialize)]
pub struct OrderRecord {
    pub id: Option<i64>,
    pub created_at: String,
    pub total_price_set: PriceSet,
    pub currency: Option<String>,
    pub customer: Option<CustomerRef>,
}

#[derive(Debug, Deserialize)]
pub struct PriceSet {
    pub shop_money: ShopMoney,
}

#[derive(Debug, Deserialize)]
pub struct ShopMoney {
    /// Decimal amount as a string, e.g. "199.99". Stored verbatim.
    pub amount: String,
}

#[derive(Debug, Deserialize)]
pub struct CustomerRef {
    pub id: i64,
}

/// One customer from the export.
#[derive(Debug, Deserialize)]
pub struct CustomerRecord {
    pub id: Option<i64>,
    pub created_at: String,
    pub default_address: Option<Address>,
}

#[derive(Debug, Deserialize)]
pub struct Address {
    pub city: Option<String>,
    pub country: Option<String>,
}

/// Parse an export timestamp. Accepts RFC 3339 (Shopify's format) and plain
/// `YYYY-MM-DD HH:MM:SS`, normalized to UTC.
fn parse_timestamp(raw: &str) -> Option<NaiveDateTime> {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.naive_utc())
        .or_else(|_| NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S"))
        .ok()
}

/// Load orders from a JSON array file. Rows with unparseable timestamps are
/// skipped with a warning; the return value is the number inserted.
pub fn import_orders(conn: &Connection, path: &Path) -> Result<usize, ImportError> {
    let contents = std::fs::read_to_string(path)?;
    let records: Vec<OrderRecord> = serde_json::from_str(&contents)?;
    insert_orders(conn, &records)
}

pub fn insert_orders(conn: &Connection, records: &[OrderRecord]) -> Result<usize, ImportError> {
    let mut stmt = conn.prepare(
        "INSERT INTO orders (order_id, created_at, total_price, currency, customer_id)
         VALUES (?, ?, ?, ?, ?)",
    )?;

    let mut inserted = 0;
    for record in records {
        let Some(created_at) = parse_timestamp(&record.created_at) else {
            tracing::warn!(raw = %record.created_at, "Skipping order with bad created_at");
            continue;
        };
        stmt.execute(duckdb::params![
            record.id,
            created_at.format("%Y-%m-%d %H:%M:%S").to_string(),
            record.total_price_set.shop_money.amount,
            record.currency,
            record.customer.as_ref().map(|c| c.id),
        ])?;
        inserted += 1;
    }
    Ok(inserted)
}

/// Load customers from a JSON array file, same skip-and-warn policy.
pub fn import_customers(conn: &Connection, path: &Path) -> Result<usize, ImportError> {
    let contents = std::fs::read_to_string(path)?;
    let records: Vec<CustomerRecord> = serde_json::from_str(&contents)?;
    insert_customers(conn, &records)
}

pub fn insert_customers(
    conn: &Connection,
    records: &[CustomerRecord],
) -> Result<usize, ImportError> {
    let mut stmt = conn.prepare(
        "INSERT INTO customers (customer_id, created_at, city, country) VALUES (?, ?, ?, ?)",
    )?;

    let mut inserted = 0;
    for record in records {
        let Some(created_at) = parse_timestamp(&record.created_at) else {
            tracing::warn!(raw = %record.created_at, "Skipping customer with bad created_at");
            continue;
        };
        let address = record.default_address.as_ref();
        stmt.execute(duckdb::params![
            record.id,
            created_at.format("%Y-%m-%d %H:%M:%S").to_string(),
            address.and_then(|a| a.city.as_deref()),
            address.and_then(|a| a.country.as_deref()),
        ])?;
        inserted += 1;
    }
    Ok(inserted)
}
