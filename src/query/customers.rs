use crate::query::interval::Granularity;
use crate::query::pagination::{PageRequest, Paginated};
use duckdb::Connection;

/// New customers acquired per interval (row count over the customers table).
#[derive(Debug, Clone, serde::Serialize)]
pub struct CustomerBucket {
    pub date: String,
    #[serde(rename = "totalCustomers")]
    pub total_customers: u64,
}

/// Customers who placed two or more orders within a single interval.
#[derive(Debug, Clone, serde::Serialize)]
pub struct RepeatBucket {
    pub date: String,
    pub repeat_customers: u64,
}

/// Customer count per city. The `_id` wire name mirrors the grouping key of
/// the upstream API; a missing address groups under null.
#[derive(Debug, Clone, serde::Serialize)]
pub struct LocationBucket {
    #[serde(rename = "_id")]
    pub city: Option<String>,
    pub count: u64,
}

/// New-customer counts bucketed by signup interval, newest bucket first.
pub fn new_customers_by_interval(
    conn: &Connection,
    granularity: Granularity,
    window: PageRequest,
) -> Result<Paginated<CustomerBucket>, duckdb::Error> {
    let key = granularity.date_key_expr();

    let sql = format!(
        "SELECT {key} AS bucket, COUNT(*) AS total_customers
         FROM customers
         GROUP BY bucket
         ORDER BY bucket DESC
         LIMIT ? OFFSET ?"
    );

    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt
        .query_map(
            duckdb::params![window.limit_i64(), window.offset_i64()],
            |row| {
                Ok(CustomerBucket {
                    date: row.get(0)?,
                    total_customers: row.get(1)?,
                })
            },
        )?
        .filter_map(Result::ok)
        .collect();

    let total_buckets = crate::query::count_buckets(conn, "customers", &key)?;
    Ok(Paginated { rows, total_buckets })
}

/// Repeat-customer counts per order interval, newest bucket first.
///
/// Two-stage grouping: orders are first grouped by (customer, bucket) with a
/// per-pair order count, pairs with more than one order survive, and the
/// survivors are regrouped by bucket counting qualifying customers. A
/// customer with exactly one order in a bucket contributes nothing.
///
/// The page total counts every order bucket, including buckets without any
/// repeat buyer — same denominator as the other interval pipelines.
pub fn repeat_customers_by_interval(
    conn: &Connection,
    granularity: Granularity,
    window: PageRequest,
) -> Result<Paginated<RepeatBucket>, duckdb::Error> {
    let key = granularity.date_key_expr();

    let sql = format!(
        "SELECT bucket, COUNT(*) AS repeat_customers
         FROM (
             SELECT {key} AS bucket, customer_id, COUNT(*) AS orders_placed
             FROM orders
             GROUP BY bucket, customer_id
         )
         WHERE orders_placed > 1
         GROUP BY bucket
         ORDER BY bucket DESC
         LIMIT ? OFFSET ?"
    );

    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt
        .query_map(
            duckdb::params![window.limit_i64(), window.offset_i64()],
            |row| {
                Ok(RepeatBucket {
                    date: row.get(0)?,
                    repeat_customers: row.get(1)?,
                })
            },
        )?
        .filter_map(Result::ok)
        .collect();

    let total_buckets = crate::query::count_buckets(conn, "orders", &key)?;
    Ok(Paginated { rows, total_buckets })
}

/// Customer counts grouped by city, sorted by city ascending with the
/// missing-address group first.
pub fn customers_by_location(
    conn: &Connection,
    window: PageRequest,
) -> Result<Paginated<LocationBucket>, duckdb::Error> {
    let mut stmt = conn.prepare(
        "SELECT city, COUNT(*) AS count
         FROM customers
         GROUP BY city
         ORDER BY city ASC NULLS FIRST
         LIMIT ? OFFSET ?",
    )?;
    let rows = stmt
        .query_map(
            duckdb::params![window.limit_i64(), window.offset_i64()],
            |row| {
                Ok(LocationBucket {
                    city: row.get(0)?,
                    count: row.get(1)?,
                })
            },
        )?
        .filter_map(Result::ok)
        .collect();

    let total_buckets: u64 = conn
        .prepare("SELECT COUNT(*) FROM (SELECT city FROM customers GROUP BY city)")?
        .query_row([], |row| row.get(0))?;

    Ok(Paginated { rows, total_buckets })
}
