use crate::query::interval::Granularity;
use crate::query::pagination::{PageRequest, Paginated};
use duckdb::Connection;

/// One interval's sales total. The source stores the order amount as a
/// decimal string; the pipeline casts it to a double when summing.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct SalesBucket {
    pub date: String,
    #[serde(rename = "totalAmount")]
    pub total_amount: f64,
}

/// Sales totals bucketed by interval, newest bucket first.
pub fn sales_by_interval(
    conn: &Connection,
    granularity: Granularity,
    window: PageRequest,
) -> Result<Paginated<SalesBucket>, duckdb::Error> {
    let key = granularity.date_key_expr();

    let sql = format!(
        "SELECT {key} AS bucket, SUM(CAST(total_price AS DOUBLE)) AS total_amount
         FROM orders
         GROUP BY bucket
         ORDER BY bucket DESC
         LIMIT ? OFFSET ?"
    );

    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt
        .query_map(
            duckdb::params![window.limit_i64(), window.offset_i64()],
            |row| {
                Ok(SalesBucket {
                    date: row.get(0)?,
                    total_amount: row.get(1)?,
                })
            },
        )?
        .filter_map(Result::ok)
        .collect();

    let total_buckets = crate::query::count_buckets(conn, "orders", &key)?;
    Ok(Paginated { rows, total_buckets })
}
