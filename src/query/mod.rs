pub mod cache;
pub mod customers;
pub mod growth;
pub mod interval;
pub mod pagination;
pub mod sales;

use duckdb::Connection;

/// Independent counting branch shared by the interval pipelines: the number
/// of distinct buckets across the whole table, ignoring pagination.
pub(crate) fn count_buckets(
    conn: &Connection,
    table: &str,
    key_expr: &str,
) -> Result<u64, duckdb::Error> {
    // table and key_expr come from fixed enums, never from request input
    let sql = format!("SELECT COUNT(*) FROM (SELECT {key_expr} AS bucket FROM {table} GROUP BY bucket)");
    conn.prepare(&sql)?.query_row([], |row| row.get(0))
}
