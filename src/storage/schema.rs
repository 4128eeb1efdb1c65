use duckdb::Connection;

/// SQL to create the two source tables. Rows are immutable once imported;
/// every query is a read-only aggregation over them.
///
/// `total_price` stays a decimal string as exported and is cast to a double
/// at query time.
pub const CREATE_SOURCE_TABLES: &str = r"
CREATE TABLE IF NOT EXISTS orders (
    order_id    BIGINT,
    created_at  TIMESTAMP NOT NULL,
    total_price VARCHAR NOT NULL,
    currency    VARCHAR(3),
    customer_id BIGINT
);
CREATE TABLE IF NOT EXISTS customers (
    customer_id BIGINT,
    created_at  TIMESTAMP NOT NULL,
    city        VARCHAR,
    country     VARCHAR
);
";

/// Initialize the database schema.
pub fn init_schema(conn: &Connection) -> Result<(), duckdb::Error> {
    conn.execute_batch(CREATE_SOURCE_TABLES)?;
    Ok(())
}
