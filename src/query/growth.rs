use crate::query::interval::Granularity;
use crate::query::pagination::{PageRequest, Paginated};
use duckdb::Connection;

/// Order count per interval — the base metric for the growth-rate series.
#[derive(Debug, Clone, serde::Serialize)]
pub struct OrderCountBucket {
    pub date: String,
    #[serde(rename = "totalOrders")]
    pub total_orders: u64,
}

/// Percentage change of order volume against the chronologically previous
/// bucket. `None` (serialized as JSON null) when the previous bucket had
/// zero orders and the rate is undefined.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct GrowthBucket {
    pub date: String,
    #[serde(rename = "growthRate")]
    pub growth_rate: Option<f64>,
}

/// Order counts bucketed by interval, newest bucket first.
pub fn orders_by_interval(
    conn: &Connection,
    granularity: Granularity,
    window: PageRequest,
) -> Result<Paginated<OrderCountBucket>, duckdb::Error> {
    let key = granularity.date_key_expr();

    let sql = format!(
        "SELECT {key} AS bucket, COUNT(*) AS total_orders
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
                Ok(OrderCountBucket {
                    date: row.get(0)?,
                    total_orders: row.get(1)?,
                })
            },
        )?
        .filter_map(Result::ok)
        .collect();

    let total_buckets = crate::query::count_buckets(conn, "orders", &key)?;
    Ok(Paginated { rows, total_buckets })
}

/// Derive growth rates from a descending (newest-first) bucket window.
///
/// Each bucket is compared against its chronological predecessor, which is
/// the *next* element in the list. The window's oldest bucket always gets
/// rate 0: its real predecessor lives beyond the fetched page and is not
/// consulted.
#[allow(clippy::cast_precision_loss)]
pub fn derive_growth_rates(buckets: &[OrderCountBucket]) -> Vec<GrowthBucket> {
    let Some((oldest, rest)) = buckets.split_last() else {
        return Vec::new();
    };

    let mut rates: Vec<GrowthBucket> = rest
        .iter()
        .zip(buckets.iter().skip(1))
        .map(|(current, previous)| {
            let rate = if previous.total_orders == 0 {
                None
            } else {
                let cur = current.total_orders as f64;
                let prev = previous.total_orders as f64;
                Some((cur - prev) / prev * 100.0)
            };
            GrowthBucket {
                date: current.date.clone(),
                growth_rate: rate,
            }
        })
        .collect();

    rates.push(GrowthBucket {
        date: oldest.date.clone(),
        growth_rate: Some(0.0),
    });
    rates
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bucket(date: &str, total_orders: u64) -> OrderCountBucket {
        OrderCountBucket {
            date: date.to_string(),
            total_orders,
        }
    }

    #[test]
    fn test_growth_rate_basic() {
        // newest first: 150 orders after 100 orders => +50%
        let rates = derive_growth_rates(&[bucket("2024-02", 150), bucket("2024-01", 100)]);
        assert_eq!(rates.len(), 2);
        assert_eq!(rates[0].date, "2024-02");
        assert!((rates[0].growth_rate.unwrap() - 50.0).abs() < f64::EPSILON);
        assert_eq!(rates[1], GrowthBucket {
            date: "2024-01".to_string(),
            growth_rate: Some(0.0),
        });
    }

    #[test]
    fn test_growth_rate_negative() {
        let rates = derive_growth_rates(&[bucket("2024-02", 50), bucket("2024-01", 100)]);
        assert!((rates[0].growth_rate.unwrap() + 50.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_oldest_bucket_is_zero() {
        let rates = derive_growth_rates(&[
            bucket("2024-03", 10),
            bucket("2024-02", 20),
            bucket("2024-01", 5),
        ]);
        assert_eq!(rates.last().unwrap().growth_rate, Some(0.0));
        assert_eq!(rates.last().unwrap().date, "2024-01");
    }

    #[test]
    fn test_zero_predecessor_yields_null() {
        let rates = derive_growth_rates(&[bucket("2024-02", 10), bucket("2024-01", 0)]);
        assert_eq!(rates[0].growth_rate, None);
        let json = serde_json::to_string(&rates[0]).unwrap();
        assert_eq!(json, r#"{"date":"2024-02","growthRate":null}"#);
    }

    #[test]
    fn test_empty_window() {
        assert!(derive_growth_rates(&[]).is_empty());
    }

    #[test]
    fn test_single_bucket_window() {
        let rates = derive_growth_rates(&[bucket("2024-01", 42)]);
        assert_eq!(rates.len(), 1);
        assert_eq!(rates[0].growth_rate, Some(0.0));
    }

    #[test]
    fn test_order_preserved() {
        let rates = derive_growth_rates(&[
            bucket("2024-04", 4),
            bucket("2024-03", 3),
            bucket("2024-02", 2),
            bucket("2024-01", 1),
        ]);
        let dates: Vec<&str> = rates.iter().map(|r| r.date.as_str()).collect();
        assert_eq!(dates, vec!["2024-04", "2024-03", "2024-02", "2024-01"]);
    }

    #[test]
    fn test_orders_by_interval_counts() {
        let conn = Connection::open_in_memory().unwrap();
        crate::storage::schema::init_schema(&conn).unwrap();
        for ts in [
            "2024-01-05 10:00:00",
            "2024-01-20 11:00:00",
            "2024-02-10 12:00:00",
        ] {
            conn.execute(
                "INSERT INTO orders (order_id, created_at, total_price, customer_id)
                 VALUES (1, CAST(? AS TIMESTAMP), '1.00', 7)",
                duckdb::params![ts],
            )
            .unwrap();
        }

        let page = orders_by_interval(
            &conn,
            Granularity::Month,
            PageRequest { page: 1, limit: 10 },
        )
        .unwrap();

        assert_eq!(page.rows.len(), 2);
        assert_eq!(page.rows[0].date, "2024-02");
        assert_eq!(page.rows[0].total_orders, 1);
        assert_eq!(page.rows[1].date, "2024-01");
        assert_eq!(page.rows[1].total_orders, 2);
        assert_eq!(page.total_buckets, 2);
    }
}

#[cfg(test)]
mod prop_tests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        /// The derived series always matches the window length, keeps its
        /// order, and ends with a zero rate.
        #[test]
        fn prop_growth_shape(counts in proptest::collection::vec(0u64..10_000, 1..50)) {
            let buckets: Vec<OrderCountBucket> = counts
                .iter()
                .enumerate()
                .map(|(i, c)| OrderCountBucket {
                    date: format!("b{i:04}"),
                    total_orders: *c,
                })
                .collect();
            let rates = derive_growth_rates(&buckets);
            prop_assert_eq!(rates.len(), buckets.len());
            prop_assert_eq!(rates.last().unwrap().growth_rate, Some(0.0));
            for (rate, bucket) in rates.iter().zip(&buckets) {
                prop_assert_eq!(&rate.date, &bucket.date);
            }
            // no Infinity/NaN ever escapes
            for rate in &rates {
                if let Some(r) = rate.growth_rate {
                    prop_assert!(r.is_finite());
                }
            }
        }
    }
}
