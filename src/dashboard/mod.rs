//! Server-rendered dashboard: one SVG chart per aggregation pipeline, with
//! per-chart interval and page state carried in the query string.

use crate::api::errors::ApiError;
use crate::chart::svg::{self, Frame};
use crate::query::growth::{self, GrowthBucket};
use crate::query::interval::Granularity;
use crate::query::pagination::{page_count, PageRequest};
use crate::query::{customers, sales};
use crate::server::AppState;
use axum::extract::{Query, State};
use axum::response::Html;
use serde::Deserialize;
use std::fmt::Write;
use std::sync::Arc;

/// Page size per chart; the dashboard shows narrower windows than the API
/// default.
const SALES_PAGE_SIZE: u64 = 6;
const CHART_PAGE_SIZE: u64 = 5;

/// Intervals each chart offers. Growth and the customer charts have no
/// quarterly pipeline behind them, so Quarter is not accepted there even
/// when hand-edited into the URL.
const SALES_INTERVALS: [Granularity; 4] = [
    Granularity::Day,
    Granularity::Month,
    Granularity::Quarter,
    Granularity::Year,
];
const TREND_INTERVALS: [Granularity; 3] =
    [Granularity::Day, Granularity::Month, Granularity::Year];

/// Per-chart state lifted from the query string.
#[derive(Debug, Default, Deserialize)]
pub struct DashboardParams {
    pub sales_interval: Option<String>,
    pub sales_page: Option<String>,
    pub growth_interval: Option<String>,
    pub growth_page: Option<String>,
    pub customers_interval: Option<String>,
    pub customers_page: Option<String>,
    pub repeat_interval: Option<String>,
    pub repeat_page: Option<String>,
}

/// Resolved state for one chart.
#[derive(Debug, Clone, Copy)]
struct ChartState {
    interval: Granularity,
    page: u64,
}

impl ChartState {
    fn resolve(
        interval: Option<&str>,
        page: Option<&str>,
        allowed: &[Granularity],
        limit: u64,
    ) -> Self {
        let interval = interval
            .and_then(|i| i.parse().ok())
            .filter(|i| allowed.contains(i))
            .unwrap_or(Granularity::Month);
        let window = PageRequest::from_raw(page, None, limit);
        Self {
            interval,
            page: window.page,
        }
    }

    const fn window(self, limit: u64) -> PageRequest {
        PageRequest {
            page: self.page,
            limit,
        }
    }
}

const fn interval_label(granularity: Granularity) -> &'static str {
    match granularity {
        Granularity::Day => "Day",
        Granularity::Month => "Month",
        Granularity::Quarter => "Quarter",
        Granularity::Year => "Year",
    }
}

/// GET / — render the dashboard page.
pub async fn render_dashboard(
    State(state): State<Arc<AppState>>,
    Query(params): Query<DashboardParams>,
) -> Result<Html<String>, ApiError> {
    let sales_state = ChartState::resolve(
        params.sales_interval.as_deref(),
        params.sales_page.as_deref(),
        &SALES_INTERVALS,
        SALES_PAGE_SIZE,
    );
    let growth_state = ChartState::resolve(
        params.growth_interval.as_deref(),
        params.growth_page.as_deref(),
        &TREND_INTERVALS,
        CHART_PAGE_SIZE,
    );
    let customers_state = ChartState::resolve(
        params.customers_interval.as_deref(),
        params.customers_page.as_deref(),
        &TREND_INTERVALS,
        CHART_PAGE_SIZE,
    );
    let repeat_state = ChartState::resolve(
        params.repeat_interval.as_deref(),
        params.repeat_page.as_deref(),
        &TREND_INTERVALS,
        CHART_PAGE_SIZE,
    );

    let store = state.store.clone();
    let (sales_page, growth_page, customers_page, repeat_page) =
        tokio::task::spawn_blocking(move || {
            store.with(|conn| {
                let sales = sales::sales_by_interval(
                    conn,
                    sales_state.interval,
                    sales_state.window(SALES_PAGE_SIZE),
                )?;
                let orders = growth::orders_by_interval(
                    conn,
                    growth_state.interval,
                    growth_state.window(CHART_PAGE_SIZE),
                )?;
                let new_customers = customers::new_customers_by_interval(
                    conn,
                    customers_state.interval,
                    customers_state.window(CHART_PAGE_SIZE),
                )?;
                let repeats = customers::repeat_customers_by_interval(
                    conn,
                    repeat_state.interval,
                    repeat_state.window(CHART_PAGE_SIZE),
                )?;
                Ok((sales, orders, new_customers, repeats))
            })
        })
        .await
        .map_err(|e| ApiError::Internal(format!("Render task panicked: {e}")))??;

    // Fetched newest-first; reverse to ascending so charts read left to right.
    let mut sales_rows = sales_page.rows;
    sales_rows.reverse();
    let sales_buckets: Vec<(String, f64)> = sales_rows
        .into_iter()
        .map(|b| (b.date, b.total_amount))
        .collect();

    let growth_rows: Vec<GrowthBucket> = {
        let mut rates = growth::derive_growth_rates(&growth_page.rows);
        rates.reverse();
        rates
    };
    let growth_points: Vec<(String, Option<f64>)> = growth_rows
        .into_iter()
        .map(|b| (b.date, b.growth_rate))
        .collect();

    let mut customer_rows = customers_page.rows;
    customer_rows.reverse();
    #[allow(clippy::cast_precision_loss)]
    let customer_points: Vec<(String, f64)> = customer_rows
        .into_iter()
        .map(|b| (b.date, b.total_customers as f64))
        .collect();

    let mut repeat_rows = repeat_page.rows;
    repeat_rows.reverse();
    #[allow(clippy::cast_precision_loss)]
    let repeat_points: Vec<(String, f64)> = repeat_rows
        .into_iter()
        .map(|b| (b.date, b.repeat_customers as f64))
        .collect();

    let frame = Frame::default();
    let mut body = String::with_capacity(16 * 1024);
    body.push_str(
        "<!doctype html><html><head><meta charset=\"utf-8\">\
         <title>Shoplytics</title><style>\
         body{font-family:sans-serif;margin:2rem;background:#fafafa}\
         .chart{display:inline-block;margin:1rem;padding:1rem;background:#fff;\
         border:1px solid #e5e5e5;border-radius:8px}\
         .controls a{margin-right:.5rem}.controls span.disabled{color:#bbb;margin-right:.5rem}\
         h2{font-size:1rem}</style></head><body><h1>Shoplytics</h1>",
    );

    render_chart_section(
        &mut body,
        "Total Sales",
        "sales",
        sales_state,
        page_count(sales_page.total_buckets, SALES_PAGE_SIZE),
        &SALES_INTERVALS,
        &svg::bar_chart(&sales_buckets, frame),
    );
    render_chart_section(
        &mut body,
        "Sales Growth Rate",
        "growth",
        growth_state,
        page_count(growth_page.total_buckets, CHART_PAGE_SIZE),
        &TREND_INTERVALS,
        &svg::growth_chart(&growth_points, frame),
    );
    render_chart_section(
        &mut body,
        "New Customers",
        "customers",
        customers_state,
        page_count(customers_page.total_buckets, CHART_PAGE_SIZE),
        &TREND_INTERVALS,
        &svg::line_chart(&customer_points, frame),
    );
    render_chart_section(
        &mut body,
        "Repeat Customers",
        "repeat",
        repeat_state,
        page_count(repeat_page.total_buckets, CHART_PAGE_SIZE),
        &TREND_INTERVALS,
        &svg::bar_chart(&repeat_points, frame),
    );

    body.push_str("</body></html>");
    Ok(Html(body))
}

/// One chart card: interval links (always back to page 1), the inverted
/// pager, and the SVG itself.
///
/// Paging is deliberately inverted to match the newest-first fetch order:
/// "previous" moves deeper into the past by *incrementing* the page number
/// and is disabled on the last page; "next" moves toward the present by
/// decrementing and is disabled on page 1.
fn render_chart_section(
    out: &mut String,
    title: &str,
    prefix: &str,
    state: ChartState,
    no_of_pages: u64,
    intervals: &[Granularity],
    chart_svg: &str,
) {
    let _ = write!(out, r#"<div class="chart"><h2>{title}</h2><div class="controls">"#);

    for interval in intervals {
        let label = interval_label(*interval);
        if *interval == state.interval {
            let _ = write!(out, "<strong>{label}</strong> ");
        } else {
            let _ = write!(
                out,
                r#"<a href="?{prefix}_interval={label}&amp;{prefix}_page=1">{label}</a>"#,
            );
        }
    }

    let interval = interval_label(state.interval);
    if state.page < no_of_pages {
        let _ = write!(
            out,
            r#"<a href="?{prefix}_interval={interval}&amp;{prefix}_page={}" rel="nofollow">&#8592; previous</a>"#,
            state.page + 1,
        );
    } else {
        out.push_str(r#"<span class="disabled">&#8592; previous</span>"#);
    }
    if state.page > 1 {
        let _ = write!(
            out,
            r#"<a href="?{prefix}_interval={interval}&amp;{prefix}_page={}" rel="nofollow">next &#8594;</a>"#,
            state.page - 1,
        );
    } else {
        out.push_str(r#"<span class="disabled">next &#8594;</span>"#);
    }

    let _ = write!(out, "</div>{chart_svg}</div>");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chart_state_defaults() {
        let state = ChartState::resolve(None, None, &SALES_INTERVALS, 5);
        assert_eq!(state.interval, Granularity::Month);
        assert_eq!(state.page, 1);
    }

    #[test]
    fn test_chart_state_invalid_inputs_clamp() {
        let state = ChartState::resolve(Some("Fortnight"), Some("-2"), &SALES_INTERVALS, 5);
        assert_eq!(state.interval, Granularity::Month);
        assert_eq!(state.page, 1);
    }

    #[test]
    fn test_chart_state_rejects_unoffered_interval() {
        // quarterly grouping exists for sales but not for the trend charts;
        // a hand-edited URL falls back to the default
        let state = ChartState::resolve(Some("Quarter"), None, &TREND_INTERVALS, 5);
        assert_eq!(state.interval, Granularity::Month);

        let state = ChartState::resolve(Some("Quarter"), None, &SALES_INTERVALS, 5);
        assert_eq!(state.interval, Granularity::Quarter);
    }

    #[test]
    fn test_interval_links_reset_page() {
        let mut out = String::new();
        let state = ChartState {
            interval: Granularity::Month,
            page: 3,
        };
        render_chart_section(
            &mut out,
            "Sales",
            "sales",
            state,
            5,
            &[Granularity::Day, Granularity::Month],
            "<svg/>",
        );
        // switching interval always lands on page 1
        assert!(out.contains("?sales_interval=Day&amp;sales_page=1"));
        // the current interval renders as text, not a link
        assert!(out.contains("<strong>Month</strong>"));
    }

    #[test]
    fn test_inverted_pager_mid_window() {
        let mut out = String::new();
        let state = ChartState {
            interval: Granularity::Month,
            page: 2,
        };
        render_chart_section(&mut out, "t", "growth", state, 4, &[], "<svg/>");
        // previous goes deeper into the past (page + 1)
        assert!(out.contains("growth_page=3\" rel=\"nofollow\">&#8592; previous"));
        // next returns toward the present (page - 1)
        assert!(out.contains("growth_page=1\" rel=\"nofollow\">next"));
    }

    #[test]
    fn test_pager_disabled_at_edges() {
        let mut out = String::new();
        render_chart_section(
            &mut out,
            "t",
            "sales",
            ChartState {
                interval: Granularity::Year,
                page: 1,
            },
            1,
            &[],
            "<svg/>",
        );
        // single page: both directions disabled
        assert_eq!(out.matches(r#"<span class="disabled">"#).count(), 2);
        assert!(!out.contains("rel=\"nofollow\""));
    }

    #[test]
    fn test_pager_disabled_at_last_page() {
        let mut out = String::new();
        render_chart_section(
            &mut out,
            "t",
            "sales",
            ChartState {
                interval: Granularity::Year,
                page: 4,
            },
            4,
            &[],
            "<svg/>",
        );
        assert!(out.contains(r#"<span class="disabled">&#8592; previous</span>"#));
        assert!(out.contains("sales_page=3"));
    }
}
