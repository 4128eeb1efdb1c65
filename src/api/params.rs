use crate::query::interval::Granularity;
use crate::query::pagination::PageRequest;
use serde::Deserialize;

/// Query parameters for `/api/sales`.
///
/// The `by*` flags are presence-based: `?byDay` and `?byDay=anything` both
/// set the flag, matching how the upstream API read them.
#[derive(Debug, Default, Deserialize)]
pub struct SalesParams {
    #[serde(rename = "byDay")]
    pub by_day: Option<String>,
    #[serde(rename = "byMonth")]
    pub by_month: Option<String>,
    #[serde(rename = "byQuarter")]
    pub by_quarter: Option<String>,
    #[serde(rename = "byGrowthRate")]
    pub by_growth_rate: Option<String>,
    pub page: Option<String>,
    pub limit: Option<String>,
}

/// Which sales pipeline a request dispatches to. Exactly one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SalesQuery {
    /// Order-count buckets transformed into growth rates. Uses the
    /// Day/Month/Year granularity flags and ignores `byQuarter`.
    GrowthRate(Granularity),
    ByQuarter,
    ByInterval(Granularity),
}

impl SalesParams {
    /// Granularity from the Day > Month > Year precedence chain; Year when
    /// no flag is set.
    fn granularity(&self) -> Granularity {
        if self.by_day.is_some() {
            Granularity::Day
        } else if self.by_month.is_some() {
            Granularity::Month
        } else {
            Granularity::Year
        }
    }

    /// Select the pipeline: growth rate overrides everything, then quarter,
    /// then plain interval aggregation.
    pub fn dispatch(&self) -> SalesQuery {
        if self.by_growth_rate.is_some() {
            SalesQuery::GrowthRate(self.granularity())
        } else if self.by_quarter.is_some() {
            SalesQuery::ByQuarter
        } else {
            SalesQuery::ByInterval(self.granularity())
        }
    }

    pub fn window(&self, default_limit: u64) -> PageRequest {
        PageRequest::from_raw(self.page.as_deref(), self.limit.as_deref(), default_limit)
    }
}

/// Query parameters for `/api/customers`.
#[derive(Debug, Default, Deserialize)]
pub struct CustomersParams {
    #[serde(rename = "byDay")]
    pub by_day: Option<String>,
    #[serde(rename = "byMonth")]
    pub by_month: Option<String>,
    #[serde(rename = "repeatedCustomers")]
    pub repeated_customers: Option<String>,
    #[serde(rename = "byLocation")]
    pub by_location: Option<String>,
    pub page: Option<String>,
    pub limit: Option<String>,
}

/// Which customers pipeline a request dispatches to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CustomersQuery {
    Repeated(Granularity),
    ByLocation,
    NewCustomers(Granularity),
}

impl CustomersParams {
    fn granularity(&self) -> Granularity {
        if self.by_day.is_some() {
            Granularity::Day
        } else if self.by_month.is_some() {
            Granularity::Month
        } else {
            Granularity::Year
        }
    }

    /// Repeated customers overrides location overrides plain new-customer
    /// counting.
    pub fn dispatch(&self) -> CustomersQuery {
        if self.repeated_customers.is_some() {
            CustomersQuery::Repeated(self.granularity())
        } else if self.by_location.is_some() {
            CustomersQuery::ByLocation
        } else {
            CustomersQuery::NewCustomers(self.granularity())
        }
    }

    pub fn window(&self, default_limit: u64) -> PageRequest {
        PageRequest::from_raw(self.page.as_deref(), self.limit.as_deref(), default_limit)
    }
}
