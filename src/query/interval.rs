use std::str::FromStr;

/// Time-bucketing resolution for the aggregation pipelines.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Granularity {
    Day,
    Month,
    Quarter,
    Year,
}

impl Granularity {
    /// strftime format for the bucket key. Quarter has no string format;
    /// it is derived from (year, quarter number) instead.
    pub const fn format_str(self) -> Option<&'static str> {
        match self {
            Self::Day => Some("%Y-%m-%d"),
            Self::Month => Some("%Y-%m"),
            Self::Year => Some("%Y"),
            Self::Quarter => None,
        }
    }

    /// SQL expression producing the bucket key for a `created_at` column.
    ///
    /// All variants yield labels that sort chronologically as strings
    /// (zero-padded fields, year-first), so `ORDER BY bucket DESC` gives
    /// newest-first buckets for every granularity.
    pub fn date_key_expr(self) -> String {
        self.format_str().map_or_else(
            || {
                // quarter = ceil(month / 3), via integer arithmetic
                "concat(CAST(year(created_at) AS VARCHAR), '-Q', \
                 CAST((month(created_at) + 2) // 3 AS VARCHAR))"
                    .to_string()
            },
            |fmt| format!("strftime(created_at, '{fmt}')"),
        )
    }
}

impl FromStr for Granularity {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Day" => Ok(Self::Day),
            "Month" => Ok(Self::Month),
            "Quarter" => Ok(Self::Quarter),
            "Year" => Ok(Self::Year),
            _ => Err(()),
        }
    }
}

/// Quarter number for a 1-based month: ceil(month / 3).
pub const fn quarter_of_month(month: u32) -> u32 {
    month.div_ceil(3)
}
