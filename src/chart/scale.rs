//! Coordinate scales for the SVG charts: a linear value scale plus point and
//! band scales for positioning date buckets along the x axis.

/// Maps a numeric domain onto a pixel range.
#[derive(Debug, Clone, Copy)]
pub struct LinearScale {
    domain: (f64, f64),
    range: (f64, f64),
}

impl LinearScale {
    pub const fn new(domain: (f64, f64), range: (f64, f64)) -> Self {
        Self { domain, range }
    }

    /// Map a domain value to its pixel position. A degenerate domain maps
    /// everything to the start of the range.
    pub fn scale(&self, value: f64) -> f64 {
        let (d0, d1) = self.domain;
        let (r0, r1) = self.range;
        let span = d1 - d0;
        if span.abs() < f64::EPSILON {
            return r0;
        }
        r0 + (value - d0) / span * (r1 - r0)
    }

    pub const fn domain(&self) -> (f64, f64) {
        self.domain
    }

    /// Roughly `count` round-valued ticks covering the domain.
    pub fn ticks(&self, count: usize) -> Vec<f64> {
        let (d0, d1) = self.domain;
        let (lo, hi) = if d0 <= d1 { (d0, d1) } else { (d1, d0) };
        let span = hi - lo;
        if span <= 0.0 || count == 0 {
            return vec![lo];
        }

        #[allow(clippy::cast_precision_loss)]
        let step = tick_step(span / count as f64);
        let mut ticks = Vec::new();
        let mut value = (lo / step).ceil() * step;
        while value <= hi + step * 1e-9 {
            // avoid -0.0 labels
            ticks.push(if value == 0.0 { 0.0 } else { value });
            value += step;
        }
        ticks
    }
}

/// Round a raw step up to a 1/2/5 multiple of a power of ten.
fn tick_step(raw: f64) -> f64 {
    let magnitude = 10f64.powf(raw.log10().floor());
    let normalized = raw / magnitude;
    let factor = if normalized > 5.0 {
        10.0
    } else if normalized > 2.0 {
        5.0
    } else if normalized > 1.0 {
        2.0
    } else {
        1.0
    };
    factor * magnitude
}

/// Extend an observed (min, max) extent so it reaches at least ±`floor`.
///
/// Keeps chart proportions legible for small datasets: the growth-rate chart
/// always spans at least -100%..100% regardless of the data.
pub fn extent_with_floor(extent: (f64, f64), floor: f64) -> (f64, f64) {
    (extent.0.min(-floor), extent.1.max(floor))
}

/// Observed (min, max) over a series, `None` for an empty one.
pub fn extent(values: impl IntoIterator<Item = f64>) -> Option<(f64, f64)> {
    values.into_iter().fold(None, |acc, v| match acc {
        None => Some((v, v)),
        Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
    })
}

/// Evenly spaces discrete labels along a pixel range, with outer padding
/// expressed in steps (d3 scalePoint).
#[derive(Debug, Clone)]
pub struct PointScale {
    labels: Vec<String>,
    range: (f64, f64),
    padding: f64,
}

impl PointScale {
    pub fn new(labels: Vec<String>, range: (f64, f64), padding: f64) -> Self {
        Self {
            labels,
            range,
            padding,
        }
    }

    fn step(&self) -> f64 {
        #[allow(clippy::cast_precision_loss)]
        let slots = (self.labels.len().saturating_sub(1)) as f64 + 2.0 * self.padding;
        (self.range.1 - self.range.0) / slots.max(1.0)
    }

    /// Pixel position of a label, `None` if it is not in the domain.
    pub fn position(&self, label: &str) -> Option<f64> {
        let index = self.labels.iter().position(|l| l == label)?;
        #[allow(clippy::cast_precision_loss)]
        let offset = self.padding + index as f64;
        Some(self.range.0 + self.step() * offset)
    }
}

/// Places labeled bands (bars) along a pixel range with proportional gaps
/// (d3 scaleBand with equal inner/outer padding).
#[derive(Debug, Clone)]
pub struct BandScale {
    labels: Vec<String>,
    range: (f64, f64),
    padding: f64,
}

impl BandScale {
    pub fn new(labels: Vec<String>, range: (f64, f64), padding: f64) -> Self {
        Self {
            labels,
            range,
            padding,
        }
    }

    fn step(&self) -> f64 {
        #[allow(clippy::cast_precision_loss)]
        let slots = self.labels.len() as f64 + self.padding;
        (self.range.1 - self.range.0) / slots.max(1.0)
    }

    /// Width of each band.
    pub fn bandwidth(&self) -> f64 {
        self.step() * (1.0 - self.padding)
    }

    /// Left edge of a label's band, `None` if it is not in the domain.
    pub fn start(&self, label: &str) -> Option<f64> {
        let index = self.labels.iter().position(|l| l == label)?;
        #[allow(clippy::cast_precision_loss)]
        let offset = self.padding + index as f64;
        Some(self.range.0 + self.step() * offset)
    }
}
