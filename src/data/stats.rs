//! Order statistics used by the aggregation engine and the box plot.

/// Groups smaller than this are never outlier-filtered.
pub const MIN_OUTLIER_GROUP: usize = 4;

/// Fence distance in multiples of the IQR.
pub const IQR_FENCE: f64 = 1.5;

/// Sort salaries ascending. Input never contains NaN (see `parse_salary`).
pub fn sort_ascending(values: &mut [f64]) {
    values.sort_by(|a, b| a.total_cmp(b));
}

/// Linear-interpolation quantile of an ascending slice; NaN when empty.
pub fn quantile(sorted: &[f64], p: f64) -> f64 {
    let n = sorted.len();
    if n == 0 {
        return f64::NAN;
    }
    let idx = (n - 1) as f64 * p;
    let lo = idx.floor() as usize;
    let hi = idx.ceil() as usize;
    if lo == hi {
        return sorted[lo];
    }
    let weight = idx - lo as f64;
    sorted[lo] * (1.0 - weight) + sorted[hi] * weight
}

/// Median of an unsorted slice; NaN when empty.
pub fn median(values: &[f64]) -> f64 {
    if values.is_empty() {
        return f64::NAN;
    }
    let mut sorted = values.to_vec();
    sort_ascending(&mut sorted);
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        (sorted[mid - 1] + sorted[mid]) / 2.0
    } else {
        sorted[mid]
    }
}

// ---------------------------------------------------------------------------
// IQR fences
// ---------------------------------------------------------------------------

/// Inclusive Tukey fences `[Q1 - 1.5·IQR, Q3 + 1.5·IQR]` of one group.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IqrBounds {
    pub q1: f64,
    pub q3: f64,
    pub lower: f64,
    pub upper: f64,
}

impl IqrBounds {
    /// Fences of an ascending slice, or `None` when the group has fewer than
    /// [`MIN_OUTLIER_GROUP`] values.
    pub fn from_sorted(sorted: &[f64]) -> Option<Self> {
        if sorted.len() < MIN_OUTLIER_GROUP {
            return None;
        }
        let q1 = quantile(sorted, 0.25);
        let q3 = quantile(sorted, 0.75);
        let iqr = q3 - q1;
        Some(IqrBounds {
            q1,
            q3,
            lower: q1 - IQR_FENCE * iqr,
            upper: q3 + IQR_FENCE * iqr,
        })
    }

    pub fn contains(&self, value: f64) -> bool {
        value >= self.lower && value <= self.upper
    }
}

// ---------------------------------------------------------------------------
// Box summary (what one box of the chart draws)
// ---------------------------------------------------------------------------

/// Five-number summary plus the points drawn outside the whiskers.
#[derive(Debug, Clone, PartialEq)]
pub struct BoxSummary {
    pub lower_whisker: f64,
    pub q1: f64,
    pub median: f64,
    pub q3: f64,
    pub upper_whisker: f64,
    pub outliers: Vec<f64>,
}

impl BoxSummary {
    /// Summarise an ascending, non-empty slice. Whiskers reach the most
    /// extreme values still inside the 1.5·IQR fences.
    pub fn from_sorted(sorted: &[f64]) -> Option<Self> {
        let (&first, &last) = (sorted.first()?, sorted.last()?);
        let q1 = quantile(sorted, 0.25);
        let q3 = quantile(sorted, 0.75);
        let iqr = q3 - q1;
        let lower = q1 - IQR_FENCE * iqr;
        let upper = q3 + IQR_FENCE * iqr;

        let inside = || {
            sorted
                .iter()
                .copied()
                .filter(move |v| *v >= lower && *v <= upper)
        };
        let lower_whisker = inside().next().unwrap_or(first);
        let upper_whisker = inside().last().unwrap_or(last);
        let outliers = sorted
            .iter()
            .copied()
            .filter(|v| *v < lower || *v > upper)
            .collect();

        Some(BoxSummary {
            lower_whisker,
            q1,
            median: quantile(sorted, 0.5),
            q3,
            upper_whisker,
            outliers,
        })
    }
}
