//! Summary statistics of simulated outcomes.

use folio_math::statistics::{
    mean, median_sorted, percentile_sorted, population_std_dev, sorted_finite,
};
use serde::{Deserialize, Serialize};

use crate::error::{RiskError, RiskResult};

/// Percentile levels reported in every summary.
pub const PERCENTILE_LEVELS: [f64; 5] = [5.0, 25.0, 50.0, 75.0, 95.0];

/// Outcome percentiles, keyed on the wire by their level.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Percentiles {
    /// 5th percentile.
    #[serde(rename = "5")]
    pub p5: f64,
    /// 25th percentile.
    #[serde(rename = "25")]
    pub p25: f64,
    /// 50th percentile.
    #[serde(rename = "50")]
    pub p50: f64,
    /// 75th percentile.
    #[serde(rename = "75")]
    pub p75: f64,
    /// 95th percentile.
    #[serde(rename = "95")]
    pub p95: f64,
}

impl Percentiles {
    /// Values in ascending level order.
    #[must_use]
    pub fn as_array(&self) -> [f64; 5] {
        [self.p5, self.p25, self.p50, self.p75, self.p95]
    }
}

/// Summary of an ensemble of final portfolio values.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatisticsSummary {
    /// Arithmetic mean.
    pub mean_final_value: f64,
    /// Median.
    pub median_final_value: f64,
    /// Smallest value.
    pub min_final_value: f64,
    /// Largest value.
    pub max_final_value: f64,
    /// Population (divide-by-n) standard deviation.
    pub standard_deviation: f64,
    /// Interpolated percentiles.
    pub percentiles: Percentiles,
}

impl StatisticsSummary {
    /// Summarizes a non-empty sample of finite values.
    ///
    /// # Example
    ///
    /// ```rust
    /// use folio_risk::StatisticsSummary;
    ///
    /// let summary = StatisticsSummary::from_values(&[90.0, 95.0, 100.0, 105.0, 110.0]).unwrap();
    /// assert_eq!(summary.median_final_value, 100.0);
    /// assert_eq!(summary.min_final_value, 90.0);
    /// assert!((summary.percentiles.p5 - 91.0).abs() < 1e-12);
    /// ```
    pub fn from_values(values: &[f64]) -> RiskResult<Self> {
        if values.is_empty() {
            return Err(RiskError::validation("Cannot summarize an empty sample"));
        }
        if let Some(i) = values.iter().position(|v| !v.is_finite()) {
            return Err(RiskError::internal(format!(
                "Non-finite outcome at index {}",
                i
            )));
        }

        let sorted = sorted_finite(values)?;

        let [p5, p25, p50, p75, p95] = PERCENTILE_LEVELS;
        Ok(Self {
            mean_final_value: mean(values)?,
            median_final_value: median_sorted(&sorted)?,
            min_final_value: sorted[0],
            max_final_value: sorted[sorted.len() - 1],
            standard_deviation: population_std_dev(values)?,
            percentiles: Percentiles {
                p5: percentile_sorted(&sorted, p5)?,
                p25: percentile_sorted(&sorted, p25)?,
                p50: percentile_sorted(&sorted, p50)?,
                p75: percentile_sorted(&sorted, p75)?,
                p95: percentile_sorted(&sorted, p95)?,
            },
        })
    }
}
