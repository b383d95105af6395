//! Sample moments of historical return series.

use std::collections::BTreeMap;

use folio_core::Ticker;
use folio_math::linear_algebra::{column_means, sample_covariance};
use nalgebra::{DMatrix, DVector};

use crate::error::{RiskError, RiskResult};

/// Mean-return vector and sample covariance matrix of a set of assets.
///
/// Built from one periodic return series per asset. Index `i` of every
/// vector and matrix refers to `assets()[i]`.
///
/// # Example
///
/// ```rust
/// use std::collections::BTreeMap;
/// use folio_core::Ticker;
/// use folio_risk::ReturnsStatistics;
///
/// let assets = vec![Ticker::new("A").unwrap(), Ticker::new("B").unwrap()];
/// let mut returns = BTreeMap::new();
/// returns.insert("A".to_string(), vec![0.01, 0.02, 0.03]);
/// returns.insert("B".to_string(), vec![0.02, 0.00, 0.01]);
///
/// let stats = ReturnsStatistics::from_series(&assets, &returns).unwrap();
/// assert_eq!(stats.observations(), 3);
/// assert!((stats.mean_returns()[0] - 0.02).abs() < 1e-12);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct ReturnsStatistics {
    assets: Vec<Ticker>,
    mean_returns: DVector<f64>,
    covariance: DMatrix<f64>,
    observations: usize,
}

impl ReturnsStatistics {
    /// Computes statistics for `assets` from a ticker -> series map.
    ///
    /// Every asset needs a finite series of at least two observations, and
    /// all series must have the same length. Series for tickers outside
    /// `assets` are ignored.
    pub fn from_series(
        assets: &[Ticker],
        returns: &BTreeMap<String, Vec<f64>>,
    ) -> RiskResult<Self> {
        if assets.is_empty() {
            return Err(RiskError::validation("At least one asset is required"));
        }

        let missing: Vec<&str> = assets
            .iter()
            .map(Ticker::as_str)
            .filter(|t| !returns.contains_key(*t))
            .collect();
        if !missing.is_empty() {
            return Err(RiskError::validation_with_details(
                format!("Missing returns data for assets: {}", missing.join(", ")),
                missing
                    .iter()
                    .map(|t| format!("returns.{} is required", t))
                    .collect(),
            ));
        }

        let series: Vec<(&Ticker, &Vec<f64>)> = assets
            .iter()
            .filter_map(|t| returns.get(t.as_str()).map(|s| (t, s)))
            .collect();

        let mut details = Vec::new();
        for (ticker, values) in &series {
            if values.len() < 2 {
                details.push(format!(
                    "returns.{} needs at least 2 observations, got {}",
                    ticker,
                    values.len()
                ));
            }
            if values.iter().any(|v| !v.is_finite()) {
                details.push(format!("returns.{} contains non-finite values", ticker));
            }
        }

        let length = series[0].1.len();
        if series.iter().any(|(_, values)| values.len() != length) {
            let lengths: Vec<String> = series
                .iter()
                .map(|(ticker, values)| format!("{}={}", ticker, values.len()))
                .collect();
            details.push(format!(
                "All return series must have equal length, got {}",
                lengths.join(", ")
            ));
        }

        if !details.is_empty() {
            return Err(RiskError::validation_with_details(
                "Invalid returns data",
                details,
            ));
        }

        let observations = DMatrix::from_fn(length, series.len(), |t, i| series[i].1[t]);
        let mean_returns = column_means(&observations)?;
        let covariance = sample_covariance(&observations)?;

        tracing::debug!(
            assets = assets.len(),
            observations = length,
            "computed returns statistics"
        );

        Ok(Self {
            assets: assets.to_vec(),
            mean_returns,
            covariance,
            observations: length,
        })
    }

    /// Assets in index order.
    pub fn assets(&self) -> &[Ticker] {
        &self.assets
    }

    /// Per-asset arithmetic mean return.
    pub fn mean_returns(&self) -> &DVector<f64> {
        &self.mean_returns
    }

    /// Sample covariance matrix (`L - 1` divisor).
    pub fn covariance(&self) -> &DMatrix<f64> {
        &self.covariance
    }

    /// Number of observations per series.
    pub fn observations(&self) -> usize {
        self.observations
    }

    /// Number of assets.
    pub fn num_assets(&self) -> usize {
        self.assets.len()
    }

    /// Per-asset sample standard deviation.
    pub fn volatilities(&self) -> DVector<f64> {
        self.covariance.diagonal().map(|v| v.max(0.0).sqrt())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn tickers(names: &[&str]) -> Vec<Ticker> {
        names.iter().map(|n| Ticker::new(*n).unwrap()).collect()
    }

    fn returns(entries: &[(&str, Vec<f64>)]) -> BTreeMap<String, Vec<f64>> {
        entries
            .iter()
            .map(|(t, v)| ((*t).to_string(), v.clone()))
            .collect()
    }

    #[test]
    fn test_two_asset_moments() {
        let data = returns(&[
            ("A", vec![0.01, 0.02, 0.03]),
            ("B", vec![0.02, 0.00, 0.01]),
        ]);
        let stats = ReturnsStatistics::from_series(&tickers(&["A", "B"]), &data).unwrap();

        assert_eq!(stats.num_assets(), 2);
        assert_relative_eq!(stats.mean_returns()[0], 0.02, epsilon = 1e-15);
        assert_relative_eq!(stats.mean_returns()[1], 0.01, epsilon = 1e-15);
        assert_relative_eq!(stats.covariance()[(0, 0)], 1e-4, epsilon = 1e-15);
        assert_relative_eq!(stats.covariance()[(0, 1)], -5e-5, epsilon = 1e-15);
        assert_relative_eq!(stats.volatilities()[0], 0.01, epsilon = 1e-12);
    }

    #[test]
    fn test_asset_order_follows_argument() {
        let data = returns(&[
            ("A", vec![0.01, 0.02, 0.03]),
            ("B", vec![0.05, 0.05, 0.05]),
        ]);
        let stats = ReturnsStatistics::from_series(&tickers(&["B", "A"]), &data).unwrap();
        assert_eq!(stats.assets()[0].as_str(), "B");
        assert_relative_eq!(stats.mean_returns()[0], 0.05, epsilon = 1e-15);
        assert_relative_eq!(stats.covariance()[(0, 0)], 0.0, epsilon = 1e-18);
    }

    #[test]
    fn test_extra_series_ignored() {
        let data = returns(&[
            ("A", vec![0.01, 0.02]),
            ("ZZZ", vec![1.0]),
        ]);
        let stats = ReturnsStatistics::from_series(&tickers(&["A"]), &data).unwrap();
        assert_eq!(stats.num_assets(), 1);
        assert_eq!(stats.observations(), 2);
    }

    #[test]
    fn test_missing_series() {
        let data = returns(&[("A", vec![0.01, 0.02])]);
        let err = ReturnsStatistics::from_series(&tickers(&["A", "B", "C"]), &data).unwrap_err();
        match err {
            RiskError::Validation { reason, details } => {
                assert!(reason.contains("B, C"));
                assert_eq!(details.len(), 2);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_mismatched_lengths() {
        let data = returns(&[
            ("A", vec![0.01, 0.02, 0.03]),
            ("B", vec![0.01, 0.02]),
        ]);
        let err = ReturnsStatistics::from_series(&tickers(&["A", "B"]), &data).unwrap_err();
        assert_eq!(err.code(), "VALIDATION_ERROR");
        assert!(err.details()[0].contains("A=3, B=2"));
    }

    #[test]
    fn test_short_and_non_finite_series() {
        let data = returns(&[("A", vec![0.01]), ("B", vec![f64::NAN])]);
        let err = ReturnsStatistics::from_series(&tickers(&["A", "B"]), &data).unwrap_err();
        // Two short series plus one non-finite series
        assert_eq!(err.details().len(), 3);
    }

    #[test]
    fn test_empty_assets() {
        let data = returns(&[("A", vec![0.01, 0.02])]);
        assert!(ReturnsStatistics::from_series(&[], &data).is_err());
    }
}
