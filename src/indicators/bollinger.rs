// =============================================================================
// Bollinger Bands
// =============================================================================
//
// Middle band = SMA(period); upper/lower = middle ± k * σ where σ is the
// rolling *sample* standard deviation (ddof = 1) over the same window.
// Sample stddev needs at least two samples, so `period < 2` leaves the
// upper/lower bands undefined even where the middle band exists.

use serde::Serialize;

use crate::indicators::sma::calculate_sma;

/// The three aligned band series.
#[derive(Debug, Clone, Default, Serialize)]
pub struct BollingerSeries {
    pub upper: Vec<Option<f64>>,
    pub middle: Vec<Option<f64>>,
    pub lower: Vec<Option<f64>>,
}

/// Compute Bollinger Bands for `closes` with window `period` and band width
/// `num_std` standard deviations (conventionally 20 / 2.0).
pub fn calculate_bollinger(closes: &[f64], period: usize, num_std: f64) -> BollingerSeries {
    let middle = calculate_sma(closes, period);
    let mut upper = vec![None; closes.len()];
    let mut lower = vec![None; closes.len()];

    if period >= 2 {
        for i in (period - 1)..closes.len() {
            let window = &closes[i + 1 - period..=i];
            let mean = match middle[i] {
                Some(m) => m,
                None => continue,
            };
            let variance = window
                .iter()
                .map(|x| (x - mean).powi(2))
                .sum::<f64>()
                / (period - 1) as f64;
            let band = num_std * variance.sqrt();
            upper[i] = Some(mean + band);
            lower[i] = Some(mean - band);
        }
    }

    BollingerSeries {
        upper,
        middle,
        lower,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bollinger_empty_input() {
        let bb = calculate_bollinger(&[], 20, 2.0);
        assert!(bb.middle.is_empty());
        assert!(bb.upper.is_empty());
        assert!(bb.lower.is_empty());
    }

    #[test]
    fn bollinger_insufficient_data() {
        let bb = calculate_bollinger(&[1.0, 2.0, 3.0], 20, 2.0);
        assert!(bb.middle.iter().all(|v| v.is_none()));
        assert!(bb.upper.iter().all(|v| v.is_none()));
    }

    #[test]
    fn bollinger_period_one_has_no_bands() {
        // Sample stddev is undefined for a single observation.
        let bb = calculate_bollinger(&[1.0, 2.0, 3.0], 1, 2.0);
        assert!(bb.middle.iter().all(|v| v.is_some()));
        assert!(bb.upper.iter().all(|v| v.is_none()));
        assert!(bb.lower.iter().all(|v| v.is_none()));
    }

    #[test]
    fn bollinger_symmetric_around_middle() {
        let closes: Vec<f64> = (1..=40).map(|x| (x as f64).sin() * 5.0 + 100.0).collect();
        let bb = calculate_bollinger(&closes, 20, 2.0);
        for i in 0..closes.len() {
            if let (Some(u), Some(m), Some(l)) = (bb.upper[i], bb.middle[i], bb.lower[i]) {
                assert!(((u - m) - (m - l)).abs() < 1e-9, "asymmetric at {i}");
            }
        }
    }

    #[test]
    fn bollinger_flat_series_collapses() {
        let bb = calculate_bollinger(&vec![100.0; 25], 20, 2.0);
        let i = 24;
        assert!((bb.upper[i].unwrap() - 100.0).abs() < 1e-10);
        assert!((bb.lower[i].unwrap() - 100.0).abs() < 1e-10);
    }

    #[test]
    fn bollinger_sample_stddev() {
        // Window [1, 2, 3, 4, 5]: mean 3, sample variance 2.5.
        let bb = calculate_bollinger(&[1.0, 2.0, 3.0, 4.0, 5.0], 5, 2.0);
        let expected_band = 2.0 * 2.5_f64.sqrt();
        assert!((bb.upper[4].unwrap() - (3.0 + expected_band)).abs() < 1e-10);
        assert!((bb.lower[4].unwrap() - (3.0 - expected_band)).abs() < 1e-10);
    }
}
