// =============================================================================
// Moving Average Convergence Divergence (MACD)
// =============================================================================
//
// MACD line  = EMA(fast) - EMA(slow)
// Signal     = EMA(signal_span) of the MACD line
// Histogram  = MACD - Signal
//
// Because the EMAs here are seeded from index 0, all three series are defined
// for every input index.

use serde::Serialize;

use crate::indicators::ema::calculate_ema;

/// The three aligned MACD output series.
#[derive(Debug, Clone, Default, Serialize)]
pub struct MacdSeries {
    pub macd: Vec<f64>,
    pub signal: Vec<f64>,
    pub histogram: Vec<f64>,
}

/// Compute MACD for `closes` with the given fast/slow/signal spans
/// (conventionally 12/26/9).
///
/// Empty input, or any zero span, yields empty series.
pub fn calculate_macd(closes: &[f64], fast: usize, slow: usize, signal_span: usize) -> MacdSeries {
    if closes.is_empty() || fast == 0 || slow == 0 || signal_span == 0 {
        return MacdSeries::default();
    }

    let ema_fast = calculate_ema(closes, fast);
    let ema_slow = calculate_ema(closes, slow);

    let macd: Vec<f64> = ema_fast
        .iter()
        .zip(ema_slow.iter())
        .map(|(f, s)| f - s)
        .collect();

    let signal = calculate_ema(&macd, signal_span);

    let histogram: Vec<f64> = macd
        .iter()
        .zip(signal.iter())
        .map(|(m, s)| m - s)
        .collect();

    MacdSeries {
        macd,
        signal,
        histogram,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn macd_empty_input() {
        let m = calculate_macd(&[], 12, 26, 9);
        assert!(m.macd.is_empty());
        assert!(m.signal.is_empty());
        assert!(m.histogram.is_empty());
    }

    #[test]
    fn macd_zero_span_guard() {
        assert!(calculate_macd(&[1.0, 2.0], 0, 26, 9).macd.is_empty());
        assert!(calculate_macd(&[1.0, 2.0], 12, 26, 0).macd.is_empty());
    }

    #[test]
    fn macd_aligned_with_input() {
        let closes: Vec<f64> = (1..=60).map(|x| x as f64).collect();
        let m = calculate_macd(&closes, 12, 26, 9);
        assert_eq!(m.macd.len(), 60);
        assert_eq!(m.signal.len(), 60);
        assert_eq!(m.histogram.len(), 60);
    }

    #[test]
    fn macd_flat_series_all_zero() {
        let m = calculate_macd(&vec![50.0; 40], 12, 26, 9);
        for i in 0..40 {
            assert!(m.macd[i].abs() < 1e-10);
            assert!(m.signal[i].abs() < 1e-10);
            assert!(m.histogram[i].abs() < 1e-10);
        }
    }

    #[test]
    fn macd_positive_in_uptrend() {
        // Fast EMA leads slow EMA when price rises steadily.
        let closes: Vec<f64> = (1..=100).map(|x| x as f64).collect();
        let m = calculate_macd(&closes, 12, 26, 9);
        assert!(*m.macd.last().unwrap() > 0.0);
    }

    #[test]
    fn histogram_is_macd_minus_signal() {
        let closes = vec![10.0, 11.0, 10.5, 12.0, 13.0, 12.5, 14.0, 15.0];
        let m = calculate_macd(&closes, 3, 5, 2);
        for i in 0..closes.len() {
            assert!((m.histogram[i] - (m.macd[i] - m.signal[i])).abs() < 1e-10);
        }
    }
}
