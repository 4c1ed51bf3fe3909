// =============================================================================
// Stochastic Oscillator (%K / %D)
// =============================================================================
//
// %K_t = 100 * (close_t - min(low, k window)) / (max(high, k window) - min(low, k window))
// %D   = SMA(d_period) of %K
//
// A flat range window (max high == min low) makes the denominator zero; the
// %K entry is `None` for that index rather than an infinity or a panic, and
// any %D window containing an undefined %K is itself undefined.

use serde::Serialize;

/// The two aligned oscillator series.
#[derive(Debug, Clone, Default, Serialize)]
pub struct StochasticSeries {
    pub k_percent: Vec<Option<f64>>,
    pub d_percent: Vec<Option<f64>>,
}

/// Compute the stochastic oscillator (conventionally k=14, d=3).
///
/// `highs`, `lows`, and `closes` must be aligned; the shortest length wins
/// if they disagree.
pub fn calculate_stochastic(
    highs: &[f64],
    lows: &[f64],
    closes: &[f64],
    k_period: usize,
    d_period: usize,
) -> StochasticSeries {
    let len = highs.len().min(lows.len()).min(closes.len());
    if k_period == 0 || d_period == 0 {
        return StochasticSeries {
            k_percent: vec![None; len],
            d_percent: vec![None; len],
        };
    }

    let mut k_percent = vec![None; len];
    for i in (k_period - 1)..len {
        let window = i + 1 - k_period..=i;
        let highest = highs[window.clone()]
            .iter()
            .cloned()
            .fold(f64::NEG_INFINITY, f64::max);
        let lowest = lows[window].iter().cloned().fold(f64::INFINITY, f64::min);

        let range = highest - lowest;
        if range == 0.0 {
            continue; // Flat window — %K undefined by policy.
        }
        k_percent[i] = Some(100.0 * (closes[i] - lowest) / range);
    }

    // %D: SMA over %K, defined only where the whole window of %K is defined.
    let mut d_percent = vec![None; len];
    for i in (d_period - 1)..len {
        let window = &k_percent[i + 1 - d_period..=i];
        if window.iter().all(|v| v.is_some()) {
            let sum: f64 = window.iter().flatten().sum();
            d_percent[i] = Some(sum / d_period as f64);
        }
    }

    StochasticSeries {
        k_percent,
        d_percent,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stochastic_empty_input() {
        let s = calculate_stochastic(&[], &[], &[], 14, 3);
        assert!(s.k_percent.is_empty());
        assert!(s.d_percent.is_empty());
    }

    #[test]
    fn stochastic_flat_range_is_undefined() {
        let flat = vec![100.0; 20];
        let s = calculate_stochastic(&flat, &flat, &flat, 14, 3);
        assert!(s.k_percent.iter().all(|v| v.is_none()));
        assert!(s.d_percent.iter().all(|v| v.is_none()));
    }

    #[test]
    fn stochastic_close_at_high_is_100() {
        // Rising closes that touch the window high => %K = 100.
        let highs: Vec<f64> = (1..=20).map(|x| x as f64).collect();
        let lows: Vec<f64> = highs.iter().map(|h| h - 0.5).collect();
        let closes = highs.clone();
        let s = calculate_stochastic(&highs, &lows, &closes, 14, 3);
        let last = s.k_percent.last().unwrap().unwrap();
        assert!((last - 100.0).abs() < 1e-10);
    }

    #[test]
    fn stochastic_close_at_low_is_0() {
        let highs: Vec<f64> = (1..=20).map(|x| 100.0 + x as f64).collect();
        let lows: Vec<f64> = (1..=20).map(|x| 50.0 - x as f64).collect();
        let closes = lows.clone();
        let s = calculate_stochastic(&highs, &lows, &closes, 14, 3);
        let last = s.k_percent.last().unwrap().unwrap();
        assert!(last.abs() < 1e-10);
    }

    #[test]
    fn stochastic_warmup_boundary() {
        let highs: Vec<f64> = (1..=20).map(|x| x as f64 + 1.0).collect();
        let lows: Vec<f64> = (1..=20).map(|x| x as f64).collect();
        let closes = lows.clone();
        let s = calculate_stochastic(&highs, &lows, &closes, 14, 3);
        assert!(s.k_percent[12].is_none());
        assert!(s.k_percent[13].is_some());
        // %D needs 3 defined %K values: 13, 14, 15.
        assert!(s.d_percent[14].is_none());
        assert!(s.d_percent[15].is_some());
    }

    #[test]
    fn stochastic_bounded() {
        let highs = vec![10.0, 12.0, 11.0, 13.0, 14.0, 12.5, 15.0, 16.0];
        let lows = vec![9.0, 10.0, 9.5, 11.0, 12.0, 11.0, 13.0, 14.0];
        let closes = vec![9.5, 11.0, 10.0, 12.0, 13.5, 11.5, 14.5, 15.0];
        let s = calculate_stochastic(&highs, &lows, &closes, 3, 2);
        for v in s.k_percent.iter().flatten() {
            assert!((0.0..=100.0).contains(v), "%K {v} out of range");
        }
    }
}
