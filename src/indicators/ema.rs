// =============================================================================
// Exponential Moving Average (EMA)
// =============================================================================
//
// EMA gives more weight to recent prices, making it more responsive to new
// information than the Simple Moving Average.
//
// Formula:
//   alpha = 2 / (span + 1)
//   EMA_0 = value_0
//   EMA_t = value_t * alpha + EMA_{t-1} * (1 - alpha)
//
// The series is defined from index 0, seeded with the first value itself,
// so the output aligns 1:1 with the input with no warm-up gap.

/// Compute the EMA series for `values` with smoothing span `span`.
///
/// # Edge cases
/// - `span == 0` => empty vec (division-by-zero guard on alpha)
/// - empty input => empty output
pub fn calculate_ema(values: &[f64], span: usize) -> Vec<f64> {
    if span == 0 || values.is_empty() {
        return Vec::new();
    }

    let alpha = 2.0 / (span + 1) as f64;

    let mut result = Vec::with_capacity(values.len());
    let mut prev = values[0];
    result.push(prev);

    for &v in &values[1..] {
        let ema = v * alpha + prev * (1.0 - alpha);
        result.push(ema);
        prev = ema;
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ema_empty_input() {
        assert!(calculate_ema(&[], 5).is_empty());
    }

    #[test]
    fn ema_span_zero() {
        assert!(calculate_ema(&[1.0, 2.0, 3.0], 0).is_empty());
    }

    #[test]
    fn ema_seeded_with_first_value() {
        let ema = calculate_ema(&[42.0, 43.0, 44.0], 10);
        assert_eq!(ema.len(), 3);
        assert!((ema[0] - 42.0).abs() < 1e-10);
    }

    #[test]
    fn ema_known_recursion() {
        // span = 3 => alpha = 0.5
        let values = vec![2.0, 4.0, 8.0];
        let ema = calculate_ema(&values, 3);
        assert!((ema[0] - 2.0).abs() < 1e-10);
        assert!((ema[1] - 3.0).abs() < 1e-10); // 4*0.5 + 2*0.5
        assert!((ema[2] - 5.5).abs() < 1e-10); // 8*0.5 + 3*0.5
    }

    #[test]
    fn ema_flat_series_stays_flat() {
        let ema = calculate_ema(&vec![100.0; 50], 12);
        for &v in &ema {
            assert!((v - 100.0).abs() < 1e-10);
        }
    }

    #[test]
    fn ema_tracks_rising_series_from_below() {
        let values: Vec<f64> = (1..=50).map(|x| x as f64).collect();
        let ema = calculate_ema(&values, 12);
        // A lagging average of a strictly rising series sits below the price.
        assert!(*ema.last().unwrap() < 50.0);
        assert!(*ema.last().unwrap() > 40.0);
    }
}
