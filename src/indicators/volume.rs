// =============================================================================
// Volume indicators — On-Balance Volume and volume moving average
// =============================================================================
//
// OBV is a cumulative volume-flow series:
//   OBV_0 = 0
//   OBV_t = OBV_{t-1} + volume_t   when close_t > close_{t-1}
//           OBV_{t-1} - volume_t   when close_t < close_{t-1}
//           OBV_{t-1}              when unchanged

use serde::Serialize;

use crate::indicators::sma::calculate_sma;

/// Aligned volume-derived series for the volume panel.
#[derive(Debug, Clone, Default, Serialize)]
pub struct VolumeSeries {
    pub obv: Vec<f64>,
    pub volume_ma: Vec<Option<f64>>,
}

/// Compute On-Balance Volume. Output is aligned 1:1 with the input;
/// `obv[0]` is 0 by definition. Mismatched slice lengths truncate to the
/// shorter.
pub fn calculate_obv(closes: &[f64], volumes: &[f64]) -> Vec<f64> {
    let len = closes.len().min(volumes.len());
    if len == 0 {
        return Vec::new();
    }

    let mut result = Vec::with_capacity(len);
    let mut obv = 0.0;
    result.push(obv);

    for i in 1..len {
        if closes[i] > closes[i - 1] {
            obv += volumes[i];
        } else if closes[i] < closes[i - 1] {
            obv -= volumes[i];
        }
        result.push(obv);
    }

    result
}

/// OBV plus a volume SMA over `ma_period` (conventionally 20), for the
/// volume panel served alongside the price indicators.
pub fn calculate_volume_series(closes: &[f64], volumes: &[f64], ma_period: usize) -> VolumeSeries {
    VolumeSeries {
        obv: calculate_obv(closes, volumes),
        volume_ma: calculate_sma(volumes, ma_period),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn obv_empty_input() {
        assert!(calculate_obv(&[], &[]).is_empty());
    }

    #[test]
    fn obv_starts_at_zero() {
        let obv = calculate_obv(&[10.0, 11.0], &[100.0, 200.0]);
        assert_eq!(obv[0], 0.0);
    }

    #[test]
    fn obv_accumulates_by_close_direction() {
        let closes = vec![10.0, 11.0, 10.5, 10.5, 12.0];
        let volumes = vec![100.0, 200.0, 50.0, 75.0, 300.0];
        let obv = calculate_obv(&closes, &volumes);
        // up +200, down -50, unchanged, up +300
        assert_eq!(obv, vec![0.0, 200.0, 150.0, 150.0, 450.0]);
    }

    #[test]
    fn obv_non_decreasing_on_rising_closes() {
        let closes: Vec<f64> = (1..=20).map(|x| x as f64).collect();
        let volumes = vec![10.0; 20];
        let obv = calculate_obv(&closes, &volumes);
        for w in obv.windows(2) {
            assert!(w[1] >= w[0]);
        }
    }

    #[test]
    fn obv_constant_on_flat_closes() {
        let obv = calculate_obv(&vec![5.0; 10], &vec![100.0; 10]);
        assert!(obv.iter().all(|&v| v == 0.0));
    }

    #[test]
    fn volume_series_includes_ma() {
        let closes: Vec<f64> = (1..=25).map(|x| x as f64).collect();
        let volumes = vec![100.0; 25];
        let vs = calculate_volume_series(&closes, &volumes, 20);
        assert_eq!(vs.obv.len(), 25);
        assert!(vs.volume_ma[18].is_none());
        assert!((vs.volume_ma[19].unwrap() - 100.0).abs() < 1e-10);
    }
}
