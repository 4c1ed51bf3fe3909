// =============================================================================
// Relative Strength Index (RSI) — simple rolling means
// =============================================================================
//
// RSI measures the speed and magnitude of recent price changes to evaluate
// whether an asset is overbought or oversold.
//
// Step 1 — delta_t = close_t - close_{t-1}; gain = max(delta, 0),
//          loss = max(-delta, 0).
// Step 2 — avg_gain / avg_loss = simple rolling mean of gains / losses over
//          the trailing `period` deltas.
// Step 3 — RS  = avg_gain / avg_loss
//          RSI = 100 - 100 / (1 + RS)
//
// When avg_loss is zero, RS is unbounded; the RSI is pinned to 100.0 rather
// than letting a division by zero propagate into the output.
//
// Thresholds:  RSI > 70 => OVERBOUGHT,  RSI < 30 => OVERSOLD.
// =============================================================================

/// Compute the RSI series for the given `closes` and `period`, aligned 1:1
/// with the input.
///
/// The first delta exists at index 1, so the first defined RSI sits at index
/// `period`; everything before it is `None`.
///
/// # Edge cases
/// - `period == 0` => all `None`
/// - `closes.len() < period + 1` => all `None` (not enough deltas)
/// - `avg_loss == 0` in a window => RSI = 100.0 for that index
pub fn calculate_rsi(closes: &[f64], period: usize) -> Vec<Option<f64>> {
    if period == 0 || closes.len() < period + 1 {
        return vec![None; closes.len()];
    }

    let deltas: Vec<f64> = closes.windows(2).map(|w| w[1] - w[0]).collect();

    let mut result = vec![None; closes.len()];
    let period_f = period as f64;

    // Rolling sums over the trailing `period` deltas ending at delta index d.
    let mut sum_gain = 0.0;
    let mut sum_loss = 0.0;

    for (d, &delta) in deltas.iter().enumerate() {
        sum_gain += delta.max(0.0);
        sum_loss += (-delta).max(0.0);
        if d >= period {
            let old = deltas[d - period];
            sum_gain -= old.max(0.0);
            sum_loss -= (-old).max(0.0);
        }

        if d + 1 >= period {
            let avg_gain = sum_gain / period_f;
            let avg_loss = sum_loss / period_f;
            // Close index is delta index + 1.
            result[d + 1] = Some(rsi_from_averages(avg_gain, avg_loss));
        }
    }

    result
}

/// Convenience function: return the most recent RSI value together with a
/// human-readable label.
pub fn current_rsi(closes: &[f64], period: usize) -> Option<(f64, &'static str)> {
    let value = calculate_rsi(closes, period).last().copied().flatten()?;

    let label = if value >= 70.0 {
        "OVERBOUGHT"
    } else if value <= 30.0 {
        "OVERSOLD"
    } else {
        "NEUTRAL"
    };

    Some((value, label))
}

/// Convert average gain / average loss into an RSI value in [0, 100].
///
/// A zero average loss pins the RSI to 100.0 — the explicit policy for the
/// otherwise-unbounded RS ratio.
fn rsi_from_averages(avg_gain: f64, avg_loss: f64) -> f64 {
    if avg_loss == 0.0 {
        return 100.0;
    }
    let rs = avg_gain / avg_loss;
    100.0 - 100.0 / (1.0 + rs)
}
