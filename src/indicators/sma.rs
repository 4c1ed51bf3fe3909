// =============================================================================
// Simple Moving Average (SMA)
// =============================================================================
//
// SMA_t = mean(value_{t-period+1} ... value_t)
//
// The output is aligned 1:1 with the input: indices with fewer than `period`
// trailing samples are `None`. Only trailing data is read — a centered or
// forward window would leak future bars into past values.

/// Compute the SMA series for `values` with the given trailing `period`.
///
/// # Edge cases
/// - `period == 0` => all `None` (the window is meaningless)
/// - index `< period - 1` => `None` (insufficient history)
/// - empty input => empty output
pub fn calculate_sma(values: &[f64], period: usize) -> Vec<Option<f64>> {
    if period == 0 {
        return vec![None; values.len()];
    }

    let mut result = Vec::with_capacity(values.len());
    let mut window_sum = 0.0;

    for (i, &v) in values.iter().enumerate() {
        window_sum += v;
        if i >= period {
            window_sum -= values[i - period];
        }
        if i + 1 >= period {
            result.push(Some(window_sum / period as f64));
        } else {
            result.push(None);
        }
    }

    result
}

/// Return the most recent defined SMA value.
pub fn current_sma(values: &[f64], period: usize) -> Option<f64> {
    calculate_sma(values, period).last().copied().flatten()
}
