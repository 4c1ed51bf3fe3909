// =============================================================================
// Support / Resistance levels — windowed local extrema
// =============================================================================
//
// A bar is a resistance candidate when its high equals the maximum high over
// the surrounding `[i - window, i + window]` bars; support is the symmetric
// rule on lows. Candidate values are deduplicated, then truncated:
// resistance keeps the first 5 after a descending sort, support keeps the
// last 5 after an ascending sort (the 5 closest to current price from
// below). The two sides truncate from opposite ends on purpose.

use serde::Serialize;

/// Distinct support and resistance price levels.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Levels {
    /// Sorted descending, at most 5 entries.
    pub resistance: Vec<f64>,
    /// Sorted ascending, at most 5 entries.
    pub support: Vec<f64>,
}

/// Identify support and resistance levels from aligned `highs`/`lows` using
/// a symmetric `window` of bars on each side (conventionally 20).
///
/// Series shorter than `2 * window + 1` have no interior bars to evaluate
/// and yield empty levels.
pub fn identify_support_resistance(highs: &[f64], lows: &[f64], window: usize) -> Levels {
    let len = highs.len().min(lows.len());
    if window == 0 || len < 2 * window + 1 {
        return Levels::default();
    }

    let mut resistance = Vec::new();
    let mut support = Vec::new();

    for i in window..(len - window) {
        let span = i - window..=i + window;
        let max_high = highs[span.clone()]
            .iter()
            .cloned()
            .fold(f64::NEG_INFINITY, f64::max);
        let min_low = lows[span].iter().cloned().fold(f64::INFINITY, f64::min);

        if highs[i] == max_high {
            resistance.push(highs[i]);
        }
        if lows[i] == min_low {
            support.push(lows[i]);
        }
    }

    // Distinct values only.
    resistance.sort_by(|a, b| b.partial_cmp(a).unwrap_or(std::cmp::Ordering::Equal));
    resistance.dedup();
    resistance.truncate(5);

    support.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
    support.dedup();
    let keep_from = support.len().saturating_sub(5);
    support.drain(..keep_from);

    Levels {
        resistance,
        support,
    }
}
