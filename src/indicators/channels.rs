// =============================================================================
// Price Channels — rolling high/low envelope
// =============================================================================
//
// Upper channel  = rolling max(high, period)
// Lower channel  = rolling min(low, period)
// Middle channel = midpoint of the two
//
// Trailing windows only; indices with insufficient history are `None`.

use serde::Serialize;

/// The three aligned channel series.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ChannelSeries {
    pub upper: Vec<Option<f64>>,
    pub middle: Vec<Option<f64>>,
    pub lower: Vec<Option<f64>>,
}

/// Compute price channels over `period` bars (conventionally 20).
pub fn calculate_channels(highs: &[f64], lows: &[f64], period: usize) -> ChannelSeries {
    let len = highs.len().min(lows.len());
    let mut upper = vec![None; len];
    let mut middle = vec![None; len];
    let mut lower = vec![None; len];

    if period > 0 {
        for i in (period.saturating_sub(1))..len {
            let window = i + 1 - period..=i;
            let hi = highs[window.clone()]
                .iter()
                .cloned()
                .fold(f64::NEG_INFINITY, f64::max);
            let lo = lows[window].iter().cloned().fold(f64::INFINITY, f64::min);
            upper[i] = Some(hi);
            lower[i] = Some(lo);
            middle[i] = Some((hi + lo) / 2.0);
        }
    }

    ChannelSeries {
        upper,
        middle,
        lower,
    }
}
