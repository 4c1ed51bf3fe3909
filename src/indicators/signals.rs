// =============================================================================
// Trading signals — MA crossover filtered by RSI
// =============================================================================
//
// Evaluated bar by bar using only data up to and including the current bar:
//
//   BUY  — close crosses above the MA from below, and RSI < 70
//   SELL — close crosses below the MA from above, and RSI > 30
//   HOLD — everything else, including any bar where the MA or RSI is
//          still undefined.

use crate::indicators::rsi::calculate_rsi;
use crate::indicators::sma::calculate_sma;
use crate::types::Signal;

/// Generate a signal per bar from an MA(`ma_period`) crossover gated by
/// RSI(`rsi_period`) — conventionally 20 / 14. Output aligns 1:1 with the
/// input closes.
pub fn generate_signals(closes: &[f64], ma_period: usize, rsi_period: usize) -> Vec<Signal> {
    let ma = calculate_sma(closes, ma_period);
    let rsi = calculate_rsi(closes, rsi_period);

    let mut signals = vec![Signal::Hold; closes.len()];

    for i in 1..closes.len() {
        let (ma_now, ma_prev, rsi_now) = match (ma[i], ma[i - 1], rsi[i]) {
            (Some(a), Some(b), Some(r)) => (a, b, r),
            _ => continue,
        };

        if closes[i] > ma_now && closes[i - 1] <= ma_prev && rsi_now < 70.0 {
            signals[i] = Signal::Buy;
        } else if closes[i] < ma_now && closes[i - 1] >= ma_prev && rsi_now > 30.0 {
            signals[i] = Signal::Sell;
        }
    }

    signals
}
