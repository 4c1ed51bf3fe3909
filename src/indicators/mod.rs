// =============================================================================
// Technical Indicators Module
// =============================================================================
//
// Pure, side-effect-free implementations of the technical indicators served
// by the dashboard. Every series-producing function returns output aligned
// 1:1 with its input; entries that cannot be computed (insufficient window
// history, degenerate arithmetic) are `None`, never a fabricated number.
// Empty input always yields empty output.

pub mod bollinger;
pub mod channels;
pub mod ema;
pub mod levels;
pub mod macd;
pub mod rsi;
pub mod signals;
pub mod sma;
pub mod stochastic;
pub mod volume;
