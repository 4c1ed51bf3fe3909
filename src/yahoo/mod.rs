pub mod client;

pub use client::{Dividend, QuoteSnapshot, YahooClient};
