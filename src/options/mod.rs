pub mod aggregate;

pub use aggregate::{
    aggregate_chains, ChainAnalysis, ExpiryChain, ExpiryDetail, ExpirySummary, OptionDetailRow,
    OptionRow, OptionsData,
};
