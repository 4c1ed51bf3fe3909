// =============================================================================
// Options chain aggregation — per-expiry open-interest and notional value
// =============================================================================
//
// For each expiry, calls and puts are aggregated independently:
//
//   interest_value = open_interest * last_price * 100
//
// (100 is the standard option-contract share multiplier.) A side with no
// usable rows — empty, or no row carrying open interest / last price —
// contributes no summary row for that expiry. Summary rows follow the
// provider's expiry order exactly; no independent sort is applied.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::types::OptionSide;

/// Shares per contract, fixed for US-listed equity options.
const CONTRACT_MULTIPLIER: f64 = 100.0;

/// One strike's contract data as returned by the provider. Yahoo omits
/// fields for illiquid strikes, so everything beyond the strike itself is
/// optional.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OptionRow {
    pub contract_symbol: Option<String>,
    pub strike: f64,
    pub last_price: Option<f64>,
    pub bid: Option<f64>,
    pub ask: Option<f64>,
    pub volume: Option<f64>,
    pub open_interest: Option<f64>,
    pub in_the_money: Option<bool>,
}

/// Both sides of the chain for one expiry date.
#[derive(Debug, Clone, Serialize)]
pub struct ExpiryChain {
    pub expiry: NaiveDate,
    pub calls: Vec<OptionRow>,
    pub puts: Vec<OptionRow>,
}

/// The full options picture for a ticker: expiry dates in provider order and
/// the per-expiry chains that could be fetched.
#[derive(Debug, Clone, Default, Serialize)]
pub struct OptionsData {
    pub expiry_dates: Vec<NaiveDate>,
    pub chains: Vec<ExpiryChain>,
}

impl OptionsData {
    pub fn is_empty(&self) -> bool {
        self.chains.is_empty()
    }
}

/// One summary row per (expiry, side).
#[derive(Debug, Clone, Serialize)]
pub struct ExpirySummary {
    pub expiry: NaiveDate,
    pub side: OptionSide,
    pub total_open_interest: f64,
    pub total_interest_value: f64,
    pub avg_last_price: f64,
    pub total_volume: f64,
    pub avg_volume: f64,
}

/// An original row enriched with its computed notional interest value.
#[derive(Debug, Clone, Serialize)]
pub struct OptionDetailRow {
    #[serde(flatten)]
    pub row: OptionRow,
    pub interest_value: Option<f64>,
}

/// Enriched per-strike detail for one (expiry, side), for drill-down.
#[derive(Debug, Clone, Serialize)]
pub struct ExpiryDetail {
    pub expiry: NaiveDate,
    pub side: OptionSide,
    pub rows: Vec<OptionDetailRow>,
}

/// Summary tables plus retained per-row detail, calls and puts separately.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ChainAnalysis {
    pub calls_summary: Vec<ExpirySummary>,
    pub puts_summary: Vec<ExpirySummary>,
    pub calls_detail: Vec<ExpiryDetail>,
    pub puts_detail: Vec<ExpiryDetail>,
}

/// Aggregate every fetched chain into per-expiry summaries, preserving the
/// provider's expiry order.
pub fn aggregate_chains(data: &OptionsData) -> ChainAnalysis {
    let mut analysis = ChainAnalysis::default();

    for chain in &data.chains {
        if let Some((summary, detail)) =
            aggregate_side(chain.expiry, OptionSide::Call, &chain.calls)
        {
            analysis.calls_summary.push(summary);
            analysis.calls_detail.push(detail);
        }
        if let Some((summary, detail)) = aggregate_side(chain.expiry, OptionSide::Put, &chain.puts)
        {
            analysis.puts_summary.push(summary);
            analysis.puts_detail.push(detail);
        }
    }

    analysis
}

/// Aggregate one side of one expiry. Returns `None` when the side has no
/// usable rows, which drops it from the summary entirely.
fn aggregate_side(
    expiry: NaiveDate,
    side: OptionSide,
    rows: &[OptionRow],
) -> Option<(ExpirySummary, ExpiryDetail)> {
    if rows.is_empty()
        || rows.iter().all(|r| r.open_interest.is_none())
        || rows.iter().all(|r| r.last_price.is_none())
    {
        return None;
    }

    let mut total_open_interest = 0.0;
    let mut total_interest_value = 0.0;
    let mut price_sum = 0.0;
    let mut price_count = 0usize;
    let mut volume_sum = 0.0;
    let mut volume_count = 0usize;

    let mut detail_rows = Vec::with_capacity(rows.len());

    for row in rows {
        let interest_value = match (row.open_interest, row.last_price) {
            (Some(oi), Some(last)) => Some(oi * last * CONTRACT_MULTIPLIER),
            _ => None,
        };

        if let Some(oi) = row.open_interest {
            total_open_interest += oi;
        }
        if let Some(iv) = interest_value {
            total_interest_value += iv;
        }
        if let Some(last) = row.last_price {
            price_sum += last;
            price_count += 1;
        }
        if let Some(vol) = row.volume {
            volume_sum += vol;
            volume_count += 1;
        }

        detail_rows.push(OptionDetailRow {
            row: row.clone(),
            interest_value,
        });
    }

    let avg_last_price = if price_count > 0 {
        price_sum / price_count as f64
    } else {
        0.0
    };
    let avg_volume = if volume_count > 0 {
        volume_sum / volume_count as f64
    } else {
        0.0
    };

    let summary = ExpirySummary {
        expiry,
        side,
        total_open_interest,
        total_interest_value,
        avg_last_price,
        total_volume: volume_sum,
        avg_volume,
    };
    let detail = ExpiryDetail {
        expiry,
        side,
        rows: detail_rows,
    };

    Some((summary, detail))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(oi: Option<f64>, last: Option<f64>, volume: Option<f64>) -> OptionRow {
        OptionRow {
            contract_symbol: None,
            strike: 100.0,
            last_price: last,
            bid: None,
            ask: None,
            volume,
            open_interest: oi,
            in_the_money: None,
        }
    }

    fn date(s: &str) -> NaiveDate {
        s.parse().unwrap()
    }

    fn chain(expiry: &str, calls: Vec<OptionRow>, puts: Vec<OptionRow>) -> ExpiryChain {
        ExpiryChain {
            expiry: date(expiry),
            calls,
            puts,
        }
    }

    #[test]
    fn empty_chains_aggregate_to_nothing() {
        let analysis = aggregate_chains(&OptionsData::default());
        assert!(analysis.calls_summary.is_empty());
        assert!(analysis.puts_summary.is_empty());
    }

    #[test]
    fn notional_value_hand_checked() {
        // (OI=10, last=2.00) + (OI=5, last=1.50)
        // => total OI 15, total value 10*2*100 + 5*1.5*100 = 2750.
        let data = OptionsData {
            expiry_dates: vec![date("2026-01-16")],
            chains: vec![chain(
                "2026-01-16",
                vec![
                    row(Some(10.0), Some(2.0), Some(3.0)),
                    row(Some(5.0), Some(1.5), Some(7.0)),
                ],
                Vec::new(),
            )],
        };
        let analysis = aggregate_chains(&data);
        assert_eq!(analysis.calls_summary.len(), 1);
        let s = &analysis.calls_summary[0];
        assert!((s.total_open_interest - 15.0).abs() < 1e-10);
        assert!((s.total_interest_value - 2750.0).abs() < 1e-10);
        assert!((s.avg_last_price - 1.75).abs() < 1e-10);
        assert!((s.total_volume - 10.0).abs() < 1e-10);
        assert!((s.avg_volume - 5.0).abs() < 1e-10);
        // Puts side was empty — no row for it.
        assert!(analysis.puts_summary.is_empty());
    }

    #[test]
    fn side_without_open_interest_is_skipped() {
        let data = OptionsData {
            expiry_dates: vec![date("2026-01-16")],
            chains: vec![chain(
                "2026-01-16",
                vec![row(None, Some(2.0), None), row(None, Some(3.0), None)],
                vec![row(Some(1.0), None, None)],
            )],
        };
        let analysis = aggregate_chains(&data);
        assert!(analysis.calls_summary.is_empty());
        assert!(analysis.puts_summary.is_empty());
    }

    #[test]
    fn missing_volume_counts_as_zero() {
        let data = OptionsData {
            expiry_dates: vec![date("2026-01-16")],
            chains: vec![chain(
                "2026-01-16",
                vec![row(Some(4.0), Some(1.0), None)],
                Vec::new(),
            )],
        };
        let analysis = aggregate_chains(&data);
        let s = &analysis.calls_summary[0];
        assert_eq!(s.total_volume, 0.0);
        assert_eq!(s.avg_volume, 0.0);
    }

    #[test]
    fn detail_rows_carry_interest_value() {
        let data = OptionsData {
            expiry_dates: vec![date("2026-01-16")],
            chains: vec![chain(
                "2026-01-16",
                vec![row(Some(10.0), Some(2.0), None), row(Some(3.0), None, None)],
                Vec::new(),
            )],
        };
        let analysis = aggregate_chains(&data);
        let detail = &analysis.calls_detail[0];
        assert_eq!(detail.rows.len(), 2);
        assert!((detail.rows[0].interest_value.unwrap() - 2000.0).abs() < 1e-10);
        // Row without a last price has no notional value, but is retained.
        assert!(detail.rows[1].interest_value.is_none());
    }

    #[test]
    fn summary_preserves_provider_expiry_order() {
        // Deliberately non-chronological input order must survive.
        let data = OptionsData {
            expiry_dates: vec![date("2026-03-20"), date("2026-01-16")],
            chains: vec![
                chain("2026-03-20", vec![row(Some(1.0), Some(1.0), None)], Vec::new()),
                chain("2026-01-16", vec![row(Some(2.0), Some(1.0), None)], Vec::new()),
            ],
        };
        let analysis = aggregate_chains(&data);
        assert_eq!(analysis.calls_summary[0].expiry, date("2026-03-20"));
        assert_eq!(analysis.calls_summary[1].expiry, date("2026-01-16"));
    }
}
