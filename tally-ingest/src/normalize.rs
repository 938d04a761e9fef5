//! Post-classification normalization: core-holding collapse, cash
//! substitution, magnitude normalization. Applied in that order.

use tally_core::{IngestConfig, TransactionKind};

/// The classified, not yet normalized, economic content of a record
#[derive(Debug, Clone, PartialEq)]
pub struct Leg {
    pub kind: TransactionKind,
    pub ticker: String,
    pub commission: f64,
    pub price_per_share: f64,
    pub shares: f64,
    pub total_value: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Normalized {
    Keep(Leg),
    /// A trade in a sweep vehicle: an internal cash movement, not a trade
    Collapsed { ticker: String, kind: TransactionKind },
}

pub fn normalize(mut leg: Leg, config: &IngestConfig) -> Normalized {
    if config.is_core_holding(&leg.ticker) {
        match leg.kind {
            TransactionKind::Buy | TransactionKind::Sell => {
                return Normalized::Collapsed {
                    ticker: leg.ticker,
                    kind: leg.kind,
                };
            }
            TransactionKind::Dividend => leg.kind = TransactionKind::Interest,
            _ => {}
        }
    }

    if leg.kind.is_cash_movement() {
        leg.ticker = config.cash_ticker.clone();
        leg.price_per_share = 1.0;
        leg.shares = leg.total_value;
    }

    leg.shares = leg.shares.abs();
    leg.price_per_share = leg.price_per_share.abs();
    leg.total_value = leg.total_value.abs();
    leg.commission = leg.commission.abs();

    Normalized::Keep(leg)
}
