//! Normalized transaction records produced by the importers

use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Ticker stamped on every cash movement
pub const CASH_TICKER: &str = "CASH";

/// One settled account activity after classification and normalization.
///
/// Quantities are magnitudes; direction lives only in `kind`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Transaction {
    /// Unique identifier issued by an [`IdGenerator`](crate::IdGenerator)
    pub id: Uuid,
    /// Brokerage account number the activity was booked against
    pub account: String,
    /// Settlement day anchored to market close in the exchange zone
    pub date: DateTime<FixedOffset>,
    pub kind: TransactionKind,
    pub ticker: String,
    /// Commission plus fees, never negative
    pub commission: f64,
    pub price_per_share: f64,
    pub shares: f64,
    pub total_value: f64,
    pub memo: String,
    /// Label of the system the record came from (e.g. "fidelity.com")
    pub source: String,
    /// Identifier the source system uses for the activity (order number)
    pub source_id: String,
}

/// Semantic kind of a transaction
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum TransactionKind {
    #[serde(rename = "buy")]
    Buy,
    #[serde(rename = "sell")]
    Sell,
    #[serde(rename = "dividend")]
    Dividend,
    #[serde(rename = "interest")]
    Interest,
    #[serde(rename = "deposit")]
    Deposit,
    #[serde(rename = "withdraw")]
    Withdraw,
}

impl TransactionKind {
    /// Buys and sells move securities rather than cash
    pub fn is_trade(&self) -> bool {
        matches!(self, TransactionKind::Buy | TransactionKind::Sell)
    }

    /// Kinds that are booked against the cash ticker at a unit price of 1.0
    pub fn is_cash_movement(&self) -> bool {
        !self.is_trade()
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionKind::Buy => "buy",
            TransactionKind::Sell => "sell",
            TransactionKind::Dividend => "dividend",
            TransactionKind::Interest => "interest",
            TransactionKind::Deposit => "deposit",
            TransactionKind::Withdraw => "withdraw",
        }
    }
}

impl std::fmt::Display for TransactionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Transaction {
    /// Returns true if this activity moved cash rather than securities
    pub fn is_cash_movement(&self) -> bool {
        self.kind.is_cash_movement()
    }

    /// Signed cash effect on the account: inflows positive, outflows negative
    pub fn cash_flow(&self) -> f64 {
        match self.kind {
            TransactionKind::Buy | TransactionKind::Withdraw => -self.total_value,
            TransactionKind::Sell
            | TransactionKind::Dividend
            | TransactionKind::Interest
            | TransactionKind::Deposit => self.total_value,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn sample(kind: TransactionKind, total_value: f64) -> Transaction {
        let date = FixedOffset::west_opt(4 * 3600)
            .unwrap()
            .with_ymd_and_hms(2022, 6, 2, 16, 0, 0)
            .unwrap();
        Transaction {
            id: Uuid::nil(),
            account: "Z00000001".to_string(),
            date,
            kind,
            ticker: "STIP".to_string(),
            commission: 0.0,
            price_per_share: 102.5,
            shares: 10.0,
            total_value,
            memo: "YOU SOLD".to_string(),
            source: "fidelity.com".to_string(),
            source_id: "24153XYZ".to_string(),
        }
    }

    #[test]
    fn test_trade_and_cash_kinds_partition() {
        assert!(TransactionKind::Buy.is_trade());
        assert!(TransactionKind::Sell.is_trade());
        for kind in [
            TransactionKind::Dividend,
            TransactionKind::Interest,
            TransactionKind::Deposit,
            TransactionKind::Withdraw,
        ] {
            assert!(kind.is_cash_movement(), "{kind} should be a cash movement");
        }
    }

    #[test]
    fn test_cash_flow_direction() {
        assert_eq!(sample(TransactionKind::Buy, 1025.0).cash_flow(), -1025.0);
        assert_eq!(sample(TransactionKind::Sell, 1025.0).cash_flow(), 1025.0);
        assert_eq!(sample(TransactionKind::Withdraw, 50.0).cash_flow(), -50.0);
        assert_eq!(sample(TransactionKind::Interest, 0.12).cash_flow(), 0.12);
    }

    #[test]
    fn test_kind_serializes_lowercase() {
        let json = serde_json::to_string(&TransactionKind::Withdraw).unwrap();
        assert_eq!(json, "\"withdraw\"");
        let back: TransactionKind = serde_json::from_str("\"dividend\"").unwrap();
        assert_eq!(back, TransactionKind::Dividend);
    }

    #[test]
    fn test_transaction_serde_keeps_anchor_offset() {
        let trx = sample(TransactionKind::Sell, 1025.0);
        let json = serde_json::to_string(&trx).unwrap();
        assert!(json.contains("2022-06-02T16:00:00-04:00"), "{json}");
        let back: Transaction = serde_json::from_str(&json).unwrap();
        assert_eq!(back, trx);
    }
}
