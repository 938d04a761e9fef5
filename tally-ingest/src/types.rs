use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use tally_core::Transaction;

use crate::classify::ClassSignals;
use crate::error::IngestError;

/// Account number -> transactions in document order
pub type AccountTransactions = BTreeMap<String, Vec<Transaction>>;

/// The two incompatible layouts the activity API has shipped
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DocumentShape {
    /// `transaction.txnDetails.txnDetail[]` from the legacy activity tab
    #[serde(rename = "flat")]
    Flat,
    /// `data.getTransactions.historys[]` from the GraphQL history query
    #[serde(rename = "graph")]
    Graph,
}

impl std::fmt::Display for DocumentShape {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DocumentShape::Flat => f.write_str("flat"),
            DocumentShape::Graph => f.write_str("graph"),
        }
    }
}

/// One document entry after field extraction, before classification.
#[derive(Debug, Clone, PartialEq)]
pub struct RawRecord {
    pub account: String,
    pub date: NaiveDate,
    pub ticker: String,
    pub signals: ClassSignals,
    pub commission: f64,
    pub price_per_share: f64,
    /// Signed as the source reports it
    pub shares: f64,
    /// Signed as the source reports it
    pub total_value: f64,
    pub memo: String,
    pub source_id: String,
}

/// Per-document record counts
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParseStats {
    pub seen: usize,
    pub retained: usize,
    pub intraday: usize,
    pub malformed: usize,
    pub unclassified: usize,
    /// Core-holding trades folded away as internal cash movements
    pub collapsed: usize,
}

impl ParseStats {
    pub fn skipped(&self) -> usize {
        self.intraday + self.malformed + self.unclassified + self.collapsed
    }
}

/// Result of one parse call. Owned entirely by the caller.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParseOutcome {
    pub shape: Option<DocumentShape>,
    pub accounts: AccountTransactions,
    pub stats: ParseStats,
    /// Non-fatal signal that records were dropped for drift or defects
    pub diagnostic: Option<IngestError>,
}

impl ParseOutcome {
    pub fn is_empty(&self) -> bool {
        self.accounts.is_empty()
    }

    pub fn transaction_count(&self) -> usize {
        self.accounts.values().map(Vec::len).sum()
    }

    /// All transactions, grouped by account in key order
    pub fn transactions(&self) -> impl Iterator<Item = &Transaction> {
        self.accounts.values().flatten()
    }
}
