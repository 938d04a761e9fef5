//! Parse-time diagnostics sink.
//!
//! Parsers never log on their own; every event goes through the
//! [`ParseObserver`] handed to [`ActivityParser`](crate::ActivityParser).

use log::{debug, info, warn};
use std::sync::atomic::{AtomicU64, Ordering};

use tally_core::TransactionKind;

use crate::classify::FlatRule;
use crate::error::IngestError;
use crate::types::{DocumentShape, ParseStats};

/// Why a document entry did not become a transaction
#[derive(Debug, Clone, PartialEq)]
pub enum SkipReason {
    /// Unsettled activity
    Intraday,
    /// Unparsable date or numeric field
    Malformed(IngestError),
    /// Classification miss; carries the combination that failed to match
    Unclassified(IngestError),
    /// Buy or sell of a sweep vehicle
    CoreHolding { ticker: String, kind: TransactionKind },
}

pub trait ParseObserver: Send + Sync {
    /// The document could not be read at all; the parse yields nothing.
    fn document_rejected(&self, shape: Option<DocumentShape>, err: &IngestError);

    /// A numeric field could not be read and was defaulted to zero.
    fn field_coerced(&self, field: &str, raw: &str);

    fn record_skipped(&self, shape: DocumentShape, account: &str, reason: &SkipReason);

    /// A flat record was classified by a rule whose correctness is unconfirmed.
    fn provisional_rule(&self, _account: &str, _rule: &FlatRule) {}

    fn document_parsed(&self, shape: DocumentShape, stats: &ParseStats);
}

/// Snapshot of a [`LogObserver`]'s counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ObserverCounts {
    pub documents: u64,
    pub rejected_documents: u64,
    pub coerced_fields: u64,
    pub intraday: u64,
    pub malformed: u64,
    pub unclassified: u64,
    pub collapsed: u64,
    pub provisional: u64,
}

/// Forwards events to the `log` facade and counts them.
///
/// Counters accumulate across every parse the observer is handed to, so
/// one instance can back a process-wide schema-drift metric.
#[derive(Debug, Default)]
pub struct LogObserver {
    documents: AtomicU64,
    rejected_documents: AtomicU64,
    coerced_fields: AtomicU64,
    intraday: AtomicU64,
    malformed: AtomicU64,
    unclassified: AtomicU64,
    collapsed: AtomicU64,
    provisional: AtomicU64,
}

impl LogObserver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn counts(&self) -> ObserverCounts {
        ObserverCounts {
            documents: self.documents.load(Ordering::Relaxed),
            rejected_documents: self.rejected_documents.load(Ordering::Relaxed),
            coerced_fields: self.coerced_fields.load(Ordering::Relaxed),
            intraday: self.intraday.load(Ordering::Relaxed),
            malformed: self.malformed.load(Ordering::Relaxed),
            unclassified: self.unclassified.load(Ordering::Relaxed),
            collapsed: self.collapsed.load(Ordering::Relaxed),
            provisional: self.provisional.load(Ordering::Relaxed),
        }
    }
}

fn bump(counter: &AtomicU64) {
    counter.fetch_add(1, Ordering::Relaxed);
}

impl ParseObserver for LogObserver {
    fn document_rejected(&self, shape: Option<DocumentShape>, err: &IngestError) {
        bump(&self.rejected_documents);
        match shape {
            Some(shape) => warn!("{shape} activity document ignored: {err}"),
            None => warn!("activity document ignored: {err}"),
        }
    }

    fn field_coerced(&self, field: &str, raw: &str) {
        bump(&self.coerced_fields);
        warn!("could not read {field} value '{raw}' as a number; using 0.0");
    }

    fn record_skipped(&self, shape: DocumentShape, account: &str, reason: &SkipReason) {
        match reason {
            SkipReason::Intraday => {
                bump(&self.intraday);
                debug!("[{shape}] {account}: skipping intraday activity");
            }
            SkipReason::Malformed(err) => {
                bump(&self.malformed);
                warn!("[{shape}] {account}: skipping malformed record: {err}");
            }
            SkipReason::Unclassified(err) => {
                bump(&self.unclassified);
                warn!("[{shape}] {account}: skipping record: {err}");
            }
            SkipReason::CoreHolding { ticker, kind } => {
                bump(&self.collapsed);
                debug!("[{shape}] {account}: dropping {kind} of core holding {ticker}");
            }
        }
    }

    fn provisional_rule(&self, account: &str, rule: &FlatRule) {
        bump(&self.provisional);
        debug!("[flat] {account}: classified as {} by fallback rule '{}'", rule.kind, rule.label);
    }

    fn document_parsed(&self, shape: DocumentShape, stats: &ParseStats) {
        bump(&self.documents);
        info!(
            "[{shape}] parsed {} records: {} retained, {} intraday, {} malformed, {} unclassified, {} core-holding",
            stats.seen, stats.retained, stats.intraday, stats.malformed, stats.unclassified, stats.collapsed
        );
    }
}
