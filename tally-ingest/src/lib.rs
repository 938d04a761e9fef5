//! tally-ingest: brokerage activity documents -> normalized transactions per account.

pub mod accounts;
pub mod aggregate;
pub mod classify;
pub mod error;
pub mod extract;
pub mod normalize;
pub mod observer;
pub mod parsers;
pub mod types;

pub use accounts::{account_id_list, parse_accounts, Account};
pub use error::IngestError;
pub use observer::{LogObserver, ObserverCounts, ParseObserver, SkipReason};
pub use types::{AccountTransactions, DocumentShape, ParseOutcome, ParseStats, RawRecord};

use anyhow::Result;
use tally_core::{ids, IdGenerator, IngestConfig, SettlementClock};

use crate::parsers::{detect_shape, flat_activity, graph_history, parse_json, take_records};

/// Entry point for turning activity documents into transactions.
///
/// A parser is cheap and holds no per-document state, so one instance can
/// serve many documents, including from several threads at once.
pub struct ActivityParser<'a> {
    config: IngestConfig,
    clock: SettlementClock,
    observer: &'a dyn ParseObserver,
    ids: &'a dyn IdGenerator,
}

impl<'a> ActivityParser<'a> {
    /// Validates `config` up front so parsing itself cannot fail.
    /// Ids come from the process-wide generator unless overridden.
    pub fn new(config: IngestConfig, observer: &'a dyn ParseObserver) -> Result<Self> {
        config.validate()?;
        let clock = config.clock()?;
        Ok(Self {
            config,
            clock,
            observer,
            ids: ids::global(),
        })
    }

    pub fn with_ids(mut self, ids: &'a dyn IdGenerator) -> Self {
        self.ids = ids;
        self
    }

    pub fn config(&self) -> &IngestConfig {
        &self.config
    }

    pub fn clock(&self) -> SettlementClock {
        self.clock
    }

    pub fn observer(&self) -> &'a dyn ParseObserver {
        self.observer
    }

    pub fn ids(&self) -> &'a dyn IdGenerator {
        self.ids
    }

    /// Parse a flat activity-tab document
    pub fn parse_flat(&self, doc: &str) -> ParseOutcome {
        flat_activity::parse_flat_activity(self, doc)
    }

    /// Parse a GraphQL transaction-history document
    pub fn parse_graph(&self, doc: &str) -> ParseOutcome {
        graph_history::parse_graph_history(self, doc)
    }

    /// Parse a document of either shape, picked by which root path exists.
    pub fn parse(&self, doc: &str) -> ParseOutcome {
        let Some(json) = parse_json(doc, None, self.observer) else {
            return ParseOutcome::default();
        };
        let Some(shape) = detect_shape(&json) else {
            self.observer.document_rejected(None, &IngestError::UnknownShape);
            return ParseOutcome::default();
        };
        let root = match shape {
            DocumentShape::Flat => flat_activity::ROOT,
            DocumentShape::Graph => graph_history::ROOT,
        };
        let Some(records) = take_records(json, shape, root, self.observer) else {
            return ParseOutcome::default();
        };
        match shape {
            DocumentShape::Flat => flat_activity::parse_records(self, &records),
            DocumentShape::Graph => graph_history::parse_records(self, &records),
        }
    }
}
