//! Per-document accumulation of normalized transactions.
//!
//! One `Aggregator` lives for exactly one parse call. Records are appended
//! in the order they are offered; nothing is re-sorted.

use tally_core::{IdGenerator, IngestConfig, SettlementClock, Transaction};

use crate::error::IngestError;
use crate::normalize::{normalize, Leg, Normalized};
use crate::observer::{ParseObserver, SkipReason};
use crate::types::{AccountTransactions, DocumentShape, ParseOutcome, ParseStats, RawRecord};
use crate::ActivityParser;

pub struct Aggregator<'p> {
    shape: DocumentShape,
    config: &'p IngestConfig,
    clock: SettlementClock,
    observer: &'p dyn ParseObserver,
    ids: &'p dyn IdGenerator,
    accounts: AccountTransactions,
    stats: ParseStats,
}

impl<'p> Aggregator<'p> {
    pub fn new(shape: DocumentShape, parser: &'p ActivityParser<'_>) -> Self {
        Self {
            shape,
            config: parser.config(),
            clock: parser.clock(),
            observer: parser.observer(),
            ids: parser.ids(),
            accounts: AccountTransactions::new(),
            stats: ParseStats::default(),
        }
    }

    /// Drop a record before it reaches classification.
    pub fn skip(&mut self, account: &str, reason: SkipReason) {
        self.stats.seen += 1;
        self.reject(account, reason);
    }

    /// Classify, normalize and append one extracted record.
    pub fn offer(&mut self, raw: RawRecord) {
        self.stats.seen += 1;

        let verdict = match raw.signals.classify(raw.total_value) {
            Ok(verdict) => verdict,
            Err(err) => return self.reject(&raw.account, SkipReason::Unclassified(err)),
        };
        if let Some(rule) = verdict.flat_rule.filter(|rule| rule.provisional) {
            self.observer.provisional_rule(&raw.account, rule);
        }

        let Some(date) = self.clock.anchor(raw.date) else {
            let err = IngestError::InvalidDate {
                value: raw.date.to_string(),
                format: "a market close that exists on that day",
            };
            return self.reject(&raw.account, SkipReason::Malformed(err));
        };

        let leg = Leg {
            kind: verdict.kind,
            ticker: raw.ticker,
            commission: raw.commission,
            price_per_share: raw.price_per_share,
            shares: raw.shares,
            total_value: raw.total_value,
        };
        let leg = match normalize(leg, self.config) {
            Normalized::Keep(leg) => leg,
            Normalized::Collapsed { ticker, kind } => {
                return self.reject(&raw.account, SkipReason::CoreHolding { ticker, kind });
            }
        };

        let trx = Transaction {
            id: self.ids.next_id(),
            account: raw.account,
            date,
            kind: leg.kind,
            ticker: leg.ticker,
            commission: leg.commission,
            price_per_share: leg.price_per_share,
            shares: leg.shares,
            total_value: leg.total_value,
            memo: raw.memo,
            source: self.config.source.clone(),
            source_id: raw.source_id,
        };
        self.stats.retained += 1;
        self.accounts.entry(trx.account.clone()).or_default().push(trx);
    }

    fn reject(&mut self, account: &str, reason: SkipReason) {
        match &reason {
            SkipReason::Intraday => self.stats.intraday += 1,
            SkipReason::Malformed(_) => self.stats.malformed += 1,
            SkipReason::Unclassified(_) => self.stats.unclassified += 1,
            SkipReason::CoreHolding { .. } => self.stats.collapsed += 1,
        }
        self.observer.record_skipped(self.shape, account, &reason);
    }

    pub fn finish(self) -> ParseOutcome {
        self.observer.document_parsed(self.shape, &self.stats);
        let diagnostic = (self.stats.unclassified + self.stats.malformed > 0).then(|| {
            IngestError::SchemaDrift {
                unclassified: self.stats.unclassified,
                malformed: self.stats.malformed,
            }
        });
        ParseOutcome {
            shape: Some(self.shape),
            accounts: self.accounts,
            stats: self.stats,
            diagnostic,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classify::{ClassSignals, CodedTriple};
    use crate::observer::LogObserver;
    use chrono::NaiveDate;
    use tally_core::{SequentialIds, TransactionKind};
    use uuid::Uuid;

    fn raw(account: &str, codes: (&str, &str, &str), ticker: &str, shares: f64, total: f64) -> RawRecord {
        RawRecord {
            account: account.to_string(),
            date: NaiveDate::from_ymd_opt(2022, 6, 2).unwrap(),
            ticker: ticker.to_string(),
            signals: ClassSignals::Coded(CodedTriple::new(codes.0, codes.1, codes.2)),
            commission: 0.0,
            price_per_share: 10.0,
            shares,
            total_value: total,
            memo: String::new(),
            source_id: String::new(),
        }
    }

    #[test]
    fn test_groups_by_account_in_arrival_order() {
        let obs = LogObserver::new();
        let ids = SequentialIds::new();
        let parser = ActivityParser::new(IngestConfig::default(), &obs).unwrap().with_ids(&ids);
        let mut agg = Aggregator::new(DocumentShape::Graph, &parser);

        agg.offer(raw("B", ("IA", "BY", "BY"), "VTI", 1.0, -10.0));
        agg.offer(raw("A", ("DP", "EF", "EF"), "", 0.0, 500.0));
        agg.offer(raw("B", ("IA", "SL", "SL"), "VTI", -1.0, 10.0));

        let out = agg.finish();
        assert_eq!(out.shape, Some(DocumentShape::Graph));
        assert_eq!(out.accounts.len(), 2);
        let b: Vec<_> = out.accounts["B"].iter().map(|t| t.kind).collect();
        assert_eq!(b, vec![TransactionKind::Buy, TransactionKind::Sell]);
        assert_eq!(out.accounts["B"][0].id, Uuid::from_u128(1));
        assert_eq!(out.accounts["A"][0].id, Uuid::from_u128(2));
        assert_eq!(out.accounts["B"][1].id, Uuid::from_u128(3));
        assert_eq!(out.stats.retained, 3);
        assert_eq!(out.diagnostic, None);
    }

    #[test]
    fn test_skips_are_counted_and_reported() {
        let obs = LogObserver::new();
        let parser = ActivityParser::new(IngestConfig::default(), &obs).unwrap();
        let mut agg = Aggregator::new(DocumentShape::Graph, &parser);

        agg.offer(raw("A", ("QQ", "QQ", "QQ"), "VTI", 1.0, -10.0));
        agg.offer(raw("A", ("IA", "BY", "BY"), "SPAXX", 100.0, -100.0));
        agg.skip("A", SkipReason::Intraday);

        let out = agg.finish();
        assert!(out.accounts.is_empty());
        assert_eq!(out.stats.seen, 3);
        assert_eq!(out.stats.unclassified, 1);
        assert_eq!(out.stats.collapsed, 1);
        assert_eq!(out.stats.intraday, 1);
        assert_eq!(
            out.diagnostic,
            Some(IngestError::SchemaDrift {
                unclassified: 1,
                malformed: 0
            })
        );

        let counts = obs.counts();
        assert_eq!(counts.unclassified, 1);
        assert_eq!(counts.collapsed, 1);
        assert_eq!(counts.documents, 1);
    }

    #[test]
    fn test_transactions_carry_anchor_and_source() {
        let obs = LogObserver::new();
        let parser = ActivityParser::new(IngestConfig::default(), &obs).unwrap();
        let mut agg = Aggregator::new(DocumentShape::Graph, &parser);
        agg.offer(raw("A", ("IA", "IN", "IN"), "", 0.0, 0.31));

        let out = agg.finish();
        let trx = &out.accounts["A"][0];
        assert_eq!(trx.date.to_rfc3339(), "2022-06-02T16:00:00-04:00");
        assert_eq!(trx.source, "fidelity.com");
        assert_eq!(trx.kind, TransactionKind::Interest);
        assert_eq!(trx.ticker, "CASH");
    }
}
