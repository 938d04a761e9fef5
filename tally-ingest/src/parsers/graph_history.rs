//! GraphQL history document (`data.getTransactions.historys[]`).
//!
//! Expected entry:
//!   { "acctNum": "Z00000001", "date": "02 Jun 2022",
//!     "txnTypeCode": "IA", "txnCatCode": "SL", "txnSubCatCode": "SL",
//!     "symbol": "STIP", "description": "YOU SOLD", "orderNumber": "24153XYZ",
//!     "amount": "+$3,338.23",
//!     "detailItems": [ { "key": "Shares", "value": "-32.000" },
//!                      { "key": "Price", "value": "$104.32" },
//!                      { "key": "Commission", "value": "$0.00" },
//!                      { "key": "Fees", "value": "$0.01" } ] }
//!
//! Detail items come in no fixed order and any of them may be missing.

use serde_json::Value;

use crate::aggregate::Aggregator;
use crate::classify::{ClassSignals, CodedTriple};
use crate::error::IngestError;
use crate::extract::{strict_date, strict_number, text, DetailItems};
use crate::observer::{ParseObserver, SkipReason};
use crate::parsers::{parse_json, take_records};
use crate::types::{DocumentShape, ParseOutcome, RawRecord};
use crate::ActivityParser;

pub const ROOT: &str = "/data/getTransactions/historys";
pub const DATE_FORMAT: &str = "%d %b %Y";

/// Pull one history entry into a [`RawRecord`]. Fails only on a missing
/// account, an unparsable date or an unparsable amount.
pub fn extract_record(node: &Value, observer: &dyn ParseObserver) -> Result<RawRecord, IngestError> {
    let account = text(node, "/acctNum");
    if account.is_empty() {
        return Err(IngestError::MissingField("acctNum"));
    }
    let date = strict_date(node, "/date", DATE_FORMAT)?;
    let total_value = strict_number(node, "/amount", "amount")?;

    let items = DetailItems::from_node(node, "/detailItems");
    let triple = CodedTriple::new(
        &text(node, "/txnTypeCode"),
        &text(node, "/txnCatCode"),
        &text(node, "/txnSubCatCode"),
    );

    Ok(RawRecord {
        account,
        date,
        ticker: text(node, "/symbol"),
        signals: ClassSignals::Coded(triple),
        commission: items.amount("Commission", observer) + items.amount("Fees", observer),
        price_per_share: items.amount("Price", observer),
        shares: items.amount("Shares", observer),
        total_value,
        memo: text(node, "/description"),
        source_id: text(node, "/orderNumber"),
    })
}

pub(crate) fn parse_records(parser: &ActivityParser<'_>, records: &[Value]) -> ParseOutcome {
    let mut agg = Aggregator::new(DocumentShape::Graph, parser);
    for node in records {
        match extract_record(node, parser.observer()) {
            Ok(raw) => agg.offer(raw),
            Err(err) => agg.skip(&text(node, "/acctNum"), SkipReason::Malformed(err)),
        }
    }
    agg.finish()
}

/// Parse a GraphQL history document. Empty, invalid or rootless documents
/// produce an empty outcome.
pub fn parse_graph_history(parser: &ActivityParser<'_>, doc: &str) -> ParseOutcome {
    let observer = parser.observer();
    let Some(json) = parse_json(doc, Some(DocumentShape::Graph), observer) else {
        return ParseOutcome::default();
    };
    match take_records(json, DocumentShape::Graph, ROOT, observer) {
        Some(records) => parse_records(parser, &records),
        None => ParseOutcome::default(),
    }
}
