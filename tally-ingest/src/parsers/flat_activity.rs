//! Flat activity-tab document (`transaction.txnDetails.txnDetail[]`).
//!
//! Expected entry:
//!   { "acctNum": "Z00000001", "date": "06/01/2022", "intradayInd": false,
//!     "isDeposit": false, "orderNumber": "24152C0GXY",
//!     "txnDescription": "YOU SOLD EXCHANGE TRADED FUND",
//!     "amtDetail": { "price": "104.32", "shares": -32, "fee": 0.01,
//!                    "commission": 0, "net": 3338.23 },
//!     "brokerageDetail": { "brokerageAccountType": "Margin",
//!                          "securityDetail": { "symbol": "STIP" } } }
//!
//! There is no coded triple; kind comes from the deposit flag, account type,
//! share/amount sign and ticker presence.

use serde_json::Value;

use crate::aggregate::Aggregator;
use crate::classify::{ClassSignals, FlatSignals};
use crate::error::IngestError;
use crate::extract::{flag, number, strict_date, strict_number, text};
use crate::observer::{ParseObserver, SkipReason};
use crate::parsers::{parse_json, take_records};
use crate::types::{DocumentShape, ParseOutcome, RawRecord};
use crate::ActivityParser;

pub const ROOT: &str = "/transaction/txnDetails/txnDetail";
pub const DATE_FORMAT: &str = "%m/%d/%Y";

/// Pull one flat entry into a [`RawRecord`]. Fails only on a missing
/// account, an unparsable date or an unparsable price.
pub fn extract_record(node: &Value, observer: &dyn ParseObserver) -> Result<RawRecord, IngestError> {
    let account = text(node, "/acctNum");
    if account.is_empty() {
        return Err(IngestError::MissingField("acctNum"));
    }
    let date = strict_date(node, "/date", DATE_FORMAT)?;
    let price_per_share = strict_number(node, "/amtDetail/price", "amtDetail.price")?;

    let shares = number(node, "/amtDetail/shares", "amtDetail.shares", observer);
    let net = number(node, "/amtDetail/net", "amtDetail.net", observer);
    let commission = number(node, "/amtDetail/commission", "amtDetail.commission", observer)
        + number(node, "/amtDetail/fee", "amtDetail.fee", observer);
    let ticker = text(node, "/brokerageDetail/securityDetail/symbol");

    let signals = FlatSignals {
        is_deposit: flag(node, "/isDeposit"),
        cash_account: text(node, "/brokerageDetail/brokerageAccountType").eq_ignore_ascii_case("cash"),
        shares,
        net,
        has_ticker: !ticker.is_empty(),
    };

    Ok(RawRecord {
        account,
        date,
        ticker,
        signals: ClassSignals::Flat(signals),
        commission,
        price_per_share,
        shares,
        total_value: net,
        memo: text(node, "/txnDescription"),
        source_id: text(node, "/orderNumber"),
    })
}

pub(crate) fn parse_records(parser: &ActivityParser<'_>, records: &[Value]) -> ParseOutcome {
    let mut agg = Aggregator::new(DocumentShape::Flat, parser);
    for node in records {
        if flag(node, "/intradayInd") {
            agg.skip(&text(node, "/acctNum"), SkipReason::Intraday);
            continue;
        }
        match extract_record(node, parser.observer()) {
            Ok(raw) => agg.offer(raw),
            Err(err) => agg.skip(&text(node, "/acctNum"), SkipReason::Malformed(err)),
        }
    }
    agg.finish()
}

/// Parse a flat activity document. Empty, invalid or rootless documents
/// produce an empty outcome.
pub fn parse_flat_activity(parser: &ActivityParser<'_>, doc: &str) -> ParseOutcome {
    let observer = parser.observer();
    let Some(json) = parse_json(doc, Some(DocumentShape::Flat), observer) else {
        return ParseOutcome::default();
    };
    match take_records(json, DocumentShape::Flat, ROOT, observer) {
        Some(records) => parse_records(parser, &records),
        None => ParseOutcome::default(),
    }
}
