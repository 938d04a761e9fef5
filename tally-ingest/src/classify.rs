//! Transaction classification.
//!
//! Both document shapes are classified from explicit tables so that every
//! mapping can be inspected and tested on its own. A miss is not an error:
//! the record is skipped and the combination is reported upstream.

use std::fmt;

use tally_core::TransactionKind;

use crate::error::IngestError;
use crate::types::DocumentShape;

// ---------------------------------------------------------------------------
// Graph shape: (txnTypeCode, txnCatCode, txnSubCatCode)
// ---------------------------------------------------------------------------

/// Coded triple attached to every graph-shape history entry
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CodedTriple {
    pub type_code: String,
    pub category: String,
    pub subcategory: String,
}

impl CodedTriple {
    /// Codes are compared trimmed and upper-cased.
    pub fn new(type_code: &str, category: &str, subcategory: &str) -> Self {
        Self {
            type_code: type_code.trim().to_ascii_uppercase(),
            category: category.trim().to_ascii_uppercase(),
            subcategory: subcategory.trim().to_ascii_uppercase(),
        }
    }
}

impl fmt::Display for CodedTriple {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "type={} cat={} sub={}",
            self.type_code, self.category, self.subcategory
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CodedRule {
    Fixed(TransactionKind),
    /// Other credits: non-positive amount is a withdrawal, otherwise a deposit
    CreditBySign,
}

impl CodedRule {
    pub fn resolve(&self, total_value: f64) -> TransactionKind {
        match self {
            CodedRule::Fixed(kind) => *kind,
            CodedRule::CreditBySign if total_value <= 0.0 => TransactionKind::Withdraw,
            CodedRule::CreditBySign => TransactionKind::Deposit,
        }
    }
}

use self::CodedRule::{CreditBySign, Fixed};
use tally_core::TransactionKind::{Buy, Deposit, Dividend, Interest, Sell, Withdraw};

/// Type codes: IA investment activity, DP deposits, WD withdrawals.
pub const CODED_TABLE: &[((&str, &str, &str), CodedRule)] = &[
    // investment activity
    (("IA", "BY", "BY"), Fixed(Buy)),
    (("IA", "BY", "RI"), Fixed(Buy)), // dividend reinvestment
    (("IA", "BY", "EX"), Fixed(Buy)), // exchange in
    (("IA", "SL", "SL"), Fixed(Sell)),
    (("IA", "SL", "RD"), Fixed(Sell)), // redemption
    (("IA", "SL", "EX"), Fixed(Sell)), // exchange out
    (("IA", "DV", "DV"), Fixed(Dividend)),
    (("IA", "DV", "LT"), Fixed(Dividend)), // long-term capital gain
    (("IA", "DV", "ST"), Fixed(Dividend)), // short-term capital gain
    (("IA", "DV", "FD"), Fixed(Dividend)), // foreign dividend
    (("IA", "IN", "IN"), Fixed(Interest)),
    (("IA", "IN", "BD"), Fixed(Interest)), // bond interest
    (("IA", "OC", "OC"), CreditBySign),
    // cash in
    (("DP", "EF", "EF"), Fixed(Deposit)), // electronic funds transfer
    (("DP", "DD", "DD"), Fixed(Deposit)), // direct deposit
    (("DP", "CK", "CK"), Fixed(Deposit)), // check received
    (("DP", "WR", "WR"), Fixed(Deposit)), // wire in
    (("DP", "TR", "TI"), Fixed(Deposit)), // transfer from another account
    (("DP", "CT", "CT"), Fixed(Deposit)), // contribution
    // cash out
    (("WD", "EF", "EF"), Fixed(Withdraw)),
    (("WD", "CK", "CK"), Fixed(Withdraw)), // check paid
    (("WD", "BP", "BP"), Fixed(Withdraw)), // bill pay
    (("WD", "DC", "DC"), Fixed(Withdraw)), // debit card
    (("WD", "WR", "WR"), Fixed(Withdraw)), // wire out
    (("WD", "TR", "TO"), Fixed(Withdraw)), // transfer to another account
    (("WD", "FE", "FE"), Fixed(Withdraw)), // account fee
    (("WD", "TX", "TX"), Fixed(Withdraw)), // tax withholding
];

pub fn lookup_coded(triple: &CodedTriple) -> Option<CodedRule> {
    CODED_TABLE
        .iter()
        .find(|((t, c, s), _)| {
            *t == triple.type_code && *c == triple.category && *s == triple.subcategory
        })
        .map(|(_, rule)| *rule)
}

pub fn classify_coded(triple: &CodedTriple, total_value: f64) -> Option<TransactionKind> {
    lookup_coded(triple).map(|rule| rule.resolve(total_value))
}

// ---------------------------------------------------------------------------
// Flat shape: deposit flag, account type, share/amount sign, ticker presence
// ---------------------------------------------------------------------------

/// What the flat shape offers in place of a coded triple
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FlatSignals {
    pub is_deposit: bool,
    /// `brokerageDetail.brokerageAccountType == "Cash"`
    pub cash_account: bool,
    pub shares: f64,
    pub net: f64,
    pub has_ticker: bool,
}

impl fmt::Display for FlatSignals {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "isDeposit={} cashAccount={} shares={} net={} ticker={}",
            self.is_deposit,
            self.cash_account,
            self.shares,
            self.net,
            if self.has_ticker { "present" } else { "absent" }
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flag {
    Any,
    Yes,
    No,
}

impl Flag {
    pub fn matches(&self, value: bool) -> bool {
        match self {
            Flag::Any => true,
            Flag::Yes => value,
            Flag::No => !value,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignTest {
    Any,
    Negative,
    Zero,
    Positive,
    NonNegative,
}

impl SignTest {
    pub fn matches(&self, value: f64) -> bool {
        match self {
            SignTest::Any => true,
            SignTest::Negative => value < 0.0,
            SignTest::Zero => value == 0.0,
            SignTest::Positive => value > 0.0,
            SignTest::NonNegative => value >= 0.0,
        }
    }
}

/// One row of the flat decision table. Rows are tried in order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FlatRule {
    pub label: &'static str,
    pub is_deposit: Flag,
    pub cash_account: Flag,
    pub shares: SignTest,
    pub net: SignTest,
    pub ticker: Flag,
    pub kind: TransactionKind,
    /// Heuristic kept for compatibility but not confirmed against real data
    pub provisional: bool,
}

impl FlatRule {
    pub fn matches(&self, signals: &FlatSignals) -> bool {
        self.is_deposit.matches(signals.is_deposit)
            && self.cash_account.matches(signals.cash_account)
            && self.shares.matches(signals.shares)
            && self.net.matches(signals.net)
            && self.ticker.matches(signals.has_ticker)
    }
}

const fn rule(
    label: &'static str,
    is_deposit: Flag,
    cash_account: Flag,
    shares: SignTest,
    net: SignTest,
    ticker: Flag,
    kind: TransactionKind,
) -> FlatRule {
    FlatRule {
        label,
        is_deposit,
        cash_account,
        shares,
        net,
        ticker,
        kind,
        provisional: false,
    }
}

pub const FLAT_TABLE: &[FlatRule] = &[
    rule("deposit flag", Flag::Yes, Flag::Any, SignTest::Any, SignTest::Any, Flag::Any, Deposit),
    rule("cash account credit", Flag::Any, Flag::Yes, SignTest::Any, SignTest::NonNegative, Flag::Any, Deposit),
    rule("cash account debit", Flag::Any, Flag::Yes, SignTest::Any, SignTest::Negative, Flag::Any, Withdraw),
    rule("shares bought", Flag::Any, Flag::Any, SignTest::Positive, SignTest::Any, Flag::Any, Buy),
    rule("shares sold", Flag::Any, Flag::Any, SignTest::Negative, SignTest::Any, Flag::Any, Sell),
    rule("security distribution", Flag::Any, Flag::Any, SignTest::Zero, SignTest::Any, Flag::Yes, Dividend),
    // TODO: confirm against fixtures with deposits that lack isDeposit; a
    // positive net here is more likely a deposit than a withdrawal.
    FlatRule {
        provisional: true,
        ..rule("no shares, no ticker", Flag::Any, Flag::Any, SignTest::Zero, SignTest::Any, Flag::No, Withdraw)
    },
];

pub fn match_flat(signals: &FlatSignals) -> Option<&'static FlatRule> {
    FLAT_TABLE.iter().find(|rule| rule.matches(signals))
}

pub fn classify_flat(signals: &FlatSignals) -> Option<TransactionKind> {
    match_flat(signals).map(|rule| rule.kind)
}

// ---------------------------------------------------------------------------
// Dispatch
// ---------------------------------------------------------------------------

/// Shape-specific classification input carried by a [`RawRecord`](crate::RawRecord)
#[derive(Debug, Clone, PartialEq)]
pub enum ClassSignals {
    Flat(FlatSignals),
    Coded(CodedTriple),
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Verdict {
    pub kind: TransactionKind,
    /// The flat rule that fired, when the record came from the flat shape
    pub flat_rule: Option<&'static FlatRule>,
}

impl ClassSignals {
    pub fn shape(&self) -> DocumentShape {
        match self {
            ClassSignals::Flat(_) => DocumentShape::Flat,
            ClassSignals::Coded(_) => DocumentShape::Graph,
        }
    }

    pub fn classify(&self, total_value: f64) -> Result<Verdict, IngestError> {
        let verdict = match self {
            ClassSignals::Flat(signals) => match_flat(signals).map(|rule| Verdict {
                kind: rule.kind,
                flat_rule: Some(rule),
            }),
            ClassSignals::Coded(triple) => classify_coded(triple, total_value).map(|kind| Verdict {
                kind,
                flat_rule: None,
            }),
        };
        verdict.ok_or_else(|| IngestError::UnknownClassification {
            shape: self.shape(),
            combination: self.to_string(),
        })
    }
}

impl fmt::Display for ClassSignals {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ClassSignals::Flat(signals) => fmt::Display::fmt(signals, f),
            ClassSignals::Coded(triple) => fmt::Display::fmt(triple, f),
        }
    }
}
