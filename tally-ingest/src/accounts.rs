//! Account list from the GraphQL context document
//! (`data.getContext.person.assets[]`).
//!
//! Callers feed these account numbers into the history request whose
//! response [`ActivityParser::parse_graph`](crate::ActivityParser::parse_graph)
//! consumes.

use log::{debug, warn};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::extract::{flag, text};

pub const ROOT: &str = "/data/getContext/person/assets";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    pub number: String,
    pub account_type: String,
    pub sub_type: String,
    pub sub_type_description: String,
    /// Nickname the customer gave the account
    pub name: String,
    /// Registration, e.g. "ROTH IRA"
    pub registration: String,
    pub relationship_role: String,
    pub is_tradable: bool,
    pub is_multi_currency_allowed: bool,
}

fn account_from_node(node: &Value) -> Account {
    Account {
        number: text(node, "/acctNum"),
        account_type: text(node, "/acctType"),
        sub_type: text(node, "/acctSubType"),
        sub_type_description: text(node, "/acctSubTypeDesc"),
        name: text(node, "/preferenceDetail/name"),
        registration: text(node, "/acctAttrDetail/regTypeDesc"),
        relationship_role: text(node, "/acctRelAttrDetail/relRoleTypeCode"),
        is_tradable: flag(node, "/acctTradeAttrDetail/isTradable"),
        is_multi_currency_allowed: flag(node, "/acctIndDetail/isMultiCurrencyAllowed"),
    }
}

/// Parse the account context document. Anything unreadable yields an
/// empty list; entries without an account number are dropped.
pub fn parse_accounts(doc: &str) -> Vec<Account> {
    if doc.trim().is_empty() {
        return Vec::new();
    }
    let json: Value = match serde_json::from_str(doc) {
        Ok(v) => v,
        Err(e) => {
            warn!("account context ignored: document is not valid JSON: {e}");
            return Vec::new();
        }
    };
    let Some(assets) = json.pointer(ROOT).and_then(Value::as_array) else {
        warn!("account context ignored: no account list at {ROOT}");
        return Vec::new();
    };

    let accounts: Vec<Account> = assets
        .iter()
        .map(account_from_node)
        .filter(|acct| !acct.number.is_empty())
        .collect();
    debug!("found {} accounts in context document", accounts.len());
    accounts
}

/// Account numbers joined the way the history query's `acctIdList` expects
pub fn account_id_list(accounts: &[Account]) -> String {
    accounts
        .iter()
        .map(|acct| acct.number.as_str())
        .collect::<Vec<_>>()
        .join(",")
}
