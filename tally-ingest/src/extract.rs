//! Field extraction from one document record.
//!
//! Paths are JSON pointers relative to the record node. Missing fields read
//! as empty/zero; only the `strict_*` readers can fail.

use chrono::NaiveDate;
use serde_json::Value;

use crate::error::IngestError;
use crate::observer::ParseObserver;

/// Parse a dollar-formatted amount like "-$1,234.56", "$ 12", "(3.10)".
///
/// Returns `None` for anything that is not a finite number once `$`, `,`
/// and whitespace are stripped.
pub fn parse_amount(raw: &str) -> Option<f64> {
    let cleaned: String = raw
        .chars()
        .filter(|c| *c != '$' && *c != ',' && !c.is_whitespace())
        .collect();

    let (negated, body) = match cleaned.strip_prefix('(').and_then(|s| s.strip_suffix(')')) {
        Some(inner) => (true, inner),
        None => (false, cleaned.as_str()),
    };

    // f64::from_str accepts "inf" and "NaN"; amounts never are
    if !body.bytes().any(|b| b.is_ascii_digit()) {
        return None;
    }
    let value: f64 = body.parse().ok()?;
    if !value.is_finite() {
        return None;
    }
    Some(if negated { -value } else { value })
}

/// Placeholders the API uses for "no value"
fn is_blank(raw: &str) -> bool {
    matches!(raw.trim(), "" | "--" | "-" | "N/A" | "n/a")
}

/// String field, trimmed. Numbers are rendered; anything else reads as "".
pub fn text(node: &Value, pointer: &str) -> String {
    match node.pointer(pointer) {
        Some(Value::String(s)) => s.trim().to_string(),
        Some(Value::Number(n)) => n.to_string(),
        _ => String::new(),
    }
}

/// Boolean field. Accepts JSON booleans and "true"/"Y" strings.
pub fn flag(node: &Value, pointer: &str) -> bool {
    match node.pointer(pointer) {
        Some(Value::Bool(b)) => *b,
        Some(Value::String(s)) => {
            let s = s.trim();
            s.eq_ignore_ascii_case("true") || s.eq_ignore_ascii_case("y")
        }
        _ => false,
    }
}

/// Read a JSON value as a number, defaulting to 0.0. Unreadable values are
/// reported to the observer.
pub fn coerce_number(value: Option<&Value>, field: &str, observer: &dyn ParseObserver) -> f64 {
    match value {
        None | Some(Value::Null) => 0.0,
        Some(Value::Number(n)) => n.as_f64().unwrap_or(0.0),
        Some(Value::String(s)) if is_blank(s) => 0.0,
        Some(Value::String(s)) => parse_amount(s).unwrap_or_else(|| {
            observer.field_coerced(field, s);
            0.0
        }),
        Some(other) => {
            observer.field_coerced(field, &other.to_string());
            0.0
        }
    }
}

/// Lenient numeric field at `pointer`
pub fn number(node: &Value, pointer: &str, field: &str, observer: &dyn ParseObserver) -> f64 {
    coerce_number(node.pointer(pointer), field, observer)
}

/// Numeric field that must parse when present. Absent or blank reads as 0.0.
pub fn strict_number(node: &Value, pointer: &str, field: &'static str) -> Result<f64, IngestError> {
    match node.pointer(pointer) {
        None | Some(Value::Null) => Ok(0.0),
        Some(Value::Number(n)) => Ok(n.as_f64().unwrap_or(0.0)),
        Some(Value::String(s)) if is_blank(s) => Ok(0.0),
        Some(Value::String(s)) => parse_amount(s).ok_or_else(|| IngestError::InvalidNumber {
            field,
            value: s.clone(),
        }),
        Some(other) => Err(IngestError::InvalidNumber {
            field,
            value: other.to_string(),
        }),
    }
}

/// Date field in the given chrono format
pub fn strict_date(node: &Value, pointer: &str, format: &'static str) -> Result<NaiveDate, IngestError> {
    let raw = text(node, pointer);
    NaiveDate::parse_from_str(&raw, format).map_err(|_| IngestError::InvalidDate { value: raw, format })
}

static NULL: Value = Value::Null;

/// Named numeric items attached to a record (`detailItems[]`).
///
/// Lookup is by name, case-insensitive, so item order and count may vary
/// between records.
#[derive(Debug, Clone, Default)]
pub struct DetailItems<'a> {
    items: Vec<(&'a str, &'a Value)>,
}

impl<'a> DetailItems<'a> {
    /// Collect `{key|name, value}` pairs from the array at `pointer`.
    /// Entries without a name are ignored.
    pub fn from_node(node: &'a Value, pointer: &str) -> Self {
        let items = node
            .pointer(pointer)
            .and_then(Value::as_array)
            .map(|arr| {
                arr.iter()
                    .filter_map(|item| {
                        let name = item
                            .get("key")
                            .or_else(|| item.get("name"))
                            .and_then(Value::as_str)?;
                        Some((name.trim(), item.get("value").unwrap_or(&NULL)))
                    })
                    .collect()
            })
            .unwrap_or_default();
        Self { items }
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn get(&self, name: &str) -> Option<&'a Value> {
        self.items
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| *value)
    }

    /// Numeric value of the item called `name`; absent items read as 0.0
    pub fn amount(&self, name: &str, observer: &dyn ParseObserver) -> f64 {
        coerce_number(self.get(name), name, observer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::observer::LogObserver;
    use serde_json::json;

    #[test]
    fn test_parse_amount_formats() {
        assert_eq!(parse_amount("$1,234.56"), Some(1234.56));
        assert_eq!(parse_amount("-$1,234.56"), Some(-1234.56));
        assert_eq!(parse_amount("+$12.00"), Some(12.0));
        assert_eq!(parse_amount(" $ 0.598 "), Some(0.598));
        assert_eq!(parse_amount("(3.10)"), Some(-3.10));
        assert_eq!(parse_amount("-32"), Some(-32.0));
    }

    #[test]
    fn test_parse_amount_rejects_garbage() {
        assert_eq!(parse_amount("abc"), None);
        assert_eq!(parse_amount("$"), None);
        assert_eq!(parse_amount("NaN"), None);
        assert_eq!(parse_amount("inf"), None);
        assert_eq!(parse_amount("1.2.3"), None);
    }

    #[test]
    fn test_number_defaults_and_warns() {
        let obs = LogObserver::new();
        let node = json!({"a": "$5.00", "b": "oops", "c": null, "d": 7, "e": "--", "f": true});
        assert_eq!(number(&node, "/a", "a", &obs), 5.0);
        assert_eq!(number(&node, "/b", "b", &obs), 0.0);
        assert_eq!(number(&node, "/c", "c", &obs), 0.0);
        assert_eq!(number(&node, "/d", "d", &obs), 7.0);
        assert_eq!(number(&node, "/e", "e", &obs), 0.0);
        assert_eq!(number(&node, "/f", "f", &obs), 0.0);
        assert_eq!(number(&node, "/missing", "missing", &obs), 0.0);
        // "oops" and `true` are the only unreadable values
        assert_eq!(obs.counts().coerced_fields, 2);
    }

    #[test]
    fn test_strict_number() {
        let node = json!({"amtDetail": {"price": "102.45", "blank": "", "bad": "x1"}});
        assert_eq!(strict_number(&node, "/amtDetail/price", "price"), Ok(102.45));
        assert_eq!(strict_number(&node, "/amtDetail/blank", "price"), Ok(0.0));
        assert_eq!(strict_number(&node, "/amtDetail/none", "price"), Ok(0.0));
        assert_eq!(
            strict_number(&node, "/amtDetail/bad", "price"),
            Err(IngestError::InvalidNumber {
                field: "price",
                value: "x1".to_string()
            })
        );
    }

    #[test]
    fn test_strict_date_formats() {
        let node = json!({"flat": "06/02/2022", "graph": "02 Jun 2022", "bad": "2022-06-02"});
        let expected = NaiveDate::from_ymd_opt(2022, 6, 2).unwrap();
        assert_eq!(strict_date(&node, "/flat", "%m/%d/%Y"), Ok(expected));
        assert_eq!(strict_date(&node, "/graph", "%d %b %Y"), Ok(expected));
        assert!(matches!(
            strict_date(&node, "/bad", "%m/%d/%Y"),
            Err(IngestError::InvalidDate { .. })
        ));
    }

    #[test]
    fn test_text_and_flag() {
        let node = json!({"s": "  STIP ", "n": 123, "b": true, "y": "Y", "o": {}});
        assert_eq!(text(&node, "/s"), "STIP");
        assert_eq!(text(&node, "/n"), "123");
        assert_eq!(text(&node, "/o"), "");
        assert!(flag(&node, "/b"));
        assert!(flag(&node, "/y"));
        assert!(!flag(&node, "/s"));
        assert!(!flag(&node, "/missing"));
    }

    #[test]
    fn test_detail_items_lookup_by_name() {
        let obs = LogObserver::new();
        let node = json!({"detailItems": [
            {"key": "Shares", "value": "-32.000"},
            {"key": "Price", "value": "$49.87"},
            {"name": "fees", "value": "$0.02"},
            {"value": "$99"}
        ]});
        let items = DetailItems::from_node(&node, "/detailItems");
        assert_eq!(items.len(), 3);
        assert_eq!(items.amount("Price", &obs), 49.87);
        assert_eq!(items.amount("Shares", &obs), -32.0);
        assert_eq!(items.amount("Fees", &obs), 0.02);
        assert_eq!(items.amount("Commission", &obs), 0.0);
    }

    #[test]
    fn test_detail_items_missing_array() {
        let node = json!({"detailItems": null});
        assert!(DetailItems::from_node(&node, "/detailItems").is_empty());
    }
}
