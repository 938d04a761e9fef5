//! Document-shape specific extraction. Each shape has its own root path,
//! field layout and classification input; they meet at [`RawRecord`].
//!
//! [`RawRecord`]: crate::RawRecord

pub mod flat_activity;
pub mod graph_history;

use serde_json::Value;

use crate::error::IngestError;
use crate::observer::ParseObserver;
use crate::types::DocumentShape;

/// Parse the raw body. Empty input is silently nothing; invalid JSON is
/// reported and also yields nothing.
pub(crate) fn parse_json(
    doc: &str,
    shape: Option<DocumentShape>,
    observer: &dyn ParseObserver,
) -> Option<Value> {
    if doc.trim().is_empty() {
        return None;
    }
    match serde_json::from_str(doc) {
        Ok(value) => Some(value),
        Err(e) => {
            observer.document_rejected(shape, &IngestError::InvalidJson(e.to_string()));
            None
        }
    }
}

/// Move the record array out from under `root`.
pub(crate) fn take_records(
    mut doc: Value,
    shape: DocumentShape,
    root: &'static str,
    observer: &dyn ParseObserver,
) -> Option<Vec<Value>> {
    match doc.pointer_mut(root).map(Value::take) {
        Some(Value::Array(records)) => Some(records),
        _ => {
            observer.document_rejected(Some(shape), &IngestError::MissingRoot { shape, path: root });
            None
        }
    }
}

/// Which shape a parsed document is, decided by which root path resolves
pub fn detect_shape(doc: &Value) -> Option<DocumentShape> {
    if doc.pointer(flat_activity::ROOT).is_some() {
        Some(DocumentShape::Flat)
    } else if doc.pointer(graph_history::ROOT).is_some() {
        Some(DocumentShape::Graph)
    } else {
        None
    }
}
