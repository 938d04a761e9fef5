use thiserror::Error;

use crate::types::DocumentShape;

/// Everything that can go wrong while reading an activity document.
///
/// Only `SchemaDrift` ever reaches a caller, as the non-fatal diagnostic on
/// a [`ParseOutcome`](crate::ParseOutcome). The record-level variants are
/// handed to the [`ParseObserver`](crate::ParseObserver) as skip reasons.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum IngestError {
    #[error("document is not valid JSON: {0}")]
    InvalidJson(String),

    #[error("document has no {shape} root at {path}")]
    MissingRoot {
        shape: DocumentShape,
        path: &'static str,
    },

    #[error("document matches no known activity shape")]
    UnknownShape,

    #[error("record has no {0}")]
    MissingField(&'static str),

    #[error("unparsable date '{value}' (expected {format})")]
    InvalidDate { value: String, format: &'static str },

    #[error("unparsable number in {field}: '{value}'")]
    InvalidNumber { field: &'static str, value: String },

    #[error("unknown {shape} classification: {combination}")]
    UnknownClassification {
        shape: DocumentShape,
        combination: String,
    },

    #[error("{unclassified} unclassified and {malformed} malformed records skipped")]
    SchemaDrift { unclassified: usize, malformed: usize },
}
