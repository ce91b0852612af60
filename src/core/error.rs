use thiserror::Error;

/// Errors reported synchronously by a matching run
///
/// None of these are recoverable inside the engine; the caller gets no
/// partial result.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum MatchError {
    #[error("Shape mismatch: {scores} score rows, {identities} identities, {preferences} preferences")]
    ShapeMismatch {
        scores: usize,
        identities: usize,
        preferences: usize,
    },

    #[error("Score row {row} has {len} columns, expected {expected}")]
    RaggedRow {
        row: usize,
        len: usize,
        expected: usize,
    },

    #[error("Unknown identity label {label:?} for participant {index}")]
    UnknownIdentity { index: usize, label: String },

    #[error("Unknown preference label {label:?} for participant {index}")]
    UnknownPreference { index: usize, label: String },

    #[error("Invalid partition: {0}")]
    InvalidPartition(String),
}

/// Errors raised while building a label catalog
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CatalogError {
    #[error("Duplicate identity label: {0}")]
    DuplicateIdentity(String),

    #[error("Duplicate preference label: {0}")]
    DuplicatePreference(String),

    #[error("Preference {preference:?} admits unknown identity {identity:?}")]
    UnknownAdmittedIdentity { preference: String, identity: String },

    #[error("Too many {kind} labels: {count} exceeds the limit of {limit}")]
    TooManyLabels {
        kind: &'static str,
        count: usize,
        limit: usize,
    },
}
