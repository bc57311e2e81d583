//! Error types for the HaQei engine.

use std::time::Duration;

/// Top-level error type for the engine.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("Computation error: {0}")]
    Computation(#[from] ComputationError),

    #[error("Lookup error: {0}")]
    Lookup(#[from] LookupError),

    #[error("Initialization error: {0}")]
    Initialization(#[from] InitializationError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
}

/// Coarse classification of an [`Error`], used by callers deciding whether to retry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    Validation,
    Computation,
    Lookup,
    Initialization,
    Config,
}

impl Error {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Validation(_) => ErrorKind::Validation,
            Self::Computation(_) => ErrorKind::Computation,
            Self::Lookup(_) => ErrorKind::Lookup,
            Self::Initialization(_) => ErrorKind::Initialization,
            Self::Config(_) => ErrorKind::Config,
        }
    }

    /// Only a failed content load can succeed on a later attempt.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Initialization(_))
    }
}

/// Result alias used across the crate.
pub type Result<T> = std::result::Result<T, Error>;

/// Malformed input supplied by a caller.
#[derive(Debug, thiserror::Error)]
pub enum ValidationError {
    #[error("Unknown dimension tag '{name}' in answer {answer_index}")]
    UnknownDimension { name: String, answer_index: usize },

    #[error("Non-finite weight {weight} for dimension '{name}' in answer {answer_index}")]
    NonFiniteWeight {
        name: String,
        weight: f64,
        answer_index: usize,
    },

    #[error("Summed weight for dimension '{name}' is not finite")]
    NonFiniteTotal { name: String },

    #[error("Line position {position} is out of range (expected 1..=6)")]
    LinePosition { position: u8 },

    #[error("Hexagram id {id} is out of range (expected 1..=64)")]
    HexagramId { id: u8 },

    #[error("Invalid leaf code '{code}' (expected three of P, H)")]
    LeafCode { code: String },

    #[error("Expected exactly 3 classification results, got {count}")]
    RoleCount { count: usize },

    #[error("Role {role} appears more than once")]
    DuplicateRole { role: String },

    #[error("Result for role {actual} was passed in the {expected} slot")]
    RoleMismatch { expected: String, actual: String },
}

/// Failures while constructing catalog records or the catalog itself.
#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("Profile id {id} is out of range (expected 1..=64)")]
    IdOutOfRange { id: u8 },

    #[error("Profile id {id} is defined more than once")]
    DuplicateId { id: u8 },

    #[error("Profile {id} has an empty name")]
    EmptyName { id: u8 },

    #[error("Profile name '{name}' is used by both {first} and {second}")]
    DuplicateName { name: String, first: u8, second: u8 },

    #[error("Unknown trigram '{name}' in profile {id}")]
    UnknownTrigram { id: u8, name: String },

    #[error("Profile {id} lines {lines} do not match trigram pair {lower}/{upper}")]
    LinesMismatch {
        id: u8,
        lines: String,
        lower: String,
        upper: String,
    },

    #[error("Profile {id} has line value {value} (expected 0 or 1)")]
    LineValue { id: u8, value: u8 },

    #[error("Profile {id} has {count} lines (expected 6)")]
    LineCount { id: u8, count: usize },

    #[error("Line pattern {pattern} is shared by profiles {first} and {second}")]
    DuplicatePattern { pattern: String, first: u8, second: u8 },

    #[error("Catalog has {count} profiles (expected 64)")]
    Incomplete { count: usize },
}

/// A computation that cannot produce a defined result.
#[derive(Debug, thiserror::Error)]
pub enum ComputationError {
    #[error("Trait vector for role {role} has zero magnitude; similarity is undefined")]
    ZeroMagnitude { role: String },

    #[error("Line pattern {pattern} does not match any catalog profile")]
    UnmatchedPattern { pattern: String },

    #[error("No successor defined for hexagram {id}")]
    MissingSuccessor { id: u8 },
}

/// A required reference entry is absent.
#[derive(Debug, thiserror::Error)]
pub enum LookupError {
    #[error("Narrative entry not found: '{key}'")]
    NarrativeMissing { key: String },
}

/// The reference data could not be brought into a usable state.
#[derive(Debug, thiserror::Error)]
pub enum InitializationError {
    #[error("Reference data is not loaded yet")]
    NotReady,

    #[error("Failed to read {path}: {reason}")]
    ReadFailed { path: String, reason: String },

    #[error("File {path} is too large: {size} bytes (max {max} bytes)")]
    TooLarge { path: String, size: u64, max: u64 },

    #[error("Failed to parse {path}: {reason}")]
    ParseFailed { path: String, reason: String },

    #[error("Catalog is invalid: {0}")]
    InvalidCatalog(#[from] CatalogError),

    #[error("Malformed narrative key '{key}': {reason}")]
    MalformedNarrativeKey { key: String, reason: String },

    #[error("Narrative entry '{key}' has empty text")]
    EmptyNarrative { key: String },

    #[error("Narrative key '{key}' collides with '{existing}' after canonicalization")]
    DuplicateNarrativeKey { key: String, existing: String },

    #[error("Narrative corpus is incomplete: {missing} of {expected} entries missing (first: '{first_missing}')")]
    IncompleteCorpus {
        missing: usize,
        expected: usize,
        first_missing: String,
    },

    #[error("Content load timed out after {timeout:?}")]
    Timeout { timeout: Duration },

    #[error("Content source failed: {0}")]
    Source(String),
}

/// Configuration-related errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid configuration value for {key}: {message}")]
    InvalidValue { key: String, message: String },

    #[error("Failed to parse configuration: {0}")]
    ParseError(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_initialization_errors_are_retryable() {
        let init: Error = InitializationError::NotReady.into();
        assert!(init.is_retryable());
        assert_eq!(init.kind(), ErrorKind::Initialization);

        let lookup: Error = LookupError::NarrativeMissing {
            key: "乾為天 初九 | PPP".to_string(),
        }
        .into();
        assert!(!lookup.is_retryable());
        assert_eq!(lookup.kind(), ErrorKind::Lookup);

        let validation: Error = ValidationError::LinePosition { position: 7 }.into();
        assert!(!validation.is_retryable());
    }

    #[test]
    fn messages_carry_offending_key() {
        let err: Error = ComputationError::UnmatchedPattern {
            pattern: "011111".to_string(),
        }
        .into();
        assert!(err.to_string().contains("011111"));

        let err = ValidationError::UnknownDimension {
            name: "luck".to_string(),
            answer_index: 3,
        };
        let msg = err.to_string();
        assert!(msg.contains("luck"));
        assert!(msg.contains('3'));
    }
}
