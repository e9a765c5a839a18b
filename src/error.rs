//! Engine error taxonomy.
//!
//! All four variants surface to the caller; none are swallowed. A
//! failed `validate` never returns partial results — absence of a rule
//! is "no finding", a failed lookup is an error.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum EngineError {
    /// Malformed patient or prescription data, rejected before any
    /// rule lookup.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Medication identifier not present in the registry. The
    /// offending item is reported, not silently dropped.
    #[error("Unknown medication: {0}")]
    UnknownMedication(String),

    /// Distinct active-ingredient count exceeds the safety cap on
    /// pairwise analysis.
    #[error("Too many medications: {count} active ingredients exceeds the cap of {max}")]
    TooManyMedications { count: usize, max: usize },

    /// No rule snapshot has been installed yet. Fatal for the calling
    /// request; retries belong to the transport layer.
    #[error("Rule store unavailable: no snapshot loaded")]
    RuleStoreUnavailable,
}
