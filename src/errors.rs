// ABOUTME: Error types for the advice engine's fallible seams
// ABOUTME: Storage adapters and configuration loading; the pipeline itself degrades instead of erroring
//
// SPDX-License-Identifier: MIT OR Apache-2.0

//! # Error Handling
//!
//! The generation pipeline is infallible by design: malformed persisted state
//! deserializes to the type's default, missing collaborators are substituted
//! with no-ops, and failed writes are dropped after a `warn!`. The only places
//! an error type is needed are the storage adapter contract and configuration
//! validation, both of which sit at the crate boundary.

use thiserror::Error;

/// Errors surfaced by storage adapters and configuration loading.
#[derive(Debug, Error)]
pub enum AdviceError {
    /// The backing key-value store failed to read or write a key.
    #[error("storage operation failed for key '{key}': {source}")]
    Storage {
        /// Logical key the operation targeted
        key: String,
        /// Underlying adapter error
        #[source]
        source: anyhow::Error,
    },

    /// A configuration value is outside its valid range.
    #[error("invalid configuration: {0}")]
    InvalidConfig(&'static str),

    /// An environment override could not be parsed.
    #[error("invalid value for environment variable {var}: {value}")]
    InvalidEnvValue {
        /// Variable name
        var: &'static str,
        /// The unparseable value
        value: String,
    },
}

/// Convenience result alias for fallible seams.
pub type Result<T> = std::result::Result<T, AdviceError>;
