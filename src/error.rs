//! Typed errors for the trading graph and for user input validation.
//!
//! Everything above these (HTTP, file IO, JSON) travels as `eyre::Report`.

use thiserror::Error;

/// Errors raised while populating the trading graph.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GraphError {
    /// A pair whose both ends are the same commodity. Caller bug, never retried.
    #[error("invalid trading pair: {commodity} -> {commodity}")]
    InvalidPair { commodity: String },
}

/// Errors raised while validating CLI input against the configuration.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("provide at least 2 items")]
    TooFewItems,

    #[error("{context}duplicate items")]
    DuplicateItems { context: &'static str },

    #[error("{context}{item} is not a supported item")]
    UnsupportedItem { context: &'static str, item: String },

    #[error("invalid capital entry '{entry}', expected item=amount")]
    InvalidCapital { entry: String },

    #[error("invalid value for {field}: {reason}")]
    InvalidValue { field: &'static str, reason: String },

    #[error("{0} is already in the list")]
    AlreadyListed(String),
}
