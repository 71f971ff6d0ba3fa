use std::time::Duration;
use thiserror::Error;

/// Custom error type for decoding operations.
///
/// Only raised while turning text into bytes. Walking an already decoded buffer never fails.
#[derive(Debug, Error)]
pub enum DecodeError {
    /// The text is not valid hex.
    #[error("hex decode failed: {0}")]
    HexDecode(#[from] hex::FromHexError),

    /// The input file could not be read.
    #[error("could not read file '{path}': {source}")]
    FileRead {
        /// path as given
        path: String,
        /// underlying I/O failure
        #[source]
        source: std::io::Error,
    },

    /// An address was not 20 bytes of hex.
    #[error("invalid address '{0}': expected 20 bytes of hex")]
    InvalidAddress(String),
}

/// Failure reported by an external collaborator (chain-state reader, signature lookup).
///
/// The analyzer absorbs every one of these as "no information".
#[derive(Debug, Clone, Error)]
pub enum CollaboratorError {
    /// The request never produced a response (connection refused, DNS, TLS, ...).
    #[error("transport error: {0}")]
    Transport(String),
    /// The remote answered with a JSON-RPC error object.
    #[error("rpc error {code}: {message}")]
    Rpc {
        /// JSON-RPC error code
        code: i64,
        /// error message from the node
        message: String,
    },
    /// The remote answered, but not in the expected shape.
    #[error("malformed response: {0}")]
    Malformed(String),
    /// The request did not complete within the configured budget.
    #[error("timed out after {0:?}")]
    Timeout(Duration),
    /// The collaborator is not available in this configuration.
    #[error("collaborator unavailable: {0}")]
    Unavailable(&'static str),
}

/// Errors raised while loading analyzer configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The config file could not be read.
    #[error("could not read config '{path}': {source}")]
    Read {
        /// path as given
        path: String,
        /// underlying I/O failure
        #[source]
        source: std::io::Error,
    },
    /// The config file is not valid analyzer config JSON.
    #[error("invalid config: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Error type for the text entry point of the analysis pipeline.
#[derive(Debug, Error)]
pub enum AnalyzeError {
    /// The input text could not be decoded into bytecode.
    #[error("decode error: {0}")]
    Decode(#[from] DecodeError),
}
