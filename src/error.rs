//! Error handling for the nano client
//!
//! Every failure in the library is local and synchronous: it is reported to the
//! immediate caller and never retried internally.

use thiserror::Error;

/// Result type alias for nano client operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for the nano client
#[derive(Error, Debug)]
pub enum Error {
    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// YAML configuration parsing errors
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration errors
    #[error("Configuration error: {message}")]
    Config { message: String },

    /// Bad address length, prefix, alphabet or checksum
    #[error("Invalid address {address:?}: {reason}")]
    InvalidAddress { address: String, reason: String },

    /// Signing or derivation requested on a watch-only account
    #[error("Private key required for {operation}")]
    MissingPrivateKey { operation: String },

    /// Non-positive or non-integral amount
    #[error("Invalid amount: {message}")]
    InvalidAmount { message: String },

    /// Send would take the balance below zero
    #[error("Insufficient balance: {balance} raw available, {amount} raw requested")]
    InsufficientBalance { balance: u128, amount: u128 },

    /// Receive would take the balance to 2^128 or beyond
    #[error("Balance overflow: {balance} raw + {amount} raw does not fit in 128 bits")]
    BalanceOverflow { balance: u128, amount: u128 },

    /// Wrong length or non-hex input for a hex-decoded field
    #[error("Malformed hex for {field}: {message}")]
    MalformedHex { field: String, message: String },

    /// Numeric domain errors (difficulty/multiplier conversion, derivation index)
    #[error("Domain error: {message}")]
    Domain { message: String },

    /// Mnemonic failed word list or checksum validation
    #[error("Mnemonic checksum mismatch: {message}")]
    ChecksumMismatch { message: String },

    /// Mnemonic generation errors
    #[error("Mnemonic error: {message}")]
    Mnemonic { message: String },

    /// Signature primitive errors
    #[error("Cryptographic error: {message}")]
    Crypto { message: String },

    /// Invalid state errors
    #[error("Invalid state: {message}")]
    InvalidState { message: String },
}

impl Error {
    /// Create a configuration error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create an invalid address error
    pub fn invalid_address(address: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidAddress {
            address: address.into(),
            reason: reason.into(),
        }
    }

    /// Create a missing private key error
    pub fn missing_private_key(operation: impl Into<String>) -> Self {
        Self::MissingPrivateKey {
            operation: operation.into(),
        }
    }

    /// Create an invalid amount error
    pub fn invalid_amount(message: impl Into<String>) -> Self {
        Self::InvalidAmount {
            message: message.into(),
        }
    }

    /// Create a malformed hex error
    pub fn malformed_hex(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::MalformedHex {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Create a domain error
    pub fn domain(message: impl Into<String>) -> Self {
        Self::Domain {
            message: message.into(),
        }
    }

    /// Create a mnemonic checksum error
    pub fn checksum_mismatch(message: impl Into<String>) -> Self {
        Self::ChecksumMismatch {
            message: message.into(),
        }
    }

    /// Create a mnemonic error
    pub fn mnemonic(message: impl Into<String>) -> Self {
        Self::Mnemonic {
            message: message.into(),
        }
    }

    /// Create a crypto error
    pub fn crypto(message: impl Into<String>) -> Self {
        Self::Crypto {
            message: message.into(),
        }
    }

    /// Create an invalid state error
    pub fn invalid_state(message: impl Into<String>) -> Self {
        Self::InvalidState {
            message: message.into(),
        }
    }

    /// Get error category for logging
    pub fn category(&self) -> &'static str {
        match self {
            Error::Json(_) => "json",
            Error::Yaml(_) => "yaml",
            Error::Io(_) => "io",
            Error::Config { .. } => "config",
            Error::InvalidAddress { .. } => "invalid_address",
            Error::MissingPrivateKey { .. } => "missing_private_key",
            Error::InvalidAmount { .. } => "invalid_amount",
            Error::InsufficientBalance { .. } => "insufficient_balance",
            Error::BalanceOverflow { .. } => "balance_overflow",
            Error::MalformedHex { .. } => "malformed_hex",
            Error::Domain { .. } => "domain",
            Error::ChecksumMismatch { .. } => "checksum_mismatch",
            Error::Mnemonic { .. } => "mnemonic",
            Error::Crypto { .. } => "crypto",
            Error::InvalidState { .. } => "invalid_state",
        }
    }
}
