//! Nano Client
//!
//! Client-side building blocks for the Nano block-lattice:
//! - Address encoding and decoding with checksums
//! - Deterministic and BIP39 mnemonic key derivation
//! - State block hashing, signing and JSON serialization
//! - Account bookkeeping for send, receive and representative changes
//! - Parallel, cancellable proof-of-work generation and validation

pub mod account;
pub mod block;
pub mod codec;
pub mod config;
pub mod crypto;
pub mod difficulty;
pub mod error;
pub mod keys;
pub mod network;
pub mod types;
pub mod utils;
pub mod work;
pub mod worker;

pub use account::Account;
pub use block::{StateBlock, WireBlock};
pub use config::Config;
pub use error::{Error, Result};
pub use keys::{deterministic_key, generate_mnemonic, mnemonic_key, KeyPair};
pub use network::Network;
pub use types::*;
pub use work::WorkEngine;
pub use worker::{SearchOutcome, WorkSearch};

/// Application information
pub const APP_NAME: &str = "nano-client";
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");
pub const APP_DESCRIPTION: &str = env!("CARGO_PKG_DESCRIPTION");
