//! Core protocol types
//!
//! Fixed-width values used throughout the client, each with strict hex parsing,
//! lowercase hex display and serde support matching the wire format.

use crate::utils::hex_to_array;
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

macro_rules! fixed_bytes {
    ($(#[$meta:meta])* $name:ident, $len:expr, $field:literal) => {
        $(#[$meta])*
        #[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
        pub struct $name([u8; $len]);

        impl $name {
            /// Length in bytes
            pub const LEN: usize = $len;

            /// All-zero value
            pub const ZERO: Self = Self([0u8; $len]);

            /// Wrap raw bytes
            pub const fn new(bytes: [u8; $len]) -> Self {
                Self(bytes)
            }

            /// Borrow the raw bytes
            pub fn as_bytes(&self) -> &[u8; $len] {
                &self.0
            }

            /// Parse from exactly `2 * LEN` hex characters
            pub fn from_hex(s: &str) -> Result<Self> {
                hex_to_array::<{ $len }>(s, $field).map(Self)
            }

            /// Lowercase hex encoding
            pub fn to_hex(&self) -> String {
                hex::encode(self.0)
            }

            /// True if every byte is zero
            pub fn is_zero(&self) -> bool {
                self.0.iter().all(|b| *b == 0)
            }
        }

        impl From<[u8; $len]> for $name {
            fn from(bytes: [u8; $len]) -> Self {
                Self(bytes)
            }
        }

        impl AsRef<[u8]> for $name {
            fn as_ref(&self) -> &[u8] {
                &self.0
            }
        }

        impl FromStr for $name {
            type Err = Error;

            fn from_str(s: &str) -> Result<Self> {
                Self::from_hex(s)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.to_hex())
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}({})", stringify!($name), self.to_hex())
            }
        }

        impl Serialize for $name {
            fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
            where
                S: serde::Serializer,
            {
                serializer.serialize_str(&self.to_hex())
            }
        }

        impl<'de> Deserialize<'de> for $name {
            fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
            where
                D: serde::Deserializer<'de>,
            {
                let s = String::deserialize(deserializer)?;
                Self::from_hex(&s).map_err(serde::de::Error::custom)
            }
        }
    };
}

fixed_bytes!(
    /// 32-byte Ed25519 public key identifying an account
    PublicKey,
    32,
    "public key"
);

fixed_bytes!(
    /// 32-byte block digest
    BlockHash,
    32,
    "block hash"
);

fixed_bytes!(
    /// 32-byte block link: destination key, source hash, or zero
    Link,
    32,
    "link"
);

fixed_bytes!(
    /// 64-byte Ed25519-Blake2b signature
    Signature,
    64,
    "signature"
);

impl From<PublicKey> for Link {
    fn from(key: PublicKey) -> Self {
        Self(key.0)
    }
}

impl From<BlockHash> for Link {
    fn from(hash: BlockHash) -> Self {
        Self(hash.0)
    }
}

/// 32-byte private key. Never printed by `Debug`.
#[derive(Clone, PartialEq, Eq)]
pub struct SecretKey([u8; 32]);

impl SecretKey {
    /// Wrap raw bytes
    pub const fn new(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    /// Borrow the raw bytes
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Parse from 64 hex characters
    pub fn from_hex(s: &str) -> Result<Self> {
        hex_to_array::<32>(s, "secret key").map(Self)
    }

    /// Lowercase hex encoding
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }
}

impl From<[u8; 32]> for SecretKey {
    fn from(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }
}

impl FromStr for SecretKey {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::from_hex(s)
    }
}

impl fmt::Debug for SecretKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SecretKey(..)")
    }
}

/// 8-byte proof-of-work token, displayed as 16 hex characters (big-endian)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Work(pub u64);

impl Work {
    /// Create a new work value
    pub const fn new(value: u64) -> Self {
        Self(value)
    }

    /// Get the work value
    pub const fn value(self) -> u64 {
        self.0
    }

    /// Parse from 16 hex characters
    pub fn from_hex(s: &str) -> Result<Self> {
        hex_to_array::<8>(s, "work").map(|bytes| Self(u64::from_be_bytes(bytes)))
    }

    /// Convert to 16 lowercase hex characters
    pub fn to_hex(self) -> String {
        format!("{:016x}", self.0)
    }
}

impl FromStr for Work {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::from_hex(s)
    }
}

impl fmt::Display for Work {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:016x}", self.0)
    }
}

impl Serialize for Work {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for Work {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Work::from_hex(&s).map_err(serde::de::Error::custom)
    }
}

/// 64-bit proof-of-work threshold. A work hash must be `>=` this value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Difficulty(pub u64);

impl Difficulty {
    /// Create a new difficulty
    pub const fn new(value: u64) -> Self {
        Self(value)
    }

    /// Get the threshold value
    pub const fn value(self) -> u64 {
        self.0
    }

    /// Parse from 16 hex characters
    pub fn from_hex(s: &str) -> Result<Self> {
        hex_to_array::<8>(s, "difficulty").map(|bytes| Self(u64::from_be_bytes(bytes)))
    }

    /// Convert to 16 lowercase hex characters
    pub fn to_hex(self) -> String {
        format!("{:016x}", self.0)
    }

    /// Expected number of hash evaluations to meet this threshold
    pub fn expected_hashes(self) -> f64 {
        let complement = (1u128 << 64) - u128::from(self.0);
        (1u128 << 64) as f64 / complement as f64
    }
}

impl FromStr for Difficulty {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::from_hex(s)
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:016x}", self.0)
    }
}

impl Serialize for Difficulty {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for Difficulty {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Difficulty::from_hex(&s).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn test_block_hash_hex() {
        let hash = BlockHash::from_hex(&"ab".repeat(32)).unwrap();
        assert_eq!(hash.as_bytes(), &[0xab; 32]);
        assert_eq!(hash.to_string(), "ab".repeat(32));
        assert!(!hash.is_zero());
        assert!(BlockHash::ZERO.is_zero());
    }

    #[test]
    fn test_uppercase_hex_accepted() {
        let key = PublicKey::from_hex(&"AB".repeat(32)).unwrap();
        assert_eq!(key.to_hex(), "ab".repeat(32));
    }

    #[test]
    fn test_wrong_length_rejected() {
        assert_matches!(
            BlockHash::from_hex("abcd"),
            Err(Error::MalformedHex { .. })
        );
        assert_matches!(
            Signature::from_hex(&"00".repeat(32)),
            Err(Error::MalformedHex { .. })
        );
        assert_matches!(Work::from_hex("123"), Err(Error::MalformedHex { .. }));
    }

    #[test]
    fn test_non_hex_rejected() {
        assert_matches!(
            Difficulty::from_hex("fffffe000000000g"),
            Err(Error::MalformedHex { .. })
        );
    }

    #[test]
    fn test_work_hex_is_big_endian() {
        let work = Work::from_hex("e1c6427755027448").unwrap();
        assert_eq!(work.value(), 0xe1c6427755027448);
        assert_eq!(work.to_string(), "e1c6427755027448");
        assert_eq!(Work::new(1).to_hex(), "0000000000000001");
    }

    #[test]
    fn test_difficulty_ordering() {
        let easy = Difficulty::from_hex("fffffe0000000000").unwrap();
        let hard = Difficulty::from_hex("fffffff800000000").unwrap();
        assert!(easy < hard);
        assert_eq!(easy.expected_hashes(), (1u64 << 23) as f64);
    }

    #[test]
    fn test_link_conversions() {
        let key = PublicKey::new([7u8; 32]);
        let hash = BlockHash::new([9u8; 32]);
        assert_eq!(Link::from(key).as_bytes(), key.as_bytes());
        assert_eq!(Link::from(hash).as_bytes(), hash.as_bytes());
    }

    #[test]
    fn test_secret_key_debug_redacted() {
        let secret = SecretKey::new([1u8; 32]);
        assert_eq!(format!("{:?}", secret), "SecretKey(..)");
    }

    #[test]
    fn test_serde_as_hex_strings() {
        let difficulty = Difficulty::new(0xffffffc000000000);
        let json = serde_json::to_string(&difficulty).unwrap();
        assert_eq!(json, "\"ffffffc000000000\"");
        let parsed: Difficulty = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, difficulty);

        let hash: BlockHash = serde_json::from_str(&format!("\"{}\"", "00".repeat(32))).unwrap();
        assert_eq!(hash, BlockHash::ZERO);
    }
}
