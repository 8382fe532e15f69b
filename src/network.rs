//! Network parameters
//!
//! A [`Network`] fixes the address prefix, the proof-of-work thresholds and
//! the exponent between raw units and the display unit. It is immutable once
//! built and shared by reference with every account and block it governs.

use crate::{codec, difficulty, Difficulty, Error, PublicKey, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Largest exponent for which `10^exponent` fits in 128 bits
pub const MAX_EXPONENT: u32 = 38;

/// Immutable protocol parameters for one network
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "NetworkParams")]
pub struct Network {
    prefix: String,
    difficulty: Difficulty,
    send_difficulty: Difficulty,
    receive_difficulty: Difficulty,
    exponent: u32,
}

/// Unvalidated network fields as they appear in a config file
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct NetworkParams {
    prefix: String,
    difficulty: Difficulty,
    send_difficulty: Difficulty,
    receive_difficulty: Difficulty,
    #[serde(alias = "exp")]
    exponent: u32,
}

impl Default for NetworkParams {
    fn default() -> Self {
        let nano = Network::nano();
        Self {
            prefix: nano.prefix,
            difficulty: nano.difficulty,
            send_difficulty: nano.send_difficulty,
            receive_difficulty: nano.receive_difficulty,
            exponent: nano.exponent,
        }
    }
}

impl TryFrom<NetworkParams> for Network {
    type Error = Error;

    fn try_from(params: NetworkParams) -> Result<Self> {
        Network::new(
            params.prefix,
            params.difficulty,
            params.send_difficulty,
            params.receive_difficulty,
            params.exponent,
        )
    }
}

impl Network {
    /// Build a network, validating the prefix and exponent
    pub fn new(
        prefix: impl Into<String>,
        difficulty: Difficulty,
        send_difficulty: Difficulty,
        receive_difficulty: Difficulty,
        exponent: u32,
    ) -> Result<Self> {
        let prefix = prefix.into();
        if prefix.is_empty() || !prefix.chars().all(|c| c.is_ascii_graphic()) {
            return Err(Error::config(format!(
                "address prefix {:?} must be non-empty printable ASCII",
                prefix
            )));
        }
        check_exponent(exponent).map_err(|e| Error::config(e.to_string()))?;

        Ok(Self {
            prefix,
            difficulty,
            send_difficulty,
            receive_difficulty,
            exponent,
        })
    }

    /// Main network parameters
    pub fn nano() -> Self {
        Self {
            prefix: "nano_".to_string(),
            difficulty: Difficulty::new(0xffffffc000000000),
            send_difficulty: Difficulty::new(0xfffffff800000000),
            receive_difficulty: Difficulty::new(0xfffffe0000000000),
            exponent: 30,
        }
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Base difficulty that multipliers are relative to
    pub fn difficulty(&self) -> Difficulty {
        self.difficulty
    }

    /// Threshold for send and change blocks
    pub fn send_difficulty(&self) -> Difficulty {
        self.send_difficulty
    }

    /// Threshold for receive and open blocks
    pub fn receive_difficulty(&self) -> Difficulty {
        self.receive_difficulty
    }

    /// Decimal digits between raw units and the display unit
    pub fn exponent(&self) -> u32 {
        self.exponent
    }

    pub fn encode_address(&self, key: &PublicKey) -> String {
        codec::encode(key, &self.prefix)
    }

    pub fn decode_address(&self, address: &str) -> Result<PublicKey> {
        codec::decode(address, &self.prefix)
    }

    /// Difficulty `multiplier` times as hard as this network's base
    pub fn from_multiplier(&self, multiplier: f64) -> Result<Difficulty> {
        difficulty::from_multiplier(multiplier, self.difficulty)
    }

    /// Multiplier of `difficulty` relative to this network's base
    pub fn to_multiplier(&self, difficulty: Difficulty) -> f64 {
        difficulty::to_multiplier(difficulty, self.difficulty)
    }

    /// Raw amount as a decimal string in the display unit
    pub fn from_raw(&self, raw: u128) -> String {
        format_raw(raw, self.exponent)
    }

    /// Raw amount as a decimal string scaled by `10^exponent`
    pub fn from_raw_with(&self, raw: u128, exponent: u32) -> Result<String> {
        check_exponent(exponent)?;
        Ok(format_raw(raw, exponent))
    }

    /// Parse a display-unit decimal string into raw units
    pub fn to_raw(&self, value: &str) -> Result<u128> {
        parse_raw(value, self.exponent)
    }

    /// Parse a decimal string scaled by `10^exponent` into raw units
    pub fn to_raw_with(&self, value: &str, exponent: u32) -> Result<u128> {
        check_exponent(exponent)?;
        parse_raw(value, exponent)
    }
}

impl Default for Network {
    fn default() -> Self {
        Self::nano()
    }
}

impl fmt::Display for Network {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} (base {}, send {}, receive {}, 10^{})",
            self.prefix, self.difficulty, self.send_difficulty, self.receive_difficulty, self.exponent
        )
    }
}

fn check_exponent(exponent: u32) -> Result<()> {
    if exponent > MAX_EXPONENT {
        return Err(Error::domain(format!(
            "exponent {} exceeds {}",
            exponent, MAX_EXPONENT
        )));
    }
    Ok(())
}

fn format_raw(raw: u128, exponent: u32) -> String {
    if exponent == 0 {
        return raw.to_string();
    }
    let scale = 10u128.pow(exponent);
    format!(
        "{}.{:0width$}",
        raw / scale,
        raw % scale,
        width = exponent as usize
    )
}

fn parse_raw(value: &str, exponent: u32) -> Result<u128> {
    let trimmed = value.trim();
    let (whole, fraction) = match trimmed.split_once('.') {
        Some((whole, fraction)) => (whole, fraction),
        None => (trimmed, ""),
    };

    let all_digits = |s: &str| s.bytes().all(|b| b.is_ascii_digit());
    if (whole.is_empty() && fraction.is_empty()) || !all_digits(whole) || !all_digits(fraction) {
        return Err(Error::invalid_amount(format!(
            "{:?} is not a non-negative decimal number",
            value
        )));
    }

    let digits = exponent as usize;
    let (kept, dropped) = fraction.split_at(fraction.len().min(digits));
    if dropped.bytes().any(|b| b != b'0') {
        return Err(Error::invalid_amount(format!(
            "{:?} has more than {} fractional digits",
            value, digits
        )));
    }

    let overflow = || Error::invalid_amount(format!("{:?} does not fit in 128 bits", value));
    let scale = 10u128.pow(exponent);
    let whole = if whole.is_empty() {
        0
    } else {
        whole.parse::<u128>().map_err(|_| overflow())?
    };
    let fraction = if kept.is_empty() {
        0
    } else {
        // `kept` has at most `exponent` digits, so this fits
        kept.parse::<u128>().map_err(|_| overflow())? * 10u128.pow((digits - kept.len()) as u32)
    };

    whole
        .checked_mul(scale)
        .and_then(|raw| raw.checked_add(fraction))
        .ok_or_else(overflow)
}
