//! Key derivation and key pairs
//!
//! Two derivation schemes produce secret keys: a seed hashed with an account
//! index, and a BIP39 mnemonic walked down the fixed hardened path
//! `44'/165'/index'` with HMAC-SHA512.

use crate::crypto::{blake2b_256, derive_public_key, hmac_sha512, random_bytes};
use crate::{codec, Error, Network, PublicKey, Result, SecretKey};
use bip39::{Language, Mnemonic};
use std::fmt;
use tracing::debug;

const MASTER_KEY: &[u8] = b"ed25519 seed";
const PURPOSE: u32 = 44;
const COIN_TYPE: u32 = 165;
const HARDENED: u32 = 0x8000_0000;

/// Mnemonic strengths accepted by [`generate_mnemonic`], in bits of entropy
pub const MNEMONIC_STRENGTHS: [usize; 5] = [128, 160, 192, 224, 256];

/// Derive the secret key at `index` from a 32-byte seed
pub fn deterministic_key(seed: &[u8; 32], index: u32) -> SecretKey {
    SecretKey::new(blake2b_256(&[seed, &index.to_be_bytes()]))
}

/// Derive the secret key at `index` from a mnemonic phrase.
///
/// The phrase is checked against the word list and checksum of `language`
/// before any derivation happens. `index` must be below 2^31.
pub fn mnemonic_key(
    words: &str,
    index: u32,
    passphrase: &str,
    language: Language,
) -> Result<SecretKey> {
    if index >= HARDENED {
        return Err(Error::domain(format!(
            "mnemonic account index {} must be below 2^31",
            index
        )));
    }

    let mnemonic = Mnemonic::parse_in(language, words)
        .map_err(|e| Error::checksum_mismatch(e.to_string()))?;
    let seed = mnemonic.to_seed(passphrase);

    let mut node = hmac_sha512(MASTER_KEY, &[&seed])?;
    for segment in [PURPOSE, COIN_TYPE, index] {
        let (key, chain_code) = node.split_at(32);
        let hardened = (segment | HARDENED).to_be_bytes();
        node = hmac_sha512(chain_code, &[&[0u8], key, &hardened])?;
    }

    let mut secret = [0u8; 32];
    secret.copy_from_slice(&node[..32]);
    debug!(index, "derived mnemonic key");
    Ok(SecretKey::new(secret))
}

/// Generate a fresh mnemonic phrase with `strength` bits of entropy
pub fn generate_mnemonic(strength: usize, language: Language) -> Result<String> {
    if !MNEMONIC_STRENGTHS.contains(&strength) {
        return Err(Error::mnemonic(format!(
            "strength must be one of {:?}, got {}",
            MNEMONIC_STRENGTHS, strength
        )));
    }

    let entropy: [u8; 32] = random_bytes();
    let mnemonic = Mnemonic::from_entropy_in(language, &entropy[..strength / 8])
        .map_err(|e| Error::mnemonic(e.to_string()))?;
    Ok(mnemonic.to_string())
}

/// Parse a word list language name such as `english` or `chinese-simplified`
pub fn parse_language(name: &str) -> Result<Language> {
    let language = match name.to_ascii_lowercase().replace('_', "-").as_str() {
        "english" | "en" => Language::English,
        "chinese-simplified" | "zh-hans" => Language::SimplifiedChinese,
        "chinese-traditional" | "zh-hant" => Language::TraditionalChinese,
        "czech" | "cs" => Language::Czech,
        "french" | "fr" => Language::French,
        "italian" | "it" => Language::Italian,
        "japanese" | "ja" => Language::Japanese,
        "korean" | "ko" => Language::Korean,
        "spanish" | "es" => Language::Spanish,
        other => return Err(Error::mnemonic(format!("unknown word list {:?}", other))),
    };
    Ok(language)
}

/// Key material for one account.
///
/// Built from exactly one of a secret key, a public key or an address; the
/// remaining parts are derived so they can never disagree. Pairs built
/// without a secret are watch-only.
#[derive(Clone)]
pub struct KeyPair {
    secret: Option<SecretKey>,
    public: PublicKey,
    address: String,
}

impl KeyPair {
    /// Full key pair from a secret key
    pub fn from_secret(secret: SecretKey, network: &Network) -> Self {
        let public = derive_public_key(&secret);
        let address = network.encode_address(&public);
        Self {
            secret: Some(secret),
            public,
            address,
        }
    }

    /// Watch-only pair from a public key
    pub fn from_public_key(public: PublicKey, network: &Network) -> Self {
        let address = network.encode_address(&public);
        Self {
            secret: None,
            public,
            address,
        }
    }

    /// Watch-only pair from an address
    pub fn from_address(address: &str, network: &Network) -> Result<Self> {
        let public = codec::decode(address, network.prefix())?;
        Ok(Self {
            secret: None,
            public,
            address: address.to_string(),
        })
    }

    /// Secret key, absent for watch-only pairs
    pub fn secret(&self) -> Option<&SecretKey> {
        self.secret.as_ref()
    }

    /// Secret key, or `MissingPrivateKey` naming `operation`
    pub fn require_secret(&self, operation: &str) -> Result<&SecretKey> {
        self.secret
            .as_ref()
            .ok_or_else(|| Error::missing_private_key(operation))
    }

    pub fn public_key(&self) -> &PublicKey {
        &self.public
    }

    pub fn address(&self) -> &str {
        &self.address
    }

    /// True when no secret key is held
    pub fn is_watch_only(&self) -> bool {
        self.secret.is_none()
    }
}

impl fmt::Debug for KeyPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeyPair")
            .field("address", &self.address)
            .field("watch_only", &self.is_watch_only())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    const WORDS: &str = "edge defense waste choose enrich upon flee junk siren film clown finish luggage leader kid quick brick print evidence swap drill paddle truly occur";

    #[test]
    fn test_deterministic_key_vector() {
        let key = deterministic_key(&[0u8; 32], 0);
        assert_eq!(
            key.to_hex(),
            "9f0e444c69f77a49bd0be89db92c38fe713e0963165cca12faf5712d7657120f"
        );
        assert_ne!(deterministic_key(&[0u8; 32], 1), key);
        // Full index range is valid
        let _ = deterministic_key(&[0u8; 32], u32::MAX);
    }

    #[test]
    fn test_mnemonic_key_vector() {
        let key = mnemonic_key(WORDS, 0, "some password", Language::English).unwrap();
        assert_eq!(
            key.to_hex(),
            "3be4fc2ef3f3b7374e6fc4fb6e7bb153f8a2998b3b3dab50853eabe128024143"
        );
    }

    #[test]
    fn test_mnemonic_key_depends_on_index_and_passphrase() {
        let base = mnemonic_key(WORDS, 0, "", Language::English).unwrap();
        assert_ne!(mnemonic_key(WORDS, 1, "", Language::English).unwrap(), base);
        assert_ne!(mnemonic_key(WORDS, 0, "x", Language::English).unwrap(), base);
    }

    #[test]
    fn test_mnemonic_checksum_rejected() {
        let valid = "abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon about";
        assert!(mnemonic_key(valid, 0, "", Language::English).is_ok());

        let bad_checksum = ["abandon"; 12].join(" ");
        assert_matches!(
            mnemonic_key(&bad_checksum, 0, "", Language::English),
            Err(Error::ChecksumMismatch { .. })
        );
        let short: Vec<&str> = WORDS.split_whitespace().take(23).collect();
        assert_matches!(
            mnemonic_key(&short.join(" "), 0, "", Language::English),
            Err(Error::ChecksumMismatch { .. })
        );
        assert_matches!(
            mnemonic_key(WORDS, 0, "", Language::French),
            Err(Error::ChecksumMismatch { .. })
        );
    }

    #[test]
    fn test_mnemonic_index_range() {
        assert_matches!(
            mnemonic_key(WORDS, HARDENED, "", Language::English),
            Err(Error::Domain { .. })
        );
        assert!(mnemonic_key(WORDS, HARDENED - 1, "", Language::English).is_ok());
    }

    #[test]
    fn test_generate_mnemonic() {
        for (strength, words) in [(128, 12), (160, 15), (192, 18), (224, 21), (256, 24)] {
            let phrase = generate_mnemonic(strength, Language::English).unwrap();
            assert_eq!(phrase.split_whitespace().count(), words);
            assert!(mnemonic_key(&phrase, 0, "", Language::English).is_ok());
        }
        assert_matches!(
            generate_mnemonic(100, Language::English),
            Err(Error::Mnemonic { .. })
        );
    }

    #[test]
    fn test_parse_language() {
        assert_eq!(parse_language("English").unwrap(), Language::English);
        assert_eq!(
            parse_language("chinese_simplified").unwrap(),
            Language::SimplifiedChinese
        );
        assert!(parse_language("klingon").is_err());
    }

    #[test]
    fn test_key_pair_constructors_agree() {
        let network = Network::nano();
        let full = KeyPair::from_secret(SecretKey::new([0u8; 32]), &network);
        assert_eq!(
            full.address(),
            "nano_18gmu6engqhgtjnppqam181o5nfhj4sdtgyhy36dan3jr9spt84rzwmktafc"
        );

        let by_key = KeyPair::from_public_key(*full.public_key(), &network);
        let by_address = KeyPair::from_address(full.address(), &network).unwrap();
        assert_eq!(by_key.address(), full.address());
        assert_eq!(by_address.public_key(), full.public_key());
        assert!(by_key.is_watch_only());
        assert!(!full.is_watch_only());

        assert_matches!(
            by_address.require_secret("sign"),
            Err(Error::MissingPrivateKey { .. })
        );
        assert!(!format!("{:?}", full).contains("SecretKey"));
    }

    #[test]
    fn test_key_pair_rejects_bad_address() {
        assert_matches!(
            KeyPair::from_address("nano_1", &Network::nano()),
            Err(Error::InvalidAddress { .. })
        );
    }
}
