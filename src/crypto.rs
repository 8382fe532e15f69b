//! Cryptographic primitives
//!
//! Blake2b at the digest sizes the protocol uses, the Ed25519 variant that
//! hashes with Blake2b-512 instead of SHA-512, and HMAC-SHA512 for mnemonic
//! key derivation.

use crate::{Error, PublicKey, Result, SecretKey, Signature};
use blake2::digest::consts::{U32, U5, U8};
use blake2::{Blake2b, Blake2b512, Digest};
use ed25519_dalek::hazmat::{raw_sign, raw_verify, ExpandedSecretKey};
use ed25519_dalek::VerifyingKey;
use hmac::{Hmac, Mac};
use rand::RngCore;
use sha2::Sha512;

type Blake2b40 = Blake2b<U5>;
type Blake2b64 = Blake2b<U8>;
type Blake2b256 = Blake2b<U32>;
type HmacSha512 = Hmac<Sha512>;

/// Blake2b with a 32-byte digest over the concatenation of `parts`
pub fn blake2b_256(parts: &[&[u8]]) -> [u8; 32] {
    let mut hasher = Blake2b256::new();
    for part in parts {
        hasher.update(part);
    }
    let mut out = [0u8; 32];
    out.copy_from_slice(&hasher.finalize());
    out
}

/// Blake2b with an 8-byte digest over the concatenation of `parts`
pub fn blake2b_64(parts: &[&[u8]]) -> [u8; 8] {
    let mut hasher = Blake2b64::new();
    for part in parts {
        hasher.update(part);
    }
    let mut out = [0u8; 8];
    out.copy_from_slice(&hasher.finalize());
    out
}

/// Blake2b with a 5-byte digest, used for address checksums
pub fn blake2b_40(data: &[u8]) -> [u8; 5] {
    let mut out = [0u8; 5];
    out.copy_from_slice(&Blake2b40::digest(data));
    out
}

/// HMAC-SHA512 keyed by `key` over the concatenation of `parts`
pub fn hmac_sha512(key: &[u8], parts: &[&[u8]]) -> Result<[u8; 64]> {
    let mut mac = HmacSha512::new_from_slice(key)
        .map_err(|e| Error::crypto(format!("HMAC key rejected: {}", e)))?;
    for part in parts {
        mac.update(part);
    }
    let mut out = [0u8; 64];
    out.copy_from_slice(&mac.finalize().into_bytes());
    Ok(out)
}

/// Fill a fixed-size buffer from the thread-local CSPRNG
pub fn random_bytes<const N: usize>() -> [u8; N] {
    let mut out = [0u8; N];
    rand::rng().fill_bytes(&mut out);
    out
}

fn expand_secret(secret: &SecretKey) -> ExpandedSecretKey {
    let mut expanded = [0u8; 64];
    expanded.copy_from_slice(&Blake2b512::digest(secret.as_bytes()));
    ExpandedSecretKey::from_bytes(&expanded)
}

/// Derive the public key for a secret key
pub fn derive_public_key(secret: &SecretKey) -> PublicKey {
    let expanded = expand_secret(secret);
    PublicKey::new(VerifyingKey::from(&expanded).to_bytes())
}

/// Sign `message`, mixing `randomness` into the nonce prefix.
///
/// The signature verifies like any deterministic Ed25519-Blake2b signature;
/// only the per-signature nonce differs between calls.
pub fn sign(secret: &SecretKey, message: &[u8], randomness: &[u8; 32]) -> Signature {
    let mut expanded = expand_secret(secret);
    let verifying_key = VerifyingKey::from(&expanded);
    expanded.hash_prefix = blake2b_256(&[&expanded.hash_prefix, randomness]);
    let signature = raw_sign::<Blake2b512>(&expanded, message, &verifying_key);
    Signature::new(signature.to_bytes())
}

/// Verify an Ed25519-Blake2b signature
pub fn verify(signature: &Signature, public_key: &PublicKey, message: &[u8]) -> bool {
    let Ok(verifying_key) = VerifyingKey::from_bytes(public_key.as_bytes()) else {
        return false;
    };
    let signature = ed25519_dalek::Signature::from_bytes(signature.as_bytes());
    raw_verify::<Blake2b512>(&verifying_key, message, &signature).is_ok()
}
