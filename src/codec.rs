//! Account address codec
//!
//! An address is the network prefix followed by 60 symbols of a custom
//! base-32 alphabet: 52 carry the public key and 8 carry a reversed 5-byte
//! Blake2b checksum.

use crate::crypto::blake2b_40;
use crate::{Error, PublicKey, Result};
use data_encoding::{Encoding, Specification};
use once_cell::sync::Lazy;

/// Base-32 alphabet used by account addresses
pub const ALPHABET: &str = "13456789abcdefghijkmnopqrstuwxyz";

/// Number of symbols following the prefix
pub const ENCODED_LEN: usize = 60;

// 3 zero bytes + key + checksum = 40 bytes = 64 symbols, the first 4 of which
// only ever encode padding.
const PADDED_LEN: usize = 40;
const PADDING_BYTES: usize = 3;
const PADDING_SYMBOLS: &str = "1111";

static NANO_BASE32: Lazy<Encoding> = Lazy::new(|| {
    let mut spec = Specification::new();
    spec.symbols.push_str(ALPHABET);
    spec.encoding()
        .expect("address alphabet has 32 distinct ASCII symbols")
});

fn checksum(key: &PublicKey) -> [u8; 5] {
    let mut sum = blake2b_40(key.as_bytes());
    sum.reverse();
    sum
}

/// Encode a public key as an address with the given prefix
pub fn encode(key: &PublicKey, prefix: &str) -> String {
    let mut padded = [0u8; PADDED_LEN];
    padded[PADDING_BYTES..PADDING_BYTES + PublicKey::LEN].copy_from_slice(key.as_bytes());
    padded[PADDING_BYTES + PublicKey::LEN..].copy_from_slice(&checksum(key));

    let symbols = NANO_BASE32.encode(&padded);
    let mut address = String::with_capacity(prefix.len() + ENCODED_LEN);
    address.push_str(prefix);
    address.push_str(&symbols[PADDING_SYMBOLS.len()..]);
    address
}

/// Decode an address back to its public key, verifying prefix, length and checksum
pub fn decode(address: &str, prefix: &str) -> Result<PublicKey> {
    let body = address
        .strip_prefix(prefix)
        .ok_or_else(|| Error::invalid_address(address, format!("expected prefix {:?}", prefix)))?;

    if body.len() != ENCODED_LEN {
        return Err(Error::invalid_address(
            address,
            format!("expected {} symbols after prefix, got {}", ENCODED_LEN, body.len()),
        ));
    }

    let mut symbols = String::with_capacity(PADDING_SYMBOLS.len() + ENCODED_LEN);
    symbols.push_str(PADDING_SYMBOLS);
    symbols.push_str(body);

    let padded = NANO_BASE32
        .decode(symbols.as_bytes())
        .map_err(|e| Error::invalid_address(address, format!("bad symbol: {}", e)))?;

    if padded.len() != PADDED_LEN || padded[..PADDING_BYTES].iter().any(|b| *b != 0) {
        return Err(Error::invalid_address(address, "public key out of range"));
    }

    let mut key_bytes = [0u8; PublicKey::LEN];
    key_bytes.copy_from_slice(&padded[PADDING_BYTES..PADDING_BYTES + PublicKey::LEN]);
    let key = PublicKey::new(key_bytes);

    if padded[PADDING_BYTES + PublicKey::LEN..] != checksum(&key) {
        return Err(Error::invalid_address(address, "checksum mismatch"));
    }

    Ok(key)
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use proptest::prelude::*;

    const ZERO_ADDRESS: &str = "nano_1111111111111111111111111111111111111111111111111111hifc8npp";

    #[test]
    fn test_encode_zero_key() {
        assert_eq!(encode(&PublicKey::ZERO, "nano_"), ZERO_ADDRESS);
        assert_eq!(decode(ZERO_ADDRESS, "nano_").unwrap(), PublicKey::ZERO);
    }

    #[test]
    fn test_known_address() {
        let key =
            PublicKey::from_hex("19d3d919475deed4696b5d13018151d1af88b2bd3bcff048b45031c1f36d1858")
                .unwrap();
        let address = "nano_18gmu6engqhgtjnppqam181o5nfhj4sdtgyhy36dan3jr9spt84rzwmktafc";
        assert_eq!(encode(&key, "nano_"), address);
        assert_eq!(decode(address, "nano_").unwrap(), key);
    }

    #[test]
    fn test_prefix_is_a_parameter() {
        let address = encode(&PublicKey::ZERO, "xrb_");
        assert!(address.starts_with("xrb_"));
        assert_eq!(address.len(), 4 + ENCODED_LEN);
        assert_eq!(decode(&address, "xrb_").unwrap(), PublicKey::ZERO);
        assert_matches!(decode(&address, "nano_"), Err(Error::InvalidAddress { .. }));
    }

    #[test]
    fn test_wrong_length_rejected() {
        assert_matches!(
            decode(&ZERO_ADDRESS[..ZERO_ADDRESS.len() - 1], "nano_"),
            Err(Error::InvalidAddress { .. })
        );
        let long = format!("{}1", ZERO_ADDRESS);
        assert_matches!(decode(&long, "nano_"), Err(Error::InvalidAddress { .. }));
    }

    #[test]
    fn test_symbols_outside_alphabet_rejected() {
        // '0', '2', 'l' and 'v' are excluded from the alphabet, as is uppercase
        for bad in ['0', '2', 'l', 'v', 'A'] {
            let mut address = ZERO_ADDRESS.to_string();
            address.replace_range(10..11, &bad.to_string());
            assert_matches!(decode(&address, "nano_"), Err(Error::InvalidAddress { .. }));
        }
    }

    #[test]
    fn test_any_single_symbol_change_rejected() {
        let address = encode(&PublicKey::new([0x5a; 32]), "nano_");
        for position in 5..address.len() {
            let original = address.as_bytes()[position] as char;
            let replacement = ALPHABET.chars().find(|c| *c != original).unwrap();
            let mut corrupted = address.clone();
            corrupted.replace_range(position..position + 1, &replacement.to_string());
            assert_matches!(
                decode(&corrupted, "nano_"),
                Err(Error::InvalidAddress { .. }),
                "corruption at {} accepted",
                position
            );
        }
    }

    #[test]
    fn test_key_out_of_range_rejected() {
        // The first symbol carries four padding bits plus the key's top bit
        let mut address = ZERO_ADDRESS.to_string();
        address.replace_range(5..6, "z");
        let err = decode(&address, "nano_").unwrap_err();
        assert!(err.to_string().contains("out of range"));
    }

    proptest! {
        #[test]
        fn test_address_round_trip(bytes in prop::array::uniform32(any::<u8>())) {
            let key = PublicKey::new(bytes);
            let address = encode(&key, "nano_");
            prop_assert_eq!(address.len(), 5 + ENCODED_LEN);
            prop_assert_eq!(decode(&address, "nano_").unwrap(), key);
        }
    }
}
