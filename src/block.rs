//! State blocks
//!
//! A state block records one transition of an account: its full resulting
//! balance, representative and link, chained to the previous block by hash.
//! The digest covers only those five fields; signature and work are attached
//! afterwards.

use crate::crypto::{self, blake2b_256, random_bytes};
use crate::worker::SearchOutcome;
use crate::{
    BlockHash, Difficulty, Error, KeyPair, Link, Network, PublicKey, Result, Signature, Work,
    WorkEngine,
};
use serde::{Deserialize, Serialize};
use tokio_util::sync::CancellationToken;
use tracing::debug;

/// Wire name of the state block type
pub const BLOCK_TYPE: &str = "state";

/// Digest preamble: 32 bytes encoding block type 6
const PREAMBLE: [u8; 32] = {
    let mut preamble = [0u8; 32];
    preamble[31] = 6;
    preamble
};

/// One ledger transition
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StateBlock {
    account: PublicKey,
    representative: PublicKey,
    balance: u128,
    previous: BlockHash,
    link: Link,
    signature: Option<Signature>,
    work: Option<Work>,
}

/// Block as exchanged with nodes. Field order is part of the format.
///
/// Absent signature or work are carried as empty strings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WireBlock {
    #[serde(rename = "type")]
    pub block_type: String,
    pub account: String,
    pub previous: String,
    pub representative: String,
    pub balance: String,
    pub link: String,
    pub work: String,
    pub signature: String,
}

impl StateBlock {
    /// Unsigned block without work
    pub fn new(
        account: PublicKey,
        representative: PublicKey,
        balance: u128,
        previous: BlockHash,
        link: Link,
    ) -> Self {
        Self {
            account,
            representative,
            balance,
            previous,
            link,
            signature: None,
            work: None,
        }
    }

    pub fn account(&self) -> &PublicKey {
        &self.account
    }

    pub fn representative(&self) -> &PublicKey {
        &self.representative
    }

    /// Balance after this block, in raw units
    pub fn balance(&self) -> u128 {
        self.balance
    }

    pub fn previous(&self) -> &BlockHash {
        &self.previous
    }

    pub fn link(&self) -> &Link {
        &self.link
    }

    pub fn signature(&self) -> Option<&Signature> {
        self.signature.as_ref()
    }

    pub fn work(&self) -> Option<Work> {
        self.work
    }

    /// Hash that work for this block is computed against
    pub fn work_root(&self) -> &BlockHash {
        &self.previous
    }

    /// Block hash over type, account, previous, representative, balance and link
    pub fn digest(&self) -> BlockHash {
        BlockHash::new(blake2b_256(&[
            &PREAMBLE,
            self.account.as_bytes(),
            self.previous.as_bytes(),
            self.representative.as_bytes(),
            &self.balance.to_be_bytes(),
            self.link.as_bytes(),
        ]))
    }

    /// Sign with `keys`, which must hold the secret for this block's account
    pub fn sign(&mut self, keys: &KeyPair) -> Result<Signature> {
        let secret = keys.require_secret("signing a block")?;
        if keys.public_key() != &self.account {
            return Err(Error::crypto(format!(
                "key for {} cannot sign a block of account {}",
                keys.address(),
                self.account
            )));
        }

        let digest = self.digest();
        let signature = crypto::sign(secret, digest.as_bytes(), &random_bytes());
        self.signature = Some(signature);
        debug!(hash = %digest, "signed block");
        Ok(signature)
    }

    /// Attach a signature produced elsewhere
    pub fn set_signature(&mut self, signature: Signature) {
        self.signature = Some(signature);
    }

    /// True if a signature is attached and verifies against the account key
    pub fn verify_signature(&self) -> bool {
        self.signature.as_ref().is_some_and(|signature| {
            crypto::verify(signature, &self.account, self.digest().as_bytes())
        })
    }

    /// Search for work on the previous hash and attach it when found
    pub fn generate_work(
        &mut self,
        engine: &WorkEngine,
        difficulty: Difficulty,
        cancel: &CancellationToken,
    ) -> SearchOutcome {
        let outcome = engine.generate_blocking(&self.previous, difficulty, cancel);
        if let SearchOutcome::Found(work) = outcome {
            self.work = Some(work);
        }
        outcome
    }

    /// Attach a work value produced elsewhere
    pub fn set_work(&mut self, work: Work) {
        self.work = Some(work);
    }

    /// True if work is attached and meets `difficulty`
    pub fn validate_work(&self, difficulty: Difficulty) -> bool {
        self.work
            .is_some_and(|work| crate::work::validate(work, &self.previous, difficulty))
    }

    /// True once signature and work are both present and valid
    pub fn is_complete(&self, difficulty: Difficulty) -> bool {
        self.verify_signature() && self.validate_work(difficulty)
    }

    /// Wire representation with addresses for `network`
    pub fn to_wire(&self, network: &Network) -> WireBlock {
        WireBlock {
            block_type: BLOCK_TYPE.to_string(),
            account: network.encode_address(&self.account),
            previous: self.previous.to_hex(),
            representative: network.encode_address(&self.representative),
            balance: self.balance.to_string(),
            link: self.link.to_hex(),
            work: self.work.map(Work::to_hex).unwrap_or_default(),
            signature: self
                .signature
                .map(|signature| signature.to_hex())
                .unwrap_or_default(),
        }
    }

    /// Wire representation as a JSON string
    pub fn to_json(&self, network: &Network) -> Result<String> {
        Ok(serde_json::to_string(&self.to_wire(network))?)
    }

    /// Parse a wire block, decoding addresses against `network`
    pub fn from_wire(wire: &WireBlock, network: &Network) -> Result<Self> {
        if wire.block_type != BLOCK_TYPE {
            return Err(Error::invalid_state(format!(
                "unsupported block type {:?}",
                wire.block_type
            )));
        }

        let balance = wire.balance.parse::<u128>().map_err(|e| {
            Error::invalid_amount(format!("balance {:?}: {}", wire.balance, e))
        })?;

        let mut block = Self::new(
            network.decode_address(&wire.account)?,
            network.decode_address(&wire.representative)?,
            balance,
            BlockHash::from_hex(&wire.previous)?,
            Link::from_hex(&wire.link)?,
        );
        if !wire.work.is_empty() {
            block.work = Some(Work::from_hex(&wire.work)?);
        }
        if !wire.signature.is_empty() {
            block.signature = Some(Signature::from_hex(&wire.signature)?);
        }
        Ok(block)
    }

    /// Parse a wire block from JSON
    pub fn from_json(json: &str, network: &Network) -> Result<Self> {
        let wire: WireBlock = serde_json::from_str(json)?;
        Self::from_wire(&wire, network)
    }
}
