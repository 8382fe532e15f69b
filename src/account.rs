//! Accounts
//!
//! An [`Account`] binds key material to the state of its chain: balance,
//! frontier and representative. That state changes only through
//! [`send`](Account::send), [`receive`](Account::receive) and
//! [`change_representative`](Account::change_representative), each of which
//! returns a signed block and either fully applies or leaves the account as
//! it was. None of them compute work.

use crate::{
    BlockHash, Error, KeyPair, Link, Network, PublicKey, Result, SecretKey, Signature, StateBlock,
};
use std::fmt;
use std::sync::Arc;
use tracing::debug;

/// An account on one network
#[derive(Debug, Clone)]
pub struct Account {
    network: Arc<Network>,
    keys: KeyPair,
    raw_balance: u128,
    frontier: BlockHash,
    representative: PublicKey,
}

impl Account {
    /// New account with no blocks, representing itself
    pub fn new(network: Arc<Network>, keys: KeyPair) -> Self {
        let representative = *keys.public_key();
        Self {
            network,
            keys,
            raw_balance: 0,
            frontier: BlockHash::ZERO,
            representative,
        }
    }

    /// Account able to sign, from its secret key
    pub fn from_secret(network: Arc<Network>, secret: SecretKey) -> Self {
        let keys = KeyPair::from_secret(secret, &network);
        Self::new(network, keys)
    }

    /// Watch-only account from a public key
    pub fn from_public_key(network: Arc<Network>, key: PublicKey) -> Self {
        let keys = KeyPair::from_public_key(key, &network);
        Self::new(network, keys)
    }

    /// Watch-only account from an address
    pub fn from_address(network: Arc<Network>, address: &str) -> Result<Self> {
        let keys = KeyPair::from_address(address, &network)?;
        Ok(Self::new(network, keys))
    }

    /// Restore a known balance in raw units
    pub fn with_raw_balance(mut self, raw_balance: u128) -> Self {
        self.raw_balance = raw_balance;
        self
    }

    /// Restore a known balance given in the display unit
    pub fn with_balance(mut self, balance: &str) -> Result<Self> {
        self.raw_balance = self.network.to_raw(balance)?;
        Ok(self)
    }

    /// Restore the hash of the latest block
    pub fn with_frontier(mut self, frontier: BlockHash) -> Self {
        self.frontier = frontier;
        self
    }

    /// Restore the current representative
    pub fn with_representative(mut self, representative: PublicKey) -> Self {
        self.representative = representative;
        self
    }

    pub fn network(&self) -> &Network {
        &self.network
    }

    pub fn keys(&self) -> &KeyPair {
        &self.keys
    }

    pub fn address(&self) -> &str {
        self.keys.address()
    }

    pub fn public_key(&self) -> &PublicKey {
        self.keys.public_key()
    }

    pub fn raw_balance(&self) -> u128 {
        self.raw_balance
    }

    /// Balance in the display unit
    pub fn balance(&self) -> String {
        self.network.from_raw(self.raw_balance)
    }

    /// Hash of the latest block, zero before the first one
    pub fn frontier(&self) -> &BlockHash {
        &self.frontier
    }

    pub fn representative(&self) -> &PublicKey {
        &self.representative
    }

    pub fn representative_address(&self) -> String {
        self.network.encode_address(&self.representative)
    }

    /// Send `amount` raw to `destination`, optionally changing representative
    pub fn send(
        &mut self,
        destination: &PublicKey,
        amount: u128,
        representative: Option<PublicKey>,
    ) -> Result<StateBlock> {
        self.keys.require_secret("send")?;
        check_amount(amount)?;
        let balance = self
            .raw_balance
            .checked_sub(amount)
            .ok_or(Error::InsufficientBalance {
                balance: self.raw_balance,
                amount,
            })?;

        let block = self.commit(balance, Link::from(*destination), representative)?;
        debug!(
            account = %self.address(),
            amount,
            destination = %self.network.encode_address(destination),
            "built send block"
        );
        Ok(block)
    }

    /// Receive `amount` raw from the send block `source`, optionally changing representative
    pub fn receive(
        &mut self,
        source: &BlockHash,
        amount: u128,
        representative: Option<PublicKey>,
    ) -> Result<StateBlock> {
        self.keys.require_secret("receive")?;
        check_amount(amount)?;
        let balance = self
            .raw_balance
            .checked_add(amount)
            .ok_or(Error::BalanceOverflow {
                balance: self.raw_balance,
                amount,
            })?;

        let block = self.commit(balance, Link::from(*source), representative)?;
        debug!(account = %self.address(), amount, source = %source, "built receive block");
        Ok(block)
    }

    /// Delegate voting weight to `representative`
    pub fn change_representative(&mut self, representative: PublicKey) -> Result<StateBlock> {
        self.keys.require_secret("change representative")?;
        let block = self.commit(self.raw_balance, Link::ZERO, Some(representative))?;
        debug!(
            account = %self.address(),
            representative = %self.representative_address(),
            "built change block"
        );
        Ok(block)
    }

    /// Sign a block with this account's key
    pub fn sign(&self, block: &mut StateBlock) -> Result<Signature> {
        block.sign(&self.keys)
    }

    /// Build and sign the next block, then advance balance, representative
    /// and frontier. Nothing changes if signing fails.
    fn commit(
        &mut self,
        balance: u128,
        link: Link,
        representative: Option<PublicKey>,
    ) -> Result<StateBlock> {
        let representative = representative.unwrap_or(self.representative);
        let mut block = StateBlock::new(
            *self.keys.public_key(),
            representative,
            balance,
            self.frontier,
            link,
        );
        block.sign(&self.keys)?;

        self.raw_balance = balance;
        self.representative = representative;
        self.frontier = block.digest();
        Ok(block)
    }
}

impl fmt::Display for Account {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.address())
    }
}

fn check_amount(amount: u128) -> Result<()> {
    if amount == 0 {
        return Err(Error::invalid_amount("amount must be a positive number of raw"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::deterministic_key;
    use assert_matches::assert_matches;

    fn network() -> Arc<Network> {
        Arc::new(Network::nano())
    }

    fn account(index: u32) -> Account {
        Account::from_secret(network(), deterministic_key(&[0u8; 32], index))
    }

    #[test]
    fn test_new_account_state() {
        let account = account(0);
        assert_eq!(account.raw_balance(), 0);
        assert_eq!(account.balance(), "0.000000000000000000000000000000");
        assert!(account.frontier().is_zero());
        assert_eq!(account.representative(), account.public_key());
        assert_eq!(account.to_string(), account.address());
        assert_eq!(account.representative_address(), account.address());
    }

    #[test]
    fn test_constructors_agree() {
        let full = Account::from_secret(network(), SecretKey::new([0u8; 32]));
        assert_eq!(
            full.address(),
            "nano_18gmu6engqhgtjnppqam181o5nfhj4sdtgyhy36dan3jr9spt84rzwmktafc"
        );
        let by_key = Account::from_public_key(network(), *full.public_key());
        let by_address = Account::from_address(network(), full.address()).unwrap();
        assert_eq!(by_key.address(), full.address());
        assert_eq!(by_address.public_key(), full.public_key());
        assert_matches!(
            Account::from_address(network(), "nano_111"),
            Err(Error::InvalidAddress { .. })
        );
    }

    #[test]
    fn test_receive_then_send() {
        let mut alice = account(0);
        let bob = account(1);
        let source = BlockHash::new([9u8; 32]);

        let open = alice.receive(&source, 1000, None).unwrap();
        assert_eq!(open.balance(), 1000);
        assert_eq!(open.link().as_bytes(), source.as_bytes());
        assert!(open.previous().is_zero());
        assert!(open.verify_signature());
        assert!(open.work().is_none());
        assert_eq!(alice.frontier(), &open.digest());

        let send = alice.send(bob.public_key(), 400, None).unwrap();
        assert_eq!(send.balance(), 600);
        assert_eq!(send.previous(), &open.digest());
        assert_eq!(send.link().as_bytes(), bob.public_key().as_bytes());
        assert!(send.verify_signature());
        assert_eq!(alice.raw_balance(), 600);
        assert_eq!(alice.frontier(), &send.digest());
    }

    #[test]
    fn test_round_trip_returns_to_balance_but_advances_frontier() {
        let mut alice = account(0).with_raw_balance(500);
        let representative = *alice.representative();
        let bob = account(1);

        let first = alice.receive(&BlockHash::new([1u8; 32]), 250, None).unwrap();
        let second = alice.send(bob.public_key(), 250, None).unwrap();

        assert_eq!(alice.raw_balance(), 500);
        assert_eq!(alice.representative(), &representative);
        assert_ne!(first.digest(), second.digest());
        assert_eq!(alice.frontier(), &second.digest());
    }

    #[test]
    fn test_change_representative() {
        let mut alice = account(0).with_raw_balance(77);
        let rep = *account(2).public_key();

        let block = alice.change_representative(rep).unwrap();
        assert_eq!(block.representative(), &rep);
        assert!(block.link().is_zero());
        assert_eq!(block.balance(), 77);
        assert_eq!(alice.representative(), &rep);
        assert_eq!(alice.raw_balance(), 77);
    }

    #[test]
    fn test_send_with_new_representative() {
        let mut alice = account(0).with_raw_balance(10);
        let rep = *account(3).public_key();
        let block = alice.send(account(1).public_key(), 1, Some(rep)).unwrap();
        assert_eq!(block.representative(), &rep);
        assert_eq!(alice.representative(), &rep);
    }

    #[test]
    fn test_insufficient_balance_leaves_state() {
        let mut alice = account(0).with_raw_balance(5);
        let frontier = *alice.frontier();
        assert_matches!(
            alice.send(account(1).public_key(), 6, None),
            Err(Error::InsufficientBalance { balance: 5, amount: 6 })
        );
        assert_eq!(alice.raw_balance(), 5);
        assert_eq!(alice.frontier(), &frontier);
    }

    #[test]
    fn test_balance_overflow_leaves_state() {
        let mut alice = account(0).with_raw_balance(u128::MAX - 10);
        assert_matches!(
            alice.receive(&BlockHash::ZERO, 11, None),
            Err(Error::BalanceOverflow { .. })
        );
        assert_eq!(alice.raw_balance(), u128::MAX - 10);
        assert!(alice.frontier().is_zero());

        // 2^128 - 1 is still representable
        alice.receive(&BlockHash::ZERO, 10, None).unwrap();
        assert_eq!(alice.raw_balance(), u128::MAX);
        assert_matches!(
            alice.receive(&BlockHash::ZERO, 1, None),
            Err(Error::BalanceOverflow { .. })
        );
    }

    #[test]
    fn test_zero_amount_rejected() {
        let mut alice = account(0).with_raw_balance(5);
        assert_matches!(
            alice.send(account(1).public_key(), 0, None),
            Err(Error::InvalidAmount { .. })
        );
        assert_matches!(
            alice.receive(&BlockHash::ZERO, 0, None),
            Err(Error::InvalidAmount { .. })
        );
    }

    #[test]
    fn test_watch_only_cannot_transact() {
        let mut watcher = Account::from_public_key(network(), *account(0).public_key())
            .with_raw_balance(100);
        assert_matches!(
            watcher.send(&PublicKey::ZERO, 1, None),
            Err(Error::MissingPrivateKey { .. })
        );
        assert_matches!(
            watcher.receive(&BlockHash::ZERO, 1, None),
            Err(Error::MissingPrivateKey { .. })
        );
        assert_matches!(
            watcher.change_representative(PublicKey::ZERO),
            Err(Error::MissingPrivateKey { .. })
        );
        assert_eq!(watcher.raw_balance(), 100);
        assert!(watcher.frontier().is_zero());
    }

    #[test]
    fn test_with_balance() {
        let alice = account(0).with_balance("1.5").unwrap();
        assert_eq!(alice.raw_balance(), 15 * 10u128.pow(29));
        assert_eq!(alice.balance(), "1.500000000000000000000000000000");
        assert_matches!(account(0).with_balance("-1"), Err(Error::InvalidAmount { .. }));
    }

    #[test]
    fn test_sign_external_block() {
        let alice = account(0);
        let mut block = StateBlock::new(
            *alice.public_key(),
            *alice.public_key(),
            1,
            BlockHash::ZERO,
            Link::ZERO,
        );
        alice.sign(&mut block).unwrap();
        assert!(block.verify_signature());
    }
}
