//! # Identity Provider
//!
//! Single facade the rest of the node signs and verifies through. Delegates
//! to whichever strategy is active.

use std::sync::Arc;

use shared_types::{Address, PublicKeyBytes, SignatureBytes};
use tracing::info;

use super::errors::IdentityError;
use super::keypair::NetworkKeypairIdentity;
use crate::ports::outbound::Wallet;

/// The active signing strategy.
#[derive(Clone)]
pub enum IdentityStrategy {
    /// Delegate to an external wallet.
    Wallet(Arc<dyn Wallet>),
    /// Use raw key material held by the node.
    NetworkKeypair(Arc<NetworkKeypairIdentity>),
}

/// Discriminant of [`IdentityStrategy`], for logging and assertions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StrategyKind {
    Wallet,
    NetworkKeypair,
}

impl IdentityStrategy {
    pub fn kind(&self) -> StrategyKind {
        match self {
            Self::Wallet(_) => StrategyKind::Wallet,
            Self::NetworkKeypair(_) => StrategyKind::NetworkKeypair,
        }
    }
}

/// Signing identity of this node.
#[derive(Clone)]
pub struct IdentityProvider {
    strategy: IdentityStrategy,
}

impl IdentityProvider {
    pub fn new(strategy: IdentityStrategy) -> Self {
        info!("[tr-01] Identity strategy: {:?}", strategy.kind());
        Self { strategy }
    }

    /// Provider delegating to an external wallet.
    pub fn from_wallet(wallet: Arc<dyn Wallet>) -> Self {
        Self::new(IdentityStrategy::Wallet(wallet))
    }

    /// Provider over raw key material.
    ///
    /// # Errors
    /// Any [`IdentityError`] raised by [`NetworkKeypairIdentity::new`].
    pub fn from_network_keypair(
        public_key: &[u8],
        secret_key: &[u8],
    ) -> Result<Self, IdentityError> {
        let identity = NetworkKeypairIdentity::new(public_key, secret_key)?;
        Ok(Self::new(IdentityStrategy::NetworkKeypair(Arc::new(
            identity,
        ))))
    }

    /// Replace the active strategy.
    pub fn set_strategy(&mut self, strategy: IdentityStrategy) {
        info!(
            "[tr-01] Identity strategy changed: {:?} -> {:?}",
            self.strategy.kind(),
            strategy.kind()
        );
        self.strategy = strategy;
    }

    /// Builder form of [`set_strategy`](Self::set_strategy).
    pub fn with_strategy(mut self, strategy: IdentityStrategy) -> Self {
        self.set_strategy(strategy);
        self
    }

    pub fn strategy_kind(&self) -> StrategyKind {
        self.strategy.kind()
    }

    pub fn public_key(&self) -> PublicKeyBytes {
        match &self.strategy {
            IdentityStrategy::Wallet(wallet) => wallet.public_key(),
            IdentityStrategy::NetworkKeypair(identity) => identity.public_key(),
        }
    }

    pub fn address(&self) -> Address {
        match &self.strategy {
            IdentityStrategy::Wallet(wallet) => wallet.address(),
            IdentityStrategy::NetworkKeypair(identity) => identity.address().clone(),
        }
    }

    pub fn sign(&self, message: &[u8]) -> SignatureBytes {
        match &self.strategy {
            IdentityStrategy::Wallet(wallet) => wallet.sign(message),
            IdentityStrategy::NetworkKeypair(identity) => identity.sign(message),
        }
    }

    /// Verify `signature` over `message`.
    ///
    /// Without an explicit `public_key` the provider's own key is used.
    pub fn verify(
        &self,
        signature: &[u8],
        message: &[u8],
        public_key: Option<&PublicKeyBytes>,
    ) -> bool {
        match &self.strategy {
            IdentityStrategy::Wallet(wallet) => {
                let own;
                let key = match public_key {
                    Some(key) => key,
                    None => {
                        own = wallet.public_key();
                        &own
                    }
                };
                wallet.verify(signature, message, key)
            }
            IdentityStrategy::NetworkKeypair(identity) => {
                identity.verify(signature, message, public_key)
            }
        }
    }
}

impl std::fmt::Debug for IdentityProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IdentityProvider")
            .field("strategy", &self.strategy.kind())
            .field("address", &self.address())
            .finish()
    }
}
