//! Capabilities the delegation workflow needs from a browser-style (CIP-30) wallet.

use crate::error::DelegationError;
use crate::primitives::{Address, Utxo};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum WalletError {
    /// The wallet does not implement the requested call
    #[error("{0} is not supported by this wallet")]
    Unsupported(&'static str),
    /// The user or the wallet declined the request
    #[error("{0}")]
    Rejected(String),
}

impl From<WalletError> for DelegationError {
    fn from(e: WalletError) -> Self {
        match e {
            WalletError::Unsupported(call) => DelegationError::MissingCapability(call.to_string()),
            WalletError::Rejected(reason) => DelegationError::ExternalRejection(reason),
        }
    }
}

/// How a wallet hands out its reward address. Wallets differ: some return a single
/// address, others a list of which the first entry is used.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RewardAddressGetter {
    Single,
    Multiple,
}

pub trait WalletApi {
    /// Which reward address call the wallet supports, if any.
    fn reward_address_getter(&self) -> Option<RewardAddressGetter>;

    fn used_addresses(
        &self,
    ) -> impl std::future::Future<Output = Result<Vec<Address>, WalletError>>;

    fn utxos(&self) -> impl std::future::Future<Output = Result<Vec<Utxo>, WalletError>>;

    fn reward_address(&self) -> impl std::future::Future<Output = Result<Address, WalletError>> {
        async { Err(WalletError::Unsupported("getRewardAddress")) }
    }

    fn reward_addresses(
        &self,
    ) -> impl std::future::Future<Output = Result<Vec<Address>, WalletError>> {
        async { Err(WalletError::Unsupported("getRewardAddresses")) }
    }

    /// Signs a transaction, returning the CBOR encoded witness set.
    fn sign_tx(
        &self,
        tx: &[u8],
    ) -> impl std::future::Future<Output = Result<Vec<u8>, WalletError>>;

    /// Submits a signed transaction, returning its id as hex.
    fn submit_tx(
        &self,
        tx: &[u8],
    ) -> impl std::future::Future<Output = Result<String, WalletError>>;
}
