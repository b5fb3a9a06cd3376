use crate::builder::tx::TxBuilderError;
use crate::primitives::{AssetName, PolicyId};

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum DelegationError {
    /// Protocol parameters could not be fetched or decoded
    #[error("Failed to fetch protocol parameters: {0}")]
    ParameterFetch(String),
    /// The available UTxOs cannot cover the requested outputs within the input limit
    #[error("Insufficient funds: {0}")]
    InsufficientFunds(String),
    /// Change would produce an output below its minimum coin
    #[error("Change of {change} lovelace is below the minimum of {minimum}")]
    DustOutput { change: u64, minimum: u64 },
    /// Target pool is not a bech32 `pool` identifier
    #[error("Invalid pool id {pool_id}: {reason}")]
    InvalidPoolId { pool_id: String, reason: String },
    /// Serialized transaction exceeds the protocol maximum
    #[error("Transaction of {size} bytes exceeds the maximum of {max} bytes")]
    TransactionTooLarge { size: usize, max: u64 },
    /// Wallet does not expose a capability the workflow depends on
    #[error("Wallet is missing capability: {0}")]
    MissingCapability(String),
    /// Wallet or network refused an operation
    #[error("Rejected by wallet or network: {0}")]
    ExternalRejection(String),
    /// A single asset does not fit an output on its own
    #[error("Asset {policy}.{name} alone exceeds the {budget} byte value budget")]
    UnsplittableValue {
        policy: PolicyId,
        name: AssetName,
        budget: usize,
    },
    /// The fee did not settle within the round limit
    #[error("Fee did not converge after {0} rounds")]
    FeeDidNotConverge(usize),
    /// Reward address could not be interpreted as a stake credential
    #[error("Invalid reward address: {0}")]
    InvalidRewardAddress(String),
    #[error(transparent)]
    Ledger(#[from] TxBuilderError),
}
