//! Chain data sources: protocol parameters and account delegation state.

use tracing::warn;

use crate::error::DelegationError;
use crate::primitives::{DelegationState, RewardAccount};

mod blockfrost;
mod cache;

pub use blockfrost::{BlockfrostClient, BlockfrostNetwork};
pub use cache::ProtocolParameterCache;

pub const PARAMETERS_PATH: &str = "/epochs/latest/parameters";

#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    #[error(transparent)]
    Http(#[from] reqwest::Error),
    #[error("{path} not found")]
    NotFound { path: String },
    #[error("{path} responded with status {status}")]
    Status { path: String, status: u16 },
}

/// A JSON REST endpoint addressed by path.
pub trait RestSource {
    fn get_json(
        &self,
        path: &str,
    ) -> impl std::future::Future<Output = Result<serde_json::Value, SourceError>>;
}

/// Looks up the delegation state of `account`.
///
/// Lookup failures and unexpected payloads are treated as "not delegated": an account
/// that was never registered is unknown to the indexer.
pub async fn fetch_delegation_state<S: RestSource>(
    source: &S,
    account: &RewardAccount,
) -> Result<DelegationState, DelegationError> {
    let stake_address = account.to_bech32()?;
    let path = format!("/accounts/{stake_address}");

    let payload = match source.get_json(&path).await {
        Ok(payload) => payload,
        Err(e) => {
            warn!(%stake_address, error = %e, "account lookup failed, assuming not delegated");
            return Ok(DelegationState::default());
        }
    };

    match serde_json::from_value::<DelegationState>(payload) {
        Ok(state) => Ok(state),
        Err(e) => {
            warn!(%stake_address, error = %e, "unexpected account payload, assuming not delegated");
            Ok(DelegationState::default())
        }
    }
}
