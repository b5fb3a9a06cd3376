//! End-to-end delegation against a connected wallet.

use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::builder::{DEFAULT_MAX_INPUTS, DelegationTxBuilder, SignedTx, UnsignedTx};
use crate::config::Config;
use crate::error::DelegationError;
use crate::primitives::{DelegationState, PoolId, RewardAccount, TxHash};
use crate::provider::{
    BlockfrostClient, ProtocolParameterCache, RestSource, fetch_delegation_state,
};
use crate::wallet::{RewardAddressGetter, WalletApi};

pub struct DelegationSession<W, S> {
    wallet: W,
    reward_getter: RewardAddressGetter,
    source: S,
    parameters: Arc<ProtocolParameterCache<S>>,
    max_inputs: usize,
}

impl<W: WalletApi, S: RestSource + Clone> DelegationSession<W, S> {
    /// Fails with `MissingCapability` when the wallet cannot hand out a reward address.
    pub fn new(wallet: W, source: S) -> Result<Self, DelegationError> {
        let parameters = Arc::new(ProtocolParameterCache::new(source.clone()));
        Self::with_parameter_cache(wallet, source, parameters)
    }
}

impl<W: WalletApi> DelegationSession<W, BlockfrostClient> {
    pub fn from_config(wallet: W, config: &Config) -> Result<Self, DelegationError> {
        let session = Self::new(wallet, BlockfrostClient::from_config(config))?;
        Ok(session.max_inputs(config.max_inputs))
    }
}

impl<W: WalletApi, S: RestSource> DelegationSession<W, S> {
    /// Like [`DelegationSession::new`], sharing an existing parameter cache.
    pub fn with_parameter_cache(
        wallet: W,
        source: S,
        parameters: Arc<ProtocolParameterCache<S>>,
    ) -> Result<Self, DelegationError> {
        let reward_getter = wallet.reward_address_getter().ok_or_else(|| {
            DelegationError::MissingCapability("getRewardAddress or getRewardAddresses".into())
        })?;
        debug!(?reward_getter, "resolved reward address capability");

        Ok(Self {
            wallet,
            reward_getter,
            source,
            parameters,
            max_inputs: DEFAULT_MAX_INPUTS,
        })
    }

    pub fn max_inputs(mut self, max_inputs: usize) -> Self {
        self.max_inputs = max_inputs;
        self
    }

    pub fn parameters(&self) -> &Arc<ProtocolParameterCache<S>> {
        &self.parameters
    }

    pub async fn reward_account(&self) -> Result<RewardAccount, DelegationError> {
        let address = match self.reward_getter {
            RewardAddressGetter::Single => self.wallet.reward_address().await?,
            RewardAddressGetter::Multiple => self
                .wallet
                .reward_addresses()
                .await?
                .into_iter()
                .next()
                .ok_or_else(|| {
                    DelegationError::ExternalRejection("wallet returned no reward address".into())
                })?,
        };
        RewardAccount::try_from(&address)
    }

    pub async fn current_delegation(&self) -> Result<DelegationState, DelegationError> {
        let account = self.reward_account().await?;
        fetch_delegation_state(&self.source, &account).await
    }

    pub async fn create_delegation_transaction(
        &self,
        target_pool_id: &str,
    ) -> Result<UnsignedTx, DelegationError> {
        let pool_id: PoolId = target_pool_id.parse()?;

        let account = self.reward_account().await?;
        let delegation = fetch_delegation_state(&self.source, &account).await?;
        let current = delegation.pool_id.as_deref();
        if delegation.active && current == Some(pool_id.to_bech32().as_str()) {
            info!(pool = %pool_id, "already delegated to this pool, delegating again");
        }

        let params = self.parameters.get().await?;

        let change_address = self
            .wallet
            .used_addresses()
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| {
                DelegationError::ExternalRejection("wallet returned no used address".into())
            })?;
        let utxos = self.wallet.utxos().await?;
        debug!(utxos = utxos.len(), "fetched wallet utxos");

        DelegationTxBuilder::new(change_address, account.credential())
            .max_inputs(self.max_inputs)
            .build(
                &params,
                &utxos,
                &delegation,
                target_pool_id,
                &mut rand::thread_rng(),
            )
    }

    pub async fn sign_transaction(&self, tx: &UnsignedTx) -> Result<SignedTx, DelegationError> {
        let witness_set = self.wallet.sign_tx(tx.cbor()).await?;
        tx.attach_witnesses(&witness_set)
    }

    pub async fn submit_transaction(&self, tx: &SignedTx) -> Result<TxHash, DelegationError> {
        let id = self.wallet.submit_tx(tx.cbor()).await?;
        let hash: TxHash = id.trim().parse().map_err(|_| {
            DelegationError::ExternalRejection(format!("wallet returned malformed tx id {id}"))
        })?;

        if hash != tx.hash() {
            warn!(submitted = %hash, built = %tx.hash(), "wallet reported a different tx id");
        }
        info!(%hash, "submitted delegation transaction");

        Ok(hash)
    }

    /// Delegates the wallet's stake to `target_pool_id`, registering the stake key first
    /// when needed. Returns the submitted transaction's id.
    pub async fn delegate(&self, target_pool_id: &str) -> Result<TxHash, DelegationError> {
        let tx = self.create_delegation_transaction(target_pool_id).await?;
        let signed = self.sign_transaction(&tx).await?;
        self.submit_transaction(&signed).await
    }
}
