//! Delegation transaction builder

use rand::Rng;
use tracing::{debug, info};

use crate::error::DelegationError;
use crate::primitives::{
    Address, Certificate, DelegationState, Output, PoolId, ProtocolParameters, StakeCredential,
    TxHash, Utxo, Value,
};

mod change;
pub mod coin_selection;
pub mod fee;
pub mod tx;

pub use change::ChangeSplitter;
pub use coin_selection::{DEFAULT_MAX_INPUTS, Selection};
use fee::MAX_FEE_ITERATIONS;
use tx::{BuiltTransaction, StagingTransaction};

pub struct DelegationTxBuilder {
    change_address: Address,
    reward_credential: StakeCredential,
    max_inputs: usize,
}

enum Change {
    Outputs(Vec<Output>),
    /// Pure-coin change too small for an output of its own, paid to the fee instead.
    Burn(u64),
    /// Change carries assets but not the coin they need; the inputs must grow by this much.
    Shortfall(u64),
}

impl DelegationTxBuilder {
    pub fn new(change_address: Address, reward_credential: StakeCredential) -> Self {
        Self {
            change_address,
            reward_credential,
            max_inputs: DEFAULT_MAX_INPUTS,
        }
    }

    pub fn max_inputs(mut self, max_inputs: usize) -> Self {
        self.max_inputs = max_inputs;
        self
    }

    /// 1. Select inputs for a placeholder output carrying the key deposit
    /// 2. Build with the current fee and estimate the signed size
    /// 3. Recompute the fee from that size
    /// 4. Stop once the fee paid covers the recomputed fee, otherwise go back to step 2
    ///    (reselecting when the inputs no longer fund deposit, fee and change)
    pub fn build<R: Rng + ?Sized>(
        &self,
        params: &ProtocolParameters,
        utxos: &[Utxo],
        delegation: &DelegationState,
        target_pool_id: &str,
        rng: &mut R,
    ) -> Result<UnsignedTx, DelegationError> {
        let pool_id: PoolId = target_pool_id.parse()?;

        let certificates = self.certificates(delegation, pool_id);
        let deposit = if delegation.active {
            0
        } else {
            params.key_deposit
        };
        let splitter = ChangeSplitter::new(&self.change_address, params);

        let mut fee = params.min_fee_b;
        let mut target = params.key_deposit;
        let mut selection: Option<Selection> = None;

        for round in 1..=MAX_FEE_ITERATIONS {
            let selected = match selection.take() {
                Some(selected) => selected,
                None => self.select(params, utxos, target, rng)?,
            };

            let Some(change) = selected
                .total_input()
                .checked_sub(&Value::from_coin(deposit.saturating_add(fee)))
            else {
                target = deposit
                    .saturating_add(fee)
                    .saturating_add(params.min_utxo_value);
                debug!(round, target, "inputs no longer cover deposit and fee, reselecting");
                continue;
            };

            let (outputs, burned) = match self.change(&change, &splitter, params)? {
                Change::Outputs(outputs) => (outputs, 0),
                Change::Burn(coin) => (vec![], coin),
                Change::Shortfall(required) => {
                    target = deposit.saturating_add(fee).saturating_add(required);
                    debug!(round, target, "change cannot fund its own minimum, reselecting");
                    continue;
                }
            };

            let fee_paid = fee + burned;
            let body = certificates.iter().cloned().fold(
                StagingTransaction::new()
                    .inputs(selected.inputs.iter().map(|utxo| utxo.input.clone()))
                    .outputs(outputs)
                    .fee(fee_paid),
                StagingTransaction::add_certificate,
            );
            let built = body.build_conway()?;

            let witnesses = fee::estimate_witnesses(&selected.inputs, &self.reward_credential);
            let size = built.with_dummy_witnesses(witnesses)?.len();
            let next_fee = fee::linear_fee(params, size);
            debug!(round, fee = fee_paid, next_fee, size, witnesses, "fee round");

            if next_fee <= fee_paid {
                if size as u64 > params.max_tx_size {
                    return Err(DelegationError::TransactionTooLarge {
                        size,
                        max: params.max_tx_size,
                    });
                }

                info!(
                    hash = %built.hash,
                    fee = fee_paid,
                    size,
                    inputs = body.inputs.len(),
                    outputs = body.outputs.len(),
                    registration = !delegation.active,
                    pool = %pool_id,
                    "built delegation transaction"
                );

                return Ok(UnsignedTx {
                    body,
                    built,
                    spent: selected.inputs,
                    estimated_size: size,
                });
            }

            fee = next_fee;
            selection = Some(selected);
        }

        Err(DelegationError::FeeDidNotConverge(MAX_FEE_ITERATIONS))
    }

    /// Selects for a placeholder output of `target` lovelace. Change the selector considers
    /// dust is left to [`Self::change`], which burns it or asks for a larger target.
    fn select<R: Rng + ?Sized>(
        &self,
        params: &ProtocolParameters,
        utxos: &[Utxo],
        target: u64,
        rng: &mut R,
    ) -> Result<Selection, DelegationError> {
        let outputs = [Output::lovelace(self.change_address.clone(), target)];
        match coin_selection::select(utxos, &outputs, self.max_inputs, params.min_utxo_value, rng) {
            Err(DelegationError::DustOutput { change, .. }) => {
                debug!(change, "selected change below the output minimum");
                coin_selection::select(utxos, &outputs, self.max_inputs, 0, rng)
            }
            result => result,
        }
    }

    fn certificates(&self, delegation: &DelegationState, pool_id: PoolId) -> Vec<Certificate> {
        let credential = self.reward_credential;
        let mut certificates = Vec::with_capacity(2);
        if !delegation.active {
            certificates.push(Certificate::StakeRegistration { credential });
        }
        certificates.push(Certificate::StakeDelegation {
            credential,
            pool_id,
        });
        certificates
    }

    fn change(
        &self,
        change: &Value,
        splitter: &ChangeSplitter<'_>,
        params: &ProtocolParameters,
    ) -> Result<Change, DelegationError> {
        if change.is_zero() {
            return Ok(Change::Outputs(vec![]));
        }

        if change.encoded_size()? as u64 > params.max_value_size {
            return match splitter.split(change) {
                Ok(values) => Ok(Change::Outputs(
                    values
                        .into_iter()
                        .map(|value| Output::new(self.change_address.clone(), value))
                        .collect(),
                )),
                Err(DelegationError::DustOutput { .. }) => {
                    Ok(Change::Shortfall(splitter.required_coin(change)?))
                }
                Err(e) => Err(e),
            };
        }

        let output = Output::new(self.change_address.clone(), change.clone());
        let minimum = output.min_coin(params)?;
        if change.coin >= minimum {
            Ok(Change::Outputs(vec![output]))
        } else if change.multi_asset.is_empty() {
            Ok(Change::Burn(change.coin))
        } else {
            Ok(Change::Shortfall(minimum))
        }
    }
}

/// A fully balanced delegation transaction awaiting the wallet's witnesses.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnsignedTx {
    body: StagingTransaction,
    built: BuiltTransaction,
    spent: Vec<Utxo>,
    estimated_size: usize,
}

impl UnsignedTx {
    pub fn hash(&self) -> TxHash {
        self.built.hash
    }

    pub fn cbor(&self) -> &[u8] {
        &self.built.bytes
    }

    pub fn cbor_hex(&self) -> String {
        hex::encode(&self.built.bytes)
    }

    pub fn inputs(&self) -> &[Utxo] {
        &self.spent
    }

    /// Every output of a delegation transaction returns change to the wallet.
    pub fn change_outputs(&self) -> &[Output] {
        &self.body.outputs
    }

    pub fn certificates(&self) -> &[Certificate] {
        &self.body.certificates
    }

    pub fn fee(&self) -> u64 {
        self.body.fee.unwrap_or_default()
    }

    /// Size of the transaction once signed, as used for the fee.
    pub fn estimated_size(&self) -> usize {
        self.estimated_size
    }

    pub fn attach_witnesses(&self, witness_set: &[u8]) -> Result<SignedTx, DelegationError> {
        Ok(SignedTx {
            built: self.built.clone().attach_witnesses(witness_set)?,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedTx {
    built: BuiltTransaction,
}

impl SignedTx {
    pub fn hash(&self) -> TxHash {
        self.built.hash
    }

    pub fn cbor(&self) -> &[u8] {
        &self.built.bytes
    }

    pub fn cbor_hex(&self) -> String {
        hex::encode(&self.built.bytes)
    }
}
