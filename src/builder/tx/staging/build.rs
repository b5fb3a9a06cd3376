use pallas::codec::utils::Nullable;
use pallas::ledger::primitives::conway::{TransactionBody, TransactionInput, Tx, WitnessSet};
use pallas::ledger::primitives::{Fragment, NonEmptySet, Set};
use pallas::ledger::traverse::ComputeHash;

use crate::builder::tx::{BuiltTransaction, StagingTransaction, TxBuilderError};
use crate::primitives::{Certificate, Output};

impl StagingTransaction {
    pub fn build_conway(&self) -> Result<BuiltTransaction, TxBuilderError> {
        self.validate()?;

        let mut inputs = self
            .inputs
            .iter()
            .map(|x| TransactionInput {
                transaction_id: x.hash,
                index: x.index,
            })
            .collect::<Vec<_>>();

        inputs.sort_unstable_by_key(|x| (x.transaction_id, x.index));

        let outputs = self
            .outputs
            .iter()
            .map(Output::build_babbage)
            .collect::<Vec<_>>();

        let certificates = NonEmptySet::from_vec(
            self.certificates
                .iter()
                .map(Certificate::build_conway)
                .collect(),
        );

        let pallas_tx: Tx = Tx {
            transaction_body: TransactionBody {
                inputs: Set::from(inputs),
                outputs,
                ttl: None,
                validity_interval_start: None,
                fee: self.fee.unwrap_or_default(),
                certificates,
                withdrawals: None,
                auxiliary_data_hash: None,
                mint: None,
                script_data_hash: None,
                collateral: None,
                required_signers: None,
                network_id: None,
                collateral_return: None,
                reference_inputs: None,
                total_collateral: None,
                voting_procedures: None,
                proposal_procedures: None,
                treasury_value: None,
                donation: None,
            }
            .into(),
            transaction_witness_set: WitnessSet {
                vkeywitness: None,
                native_script: None,
                bootstrap_witness: None,
                plutus_v1_script: None,
                plutus_v2_script: None,
                plutus_v3_script: None,
                plutus_data: None,
                redeemer: None,
            }
            .into(),
            success: true,
            auxiliary_data: Nullable::Null,
        };

        Ok(BuiltTransaction {
            hash: pallas_tx.transaction_body.compute_hash(),
            bytes: pallas_tx
                .encode_fragment()
                .map_err(|e| TxBuilderError::Encoding(e.to_string()))?,
        })
    }
}
