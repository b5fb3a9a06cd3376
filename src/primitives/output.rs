use pallas::ledger::primitives::Fragment;
use pallas::ledger::primitives::conway::{PostAlonzoTransactionOutput, TransactionOutput};

use super::{Address, ProtocolParameters, Value};
use crate::builder::tx::TxBuilderError;

// the constant overhead of 160 bytes accounts for the transaction input and
// the entry in the UTxO map data structure (20 words * 8 bytes)
// https://cips.cardano.org/cip/CIP-55#the-new-minimum-lovelace-calculation
const UTXO_ENTRY_OVERHEAD: u64 = 160;

#[derive(PartialEq, Eq, Debug, Clone)]
pub struct Output {
    pub address: Address,
    pub value: Value,
}

impl Output {
    pub fn new(address: Address, value: Value) -> Self {
        Self { address, value }
    }

    pub fn lovelace(address: Address, coin: u64) -> Self {
        Self::new(address, Value::from_coin(coin))
    }

    pub fn size(&self) -> Result<usize, TxBuilderError> {
        self.build_babbage()
            .encode_fragment()
            .map(|bytes| bytes.len())
            .map_err(|e| TxBuilderError::Encoding(e.to_string()))
    }

    /// Minimum amount of lovelace required for the output to be accepted by the ledger.
    ///
    /// `min_utxo_value` is a flat floor; when the parameters carry a per-byte rate the
    /// size based minimum applies on top of it.
    pub fn min_coin(&self, params: &ProtocolParameters) -> Result<u64, TxBuilderError> {
        let Some(per_byte) = params.coins_per_utxo_byte else {
            return Ok(params.min_utxo_value);
        };
        let sized = per_byte.saturating_mul(self.size()? as u64 + UTXO_ENTRY_OVERHEAD);
        Ok(params.min_utxo_value.max(sized))
    }

    pub fn build_babbage(&self) -> TransactionOutput<'_> {
        TransactionOutput::PostAlonzo(
            PostAlonzoTransactionOutput {
                address: self.address.to_vec().into(),
                value: self.value.build_conway(),
                datum_option: None,
                script_ref: None,
            }
            .into(),
        )
    }
}
