use pallas::codec::minicbor;
use pallas::ledger::primitives::{Fragment, NonEmptySet, conway};

use super::TxBuilderError;
use crate::primitives::TxHash;

#[derive(PartialEq, Eq, Debug, Clone)]
pub struct BuiltTransaction {
    pub hash: TxHash,
    pub bytes: Vec<u8>,
}

impl BuiltTransaction {
    pub fn size(&self) -> usize {
        self.bytes.len()
    }

    /// Bytes of this transaction with `count` placeholder vkey witnesses, for size estimation.
    pub fn with_dummy_witnesses(&self, count: usize) -> Result<Vec<u8>, TxBuilderError> {
        let mut tx = self.decode()?;

        let mut vkey_witnesses = tx
            .transaction_witness_set
            .vkeywitness
            .as_ref()
            .map(|x| x.clone().to_vec())
            .unwrap_or_default();

        vkey_witnesses.extend((0..count).map(|i| {
            // distinct keys, a set would otherwise collapse them
            let mut vkey = [0u8; 32];
            vkey[..8].copy_from_slice(&(i as u64).to_be_bytes());
            conway::VKeyWitness {
                vkey: vkey.to_vec().into(),
                signature: [0u8; 64].to_vec().into(),
            }
        }));

        tx.transaction_witness_set.vkeywitness = NonEmptySet::from_vec(vkey_witnesses);

        tx.encode_fragment()
            .map_err(|e| TxBuilderError::Encoding(e.to_string()))
    }

    /// Merges the witnesses of a CBOR encoded witness set (as returned by a signer) into
    /// the transaction. The body, and therefore the hash, is left untouched.
    pub fn attach_witnesses(mut self, witness_set: &[u8]) -> Result<Self, TxBuilderError> {
        let witnesses: conway::WitnessSet = minicbor::decode(witness_set)
            .map_err(|_| TxBuilderError::MalformedWitnessSet)?;

        let mut tx = self.decode()?;

        let mut vkey_witnesses = tx
            .transaction_witness_set
            .vkeywitness
            .as_ref()
            .map(|x| x.clone().to_vec())
            .unwrap_or_default();
        for witness in witnesses.vkeywitness.map(|x| x.to_vec()).unwrap_or_default() {
            if !vkey_witnesses.iter().any(|x| x.vkey == witness.vkey) {
                vkey_witnesses.push(witness);
            }
        }

        let mut bootstrap_witnesses = tx
            .transaction_witness_set
            .bootstrap_witness
            .as_ref()
            .map(|x| x.clone().to_vec())
            .unwrap_or_default();
        bootstrap_witnesses.extend(
            witnesses
                .bootstrap_witness
                .map(|x| x.to_vec())
                .unwrap_or_default(),
        );

        tx.transaction_witness_set.vkeywitness = NonEmptySet::from_vec(vkey_witnesses);
        tx.transaction_witness_set.bootstrap_witness = NonEmptySet::from_vec(bootstrap_witnesses);

        self.bytes = tx
            .encode_fragment()
            .map_err(|e| TxBuilderError::Encoding(e.to_string()))?;

        Ok(self)
    }

    pub fn vkey_witness_count(&self) -> Result<usize, TxBuilderError> {
        Ok(self
            .decode()?
            .transaction_witness_set
            .vkeywitness
            .as_ref()
            .map(|x| x.len())
            .unwrap_or_default())
    }

    fn decode(&self) -> Result<conway::Tx<'_>, TxBuilderError> {
        conway::Tx::decode_fragment(&self.bytes).map_err(|_| TxBuilderError::CorruptedTxBytes)
    }
}
