use std::collections::HashSet;

use pallas::ledger::addresses::{Address, ShelleyPaymentPart};

use crate::primitives::{ProtocolParameters, StakeCredential, Utxo};

pub const MAX_FEE_ITERATIONS: usize = 20;

/// Linear fee for a transaction of `size` bytes: `min_fee_a * size + min_fee_b`.
pub fn linear_fee(params: &ProtocolParameters, size: usize) -> u64 {
    params
        .min_fee_a
        .saturating_mul(size as u64)
        .saturating_add(params.min_fee_b)
}

/// Number of vkey witnesses the wallet is expected to add when signing.
///
/// One per distinct payment key among the inputs, one for a key based stake credential
/// (certificates must be authorised by it). Byron inputs are signed with bootstrap
/// witnesses, which are larger, so each distinct Byron address counts twice.
pub fn estimate_witnesses(inputs: &[Utxo], credential: &StakeCredential) -> usize {
    let mut signers = HashSet::new();
    let mut bootstrap = HashSet::new();

    for input in inputs {
        match &input.address {
            Address::Shelley(shelley_addr) => {
                if let ShelleyPaymentPart::Key(hash) = shelley_addr.payment() {
                    signers.insert(*hash);
                }
            }
            Address::Byron(_) => {
                bootstrap.insert(input.address.to_vec());
            }
            Address::Stake(_) => {}
        }
    }

    if let StakeCredential::Key(hash) = credential {
        signers.insert(*hash);
    }

    (signers.len() + 2 * bootstrap.len()).max(1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::primitives::{Hash, Input, Value};
    use crate::test_utils::{dummy_address, test_params};

    fn utxo(seed: u8) -> Utxo {
        Utxo::new(
            Input::new(Hash::new([seed; 32]), 0),
            dummy_address(seed),
            Value::from_coin(1_000_000),
        )
    }

    #[test]
    fn linear_fee_uses_both_coefficients() {
        let params = test_params();
        assert_eq!(linear_fee(&params, 0), params.min_fee_b);
        assert_eq!(linear_fee(&params, 300), 44 * 300 + 155_381);
    }

    #[test]
    fn witnesses_count_distinct_keys() {
        let stake = StakeCredential::Key(Hash::new([9u8; 28]));
        let inputs = vec![utxo(1), utxo(1), utxo(2)];
        assert_eq!(estimate_witnesses(&inputs, &stake), 3);
    }

    #[test]
    fn script_stake_credentials_add_no_vkey() {
        let stake = StakeCredential::Script(Hash::new([9u8; 28]));
        assert_eq!(estimate_witnesses(&[utxo(1)], &stake), 1);
        assert_eq!(estimate_witnesses(&[], &stake), 1);
    }
}
