use pallas::ledger::addresses::{Address, Network, StakePayload};
use pallas::ledger::primitives::conway::{
    Certificate as PallasCertificate, StakeCredential as PallasStakeCredential,
};
use serde::Deserialize;

use super::{Hash, PoolId};
use crate::error::DelegationError;

// Conway CDDL: "reward addresses: bits 7-5: 111; bit 4: credential is keyhash/scripthash; bits 3-0: network id"
const REWARD_ADDRESS_PREFIX: u8 = 0b1110_0000;
const REWARD_ADDRESS_CREDENTIAL_SCRIPT: u8 = 0b0001_0000;
const REWARD_ADDRESS_NETWORK_MASK: u8 = 0b0000_1111;

#[derive(PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Clone, Copy)]
pub enum StakeCredential {
    Key(Hash<28>),
    Script(Hash<28>),
}

impl StakeCredential {
    pub fn hash(&self) -> Hash<28> {
        match self {
            StakeCredential::Key(hash) | StakeCredential::Script(hash) => *hash,
        }
    }

    pub fn build_conway(&self) -> PallasStakeCredential {
        match self {
            StakeCredential::Key(hash) => PallasStakeCredential::AddrKeyhash(*hash),
            StakeCredential::Script(hash) => PallasStakeCredential::ScriptHash(*hash),
        }
    }
}

#[derive(PartialEq, Eq, Debug, Clone)]
pub enum Certificate {
    /// Registers the credential, locking the `key_deposit` implied by the protocol parameters.
    StakeRegistration { credential: StakeCredential },
    StakeDelegation {
        credential: StakeCredential,
        pool_id: PoolId,
    },
}

impl Certificate {
    pub fn credential(&self) -> StakeCredential {
        match self {
            Certificate::StakeRegistration { credential }
            | Certificate::StakeDelegation { credential, .. } => *credential,
        }
    }

    pub fn is_registration(&self) -> bool {
        matches!(self, Certificate::StakeRegistration { .. })
    }

    pub fn build_conway(&self) -> PallasCertificate {
        match self {
            Certificate::StakeRegistration { credential } => {
                PallasCertificate::StakeRegistration(credential.build_conway())
            }
            Certificate::StakeDelegation {
                credential,
                pool_id,
            } => PallasCertificate::StakeDelegation(credential.build_conway(), pool_id.hash()),
        }
    }
}

/// Delegation status of a reward account, as reported by the chain indexer.
#[derive(PartialEq, Eq, Debug, Clone, Default, Deserialize)]
pub struct DelegationState {
    #[serde(default)]
    pub active: bool,
    #[serde(default)]
    pub pool_id: Option<String>,
}

/// A reward (stake) address, as handed out by the wallet.
#[derive(PartialEq, Eq, Debug, Clone)]
pub struct RewardAccount {
    network: Network,
    credential: StakeCredential,
}

impl RewardAccount {
    pub fn new(network: Network, credential: StakeCredential) -> Self {
        Self {
            network,
            credential,
        }
    }

    pub fn network(&self) -> Network {
        self.network
    }

    pub fn credential(&self) -> StakeCredential {
        self.credential
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        let network_id = match self.network {
            Network::Testnet => 0,
            Network::Mainnet => 1,
            Network::Other(n) => n,
        };
        let mut header = REWARD_ADDRESS_PREFIX | (network_id & REWARD_ADDRESS_NETWORK_MASK);
        if let StakeCredential::Script(_) = self.credential {
            header |= REWARD_ADDRESS_CREDENTIAL_SCRIPT;
        }

        let mut bytes = Vec::with_capacity(1 + 28);
        bytes.push(header);
        bytes.extend_from_slice(self.credential.hash().as_ref());
        bytes
    }

    pub fn to_address(&self) -> Result<Address, DelegationError> {
        Address::from_bytes(&self.to_bytes())
            .map_err(|e| DelegationError::InvalidRewardAddress(e.to_string()))
    }

    /// The `stake1…` / `stake_test1…` form used to query account state.
    pub fn to_bech32(&self) -> Result<String, DelegationError> {
        self.to_address()?
            .to_bech32()
            .map_err(|e| DelegationError::InvalidRewardAddress(e.to_string()))
    }
}

impl TryFrom<&Address> for RewardAccount {
    type Error = DelegationError;

    fn try_from(address: &Address) -> Result<Self, Self::Error> {
        let Address::Stake(stake) = address else {
            return Err(DelegationError::InvalidRewardAddress(format!(
                "{} is not a stake address",
                address.to_hex()
            )));
        };

        let credential = match stake.payload() {
            StakePayload::Stake(hash) => StakeCredential::Key(*hash),
            StakePayload::Script(hash) => StakeCredential::Script(*hash),
        };

        Ok(Self::new(stake.network(), credential))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{dummy_address, dummy_reward_address};

    #[test]
    fn reward_account_round_trips_through_address() {
        let address = dummy_reward_address(9);
        let account = RewardAccount::try_from(&address).unwrap();

        assert_eq!(account.credential(), StakeCredential::Key(Hash::new([9u8; 28])));
        assert_eq!(account.network(), Network::Testnet);
        assert_eq!(account.to_address().unwrap(), address);
        assert!(account.to_bech32().unwrap().starts_with("stake_test1"));
    }

    #[test]
    fn script_credentials_set_the_header_bit() {
        let account = RewardAccount::new(
            Network::Mainnet,
            StakeCredential::Script(Hash::new([3u8; 28])),
        );
        let bytes = account.to_bytes();

        assert_eq!(bytes[0], 0b1111_0001);
        assert_eq!(bytes.len(), 29);
    }

    #[test]
    fn payment_addresses_are_not_reward_accounts() {
        assert!(matches!(
            RewardAccount::try_from(&dummy_address(1)),
            Err(DelegationError::InvalidRewardAddress(_))
        ));
    }
}
