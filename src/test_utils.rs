use std::sync::{Arc, Mutex};

use pallas::codec::minicbor;
use pallas::ledger::addresses::{
    Network, ShelleyAddress, ShelleyDelegationPart, ShelleyPaymentPart,
};
use pallas::ledger::primitives::conway::{Tx, VKeyWitness, WitnessSet};
use pallas::ledger::primitives::{Fragment, NonEmptySet};
use pallas::ledger::traverse::ComputeHash;
use serde_json::json;

use crate::primitives::{
    Address, Hash, Input, ProtocolParameters, RewardAccount, StakeCredential, Utxo, Value,
};
use crate::provider::{PARAMETERS_PATH, RestSource, SourceError};
use crate::wallet::{RewardAddressGetter, WalletApi, WalletError};

pub(crate) const POOL_ID: &str = "pool1pu5jlj4q9w9jlxeu370a3c9myx47md5j5m2str0naunn2q3lkdy";
pub(crate) const POOL_HASH_HEX: &str = "0f292fcaa02b8b2f9b3c8f9fd8e0bb21abedb692a6d5058df3ef2735";

const STAKE_KEY: [u8; 28] = [9u8; 28];

pub(crate) fn dummy_address(seed: u8) -> Address {
    Address::Shelley(ShelleyAddress::new(
        Network::Testnet,
        ShelleyPaymentPart::Key(Hash::new([seed; 28])),
        ShelleyDelegationPart::Key(Hash::new(STAKE_KEY)),
    ))
}

pub(crate) fn dummy_reward_address(seed: u8) -> Address {
    RewardAccount::new(Network::Testnet, StakeCredential::Key(Hash::new([seed; 28])))
        .to_address()
        .unwrap()
}

pub(crate) fn stake_credential() -> StakeCredential {
    StakeCredential::Key(Hash::new(STAKE_KEY))
}

pub(crate) fn lovelace_utxo(seed: u8, coin: u64) -> Utxo {
    Utxo::new(
        Input::new(Hash::new([seed; 32]), seed as u64),
        dummy_address(seed),
        Value::from_coin(coin),
    )
}

pub(crate) fn parameters_payload() -> serde_json::Value {
    json!({
        "epoch": 500,
        "min_fee_a": 44,
        "min_fee_b": 155381,
        "min_utxo": "1000000",
        "pool_deposit": "500000000",
        "key_deposit": "2000000",
        "max_val_size": "5000",
        "max_tx_size": 16384,
        "coins_per_utxo_size": null
    })
}

pub(crate) fn test_params() -> ProtocolParameters {
    serde_json::from_value(parameters_payload()).unwrap()
}

/// Parameters as currently served for mainnet: a negligible flat floor and the
/// per-byte rate doing the real work.
pub(crate) fn mainnet_params() -> ProtocolParameters {
    let mut payload = parameters_payload();
    payload["min_utxo"] = json!("4310");
    payload["coins_per_utxo_size"] = json!("4310");
    serde_json::from_value(payload).unwrap()
}

pub(crate) fn signer_witness_set(key: u8) -> Vec<u8> {
    let witness_set = WitnessSet {
        vkeywitness: NonEmptySet::from_vec(vec![VKeyWitness {
            vkey: vec![key; 32].into(),
            signature: vec![key; 64].into(),
        }]),
        native_script: None,
        bootstrap_witness: None,
        plutus_v1_script: None,
        plutus_v2_script: None,
        plutus_v3_script: None,
        plutus_data: None,
        redeemer: None,
    };
    minicbor::to_vec(&witness_set).unwrap()
}

/// REST source answering the parameter and account paths from canned payloads.
#[derive(Clone, Default)]
pub(crate) struct MockSource {
    parameters: Option<serde_json::Value>,
    account: Option<serde_json::Value>,
    requests: Arc<Mutex<Vec<String>>>,
}

impl MockSource {
    pub(crate) fn with_parameters(mut self, payload: serde_json::Value) -> Self {
        self.parameters = Some(payload);
        self
    }

    pub(crate) fn with_account(mut self, payload: serde_json::Value) -> Self {
        self.account = Some(payload);
        self
    }

    pub(crate) fn requests(&self) -> Vec<String> {
        self.requests.lock().unwrap().clone()
    }

    pub(crate) fn parameter_fetches(&self) -> usize {
        self.requests()
            .iter()
            .filter(|path| *path == PARAMETERS_PATH)
            .count()
    }
}

impl RestSource for MockSource {
    async fn get_json(&self, path: &str) -> Result<serde_json::Value, SourceError> {
        self.requests.lock().unwrap().push(path.to_string());
        // let concurrent callers interleave
        tokio::task::yield_now().await;

        let payload = if path == PARAMETERS_PATH {
            self.parameters.clone()
        } else if path.starts_with("/accounts/") {
            self.account.clone()
        } else {
            None
        };
        payload.ok_or_else(|| SourceError::NotFound {
            path: path.to_string(),
        })
    }
}

/// Wallet with a fixed UTxO set that records what it was asked to sign and submit.
#[derive(Clone)]
pub(crate) struct MockWallet {
    pub getter: Option<RewardAddressGetter>,
    pub reward: Address,
    pub used: Vec<Address>,
    pub utxos: Vec<Utxo>,
    pub sign_response: Result<Vec<u8>, WalletError>,
    pub submit_response: Option<Result<String, WalletError>>,
    pub calls: Arc<Mutex<Vec<&'static str>>>,
    pub submitted: Arc<Mutex<Vec<Vec<u8>>>>,
}

impl MockWallet {
    pub(crate) fn new(utxos: Vec<Utxo>) -> Self {
        Self {
            getter: Some(RewardAddressGetter::Single),
            reward: RewardAccount::new(Network::Testnet, stake_credential())
                .to_address()
                .unwrap(),
            used: vec![dummy_address(1)],
            utxos,
            sign_response: Ok(signer_witness_set(1)),
            submit_response: None,
            calls: Default::default(),
            submitted: Default::default(),
        }
    }

    pub(crate) fn calls(&self) -> Vec<&'static str> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, call: &'static str) {
        self.calls.lock().unwrap().push(call);
    }
}

impl WalletApi for MockWallet {
    fn reward_address_getter(&self) -> Option<RewardAddressGetter> {
        self.getter
    }

    async fn used_addresses(&self) -> Result<Vec<Address>, WalletError> {
        self.record("used_addresses");
        Ok(self.used.clone())
    }

    async fn utxos(&self) -> Result<Vec<Utxo>, WalletError> {
        self.record("utxos");
        Ok(self.utxos.clone())
    }

    async fn reward_address(&self) -> Result<Address, WalletError> {
        self.record("reward_address");
        match self.getter {
            Some(RewardAddressGetter::Single) => Ok(self.reward.clone()),
            _ => Err(WalletError::Unsupported("getRewardAddress")),
        }
    }

    async fn reward_addresses(&self) -> Result<Vec<Address>, WalletError> {
        self.record("reward_addresses");
        match self.getter {
            Some(RewardAddressGetter::Multiple) => Ok(vec![self.reward.clone(), dummy_address(2)]),
            _ => Err(WalletError::Unsupported("getRewardAddresses")),
        }
    }

    async fn sign_tx(&self, _tx: &[u8]) -> Result<Vec<u8>, WalletError> {
        self.record("sign_tx");
        self.sign_response.clone()
    }

    async fn submit_tx(&self, tx: &[u8]) -> Result<String, WalletError> {
        self.record("submit_tx");
        self.submitted.lock().unwrap().push(tx.to_vec());
        match &self.submit_response {
            Some(response) => response.clone(),
            None => {
                let tx = Tx::decode_fragment(tx)
                    .map_err(|e| WalletError::Rejected(e.to_string()))?;
                Ok(tx.transaction_body.compute_hash().to_string())
            }
        }
    }
}
