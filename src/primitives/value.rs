use std::collections::BTreeMap;
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign, Deref};

use pallas::codec::minicbor;
use pallas::codec::utils::Bytes;
use pallas::crypto::hash::Hash as PallasHash;
use pallas::ledger::primitives::PositiveCoin;
use pallas::ledger::primitives::conway::{self, Multiasset};

use super::PolicyId;
use crate::builder::tx::TxBuilderError;

/// Name of a native asset under its minting policy.
#[derive(PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Clone)]
pub struct AssetName(Vec<u8>);

impl AssetName {
    pub const MAX_LENGTH: usize = 32;

    pub fn new(bytes: impl Into<Vec<u8>>) -> Result<Self, TxBuilderError> {
        let bytes = bytes.into();
        if bytes.len() > Self::MAX_LENGTH {
            return Err(TxBuilderError::AssetNameTooLong);
        }
        Ok(Self(bytes))
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

impl fmt::Display for AssetName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&hex::encode(&self.0))
    }
}

/// Native assets grouped by policy. Entries with a zero quantity are never stored.
#[derive(PartialEq, Eq, Debug, Clone, Default)]
pub struct MultiAsset(BTreeMap<PolicyId, BTreeMap<AssetName, u64>>);

impl Deref for MultiAsset {
    type Target = BTreeMap<PolicyId, BTreeMap<AssetName, u64>>;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl MultiAsset {
    pub fn new() -> Self {
        Default::default()
    }

    pub fn quantity(&self, policy: &PolicyId, name: &AssetName) -> u64 {
        self.0
            .get(policy)
            .and_then(|assets| assets.get(name))
            .copied()
            .unwrap_or_default()
    }

    /// Quantities saturate at `u64::MAX`.
    pub fn add_asset(&mut self, policy: PolicyId, name: AssetName, quantity: u64) {
        if quantity == 0 {
            return;
        }
        let held = self.0.entry(policy).or_default().entry(name).or_default();
        *held = held.saturating_add(quantity);
    }

    /// Iterates `(policy, name, quantity)` in policy order, then asset-name order.
    pub fn assets(&self) -> impl Iterator<Item = (&PolicyId, &AssetName, u64)> + '_ {
        self.0.iter().flat_map(|(policy, assets)| {
            assets.iter().map(move |(name, quantity)| (policy, name, *quantity))
        })
    }

    pub fn asset_count(&self) -> usize {
        self.0.values().map(BTreeMap::len).sum()
    }

    /// Whether every asset of `other` is held here in at least the same quantity.
    pub fn contains(&self, other: &MultiAsset) -> bool {
        other
            .assets()
            .all(|(policy, name, quantity)| self.quantity(policy, name) >= quantity)
    }

    pub fn checked_sub(&self, other: &MultiAsset) -> Option<MultiAsset> {
        if !self.contains(other) {
            return None;
        }
        let mut result = MultiAsset::new();
        for (policy, name, quantity) in self.assets() {
            result.add_asset(*policy, name.clone(), quantity - other.quantity(policy, name));
        }
        Some(result)
    }

    pub fn build_conway(&self) -> Option<Multiasset<PositiveCoin>> {
        let mut assets: BTreeMap<PallasHash<28>, BTreeMap<Bytes, PositiveCoin>> = BTreeMap::new();

        for (policy, name, quantity) in self.assets() {
            let Ok(quantity) = PositiveCoin::try_from(quantity) else {
                continue;
            };
            assets
                .entry(*policy)
                .or_default()
                .insert(name.as_bytes().to_vec().into(), quantity);
        }

        (!assets.is_empty()).then(|| assets.into_iter().collect())
    }

    /// Size of the CBOR map this multi-asset encodes to, zero when empty.
    pub fn encoded_size(&self) -> Result<usize, TxBuilderError> {
        match self.build_conway() {
            Some(assets) => encoded_len(&assets),
            None => Ok(0),
        }
    }
}

impl AddAssign<&MultiAsset> for MultiAsset {
    fn add_assign(&mut self, rhs: &MultiAsset) {
        for (policy, name, quantity) in rhs.assets() {
            self.add_asset(*policy, name.clone(), quantity);
        }
    }
}

/// An amount of lovelace together with native assets.
#[derive(PartialEq, Eq, Debug, Clone, Default)]
pub struct Value {
    pub coin: u64,
    pub multi_asset: MultiAsset,
}

impl Value {
    pub fn from_coin(coin: u64) -> Self {
        Self {
            coin,
            multi_asset: MultiAsset::new(),
        }
    }

    pub fn with_asset(mut self, policy: PolicyId, name: AssetName, quantity: u64) -> Self {
        self.multi_asset.add_asset(policy, name, quantity);
        self
    }

    pub fn is_zero(&self) -> bool {
        self.coin == 0 && self.multi_asset.is_empty()
    }

    pub fn covers(&self, other: &Value) -> bool {
        self.coin >= other.coin && self.multi_asset.contains(&other.multi_asset)
    }

    pub fn checked_sub(&self, other: &Value) -> Option<Value> {
        Some(Value {
            coin: self.coin.checked_sub(other.coin)?,
            multi_asset: self.multi_asset.checked_sub(&other.multi_asset)?,
        })
    }

    pub fn build_conway(&self) -> conway::Value {
        match self.multi_asset.build_conway() {
            Some(assets) => conway::Value::Multiasset(self.coin, assets),
            None => conway::Value::Coin(self.coin),
        }
    }

    pub fn encoded_size(&self) -> Result<usize, TxBuilderError> {
        encoded_len(&self.build_conway())
    }
}

impl AddAssign<&Value> for Value {
    fn add_assign(&mut self, rhs: &Value) {
        self.coin = self.coin.saturating_add(rhs.coin);
        self.multi_asset += &rhs.multi_asset;
    }
}

impl Add<&Value> for Value {
    type Output = Value;

    fn add(mut self, rhs: &Value) -> Value {
        self += rhs;
        self
    }
}

impl<'a> Sum<&'a Value> for Value {
    fn sum<I: Iterator<Item = &'a Value>>(iter: I) -> Self {
        iter.fold(Value::default(), |acc, value| acc + value)
    }
}

pub(crate) fn encoded_len<T: minicbor::Encode<()>>(value: &T) -> Result<usize, TxBuilderError> {
    minicbor::to_vec(value)
        .map(|bytes| bytes.len())
        .map_err(|e| TxBuilderError::Encoding(e.to_string()))
}
