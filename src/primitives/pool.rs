use std::fmt;
use std::str::FromStr;

use bech32::{Bech32, Hrp};

use super::Hash;
use crate::error::DelegationError;

const POOL_HRP: Hrp = Hrp::parse_unchecked("pool");

/// Stake pool identifier: the hash of the pool operator's cold key.
#[derive(PartialEq, Eq, PartialOrd, Ord, std::hash::Hash, Debug, Clone, Copy)]
pub struct PoolId(Hash<28>);

impl PoolId {
    pub fn new(hash: Hash<28>) -> Self {
        Self(hash)
    }

    pub fn hash(&self) -> Hash<28> {
        self.0
    }

    pub fn to_hex(&self) -> String {
        hex::encode(*self.0)
    }

    pub fn to_bech32(&self) -> String {
        // a 28 byte payload is always within bech32's length limit
        bech32::encode::<Bech32>(POOL_HRP, self.0.as_ref()).unwrap_or_default()
    }
}

impl FromStr for PoolId {
    type Err = DelegationError;

    /// Only the bech32 `pool1…` form is accepted.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = |reason: &str| DelegationError::InvalidPoolId {
            pool_id: s.to_string(),
            reason: reason.to_string(),
        };

        let (hrp, data) = bech32::decode(s).map_err(|e| invalid(&e.to_string()))?;
        if hrp != POOL_HRP {
            return Err(invalid(&format!("unexpected prefix {}", hrp.as_str())));
        }
        let bytes: [u8; 28] = data
            .try_into()
            .map_err(|data: Vec<u8>| invalid(&format!("expected 28 bytes, got {}", data.len())))?;

        Ok(Self(Hash::new(bytes)))
    }
}

impl fmt::Display for PoolId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_bech32())
    }
}
