use tracing::debug;

use crate::error::DelegationError;
use crate::primitives::{Address, MultiAsset, Output, ProtocolParameters, Value};

/// Bytes of a value's encoding outside its multi-asset map: the array header and the coin.
const VALUE_ENVELOPE_BYTES: u64 = 10;

/// Partitions change whose multi-asset does not fit a single output.
pub struct ChangeSplitter<'a> {
    address: &'a Address,
    params: &'a ProtocolParameters,
    max_multi_asset_bytes: usize,
}

impl<'a> ChangeSplitter<'a> {
    pub fn new(address: &'a Address, params: &'a ProtocolParameters) -> Self {
        Self {
            address,
            params,
            max_multi_asset_bytes: params.max_value_size.saturating_sub(VALUE_ENVELOPE_BYTES)
                as usize,
        }
    }

    pub fn max_multi_asset_bytes(mut self, max_multi_asset_bytes: usize) -> Self {
        self.max_multi_asset_bytes = max_multi_asset_bytes;
        self
    }

    /// Splits `change` into values whose multi-assets each fit the byte budget.
    ///
    /// Every value but the last carries the minimum coin for its own output, the last
    /// carries the remainder. The values sum exactly to `change`.
    pub fn split(&self, change: &Value) -> Result<Vec<Value>, DelegationError> {
        if change.multi_asset.encoded_size()? <= self.max_multi_asset_bytes {
            return Ok(vec![change.clone()]);
        }

        let buckets = self.pack(&change.multi_asset)?;
        debug!(buckets = buckets.len(), "splitting change");

        let mut remaining = change.coin;
        let mut values = Vec::with_capacity(buckets.len());
        let last = buckets.len() - 1;

        for (index, multi_asset) in buckets.into_iter().enumerate() {
            if index == last {
                let value = Value {
                    coin: remaining,
                    multi_asset,
                };
                let minimum = self.min_coin(&value)?;
                if remaining < minimum {
                    return Err(DelegationError::DustOutput {
                        change: remaining,
                        minimum,
                    });
                }
                values.push(value);
                break;
            }

            // sized with the full change coin, which never encodes shorter than the minimum
            let minimum = self.min_coin(&Value {
                coin: change.coin,
                multi_asset: multi_asset.clone(),
            })?;
            remaining = remaining
                .checked_sub(minimum)
                .ok_or(DelegationError::DustOutput {
                    change: remaining,
                    minimum,
                })?;
            values.push(Value {
                coin: minimum,
                multi_asset,
            });
        }

        Ok(values)
    }

    /// Lovelace the change must carry for `split` to succeed with its current assets.
    pub fn required_coin(&self, change: &Value) -> Result<u64, DelegationError> {
        if change.multi_asset.encoded_size()? <= self.max_multi_asset_bytes {
            return self.min_coin(change);
        }

        let mut required = 0u64;
        for multi_asset in self.pack(&change.multi_asset)? {
            required = required.saturating_add(self.min_coin(&Value {
                coin: change.coin,
                multi_asset,
            })?);
        }
        Ok(required)
    }

    /// Greedy packing in policy order, then asset-name order.
    fn pack(&self, assets: &MultiAsset) -> Result<Vec<MultiAsset>, DelegationError> {
        let mut buckets = vec![];
        let mut current = MultiAsset::new();

        for (policy, name, quantity) in assets.assets() {
            let mut candidate = current.clone();
            candidate.add_asset(*policy, name.clone(), quantity);
            if candidate.encoded_size()? <= self.max_multi_asset_bytes {
                current = candidate;
                continue;
            }

            let mut alone = MultiAsset::new();
            alone.add_asset(*policy, name.clone(), quantity);
            if alone.encoded_size()? > self.max_multi_asset_bytes {
                return Err(DelegationError::UnsplittableValue {
                    policy: *policy,
                    name: name.clone(),
                    budget: self.max_multi_asset_bytes,
                });
            }

            buckets.push(std::mem::replace(&mut current, alone));
        }

        if !current.is_empty() {
            buckets.push(current);
        }

        Ok(buckets)
    }

    fn min_coin(&self, value: &Value) -> Result<u64, DelegationError> {
        Ok(Output::new(self.address.clone(), value.clone()).min_coin(self.params)?)
    }
}
