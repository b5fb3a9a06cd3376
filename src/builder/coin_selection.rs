//! Random-improve coin selection (CIP-2).
//!
//! Each requested output is first covered by random picks, then topped up towards
//! twice its coin so that the change left behind is of a useful size. When random picks
//! run into the input limit the whole selection is redone largest-first.

use std::cmp::Reverse;

use rand::Rng;
use rand::seq::SliceRandom;
use tracing::debug;

use crate::error::DelegationError;
use crate::primitives::{Output, Utxo, Value};

pub const DEFAULT_MAX_INPUTS: usize = 20;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selection {
    pub inputs: Vec<Utxo>,
    pub change: Value,
}

impl Selection {
    pub fn total_input(&self) -> Value {
        self.inputs.iter().map(|utxo| &utxo.value).sum()
    }
}

enum Shortfall {
    InputLimit,
    Exhausted,
}

struct Selector<'a> {
    available: Vec<&'a Utxo>,
    selected: Vec<&'a Utxo>,
    max_inputs: usize,
}

impl<'a> Selector<'a> {
    fn new(utxos: &'a [Utxo], max_inputs: usize) -> Self {
        Self {
            available: utxos.iter().collect(),
            selected: vec![],
            max_inputs,
        }
    }

    fn take(&mut self, index: usize) -> Result<&'a Utxo, Shortfall> {
        if self.selected.len() >= self.max_inputs {
            return Err(Shortfall::InputLimit);
        }
        let utxo = self.available.remove(index);
        self.selected.push(utxo);
        Ok(utxo)
    }

    /// Covers each output with random picks, returning the coin gathered per output.
    fn random_phase<R: Rng + ?Sized>(
        &mut self,
        outputs: &[&Output],
        margin: u64,
        rng: &mut R,
    ) -> Result<Vec<u64>, Shortfall> {
        let mut gathered = Vec::with_capacity(outputs.len());

        for output in outputs {
            let mut accumulated = Value::default();

            for (policy, name, quantity) in output.value.multi_asset.assets() {
                while accumulated.multi_asset.quantity(policy, name) < quantity {
                    let holders = self
                        .available
                        .iter()
                        .enumerate()
                        .filter(|(_, utxo)| utxo.value.multi_asset.quantity(policy, name) > 0)
                        .map(|(index, _)| index)
                        .collect::<Vec<_>>();
                    let Some(&index) = holders.choose(rng) else {
                        return Err(Shortfall::Exhausted);
                    };
                    accumulated += &self.take(index)?.value;
                }
            }

            let target = output.value.coin.saturating_add(margin);
            while accumulated.coin < target {
                if self.available.is_empty() {
                    if accumulated.coin >= output.value.coin {
                        break;
                    }
                    return Err(Shortfall::Exhausted);
                }
                let index = rng.gen_range(0..self.available.len());
                accumulated += &self.take(index)?.value;
            }

            gathered.push(accumulated.coin);
        }

        Ok(gathered)
    }

    fn improve_phase<R: Rng + ?Sized>(
        &mut self,
        outputs: &[&Output],
        gathered: &[u64],
        rng: &mut R,
    ) {
        self.available.shuffle(rng);

        for (output, &covered) in outputs.iter().zip(gathered) {
            let ideal = output.value.coin.saturating_mul(2);
            let maximum = output.value.coin.saturating_mul(3);
            let mut accumulated = covered;

            while self.selected.len() < self.max_inputs {
                let Some(candidate) = self.available.pop() else {
                    break;
                };
                let next = accumulated.saturating_add(candidate.value.coin);
                if next > maximum || ideal.abs_diff(next) >= ideal.abs_diff(accumulated) {
                    self.available.push(candidate);
                    break;
                }
                accumulated = next;
                self.selected.push(candidate);
            }
        }
    }

    fn largest_first(&mut self, required: &Value, margin: u64) -> Result<(), DelegationError> {
        let limit = |max_inputs: usize| {
            DelegationError::InsufficientFunds(format!(
                "requested value cannot be covered with at most {max_inputs} inputs"
            ))
        };
        let mut accumulated = Value::default();

        for (policy, name, quantity) in required.multi_asset.assets() {
            while accumulated.multi_asset.quantity(policy, name) < quantity {
                // Largest-first by asset amount
                self.available
                    .sort_by_key(|utxo| Reverse(utxo.value.multi_asset.quantity(policy, name)));
                if self
                    .available
                    .first()
                    .is_none_or(|utxo| utxo.value.multi_asset.quantity(policy, name) == 0)
                {
                    return Err(DelegationError::InsufficientFunds(format!(
                        "wallet holds too little of {policy}.{name}"
                    )));
                }
                accumulated += &self.take(0).map_err(|_| limit(self.max_inputs))?.value;
            }
        }

        self.available.sort_by_key(|utxo| Reverse(utxo.value.coin));
        let target = required.coin.saturating_add(margin);
        while accumulated.coin < target && !self.available.is_empty() {
            match self.take(0) {
                Ok(utxo) => accumulated += &utxo.value,
                Err(_) if accumulated.coin >= required.coin => break,
                Err(_) => return Err(limit(self.max_inputs)),
            }
        }

        if accumulated.coin < required.coin {
            return Err(DelegationError::InsufficientFunds(format!(
                "wallet doesn't contain enough lovelace (needs {} more)",
                required.coin - accumulated.coin
            )));
        }
        Ok(())
    }

    fn finish(
        mut self,
        required: &Value,
        min_utxo_value: u64,
    ) -> Result<Selection, DelegationError> {
        let total: Value = self.selected.iter().map(|utxo| &utxo.value).sum();
        let mut change = total.checked_sub(required).ok_or_else(|| {
            DelegationError::InsufficientFunds("selected inputs do not cover the outputs".into())
        })?;

        if !change.is_zero() && change.coin < min_utxo_value {
            // one more input to lift the change above the floor
            self.available.sort_by_key(|utxo| Reverse(utxo.value.coin));
            if !self.available.is_empty()
                && let Ok(utxo) = self.take(0)
            {
                change += &utxo.value;
            }
            if change.coin < min_utxo_value {
                return Err(DelegationError::DustOutput {
                    change: change.coin,
                    minimum: min_utxo_value,
                });
            }
        }

        Ok(Selection {
            inputs: self.selected.into_iter().cloned().collect(),
            change,
        })
    }
}

/// Selects inputs from `utxos` covering `outputs`.
///
/// Guarantees `sum(inputs) == sum(outputs) + change`, at most `max_inputs` inputs, and
/// change that is either empty or carries at least `min_utxo_value` lovelace.
pub fn select<R: Rng + ?Sized>(
    utxos: &[Utxo],
    outputs: &[Output],
    max_inputs: usize,
    min_utxo_value: u64,
    rng: &mut R,
) -> Result<Selection, DelegationError> {
    let required: Value = outputs.iter().map(|output| &output.value).sum();
    let available: Value = utxos.iter().map(|utxo| &utxo.value).sum();
    if !available.covers(&required) {
        return Err(DelegationError::InsufficientFunds(format!(
            "wallet holds {} lovelace, {} required",
            available.coin, required.coin
        )));
    }

    let mut ordered = outputs.iter().collect::<Vec<_>>();
    ordered.sort_by_key(|output| Reverse(output.value.coin));

    let mut selector = Selector::new(utxos, max_inputs);
    let selector = match selector.random_phase(&ordered, min_utxo_value, rng) {
        Ok(gathered) => {
            selector.improve_phase(&ordered, &gathered, rng);
            selector
        }
        Err(shortfall) => {
            debug!(
                input_limit = matches!(shortfall, Shortfall::InputLimit),
                "random selection fell short, retrying largest-first"
            );
            let mut fallback = Selector::new(utxos, max_inputs);
            fallback.largest_first(&required, min_utxo_value)?;
            fallback
        }
    };

    let selection = selector.finish(&required, min_utxo_value)?;
    debug!(
        inputs = selection.inputs.len(),
        change = selection.change.coin,
        "coin selection done"
    );
    Ok(selection)
}
