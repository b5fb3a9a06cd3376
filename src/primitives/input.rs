use std::fmt;

use super::*;

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Input {
    pub hash: TxHash,
    pub index: u64,
}

impl Input {
    pub fn new(hash: TxHash, index: u64) -> Self {
        Self { hash, index }
    }
}

impl fmt::Display for Input {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}#{}", self.hash, self.index)
    }
}

/// An unspent output as reported by the wallet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Utxo {
    pub input: Input,
    pub address: Address,
    pub value: Value,
}

impl Utxo {
    pub fn new(input: Input, address: Address, value: Value) -> Self {
        Self {
            input,
            address,
            value,
        }
    }
}
