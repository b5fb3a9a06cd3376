pub use pallas::crypto::hash::Hash;
pub use pallas::ledger::addresses::Address;

mod input;
mod output;
mod params;
mod pool;
mod stake;
mod value;

pub use input::*;
pub use output::*;
pub use params::*;
pub use pool::*;
pub use stake::*;
pub use value::*;

pub type TxHash = Hash<32>;
pub type PolicyId = Hash<28>;
pub type PubKeyHash = Hash<28>;
