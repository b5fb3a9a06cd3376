pub mod builder;
pub mod config;
pub mod error;
pub mod primitives;
pub mod provider;
pub mod session;
pub mod wallet;

#[cfg(test)]
pub(crate) mod test_utils;

pub use error::DelegationError;
pub use session::DelegationSession;
