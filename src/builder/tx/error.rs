#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum TxBuilderError {
    /// Transaction bytes in built transaction object could not be decoded
    #[error("Corrupted transaction bytes in built transaction")]
    CorruptedTxBytes,
    /// Witness set returned by the signer could not be decoded
    #[error("Could not decode witness set bytes")]
    MalformedWitnessSet,
    /// Asset name is too long, it must be 32 bytes or less
    #[error("Asset name must be 32 bytes or less")]
    AssetNameTooLong,
    /// Transaction has no inputs
    #[error("Transaction has no inputs")]
    NoInputs,
    #[error("Failed to encode transaction: {0}")]
    Encoding(String),
}
