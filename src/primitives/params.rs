use serde::{Deserialize, Deserializer};

/// The subset of protocol parameters needed to build a delegation transaction.
///
/// Deserialises from the `/epochs/latest/parameters` payload, where most amounts are
/// rendered as decimal strings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct ProtocolParameters {
    #[serde(deserialize_with = "numeric")]
    pub min_fee_a: u64,
    #[serde(deserialize_with = "numeric")]
    pub min_fee_b: u64,
    #[serde(rename = "min_utxo", deserialize_with = "numeric")]
    pub min_utxo_value: u64,
    #[serde(deserialize_with = "numeric")]
    pub pool_deposit: u64,
    #[serde(deserialize_with = "numeric")]
    pub key_deposit: u64,
    #[serde(rename = "max_val_size", deserialize_with = "numeric")]
    pub max_value_size: u64,
    #[serde(deserialize_with = "numeric")]
    pub max_tx_size: u64,
    #[serde(
        rename = "coins_per_utxo_size",
        default,
        deserialize_with = "optional_numeric"
    )]
    pub coins_per_utxo_byte: Option<u64>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum Numeric {
    Number(u64),
    Text(String),
}

impl Numeric {
    fn into_u64<E: serde::de::Error>(self) -> Result<u64, E> {
        match self {
            Numeric::Number(n) => Ok(n),
            Numeric::Text(s) => s.parse().map_err(E::custom),
        }
    }
}

fn numeric<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u64, D::Error> {
    Numeric::deserialize(deserializer)?.into_u64()
}

fn optional_numeric<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<u64>, D::Error> {
    Option::<Numeric>::deserialize(deserializer)?
        .map(Numeric::into_u64)
        .transpose()
}
