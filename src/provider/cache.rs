use tokio::sync::RwLock;
use tracing::info;

use super::{PARAMETERS_PATH, RestSource};
use crate::error::DelegationError;
use crate::primitives::ProtocolParameters;

/// Latest protocol parameters, fetched on first use and kept until invalidated.
pub struct ProtocolParameterCache<S> {
    source: S,
    cached: RwLock<Option<ProtocolParameters>>,
}

impl<S: RestSource> ProtocolParameterCache<S> {
    pub fn new(source: S) -> Self {
        Self {
            source,
            cached: RwLock::new(None),
        }
    }

    pub async fn get(&self) -> Result<ProtocolParameters, DelegationError> {
        if let Some(params) = *self.cached.read().await {
            return Ok(params);
        }

        let mut cached = self.cached.write().await;
        // another caller may have filled the cache while we waited for the lock
        if let Some(params) = *cached {
            return Ok(params);
        }

        let payload = self
            .source
            .get_json(PARAMETERS_PATH)
            .await
            .map_err(|e| DelegationError::ParameterFetch(e.to_string()))?;
        let params: ProtocolParameters = serde_json::from_value(payload)
            .map_err(|e| DelegationError::ParameterFetch(format!("malformed payload: {e}")))?;

        info!(
            min_fee_a = params.min_fee_a,
            min_fee_b = params.min_fee_b,
            key_deposit = params.key_deposit,
            max_tx_size = params.max_tx_size,
            "fetched protocol parameters"
        );

        *cached = Some(params);
        Ok(params)
    }

    /// The cached parameters, without fetching.
    pub async fn peek(&self) -> Option<ProtocolParameters> {
        *self.cached.read().await
    }

    pub async fn invalidate(&self) {
        *self.cached.write().await = None;
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use serde_json::json;

    use super::*;
    use crate::test_utils::{MockSource, parameters_payload};

    #[tokio::test]
    async fn fetches_once_until_invalidated() {
        let source = MockSource::default().with_parameters(parameters_payload());
        let cache = ProtocolParameterCache::new(source.clone());

        assert_eq!(cache.peek().await, None);
        let first = cache.get().await.unwrap();
        let second = cache.get().await.unwrap();
        assert_eq!(first, second);
        assert_eq!(source.parameter_fetches(), 1);

        cache.invalidate().await;
        assert_eq!(cache.peek().await, None);
        cache.get().await.unwrap();
        assert_eq!(source.parameter_fetches(), 2);
    }

    #[tokio::test]
    async fn concurrent_first_calls_fetch_once() {
        let source = MockSource::default().with_parameters(parameters_payload());
        let cache = Arc::new(ProtocolParameterCache::new(source.clone()));

        let (a, b, c) = tokio::join!(cache.get(), cache.get(), cache.get());
        assert_eq!(a.unwrap(), b.unwrap());
        assert!(c.is_ok());
        assert_eq!(source.parameter_fetches(), 1);
    }

    #[tokio::test]
    async fn unreachable_source_is_a_parameter_fetch_error() {
        let cache = ProtocolParameterCache::new(MockSource::default());
        assert!(matches!(
            cache.get().await,
            Err(DelegationError::ParameterFetch(_))
        ));
        assert_eq!(cache.peek().await, None);
    }

    #[tokio::test]
    async fn malformed_payload_is_a_parameter_fetch_error() {
        let source = MockSource::default().with_parameters(json!({ "min_fee_a": "lots" }));
        let cache = ProtocolParameterCache::new(source);
        assert!(matches!(
            cache.get().await,
            Err(DelegationError::ParameterFetch(_))
        ));
    }
}
