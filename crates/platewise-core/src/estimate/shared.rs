//! Lazily built estimator shared across concurrent requests.

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::OnceCell;

use crate::config::Config;
use crate::error::EstimateError;

use super::estimator::Estimator;

/// Something that can build an estimator, possibly slowly.
#[async_trait]
pub trait EstimatorFactory: Send + Sync {
    async fn build(&self) -> Result<Estimator, EstimateError>;
}

/// Builds HTTP-backed estimators from configuration.
pub struct ConfigFactory {
    config: Config,
}

impl ConfigFactory {
    pub fn new(config: Config) -> Self {
        Self { config }
    }
}

#[async_trait]
impl EstimatorFactory for ConfigFactory {
    async fn build(&self) -> Result<Estimator, EstimateError> {
        Estimator::load(&self.config).await
    }
}

/// An estimator constructed at most once per process.
///
/// Concurrent first callers wait on the same construction. A failed
/// construction leaves the cell empty so the next caller retries.
pub struct SharedEstimator {
    cell: OnceCell<Arc<Estimator>>,
    factory: Box<dyn EstimatorFactory>,
}

impl SharedEstimator {
    /// Shared estimator built from `config` on first use.
    pub fn new(config: Config) -> Self {
        Self::with_factory(ConfigFactory::new(config))
    }

    pub fn with_factory(factory: impl EstimatorFactory + 'static) -> Self {
        Self {
            cell: OnceCell::new(),
            factory: Box::new(factory),
        }
    }

    /// The estimator, building it first if needed.
    pub async fn get(&self) -> Result<Arc<Estimator>, EstimateError> {
        self.cell
            .get_or_try_init(|| async {
                tracing::info!("Loading vision models");
                let estimator = self.factory.build().await?;
                tracing::info!("Models ready: {:?}", estimator.model_ids());
                Ok(Arc::new(estimator))
            })
            .await
            .cloned()
    }

    /// The estimator if it has been built already.
    pub fn loaded(&self) -> Option<Arc<Estimator>> {
        self.cell.get().cloned()
    }

    pub fn is_loaded(&self) -> bool {
        self.cell.initialized()
    }
}
