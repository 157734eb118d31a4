//! Sensor provider boundary.
//!
//! A provider is an opaque handle to a hierarchical hardware tree: open it,
//! ask it to refresh and hand back the current tree, close it. The monitor
//! loop owns the handle exclusively; any implementation of the trait is
//! usable.

pub mod lhm;
pub mod local;

use async_trait::async_trait;
use thiserror::Error;

use crate::models::HardwareNode;

/// Failures at the provider boundary. Classification itself never fails;
/// these cover reachability and payload shape only.
#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("sensor endpoint unreachable: {0}")]
    Unreachable(String),
    #[error("malformed sensor payload: {0}")]
    Malformed(String),
    #[error("provider has not been opened")]
    NotOpen,
}

/// Capability interface over a platform sensor source.
#[async_trait]
pub trait SensorProvider: Send + 'static {
    /// Acquire whatever the provider needs to produce readings. Called once
    /// by the monitor loop on start; a failure here fails the start.
    async fn open(&mut self) -> Result<(), ProviderError>;

    /// Refresh every hardware node (recursively) and return the current
    /// tree. Called once per tick.
    async fn refresh(&mut self) -> Result<Vec<HardwareNode>, ProviderError>;

    /// Release provider resources. Must be safe to call when not open.
    fn close(&mut self);
}

#[async_trait]
impl SensorProvider for Box<dyn SensorProvider> {
    async fn open(&mut self) -> Result<(), ProviderError> {
        (**self).open().await
    }

    async fn refresh(&mut self) -> Result<Vec<HardwareNode>, ProviderError> {
        (**self).refresh().await
    }

    fn close(&mut self) {
        (**self).close();
    }
}
