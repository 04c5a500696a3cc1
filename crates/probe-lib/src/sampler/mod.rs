//! Timed connection sampling
//!
//! This module provides probers that time a single connection attempt and
//! the sampler that drives a bounded, strictly sequential series of attempts
//! against one target.

mod run;
mod tcp;

#[cfg(test)]
mod tests;

pub use run::{SampleRun, Sampler, SamplerConfig};
pub use tcp::{ConnectError, TcpConnectProber};

use crate::models::Target;
use std::time::Duration;

pub use async_trait::async_trait;

/// Trait for connection-timing implementations
#[async_trait]
pub trait Prober: Send + Sync {
    /// Attempt one connection to the target, bounded by `timeout`
    ///
    /// Returns the time from attempt start until the connection was
    /// established. The connection must be released before returning.
    async fn probe(&self, target: &Target, timeout: Duration) -> Result<Duration, ConnectError>;
}
