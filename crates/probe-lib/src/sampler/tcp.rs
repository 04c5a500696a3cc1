//! TCP connect-time prober
//!
//! Measures transport handshake time only: no data is sent or received and
//! the stream is dropped as soon as the connection is established.

use super::{async_trait, Prober};
use crate::models::Target;
use std::io;
use std::time::Duration;
use thiserror::Error;
use tokio::net::TcpStream;
use tokio::time::Instant;

/// Reasons a connection attempt produced no latency
///
/// Samples collapse all of these into a single failed outcome; the kind is
/// only kept for diagnostics.
#[derive(Debug, Error)]
pub enum ConnectError {
    #[error("connection attempt timed out after {0:?}")]
    Timeout(Duration),

    #[error("failed to resolve {host}: {source}")]
    Resolve { host: String, source: io::Error },

    #[error("connection refused")]
    Refused,

    #[error("connection failed: {0}")]
    Io(#[source] io::Error),
}

impl ConnectError {
    /// Short label used in logs and metrics
    pub fn kind(&self) -> &'static str {
        match self {
            ConnectError::Timeout(_) => "timeout",
            ConnectError::Resolve { .. } => "resolve",
            ConnectError::Refused => "refused",
            ConnectError::Io(_) => "io",
        }
    }
}

/// An OS-level `TimedOut` stays an I/O error; `Timeout` is reserved for the
/// attempt deadline, which is the only timeout whose duration is known.
impl From<io::Error> for ConnectError {
    fn from(err: io::Error) -> Self {
        match err.kind() {
            io::ErrorKind::ConnectionRefused => ConnectError::Refused,
            _ => ConnectError::Io(err),
        }
    }
}

/// Prober that times a plain TCP handshake
#[derive(Debug, Clone, Default)]
pub struct TcpConnectProber;

impl TcpConnectProber {
    pub fn new() -> Self {
        Self
    }

    async fn connect(target: &Target) -> Result<TcpStream, ConnectError> {
        // Resolution happens inside the timed window, as a plain connect would
        let addrs: Vec<_> = tokio::net::lookup_host((target.host.as_str(), target.port))
            .await
            .map_err(|source| ConnectError::Resolve {
                host: target.host.clone(),
                source,
            })?
            .collect();

        let mut last_err = None;
        for addr in addrs {
            match TcpStream::connect(addr).await {
                Ok(stream) => return Ok(stream),
                Err(e) => last_err = Some(e),
            }
        }

        Err(match last_err {
            Some(e) => e.into(),
            None => ConnectError::Resolve {
                host: target.host.clone(),
                source: io::Error::new(io::ErrorKind::NotFound, "no addresses returned"),
            },
        })
    }
}

#[async_trait]
impl Prober for TcpConnectProber {
    async fn probe(&self, target: &Target, timeout: Duration) -> Result<Duration, ConnectError> {
        let start = Instant::now();

        let stream = tokio::time::timeout(timeout, Self::connect(target))
            .await
            .map_err(|_| ConnectError::Timeout(timeout))??;

        let elapsed = start.elapsed();
        drop(stream);

        Ok(elapsed)
    }
}
