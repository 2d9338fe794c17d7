use std::io::ErrorKind;
use std::time::{Duration, Instant};

use serde::Serialize;
use tokio::net::TcpStream;
use tokio::task::JoinSet;

use crate::models::{CoreError, CoreErrorKind, CoreResult, PortMapping};

pub const DEFAULT_PROBE_HOST: &str = "127.0.0.1";
pub const DEFAULT_PROBE_TIMEOUT: Duration = Duration::from_millis(500);

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ProbeOptions {
    pub host: String,
    pub timeout: Duration,
}

impl Default for ProbeOptions {
    fn default() -> Self {
        Self {
            host: DEFAULT_PROBE_HOST.to_string(),
            timeout: DEFAULT_PROBE_TIMEOUT,
        }
    }
}

impl ProbeOptions {
    pub fn validate(&self) -> CoreResult<()> {
        if self.host.trim().is_empty() {
            return Err(CoreError::new(
                CoreErrorKind::InvalidInput,
                "probe host must not be empty",
            ));
        }
        if self.timeout.is_zero() {
            return Err(CoreError::new(
                CoreErrorKind::InvalidInput,
                "probe timeout must be greater than zero",
            ));
        }
        Ok(())
    }
}

#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "snake_case", tag = "status", content = "detail")]
pub enum ProbeStatus {
    Listening,
    Refused,
    TimedOut,
    Failed(String),
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct PortProbe {
    pub mapping: PortMapping,
    pub status: ProbeStatus,
    pub elapsed_ms: u64,
}

/// Attempts a TCP connection to every mapping's local port concurrently.
/// Results come back in the order of `mappings`.
pub async fn probe_ports(
    mappings: &[PortMapping],
    options: &ProbeOptions,
) -> CoreResult<Vec<PortProbe>> {
    options.validate()?;

    let mut tasks = JoinSet::new();
    for (index, mapping) in mappings.iter().cloned().enumerate() {
        let host = options.host.clone();
        let timeout = options.timeout;
        tasks.spawn(async move { (index, probe_one(host, mapping, timeout).await) });
    }

    let mut results: Vec<Option<PortProbe>> = vec![None; mappings.len()];
    while let Some(joined) = tasks.join_next().await {
        match joined {
            Ok((index, probe)) => results[index] = Some(probe),
            Err(error) => {
                return Err(CoreError::new(
                    CoreErrorKind::Internal,
                    format!("port probe task failed: {error}"),
                ));
            }
        }
    }

    Ok(results.into_iter().flatten().collect())
}

async fn probe_one(host: String, mapping: PortMapping, timeout: Duration) -> PortProbe {
    let started = Instant::now();
    let connect = TcpStream::connect((host.as_str(), mapping.local_port));

    let status = match tokio::time::timeout(timeout, connect).await {
        Ok(Ok(_stream)) => ProbeStatus::Listening,
        Ok(Err(error)) if error.kind() == ErrorKind::ConnectionRefused => ProbeStatus::Refused,
        Ok(Err(error)) => ProbeStatus::Failed(error.to_string()),
        Err(_) => ProbeStatus::TimedOut,
    };

    let elapsed_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);
    tracing::debug!(
        host = %host,
        local_port = mapping.local_port,
        status = ?status,
        elapsed_ms,
        "probed local port"
    );

    PortProbe {
        mapping,
        status,
        elapsed_ms,
    }
}
