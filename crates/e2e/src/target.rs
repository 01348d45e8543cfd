//! Target readiness - probing the web application under test
//!
//! The target application is an external collaborator; nothing here spawns
//! or manages it. The suite only refuses to schedule cases until the target
//! answers its health endpoint.

use std::time::Duration;

use tokio::time::sleep;
use tracing::{info, warn};

use crate::error::{HarnessError, HarnessResult};

/// Where the target lives and how long to wait for it.
#[derive(Debug, Clone)]
pub struct TargetConfig {
    /// Base URL of the target application.
    pub base_url: String,

    /// Path probed for readiness, relative to the base URL.
    pub health_path: String,

    /// Total time to wait before giving up.
    pub startup_timeout: Duration,
}

impl Default for TargetConfig {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:8080".to_string(),
            health_path: "/".to_string(),
            startup_timeout: Duration::from_secs(30),
        }
    }
}

/// Wait until the target answers with a success status, or fail with the
/// attempt count.
pub async fn wait_for_ready(config: &TargetConfig) -> HarnessResult<()> {
    let health_url = format!(
        "{}{}",
        config.base_url.trim_end_matches('/'),
        config.health_path
    );
    let client = reqwest::Client::builder()
        .timeout(Duration::from_secs(2))
        .build()?;

    let start = std::time::Instant::now();
    let mut attempts = 0;

    while start.elapsed() < config.startup_timeout {
        attempts += 1;

        match client.get(&health_url).send().await {
            Ok(resp) if resp.status().is_success() => {
                info!(url = %health_url, attempts, "target is ready");
                return Ok(());
            }
            Ok(resp) => {
                warn!("readiness probe returned {}", resp.status());
            }
            Err(e) => {
                if attempts == 1 {
                    info!("waiting for target at {health_url}...");
                }
                // Connection refused is expected while the target starts up.
                if !e.is_connect() {
                    warn!("readiness probe error: {e}");
                }
            }
        }

        sleep(Duration::from_millis(100)).await;
    }

    Err(HarnessError::TargetHealthCheck(attempts))
}
