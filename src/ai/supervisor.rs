//! Lifecycle management for the llama-server subprocess.
//!
//! The gateway launches llama-server alongside itself and polls its health
//! endpoint until ready. The handle is owned by the process entry point;
//! `kill_on_drop` covers abnormal exits and [`LlamaServer::stop`] handles the
//! orderly path.

use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;

use tokio::process::{Child, Command};
use tracing::{info, warn};

use crate::config::Config;

use super::LlamaClient;

const HEALTH_POLL_INTERVAL: Duration = Duration::from_secs(2);
const HEALTH_POLL_ATTEMPTS: u32 = 60;

/// Running llama-server child process.
pub struct LlamaServer {
    child: Child,
}

impl LlamaServer {
    /// Spawn llama-server and wait for it to become healthy.
    ///
    /// Returns `None` when the executable cannot be found, the spawn fails,
    /// or the health endpoint never answers within the poll budget. The
    /// caller is expected to keep serving in degraded mode in that case.
    pub async fn start(config: &Config, client: &LlamaClient) -> Option<LlamaServer> {
        let Some(binary) = resolve_binary(config) else {
            warn!("llama-server executable not found");
            return None;
        };

        // llama-server resolves the model relative to its own cwd, so hand
        // it an absolute path.
        let model = std::fs::canonicalize(&config.llama_model_path)
            .unwrap_or_else(|_| PathBuf::from(&config.llama_model_path));

        info!(
            binary = %binary.display(),
            model = %model.display(),
            port = config.llama_port,
            "starting llama-server"
        );

        let spawned = Command::new(&binary)
            .arg("-m")
            .arg(&model)
            .arg("--host")
            .arg("127.0.0.1")
            .arg("--port")
            .arg(config.llama_port.to_string())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .kill_on_drop(true)
            .spawn();

        let child = match spawned {
            Ok(child) => child,
            Err(e) => {
                warn!(error = %e, "failed to spawn llama-server");
                return None;
            }
        };

        let mut server = LlamaServer { child };

        for attempt in 0..HEALTH_POLL_ATTEMPTS {
            if client.is_healthy().await {
                info!("llama-server is ready");
                return Some(server);
            }
            if attempt > 0 && attempt % 5 == 0 {
                info!(
                    waited_secs = attempt as u64 * HEALTH_POLL_INTERVAL.as_secs(),
                    "still waiting for llama-server"
                );
            }
            tokio::time::sleep(HEALTH_POLL_INTERVAL).await;
        }

        warn!("llama-server never became healthy");
        server.stop().await;
        None
    }

    /// Signal the subprocess to stop and wait for it to exit.
    pub async fn stop(&mut self) {
        info!("stopping llama-server");
        if let Err(e) = self.child.kill().await {
            warn!(error = %e, "failed to stop llama-server");
        }
    }
}

/// Locate the llama-server executable: the configured path first, then
/// well-known install locations, then `PATH`.
fn resolve_binary(config: &Config) -> Option<PathBuf> {
    if let Some(ref configured) = config.llama_server_path {
        let path = PathBuf::from(configured);
        if path.exists() {
            return Some(path);
        }
        warn!(path = %path.display(), "configured LLAMA_SERVER_PATH does not exist");
    }

    let candidates = [
        "/usr/local/bin/llama-server",
        "/usr/bin/llama-server",
        "/opt/homebrew/bin/llama-server",
    ];
    for candidate in candidates {
        let path = Path::new(candidate);
        if path.exists() {
            return Some(path.to_path_buf());
        }
    }

    if let Ok(output) = std::process::Command::new("which")
        .arg("llama-server")
        .output()
    {
        if output.status.success() {
            let path = String::from_utf8_lossy(&output.stdout).trim().to_string();
            if !path.is_empty() {
                return Some(PathBuf::from(path));
            }
        }
    }

    None
}
