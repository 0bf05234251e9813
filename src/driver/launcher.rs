use std::path::PathBuf;
use std::process::Stdio;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, AsyncReadExt, BufReader};
use tokio::process::{Child, Command};

use crate::error::{AutomationError, Result};

/// Find the `appium` executable on the current platform.
pub fn find_appium_binary() -> Result<PathBuf> {
    if let Ok(path) = which::which("appium") {
        tracing::info!("Found Appium in PATH: {}", path.display());
        return Ok(path);
    }

    let candidates = appium_candidates();
    for candidate in &candidates {
        let path = PathBuf::from(candidate);
        if path.exists() {
            tracing::info!("Found Appium at: {}", path.display());
            return Ok(path);
        }
    }

    Err(AutomationError::Driver(format!(
        "Could not find appium. Install it with `npm install -g appium`. Searched PATH and:\n{}",
        candidates.join("\n")
    )))
}

/// Common npm global install locations.
fn appium_candidates() -> Vec<String> {
    let mut candidates = Vec::new();

    #[cfg(target_os = "macos")]
    {
        candidates.extend([
            "/opt/homebrew/bin/appium".into(),
            "/usr/local/bin/appium".into(),
        ]);
    }

    #[cfg(target_os = "linux")]
    {
        candidates.extend(["/usr/local/bin/appium".into(), "/usr/bin/appium".into()]);
    }

    #[cfg(target_os = "windows")]
    {
        if let Ok(appdata) = std::env::var("APPDATA") {
            candidates.push(format!("{}\\npm\\appium.cmd", appdata));
        }
    }

    #[cfg(not(target_os = "windows"))]
    {
        if let Ok(home) = std::env::var("HOME") {
            candidates.push(format!("{}/.npm-global/bin/appium", home));
        }
    }

    candidates
}

/// An Appium server started by this process.
#[derive(Debug)]
pub struct AppiumProcess {
    child: Child,
    pub binary: PathBuf,
}

/// Result of trying to bring up a server.
#[derive(Debug)]
pub enum LaunchOutcome {
    Running(AppiumProcess),
    Exited { stderr: String },
}

impl AppiumProcess {
    /// Spawn Appium and give it `startup_wait` to come up.
    pub async fn start(startup_wait: Duration) -> Result<LaunchOutcome> {
        let binary = find_appium_binary()?;
        tracing::info!("Launching Appium server: {}", binary.display());

        let mut child = Command::new(&binary)
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .stdin(Stdio::null())
            .kill_on_drop(true)
            .spawn()?;

        tokio::time::sleep(startup_wait).await;

        match child.try_wait()? {
            None => {
                tracing::info!("Appium server started (pid {:?})", child.id());
                // Keep draining stderr so the server never blocks on a full pipe.
                if let Some(pipe) = child.stderr.take() {
                    tokio::spawn(async move {
                        let mut lines = BufReader::new(pipe).lines();
                        while let Ok(Some(line)) = lines.next_line().await {
                            tracing::debug!("appium: {}", line);
                        }
                    });
                }
                Ok(LaunchOutcome::Running(Self { child, binary }))
            }
            Some(status) => {
                let mut stderr = String::new();
                if let Some(mut pipe) = child.stderr.take() {
                    pipe.read_to_string(&mut stderr).await?;
                }
                if stderr.trim().is_empty() {
                    stderr = format!("appium exited with {}", status);
                }
                tracing::error!("Appium server exited early: {}", stderr.trim());
                Ok(LaunchOutcome::Exited { stderr })
            }
        }
    }

    pub fn is_running(&mut self) -> bool {
        matches!(self.child.try_wait(), Ok(None))
    }

    /// Stop the server.
    pub async fn stop(mut self) -> Result<()> {
        if self.is_running() {
            self.child.kill().await?;
        }
        Ok(())
    }
}
