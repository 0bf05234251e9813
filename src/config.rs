use std::time::Duration;

pub const DEFAULT_APPIUM_URL: &str = "http://localhost:4723/wd/hub";

/// Runtime settings shared by every tool call.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Server used when a create-driver call does not name one.
    pub appium_url: String,
    /// Per-request HTTP timeout for WebDriver calls.
    pub http_timeout: Duration,
    /// How long `start_appium_server` waits before checking the process.
    pub startup_wait: Duration,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            appium_url: DEFAULT_APPIUM_URL.to_string(),
            http_timeout: Duration::from_secs(120),
            startup_wait: Duration::from_secs(5),
        }
    }
}
