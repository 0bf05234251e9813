use clap::Parser;
use rmcp::transport::stdio;
use rmcp::ServiceExt;
use std::time::Duration;

use appium_mcp::config::{ServerConfig, DEFAULT_APPIUM_URL};

/// appium-mcp: Appium app automation over MCP
#[derive(Parser)]
#[command(name = "appium-mcp", version, about)]
struct Cli {
    /// Appium server used when a create-driver call does not name one
    #[arg(long, env = "APPIUM_URL", default_value = DEFAULT_APPIUM_URL)]
    appium_url: String,

    /// Timeout in seconds for each WebDriver request
    #[arg(long, env = "APPIUM_HTTP_TIMEOUT", default_value_t = 120)]
    http_timeout: u64,

    /// Seconds to wait after launching Appium before checking it is up
    #[arg(long, env = "APPIUM_STARTUP_WAIT", default_value_t = 5)]
    startup_wait: u64,
}

impl Cli {
    fn into_config(self) -> ServerConfig {
        ServerConfig {
            appium_url: self.appium_url,
            http_timeout: Duration::from_secs(self.http_timeout),
            startup_wait: Duration::from_secs(self.startup_wait),
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Log to stderr only, stdout is the MCP transport
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .with_target(false)
        .without_time()
        .init();

    let config = Cli::parse().into_config();

    tracing::info!("Starting appium-mcp server (default Appium URL: {})", config.appium_url);

    let server = appium_mcp::server::AppiumServer::new(config);
    let service = server.clone().serve(stdio()).await?;

    tokio::select! {
        result = service.waiting() => { result?; }
        _ = tokio::signal::ctrl_c() => {
            tracing::info!("Received interrupt signal, shutting down");
        }
    }

    // Release the device session and any Appium process we started
    server.shutdown().await;

    tracing::info!("appium-mcp server shut down");
    Ok(())
}
