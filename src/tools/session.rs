use serde::{Deserialize, Serialize};

use super::Reply;
use crate::config::ServerConfig;
use crate::driver::capabilities::{AndroidCapabilities, IosCapabilities, MacCapabilities};
use crate::driver::launcher::{AppiumProcess, LaunchOutcome};
use crate::driver::{DriverSession, Platform, WebDriverClient};
use crate::error::Result;

#[derive(Debug, Serialize, Deserialize, schemars::JsonSchema)]
pub struct CreateAndroidDriverParams {
    #[schemars(description = "Path to the .apk to install")]
    pub app_path: Option<String>,
    #[schemars(description = "Device name (default: Android Emulator)")]
    pub device_name: Option<String>,
    #[schemars(description = "Android version (default: 10.0)")]
    pub platform_version: Option<String>,
    #[schemars(description = "Package of an installed app, used with app_activity")]
    pub app_package: Option<String>,
    #[schemars(description = "Activity to launch, used with app_package")]
    pub app_activity: Option<String>,
    #[schemars(description = "Automation backend (default: UiAutomator2)")]
    pub automation_name: Option<String>,
    #[schemars(description = "Appium server URL (default: the server's configured URL)")]
    pub appium_server_url: Option<String>,
    pub no_reset: Option<bool>,
    pub full_reset: Option<bool>,
    #[schemars(description = "Grant runtime permissions on install (default: true)")]
    pub auto_grant_permissions: Option<bool>,
}

#[derive(Debug, Serialize, Deserialize, schemars::JsonSchema)]
pub struct CreateIosDriverParams {
    #[schemars(description = "Path to the .app or .ipa to install")]
    pub app_path: Option<String>,
    #[schemars(description = "Device name (default: iPhone Simulator)")]
    pub device_name: Option<String>,
    #[schemars(description = "iOS version (default: 15.0)")]
    pub platform_version: Option<String>,
    #[schemars(description = "Bundle id of an installed app")]
    pub bundle_id: Option<String>,
    #[schemars(description = "Automation backend (default: XCUITest)")]
    pub automation_name: Option<String>,
    #[schemars(description = "Appium server URL (default: the server's configured URL)")]
    pub appium_server_url: Option<String>,
    pub no_reset: Option<bool>,
    pub full_reset: Option<bool>,
    #[schemars(description = "Accept system alerts automatically (default: true)")]
    pub auto_accept_alerts: Option<bool>,
}

#[derive(Debug, Serialize, Deserialize, schemars::JsonSchema)]
pub struct CreateMacDriverParams {
    #[schemars(description = "Path to the .app bundle")]
    pub app_path: Option<String>,
    #[schemars(description = "Bundle id of an installed app")]
    pub bundle_id: Option<String>,
    #[schemars(description = "Name of a system or installed application")]
    pub app_name: Option<String>,
    #[schemars(description = "Automation backend (default: Mac2)")]
    pub automation_name: Option<String>,
    #[schemars(description = "Appium server URL (default: the server's configured URL)")]
    pub appium_server_url: Option<String>,
}

fn client_for(config: &ServerConfig, url: Option<&str>) -> Result<WebDriverClient> {
    let url = url.filter(|u| !u.is_empty()).unwrap_or(&config.appium_url);
    WebDriverClient::new(url, config.http_timeout)
}

fn text_or(value: &Option<String>, default: &str) -> String {
    value.clone().unwrap_or_else(|| default.to_string())
}

pub async fn create_android_driver(
    config: &ServerConfig,
    params: &CreateAndroidDriverParams,
) -> Result<DriverSession> {
    let capabilities = AndroidCapabilities {
        app: AndroidCapabilities::app_from(
            params.app_path.as_deref(),
            params.app_package.as_deref(),
            params.app_activity.as_deref(),
        )?,
        device_name: text_or(&params.device_name, "Android Emulator"),
        platform_version: text_or(&params.platform_version, "10.0"),
        automation_name: text_or(&params.automation_name, "UiAutomator2"),
        no_reset: params.no_reset.unwrap_or(false),
        full_reset: params.full_reset.unwrap_or(false),
        auto_grant_permissions: params.auto_grant_permissions.unwrap_or(true),
    };

    let client = client_for(config, params.appium_server_url.as_deref())?;
    DriverSession::create(client, Platform::Android, capabilities.to_w3c()).await
}

pub async fn create_ios_driver(
    config: &ServerConfig,
    params: &CreateIosDriverParams,
) -> Result<DriverSession> {
    let capabilities = IosCapabilities {
        app: IosCapabilities::app_from(params.app_path.as_deref(), params.bundle_id.as_deref())?,
        device_name: text_or(&params.device_name, "iPhone Simulator"),
        platform_version: text_or(&params.platform_version, "15.0"),
        automation_name: text_or(&params.automation_name, "XCUITest"),
        no_reset: params.no_reset.unwrap_or(false),
        full_reset: params.full_reset.unwrap_or(false),
        auto_accept_alerts: params.auto_accept_alerts.unwrap_or(true),
    };

    let client = client_for(config, params.appium_server_url.as_deref())?;
    DriverSession::create(client, Platform::Ios, capabilities.to_w3c()).await
}

pub async fn create_mac_driver(
    config: &ServerConfig,
    params: &CreateMacDriverParams,
) -> Result<DriverSession> {
    let capabilities = MacCapabilities {
        app: MacCapabilities::app_from(
            params.app_path.as_deref(),
            params.bundle_id.as_deref(),
            params.app_name.as_deref(),
        )?,
        automation_name: text_or(&params.automation_name, "Mac2"),
    };

    let client = client_for(config, params.appium_server_url.as_deref())?;
    DriverSession::create(client, Platform::Mac, capabilities.to_w3c()).await
}

pub fn created_reply(session: &DriverSession) -> Reply {
    Reply::ok("Appium driver created successfully.")
        .with("session_id", session.session_id())
        .with("platform", session.platform().platform_name())
}

/// Start Appium; the process handle is returned only if it stayed up.
pub async fn start_appium_server(config: &ServerConfig) -> Result<(Reply, Option<AppiumProcess>)> {
    match AppiumProcess::start(config.startup_wait).await? {
        LaunchOutcome::Running(process) => {
            let reply = Reply::ok("Appium server started successfully.")
                .with("binary", process.binary.display().to_string());
            Ok((reply, Some(process)))
        }
        LaunchOutcome::Exited { stderr } => Ok((
            Reply::failed(format!("Failed to start Appium server: {}", stderr.trim())),
            None,
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn test_android_driver_requires_app_before_connecting() {
        let config = ServerConfig {
            // Nothing listens here; validation must fail before any request.
            appium_url: "http://127.0.0.1:9".into(),
            http_timeout: Duration::from_millis(100),
            ..ServerConfig::default()
        };
        let params = CreateAndroidDriverParams {
            app_path: None,
            device_name: None,
            platform_version: None,
            app_package: Some("com.example".into()),
            app_activity: None,
            automation_name: None,
            appium_server_url: None,
            no_reset: None,
            full_reset: None,
            auto_grant_permissions: None,
        };
        let err = create_android_driver(&config, &params).await.unwrap_err();
        assert_eq!(err.kind(), "InvalidArgument");
    }

    #[test]
    fn test_client_prefers_explicit_url() {
        let config = ServerConfig::default();
        let client = client_for(&config, Some("http://device-farm:4444/")).unwrap();
        assert_eq!(client.base_url(), "http://device-farm:4444");
        let client = client_for(&config, Some("")).unwrap();
        assert_eq!(client.base_url(), config.appium_url);
    }
}
