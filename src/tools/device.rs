use serde::{Deserialize, Serialize};

use super::Reply;
use crate::driver::{Driver, Orientation};
use crate::error::{AutomationError, Result};

#[derive(Debug, Serialize, Deserialize, schemars::JsonSchema)]
pub struct ScreenshotParams {
    #[schemars(description = "File to write the PNG to (omit to return base64 data)")]
    pub path: Option<String>,
}

pub async fn take_screenshot(driver: &dyn Driver, params: &ScreenshotParams) -> Result<Reply> {
    use base64::Engine;

    let encoded = driver.screenshot_base64().await?;

    match params.path.as_deref().filter(|p| !p.is_empty()) {
        Some(path) => {
            // Some servers wrap the payload across lines.
            let compact: String = encoded.split_whitespace().collect();
            let bytes = base64::engine::general_purpose::STANDARD
                .decode(compact.as_bytes())
                .map_err(|e| AutomationError::Driver(format!("Invalid screenshot data: {}", e)))?;
            tokio::fs::write(path, &bytes).await?;
            tracing::info!("Screenshot saved to {} ({} bytes)", path, bytes.len());
            Ok(Reply::ok(format!("Screenshot saved to {}", path)))
        }
        None => Ok(Reply::empty().with("screenshot", encoded)),
    }
}

pub async fn get_device_time(driver: &dyn Driver) -> Result<Reply> {
    let time = driver.device_time().await?;
    Ok(Reply::empty().with("time", time))
}

pub async fn get_device_orientation(driver: &dyn Driver) -> Result<Reply> {
    let orientation = driver.orientation().await?;
    Ok(Reply::empty().with("orientation", orientation))
}

#[derive(Debug, Serialize, Deserialize, schemars::JsonSchema)]
pub struct SetOrientationParams {
    #[schemars(description = "LANDSCAPE or PORTRAIT")]
    pub orientation: String,
}

pub async fn set_device_orientation(
    driver: &dyn Driver,
    params: &SetOrientationParams,
) -> Result<Reply> {
    let orientation: Orientation = params.orientation.parse()?;
    driver.set_orientation(orientation).await?;
    Ok(Reply::ok(format!("Set orientation to {}", orientation)))
}

pub async fn get_current_context(driver: &dyn Driver) -> Result<Reply> {
    let context = driver.current_context().await?;
    Ok(Reply::empty().with("context", context))
}

pub async fn get_contexts(driver: &dyn Driver) -> Result<Reply> {
    let contexts = driver.contexts().await?;
    Ok(Reply::empty().with("contexts", contexts))
}

#[derive(Debug, Serialize, Deserialize, schemars::JsonSchema)]
pub struct SwitchContextParams {
    #[schemars(description = "Context to switch to, e.g. NATIVE_APP or WEBVIEW_com.example")]
    pub context_name: String,
}

pub async fn switch_to_context(driver: &dyn Driver, params: &SwitchContextParams) -> Result<Reply> {
    driver.switch_context(&params.context_name).await?;
    Ok(Reply::ok(format!("Switched to context {}", params.context_name)))
}
