use async_trait::async_trait;
use serde_json::{json, Value};

use super::capabilities::Platform;
use super::client::{element_id, WebDriverClient};
use super::{Driver, ElementHandle, Orientation, Quit, Rect, Size};
use crate::error::{AutomationError, Result};
use crate::interaction::actions::{actions_body, PointerSequence};
use crate::locator::Locator;

/// Android keycode for the home button.
pub const KEYCODE_HOME: u32 = 3;

/// A live Appium session bound to one device and app.
#[derive(Debug)]
pub struct DriverSession {
    client: WebDriverClient,
    session_id: String,
    platform: Platform,
    capabilities: Value,
}

impl DriverSession {
    /// Ask the server for a new session.
    pub async fn create(
        client: WebDriverClient,
        platform: Platform,
        capabilities: Value,
    ) -> Result<Self> {
        tracing::info!(
            "Creating {} session at {} with {}",
            platform,
            client.base_url(),
            capabilities
        );
        let created = client.create_session(capabilities).await?;
        tracing::info!("{} session started: {}", platform, created.session_id);

        Ok(Self {
            client,
            session_id: created.session_id,
            platform,
            capabilities: created.capabilities,
        })
    }

    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    pub fn platform(&self) -> Platform {
        self.platform
    }

    pub fn capabilities(&self) -> &Value {
        &self.capabilities
    }

    /// End the session on the server.
    pub async fn quit(self) -> Result<()> {
        tracing::info!("Stopping session {}", self.session_id);
        self.client
            .delete(&format!("/session/{}", self.session_id))
            .await?;
        Ok(())
    }

    fn path(&self, suffix: &str) -> String {
        format!("/session/{}{}", self.session_id, suffix)
    }

    fn element_path(&self, element: &ElementHandle, suffix: &str) -> String {
        format!("/session/{}/element/{}{}", self.session_id, element.id(), suffix)
    }

    async fn get(&self, suffix: &str) -> Result<Value> {
        self.client.get(&self.path(suffix)).await
    }

    async fn post(&self, suffix: &str, body: Value) -> Result<Value> {
        self.client.post(&self.path(suffix), body).await
    }

    async fn get_element(&self, element: &ElementHandle, suffix: &str) -> Result<Value> {
        self.client.get(&self.element_path(element, suffix)).await
    }

    async fn post_element(&self, element: &ElementHandle, suffix: &str, body: Value) -> Result<Value> {
        self.client
            .post(&self.element_path(element, suffix), body)
            .await
    }
}

fn locator_body(locator: &Locator) -> Value {
    json!({ "using": locator.strategy.wire_name(), "value": locator.value })
}

fn to_handle(value: &Value) -> Result<ElementHandle> {
    element_id(value)
        .map(ElementHandle)
        .ok_or_else(|| AutomationError::Driver(format!("Unexpected element reference: {}", value)))
}

fn as_string(value: Value) -> Result<String> {
    match value {
        Value::String(s) => Ok(s),
        other => Err(AutomationError::Driver(format!(
            "Expected a string result, got {}",
            other
        ))),
    }
}

fn as_bool(value: Value) -> Result<bool> {
    value
        .as_bool()
        .ok_or_else(|| AutomationError::Driver(format!("Expected a boolean result, got {}", value)))
}

/// WebDriver reports geometry as numbers that may carry fractions.
fn dimension(value: &Value, key: &str) -> Result<i64> {
    value
        .get(key)
        .and_then(Value::as_f64)
        .map(|v| v as i64)
        .ok_or_else(|| AutomationError::Driver(format!("Missing '{}' in {}", key, value)))
}

#[async_trait]
impl Quit for DriverSession {
    async fn quit(self) -> Result<()> {
        DriverSession::quit(self).await
    }
}

#[async_trait]
impl Driver for DriverSession {
    async fn find_element(&self, locator: &Locator) -> Result<ElementHandle> {
        let value = self.post("/element", locator_body(locator)).await?;
        to_handle(&value)
    }

    async fn find_elements(&self, locator: &Locator) -> Result<Vec<ElementHandle>> {
        let value = self.post("/elements", locator_body(locator)).await?;
        value
            .as_array()
            .ok_or_else(|| AutomationError::Driver(format!("Expected an element list, got {}", value)))?
            .iter()
            .map(to_handle)
            .collect()
    }

    async fn element_rect(&self, element: &ElementHandle) -> Result<Rect> {
        let value = self.get_element(element, "/rect").await?;
        Ok(Rect::new(
            dimension(&value, "x")?,
            dimension(&value, "y")?,
            dimension(&value, "width")?,
            dimension(&value, "height")?,
        ))
    }

    async fn element_text(&self, element: &ElementHandle) -> Result<String> {
        as_string(self.get_element(element, "/text").await?)
    }

    async fn element_tag_name(&self, element: &ElementHandle) -> Result<String> {
        as_string(self.get_element(element, "/name").await?)
    }

    async fn element_attribute(
        &self,
        element: &ElementHandle,
        name: &str,
    ) -> Result<Option<String>> {
        let value = self
            .get_element(element, &format!("/attribute/{}", name))
            .await?;
        Ok(match value {
            Value::Null => None,
            Value::String(s) => Some(s),
            other => Some(other.to_string()),
        })
    }

    async fn is_displayed(&self, element: &ElementHandle) -> Result<bool> {
        as_bool(self.get_element(element, "/displayed").await?)
    }

    async fn is_enabled(&self, element: &ElementHandle) -> Result<bool> {
        as_bool(self.get_element(element, "/enabled").await?)
    }

    async fn click(&self, element: &ElementHandle) -> Result<()> {
        self.post_element(element, "/click", json!({})).await?;
        Ok(())
    }

    async fn clear(&self, element: &ElementHandle) -> Result<()> {
        self.post_element(element, "/clear", json!({})).await?;
        Ok(())
    }

    async fn send_keys(&self, element: &ElementHandle, text: &str) -> Result<()> {
        let chars: Vec<String> = text.chars().map(String::from).collect();
        self.post_element(element, "/value", json!({ "text": text, "value": chars }))
            .await?;
        Ok(())
    }

    async fn window_size(&self) -> Result<Size> {
        let value = self.get("/window/rect").await?;
        Ok(Size {
            width: dimension(&value, "width")?,
            height: dimension(&value, "height")?,
        })
    }

    async fn perform_actions(&self, sequences: &[PointerSequence]) -> Result<()> {
        self.post("/actions", actions_body(sequences)).await?;
        Ok(())
    }

    async fn page_source(&self) -> Result<String> {
        as_string(self.get("/source").await?)
    }

    async fn screenshot_base64(&self) -> Result<String> {
        as_string(self.get("/screenshot").await?)
    }

    async fn back(&self) -> Result<()> {
        self.post("/back", json!({})).await?;
        Ok(())
    }

    async fn press_keycode(&self, keycode: u32) -> Result<()> {
        self.post("/appium/device/press_keycode", json!({ "keycode": keycode }))
            .await?;
        Ok(())
    }

    async fn launch_app(&self) -> Result<()> {
        self.post("/appium/app/launch", json!({})).await?;
        Ok(())
    }

    async fn close_app(&self) -> Result<()> {
        self.post("/appium/app/close", json!({})).await?;
        Ok(())
    }

    async fn reset_app(&self) -> Result<()> {
        self.post("/appium/app/reset", json!({})).await?;
        Ok(())
    }

    async fn device_time(&self) -> Result<String> {
        as_string(self.get("/appium/device/system_time").await?)
    }

    async fn orientation(&self) -> Result<Orientation> {
        as_string(self.get("/orientation").await?)?.parse()
    }

    async fn set_orientation(&self, orientation: Orientation) -> Result<()> {
        self.post(
            "/orientation",
            json!({ "orientation": orientation.to_string() }),
        )
        .await?;
        Ok(())
    }

    async fn current_context(&self) -> Result<Option<String>> {
        Ok(match self.get("/context").await? {
            Value::String(s) => Some(s),
            _ => None,
        })
    }

    async fn contexts(&self) -> Result<Vec<String>> {
        Ok(serde_json::from_value(self.get("/contexts").await?)?)
    }

    async fn switch_context(&self, name: &str) -> Result<()> {
        self.post("/context", json!({ "name": name })).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::locator::LocatorStrategy;

    #[test]
    fn test_locator_body_uses_wire_name() {
        let locator = Locator::new(LocatorStrategy::AccessibilityId, "Login");
        assert_eq!(
            locator_body(&locator),
            json!({ "using": "accessibility id", "value": "Login" })
        );
    }

    #[test]
    fn test_dimension_truncates_fractions() {
        let value = json!({ "x": 10.7, "width": 200 });
        assert_eq!(dimension(&value, "x").unwrap(), 10);
        assert_eq!(dimension(&value, "width").unwrap(), 200);
        assert!(dimension(&value, "height").is_err());
    }

    #[test]
    fn test_to_handle_rejects_unexpected_values() {
        assert!(to_handle(&json!("not an element")).is_err());
        assert_eq!(
            to_handle(&json!({ "ELEMENT": "7" })).unwrap(),
            ElementHandle("7".into())
        );
    }
}
