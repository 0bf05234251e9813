#![allow(dead_code)]

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use appium_mcp::driver::{Driver, ElementHandle, Orientation, Rect, Size};
use appium_mcp::error::{AutomationError, Result};
use appium_mcp::interaction::actions::PointerSequence;
use appium_mcp::interaction::gesture::Point;
use appium_mcp::locator::Locator;

pub const ELEMENT_ID: &str = "mock-element-1";

/// Everything the mock knows and everything it was asked to do.
#[derive(Debug)]
pub struct MockState {
    /// Lookups that fail before the element shows up.
    pub misses_before_found: usize,
    /// Whether the element ever shows up.
    pub present: bool,
    pub element_rect: Rect,
    pub window: Size,
    pub displayed: bool,
    pub enabled: bool,
    pub text: String,
    pub attributes: HashMap<String, String>,
    pub screenshot: String,
    pub orientation: Orientation,
    pub context: String,

    pub find_calls: usize,
    pub swipes: Vec<(Point, Point, u64)>,
    pub actions: Vec<Vec<PointerSequence>>,
    pub clicks: usize,
    pub clears: usize,
    pub typed: Vec<String>,
    pub keycodes: Vec<u32>,
    pub fail_swipes: bool,
}

impl Default for MockState {
    fn default() -> Self {
        Self {
            misses_before_found: 0,
            present: true,
            element_rect: Rect::new(0, 0, 100, 100),
            window: Size {
                width: 400,
                height: 800,
            },
            displayed: true,
            enabled: true,
            text: "Hello".to_string(),
            attributes: HashMap::new(),
            screenshot: String::new(),
            orientation: Orientation::Portrait,
            context: "NATIVE_APP".to_string(),
            find_calls: 0,
            swipes: Vec::new(),
            actions: Vec::new(),
            clicks: 0,
            clears: 0,
            typed: Vec::new(),
            keycodes: Vec::new(),
            fail_swipes: false,
        }
    }
}

/// In-memory stand-in for an Appium session.
#[derive(Debug, Default)]
pub struct MockDriver {
    state: Mutex<MockState>,
}

impl MockDriver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_element_after(self, misses: usize) -> Self {
        self.state().misses_before_found = misses;
        self
    }

    pub fn without_element(self) -> Self {
        self.state().present = false;
        self
    }

    pub fn with_element_rect(self, rect: Rect) -> Self {
        self.state().element_rect = rect;
        self
    }

    pub fn with_window(self, width: i64, height: i64) -> Self {
        self.state().window = Size { width, height };
        self
    }

    pub fn with_attribute(self, name: &str, value: &str) -> Self {
        self.state()
            .attributes
            .insert(name.to_string(), value.to_string());
        self
    }

    pub fn with_screenshot(self, encoded: &str) -> Self {
        self.state().screenshot = encoded.to_string();
        self
    }

    pub fn hidden(self) -> Self {
        self.state().displayed = false;
        self
    }

    pub fn failing_swipes(self) -> Self {
        self.state().fail_swipes = true;
        self
    }

    pub fn state(&self) -> MutexGuard<'_, MockState> {
        self.state.lock().unwrap()
    }
}

#[async_trait]
impl Driver for MockDriver {
    async fn find_element(&self, locator: &Locator) -> Result<ElementHandle> {
        let mut state = self.state();
        state.find_calls += 1;
        if !state.present {
            return Err(AutomationError::ElementNotFound(locator.to_string()));
        }
        if state.misses_before_found > 0 {
            state.misses_before_found -= 1;
            return Err(AutomationError::ElementNotFound(locator.to_string()));
        }
        Ok(ElementHandle(ELEMENT_ID.to_string()))
    }

    async fn find_elements(&self, locator: &Locator) -> Result<Vec<ElementHandle>> {
        let element = self.find_element(locator).await?;
        Ok(vec![element, ElementHandle("mock-element-2".to_string())])
    }

    async fn element_rect(&self, _element: &ElementHandle) -> Result<Rect> {
        Ok(self.state().element_rect)
    }

    async fn element_text(&self, _element: &ElementHandle) -> Result<String> {
        Ok(self.state().text.clone())
    }

    async fn element_tag_name(&self, _element: &ElementHandle) -> Result<String> {
        Ok("android.widget.Button".to_string())
    }

    async fn element_attribute(
        &self,
        _element: &ElementHandle,
        name: &str,
    ) -> Result<Option<String>> {
        Ok(self.state().attributes.get(name).cloned())
    }

    async fn is_displayed(&self, _element: &ElementHandle) -> Result<bool> {
        Ok(self.state().displayed)
    }

    async fn is_enabled(&self, _element: &ElementHandle) -> Result<bool> {
        Ok(self.state().enabled)
    }

    async fn click(&self, _element: &ElementHandle) -> Result<()> {
        self.state().clicks += 1;
        Ok(())
    }

    async fn clear(&self, _element: &ElementHandle) -> Result<()> {
        self.state().clears += 1;
        Ok(())
    }

    async fn send_keys(&self, _element: &ElementHandle, text: &str) -> Result<()> {
        self.state().typed.push(text.to_string());
        Ok(())
    }

    async fn window_size(&self) -> Result<Size> {
        Ok(self.state().window)
    }

    async fn perform_actions(&self, sequences: &[PointerSequence]) -> Result<()> {
        self.state().actions.push(sequences.to_vec());
        Ok(())
    }

    async fn swipe(&self, start: Point, end: Point, duration_ms: u64) -> Result<()> {
        let mut state = self.state();
        if state.fail_swipes {
            return Err(AutomationError::Driver("swipe rejected".to_string()));
        }
        state.swipes.push((start, end, duration_ms));
        Ok(())
    }

    async fn page_source(&self) -> Result<String> {
        Ok("<hierarchy/>".to_string())
    }

    async fn screenshot_base64(&self) -> Result<String> {
        Ok(self.state().screenshot.clone())
    }

    async fn back(&self) -> Result<()> {
        Ok(())
    }

    async fn press_keycode(&self, keycode: u32) -> Result<()> {
        self.state().keycodes.push(keycode);
        Ok(())
    }

    async fn launch_app(&self) -> Result<()> {
        Ok(())
    }

    async fn close_app(&self) -> Result<()> {
        Ok(())
    }

    async fn reset_app(&self) -> Result<()> {
        Ok(())
    }

    async fn device_time(&self) -> Result<String> {
        Ok("2024-01-01T00:00:00+00:00".to_string())
    }

    async fn orientation(&self) -> Result<Orientation> {
        Ok(self.state().orientation)
    }

    async fn set_orientation(&self, orientation: Orientation) -> Result<()> {
        self.state().orientation = orientation;
        Ok(())
    }

    async fn current_context(&self) -> Result<Option<String>> {
        Ok(Some(self.state().context.clone()))
    }

    async fn contexts(&self) -> Result<Vec<String>> {
        Ok(vec![
            "NATIVE_APP".to_string(),
            "WEBVIEW_com.example".to_string(),
        ])
    }

    async fn switch_context(&self, name: &str) -> Result<()> {
        self.state().context = name.to_string();
        Ok(())
    }
}
