use futures::future::BoxFuture;
use rmcp::model::*;
use rmcp::tool;
use rmcp::{Error as McpError, ServerHandler};
use serde::Serialize;
use serde_json::{json, Value};
use std::sync::Arc;
use tokio::sync::Mutex;

use crate::config::ServerConfig;
use crate::driver::launcher::AppiumProcess;
use crate::driver::{Driver, DriverSession, SessionSlot};
use crate::error::AutomationError;
use crate::report::ActionLog;
use crate::tools::{app, device, element, gesture, report, session, Reply};

// Tool handlers return `Result<CallToolResult, McpError>`; keep the second parameter open.
type Result<T, E = AutomationError> = std::result::Result<T, E>;

/// The MCP server that routes tool calls to an Appium session.
#[derive(Clone)]
pub struct AppiumServer {
    session: Arc<SessionSlot<DriverSession>>,
    appium: Arc<Mutex<Option<AppiumProcess>>>,
    action_log: ActionLog,
    config: ServerConfig,
}

impl AppiumServer {
    pub fn new(config: ServerConfig) -> Self {
        Self {
            session: Arc::new(SessionSlot::new()),
            appium: Arc::new(Mutex::new(None)),
            action_log: ActionLog::new(),
            config,
        }
    }

    pub fn action_log(&self) -> &ActionLog {
        &self.action_log
    }

    /// Run `f` against the live session. The lock is held until `f` finishes,
    /// so driver calls never interleave.
    async fn with_driver<F, T>(&self, f: F) -> Result<T>
    where
        F: for<'a> FnOnce(&'a dyn Driver) -> BoxFuture<'a, Result<T>>,
    {
        let session = self.session.lock().await;
        let driver = session.as_ref().ok_or(AutomationError::NoSession)?;
        f(driver).await
    }

    /// Quit the session and stop an Appium server this process started.
    pub async fn shutdown(&self) {
        if let Some(Err(e)) = self.session.stop().await {
            tracing::warn!("Failed to stop Appium session: {}", e);
        }
        if let Some(process) = self.appium.lock().await.take() {
            if let Err(e) = process.stop().await {
                tracing::warn!("Failed to stop Appium server: {}", e);
            }
        }
    }

    fn details(params: &impl Serialize) -> Value {
        serde_json::to_value(params).unwrap_or(Value::Null)
    }

    /// Turn an outcome into its JSON body and whether it counts as a success.
    fn reply_body(tool: &str, outcome: Result<Reply>) -> (bool, Value) {
        match outcome {
            Ok(reply) => {
                let success = reply.success;
                (success, serde_json::to_value(reply).unwrap_or(Value::Null))
            }
            Err(e) => {
                tracing::error!("{} failed: {}", tool, e);
                (false, json!({ "error": e.to_string(), "kind": e.kind() }))
            }
        }
    }

    /// Record the call in the action log and build the MCP result.
    async fn finish(
        &self,
        tool: &str,
        details: Value,
        outcome: Result<Reply>,
    ) -> Result<CallToolResult, McpError> {
        let (success, body) = Self::reply_body(tool, outcome);
        self.action_log.record(tool, details, success).await;
        Self::json_result(body)
    }

    fn json_result(value: impl Serialize) -> Result<CallToolResult, McpError> {
        let text = serde_json::to_string_pretty(&value)
            .map_err(|e| McpError::internal_error(format!("JSON error: {}", e), None))?;
        Ok(CallToolResult::success(vec![Content::text(text)]))
    }
}

#[tool(tool_box)]
impl ServerHandler for AppiumServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            instructions: Some(
                "appium-mcp: mobile and desktop app automation through Appium. \
                 Start with `start_appium_server` (or point at a running server), \
                 then `create_android_driver`, `create_ios_driver` or `create_mac_driver`."
                    .into(),
            ),
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            ..Default::default()
        }
    }
}

#[tool(tool_box)]
impl AppiumServer {
    // ── Session ─────────────────────────────────────────────────────────

    #[tool(description = "Start a local Appium server and report whether it stayed up.")]
    async fn start_appium_server(&self) -> Result<CallToolResult, McpError> {
        let outcome = {
            let mut appium = self.appium.lock().await;
            let running = appium.as_mut().is_some_and(|process| process.is_running());
            if running {
                Ok(Reply::ok("Appium server is already running."))
            } else {
                session::start_appium_server(&self.config)
                    .await
                    .map(|(reply, process)| {
                        *appium = process;
                        reply
                    })
            }
        };
        self.finish("start_appium_server", Value::Null, outcome).await
    }

    #[tool(description = "Create an Android session (UiAutomator2). Needs app_path, or app_package with app_activity.")]
    async fn create_android_driver(
        &self,
        #[tool(aggr)] params: session::CreateAndroidDriverParams,
    ) -> Result<CallToolResult, McpError> {
        let details = Self::details(&params);
        let outcome = self
            .session
            .replace(
                session::create_android_driver(&self.config, &params),
                session::created_reply,
            )
            .await;
        self.finish("create_android_driver", details, outcome).await
    }

    #[tool(description = "Create an iOS session (XCUITest). Needs app_path or bundle_id.")]
    async fn create_ios_driver(
        &self,
        #[tool(aggr)] params: session::CreateIosDriverParams,
    ) -> Result<CallToolResult, McpError> {
        let details = Self::details(&params);
        let outcome = self
            .session
            .replace(
                session::create_ios_driver(&self.config, &params),
                session::created_reply,
            )
            .await;
        self.finish("create_ios_driver", details, outcome).await
    }

    #[tool(description = "Create a macOS session (Mac2). Needs app_path, bundle_id or app_name.")]
    async fn create_mac_driver(
        &self,
        #[tool(aggr)] params: session::CreateMacDriverParams,
    ) -> Result<CallToolResult, McpError> {
        let details = Self::details(&params);
        let outcome = self
            .session
            .replace(
                session::create_mac_driver(&self.config, &params),
                session::created_reply,
            )
            .await;
        self.finish("create_mac_driver", details, outcome).await
    }

    #[tool(description = "End the current Appium session.")]
    async fn stop_appium_driver(&self) -> Result<CallToolResult, McpError> {
        let outcome = match self.session.stop().await {
            None => Ok(Reply::failed("Appium driver is not running.")),
            Some(Ok(())) => Ok(Reply::ok("Appium driver stopped successfully.")),
            Some(Err(e)) => Err(e),
        };
        self.finish("stop_appium_driver", Value::Null, outcome).await
    }

    // ── Elements ────────────────────────────────────────────────────────

    #[tool(description = "Find an element, waiting up to `timeout` seconds (default 10). Returns its id, location, size, text and attributes.")]
    async fn find_element(
        &self,
        #[tool(aggr)] params: element::LocateParams,
    ) -> Result<CallToolResult, McpError> {
        let details = Self::details(&params);
        let outcome = self
            .with_driver(|d| Box::pin(async move { element::find_element(d, &params).await }))
            .await;
        self.finish("find_element", details, outcome).await
    }

    #[tool(description = "Find all elements matching a locator once at least one is present.")]
    async fn find_elements(
        &self,
        #[tool(aggr)] params: element::LocateParams,
    ) -> Result<CallToolResult, McpError> {
        let details = Self::details(&params);
        let outcome = self
            .with_driver(|d| Box::pin(async move { element::find_elements(d, &params).await }))
            .await;
        self.finish("find_elements", details, outcome).await
    }

    #[tool(description = "Wait for an element to be present (default 20 seconds).")]
    async fn wait_for_element(
        &self,
        #[tool(aggr)] params: element::LocateParams,
    ) -> Result<CallToolResult, McpError> {
        let details = Self::details(&params);
        let outcome = self
            .with_driver(|d| Box::pin(async move { element::wait_for_element(d, &params).await }))
            .await;
        self.finish("wait_for_element", details, outcome).await
    }

    #[tool(description = "Wait for an element to be displayed and enabled (default 20 seconds).")]
    async fn wait_for_element_to_be_clickable(
        &self,
        #[tool(aggr)] params: element::LocateParams,
    ) -> Result<CallToolResult, McpError> {
        let details = Self::details(&params);
        let outcome = self
            .with_driver(|d| {
                Box::pin(async move { element::wait_for_element_to_be_clickable(d, &params).await })
            })
            .await;
        self.finish("wait_for_element_to_be_clickable", details, outcome)
            .await
    }

    #[tool(description = "Tap an element once it is clickable.")]
    async fn tap_element(
        &self,
        #[tool(aggr)] params: element::LocateParams,
    ) -> Result<CallToolResult, McpError> {
        let details = Self::details(&params);
        let outcome = self
            .with_driver(|d| Box::pin(async move { element::tap_element(d, &params).await }))
            .await;
        self.finish("tap_element", details, outcome).await
    }

    #[tool(description = "Press and hold the center of an element.")]
    async fn long_press_element(
        &self,
        #[tool(aggr)] params: element::LongPressParams,
    ) -> Result<CallToolResult, McpError> {
        let details = Self::details(&params);
        let outcome = self
            .with_driver(|d| Box::pin(async move { element::long_press_element(d, &params).await }))
            .await;
        self.finish("long_press_element", details, outcome).await
    }

    #[tool(description = "Get the visible text of an element.")]
    async fn get_text(
        &self,
        #[tool(aggr)] params: element::LocateParams,
    ) -> Result<CallToolResult, McpError> {
        let details = Self::details(&params);
        let outcome = self
            .with_driver(|d| Box::pin(async move { element::get_text(d, &params).await }))
            .await;
        self.finish("get_text", details, outcome).await
    }

    #[tool(description = "Type text into an element, clearing it first unless clear_first is false.")]
    async fn set_text(
        &self,
        #[tool(aggr)] params: element::SetTextParams,
    ) -> Result<CallToolResult, McpError> {
        let details = Self::details(&params);
        let outcome = self
            .with_driver(|d| Box::pin(async move { element::set_text(d, &params).await }))
            .await;
        self.finish("set_text", details, outcome).await
    }

    #[tool(description = "Read one attribute of an element.")]
    async fn get_attribute(
        &self,
        #[tool(aggr)] params: element::GetAttributeParams,
    ) -> Result<CallToolResult, McpError> {
        let details = Self::details(&params);
        let outcome = self
            .with_driver(|d| Box::pin(async move { element::get_attribute(d, &params).await }))
            .await;
        self.finish("get_attribute", details, outcome).await
    }

    // ── Gestures ────────────────────────────────────────────────────────

    #[tool(description = "Swipe between two screen coordinates.")]
    async fn swipe(
        &self,
        #[tool(aggr)] params: gesture::SwipeParams,
    ) -> Result<CallToolResult, McpError> {
        let details = Self::details(&params);
        let outcome = self
            .with_driver(|d| Box::pin(async move { gesture::swipe(d, &params).await }))
            .await;
        self.finish("swipe", details, outcome).await
    }

    #[tool(description = "Swipe up or down until an element appears. Returns the element and the number of swipes.")]
    async fn scroll_to_element(
        &self,
        #[tool(aggr)] params: gesture::ScrollToElementParams,
    ) -> Result<CallToolResult, McpError> {
        let details = Self::details(&params);
        let outcome = self
            .with_driver(|d| Box::pin(async move { gesture::scroll_to_element(d, &params).await }))
            .await;
        self.finish("scroll_to_element", details, outcome).await
    }

    #[tool(description = "Two-finger pinch on an element or the whole screen. percent < 100 closes the fingers.")]
    async fn pinch(
        &self,
        #[tool(aggr)] params: gesture::PinchParams,
    ) -> Result<CallToolResult, McpError> {
        let details = Self::details(&params);
        let outcome = self
            .with_driver(|d| Box::pin(async move { gesture::pinch(d, &params).await }))
            .await;
        self.finish("pinch", details, outcome).await
    }

    #[tool(description = "Two-finger zoom on an element or the whole screen. percent > 100 spreads the fingers.")]
    async fn zoom(
        &self,
        #[tool(aggr)] params: gesture::ZoomParams,
    ) -> Result<CallToolResult, McpError> {
        let details = Self::details(&params);
        let outcome = self
            .with_driver(|d| Box::pin(async move { gesture::zoom(d, &params).await }))
            .await;
        self.finish("zoom", details, outcome).await
    }

    // ── App ─────────────────────────────────────────────────────────────

    #[tool(description = "Press the back button.")]
    async fn go_back(&self) -> Result<CallToolResult, McpError> {
        let outcome = self
            .with_driver(|d| Box::pin(app::go_back(d)))
            .await;
        self.finish("go_back", Value::Null, outcome).await
    }

    #[tool(description = "Press the home button (Android).")]
    async fn go_home(&self) -> Result<CallToolResult, McpError> {
        let outcome = self
            .with_driver(|d| Box::pin(app::go_home(d)))
            .await;
        self.finish("go_home", Value::Null, outcome).await
    }

    #[tool(description = "Launch the app under test.")]
    async fn launch_app(&self) -> Result<CallToolResult, McpError> {
        let outcome = self
            .with_driver(|d| Box::pin(app::launch_app(d)))
            .await;
        self.finish("launch_app", Value::Null, outcome).await
    }

    #[tool(description = "Close the app under test.")]
    async fn close_app(&self) -> Result<CallToolResult, McpError> {
        let outcome = self
            .with_driver(|d| Box::pin(app::close_app(d)))
            .await;
        self.finish("close_app", Value::Null, outcome).await
    }

    #[tool(description = "Reset the app under test.")]
    async fn reset_app(&self) -> Result<CallToolResult, McpError> {
        let outcome = self
            .with_driver(|d| Box::pin(app::reset_app(d)))
            .await;
        self.finish("reset_app", Value::Null, outcome).await
    }

    #[tool(description = "Get the XML source of the current screen.")]
    async fn get_page_source(&self) -> Result<CallToolResult, McpError> {
        let outcome = self
            .with_driver(|d| Box::pin(app::get_page_source(d)))
            .await;
        self.finish("get_page_source", Value::Null, outcome).await
    }

    // ── Device ──────────────────────────────────────────────────────────

    #[tool(description = "Take a screenshot. Writes a PNG to `path` if given, otherwise returns base64 data.")]
    async fn take_screenshot(
        &self,
        #[tool(aggr)] params: device::ScreenshotParams,
    ) -> Result<CallToolResult, McpError> {
        let details = Self::details(&params);
        let outcome = self
            .with_driver(|d| Box::pin(async move { device::take_screenshot(d, &params).await }))
            .await;
        self.finish("take_screenshot", details, outcome).await
    }

    #[tool(description = "Get the device time.")]
    async fn get_device_time(&self) -> Result<CallToolResult, McpError> {
        let outcome = self
            .with_driver(|d| Box::pin(device::get_device_time(d)))
            .await;
        self.finish("get_device_time", Value::Null, outcome).await
    }

    #[tool(description = "Get the screen orientation (LANDSCAPE or PORTRAIT).")]
    async fn get_device_orientation(&self) -> Result<CallToolResult, McpError> {
        let outcome = self
            .with_driver(|d| Box::pin(device::get_device_orientation(d)))
            .await;
        self.finish("get_device_orientation", Value::Null, outcome)
            .await
    }

    #[tool(description = "Set the screen orientation to LANDSCAPE or PORTRAIT.")]
    async fn set_device_orientation(
        &self,
        #[tool(aggr)] params: device::SetOrientationParams,
    ) -> Result<CallToolResult, McpError> {
        let details = Self::details(&params);
        let outcome = self
            .with_driver(|d| {
                Box::pin(async move { device::set_device_orientation(d, &params).await })
            })
            .await;
        self.finish("set_device_orientation", details, outcome).await
    }

    #[tool(description = "Get the current automation context, e.g. NATIVE_APP.")]
    async fn get_current_context(&self) -> Result<CallToolResult, McpError> {
        let outcome = self
            .with_driver(|d| Box::pin(device::get_current_context(d)))
            .await;
        self.finish("get_current_context", Value::Null, outcome).await
    }

    #[tool(description = "List the available automation contexts.")]
    async fn get_contexts(&self) -> Result<CallToolResult, McpError> {
        let outcome = self
            .with_driver(|d| Box::pin(device::get_contexts(d)))
            .await;
        self.finish("get_contexts", Value::Null, outcome).await
    }

    #[tool(description = "Switch to a native or webview context.")]
    async fn switch_to_context(
        &self,
        #[tool(aggr)] params: device::SwitchContextParams,
    ) -> Result<CallToolResult, McpError> {
        let details = Self::details(&params);
        let outcome = self
            .with_driver(|d| Box::pin(async move { device::switch_to_context(d, &params).await }))
            .await;
        self.finish("switch_to_context", details, outcome).await
    }

    // ── Action log ──────────────────────────────────────────────────────

    #[tool(description = "Name the test the following actions belong to.")]
    async fn set_test_name(
        &self,
        #[tool(aggr)] params: report::SetTestNameParams,
    ) -> Result<CallToolResult, McpError> {
        let outcome = report::set_test_name(&self.action_log, &params).await;
        Self::json_result(Self::reply_body("set_test_name", outcome).1)
    }

    #[tool(description = "Get the test status and the recorded actions.")]
    async fn get_test_report(
        &self,
        #[tool(aggr)] params: report::GetTestReportParams,
    ) -> Result<CallToolResult, McpError> {
        let outcome = report::get_test_report(&self.action_log, &params).await;
        Self::json_result(Self::reply_body("get_test_report", outcome).1)
    }

    #[tool(description = "Mark the test finished, successfully unless success is false.")]
    async fn complete_test(
        &self,
        #[tool(aggr)] params: report::CompleteTestParams,
    ) -> Result<CallToolResult, McpError> {
        let outcome = report::complete_test(&self.action_log, &params).await;
        Self::json_result(Self::reply_body("complete_test", outcome).1)
    }
}
