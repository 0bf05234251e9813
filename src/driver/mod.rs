pub mod capabilities;
pub mod client;
pub mod launcher;
pub mod session;
pub mod slot;

pub use capabilities::Platform;
pub use client::WebDriverClient;
pub use session::DriverSession;
pub use slot::{Quit, SessionSlot};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::interaction::actions::{PointerSequence, DEFAULT_MOVE_DURATION_MS};
use crate::interaction::gesture::Point;
use crate::locator::Locator;

/// Opaque W3C element reference returned by a find call.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ElementHandle(pub String);

impl ElementHandle {
    pub fn id(&self) -> &str {
        &self.0
    }
}

/// Axis-aligned rectangle in device pixels, origin top-left.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rect {
    pub x: i64,
    pub y: i64,
    pub width: i64,
    pub height: i64,
}

impl Rect {
    pub fn new(x: i64, y: i64, width: i64, height: i64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Integer center, rounding half-sizes down.
    pub fn center(&self) -> Point {
        Point::new(
            (self.x + self.width.div_euclid(2)) as f64,
            (self.y + self.height.div_euclid(2)) as f64,
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Size {
    pub width: i64,
    pub height: i64,
}

impl Size {
    /// The full screen as a rectangle anchored at the origin.
    pub fn as_rect(&self) -> Rect {
        Rect::new(0, 0, self.width, self.height)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, schemars::JsonSchema)]
#[serde(rename_all = "UPPERCASE")]
pub enum Orientation {
    Landscape,
    Portrait,
}

impl std::str::FromStr for Orientation {
    type Err = crate::error::AutomationError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_uppercase().as_str() {
            "LANDSCAPE" => Ok(Self::Landscape),
            "PORTRAIT" => Ok(Self::Portrait),
            _ => Err(crate::error::AutomationError::InvalidArgument(format!(
                "Unsupported orientation '{}', expected LANDSCAPE or PORTRAIT",
                s
            ))),
        }
    }
}

impl std::fmt::Display for Orientation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Landscape => f.write_str("LANDSCAPE"),
            Self::Portrait => f.write_str("PORTRAIT"),
        }
    }
}

/// A live automation session.
///
/// Implementations are not expected to tolerate concurrent use; the server
/// serializes every call behind one lock.
#[async_trait]
pub trait Driver: Send + Sync {
    async fn find_element(&self, locator: &Locator) -> Result<ElementHandle>;
    async fn find_elements(&self, locator: &Locator) -> Result<Vec<ElementHandle>>;

    async fn element_rect(&self, element: &ElementHandle) -> Result<Rect>;
    async fn element_text(&self, element: &ElementHandle) -> Result<String>;
    async fn element_tag_name(&self, element: &ElementHandle) -> Result<String>;
    async fn element_attribute(&self, element: &ElementHandle, name: &str)
        -> Result<Option<String>>;
    async fn is_displayed(&self, element: &ElementHandle) -> Result<bool>;
    async fn is_enabled(&self, element: &ElementHandle) -> Result<bool>;

    async fn click(&self, element: &ElementHandle) -> Result<()>;
    async fn clear(&self, element: &ElementHandle) -> Result<()>;
    async fn send_keys(&self, element: &ElementHandle, text: &str) -> Result<()>;

    async fn window_size(&self) -> Result<Size>;

    /// Run one W3C actions request; the sequences advance tick by tick together.
    async fn perform_actions(&self, sequences: &[PointerSequence]) -> Result<()>;

    /// Single-finger drag from `start` to `end`.
    async fn swipe(&self, start: Point, end: Point, duration_ms: u64) -> Result<()> {
        let drag = if duration_ms > 0 {
            duration_ms
        } else {
            DEFAULT_MOVE_DURATION_MS
        };
        let sequence = PointerSequence::touch("touch")
            .move_to(start, DEFAULT_MOVE_DURATION_MS)
            .press()
            .move_to(end, drag)
            .release();
        self.perform_actions(&[sequence]).await
    }

    async fn page_source(&self) -> Result<String>;
    async fn screenshot_base64(&self) -> Result<String>;

    async fn back(&self) -> Result<()>;
    async fn press_keycode(&self, keycode: u32) -> Result<()>;
    async fn launch_app(&self) -> Result<()>;
    async fn close_app(&self) -> Result<()>;
    async fn reset_app(&self) -> Result<()>;

    async fn device_time(&self) -> Result<String>;
    async fn orientation(&self) -> Result<Orientation>;
    async fn set_orientation(&self, orientation: Orientation) -> Result<()>;

    async fn current_context(&self) -> Result<Option<String>>;
    async fn contexts(&self) -> Result<Vec<String>>;
    async fn switch_context(&self, name: &str) -> Result<()>;
}
