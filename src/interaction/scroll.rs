use std::str::FromStr;

use super::gesture::Point;
use crate::driver::{Driver, ElementHandle, Size};
use crate::error::{AutomationError, Result};
use crate::locator::Locator;

/// Every search swipe lasts this long.
pub const SWIPE_DURATION_MS: u64 = 500;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Up,
    Down,
}

impl FromStr for Direction {
    type Err = AutomationError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "up" => Ok(Self::Up),
            "down" => Ok(Self::Down),
            _ => Err(AutomationError::InvalidArgument(format!(
                "Unsupported scroll direction '{}', expected up or down",
                s
            ))),
        }
    }
}

/// Start and end of the swipe issued between lookups.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SwipeVector {
    pub start: Point,
    pub end: Point,
}

impl SwipeVector {
    /// Vertical swipe through the middle of the window, between 80% and 20% of its height.
    pub fn for_window(size: Size, direction: Direction) -> Self {
        let x = size.width.div_euclid(2) as f64;
        let low = size.height as f64 * 0.8;
        let high = size.height as f64 * 0.2;
        let (from, to) = match direction {
            Direction::Down => (low, high),
            Direction::Up => (high, low),
        };
        Self {
            start: Point::new(x, from),
            end: Point::new(x, to),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ScrollOutcome {
    /// The element, if a lookup succeeded.
    pub element: Option<ElementHandle>,
    /// Swipes issued before the search ended.
    pub swipes: u32,
}

/// Alternate lookups and swipes until the element appears or `max_attempts` is spent.
///
/// Every failed lookup is followed by one swipe, including the last one, so an
/// exhausted search has issued exactly `max_attempts` swipes. Lookup failures of
/// any kind count as "not yet visible"; a failing swipe aborts the search.
pub async fn scroll_to_element(
    driver: &dyn Driver,
    locator: &Locator,
    direction: Direction,
    max_attempts: u32,
) -> Result<ScrollOutcome> {
    let vector = SwipeVector::for_window(driver.window_size().await?, direction);

    for attempt in 0..max_attempts {
        match driver.find_element(locator).await {
            Ok(element) => {
                tracing::debug!("Found {} after {} swipes", locator, attempt);
                return Ok(ScrollOutcome {
                    element: Some(element),
                    swipes: attempt,
                });
            }
            Err(e) => {
                tracing::debug!("Attempt {} for {} failed: {}", attempt, locator, e);
                driver
                    .swipe(vector.start, vector.end, SWIPE_DURATION_MS)
                    .await?;
            }
        }
    }

    Ok(ScrollOutcome {
        element: None,
        swipes: max_attempts,
    })
}
