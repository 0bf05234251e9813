use std::time::{Duration, Instant};

use crate::driver::{Driver, ElementHandle};
use crate::error::{AutomationError, Result};
use crate::locator::Locator;

pub const POLL_INTERVAL: Duration = Duration::from_millis(500);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Condition {
    /// The element is attached to the hierarchy.
    Present,
    /// The element is displayed and enabled.
    Clickable,
}

/// Convert a caller timeout in seconds. Negatives and NaN become zero; values
/// too large for a `Duration` saturate.
pub fn timeout_from_secs(secs: f64) -> Duration {
    if secs > 0.0 {
        Duration::try_from_secs_f64(secs).unwrap_or(Duration::MAX)
    } else {
        Duration::ZERO
    }
}

async fn satisfies(
    driver: &dyn Driver,
    element: &ElementHandle,
    condition: Condition,
) -> Result<bool> {
    match condition {
        Condition::Present => Ok(true),
        Condition::Clickable => {
            Ok(driver.is_displayed(element).await? && driver.is_enabled(element).await?)
        }
    }
}

/// Poll until `locator` resolves to an element meeting `condition`.
///
/// Lookup is attempted at least once. "No such element" keeps polling; any
/// other driver failure is returned immediately.
pub async fn wait_for_element(
    driver: &dyn Driver,
    locator: &Locator,
    condition: Condition,
    timeout: Duration,
) -> Result<ElementHandle> {
    let start = Instant::now();
    loop {
        let last_error = match driver.find_element(locator).await {
            Ok(element) => match satisfies(driver, &element, condition).await {
                Ok(true) => return Ok(element),
                Ok(false) => None,
                Err(e) if e.is_not_found() => Some(e),
                Err(e) => return Err(e),
            },
            Err(e) if e.is_not_found() => Some(e),
            Err(e) => return Err(e),
        };

        if start.elapsed() >= timeout {
            if timeout.is_zero() {
                if let Some(e) = last_error {
                    return Err(e);
                }
            }
            let what = match condition {
                Condition::Present => "element",
                Condition::Clickable => "clickable element",
            };
            return Err(AutomationError::Timeout(format!(
                "waited {:.1}s for {}: {}",
                timeout.as_secs_f64(),
                what,
                locator
            )));
        }

        tokio::time::sleep(POLL_INTERVAL.min(timeout.saturating_sub(start.elapsed()))).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timeout_from_secs() {
        assert_eq!(timeout_from_secs(10.0), Duration::from_secs(10));
        assert_eq!(timeout_from_secs(0.25), Duration::from_millis(250));
        assert_eq!(timeout_from_secs(-1.0), Duration::ZERO);
        assert_eq!(timeout_from_secs(f64::NAN), Duration::ZERO);
    }

    #[test]
    fn test_huge_timeout_saturates() {
        assert_eq!(timeout_from_secs(1e30), Duration::MAX);
        assert_eq!(timeout_from_secs(f64::INFINITY), Duration::MAX);
    }
}
