use serde::{Deserialize, Serialize};
use std::time::Duration;

use super::element::describe_element;
use super::Reply;
use crate::driver::Driver;
use crate::error::{AutomationError, Result};
use crate::interaction::gesture::{self, Point, TwoFingerGesture};
use crate::interaction::scroll::{self, Direction};
use crate::interaction::wait::timeout_from_secs;
use crate::locator::Locator;

#[derive(Debug, Serialize, Deserialize, schemars::JsonSchema)]
pub struct SwipeParams {
    pub start_x: i64,
    pub start_y: i64,
    pub end_x: i64,
    pub end_y: i64,
    #[schemars(description = "Swipe duration in milliseconds (default: 500)")]
    pub duration_ms: Option<u64>,
}

pub async fn swipe(driver: &dyn Driver, params: &SwipeParams) -> Result<Reply> {
    let start = Point::new(params.start_x as f64, params.start_y as f64);
    let end = Point::new(params.end_x as f64, params.end_y as f64);
    driver
        .swipe(start, end, params.duration_ms.unwrap_or(500))
        .await?;
    Ok(Reply::ok(format!(
        "Swiped from ({}, {}) to ({}, {})",
        params.start_x, params.start_y, params.end_x, params.end_y
    )))
}

#[derive(Debug, Serialize, Deserialize, schemars::JsonSchema)]
pub struct ScrollToElementParams {
    #[schemars(description = "Locator strategy")]
    pub by: String,
    #[schemars(description = "Locator value")]
    pub value: String,
    #[schemars(description = "Scroll direction: up or down (default: down)")]
    pub direction: Option<String>,
    #[schemars(description = "Maximum number of lookups, each failed one followed by a swipe (default: 10)")]
    pub max_swipes: Option<u32>,
}

pub async fn scroll_to_element(driver: &dyn Driver, params: &ScrollToElementParams) -> Result<Reply> {
    let locator = Locator::parse(&params.by, &params.value)?;
    let direction: Direction = params.direction.as_deref().unwrap_or("down").parse()?;
    let max_swipes = params.max_swipes.unwrap_or(10);

    let outcome = scroll::scroll_to_element(driver, &locator, direction, max_swipes).await?;
    match outcome.element {
        Some(element) => Ok(Reply::ok(format!("Found element after {} swipes", outcome.swipes))
            .with("element", describe_element(driver, &element).await)),
        None => Ok(Reply::failed(format!(
            "Element not found after {} swipes",
            outcome.swipes
        ))),
    }
}

#[derive(Debug, Serialize, Deserialize, schemars::JsonSchema)]
pub struct PinchParams {
    #[schemars(description = "Locator strategy of the element to pinch (omit for the whole screen)")]
    pub element_by: Option<String>,
    #[schemars(description = "Locator value of the element to pinch")]
    pub element_value: Option<String>,
    #[schemars(description = "Final finger spread as a percentage of the initial spread (default: 50)")]
    pub percent: Option<f64>,
    #[schemars(description = "Number of interpolated moves per finger (default: 10)")]
    pub steps: Option<i64>,
    #[schemars(description = "Seconds to wait for the element (default: look up once)")]
    pub timeout: Option<f64>,
}

#[derive(Debug, Serialize, Deserialize, schemars::JsonSchema)]
pub struct ZoomParams {
    #[schemars(description = "Locator strategy of the element to zoom (omit for the whole screen)")]
    pub element_by: Option<String>,
    #[schemars(description = "Locator value of the element to zoom")]
    pub element_value: Option<String>,
    #[schemars(description = "Final finger spread as a percentage of the gesture distance (default: 200)")]
    pub percent: Option<f64>,
    #[schemars(description = "Number of interpolated moves per finger (default: 10)")]
    pub steps: Option<i64>,
    #[schemars(description = "Seconds to wait for the element (default: look up once)")]
    pub timeout: Option<f64>,
}

/// Caller-supplied values print as given; an omitted percent prints as the
/// float default, e.g. `50.0`.
fn percent_label(percent: Option<f64>, default_percent: f64) -> String {
    match percent {
        Some(percent) => percent.to_string(),
        None => format!("{:.1}", default_percent),
    }
}

fn checked_steps(steps: i64) -> Result<u32> {
    u32::try_from(steps)
        .ok()
        .filter(|steps| *steps >= 1)
        .ok_or_else(|| {
            AutomationError::InvalidArgument(format!("steps must be at least 1, got {}", steps))
        })
}

async fn two_finger(
    driver: &dyn Driver,
    gesture_kind: TwoFingerGesture,
    element_by: Option<&str>,
    element_value: Option<&str>,
    percent: Option<f64>,
    default_percent: f64,
    steps: i64,
    timeout: Option<f64>,
) -> Result<Reply> {
    let steps = checked_steps(steps)?;
    let locator = Locator::parse_optional(element_by, element_value)?;
    let timeout = timeout.map(timeout_from_secs).unwrap_or(Duration::ZERO);
    let label = percent_label(percent, default_percent);
    let percent = percent.unwrap_or(default_percent);

    let region = gesture::resolve_region(driver, locator.as_ref(), timeout).await?;
    gesture::perform_two_finger(driver, gesture_kind, region, percent, steps).await?;

    let target = match &locator {
        Some(locator) => format!("element {}", locator.value),
        None => "screen".to_string(),
    };
    Ok(Reply::ok(format!(
        "{} {} by {}%",
        gesture_kind.past_tense(),
        target,
        label
    )))
}

pub async fn pinch(driver: &dyn Driver, params: &PinchParams) -> Result<Reply> {
    two_finger(
        driver,
        TwoFingerGesture::Pinch,
        params.element_by.as_deref(),
        params.element_value.as_deref(),
        params.percent,
        50.0,
        params.steps.unwrap_or(10),
        params.timeout,
    )
    .await
}

pub async fn zoom(driver: &dyn Driver, params: &ZoomParams) -> Result<Reply> {
    two_finger(
        driver,
        TwoFingerGesture::Zoom,
        params.element_by.as_deref(),
        params.element_value.as_deref(),
        params.percent,
        200.0,
        params.steps.unwrap_or(10),
        params.timeout,
    )
    .await
}
