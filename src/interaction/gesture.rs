//! Multi-touch gesture synthesis.
//!
//! Pinch and zoom are expressed as two touch inputs whose move actions are
//! emitted in lockstep: both sequences carry the same number of actions, so
//! the driver advances them tick by tick together.

use serde::Serialize;
use std::time::Duration;

use super::actions::{PointerSequence, DEFAULT_MOVE_DURATION_MS};
use super::wait::{self, Condition};
use crate::driver::{Driver, Rect};
use crate::error::{AutomationError, Result};
use crate::locator::Locator;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Offset along both axes by the same amount.
    fn shifted(&self, offset: f64) -> Self {
        Self::new(self.x + offset, self.y + offset)
    }

    fn lerp(&self, to: Point, progress: f64) -> Self {
        Self::new(
            self.x + (to.x - self.x) * progress,
            self.y + (to.y - self.y) * progress,
        )
    }

    pub fn distance_to(&self, other: Point) -> f64 {
        ((self.x - other.x).powi(2) + (self.y - other.y).powi(2)).sqrt()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TwoFingerGesture {
    Pinch,
    Zoom,
}

impl TwoFingerGesture {
    pub fn past_tense(&self) -> &'static str {
        match self {
            Self::Pinch => "Pinched",
            Self::Zoom => "Zoomed",
        }
    }
}

/// Geometry shared by pinch and zoom.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GestureSpec {
    pub center: Point,
    pub distance: f64,
    pub scale_factor: f64,
    pub steps: u32,
}

impl GestureSpec {
    pub fn new(region: Rect, percent: f64, steps: u32) -> Result<Self> {
        if region.width <= 0 || region.height <= 0 {
            return Err(AutomationError::InvalidRegion {
                width: region.width,
                height: region.height,
            });
        }
        if steps < 1 {
            return Err(AutomationError::InvalidArgument(
                "steps must be at least 1".to_string(),
            ));
        }
        if !percent.is_finite() {
            return Err(AutomationError::InvalidArgument(format!(
                "percent must be a finite number, got {}",
                percent
            )));
        }

        Ok(Self {
            center: region.center(),
            distance: region.width.min(region.height) as f64 / 4.0,
            scale_factor: percent / 100.0,
            steps,
        })
    }
}

/// Waypoints for one finger: the press location followed by `steps` moves.
#[derive(Debug, Clone, PartialEq)]
pub struct PointerPath {
    pub waypoints: Vec<Point>,
}

impl PointerPath {
    fn interpolate(start: Point, end: Point, steps: u32) -> Self {
        let mut waypoints = Vec::with_capacity(steps as usize + 1);
        waypoints.push(start);
        for i in 1..=steps {
            waypoints.push(start.lerp(end, progress(i, steps)));
        }
        Self { waypoints }
    }

    pub fn start(&self) -> Point {
        self.waypoints[0]
    }

    pub fn end(&self) -> Point {
        self.waypoints[self.waypoints.len() - 1]
    }
}

/// Fraction of the path covered after move `i` of `steps`.
pub fn progress(i: u32, steps: u32) -> f64 {
    i as f64 / steps as f64
}

#[derive(Debug, Clone, PartialEq)]
pub struct FingerPaths {
    pub first: PointerPath,
    pub second: PointerPath,
}

/// Fingers start on the diagonal at `distance` from center and converge.
pub fn pinch_paths(spec: &GestureSpec) -> FingerPaths {
    let reach = spec.distance * spec.scale_factor;
    FingerPaths {
        first: PointerPath::interpolate(
            spec.center.shifted(-spec.distance),
            spec.center.shifted(-reach),
            spec.steps,
        ),
        second: PointerPath::interpolate(
            spec.center.shifted(spec.distance),
            spec.center.shifted(reach),
            spec.steps,
        ),
    }
}

/// Fingers start half a `distance` from center and spread outward.
pub fn zoom_paths(spec: &GestureSpec) -> FingerPaths {
    let reach = spec.distance * spec.scale_factor;
    let near = spec.distance * 0.5;
    FingerPaths {
        first: PointerPath::interpolate(
            spec.center.shifted(-near),
            spec.center.shifted(-reach),
            spec.steps,
        ),
        second: PointerPath::interpolate(
            spec.center.shifted(near),
            spec.center.shifted(reach),
            spec.steps,
        ),
    }
}

pub fn paths_for(gesture: TwoFingerGesture, spec: &GestureSpec) -> FingerPaths {
    match gesture {
        TwoFingerGesture::Pinch => pinch_paths(spec),
        TwoFingerGesture::Zoom => zoom_paths(spec),
    }
}

fn finger_sequence(id: &str, path: &PointerPath) -> PointerSequence {
    let mut sequence = PointerSequence::touch(id)
        .move_to(path.start(), DEFAULT_MOVE_DURATION_MS)
        .press();
    for waypoint in &path.waypoints[1..] {
        sequence = sequence.move_to(*waypoint, DEFAULT_MOVE_DURATION_MS);
    }
    sequence.release()
}

/// Press both fingers, walk the waypoints together, release both.
pub fn two_finger_sequences(paths: &FingerPaths) -> [PointerSequence; 2] {
    [
        finger_sequence("finger1", &paths.first),
        finger_sequence("finger2", &paths.second),
    ]
}

pub fn long_press_sequence(center: Point, duration_ms: u64) -> PointerSequence {
    PointerSequence::touch("touch")
        .move_to(center, DEFAULT_MOVE_DURATION_MS)
        .press()
        .pause(duration_ms)
        .release()
}

/// Resolve the gesture target: the element's rectangle, or the whole window.
pub async fn resolve_region(
    driver: &dyn Driver,
    locator: Option<&Locator>,
    timeout: Duration,
) -> Result<Rect> {
    let region = match locator {
        Some(locator) => {
            let element =
                wait::wait_for_element(driver, locator, Condition::Present, timeout).await?;
            driver.element_rect(&element).await?
        }
        None => driver.window_size().await?.as_rect(),
    };

    if region.width <= 0 || region.height <= 0 {
        return Err(AutomationError::InvalidRegion {
            width: region.width,
            height: region.height,
        });
    }
    Ok(region)
}

/// Synthesize and perform a pinch or zoom over `region`.
pub async fn perform_two_finger(
    driver: &dyn Driver,
    gesture: TwoFingerGesture,
    region: Rect,
    percent: f64,
    steps: u32,
) -> Result<GestureSpec> {
    let spec = GestureSpec::new(region, percent, steps)?;
    let sequences = two_finger_sequences(&paths_for(gesture, &spec));

    tracing::debug!(
        "{:?} at ({}, {}) distance={} scale={} steps={}",
        gesture,
        spec.center.x,
        spec.center.y,
        spec.distance,
        spec.scale_factor,
        spec.steps
    );

    driver.perform_actions(&sequences).await?;
    Ok(spec)
}

/// Press and hold at the element's center.
pub async fn long_press(
    driver: &dyn Driver,
    locator: &Locator,
    duration_ms: u64,
    timeout: Duration,
) -> Result<Point> {
    let element = wait::wait_for_element(driver, locator, Condition::Present, timeout).await?;
    let center = driver.element_rect(&element).await?.center();
    driver
        .perform_actions(&[long_press_sequence(center, duration_ms)])
        .await?;
    Ok(center)
}
