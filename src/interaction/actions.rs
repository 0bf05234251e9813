use serde::{Serialize, Serializer};

use super::gesture::Point;

/// Duration of each pointer move, matching the client libraries' default.
pub const DEFAULT_MOVE_DURATION_MS: u64 = 250;

const PRIMARY_BUTTON: u8 = 0;

/// W3C coordinates are integers; waypoints are computed in floating point.
fn round_coord<S: Serializer>(value: &f64, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_i64(value.round() as i64)
}

/// One tick of a pointer input source.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum PointerAction {
    PointerMove {
        duration: u64,
        #[serde(serialize_with = "round_coord")]
        x: f64,
        #[serde(serialize_with = "round_coord")]
        y: f64,
    },
    PointerDown {
        button: u8,
    },
    PointerUp {
        button: u8,
    },
    Pause {
        duration: u64,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PointerParameters {
    pub pointer_type: &'static str,
}

/// A named touch input and the actions it performs.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PointerSequence {
    #[serde(rename = "type")]
    kind: &'static str,
    pub id: String,
    pub parameters: PointerParameters,
    pub actions: Vec<PointerAction>,
}

impl PointerSequence {
    pub fn touch(id: impl Into<String>) -> Self {
        Self {
            kind: "pointer",
            id: id.into(),
            parameters: PointerParameters {
                pointer_type: "touch",
            },
            actions: Vec::new(),
        }
    }

    pub fn move_to(mut self, point: Point, duration_ms: u64) -> Self {
        self.actions.push(PointerAction::PointerMove {
            duration: duration_ms,
            x: point.x,
            y: point.y,
        });
        self
    }

    pub fn press(mut self) -> Self {
        self.actions.push(PointerAction::PointerDown {
            button: PRIMARY_BUTTON,
        });
        self
    }

    pub fn pause(mut self, duration_ms: u64) -> Self {
        self.actions.push(PointerAction::Pause {
            duration: duration_ms,
        });
        self
    }

    pub fn release(mut self) -> Self {
        self.actions.push(PointerAction::PointerUp {
            button: PRIMARY_BUTTON,
        });
        self
    }

    /// Points visited by move actions, in order.
    pub fn move_targets(&self) -> Vec<Point> {
        self.actions
            .iter()
            .filter_map(|action| match action {
                PointerAction::PointerMove { x, y, .. } => Some(Point::new(*x, *y)),
                _ => None,
            })
            .collect()
    }
}

/// Request body for `POST /session/{id}/actions`.
pub fn actions_body(sequences: &[PointerSequence]) -> serde_json::Value {
    serde_json::json!({ "actions": sequences })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_touch_sequence_wire_format() {
        let sequence = PointerSequence::touch("finger1")
            .move_to(Point::new(99.6, 10.2), DEFAULT_MOVE_DURATION_MS)
            .press()
            .pause(1000)
            .release();

        let body = actions_body(&[sequence]);
        assert_eq!(
            body,
            json!({
                "actions": [{
                    "type": "pointer",
                    "id": "finger1",
                    "parameters": { "pointerType": "touch" },
                    "actions": [
                        { "type": "pointerMove", "duration": 250, "x": 100, "y": 10 },
                        { "type": "pointerDown", "button": 0 },
                        { "type": "pause", "duration": 1000 },
                        { "type": "pointerUp", "button": 0 }
                    ]
                }]
            })
        );
    }

    #[test]
    fn test_move_targets_skip_non_moves() {
        let sequence = PointerSequence::touch("touch")
            .move_to(Point::new(1.0, 2.0), 0)
            .press()
            .move_to(Point::new(3.0, 4.0), 500)
            .release();
        assert_eq!(
            sequence.move_targets(),
            vec![Point::new(1.0, 2.0), Point::new(3.0, 4.0)]
        );
    }
}
