pub mod app;
pub mod device;
pub mod element;
pub mod gesture;
pub mod report;
pub mod session;

use serde::Serialize;
use serde_json::{Map, Value};

/// Uniform `{success, message, ...}` reply of a tool call.
#[derive(Debug, Clone, Serialize)]
pub struct Reply {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(flatten)]
    pub data: Map<String, Value>,
}

impl Reply {
    pub fn ok(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: Some(message.into()),
            data: Map::new(),
        }
    }

    /// Success carrying only data fields.
    pub fn empty() -> Self {
        Self {
            success: true,
            message: None,
            data: Map::new(),
        }
    }

    /// A completed call whose outcome was negative, e.g. a search that found nothing.
    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: Some(message.into()),
            data: Map::new(),
        }
    }

    pub fn with(mut self, key: &str, value: impl Serialize) -> Self {
        let value = serde_json::to_value(value).unwrap_or(Value::Null);
        self.data.insert(key.to_string(), value);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_reply_flattens_data() {
        let reply = Reply::ok("Got text").with("text", "Hello");
        assert_eq!(
            serde_json::to_value(&reply).unwrap(),
            json!({ "success": true, "message": "Got text", "text": "Hello" })
        );
    }

    #[test]
    fn test_empty_reply_omits_message() {
        let reply = Reply::empty().with("orientation", "PORTRAIT");
        assert_eq!(
            serde_json::to_value(&reply).unwrap(),
            json!({ "success": true, "orientation": "PORTRAIT" })
        );
    }
}
