use reqwest::{Client, Method};
use serde_json::{json, Value};
use std::time::Duration;

use crate::error::{AutomationError, Result};

/// W3C element reference key; `ELEMENT` is the legacy JSON Wire name.
pub const ELEMENT_KEY: &str = "element-6066-11e4-a52e-4f735466cecf";
const LEGACY_ELEMENT_KEY: &str = "ELEMENT";

/// Thin HTTP client for a WebDriver endpoint such as an Appium server.
#[derive(Debug, Clone)]
pub struct WebDriverClient {
    http: Client,
    base_url: String,
}

/// A session as reported by `POST /session`.
#[derive(Debug, Clone)]
pub struct NewSession {
    pub session_id: String,
    pub capabilities: Value,
}

impl WebDriverClient {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        let http = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub async fn get(&self, path: &str) -> Result<Value> {
        self.value(Method::GET, path, None).await
    }

    pub async fn post(&self, path: &str, body: Value) -> Result<Value> {
        self.value(Method::POST, path, Some(body)).await
    }

    pub async fn delete(&self, path: &str) -> Result<Value> {
        self.value(Method::DELETE, path, None).await
    }

    /// Open a session with the given W3C capabilities payload.
    pub async fn create_session(&self, capabilities: Value) -> Result<NewSession> {
        let body = self.send(Method::POST, "/session", Some(capabilities)).await?;
        parse_new_session(&body)
    }

    async fn value(&self, method: Method, path: &str, body: Option<Value>) -> Result<Value> {
        let mut body = self.send(method, path, body).await?;
        Ok(body.get_mut("value").map(Value::take).unwrap_or(Value::Null))
    }

    async fn send(&self, method: Method, path: &str, body: Option<Value>) -> Result<Value> {
        let url = format!("{}{}", self.base_url, path);
        tracing::debug!("{} {}", method, url);

        let mut request = self.http.request(method, &url);
        if let Some(body) = body {
            request = request.json(&body);
        }

        let response = request.send().await?;
        let status = response.status();
        let bytes = response.bytes().await?;
        let body: Value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or_else(|_| {
                json!({ "value": { "message": String::from_utf8_lossy(&bytes) } })
            })
        };

        if !status.is_success() {
            return Err(map_error(status.as_u16(), &body));
        }
        Ok(body)
    }
}

/// Read the session id and capabilities from either W3C or legacy responses.
pub fn parse_new_session(body: &Value) -> Result<NewSession> {
    let value = body.get("value").unwrap_or(&Value::Null);

    let session_id = value
        .get("sessionId")
        .or_else(|| body.get("sessionId"))
        .and_then(Value::as_str)
        .ok_or_else(|| AutomationError::Driver("New session response had no sessionId".into()))?
        .to_string();

    let capabilities = value
        .get("capabilities")
        .cloned()
        .unwrap_or_else(|| value.clone());

    Ok(NewSession {
        session_id,
        capabilities,
    })
}

/// Map a WebDriver error response onto the error taxonomy.
pub fn map_error(status: u16, body: &Value) -> AutomationError {
    let value = body.get("value").unwrap_or(body);
    let code = value.get("error").and_then(Value::as_str).unwrap_or("");
    let message = value
        .get("message")
        .and_then(Value::as_str)
        .filter(|m| !m.is_empty())
        .map(str::to_string)
        .unwrap_or_else(|| format!("WebDriver request failed with HTTP {}", status));

    match code {
        "no such element" => AutomationError::ElementNotFound(message),
        "timeout" | "script timeout" => AutomationError::Timeout(message),
        "" => AutomationError::Driver(message),
        code => AutomationError::Driver(format!("{}: {}", code, message)),
    }
}

/// Extract the element id from a find-element `value`.
pub fn element_id(value: &Value) -> Option<String> {
    value
        .get(ELEMENT_KEY)
        .or_else(|| value.get(LEGACY_ELEMENT_KEY))
        .and_then(Value::as_str)
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_map_no_such_element() {
        let body = json!({
            "value": {
                "error": "no such element",
                "message": "An element could not be located on the page using the given search parameters.",
                "stacktrace": ""
            }
        });
        let err = map_error(404, &body);
        assert!(matches!(err, AutomationError::ElementNotFound(_)));
        assert!(err.to_string().contains("could not be located"));
    }

    #[test]
    fn test_map_timeout() {
        let body = json!({ "value": { "error": "timeout", "message": "took too long" } });
        assert_eq!(map_error(500, &body).kind(), "Timeout");
    }

    #[test]
    fn test_map_other_errors_keep_code() {
        let body = json!({
            "value": { "error": "stale element reference", "message": "element is gone" }
        });
        let err = map_error(404, &body);
        assert_eq!(err.kind(), "DriverError");
        assert_eq!(err.to_string(), "stale element reference: element is gone");
    }

    #[test]
    fn test_map_error_without_body() {
        let err = map_error(502, &Value::Null);
        assert_eq!(err.to_string(), "WebDriver request failed with HTTP 502");
    }

    #[test]
    fn test_element_id_accepts_both_keys() {
        assert_eq!(
            element_id(&json!({ "element-6066-11e4-a52e-4f735466cecf": "abc" })),
            Some("abc".to_string())
        );
        assert_eq!(element_id(&json!({ "ELEMENT": "42" })), Some("42".to_string()));
        assert_eq!(element_id(&json!({ "other": "x" })), None);
    }

    #[test]
    fn test_parse_w3c_session() {
        let body = json!({
            "value": {
                "sessionId": "s-1",
                "capabilities": { "platformName": "Android" }
            }
        });
        let session = parse_new_session(&body).unwrap();
        assert_eq!(session.session_id, "s-1");
        assert_eq!(session.capabilities["platformName"], "Android");
    }

    #[test]
    fn test_parse_legacy_session() {
        let body = json!({ "sessionId": "s-2", "status": 0, "value": { "platformName": "iOS" } });
        let session = parse_new_session(&body).unwrap();
        assert_eq!(session.session_id, "s-2");
        assert_eq!(session.capabilities["platformName"], "iOS");
    }

    #[test]
    fn test_parse_session_without_id_fails() {
        assert!(parse_new_session(&json!({ "value": {} })).is_err());
    }

    #[test]
    fn test_base_url_trailing_slash_is_trimmed() {
        let client =
            WebDriverClient::new("http://localhost:4723/wd/hub/", Duration::from_secs(5)).unwrap();
        assert_eq!(client.base_url(), "http://localhost:4723/wd/hub");
    }
}
