use serde_json::{json, Map, Value};

use crate::error::{AutomationError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Platform {
    Android,
    Ios,
    Mac,
}

impl Platform {
    pub fn platform_name(&self) -> &'static str {
        match self {
            Self::Android => "Android",
            Self::Ios => "iOS",
            Self::Mac => "Mac",
        }
    }
}

impl std::fmt::Display for Platform {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.platform_name())
    }
}

/// Which app an Android session should start.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AndroidApp {
    Path(String),
    Activity { package: String, activity: String },
}

#[derive(Debug, Clone)]
pub struct AndroidCapabilities {
    pub app: AndroidApp,
    pub device_name: String,
    pub platform_version: String,
    pub automation_name: String,
    pub no_reset: bool,
    pub full_reset: bool,
    pub auto_grant_permissions: bool,
}

impl AndroidCapabilities {
    /// Pick the app source; a path wins over a package/activity pair.
    pub fn app_from(
        app_path: Option<&str>,
        app_package: Option<&str>,
        app_activity: Option<&str>,
    ) -> Result<AndroidApp> {
        match (non_empty(app_path), non_empty(app_package), non_empty(app_activity)) {
            (Some(path), _, _) => Ok(AndroidApp::Path(path.to_string())),
            (None, Some(package), Some(activity)) => Ok(AndroidApp::Activity {
                package: package.to_string(),
                activity: activity.to_string(),
            }),
            _ => Err(AutomationError::InvalidArgument(
                "Either app_path or both app_package and app_activity must be provided.".into(),
            )),
        }
    }

    pub fn to_w3c(&self) -> Value {
        let mut caps = Map::new();
        caps.insert("platformName".into(), json!(Platform::Android.platform_name()));
        insert_appium(&mut caps, "deviceName", json!(self.device_name));
        insert_appium(&mut caps, "platformVersion", json!(self.platform_version));
        insert_appium(&mut caps, "automationName", json!(self.automation_name));
        insert_appium(&mut caps, "noReset", json!(self.no_reset));
        insert_appium(&mut caps, "fullReset", json!(self.full_reset));
        insert_appium(
            &mut caps,
            "autoGrantPermissions",
            json!(self.auto_grant_permissions),
        );
        match &self.app {
            AndroidApp::Path(path) => insert_appium(&mut caps, "app", json!(path)),
            AndroidApp::Activity { package, activity } => {
                insert_appium(&mut caps, "appPackage", json!(package));
                insert_appium(&mut caps, "appActivity", json!(activity));
            }
        }
        wrap(caps)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IosApp {
    Path(String),
    BundleId(String),
}

#[derive(Debug, Clone)]
pub struct IosCapabilities {
    pub app: IosApp,
    pub device_name: String,
    pub platform_version: String,
    pub automation_name: String,
    pub no_reset: bool,
    pub full_reset: bool,
    pub auto_accept_alerts: bool,
}

impl IosCapabilities {
    pub fn app_from(app_path: Option<&str>, bundle_id: Option<&str>) -> Result<IosApp> {
        match (non_empty(app_path), non_empty(bundle_id)) {
            (Some(path), _) => Ok(IosApp::Path(path.to_string())),
            (None, Some(bundle_id)) => Ok(IosApp::BundleId(bundle_id.to_string())),
            _ => Err(AutomationError::InvalidArgument(
                "Either app_path or bundle_id must be provided.".into(),
            )),
        }
    }

    pub fn to_w3c(&self) -> Value {
        let mut caps = Map::new();
        caps.insert("platformName".into(), json!(Platform::Ios.platform_name()));
        insert_appium(&mut caps, "deviceName", json!(self.device_name));
        insert_appium(&mut caps, "platformVersion", json!(self.platform_version));
        insert_appium(&mut caps, "automationName", json!(self.automation_name));
        insert_appium(&mut caps, "noReset", json!(self.no_reset));
        insert_appium(&mut caps, "fullReset", json!(self.full_reset));
        insert_appium(&mut caps, "autoAcceptAlerts", json!(self.auto_accept_alerts));
        match &self.app {
            IosApp::Path(path) => insert_appium(&mut caps, "app", json!(path)),
            IosApp::BundleId(id) => insert_appium(&mut caps, "bundleId", json!(id)),
        }
        wrap(caps)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MacApp {
    Path(String),
    BundleId(String),
    Name(String),
}

#[derive(Debug, Clone)]
pub struct MacCapabilities {
    pub app: MacApp,
    pub automation_name: String,
}

impl MacCapabilities {
    pub fn app_from(
        app_path: Option<&str>,
        bundle_id: Option<&str>,
        app_name: Option<&str>,
    ) -> Result<MacApp> {
        match (non_empty(app_path), non_empty(bundle_id), non_empty(app_name)) {
            (Some(path), _, _) => Ok(MacApp::Path(path.to_string())),
            (None, Some(bundle_id), _) => Ok(MacApp::BundleId(bundle_id.to_string())),
            (None, None, Some(name)) => Ok(MacApp::Name(name.to_string())),
            _ => Err(AutomationError::InvalidArgument(
                "Either app_path, bundle_id, or app_name must be provided.".into(),
            )),
        }
    }

    pub fn to_w3c(&self) -> Value {
        let mut caps = Map::new();
        caps.insert("platformName".into(), json!(Platform::Mac.platform_name()));
        insert_appium(&mut caps, "automationName", json!(self.automation_name));
        match &self.app {
            MacApp::Path(path) => insert_appium(&mut caps, "app", json!(path)),
            MacApp::BundleId(id) => insert_appium(&mut caps, "bundleId", json!(id)),
            MacApp::Name(name) => insert_appium(&mut caps, "appName", json!(name)),
        }
        wrap(caps)
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.is_empty())
}

/// Vendor capabilities carry the `appium:` prefix under W3C rules.
fn insert_appium(caps: &mut Map<String, Value>, name: &str, value: Value) {
    caps.insert(format!("appium:{}", name), value);
}

fn wrap(always_match: Map<String, Value>) -> Value {
    json!({
        "capabilities": {
            "alwaysMatch": always_match,
            "firstMatch": [{}]
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn android(app: AndroidApp) -> AndroidCapabilities {
        AndroidCapabilities {
            app,
            device_name: "Android Emulator".into(),
            platform_version: "10.0".into(),
            automation_name: "UiAutomator2".into(),
            no_reset: false,
            full_reset: false,
            auto_grant_permissions: true,
        }
    }

    #[test]
    fn test_android_requires_app_source() {
        let err = AndroidCapabilities::app_from(None, Some("com.example"), None).unwrap_err();
        assert!(err
            .to_string()
            .contains("Either app_path or both app_package and app_activity"));
    }

    #[test]
    fn test_android_path_wins_over_activity() {
        let app =
            AndroidCapabilities::app_from(Some("/tmp/app.apk"), Some("com.example"), Some(".Main"))
                .unwrap();
        assert_eq!(app, AndroidApp::Path("/tmp/app.apk".into()));
    }

    #[test]
    fn test_android_capabilities_payload() {
        let caps = android(AndroidApp::Activity {
            package: "com.example".into(),
            activity: ".MainActivity".into(),
        })
        .to_w3c();
        let always = &caps["capabilities"]["alwaysMatch"];
        assert_eq!(always["platformName"], "Android");
        assert_eq!(always["appium:automationName"], "UiAutomator2");
        assert_eq!(always["appium:appPackage"], "com.example");
        assert_eq!(always["appium:appActivity"], ".MainActivity");
        assert_eq!(always["appium:autoGrantPermissions"], true);
        assert!(always.get("appium:app").is_none());
    }

    #[test]
    fn test_ios_bundle_id_payload() {
        let caps = IosCapabilities {
            app: IosCapabilities::app_from(None, Some("com.example.ios")).unwrap(),
            device_name: "iPhone Simulator".into(),
            platform_version: "15.0".into(),
            automation_name: "XCUITest".into(),
            no_reset: true,
            full_reset: false,
            auto_accept_alerts: true,
        }
        .to_w3c();
        let always = &caps["capabilities"]["alwaysMatch"];
        assert_eq!(always["platformName"], "iOS");
        assert_eq!(always["appium:bundleId"], "com.example.ios");
        assert_eq!(always["appium:noReset"], true);
    }

    #[test]
    fn test_mac_falls_back_to_app_name() {
        let app = MacCapabilities::app_from(None, Some(""), Some("Calculator")).unwrap();
        assert_eq!(app, MacApp::Name("Calculator".into()));
        let caps = MacCapabilities {
            app,
            automation_name: "Mac2".into(),
        }
        .to_w3c();
        assert_eq!(caps["capabilities"]["alwaysMatch"]["appium:appName"], "Calculator");
        assert!(MacCapabilities::app_from(None, None, None).is_err());
    }
}
