use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::Reply;
use crate::driver::{Driver, ElementHandle, Size};
use crate::error::Result;
use crate::interaction::gesture;
use crate::interaction::wait::{self, timeout_from_secs, Condition};
use crate::locator::Locator;

/// Attributes sampled when describing an element.
const DESCRIBED_ATTRIBUTES: [&str; 6] = [
    "resource-id",
    "content-desc",
    "text",
    "class",
    "enabled",
    "displayed",
];

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Location {
    pub x: i64,
    pub y: i64,
}

/// JSON-friendly view of an element.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ElementInfo {
    pub id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<Location>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size: Option<Size>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tag_name: Option<String>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty", default)]
    pub attributes: BTreeMap<String, Option<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_displayed: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_enabled: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ElementInfo {
    fn failed(element: &ElementHandle, message: String) -> Self {
        Self {
            id: element.id().to_string(),
            location: None,
            size: None,
            text: None,
            tag_name: None,
            attributes: BTreeMap::new(),
            is_displayed: None,
            is_enabled: None,
            error: Some(message),
        }
    }
}

async fn collect_info(driver: &dyn Driver, element: &ElementHandle) -> Result<ElementInfo> {
    let rect = driver.element_rect(element).await?;
    let text = driver.element_text(element).await?;
    let tag_name = driver.element_tag_name(element).await?;

    // Not every platform knows every attribute; skip the ones that fail.
    let mut attributes = BTreeMap::new();
    for name in DESCRIBED_ATTRIBUTES {
        if let Ok(value) = driver.element_attribute(element, name).await {
            attributes.insert(name.to_string(), value);
        }
    }

    Ok(ElementInfo {
        id: element.id().to_string(),
        location: Some(Location {
            x: rect.x,
            y: rect.y,
        }),
        size: Some(Size {
            width: rect.width,
            height: rect.height,
        }),
        text: Some(text),
        tag_name: Some(tag_name),
        attributes,
        is_displayed: driver.is_displayed(element).await.ok(),
        is_enabled: driver.is_enabled(element).await.ok(),
        error: None,
    })
}

/// Describe an element; property failures are reported inside the result.
pub async fn describe_element(driver: &dyn Driver, element: &ElementHandle) -> ElementInfo {
    match collect_info(driver, element).await {
        Ok(info) => info,
        Err(e) => {
            tracing::error!("Error describing element {}: {}", element.id(), e);
            ElementInfo::failed(element, e.to_string())
        }
    }
}

#[derive(Debug, Serialize, Deserialize, schemars::JsonSchema)]
pub struct LocateParams {
    #[schemars(
        description = "Locator strategy: id, xpath, accessibility_id, class_name, name, android_uiautomator, ios_predicate, ios_class_chain, ..."
    )]
    pub by: String,
    #[schemars(description = "Locator value")]
    pub value: String,
    #[schemars(description = "Seconds to wait for the element")]
    pub timeout: Option<f64>,
}

async fn locate(
    driver: &dyn Driver,
    params: &LocateParams,
    condition: Condition,
    default_timeout: f64,
) -> Result<(Locator, ElementHandle)> {
    let locator = Locator::parse(&params.by, &params.value)?;
    let timeout = timeout_from_secs(params.timeout.unwrap_or(default_timeout));
    let element = wait::wait_for_element(driver, &locator, condition, timeout).await?;
    Ok((locator, element))
}

pub async fn find_element(driver: &dyn Driver, params: &LocateParams) -> Result<Reply> {
    let (_, element) = locate(driver, params, Condition::Present, 10.0).await?;
    Ok(Reply::empty().with("element", describe_element(driver, &element).await))
}

pub async fn find_elements(driver: &dyn Driver, params: &LocateParams) -> Result<Reply> {
    let (locator, _) = locate(driver, params, Condition::Present, 10.0).await?;
    let mut elements = Vec::new();
    for element in driver.find_elements(&locator).await? {
        elements.push(describe_element(driver, &element).await);
    }
    Ok(Reply::empty()
        .with("count", elements.len())
        .with("elements", elements))
}

pub async fn wait_for_element(driver: &dyn Driver, params: &LocateParams) -> Result<Reply> {
    let (_, element) = locate(driver, params, Condition::Present, 20.0).await?;
    Ok(Reply::empty().with("element", describe_element(driver, &element).await))
}

pub async fn wait_for_element_to_be_clickable(
    driver: &dyn Driver,
    params: &LocateParams,
) -> Result<Reply> {
    let (_, element) = locate(driver, params, Condition::Clickable, 20.0).await?;
    Ok(Reply::empty().with("element", describe_element(driver, &element).await))
}

pub async fn tap_element(driver: &dyn Driver, params: &LocateParams) -> Result<Reply> {
    let (_, element) = locate(driver, params, Condition::Clickable, 10.0).await?;
    driver.click(&element).await?;
    Ok(Reply::ok(format!("Tapped element {}", params.value)))
}

pub async fn get_text(driver: &dyn Driver, params: &LocateParams) -> Result<Reply> {
    let (_, element) = locate(driver, params, Condition::Present, 10.0).await?;
    let text = driver.element_text(&element).await?;
    Ok(Reply::empty().with("text", text))
}

#[derive(Debug, Serialize, Deserialize, schemars::JsonSchema)]
pub struct LongPressParams {
    #[schemars(description = "Locator strategy")]
    pub by: String,
    #[schemars(description = "Locator value")]
    pub value: String,
    #[schemars(description = "How long to hold, in milliseconds (default: 1000)")]
    pub duration_ms: Option<u64>,
    #[schemars(description = "Seconds to wait for the element (default: 10)")]
    pub timeout: Option<f64>,
}

pub async fn long_press_element(driver: &dyn Driver, params: &LongPressParams) -> Result<Reply> {
    let locator = Locator::parse(&params.by, &params.value)?;
    let duration_ms = params.duration_ms.unwrap_or(1000);
    let timeout = timeout_from_secs(params.timeout.unwrap_or(10.0));

    gesture::long_press(driver, &locator, duration_ms, timeout).await?;
    Ok(Reply::ok(format!(
        "Long pressed element {} for {}ms",
        params.value, duration_ms
    )))
}

#[derive(Debug, Serialize, Deserialize, schemars::JsonSchema)]
pub struct SetTextParams {
    #[schemars(description = "Locator strategy")]
    pub by: String,
    #[schemars(description = "Locator value")]
    pub value: String,
    #[schemars(description = "Text to enter")]
    pub text: String,
    #[schemars(description = "Clear the field before typing (default: true)")]
    pub clear_first: Option<bool>,
    #[schemars(description = "Seconds to wait for the element (default: 10)")]
    pub timeout: Option<f64>,
}

pub async fn set_text(driver: &dyn Driver, params: &SetTextParams) -> Result<Reply> {
    let locator = Locator::parse(&params.by, &params.value)?;
    let timeout = timeout_from_secs(params.timeout.unwrap_or(10.0));
    let element = wait::wait_for_element(driver, &locator, Condition::Present, timeout).await?;

    if params.clear_first.unwrap_or(true) {
        driver.clear(&element).await?;
    }
    driver.send_keys(&element, &params.text).await?;

    Ok(Reply::ok(format!(
        "Set text '{}' on element {}",
        params.text, params.value
    )))
}

#[derive(Debug, Serialize, Deserialize, schemars::JsonSchema)]
pub struct GetAttributeParams {
    #[schemars(description = "Locator strategy")]
    pub by: String,
    #[schemars(description = "Locator value")]
    pub value: String,
    #[schemars(description = "Attribute name, e.g. resource-id, content-desc, checked")]
    pub attribute: String,
    #[schemars(description = "Seconds to wait for the element (default: 10)")]
    pub timeout: Option<f64>,
}

pub async fn get_attribute(driver: &dyn Driver, params: &GetAttributeParams) -> Result<Reply> {
    let locator = Locator::parse(&params.by, &params.value)?;
    let timeout = timeout_from_secs(params.timeout.unwrap_or(10.0));
    let element = wait::wait_for_element(driver, &locator, Condition::Present, timeout).await?;
    let value = driver.element_attribute(&element, &params.attribute).await?;

    Ok(Reply::empty()
        .with("attribute", &params.attribute)
        .with("value", value))
}
