use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{AutomationError, Result};

/// Element lookup strategies understood by Appium.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, schemars::JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum LocatorStrategy {
    Id,
    Xpath,
    AccessibilityId,
    ClassName,
    Name,
    TagName,
    CssSelector,
    LinkText,
    PartialLinkText,
    AndroidUiautomator,
    AndroidViewtag,
    AndroidDataMatcher,
    AndroidViewMatcher,
    IosPredicate,
    IosClassChain,
    Image,
    Custom,
}

impl LocatorStrategy {
    pub const ALL: [LocatorStrategy; 17] = [
        Self::Id,
        Self::Xpath,
        Self::AccessibilityId,
        Self::ClassName,
        Self::Name,
        Self::TagName,
        Self::CssSelector,
        Self::LinkText,
        Self::PartialLinkText,
        Self::AndroidUiautomator,
        Self::AndroidViewtag,
        Self::AndroidDataMatcher,
        Self::AndroidViewMatcher,
        Self::IosPredicate,
        Self::IosClassChain,
        Self::Image,
        Self::Custom,
    ];

    /// The `using` value sent in a find-element request.
    pub fn wire_name(&self) -> &'static str {
        match self {
            Self::Id => "id",
            Self::Xpath => "xpath",
            Self::AccessibilityId => "accessibility id",
            Self::ClassName => "class name",
            Self::Name => "name",
            Self::TagName => "tag name",
            Self::CssSelector => "css selector",
            Self::LinkText => "link text",
            Self::PartialLinkText => "partial link text",
            Self::AndroidUiautomator => "-android uiautomator",
            Self::AndroidViewtag => "-android viewtag",
            Self::AndroidDataMatcher => "-android datamatcher",
            Self::AndroidViewMatcher => "-android viewmatcher",
            Self::IosPredicate => "-ios predicate string",
            Self::IosClassChain => "-ios class chain",
            Self::Image => "-image",
            Self::Custom => "-custom",
        }
    }

    fn canonical_name(&self) -> &'static str {
        match self {
            Self::Id => "id",
            Self::Xpath => "xpath",
            Self::AccessibilityId => "accessibility_id",
            Self::ClassName => "class_name",
            Self::Name => "name",
            Self::TagName => "tag_name",
            Self::CssSelector => "css_selector",
            Self::LinkText => "link_text",
            Self::PartialLinkText => "partial_link_text",
            Self::AndroidUiautomator => "android_uiautomator",
            Self::AndroidViewtag => "android_viewtag",
            Self::AndroidDataMatcher => "android_data_matcher",
            Self::AndroidViewMatcher => "android_view_matcher",
            Self::IosPredicate => "ios_predicate",
            Self::IosClassChain => "ios_class_chain",
            Self::Image => "image",
            Self::Custom => "custom",
        }
    }
}

/// Fold a user-supplied strategy name into `snake_case` without a leading dash.
fn normalize(name: &str) -> String {
    name.trim()
        .trim_start_matches('-')
        .chars()
        .map(|c| match c {
            ' ' | '-' => '_',
            c => c.to_ascii_lowercase(),
        })
        .collect()
}

impl FromStr for LocatorStrategy {
    type Err = AutomationError;

    fn from_str(s: &str) -> Result<Self> {
        let wanted = normalize(s);
        let found = Self::ALL.iter().copied().find(|strategy| {
            strategy.canonical_name() == wanted || normalize(strategy.wire_name()) == wanted
        });

        // Accept the short forms of the two iOS wire names.
        let found = found.or(match wanted.as_str() {
            "ios_predicate_string" | "predicate" => Some(Self::IosPredicate),
            "class_chain" => Some(Self::IosClassChain),
            _ => None,
        });

        found.ok_or_else(|| {
            AutomationError::InvalidArgument(format!("Unsupported locator strategy: '{}'", s))
        })
    }
}

impl fmt::Display for LocatorStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.canonical_name())
    }
}

/// A (strategy, value) pair identifying a UI element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Locator {
    pub strategy: LocatorStrategy,
    pub value: String,
}

impl Locator {
    pub fn new(strategy: LocatorStrategy, value: impl Into<String>) -> Self {
        Self {
            strategy,
            value: value.into(),
        }
    }

    /// Validate a strategy name coming in from a tool call.
    pub fn parse(by: &str, value: &str) -> Result<Self> {
        if value.is_empty() {
            return Err(AutomationError::InvalidArgument(
                "Locator value must not be empty".to_string(),
            ));
        }
        Ok(Self::new(by.parse()?, value))
    }

    /// Parse an optional pair; the element is only targeted when both halves are present.
    pub fn parse_optional(by: Option<&str>, value: Option<&str>) -> Result<Option<Self>> {
        match (by, value) {
            (Some(by), Some(value)) if !by.is_empty() && !value.is_empty() => {
                Self::parse(by, value).map(Some)
            }
            _ => Ok(None),
        }
    }
}

impl fmt::Display for Locator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}={}", self.strategy, self.value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_upper_case_names() {
        assert_eq!("ID".parse::<LocatorStrategy>().unwrap(), LocatorStrategy::Id);
        assert_eq!(
            "ACCESSIBILITY_ID".parse::<LocatorStrategy>().unwrap(),
            LocatorStrategy::AccessibilityId
        );
        assert_eq!(
            "ANDROID_UIAUTOMATOR".parse::<LocatorStrategy>().unwrap(),
            LocatorStrategy::AndroidUiautomator
        );
    }

    #[test]
    fn test_parse_wire_names() {
        assert_eq!(
            "accessibility id".parse::<LocatorStrategy>().unwrap(),
            LocatorStrategy::AccessibilityId
        );
        assert_eq!(
            "-ios predicate string".parse::<LocatorStrategy>().unwrap(),
            LocatorStrategy::IosPredicate
        );
        assert_eq!(
            "-android uiautomator".parse::<LocatorStrategy>().unwrap(),
            LocatorStrategy::AndroidUiautomator
        );
        assert_eq!(
            "class name".parse::<LocatorStrategy>().unwrap(),
            LocatorStrategy::ClassName
        );
    }

    #[test]
    fn test_every_strategy_round_trips_through_its_names() {
        for strategy in LocatorStrategy::ALL {
            assert_eq!(strategy.wire_name().parse::<LocatorStrategy>().unwrap(), strategy);
            assert_eq!(strategy.to_string().parse::<LocatorStrategy>().unwrap(), strategy);
        }
    }

    #[test]
    fn test_parse_rejects_unknown_strategy() {
        let err = "by_magic".parse::<LocatorStrategy>().unwrap_err();
        assert_eq!(err.kind(), "InvalidArgument");
        assert!(err.to_string().contains("by_magic"));
    }

    #[test]
    fn test_locator_rejects_empty_value() {
        let err = Locator::parse("id", "").unwrap_err();
        assert!(matches!(err, AutomationError::InvalidArgument(_)));
    }

    #[test]
    fn test_parse_optional_needs_both_halves() {
        assert_eq!(Locator::parse_optional(Some("id"), None).unwrap(), None);
        assert_eq!(Locator::parse_optional(None, Some("login")).unwrap(), None);
        assert_eq!(
            Locator::parse_optional(Some("id"), Some("login")).unwrap(),
            Some(Locator::new(LocatorStrategy::Id, "login"))
        );
        assert!(Locator::parse_optional(Some("nope"), Some("login")).is_err());
    }
}
