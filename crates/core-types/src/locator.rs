//! Locator types

use serde::{Deserialize, Serialize};
use std::fmt;

/// Lookup strategy understood by the automation driver
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LocatorStrategy {
    /// Resource id (`com.app:id/btn_login`)
    Id,

    /// Accessibility id / content description
    AccessibilityId,

    /// XPath query over the UI hierarchy
    XPath,

    /// Element class / type name
    ClassName,

    /// Element name attribute
    Name,

    /// UiAutomator selector (Android)
    AndroidUiAutomator,

    /// NSPredicate string (iOS)
    IosPredicate,

    /// Class chain query (iOS)
    IosClassChain,
}

impl LocatorStrategy {
    /// Wire name used by the driver protocol
    pub fn as_str(&self) -> &'static str {
        match self {
            LocatorStrategy::Id => "id",
            LocatorStrategy::AccessibilityId => "accessibility id",
            LocatorStrategy::XPath => "xpath",
            LocatorStrategy::ClassName => "class name",
            LocatorStrategy::Name => "name",
            LocatorStrategy::AndroidUiAutomator => "-android uiautomator",
            LocatorStrategy::IosPredicate => "-ios predicate string",
            LocatorStrategy::IosClassChain => "-ios class chain",
        }
    }

    /// Parse a wire name back into a strategy
    pub fn parse(value: &str) -> Option<Self> {
        let strategy = match value.trim() {
            "id" => LocatorStrategy::Id,
            "accessibility id" => LocatorStrategy::AccessibilityId,
            "xpath" => LocatorStrategy::XPath,
            "class name" => LocatorStrategy::ClassName,
            "name" => LocatorStrategy::Name,
            "-android uiautomator" => LocatorStrategy::AndroidUiAutomator,
            "-ios predicate string" => LocatorStrategy::IosPredicate,
            "-ios class chain" => LocatorStrategy::IosClassChain,
            _ => return None,
        };
        Some(strategy)
    }
}

impl fmt::Display for LocatorStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Immutable (strategy, value) pair identifying a UI element
///
/// Equality and hashing are by value, so a `Locator` can be used directly as
/// a cache key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
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

    pub fn id(value: impl Into<String>) -> Self {
        Self::new(LocatorStrategy::Id, value)
    }

    pub fn accessibility_id(value: impl Into<String>) -> Self {
        Self::new(LocatorStrategy::AccessibilityId, value)
    }

    pub fn xpath(value: impl Into<String>) -> Self {
        Self::new(LocatorStrategy::XPath, value)
    }

    pub fn class_name(value: impl Into<String>) -> Self {
        Self::new(LocatorStrategy::ClassName, value)
    }
}

impl fmt::Display for Locator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({:?}, {:?})", self.strategy.as_str(), self.value)
    }
}

/// Opaque reference to a resolved on-screen element
///
/// Only valid until the UI changes underneath it; liveness is checked by
/// probing the device.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ElementHandle {
    pub id: String,
}

impl ElementHandle {
    pub fn new(id: impl Into<String>) -> Self {
        Self { id: id.into() }
    }
}

impl fmt::Display for ElementHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "element:{}", self.id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_locator_display() {
        let locator = Locator::id("com.app:id/btn_login");
        assert_eq!(locator.to_string(), r#"("id", "com.app:id/btn_login")"#);
    }

    #[test]
    fn test_locator_equality_as_key() {
        let mut map = HashMap::new();
        map.insert(Locator::id("btn_login"), 1);
        assert_eq!(map.get(&Locator::id("btn_login")), Some(&1));
        assert_eq!(map.get(&Locator::accessibility_id("btn_login")), None);
    }

    #[test]
    fn test_strategy_wire_names_round_trip() {
        for strategy in [
            LocatorStrategy::Id,
            LocatorStrategy::AccessibilityId,
            LocatorStrategy::XPath,
            LocatorStrategy::IosPredicate,
        ] {
            assert_eq!(LocatorStrategy::parse(strategy.as_str()), Some(strategy));
        }
        assert_eq!(LocatorStrategy::parse("css selector"), None);
    }
}
