//! Locator abstraction for addressing entities on a page.
//!
//! A [`Locator`] is an opaque, immutable descriptor of how to find something
//! in the externally rendered page: by identifier, structural path, or
//! attribute match. Locators carry no driver state; waits and actions take
//! them by reference and query fresh state on every poll.

use serde::{Deserialize, Serialize};

/// How to find an entity on the page
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Locator {
    /// CSS selector (e.g. `button.primary`)
    Css(String),
    /// XPath expression
    XPath(String),
    /// `id` attribute value
    Id(String),
    /// `name` attribute value
    Name(String),
    /// Tag name (e.g. `input`)
    TagName(String),
    /// Anchor text content
    LinkText(String),
}

impl Locator {
    /// Locate by CSS selector
    #[must_use]
    pub fn css(selector: impl Into<String>) -> Self {
        Self::Css(selector.into())
    }

    /// Locate by XPath expression
    #[must_use]
    pub fn xpath(expr: impl Into<String>) -> Self {
        Self::XPath(expr.into())
    }

    /// Locate by `id` attribute
    #[must_use]
    pub fn id(id: impl Into<String>) -> Self {
        Self::Id(id.into())
    }

    /// Locate by `name` attribute
    #[must_use]
    pub fn name(name: impl Into<String>) -> Self {
        Self::Name(name.into())
    }

    /// Locate by tag name
    #[must_use]
    pub fn tag_name(tag: impl Into<String>) -> Self {
        Self::TagName(tag.into())
    }

    /// Locate an anchor by its text
    #[must_use]
    pub fn link_text(text: impl Into<String>) -> Self {
        Self::LinkText(text.into())
    }

    /// Convert to a JavaScript query expression resolving to the first match
    #[must_use]
    pub fn to_query(&self) -> String {
        match self {
            Self::Css(s) => format!("document.querySelector({s:?})"),
            Self::XPath(s) => {
                format!("document.evaluate({s:?}, document, null, XPathResult.FIRST_ORDERED_NODE_TYPE, null).singleNodeValue")
            }
            Self::Id(id) => format!("document.getElementById({id:?})"),
            Self::Name(name) => format!("document.querySelector('[name={name:?}]')"),
            Self::TagName(tag) => format!("document.getElementsByTagName({tag:?})[0]"),
            Self::LinkText(text) => {
                format!("Array.from(document.querySelectorAll('a')).find(el => el.textContent.trim() === {text:?})")
            }
        }
    }

    /// Convert to a JavaScript expression counting matches
    #[must_use]
    pub fn to_count_query(&self) -> String {
        match self {
            Self::Css(s) => format!("document.querySelectorAll({s:?}).length"),
            Self::XPath(s) => {
                format!("document.evaluate({s:?}, document, null, XPathResult.ORDERED_NODE_SNAPSHOT_TYPE, null).snapshotLength")
            }
            Self::Id(id) => format!("document.getElementById({id:?}) ? 1 : 0"),
            Self::Name(name) => format!("document.querySelectorAll('[name={name:?}]').length"),
            Self::TagName(tag) => format!("document.getElementsByTagName({tag:?}).length"),
            Self::LinkText(text) => {
                format!("Array.from(document.querySelectorAll('a')).filter(el => el.textContent.trim() === {text:?}).length")
            }
        }
    }
}

impl std::fmt::Display for Locator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Css(s) => write!(f, "css selector `{s}`"),
            Self::XPath(s) => write!(f, "xpath `{s}`"),
            Self::Id(s) => write!(f, "id `{s}`"),
            Self::Name(s) => write!(f, "name `{s}`"),
            Self::TagName(s) => write!(f, "tag `{s}`"),
            Self::LinkText(s) => write!(f, "link text `{s}`"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_constructors() {
        assert_eq!(Locator::css("button"), Locator::Css("button".to_string()));
        assert_eq!(Locator::id("src"), Locator::Id("src".to_string()));
        assert_eq!(
            Locator::xpath("//div[@class='bus-item']"),
            Locator::XPath("//div[@class='bus-item']".to_string())
        );
        assert_eq!(Locator::name("q"), Locator::Name("q".to_string()));
        assert_eq!(Locator::tag_name("input"), Locator::TagName("input".to_string()));
        assert_eq!(
            Locator::link_text("Sign in"),
            Locator::LinkText("Sign in".to_string())
        );
    }

    #[test]
    fn test_display_embeds_selector() {
        assert_eq!(
            format!("{}", Locator::css("button.primary")),
            "css selector `button.primary`"
        );
        assert_eq!(format!("{}", Locator::id("search_button")), "id `search_button`");
    }

    #[test]
    fn test_to_query_css() {
        let q = Locator::css("button.primary").to_query();
        assert!(q.contains("querySelector"));
        assert!(q.contains("button.primary"));
    }

    #[test]
    fn test_to_query_id() {
        let q = Locator::id("submit").to_query();
        assert!(q.contains("getElementById"));
    }

    #[test]
    fn test_to_count_query() {
        let q = Locator::css(".bus-item").to_count_query();
        assert!(q.contains("querySelectorAll"));
        assert!(q.ends_with(".length"));
    }

    #[test]
    fn test_locator_is_hashable() {
        use std::collections::HashMap;
        let mut map = HashMap::new();
        map.insert(Locator::id("src"), "source city");
        assert_eq!(map.get(&Locator::id("src")), Some(&"source city"));
    }

    #[test]
    fn test_serde_round_trip() {
        let locator = Locator::xpath("//text[contains(text(),'Mumbai')]");
        let json = serde_json::to_string(&locator).unwrap();
        let back: Locator = serde_json::from_str(&json).unwrap();
        assert_eq!(locator, back);
    }
}
