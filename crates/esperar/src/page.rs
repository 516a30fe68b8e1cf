//! Page object support.
//!
//! Page objects encapsulate the structure of a UI page behind named
//! locators, so test flows read as intent rather than selector soup.
//! Readiness is expressed through the same condition waits as everything
//! else: a page is loaded when the document is ready, its URL matches, and
//! its own marker condition holds.

use std::collections::HashMap;

use crate::conditions;
use crate::driver::PageQuery;
use crate::locator::Locator;
use crate::result::{EsperarResult, QueryErrorKind};
use crate::wait::{Condition, Waiter};

/// A page or component in the UI under test
pub trait PageObject {
    /// URL pattern that identifies this page (e.g. `/login`, `/users/:id`)
    fn url_pattern(&self) -> &str;

    /// Whether the page-specific markers are present
    fn is_loaded(&self, _page: &dyn PageQuery) -> bool {
        true
    }

    /// Timeout budget for this page's load wait, in milliseconds
    fn load_timeout_ms(&self) -> u64 {
        30_000
    }

    /// Page name for logging and registry lookups
    fn page_name(&self) -> &str {
        std::any::type_name::<Self>()
    }
}

/// Builder for assembling a page object from named locators
#[derive(Debug, Clone)]
pub struct PageObjectBuilder {
    url_pattern: String,
    locators: HashMap<String, Locator>,
    load_timeout_ms: u64,
}

impl Default for PageObjectBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl PageObjectBuilder {
    /// Create a new builder
    #[must_use]
    pub fn new() -> Self {
        Self {
            url_pattern: String::new(),
            locators: HashMap::new(),
            load_timeout_ms: 30_000,
        }
    }

    /// Set the URL pattern
    #[must_use]
    pub fn with_url_pattern(mut self, pattern: impl Into<String>) -> Self {
        self.url_pattern = pattern.into();
        self
    }

    /// Register a named locator
    #[must_use]
    pub fn with_locator(mut self, name: impl Into<String>, locator: Locator) -> Self {
        self.locators.insert(name.into(), locator);
        self
    }

    /// Set the load timeout
    #[must_use]
    pub fn with_load_timeout(mut self, timeout_ms: u64) -> Self {
        self.load_timeout_ms = timeout_ms;
        self
    }

    /// Build the page object
    #[must_use]
    pub fn build(self) -> SimplePageObject {
        SimplePageObject {
            url_pattern: self.url_pattern,
            locators: self.locators,
            load_timeout_ms: self.load_timeout_ms,
        }
    }
}

/// A generic page object backed by a locator map
#[derive(Debug, Clone)]
pub struct SimplePageObject {
    url_pattern: String,
    locators: HashMap<String, Locator>,
    load_timeout_ms: u64,
}

impl SimplePageObject {
    /// Create a page object for a URL pattern
    #[must_use]
    pub fn new(url_pattern: impl Into<String>) -> Self {
        Self {
            url_pattern: url_pattern.into(),
            locators: HashMap::new(),
            load_timeout_ms: 30_000,
        }
    }

    /// Look up a locator by name
    #[must_use]
    pub fn locator(&self, name: &str) -> Option<&Locator> {
        self.locators.get(name)
    }

    /// Register a locator
    pub fn add_locator(&mut self, name: impl Into<String>, locator: Locator) {
        self.locators.insert(name.into(), locator);
    }

    /// Registered locator names
    #[must_use]
    pub fn locator_names(&self) -> Vec<&str> {
        self.locators.keys().map(String::as_str).collect()
    }

    /// Block until the page is loaded: document ready, then the current URL
    /// path matching this page's pattern, then every registered marker
    /// locator present.
    ///
    /// The first two waits run on the waiter's own budget; the marker wait
    /// runs on `load_timeout_ms` with the waiter's poll interval.
    pub fn wait_until_loaded(
        &self,
        page: &dyn PageQuery,
        waiter: &Waiter,
    ) -> EsperarResult<()> {
        waiter.until(page, &conditions::document_ready())?;

        if !self.url_pattern.is_empty() {
            let matcher = UrlMatcher::new(&self.url_pattern);
            let description = format!("URL matching `{}`", matcher.pattern());
            let url_ready = Condition::new(description, move |page| {
                let url = page.url()?;
                Ok(matcher.matches_prefix(url_path(&url)).then_some(()))
            });
            waiter.until(page, &url_ready)?;
        }

        let markers: Vec<Locator> = self.locators.values().cloned().collect();
        if markers.is_empty() {
            return Ok(());
        }
        let description = format!("markers of page `{}`", PageObject::page_name(self));
        let markers_present = Condition::new(description, move |page| {
            for locator in &markers {
                match page.find(locator) {
                    Ok(_) => {}
                    Err(err) if err.kind == QueryErrorKind::NotFound => return Ok(None),
                    Err(err) => return Err(err),
                }
            }
            Ok(Some(()))
        });
        let marker_waiter =
            Waiter::with_config(waiter.config().clone().with_timeout(self.load_timeout_ms));
        marker_waiter.until(page, &markers_present)?;
        Ok(())
    }
}

impl PageObject for SimplePageObject {
    fn url_pattern(&self) -> &str {
        &self.url_pattern
    }

    fn is_loaded(&self, page: &dyn PageQuery) -> bool {
        // Every registered locator must be present
        self.locators
            .values()
            .all(|locator| page.find(locator).is_ok())
    }

    fn load_timeout_ms(&self) -> u64 {
        self.load_timeout_ms
    }
}

/// Trait for type-erased page object info
pub trait PageObjectInfo: std::fmt::Debug + Send + Sync {
    /// URL pattern for the page
    fn url_pattern(&self) -> &str;

    /// Page name
    fn page_name(&self) -> &str;

    /// Load timeout in milliseconds
    fn load_timeout_ms(&self) -> u64;
}

impl<T: PageObject + std::fmt::Debug + Send + Sync + 'static> PageObjectInfo for T {
    fn url_pattern(&self) -> &str {
        PageObject::url_pattern(self)
    }

    fn page_name(&self) -> &str {
        PageObject::page_name(self)
    }

    fn load_timeout_ms(&self) -> u64 {
        PageObject::load_timeout_ms(self)
    }
}

/// Registry of the pages a suite knows about
#[derive(Debug, Default)]
pub struct PageRegistry {
    pages: HashMap<String, Box<dyn PageObjectInfo>>,
}

impl PageRegistry {
    /// Create an empty registry
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a page object under a name
    pub fn register<T: PageObject + std::fmt::Debug + Send + Sync + 'static>(
        &mut self,
        name: impl Into<String>,
        page: T,
    ) {
        self.pages.insert(name.into(), Box::new(page));
    }

    /// Look up a page by name
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&dyn PageObjectInfo> {
        self.pages.get(name).map(|p| p.as_ref())
    }

    /// Names of all registered pages
    #[must_use]
    pub fn list(&self) -> Vec<&str> {
        self.pages.keys().map(String::as_str).collect()
    }

    /// Number of registered pages
    #[must_use]
    pub fn count(&self) -> usize {
        self.pages.len()
    }
}

/// URL pattern matcher for page objects
#[derive(Debug, Clone)]
pub struct UrlMatcher {
    pattern: String,
    segments: Vec<UrlSegment>,
}

#[derive(Debug, Clone)]
enum UrlSegment {
    Literal(String),
    Wildcard,
    Parameter(String),
}

impl UrlMatcher {
    /// Create a matcher from a pattern.
    ///
    /// Patterns support literal segments (`/login`), wildcards
    /// (`/users/*`), and named parameters (`/users/:id`).
    #[must_use]
    pub fn new(pattern: &str) -> Self {
        let segments = pattern
            .split('/')
            .filter(|s| !s.is_empty())
            .map(|s| {
                if s == "*" {
                    UrlSegment::Wildcard
                } else if let Some(name) = s.strip_prefix(':') {
                    UrlSegment::Parameter(name.to_string())
                } else {
                    UrlSegment::Literal(s.to_string())
                }
            })
            .collect();

        Self {
            pattern: pattern.to_string(),
            segments,
        }
    }

    /// Check whether a URL path matches the pattern
    #[must_use]
    pub fn matches(&self, url: &str) -> bool {
        let url_segments: Vec<&str> = url.split('/').filter(|s| !s.is_empty()).collect();

        // Wildcards and parameters each consume exactly one segment
        if url_segments.len() != self.segments.len() {
            return false;
        }

        self.segments.iter().enumerate().all(|(i, segment)| match segment {
            UrlSegment::Literal(lit) => url_segments.get(i) == Some(&lit.as_str()),
            UrlSegment::Wildcard | UrlSegment::Parameter(_) => true,
        })
    }

    /// Check whether the pattern matches the leading segments of a URL path.
    ///
    /// Used by load waits, where the page's pattern identifies a URL family
    /// and trailing segments (route details, query-ish suffixes) vary.
    #[must_use]
    pub fn matches_prefix(&self, url: &str) -> bool {
        let url_segments: Vec<&str> = url.split('/').filter(|s| !s.is_empty()).collect();
        if url_segments.len() < self.segments.len() {
            return false;
        }
        self.segments
            .iter()
            .zip(&url_segments)
            .all(|(segment, actual)| match segment {
                UrlSegment::Literal(lit) => lit == actual,
                UrlSegment::Wildcard | UrlSegment::Parameter(_) => true,
            })
    }

    /// Extract named parameters from a matching URL
    #[must_use]
    pub fn extract_params(&self, url: &str) -> HashMap<String, String> {
        let mut params = HashMap::new();
        let url_segments: Vec<&str> = url.split('/').filter(|s| !s.is_empty()).collect();

        for (i, segment) in self.segments.iter().enumerate() {
            if let UrlSegment::Parameter(name) = segment {
                if let Some(value) = url_segments.get(i) {
                    params.insert(name.clone(), (*value).to_string());
                }
            }
        }

        params
    }

    /// The original pattern
    #[must_use]
    pub fn pattern(&self) -> &str {
        &self.pattern
    }
}

/// Path component of a URL, with any scheme and host stripped
fn url_path(url: &str) -> &str {
    let rest = url.split_once("://").map_or(url, |(_, tail)| tail);
    rest.find('/').map_or("", |idx| &rest[idx..])
}
