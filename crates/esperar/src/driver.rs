//! Abstract page-query seam between waits and the browser-automation driver.
//!
//! The wait machinery never talks to a browser directly. It only needs one
//! capability: "evaluate a predicate against current external state, where
//! the query may fail with a distinguishable not-found/not-ready kind". That
//! capability is the [`PageQuery`] trait; [`PageDriver`] extends it with
//! action dispatch for input simulation.
//!
//! [`SimulatedPage`] is an in-memory implementation with explicit setters,
//! used by this crate's own tests and by suites that want to exercise wait
//! logic without a browser. State lives behind a shared lock so a test can
//! mutate the page from another thread while a wait is polling it.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::SystemTime;

use crate::actions::Action;
use crate::locator::Locator;
use crate::result::{QueryError, QueryErrorKind};

/// Snapshot of a located entity's state at query time
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ElementHandle {
    /// Stable identifier assigned by the driver
    pub id: String,
    /// Element tag name
    pub tag_name: String,
    /// Text content, if any
    pub text: Option<String>,
    /// Whether the element is rendered and visible
    pub visible: bool,
    /// Whether the element accepts interaction
    pub enabled: bool,
    /// Attribute name/value pairs known to the driver
    pub attributes: HashMap<String, String>,
}

impl ElementHandle {
    /// Create a new handle for a visible, enabled element
    #[must_use]
    pub fn new(id: impl Into<String>, tag_name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            tag_name: tag_name.into(),
            text: None,
            visible: true,
            enabled: true,
            attributes: HashMap::new(),
        }
    }

    /// Set the text content
    #[must_use]
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    /// Set visibility
    #[must_use]
    pub fn with_visible(mut self, visible: bool) -> Self {
        self.visible = visible;
        self
    }

    /// Set whether the element accepts interaction
    #[must_use]
    pub fn with_enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    /// Add an attribute
    #[must_use]
    pub fn with_attribute(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(name.into(), value.into());
        self
    }

    /// Present, visible and enabled: ready to receive a click
    #[must_use]
    pub fn is_clickable(&self) -> bool {
        self.visible && self.enabled
    }
}

/// Captured screenshot with metadata
#[derive(Debug, Clone)]
pub struct Screenshot {
    /// Raw PNG data
    pub data: Vec<u8>,
    /// Width in pixels
    pub width: u32,
    /// Height in pixels
    pub height: u32,
    /// When the screenshot was taken
    pub timestamp: SystemTime,
}

impl Screenshot {
    /// Create a new screenshot
    #[must_use]
    pub fn new(data: Vec<u8>, width: u32, height: u32) -> Self {
        Self {
            data,
            width,
            height,
            timestamp: SystemTime::now(),
        }
    }

    /// Size of the encoded image in bytes
    #[must_use]
    pub fn size_bytes(&self) -> usize {
        self.data.len()
    }

    /// Whether the screenshot carries usable data
    #[must_use]
    pub fn is_valid(&self) -> bool {
        !self.data.is_empty() && self.width > 0 && self.height > 0
    }
}

/// Read-only queries against current page state.
///
/// Implementations must answer from fresh state on every call; the wait
/// machinery never caches results across polls.
pub trait PageQuery {
    /// Find the first entity matching the locator
    fn find(&self, locator: &Locator) -> Result<ElementHandle, QueryError>;

    /// Find all entities matching the locator (empty if none)
    fn find_all(&self, locator: &Locator) -> Result<Vec<ElementHandle>, QueryError>;

    /// Text content of the first matching entity
    fn text(&self, locator: &Locator) -> Result<String, QueryError> {
        let handle = self.find(locator)?;
        Ok(handle.text.unwrap_or_default())
    }

    /// Attribute value of the first matching entity, if set
    fn attribute(&self, locator: &Locator, name: &str) -> Result<Option<String>, QueryError> {
        let handle = self.find(locator)?;
        Ok(handle.attributes.get(name).cloned())
    }

    /// Current page title
    fn title(&self) -> Result<String, QueryError>;

    /// Current page URL
    fn url(&self) -> Result<String, QueryError>;

    /// Current document ready state (`loading`, `interactive`, `complete`)
    fn ready_state(&self) -> Result<String, QueryError>;

    /// Full page source, for best-effort content checks
    fn page_source(&self) -> Result<String, QueryError>;

    /// Capture a screenshot of the current viewport
    fn screenshot(&self) -> Result<Screenshot, QueryError>;
}

/// A page that can also receive simulated input
pub trait PageDriver: PageQuery {
    /// Dispatch a single input action against the page
    fn perform(&mut self, action: &Action) -> Result<(), QueryError>;
}

// =============================================================================
// SIMULATED PAGE
// =============================================================================

#[derive(Debug, Default)]
struct PageState {
    elements: HashMap<Locator, Vec<ElementHandle>>,
    title: String,
    url: String,
    ready_state: String,
    page_source: String,
    screenshot: Option<Screenshot>,
    performed: Vec<Action>,
    query_failure: Option<QueryError>,
}

/// In-memory page for tests and offline wait exercises.
///
/// Cloning yields a second handle to the same shared state, so one thread
/// can mutate the page while another polls it.
#[derive(Debug, Clone, Default)]
pub struct SimulatedPage {
    inner: Arc<Mutex<PageState>>,
}

impl SimulatedPage {
    /// Create an empty page in the `loading` state
    #[must_use]
    pub fn new() -> Self {
        let page = Self::default();
        page.set_ready_state("loading");
        page
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, PageState> {
        // A poisoned lock means a test thread panicked; surfacing that panic
        // here is the desired behavior.
        self.inner.lock().unwrap()
    }

    /// Insert (or replace) the entities matching a locator
    pub fn insert_element(&self, locator: Locator, handle: ElementHandle) {
        self.lock().elements.insert(locator, vec![handle]);
    }

    /// Insert multiple entities for one locator
    pub fn insert_elements(&self, locator: Locator, handles: Vec<ElementHandle>) {
        self.lock().elements.insert(locator, handles);
    }

    /// Remove all entities matching a locator
    pub fn remove_element(&self, locator: &Locator) {
        self.lock().elements.remove(locator);
    }

    /// Change visibility of the first entity matching a locator
    pub fn set_visible(&self, locator: &Locator, visible: bool) {
        if let Some(handles) = self.lock().elements.get_mut(locator) {
            if let Some(first) = handles.first_mut() {
                first.visible = visible;
            }
        }
    }

    /// Set the page title
    pub fn set_title(&self, title: impl Into<String>) {
        self.lock().title = title.into();
    }

    /// Set the page URL
    pub fn set_url(&self, url: impl Into<String>) {
        self.lock().url = url.into();
    }

    /// Set the document ready state
    pub fn set_ready_state(&self, state: impl Into<String>) {
        self.lock().ready_state = state.into();
    }

    /// Set the page source
    pub fn set_page_source(&self, source: impl Into<String>) {
        self.lock().page_source = source.into();
    }

    /// Provide the bytes returned by [`PageQuery::screenshot`]
    pub fn set_screenshot(&self, data: Vec<u8>, width: u32, height: u32) {
        self.lock().screenshot = Some(Screenshot::new(data, width, height));
    }

    /// Make every subsequent query fail with the given error (until cleared
    /// with `None`); used to simulate a broken driver session
    pub fn fail_queries_with(&self, failure: Option<QueryError>) {
        self.lock().query_failure = failure;
    }

    /// Actions performed so far, in dispatch order
    #[must_use]
    pub fn performed_actions(&self) -> Vec<Action> {
        self.lock().performed.clone()
    }

    fn check_failure(&self) -> Result<(), QueryError> {
        match &self.lock().query_failure {
            Some(err) => Err(err.clone()),
            None => Ok(()),
        }
    }
}

impl PageQuery for SimulatedPage {
    fn find(&self, locator: &Locator) -> Result<ElementHandle, QueryError> {
        self.check_failure()?;
        self.lock()
            .elements
            .get(locator)
            .and_then(|handles| handles.first())
            .cloned()
            .ok_or_else(|| QueryError::not_found(locator))
    }

    fn find_all(&self, locator: &Locator) -> Result<Vec<ElementHandle>, QueryError> {
        self.check_failure()?;
        Ok(self.lock().elements.get(locator).cloned().unwrap_or_default())
    }

    fn title(&self) -> Result<String, QueryError> {
        self.check_failure()?;
        Ok(self.lock().title.clone())
    }

    fn url(&self) -> Result<String, QueryError> {
        self.check_failure()?;
        Ok(self.lock().url.clone())
    }

    fn ready_state(&self) -> Result<String, QueryError> {
        self.check_failure()?;
        Ok(self.lock().ready_state.clone())
    }

    fn page_source(&self) -> Result<String, QueryError> {
        self.check_failure()?;
        Ok(self.lock().page_source.clone())
    }

    fn screenshot(&self) -> Result<Screenshot, QueryError> {
        self.check_failure()?;
        self.lock().screenshot.clone().ok_or_else(|| {
            QueryError::new(QueryErrorKind::Driver, "no screenshot data configured")
        })
    }
}

impl PageDriver for SimulatedPage {
    fn perform(&mut self, action: &Action) -> Result<(), QueryError> {
        self.check_failure()?;
        let mut state = self.lock();
        // Typing mutates the target's value attribute so text conditions can
        // observe the effect.
        match action {
            Action::TypeText { locator, text } | Action::ClearAndType { locator, text } => {
                if let Some(first) = state
                    .elements
                    .get_mut(locator)
                    .and_then(|handles| handles.first_mut())
                {
                    first.attributes.insert("value".to_string(), text.clone());
                }
            }
            _ => {}
        }
        state.performed.push(action.clone());
        Ok(())
    }
}
