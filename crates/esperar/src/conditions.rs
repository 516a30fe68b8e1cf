//! Named wait conditions.
//!
//! Each factory here maps a familiar readiness check to a plain
//! [`Condition`] closure over the [`PageQuery`](crate::driver::PageQuery)
//! seam. There are no separate code paths: every specialization goes through
//! the same generic [`Waiter::until`](crate::Waiter::until) loop.
//!
//! Usage:
//!
//! ```
//! use esperar::{conditions, Locator, SimulatedPage, Waiter, WaitConfig};
//! use esperar::driver::ElementHandle;
//!
//! let page = SimulatedPage::new();
//! page.set_title("redBus - Online Bus Ticket Booking");
//!
//! let waiter = Waiter::with_config(WaitConfig::new().with_timeout(500).with_poll_interval(50));
//! let title = waiter.until(&page, &conditions::title_contains("redBus")).unwrap();
//! assert!(title.value.contains("redBus"));
//! ```

use crate::driver::ElementHandle;
use crate::locator::Locator;
use crate::result::QueryErrorKind;
use crate::wait::Condition;

/// Entity is present in the result set (attached, possibly hidden)
#[must_use]
pub fn presence(locator: Locator) -> Condition<ElementHandle> {
    let description = format!("presence of {locator}");
    Condition::new(description, move |page| page.find(&locator).map(Some))
}

/// At least one entity matches the locator; yields all matches
#[must_use]
pub fn presence_of_all(locator: Locator) -> Condition<Vec<ElementHandle>> {
    let description = format!("presence of all {locator}");
    Condition::new(description, move |page| {
        let handles = page.find_all(&locator)?;
        Ok(if handles.is_empty() {
            None
        } else {
            Some(handles)
        })
    })
}

/// Entity is present and visible
#[must_use]
pub fn visibility(locator: Locator) -> Condition<ElementHandle> {
    let description = format!("visibility of {locator}");
    Condition::new(description, move |page| {
        let handle = page.find(&locator)?;
        Ok(handle.visible.then_some(handle))
    })
}

/// Entity is present, visible and enabled for interaction
#[must_use]
pub fn clickable(locator: Locator) -> Condition<ElementHandle> {
    let description = format!("clickability of {locator}");
    Condition::new(description, move |page| {
        let handle = page.find(&locator)?;
        Ok(handle.is_clickable().then_some(handle))
    })
}

/// Entity is absent from the page or hidden.
///
/// The presence predicate inverted: a not-found query satisfies this
/// condition instead of driving a retry.
#[must_use]
pub fn invisibility(locator: Locator) -> Condition<()> {
    let description = format!("invisibility of {locator}");
    Condition::new(description, move |page| match page.find(&locator) {
        Ok(handle) if !handle.visible => Ok(Some(())),
        Ok(_) => Ok(None),
        Err(err) if err.kind == QueryErrorKind::NotFound => Ok(Some(())),
        Err(err) => Err(err),
    })
}

/// Entity's text content contains the needle; yields the full text
#[must_use]
pub fn text_contains(locator: Locator, needle: impl Into<String>) -> Condition<String> {
    let needle = needle.into();
    let description = format!("text `{needle}` in {locator}");
    Condition::new(description, move |page| {
        let text = page.text(&locator)?;
        Ok(text.contains(&needle).then_some(text))
    })
}

/// Entity's attribute value contains the needle; yields the value
#[must_use]
pub fn attribute_contains(
    locator: Locator,
    attribute: impl Into<String>,
    needle: impl Into<String>,
) -> Condition<String> {
    let attribute = attribute.into();
    let needle = needle.into();
    let description = format!("attribute `{attribute}` containing `{needle}` on {locator}");
    Condition::new(description, move |page| {
        match page.attribute(&locator, &attribute)? {
            Some(value) if value.contains(&needle) => Ok(Some(value)),
            _ => Ok(None),
        }
    })
}

/// Page title contains the needle; yields the full title
#[must_use]
pub fn title_contains(needle: impl Into<String>) -> Condition<String> {
    let needle = needle.into();
    let description = format!("title containing `{needle}`");
    Condition::new(description, move |page| {
        let title = page.title()?;
        Ok(title.contains(&needle).then_some(title))
    })
}

/// Page URL contains the needle; yields the full URL
#[must_use]
pub fn url_contains(needle: impl Into<String>) -> Condition<String> {
    let needle = needle.into();
    let description = format!("URL containing `{needle}`");
    Condition::new(description, move |page| {
        let url = page.url()?;
        Ok(url.contains(&needle).then_some(url))
    })
}

/// Document ready state equals `complete`
#[must_use]
pub fn document_ready() -> Condition<()> {
    Condition::new("document ready state `complete`", |page| {
        Ok((page.ready_state()? == "complete").then_some(()))
    })
}

/// How [`presence_or_page_contains`] was satisfied
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContentMatch {
    /// The primary locator matched
    Element(ElementHandle),
    /// Fallback: the page source contained this term
    PageSource(String),
}

/// Primary presence check with a best-effort page-content fallback.
///
/// If the locator does not match, the page source is scanned for any of the
/// fallback terms instead. Intentionally loose; use when a page's structure
/// is unstable but its vocabulary is not.
#[must_use]
pub fn presence_or_page_contains(
    locator: Locator,
    fallback_terms: Vec<String>,
) -> Condition<ContentMatch> {
    let description = format!(
        "presence of {locator} or page content matching {fallback_terms:?}"
    );
    Condition::new(description, move |page| match page.find(&locator) {
        Ok(handle) => Ok(Some(ContentMatch::Element(handle))),
        Err(err) if err.kind == QueryErrorKind::NotFound => {
            let source = page.page_source()?;
            Ok(fallback_terms
                .iter()
                .find(|term| source.contains(term.as_str()))
                .map(|term| ContentMatch::PageSource(term.clone())))
        }
        Err(err) => Err(err),
    })
}
