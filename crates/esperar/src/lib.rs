//! Esperar: Condition-Based Waiting for Browser Test Suites
//!
//! Esperar (Spanish: "to wait/hope") replaces fixed sleeps in end-to-end
//! tests with explicit condition polling. A [`Waiter`] repeatedly evaluates
//! a [`Condition`] against a page until the condition produces a value or a
//! timeout budget runs out, retrying through the transient query errors the
//! caller chose to ignore.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                    ESPERAR Architecture                      │
//! ├──────────────────────────────────────────────────────────────┤
//! │   ┌────────────┐    ┌─────────────┐    ┌─────────────┐       │
//! │   │ Condition  │    │ Waiter      │    │ PageQuery   │       │
//! │   │ factories  │───►│ poll loop   │───►│ (driver or  │       │
//! │   │            │    │ + timeouts  │    │  simulated) │       │
//! │   └────────────┘    └─────────────┘    └─────────────┘       │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Quick Start
//!
//! ```
//! use esperar::{conditions, Locator, SimulatedPage, Waiter};
//! use esperar::driver::ElementHandle;
//!
//! let page = SimulatedPage::new();
//! page.insert_element(Locator::id("search"), ElementHandle::new("e1", "button"));
//!
//! let waiter = Waiter::new();
//! let outcome = waiter.until(&page, &conditions::presence(Locator::id("search")))?;
//! assert_eq!(outcome.value.tag_name, "button");
//! # Ok::<(), esperar::EsperarError>(())
//! ```

#![warn(missing_docs)]
// Lints are configured in workspace Cargo.toml [workspace.lints.clippy]
#![cfg_attr(test, allow(clippy::large_stack_arrays, clippy::large_stack_frames))]

/// Action descriptions and waited action chains
pub mod actions;

/// Condition factories for the common readiness checks
pub mod conditions;

/// Suite catalog configuration
pub mod config;

/// Tabular test data loaded from JSON or YAML
pub mod data;

/// Page access traits and the simulated page used in tests
pub mod driver;

/// Suite lifecycle listeners and run tracking
pub mod listener;

/// Element locator strategies
pub mod locator;

/// Tracing setup helpers
pub mod logging;

/// Page object support
pub mod page;

/// Error and result types
pub mod result;

/// Screenshot capture and storage
pub mod screenshot;

/// Condition polling and wait configuration
pub mod wait;

pub use actions::{Action, ActionChain, Key};
pub use config::{SuiteCatalog, SuiteEntry};
pub use data::DataTable;
pub use driver::{ElementHandle, PageDriver, PageQuery, Screenshot, SimulatedPage};
pub use listener::{
    CompositeListener, LogListener, SuiteListener, SuiteRun, SuiteSummary, TestRecord, TestStatus,
};
#[cfg(feature = "notify")]
pub use listener::HttpNotifier;
pub use locator::Locator;
pub use page::{PageObject, PageObjectBuilder, PageRegistry, SimplePageObject, UrlMatcher};
pub use result::{EsperarError, EsperarResult, QueryError, QueryErrorKind};
pub use screenshot::ScreenshotSink;
pub use wait::{
    hard_wait, settle, wait_until, Condition, WaitConfig, WaitOutcome, Waiter,
    DEFAULT_POLL_INTERVAL_MS, DEFAULT_WAIT_TIMEOUT_MS,
};
