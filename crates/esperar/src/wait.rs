//! Condition-polling wait primitive.
//!
//! One blocking operation: evaluate a caller-supplied condition against
//! current page state, re-evaluating at a fixed poll interval until it
//! yields a value or the timeout elapses. All retry/timeout bookkeeping is
//! handled here; named conditions in [`crate::conditions`] are plain
//! closures layered on top.
//!
//! Usage:
//!
//! ```
//! use esperar::{conditions, Locator, SimulatedPage, WaitConfig, Waiter};
//! use esperar::driver::ElementHandle;
//!
//! let page = SimulatedPage::new();
//! page.insert_element(Locator::id("submit"), ElementHandle::new("e1", "button"));
//!
//! let waiter = Waiter::with_config(WaitConfig::new().with_timeout(1_000).with_poll_interval(50));
//! let outcome = waiter.until(&page, &conditions::presence(Locator::id("submit"))).unwrap();
//! assert_eq!(outcome.value.id, "e1");
//! ```

use std::collections::HashSet;
use std::time::{Duration, Instant};

use tracing::{debug, trace};

use crate::driver::PageQuery;
use crate::result::{EsperarError, EsperarResult, QueryError, QueryErrorKind};

// =============================================================================
// CONSTANTS
// =============================================================================

/// Default timeout for wait operations (10 seconds)
pub const DEFAULT_WAIT_TIMEOUT_MS: u64 = 10_000;

/// Default polling interval (500ms)
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 500;

// =============================================================================
// WAIT CONFIG
// =============================================================================

/// Configuration for a single wait call.
///
/// Created per wait; nothing is persisted across calls. By default a wait
/// ignores `NotFound` query failures, treating them as "not yet satisfied".
#[derive(Debug, Clone)]
pub struct WaitConfig {
    /// Timeout in milliseconds
    pub timeout_ms: u64,
    /// Polling interval in milliseconds
    pub poll_interval_ms: u64,
    /// Query failure kinds absorbed as "not yet satisfied"
    pub ignored_kinds: HashSet<QueryErrorKind>,
}

impl Default for WaitConfig {
    fn default() -> Self {
        Self {
            timeout_ms: DEFAULT_WAIT_TIMEOUT_MS,
            poll_interval_ms: DEFAULT_POLL_INTERVAL_MS,
            ignored_kinds: [QueryErrorKind::NotFound].into_iter().collect(),
        }
    }
}

impl WaitConfig {
    /// Create a config with defaults
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set timeout in milliseconds
    #[must_use]
    pub fn with_timeout(mut self, timeout_ms: u64) -> Self {
        self.timeout_ms = timeout_ms;
        self
    }

    /// Set polling interval in milliseconds
    #[must_use]
    pub fn with_poll_interval(mut self, poll_interval_ms: u64) -> Self {
        self.poll_interval_ms = poll_interval_ms;
        self
    }

    /// Also absorb the given failure kind while polling
    #[must_use]
    pub fn ignoring(mut self, kind: QueryErrorKind) -> Self {
        self.ignored_kinds.insert(kind);
        self
    }

    /// Absorb no failure kinds at all
    #[must_use]
    pub fn ignoring_nothing(mut self) -> Self {
        self.ignored_kinds.clear();
        self
    }

    /// Whether a failure of this kind drives a retry instead of aborting
    #[must_use]
    pub fn ignores(&self, kind: QueryErrorKind) -> bool {
        self.ignored_kinds.contains(&kind)
    }

    /// Get timeout as Duration
    #[must_use]
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// Get poll interval as Duration
    #[must_use]
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    /// Check the configuration invariant: a positive poll interval no longer
    /// than the timeout. Anything else would poll zero or unbounded times.
    pub fn validate(&self) -> EsperarResult<()> {
        if self.poll_interval_ms == 0 {
            return Err(EsperarError::Config {
                message: "poll interval must be greater than zero".to_string(),
            });
        }
        if self.timeout_ms < self.poll_interval_ms {
            return Err(EsperarError::Config {
                message: format!(
                    "timeout ({}ms) must be at least the poll interval ({}ms)",
                    self.timeout_ms, self.poll_interval_ms
                ),
            });
        }
        Ok(())
    }
}

// =============================================================================
// CONDITION
// =============================================================================

/// A caller-supplied readiness test over current page state.
///
/// A condition is just a function value: it queries the page and answers
/// `Ok(Some(value))` once satisfied, `Ok(None)` while not yet satisfied, or
/// a [`QueryError`] whose kind decides between retry and abort. Conditions
/// must be idempotent; they are re-invoked once per poll tick.
pub struct Condition<R> {
    description: String,
    probe: Box<dyn Fn(&dyn PageQuery) -> Result<Option<R>, QueryError> + Send + Sync>,
}

impl<R> Condition<R> {
    /// Create a condition from a description and a probe closure
    pub fn new<F>(description: impl Into<String>, probe: F) -> Self
    where
        F: Fn(&dyn PageQuery) -> Result<Option<R>, QueryError> + Send + Sync + 'static,
    {
        Self {
            description: description.into(),
            probe: Box::new(probe),
        }
    }

    /// Description used in timeout diagnostics
    #[must_use]
    pub fn description(&self) -> &str {
        &self.description
    }

    /// Evaluate against current page state
    pub fn evaluate(&self, page: &dyn PageQuery) -> Result<Option<R>, QueryError> {
        (self.probe)(page)
    }
}

impl<R> std::fmt::Debug for Condition<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Condition")
            .field("description", &self.description)
            .finish_non_exhaustive()
    }
}

// =============================================================================
// WAIT OUTCOME
// =============================================================================

/// A satisfied wait: the condition's value plus timing diagnostics
#[derive(Debug, Clone)]
pub struct WaitOutcome<R> {
    /// Value produced by the satisfied condition
    pub value: R,
    /// Wall-clock time spent waiting
    pub elapsed: Duration,
    /// Description of what was waited for
    pub waited_for: String,
}

// =============================================================================
// WAITER
// =============================================================================

/// Blocking condition waiter.
///
/// Each call is stateless and self-contained; a `Waiter` only carries the
/// configuration applied to its waits. Concurrent waits share no mutable
/// state.
#[derive(Debug, Clone, Default)]
pub struct Waiter {
    config: WaitConfig,
}

impl Waiter {
    /// Create a waiter with default configuration
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a waiter with custom configuration
    #[must_use]
    pub fn with_config(config: WaitConfig) -> Self {
        Self { config }
    }

    /// The configuration applied to this waiter's calls
    #[must_use]
    pub fn config(&self) -> &WaitConfig {
        &self.config
    }

    /// Block until the condition is satisfied or the timeout elapses.
    ///
    /// The condition is evaluated immediately at time zero; if already
    /// satisfied no sleep occurs. Otherwise the calling thread sleeps one
    /// poll interval between evaluations, always querying fresh state.
    ///
    /// # Errors
    ///
    /// - [`EsperarError::Config`] if the configuration invariant is violated
    ///   (returned before any poll is performed)
    /// - [`EsperarError::Query`] as soon as the condition fails with a kind
    ///   not in the ignored set
    /// - [`EsperarError::WaitTimeout`] when the timeout elapses, carrying the
    ///   condition description for diagnostics
    pub fn until<R>(
        &self,
        page: &dyn PageQuery,
        condition: &Condition<R>,
    ) -> EsperarResult<WaitOutcome<R>> {
        self.config.validate()?;

        let start = Instant::now();
        let timeout = self.config.timeout();
        let poll_interval = self.config.poll_interval();

        loop {
            match condition.evaluate(page) {
                Ok(Some(value)) => {
                    let elapsed = start.elapsed();
                    trace!(
                        waited_for = condition.description(),
                        elapsed_ms = elapsed.as_millis() as u64,
                        "condition satisfied"
                    );
                    return Ok(WaitOutcome {
                        value,
                        elapsed,
                        waited_for: condition.description().to_string(),
                    });
                }
                Ok(None) => {}
                Err(err) if self.config.ignores(err.kind) => {
                    trace!(
                        waited_for = condition.description(),
                        kind = %err.kind,
                        "ignoring transient query failure"
                    );
                }
                Err(err) => return Err(EsperarError::Query(err)),
            }

            if start.elapsed() >= timeout {
                return Err(EsperarError::WaitTimeout {
                    ms: self.config.timeout_ms,
                    waited_for: condition.description().to_string(),
                });
            }
            std::thread::sleep(poll_interval);
        }
    }
}

// =============================================================================
// CONVENIENCE FUNCTIONS
// =============================================================================

/// Wait for a condition with a one-off timeout and default polling.
///
/// The poll interval is clamped to the timeout so a short budget still
/// polls instead of being rejected as an invalid configuration.
pub fn wait_until<R>(
    page: &dyn PageQuery,
    condition: &Condition<R>,
    timeout_ms: u64,
) -> EsperarResult<R> {
    let poll_interval_ms = DEFAULT_POLL_INTERVAL_MS.min(timeout_ms.max(1));
    let waiter = Waiter::with_config(
        WaitConfig::new()
            .with_timeout(timeout_ms)
            .with_poll_interval(poll_interval_ms),
    );
    Ok(waiter.until(page, condition)?.value)
}

/// Unconditional sleep. No polling, no condition.
///
/// Discouraged: prefer a condition wait, or [`settle`] when a fixed delay is
/// genuinely the only option.
pub fn hard_wait(duration: Duration) {
    std::thread::sleep(duration);
}

/// A named, fixed settle delay for letting an asynchronous UI effect finish
/// when no observable condition exists. The label shows up in debug logs so
/// the delay never hides inside an action sequence.
pub fn settle(duration: Duration, label: &str) {
    debug!(label, delay_ms = duration.as_millis() as u64, "settle wait");
    std::thread::sleep(duration);
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
mod tests {
    use super::*;
    use crate::result::QueryErrorKind;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    fn never_satisfied() -> Condition<()> {
        Condition::new("condition that never satisfies", |_| Ok(None))
    }

    fn counting_condition(
        counter: Arc<AtomicUsize>,
        result: impl Fn(usize) -> Result<Option<u32>, QueryError> + Send + Sync + 'static,
    ) -> Condition<u32> {
        Condition::new("counting condition", move |_| {
            let n = counter.fetch_add(1, Ordering::SeqCst);
            result(n)
        })
    }

    mod config_tests {
        use super::*;

        #[test]
        fn test_defaults() {
            let config = WaitConfig::default();
            assert_eq!(config.timeout_ms, DEFAULT_WAIT_TIMEOUT_MS);
            assert_eq!(config.poll_interval_ms, DEFAULT_POLL_INTERVAL_MS);
            assert!(config.ignores(QueryErrorKind::NotFound));
            assert!(!config.ignores(QueryErrorKind::ScriptError));
        }

        #[test]
        fn test_builder_chain() {
            let config = WaitConfig::new()
                .with_timeout(5_000)
                .with_poll_interval(100)
                .ignoring(QueryErrorKind::Stale);
            assert_eq!(config.timeout_ms, 5_000);
            assert_eq!(config.poll_interval_ms, 100);
            assert!(config.ignores(QueryErrorKind::Stale));
            assert!(config.ignores(QueryErrorKind::NotFound));
        }

        #[test]
        fn test_ignoring_nothing() {
            let config = WaitConfig::new().ignoring_nothing();
            assert!(!config.ignores(QueryErrorKind::NotFound));
        }

        #[test]
        fn test_validate_zero_poll_interval() {
            let config = WaitConfig::new().with_poll_interval(0);
            assert!(matches!(
                config.validate(),
                Err(EsperarError::Config { .. })
            ));
        }

        #[test]
        fn test_validate_timeout_below_poll_interval() {
            let config = WaitConfig::new().with_timeout(10).with_poll_interval(50);
            assert!(matches!(
                config.validate(),
                Err(EsperarError::Config { .. })
            ));
        }

        #[test]
        fn test_validate_timeout_equal_to_poll_interval() {
            let config = WaitConfig::new().with_timeout(50).with_poll_interval(50);
            assert!(config.validate().is_ok());
        }

        #[test]
        fn test_durations() {
            let config = WaitConfig::new().with_timeout(5_000).with_poll_interval(100);
            assert_eq!(config.timeout(), Duration::from_millis(5_000));
            assert_eq!(config.poll_interval(), Duration::from_millis(100));
        }
    }

    mod config_property_tests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn invalid_configs_always_rejected(timeout in 0u64..1_000, poll in 0u64..1_000) {
                let config = WaitConfig::new().with_timeout(timeout).with_poll_interval(poll);
                let valid = poll > 0 && timeout >= poll;
                prop_assert_eq!(config.validate().is_ok(), valid);
            }

            #[test]
            fn invalid_config_performs_zero_polls(
                (timeout, poll) in (0u64..1_000, 0u64..1_000)
                    .prop_filter("invalid only", |(t, p)| *p == 0 || t < p)
            ) {
                let page = crate::SimulatedPage::new();
                let polls = Arc::new(AtomicUsize::new(0));
                let condition = counting_condition(polls.clone(), |_| Ok(Some(1)));
                let waiter = Waiter::with_config(
                    WaitConfig::new().with_timeout(timeout).with_poll_interval(poll),
                );
                let outcome = waiter.until(&page, &condition);
                prop_assert!(
                    matches!(outcome, Err(EsperarError::Config { .. })),
                    "expected config error, got {:?}",
                    outcome
                );
                prop_assert_eq!(polls.load(Ordering::SeqCst), 0);
            }
        }
    }

    mod waiter_tests {
        use super::*;
        use crate::SimulatedPage;

        #[test]
        fn test_immediate_satisfaction_no_sleep() {
            let page = SimulatedPage::new();
            let condition = Condition::new("always satisfied", |_| Ok(Some(42)));
            let waiter =
                Waiter::with_config(WaitConfig::new().with_timeout(1_000).with_poll_interval(200));

            let start = Instant::now();
            let outcome = waiter.until(&page, &condition).unwrap();
            assert_eq!(outcome.value, 42);
            // Satisfied on the first evaluation: well under one poll interval
            assert!(start.elapsed() < Duration::from_millis(200));
        }

        #[test]
        fn test_timeout_window() {
            let page = SimulatedPage::new();
            let timeout = Duration::from_millis(100);
            let poll = Duration::from_millis(20);
            let waiter =
                Waiter::with_config(WaitConfig::new().with_timeout(100).with_poll_interval(20));

            let start = Instant::now();
            let err = waiter.until(&page, &never_satisfied()).unwrap_err();
            let elapsed = start.elapsed();

            match err {
                EsperarError::WaitTimeout { ms, waited_for } => {
                    assert_eq!(ms, 100);
                    assert!(waited_for.contains("never satisfies"));
                }
                other => panic!("expected WaitTimeout, got {other:?}"),
            }
            // Elapsed lands in [timeout, timeout + poll); allow two extra
            // intervals of scheduler jitter on loaded machines
            assert!(elapsed >= timeout);
            assert!(elapsed < timeout + poll * 3);
        }

        #[test]
        fn test_ignored_failures_then_success() {
            let page = SimulatedPage::new();
            let polls = Arc::new(AtomicUsize::new(0));
            let condition = counting_condition(polls.clone(), |n| {
                if n < 3 {
                    Err(QueryError::new(QueryErrorKind::NotFound, "not yet"))
                } else {
                    Ok(Some(7))
                }
            });
            let waiter =
                Waiter::with_config(WaitConfig::new().with_timeout(1_000).with_poll_interval(10));

            let outcome = waiter.until(&page, &condition).unwrap();
            assert_eq!(outcome.value, 7);
            assert_eq!(polls.load(Ordering::SeqCst), 4);
        }

        #[test]
        fn test_unignored_failure_propagates_immediately() {
            let page = SimulatedPage::new();
            let condition: Condition<u32> = Condition::new("script probe", |_| {
                Err(QueryError::new(QueryErrorKind::ScriptError, "boom"))
            });
            // Generous timeout proves the wait does not run it out
            let waiter =
                Waiter::with_config(WaitConfig::new().with_timeout(10_000).with_poll_interval(50));

            let start = Instant::now();
            let err = waiter.until(&page, &condition).unwrap_err();
            assert!(start.elapsed() < Duration::from_millis(1_000));
            match err {
                EsperarError::Query(query) => {
                    assert_eq!(query.kind, QueryErrorKind::ScriptError);
                }
                other => panic!("expected Query, got {other:?}"),
            }
        }

        #[test]
        fn test_extra_ignored_kind_keeps_polling() {
            let page = SimulatedPage::new();
            let polls = Arc::new(AtomicUsize::new(0));
            let condition = counting_condition(polls.clone(), |n| {
                if n == 0 {
                    Err(QueryError::new(QueryErrorKind::Stale, "detached"))
                } else {
                    Ok(Some(1))
                }
            });
            let waiter = Waiter::with_config(
                WaitConfig::new()
                    .with_timeout(500)
                    .with_poll_interval(10)
                    .ignoring(QueryErrorKind::Stale),
            );
            assert!(waiter.until(&page, &condition).is_ok());
        }

        #[test]
        fn test_wait_is_idempotent() {
            let page = SimulatedPage::new();
            let condition = Condition::new("always satisfied", |_| Ok(Some("ready")));
            let waiter =
                Waiter::with_config(WaitConfig::new().with_timeout(200).with_poll_interval(50));

            let first = waiter.until(&page, &condition).unwrap();
            let second = waiter.until(&page, &condition).unwrap();
            assert_eq!(first.value, "ready");
            assert_eq!(second.value, "ready");
        }

        #[test]
        fn test_condition_becomes_satisfied_mid_wait() {
            let page = SimulatedPage::new();
            let mutator = page.clone();
            std::thread::spawn(move || {
                std::thread::sleep(Duration::from_millis(50));
                mutator.set_ready_state("complete");
            });

            let condition = Condition::new("document ready", |page| {
                if page.ready_state()? == "complete" {
                    Ok(Some(()))
                } else {
                    Ok(None)
                }
            });
            let waiter =
                Waiter::with_config(WaitConfig::new().with_timeout(2_000).with_poll_interval(10));
            let outcome = waiter.until(&page, &condition).unwrap();
            assert_eq!(outcome.waited_for, "document ready");
        }
    }

    mod convenience_tests {
        use super::*;
        use crate::SimulatedPage;

        #[test]
        fn test_wait_until_unwraps_value() {
            let page = SimulatedPage::new();
            let condition = Condition::new("value", |_| Ok(Some(9)));
            assert_eq!(wait_until(&page, &condition, 200).unwrap(), 9);
        }

        #[test]
        fn test_wait_until_short_timeout_satisfies_immediately() {
            let page = SimulatedPage::new();
            // Timeout below the default poll interval: the interval clamps
            // down instead of invalidating the config.
            let condition = Condition::new("value", |_| Ok(Some(5)));
            assert_eq!(wait_until(&page, &condition, 50).unwrap(), 5);
        }

        #[test]
        fn test_wait_until_timeout() {
            let page = SimulatedPage::new();
            let err = wait_until(&page, &never_satisfied(), 100).unwrap_err();
            assert!(matches!(err, EsperarError::WaitTimeout { .. }));
        }

        #[test]
        fn test_hard_wait_sleeps() {
            let start = Instant::now();
            hard_wait(Duration::from_millis(30));
            assert!(start.elapsed() >= Duration::from_millis(30));
        }

        #[test]
        fn test_settle_sleeps() {
            let start = Instant::now();
            settle(Duration::from_millis(30), "hover effect");
            assert!(start.elapsed() >= Duration::from_millis(30));
        }
    }

    mod condition_tests {
        use super::*;
        use crate::SimulatedPage;

        #[test]
        fn test_description() {
            let condition: Condition<()> = Condition::new("title contains `redBus`", |_| Ok(None));
            assert_eq!(condition.description(), "title contains `redBus`");
        }

        #[test]
        fn test_debug_shows_description() {
            let condition: Condition<()> = Condition::new("probe", |_| Ok(None));
            assert!(format!("{condition:?}").contains("probe"));
        }

        #[test]
        fn test_evaluate_sees_fresh_state() {
            let page = SimulatedPage::new();
            let condition = Condition::new("title", |page: &dyn PageQuery| {
                let title = page.title()?;
                Ok(if title.is_empty() { None } else { Some(title) })
            });
            assert_eq!(condition.evaluate(&page).unwrap(), None);
            page.set_title("loaded");
            assert_eq!(
                condition.evaluate(&page).unwrap().as_deref(),
                Some("loaded")
            );
        }
    }
}
