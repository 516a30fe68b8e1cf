//! Suite lifecycle listeners.
//!
//! Listeners observe a test run: suite start and finish, individual test
//! outcomes, and failure details. The built-in [`LogListener`] emits
//! structured tracing events; with the `notify` feature an [`HttpNotifier`]
//! can announce suite boundaries to an external recording service.
//! [`CompositeListener`] fans a run out to several listeners at once.

use std::time::Duration;

use tracing::{error, info, warn};
use uuid::Uuid;

// ===== TYPES =====

/// Outcome of a single test
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum TestStatus {
    /// Test completed without error
    Passed,
    /// Test raised an error or a wait timed out
    Failed,
    /// Test was not run
    Skipped,
}

impl std::fmt::Display for TestStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Passed => write!(f, "PASSED"),
            Self::Failed => write!(f, "FAILED"),
            Self::Skipped => write!(f, "SKIPPED"),
        }
    }
}

/// Record of one finished test
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct TestRecord {
    /// Test name
    pub name: String,
    /// Outcome
    pub status: TestStatus,
    /// Wall-clock duration
    pub duration: Duration,
    /// Error message, for failed tests
    pub error: Option<String>,
}

impl TestRecord {
    /// Record a passed test
    #[must_use]
    pub fn passed(name: impl Into<String>, duration: Duration) -> Self {
        Self {
            name: name.into(),
            status: TestStatus::Passed,
            duration,
            error: None,
        }
    }

    /// Record a failed test
    #[must_use]
    pub fn failed(name: impl Into<String>, duration: Duration, error: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            status: TestStatus::Failed,
            duration,
            error: Some(error.into()),
        }
    }

    /// Record a skipped test
    #[must_use]
    pub fn skipped(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            status: TestStatus::Skipped,
            duration: Duration::ZERO,
            error: None,
        }
    }
}

/// Summary of a finished suite
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct SuiteSummary {
    /// Suite name
    pub suite_name: String,
    /// Unique id for this run
    pub run_id: Uuid,
    /// All finished tests in execution order
    pub records: Vec<TestRecord>,
    /// Total wall-clock duration
    pub duration: Duration,
}

impl SuiteSummary {
    /// Number of passed tests
    #[must_use]
    pub fn passed(&self) -> usize {
        self.count(TestStatus::Passed)
    }

    /// Number of failed tests
    #[must_use]
    pub fn failed(&self) -> usize {
        self.count(TestStatus::Failed)
    }

    /// Number of skipped tests
    #[must_use]
    pub fn skipped(&self) -> usize {
        self.count(TestStatus::Skipped)
    }

    /// Whether every run test passed
    #[must_use]
    pub fn all_passed(&self) -> bool {
        self.failed() == 0
    }

    fn count(&self, status: TestStatus) -> usize {
        self.records.iter().filter(|r| r.status == status).count()
    }
}

// ===== LISTENER TRAIT =====

/// Observer of suite lifecycle events
pub trait SuiteListener: Send + Sync {
    /// Called once before any test runs
    fn on_suite_start(&self, _suite_name: &str, _run_id: Uuid) {}

    /// Called before each test
    fn on_test_start(&self, _test_name: &str) {}

    /// Called after each test finishes
    fn on_test_finish(&self, _record: &TestRecord) {}

    /// Called once after all tests finish
    fn on_suite_finish(&self, _summary: &SuiteSummary) {}
}

// ===== LOG LISTENER =====

/// Listener that emits structured tracing events
#[derive(Debug, Clone, Copy, Default)]
pub struct LogListener;

impl LogListener {
    /// Create a log listener
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl SuiteListener for LogListener {
    fn on_suite_start(&self, suite_name: &str, run_id: Uuid) {
        info!(suite = suite_name, run_id = %run_id, "suite started");
    }

    fn on_test_start(&self, test_name: &str) {
        info!(test = test_name, "test started");
    }

    fn on_test_finish(&self, record: &TestRecord) {
        match record.status {
            TestStatus::Passed => {
                info!(
                    test = %record.name,
                    duration_ms = record.duration.as_millis() as u64,
                    "test passed"
                );
            }
            TestStatus::Failed => {
                error!(
                    test = %record.name,
                    duration_ms = record.duration.as_millis() as u64,
                    error = record.error.as_deref().unwrap_or("unknown"),
                    "test failed"
                );
            }
            TestStatus::Skipped => {
                warn!(test = %record.name, "test skipped");
            }
        }
    }

    fn on_suite_finish(&self, summary: &SuiteSummary) {
        info!(
            suite = %summary.suite_name,
            run_id = %summary.run_id,
            passed = summary.passed(),
            failed = summary.failed(),
            skipped = summary.skipped(),
            duration_ms = summary.duration.as_millis() as u64,
            "suite finished"
        );
    }
}

// ===== HTTP NOTIFIER =====

/// Listener that announces suite boundaries to a recording service.
///
/// Notifications are best-effort: a network failure is logged and never
/// fails the run.
#[cfg(feature = "notify")]
#[derive(Debug, Clone)]
pub struct HttpNotifier {
    base_url: String,
    client: reqwest::blocking::Client,
}

#[cfg(feature = "notify")]
impl HttpNotifier {
    /// Create a notifier targeting a service base URL
    #[must_use]
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            client: reqwest::blocking::Client::new(),
        }
    }

    fn post_message(&self, path: &str, message: &str) {
        let url = format!("{}/{path}", self.base_url);
        let body = serde_json::json!({ "message": message });
        match self.client.post(&url).json(&body).send() {
            Ok(response) if response.status().is_success() => {
                info!(url = %url, "notification sent");
            }
            Ok(response) => {
                warn!(url = %url, status = %response.status(), "notification rejected");
            }
            Err(err) => {
                warn!(url = %url, error = %err, "notification failed");
            }
        }
    }
}

#[cfg(feature = "notify")]
impl SuiteListener for HttpNotifier {
    fn on_suite_start(&self, suite_name: &str, run_id: Uuid) {
        self.post_message(
            "start-recording",
            &format!("suite {suite_name} started (run {run_id})"),
        );
    }

    fn on_suite_finish(&self, summary: &SuiteSummary) {
        self.post_message(
            "stop-recording",
            &format!(
                "suite {} finished: {} passed, {} failed, {} skipped",
                summary.suite_name,
                summary.passed(),
                summary.failed(),
                summary.skipped()
            ),
        );
    }
}

// ===== COMPOSITE LISTENER =====

/// Fans suite events out to several listeners
#[derive(Default)]
pub struct CompositeListener {
    listeners: Vec<Box<dyn SuiteListener>>,
}

impl std::fmt::Debug for CompositeListener {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CompositeListener")
            .field("listeners", &self.listeners.len())
            .finish()
    }
}

impl CompositeListener {
    /// Create an empty composite
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a listener
    #[must_use]
    pub fn with(mut self, listener: impl SuiteListener + 'static) -> Self {
        self.listeners.push(Box::new(listener));
        self
    }

    /// Number of registered listeners
    #[must_use]
    pub fn len(&self) -> usize {
        self.listeners.len()
    }

    /// Whether no listeners are registered
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.listeners.is_empty()
    }
}

impl SuiteListener for CompositeListener {
    fn on_suite_start(&self, suite_name: &str, run_id: Uuid) {
        for listener in &self.listeners {
            listener.on_suite_start(suite_name, run_id);
        }
    }

    fn on_test_start(&self, test_name: &str) {
        for listener in &self.listeners {
            listener.on_test_start(test_name);
        }
    }

    fn on_test_finish(&self, record: &TestRecord) {
        for listener in &self.listeners {
            listener.on_test_finish(record);
        }
    }

    fn on_suite_finish(&self, summary: &SuiteSummary) {
        for listener in &self.listeners {
            listener.on_suite_finish(summary);
        }
    }
}

// ===== SUITE RUNNER =====

/// Tracks a suite run and drives listener callbacks.
///
/// ```
/// use std::time::Duration;
/// use esperar::listener::{LogListener, SuiteRun, TestRecord};
///
/// let mut run = SuiteRun::new("smoke", LogListener::new());
/// run.test_started("bus_search");
/// run.test_finished(TestRecord::passed("bus_search", Duration::from_millis(1200)));
/// let summary = run.finish();
/// assert!(summary.all_passed());
/// ```
pub struct SuiteRun<L: SuiteListener> {
    suite_name: String,
    run_id: Uuid,
    records: Vec<TestRecord>,
    started: std::time::Instant,
    listener: L,
}

impl<L: SuiteListener> SuiteRun<L> {
    /// Begin a suite run, firing `on_suite_start`
    pub fn new(suite_name: impl Into<String>, listener: L) -> Self {
        let suite_name = suite_name.into();
        let run_id = Uuid::new_v4();
        listener.on_suite_start(&suite_name, run_id);
        Self {
            suite_name,
            run_id,
            records: Vec::new(),
            started: std::time::Instant::now(),
            listener,
        }
    }

    /// The unique id of this run
    #[must_use]
    pub fn run_id(&self) -> Uuid {
        self.run_id
    }

    /// Announce a test is about to run
    pub fn test_started(&self, test_name: &str) {
        self.listener.on_test_start(test_name);
    }

    /// Record a finished test
    pub fn test_finished(&mut self, record: TestRecord) {
        self.listener.on_test_finish(&record);
        self.records.push(record);
    }

    /// Finish the run, firing `on_suite_finish`, and return the summary
    #[must_use]
    pub fn finish(self) -> SuiteSummary {
        let summary = SuiteSummary {
            suite_name: self.suite_name,
            run_id: self.run_id,
            records: self.records,
            duration: self.started.elapsed(),
        };
        self.listener.on_suite_finish(&summary);
        summary
    }
}

impl<L: SuiteListener + std::fmt::Debug> std::fmt::Debug for SuiteRun<L> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SuiteRun")
            .field("suite_name", &self.suite_name)
            .field("run_id", &self.run_id)
            .field("records", &self.records.len())
            .field("listener", &self.listener)
            .finish()
    }
}
