//! Screenshot persistence for test documentation and failure analysis.
//!
//! Features:
//! - Timestamped full-page screenshots
//! - Element-scoped and failure screenshots with naming prefixes
//! - Base64 export for report attachments
//! - Cleanup of stale captures
//!
//! Capture itself goes through [`PageQuery::screenshot`]; this module only
//! handles naming and persistence.

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use chrono::Local;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};
use tracing::{error, info, warn};

use crate::driver::PageQuery;
use crate::locator::Locator;
use crate::result::{EsperarError, EsperarResult};

/// Default directory for saved screenshots
pub const DEFAULT_SCREENSHOT_DIR: &str = "test-output/screenshots";

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d_%H-%M-%S";

/// Writes captured screenshots into a directory with timestamped names
#[derive(Debug, Clone)]
pub struct ScreenshotSink {
    dir: PathBuf,
}

impl ScreenshotSink {
    /// Create a sink rooted at `dir`, creating the directory if needed
    pub fn new(dir: impl Into<PathBuf>) -> EsperarResult<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }

    /// Create a sink at [`DEFAULT_SCREENSHOT_DIR`]
    pub fn with_default_dir() -> EsperarResult<Self> {
        Self::new(DEFAULT_SCREENSHOT_DIR)
    }

    /// Directory screenshots are written to
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn timestamped_path(&self, name: &str) -> PathBuf {
        let timestamp = Local::now().format(TIMESTAMP_FORMAT);
        self.dir.join(format!("{name}_{timestamp}.png"))
    }

    fn write(&self, page: &dyn PageQuery, name: &str) -> EsperarResult<PathBuf> {
        let shot = page.screenshot().map_err(|err| EsperarError::Screenshot {
            message: format!("capture failed for `{name}`: {err}"),
        })?;
        let path = self.timestamped_path(name);
        fs::write(&path, &shot.data)?;
        info!(path = %path.display(), bytes = shot.size_bytes(), "screenshot saved");
        Ok(path)
    }

    /// Capture the current viewport and save it under `name`
    pub fn save(&self, page: &dyn PageQuery, name: &str) -> EsperarResult<PathBuf> {
        self.write(page, name)
    }

    /// Capture a screenshot scoped to one entity.
    ///
    /// The entity must be present; the saved file carries an `element_`
    /// prefix so element captures sort together.
    pub fn save_element(
        &self,
        page: &dyn PageQuery,
        locator: &Locator,
        name: &str,
    ) -> EsperarResult<PathBuf> {
        page.find(locator)?;
        self.write(page, &format!("element_{name}"))
    }

    /// Best-effort failure screenshot with a `FAILED_` prefix.
    ///
    /// Never fails: a screenshot problem while a test is already failing
    /// must not mask the original error. Returns the path when one was
    /// written.
    pub fn save_failure(
        &self,
        page: &dyn PageQuery,
        test_name: &str,
        error_message: &str,
    ) -> Option<PathBuf> {
        error!(test = test_name, error = error_message, "test failed");
        match self.write(page, &format!("FAILED_{test_name}")) {
            Ok(path) => {
                info!(path = %path.display(), "failure screenshot saved");
                Some(path)
            }
            Err(err) => {
                warn!(test = test_name, %err, "failed to take failure screenshot");
                None
            }
        }
    }

    /// Save with the page's URL and title logged alongside for context
    pub fn save_with_info(
        &self,
        page: &dyn PageQuery,
        name: &str,
        test_info: &str,
    ) -> EsperarResult<PathBuf> {
        let url = page.url().unwrap_or_default();
        let title = page.title().unwrap_or_default();
        info!(test_info, url, title, "capturing screenshot with context");
        self.write(page, &format!("{name}_with_info"))
    }

    /// Capture and return the raw PNG bytes without persisting
    pub fn capture_bytes(&self, page: &dyn PageQuery) -> EsperarResult<Vec<u8>> {
        let shot = page.screenshot().map_err(|err| EsperarError::Screenshot {
            message: format!("capture failed: {err}"),
        })?;
        Ok(shot.data)
    }

    /// Capture and return the screenshot base64-encoded, for report embeds
    pub fn capture_base64(&self, page: &dyn PageQuery) -> EsperarResult<String> {
        Ok(BASE64.encode(self.capture_bytes(page)?))
    }

    /// Delete saved screenshots older than `max_age`; returns how many were
    /// removed
    pub fn cleanup_older_than(&self, max_age: Duration) -> EsperarResult<usize> {
        let cutoff = SystemTime::now().checked_sub(max_age);
        let Some(cutoff) = cutoff else {
            return Ok(0);
        };

        let mut removed = 0;
        for entry in fs::read_dir(&self.dir)? {
            let entry = entry?;
            let modified = entry.metadata()?.modified()?;
            if modified < cutoff {
                fs::remove_file(entry.path())?;
                info!(file = %entry.path().display(), "deleted old screenshot");
                removed += 1;
            }
        }
        Ok(removed)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
mod tests {
    use super::*;
    use crate::driver::{ElementHandle, SimulatedPage};

    fn page_with_screenshot() -> SimulatedPage {
        let page = SimulatedPage::new();
        page.set_screenshot(vec![0x89, b'P', b'N', b'G', 0, 1, 2, 3], 800, 600);
        page
    }

    #[test]
    fn test_save_writes_timestamped_png() {
        let dir = tempfile::tempdir().unwrap();
        let sink = ScreenshotSink::new(dir.path()).unwrap();
        let page = page_with_screenshot();

        let path = sink.save(&page, "redbus_homepage").unwrap();
        assert!(path.exists());
        let name = path.file_name().unwrap().to_string_lossy().into_owned();
        assert!(name.starts_with("redbus_homepage_"));
        assert!(name.ends_with(".png"));
        assert_eq!(fs::read(&path).unwrap().len(), 8);
    }

    #[test]
    fn test_save_creates_missing_directory() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("captures/run-1");
        let sink = ScreenshotSink::new(&nested).unwrap();
        assert!(nested.exists());
        assert!(sink.save(&page_with_screenshot(), "homepage").is_ok());
    }

    #[test]
    fn test_save_element_requires_presence() {
        let dir = tempfile::tempdir().unwrap();
        let sink = ScreenshotSink::new(dir.path()).unwrap();
        let page = page_with_screenshot();

        assert!(sink
            .save_element(&page, &Locator::id("logo"), "logo")
            .is_err());

        page.insert_element(Locator::id("logo"), ElementHandle::new("e1", "img"));
        let path = sink
            .save_element(&page, &Locator::id("logo"), "logo")
            .unwrap();
        assert!(path
            .file_name()
            .unwrap()
            .to_string_lossy()
            .starts_with("element_logo_"));
    }

    #[test]
    fn test_save_failure_prefix_and_best_effort() {
        let dir = tempfile::tempdir().unwrap();
        let sink = ScreenshotSink::new(dir.path()).unwrap();

        let path = sink
            .save_failure(&page_with_screenshot(), "testBusSearch", "element not found")
            .unwrap();
        assert!(path
            .file_name()
            .unwrap()
            .to_string_lossy()
            .starts_with("FAILED_testBusSearch_"));

        // No screenshot data configured: swallowed, not propagated
        let broken = SimulatedPage::new();
        assert!(sink.save_failure(&broken, "testBusSearch", "boom").is_none());
    }

    #[test]
    fn test_capture_base64_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let sink = ScreenshotSink::new(dir.path()).unwrap();
        let encoded = sink.capture_base64(&page_with_screenshot()).unwrap();
        let decoded = BASE64.decode(encoded).unwrap();
        assert_eq!(decoded.len(), 8);
    }

    #[test]
    fn test_capture_without_data_is_screenshot_error() {
        let dir = tempfile::tempdir().unwrap();
        let sink = ScreenshotSink::new(dir.path()).unwrap();
        let err = sink.capture_bytes(&SimulatedPage::new()).unwrap_err();
        assert!(matches!(err, EsperarError::Screenshot { .. }));
    }

    #[test]
    fn test_cleanup_keeps_recent_files() {
        let dir = tempfile::tempdir().unwrap();
        let sink = ScreenshotSink::new(dir.path()).unwrap();
        sink.save(&page_with_screenshot(), "recent").unwrap();

        let removed = sink.cleanup_older_than(Duration::from_secs(60 * 60)).unwrap();
        assert_eq!(removed, 0);
        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 1);
    }

    #[test]
    fn test_cleanup_removes_old_files() {
        let dir = tempfile::tempdir().unwrap();
        let sink = ScreenshotSink::new(dir.path()).unwrap();
        sink.save(&page_with_screenshot(), "old").unwrap();

        // Zero max age: everything already written is "old"
        std::thread::sleep(Duration::from_millis(20));
        let removed = sink.cleanup_older_than(Duration::from_millis(1)).unwrap();
        assert_eq!(removed, 1);
        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 0);
    }
}
