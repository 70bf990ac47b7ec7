//! Test environment setup

use std::path::Path;
use std::sync::Once;
use tempfile::TempDir;

static INIT: Once = Once::new();

/// Initialize test environment
pub fn init_test_env() {
    INIT.call_once(|| {
        let _ = tracing_subscriber::fmt().with_test_writer().try_init();
    });
}

/// Temporary locale data directory
pub struct TestDataDir {
    pub temp_dir: TempDir,
}

impl TestDataDir {
    pub fn new() -> Result<Self, Box<dyn std::error::Error + Send + Sync>> {
        init_test_env();
        Self::new_without_logging()
    }

    /// For tests that install their own subscriber
    pub fn new_without_logging() -> Result<Self, Box<dyn std::error::Error + Send + Sync>> {
        Ok(Self { temp_dir: tempfile::tempdir()? })
    }

    /// Write `<locale>.json` with the given contents
    pub fn write_locale(&self, locale: &str, contents: &serde_json::Value) -> std::io::Result<()> {
        std::fs::write(self.path().join(format!("{}.json", locale)), contents.to_string())
    }

    pub fn path(&self) -> &Path {
        self.temp_dir.path()
    }

    pub fn path_string(&self) -> String {
        self.path().to_string_lossy().into_owned()
    }
}
