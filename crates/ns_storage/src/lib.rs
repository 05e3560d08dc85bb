use std::path::PathBuf;

pub mod backends;

pub use backends::fs::FileStorage;

pub const DEFAULT_REPORTS_DIR: &str = "reports";
pub const DEFAULT_EVALUATIONS_DIR: &str = "evaluations";

/// Where scout reports and their evaluations are written.
#[derive(Debug, Clone, PartialEq)]
pub struct FileStorageConfig {
    pub reports_dir: PathBuf,
    pub evaluations_dir: PathBuf,
}

impl FileStorageConfig {
    pub fn new(reports_dir: impl Into<PathBuf>, evaluations_dir: impl Into<PathBuf>) -> Self {
        Self {
            reports_dir: reports_dir.into(),
            evaluations_dir: evaluations_dir.into(),
        }
    }
}

impl Default for FileStorageConfig {
    fn default() -> Self {
        Self::new(DEFAULT_REPORTS_DIR, DEFAULT_EVALUATIONS_DIR)
    }
}

pub mod prelude {
    pub use super::backends::fs::FileStorage;
    pub use super::FileStorageConfig;
    pub use ns_core::{ReportEntry, ReportStorage};
}
