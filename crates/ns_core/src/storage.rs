use std::path::{Path, PathBuf};
use async_trait::async_trait;
use chrono::{DateTime, Local};
use crate::types::{EvaluationReport, ScoutReport};
use crate::Result;

/// A persisted scout report as seen in a listing.
#[derive(Debug, Clone, PartialEq)]
pub struct ReportEntry {
    pub filename: String,
    pub path: PathBuf,
    pub modified: DateTime<Local>,
}

#[async_trait]
pub trait ReportStorage: Send + Sync {
    /// Persist a scout report under a filename built from `label` and the current time
    async fn store_scout_report(&self, report: &ScoutReport, label: &str) -> Result<ReportEntry>;

    /// List stored scout reports, most recently modified first
    async fn list_scout_reports(&self) -> Result<Vec<ReportEntry>>;

    async fn load_scout_report(&self, path: &Path) -> Result<ScoutReport>;

    /// Persist an evaluation of the scout report stored at `source`
    async fn store_evaluation(&self, evaluation: &EvaluationReport, source: &Path) -> Result<PathBuf>;
}
