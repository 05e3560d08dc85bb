use std::path::{Path, PathBuf};
use async_trait::async_trait;
use chrono::{DateTime, Local};
use serde::Serialize;
use tokio::fs;
use tracing::{debug, info, warn};
use ns_core::{
    Error, EvaluationReport, ReportEntry, ReportStorage, Result, ScoutReport,
};
use crate::FileStorageConfig;

const SCOUT_PREFIX: &str = "scout_report_";
const EVALUATION_PREFIX: &str = "evaluation_";
const EXTENSION: &str = ".json";
const TIMESTAMP_FORMAT: &str = "%Y%m%d_%H%M%S";

/// Stores reports as pretty-printed JSON files in two flat directories.
#[derive(Debug, Clone)]
pub struct FileStorage {
    config: FileStorageConfig,
}

impl FileStorage {
    pub fn new(config: FileStorageConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &FileStorageConfig {
        &self.config
    }

    async fn write_json<T: Serialize>(dir: &Path, filename: &str, value: &T) -> Result<PathBuf> {
        fs::create_dir_all(dir).await?;
        let path = dir.join(filename);
        let json = serde_json::to_string_pretty(value)?;
        fs::write(&path, json).await?;
        Ok(path)
    }
}

fn timestamp() -> String {
    Local::now().format(TIMESTAMP_FORMAT).to_string()
}

fn scout_filename(label: &str) -> String {
    let label = slug::slugify(label);
    if label.is_empty() {
        format!("{}{}{}", SCOUT_PREFIX, timestamp(), EXTENSION)
    } else {
        format!("{}{}_{}{}", SCOUT_PREFIX, label, timestamp(), EXTENSION)
    }
}

/// The part of a scout report filename between the prefix and the extension.
pub fn report_description(path: &Path) -> String {
    let filename = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let description = filename.strip_prefix(SCOUT_PREFIX).unwrap_or(&filename);
    description
        .strip_suffix(EXTENSION)
        .unwrap_or(description)
        .to_string()
}

fn evaluation_filename(source: &Path) -> String {
    format!(
        "{}{}_{}{}",
        EVALUATION_PREFIX,
        report_description(source),
        timestamp(),
        EXTENSION
    )
}

fn is_scout_report(filename: &str) -> bool {
    filename.starts_with(SCOUT_PREFIX) && filename.ends_with(EXTENSION)
}

#[async_trait]
impl ReportStorage for FileStorage {
    async fn store_scout_report(&self, report: &ScoutReport, label: &str) -> Result<ReportEntry> {
        let filename = scout_filename(label);
        let path = Self::write_json(&self.config.reports_dir, &filename, report).await?;
        info!("💾 Report saved to {}", path.display());

        Ok(ReportEntry {
            filename,
            path,
            modified: Local::now(),
        })
    }

    async fn list_scout_reports(&self) -> Result<Vec<ReportEntry>> {
        let dir = &self.config.reports_dir;
        if !fs::try_exists(dir).await? {
            debug!("Reports directory {} does not exist yet", dir.display());
            return Ok(Vec::new());
        }

        let mut entries = Vec::new();
        let mut read_dir = fs::read_dir(dir).await?;
        while let Some(entry) = read_dir.next_entry().await? {
            let filename = entry.file_name().to_string_lossy().into_owned();
            if !is_scout_report(&filename) {
                continue;
            }

            let modified = match entry.metadata().await.and_then(|m| m.modified()) {
                Ok(modified) => DateTime::<Local>::from(modified),
                Err(e) => {
                    warn!("⚠️ Cannot read modification time of {}: {}", filename, e);
                    continue;
                }
            };

            entries.push(ReportEntry {
                filename,
                path: entry.path(),
                modified,
            });
        }

        entries.sort_by(|a, b| {
            b.modified
                .cmp(&a.modified)
                .then_with(|| b.filename.cmp(&a.filename))
        });
        Ok(entries)
    }

    async fn load_scout_report(&self, path: &Path) -> Result<ScoutReport> {
        let contents = fs::read_to_string(path).await.map_err(|e| {
            Error::Storage(format!("Failed to read report {}: {}", path.display(), e))
        })?;
        serde_json::from_str(&contents).map_err(|e| {
            Error::Storage(format!("Report {} is not a valid scout report: {}", path.display(), e))
        })
    }

    async fn store_evaluation(&self, evaluation: &EvaluationReport, source: &Path) -> Result<PathBuf> {
        let filename = evaluation_filename(source);
        let path = Self::write_json(&self.config.evaluations_dir, &filename, evaluation).await?;
        info!("💾 Evaluation saved to {}", path.display());
        Ok(path)
    }
}
