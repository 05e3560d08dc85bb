pub mod error;
pub mod models;
pub mod storage;
pub mod timestamp;
pub mod types;

pub use error::{Error, Result};
pub use models::{CompletionModel, CompletionRequest, FeedSource, UrlDecoder};
pub use storage::{ReportEntry, ReportStorage};
pub use types::{
    Article, ArticleEvaluation, CriterionScore, EvaluationReport, Finding, ScoutReport,
    IMPORTANCE_THRESHOLD, UNKNOWN_SOURCE,
};
