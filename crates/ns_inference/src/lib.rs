use std::fmt;

pub mod agent;
pub mod evaluator;
pub mod json;
pub mod models;
pub mod scout;

pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";
pub const DEFAULT_MODEL: &str = "gemini-2.0-flash";

/// Settings for the completion backend and the two roles it plays.
#[derive(Clone)]
pub struct Config {
    pub api_key: Option<String>,
    pub base_url: String,
    pub analysis_model: String,
    pub judge_model: String,
    pub analysis_temperature: f32,
    pub evaluation_temperature: f32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: DEFAULT_BASE_URL.to_string(),
            analysis_model: DEFAULT_MODEL.to_string(),
            judge_model: DEFAULT_MODEL.to_string(),
            analysis_temperature: 0.2,
            evaluation_temperature: 0.3,
        }
    }
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("base_url", &self.base_url)
            .field("analysis_model", &self.analysis_model)
            .field("judge_model", &self.judge_model)
            .field("analysis_temperature", &self.analysis_temperature)
            .field("evaluation_temperature", &self.evaluation_temperature)
            .finish()
    }
}

pub mod prelude {
    pub use super::Config;
    pub use super::agent::AnalysisAgent;
    pub use super::evaluator::{reconstruct_inputs, Evaluator};
    pub use super::models::create_model;
    pub use super::scout::build_report;
    pub use ns_core::{Article, Error, Finding, Result, ScoutReport};
}

pub use models::create_model;
