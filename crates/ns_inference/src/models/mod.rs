use std::sync::Arc;
use tracing::info;
use ns_core::{CompletionModel, Result};
use crate::Config;

pub mod dummy;
pub mod openai;

pub use dummy::DummyModel;
pub use openai::OpenAiModel;

/// Builds the completion backend serving `model_name` with the credentials in `config`.
pub fn create_model(config: &Config, model_name: &str) -> Result<Arc<dyn CompletionModel>> {
    let model = OpenAiModel::new(config, model_name)?;
    info!("🤖 Using completion model {} at {}", model_name, config.base_url);
    Ok(Arc::new(model))
}
