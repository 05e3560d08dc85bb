use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Feed error: {0}")]
    Feed(String),

    #[error("No news articles found in the feed: {0}")]
    EmptyFeed(String),

    /// The model answered, but no JSON of the expected shape could be recovered.
    #[error("Failed to parse model response: {message}")]
    Parse { message: String, raw: String },

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Number of articles ({articles}) must match number of analyses ({findings})")]
    CountMismatch { articles: usize, findings: usize },

    #[error("Inference error: {0}")]
    Inference(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("External error: {0}")]
    External(#[from] anyhow::Error),
}

impl Error {
    pub fn parse(message: impl Into<String>, raw: impl Into<String>) -> Self {
        Self::Parse {
            message: message.into(),
            raw: raw.into(),
        }
    }

    /// Raw model output attached to a parse failure, if any.
    pub fn raw_response(&self) -> Option<&str> {
        match self {
            Self::Parse { raw, .. } => Some(raw),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_count_mismatch_message() {
        let err = Error::CountMismatch { articles: 2, findings: 3 };
        assert_eq!(
            err.to_string(),
            "Number of articles (2) must match number of analyses (3)"
        );
    }

    #[test]
    fn test_parse_error_keeps_raw_response() {
        let err = Error::parse("no JSON array found", "Sorry, I can't help");
        assert_eq!(err.raw_response(), Some("Sorry, I can't help"));
        assert!(err.to_string().contains("no JSON array found"));
        assert_eq!(Error::Validation("x".into()).raw_response(), None);
    }
}
