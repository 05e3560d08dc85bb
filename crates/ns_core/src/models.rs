use std::fmt;
use async_trait::async_trait;
use crate::types::Article;
use crate::Result;

/// One system + user message exchange sent to a chat-completion backend.
#[derive(Debug, Clone, PartialEq)]
pub struct CompletionRequest {
    pub system: String,
    pub user: String,
    pub temperature: f32,
}

impl CompletionRequest {
    pub fn new(system: impl Into<String>, user: impl Into<String>, temperature: f32) -> Self {
        Self {
            system: system.into(),
            user: user.into(),
            temperature,
        }
    }
}

#[async_trait]
pub trait CompletionModel: Send + Sync + fmt::Debug {
    fn name(&self) -> &str;

    /// Returns the raw text of the model's reply
    async fn complete(&self, request: &CompletionRequest) -> Result<String>;
}

#[async_trait]
pub trait FeedSource: Send + Sync {
    /// Fetch at most `max_articles` articles from the feed, in feed order
    async fn fetch(&self, feed_url: &str, max_articles: usize) -> Result<Vec<Article>>;
}

#[async_trait]
pub trait UrlDecoder: Send + Sync {
    /// Resolve an aggregator-wrapped URL. Never fails: returns `url` unchanged when it cannot.
    async fn decode(&self, url: &str) -> String;
}
