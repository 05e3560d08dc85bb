use std::fmt;
use std::sync::Arc;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, info, warn};
use ns_core::{
    Article, CompletionModel, CompletionRequest, Error, Finding, Result, UrlDecoder,
};
use crate::json::{extract_json, integer_score, JsonShape};

const SYSTEM_PROMPT: &str = r#"You are an assistant editor at a major news organization. Your sole task is to monitor incoming news feeds and identify the most important and breaking stories.

INSTRUCTIONS:
1. Analyze the provided list of recent news articles. Each article carries an "id".
2. Ignore minor updates, trivial stories, and redundant information. Focus on impact, novelty, and public interest.
3. For each article that is important or breaking news (importance_score >= 5):
    - Provide a RELEVANCE SCORE from 1-10 (10 is most important).
    - Write a concise ONE-SENTENCE SUMMARY of the story's significance.
    - Include brief reasoning for your score.
    - Echo the article's "id" as "article_id".
4. Return your analysis as a valid JSON array of objects and nothing else.

JSON FORMAT:
[
  {
    "article_id": "a1",
    "importance_score": 8,
    "summary": "A concise sentence explaining the story's impact and why it matters.",
    "original_title": "The original headline here",
    "original_link": "The original link here",
    "reasoning": "Brief explanation of why this score was assigned",
    "description": ["Link to related news articles"]
  }
]"#;

const UNKNOWN_DATE: &str = "Unknown";

/// How one article is presented to the analysis model.
#[derive(Debug, Serialize)]
struct PromptArticle<'a> {
    id: String,
    title: &'a str,
    link: &'a str,
    source: &'a str,
    pub_date: String,
    description: &'a [String],
}

/// One object of the model's reply, before it is checked against the input.
#[derive(Debug, Deserialize)]
struct RawFinding {
    #[serde(default)]
    article_id: Option<Value>,
    importance_score: Value,
    summary: String,
    #[serde(default)]
    original_title: Option<String>,
    #[serde(default)]
    original_link: Option<String>,
    #[serde(default)]
    reasoning: Option<String>,
    #[serde(default)]
    description: Option<Value>,
}

fn article_id(index: usize) -> String {
    format!("a{}", index + 1)
}

/// Scores a batch of articles with one completion call and ties every judgment back to
/// the article it describes.
pub struct AnalysisAgent {
    model: Arc<dyn CompletionModel>,
    decoder: Arc<dyn UrlDecoder>,
    temperature: f32,
}

impl fmt::Debug for AnalysisAgent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AnalysisAgent")
            .field("model", &self.model.name())
            .field("decoder", &"<dyn UrlDecoder>")
            .field("temperature", &self.temperature)
            .finish()
    }
}

impl AnalysisAgent {
    pub fn new(model: Arc<dyn CompletionModel>, decoder: Arc<dyn UrlDecoder>) -> Self {
        Self {
            model,
            decoder,
            temperature: 0.2,
        }
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    /// Returns the findings in the order the model listed them. Every finding's
    /// `original_link` has been passed through the decoder.
    pub async fn analyze(&self, articles: &[Article]) -> Result<Vec<Finding>> {
        if articles.is_empty() {
            return Ok(Vec::new());
        }

        let request = CompletionRequest::new(SYSTEM_PROMPT, user_prompt(articles)?, self.temperature);
        info!("🧠 Asking {} to analyze {} articles", self.model.name(), articles.len());
        let reply = self.model.complete(&request).await?;

        let items = match extract_json(&reply, JsonShape::Array)? {
            Value::Array(items) => items,
            _ => return Err(Error::parse("Expected a JSON array of findings", reply)),
        };

        let mut findings = Vec::with_capacity(items.len());
        for item in items {
            let raw: RawFinding = match serde_json::from_value(item) {
                Ok(raw) => raw,
                Err(e) => {
                    warn!("⚠️ Dropping malformed finding: {}", e);
                    continue;
                }
            };

            let Some(score) = integer_score(&raw.importance_score).filter(|s| (1..=10).contains(s)) else {
                warn!("⚠️ Dropping finding with invalid importance score {}", raw.importance_score);
                continue;
            };

            let Some(article) = match_article(articles, &raw) else {
                debug!(
                    "No input article matches finding {:?} / {:?}, dropping it",
                    raw.article_id, raw.original_title
                );
                continue;
            };

            let link = raw
                .original_link
                .as_deref()
                .map(str::trim)
                .filter(|l| !l.is_empty())
                .unwrap_or(article.link.as_str());
            let original_link = self.decoder.decode(link).await;

            let related_links = related_links(raw.description.as_ref()).or_else(|| {
                (!article.related_links.is_empty()).then(|| article.related_links.clone())
            });

            findings.push(Finding {
                importance_score: score as u8,
                summary: raw.summary,
                original_title: article.title.clone(),
                original_link,
                reasoning: raw.reasoning,
                related_links,
                source: Some(article.source.clone()),
                publish_date: article.publish_date,
            });
        }

        info!("📋 Model returned {} usable findings", findings.len());
        Ok(findings)
    }
}

fn user_prompt(articles: &[Article]) -> Result<String> {
    let payload: Vec<PromptArticle> = articles
        .iter()
        .enumerate()
        .map(|(index, article)| PromptArticle {
            id: article_id(index),
            title: &article.title,
            link: &article.link,
            source: &article.source,
            pub_date: article
                .publish_date
                .map(|d| ns_core::timestamp::format(&d))
                .unwrap_or_else(|| UNKNOWN_DATE.to_string()),
            description: &article.related_links,
        })
        .collect();

    Ok(format!(
        "Please analyze the following batch of articles:\n\n{}",
        serde_json::to_string_pretty(&payload)?
    ))
}

/// Prefers the echoed id and falls back to an exact title match.
fn match_article<'a>(articles: &'a [Article], raw: &RawFinding) -> Option<&'a Article> {
    let by_id = raw.article_id.as_ref().and_then(normalize_id).and_then(|id| {
        articles
            .iter()
            .enumerate()
            .find(|(index, _)| article_id(*index) == id)
            .map(|(_, article)| article)
    });

    by_id.or_else(|| {
        let title = raw.original_title.as_deref()?.trim();
        articles.iter().find(|article| article.title == title)
    })
}

/// Models echo `"a1"`, `"1"` or `1`; all of them name the first article.
fn normalize_id(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => {
            let s = s.trim();
            match s.parse::<u64>() {
                Ok(n) => Some(format!("a{}", n)),
                Err(_) if !s.is_empty() => Some(s.to_string()),
                Err(_) => None,
            }
        }
        Value::Number(n) => n.as_u64().map(|n| format!("a{}", n)),
        _ => None,
    }
}

fn related_links(description: Option<&Value>) -> Option<Vec<String>> {
    match description? {
        Value::Array(values) => Some(
            values
                .iter()
                .filter_map(Value::as_str)
                .map(str::to_string)
                .collect(),
        ),
        Value::String(s) if !s.trim().is_empty() => Some(vec![s.clone()]),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use async_trait::async_trait;
    use chrono::{TimeZone, Utc};
    use crate::models::DummyModel;

    #[derive(Default)]
    struct MapDecoder(HashMap<String, String>);

    #[async_trait]
    impl UrlDecoder for MapDecoder {
        async fn decode(&self, url: &str) -> String {
            self.0.get(url).cloned().unwrap_or_else(|| url.to_string())
        }
    }

    fn articles() -> Vec<Article> {
        vec![
            Article::new("Parliament passes budget", "https://news.google.com/rss/articles/AAA")
                .with_source("Reuters")
                .with_publish_date(Utc.with_ymd_and_hms(2025, 3, 3, 10, 0, 0).unwrap())
                .with_related_links(vec!["https://a.example.com/1".to_string()]),
            Article::new("Local fair opens", "https://news.example.com/fair"),
        ]
    }

    fn agent(model: Arc<DummyModel>) -> AnalysisAgent {
        let mut links = HashMap::new();
        links.insert(
            "https://news.google.com/rss/articles/AAA".to_string(),
            "https://reuters.com/budget".to_string(),
        );
        AnalysisAgent::new(model, Arc::new(MapDecoder(links)))
    }

    #[tokio::test]
    async fn test_analyze_builds_findings() {
        let reply = r#"[
            {"article_id": "a1", "importance_score": 8, "summary": "Budget passed.",
             "original_title": "Parliament passes budget",
             "original_link": "https://news.google.com/rss/articles/AAA",
             "reasoning": "National impact", "description": ["https://a.example.com/1"]}
        ]"#;
        let model = Arc::new(DummyModel::with_responses([reply]));
        let findings = agent(model.clone()).analyze(&articles()).await.unwrap();

        assert_eq!(findings.len(), 1);
        let finding = &findings[0];
        assert_eq!(finding.importance_score, 8);
        assert_eq!(finding.original_link, "https://reuters.com/budget");
        assert_eq!(finding.source.as_deref(), Some("Reuters"));
        assert!(finding.publish_date.is_some());
        assert_eq!(finding.related_links, Some(vec!["https://a.example.com/1".to_string()]));

        let requests = model.requests();
        assert_eq!(requests.len(), 1);
        assert!((requests[0].temperature - 0.2).abs() < f32::EPSILON);
        assert!(requests[0].user.contains("\"id\": \"a2\""));
        assert!(requests[0].user.contains("\"pub_date\": \"Unknown\""));
        assert!(requests[0].user.contains("\"pub_date\": \"2025-03-03T10:00:00Z\""));
    }

    #[tokio::test]
    async fn test_id_takes_precedence_over_title() {
        let reply = r#"[
            {"article_id": "a2", "importance_score": 6, "summary": "Fair.",
             "original_title": "Parliament passes budget"},
            {"article_id": "a9", "importance_score": 9, "summary": "Ghost.",
             "original_title": "Aliens land in Paris"}
        ]"#;
        let model = Arc::new(DummyModel::with_responses([reply]));
        let findings = agent(model).analyze(&articles()).await.unwrap();

        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].original_title, "Local fair opens");
        assert_eq!(findings[0].original_link, "https://news.example.com/fair");
        assert_eq!(findings[0].related_links, None);
    }

    #[tokio::test]
    async fn test_unusable_ids_fall_back_to_title() {
        let reply = r#"[
            {"article_id": 1, "importance_score": 8, "summary": "Numeric id.",
             "original_title": "Local fair opens"},
            {"article_id": "a9", "importance_score": 7, "summary": "Stale id.",
             "original_title": "Local fair opens"},
            {"article_id": {"id": 2}, "importance_score": 6, "summary": "Odd id.",
             "original_title": "Parliament passes budget"},
            {"article_id": "2", "importance_score": 5, "summary": "Bare number."}
        ]"#;
        let model = Arc::new(DummyModel::with_responses([reply]));
        let findings = agent(model).analyze(&articles()).await.unwrap();

        let titles: Vec<_> = findings.iter().map(|f| f.original_title.as_str()).collect();
        assert_eq!(
            titles,
            vec!["Parliament passes budget", "Local fair opens", "Parliament passes budget", "Local fair opens"]
        );
        assert_eq!(findings[0].summary, "Numeric id.");
    }

    #[tokio::test]
    async fn test_title_matching_without_ids() {
        let reply = r#"[
            {"importance_score": 7, "summary": "Budget.", "original_title": "Parliament passes budget",
             "description": "https://single.example.com"},
            {"importance_score": 9, "summary": "Unknown.", "original_title": "Something else entirely"}
        ]"#;
        let model = Arc::new(DummyModel::with_responses([reply]));
        let findings = agent(model).analyze(&articles()).await.unwrap();

        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].original_title, "Parliament passes budget");
        assert_eq!(findings[0].original_link, "https://reuters.com/budget");
        assert_eq!(findings[0].related_links, Some(vec!["https://single.example.com".to_string()]));
    }

    #[tokio::test]
    async fn test_invalid_items_are_dropped() {
        let reply = r#"[
            {"article_id": "a1", "importance_score": 11, "summary": "Too high."},
            {"article_id": "a1", "importance_score": "high", "summary": "Not a number."},
            {"article_id": "a1", "importance_score": 5},
            "not an object",
            {"article_id": "a2", "importance_score": 5.0, "summary": "Borderline."}
        ]"#;
        let model = Arc::new(DummyModel::with_responses([reply]));
        let findings = agent(model).analyze(&articles()).await.unwrap();

        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].importance_score, 5);
        assert_eq!(findings[0].summary, "Borderline.");
    }

    #[tokio::test]
    async fn test_unparseable_reply_is_parse_error() {
        let model = Arc::new(DummyModel::with_responses(["Nothing important happened today."]));
        let err = agent(model).analyze(&articles()).await.unwrap_err();
        assert!(matches!(err, Error::Parse { .. }));
        assert_eq!(err.raw_response(), Some("Nothing important happened today."));
    }

    #[tokio::test]
    async fn test_empty_input_skips_model() {
        let model = Arc::new(DummyModel::new());
        let findings = agent(model.clone()).analyze(&[]).await.unwrap();
        assert!(findings.is_empty());
        assert_eq!(model.call_count(), 0);
    }
}
