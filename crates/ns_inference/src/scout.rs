use tracing::{info, warn};
use ns_core::{Error, FeedSource, Result, ScoutReport};
use crate::agent::AnalysisAgent;

/// Runs one scouting pass: fetch, analyze, keep the important findings.
///
/// A reply the agent cannot parse yields a report without findings; every other failure
/// is returned to the caller.
pub async fn build_report(
    feed_url: &str,
    max_articles: usize,
    fetcher: &dyn FeedSource,
    agent: &AnalysisAgent,
) -> Result<ScoutReport> {
    let articles = fetcher.fetch(feed_url, max_articles).await?;
    if articles.is_empty() {
        return Err(Error::EmptyFeed(feed_url.to_string()));
    }

    info!("🔍 Analyzing {} articles...", articles.len());
    let findings = match agent.analyze(&articles).await {
        Ok(findings) => findings,
        Err(e @ Error::Parse { .. }) => {
            warn!("⚠️ {}", e);
            if let Some(raw) = e.raw_response() {
                warn!("Raw model response: {}", raw);
            }
            Vec::new()
        }
        Err(e) => return Err(e),
    };

    let report = ScoutReport::new(articles.len(), findings);
    info!(
        "✅ Found {} important stories out of {} analyzed",
        report.important_findings.len(),
        report.analyzed_articles
    );
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use async_trait::async_trait;
    use ns_core::{Article, UrlDecoder};
    use crate::models::DummyModel;

    struct StaticFeed(Vec<Article>);

    #[async_trait]
    impl FeedSource for StaticFeed {
        async fn fetch(&self, _feed_url: &str, max_articles: usize) -> Result<Vec<Article>> {
            Ok(self.0.iter().take(max_articles).cloned().collect())
        }
    }

    struct KeepUrl;

    #[async_trait]
    impl UrlDecoder for KeepUrl {
        async fn decode(&self, url: &str) -> String {
            url.to_string()
        }
    }

    fn feed() -> StaticFeed {
        StaticFeed(vec![
            Article::new("One", "https://example.com/1"),
            Article::new("Two", "https://example.com/2"),
        ])
    }

    #[tokio::test]
    async fn test_empty_feed_is_an_error() {
        let model = Arc::new(DummyModel::new());
        let agent = AnalysisAgent::new(model.clone(), Arc::new(KeepUrl));
        let result = build_report("https://feed", 5, &StaticFeed(Vec::new()), &agent).await;

        assert!(matches!(result, Err(Error::EmptyFeed(_))));
        assert_eq!(model.call_count(), 0);
    }

    #[tokio::test]
    async fn test_parse_failure_degrades_to_empty_report() {
        let model = Arc::new(DummyModel::with_responses(["I'd rather not."]));
        let agent = AnalysisAgent::new(model, Arc::new(KeepUrl));
        let report = build_report("https://feed", 5, &feed(), &agent).await.unwrap();

        assert_eq!(report.analyzed_articles, 2);
        assert!(report.important_findings.is_empty());
    }

    #[tokio::test]
    async fn test_model_failure_propagates() {
        let agent = AnalysisAgent::new(Arc::new(DummyModel::new()), Arc::new(KeepUrl));
        let result = build_report("https://feed", 5, &feed(), &agent).await;
        assert!(matches!(result, Err(Error::Inference(_))));
    }

    #[tokio::test]
    async fn test_low_scores_are_filtered() {
        let reply = r#"[
            {"article_id": "a1", "importance_score": 4, "summary": "Minor."},
            {"article_id": "a2", "importance_score": 9, "summary": "Major."}
        ]"#;
        let agent = AnalysisAgent::new(Arc::new(DummyModel::with_responses([reply])), Arc::new(KeepUrl));
        let report = build_report("https://feed", 1, &feed(), &agent).await.unwrap();

        assert_eq!(report.analyzed_articles, 1);
        assert!(report.important_findings.is_empty());
    }
}
