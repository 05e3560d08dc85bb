use std::sync::Arc;
use ns_core::{FeedSource, ScoutReport};
use ns_feeds::{PassthroughDecoder, RssFetcher};
use ns_inference::agent::AnalysisAgent;
use ns_inference::evaluator::{reconstruct_inputs, Evaluator};
use ns_inference::models::DummyModel;
use ns_inference::scout::build_report;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const FEED: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<rss version="2.0">
  <channel>
    <title>World</title>
    <link>https://news.example.com</link>
    <description>World news</description>
    <item>
      <title>Ceasefire agreed in border conflict</title>
      <link>https://news.example.com/ceasefire</link>
      <pubDate>Tue, 04 Mar 2025 07:15:00 GMT</pubDate>
      <description>&lt;a href="https://other.example.com/ceasefire"&gt;More&lt;/a&gt;</description>
      <source url="https://www.reuters.com">Reuters</source>
    </item>
    <item>
      <title>Celebrity opens bakery</title>
      <link>https://news.example.com/bakery</link>
      <pubDate>Tue, 04 Mar 2025 06:00:00 GMT</pubDate>
    </item>
    <item>
      <title>Weather stays mild</title>
      <link>https://news.example.com/weather</link>
    </item>
  </channel>
</rss>"#;

async fn feed_server() -> MockServer {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/feed.xml"))
        .respond_with(ResponseTemplate::new(200).set_body_string(FEED))
        .mount(&server)
        .await;
    server
}

async fn scout(server: &MockServer, reply: &str) -> ScoutReport {
    let model = Arc::new(DummyModel::with_responses([reply]));
    let agent = AnalysisAgent::new(model, Arc::new(PassthroughDecoder));
    build_report(&format!("{}/feed.xml", server.uri()), 10, &RssFetcher::new(), &agent)
        .await
        .unwrap()
}

#[tokio::test]
async fn test_feed_to_report() {
    let server = feed_server().await;
    let articles = RssFetcher::new()
        .fetch(&format!("{}/feed.xml", server.uri()), 10)
        .await
        .unwrap();
    assert_eq!(articles.len(), 3);
    assert_eq!(articles.iter().filter(|a| a.publish_date.is_none()).count(), 1);

    let reply = r#"[
        {"importance_score": 8, "summary": "Fighting stops along the border.",
         "original_title": "Ceasefire agreed in border conflict",
         "original_link": "https://news.example.com/ceasefire", "reasoning": "Regional stability"},
        {"importance_score": 3, "summary": "A bakery opened.",
         "original_title": "Celebrity opens bakery",
         "original_link": "https://news.example.com/bakery", "reasoning": "Trivial"}
    ]"#;
    let report = scout(&server, reply).await;

    assert_eq!(report.analyzed_articles, 3);
    assert_eq!(report.important_findings.len(), 1);
    let finding = &report.important_findings[0];
    assert_eq!(finding.importance_score, 8);
    assert_eq!(finding.original_link, "https://news.example.com/ceasefire");
    assert!(finding.publish_date.is_some());
    assert_eq!(finding.source.as_deref(), Some("Reuters"));
    assert_eq!(finding.related_links, Some(vec!["https://other.example.com/ceasefire".to_string()]));
}

#[tokio::test]
async fn test_reply_wrapped_in_prose() {
    let server = feed_server().await;
    let reply = r#"Sure! Here is the JSON: [ {"article_id": "a1", "importance_score": 9, "summary": "Ceasefire.", "original_title": "Ceasefire agreed in border conflict"} ] Hope that helps!"#;
    let report = scout(&server, reply).await;

    assert_eq!(report.important_findings.len(), 1);
    assert_eq!(report.important_findings[0].original_title, "Ceasefire agreed in border conflict");
}

#[tokio::test]
async fn test_unmatched_titles_are_excluded() {
    let server = feed_server().await;
    let reply = r#"[
        {"importance_score": 9, "summary": "Invented.", "original_title": "Aliens land in Paris"},
        {"importance_score": 6, "summary": "Mild.", "original_title": "Weather stays mild"}
    ]"#;
    let report = scout(&server, reply).await;

    assert_eq!(report.analyzed_articles, 3);
    assert_eq!(report.important_findings.len(), 1);
    assert_eq!(report.important_findings[0].original_title, "Weather stays mild");
    assert!(report.important_findings[0].publish_date.is_none());
}

#[tokio::test]
async fn test_stored_report_is_evaluated() {
    let server = feed_server().await;
    let reply = r#"[{"article_id": "a1", "importance_score": 8, "summary": "Ceasefire.", "reasoning": "Stability"}]"#;
    let report = scout(&server, reply).await;

    let json = serde_json::to_string_pretty(&report).unwrap();
    let loaded: ScoutReport = serde_json::from_str(&json).unwrap();
    assert_eq!(loaded, report);

    let (articles, findings) = reconstruct_inputs(&loaded);
    assert_eq!(articles[0].publish_date, report.important_findings[0].publish_date);

    let judge = Arc::new(DummyModel::with_responses([
        r#"{"overall_score": 4.6, "scores": [{"criterion": "Relevance", "score": 5, "reasoning": "Major story"}], "strengths": ["Accurate"], "weaknesses": []}"#,
    ]));
    let evaluation = Evaluator::new(judge).evaluate_batch(&articles, &findings).await.unwrap();
    assert_eq!(evaluation.total_articles, 1);
    assert_eq!(evaluation.evaluations[0].article_title, "Ceasefire agreed in border conflict");
    assert!(evaluation.overall_feedback.starts_with("Overall Performance: Excellent"));
}

#[tokio::test]
async fn test_mismatched_batch_issues_no_calls() {
    let judge = Arc::new(DummyModel::new());
    let report = ScoutReport::new(0, Vec::new());
    let (_, findings) = reconstruct_inputs(&report);
    let articles = vec![ns_core::Article::new("Orphan", "https://example.com/orphan")];

    let result = Evaluator::new(judge.clone()).evaluate_batch(&articles, &findings).await;
    assert!(matches!(result, Err(ns_core::Error::CountMismatch { .. })));
    assert_eq!(judge.call_count(), 0);
}
