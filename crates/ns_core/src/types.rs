use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub const UNKNOWN_SOURCE: &str = "Unknown";

/// Lowest importance score that makes a finding worth reporting.
pub const IMPORTANCE_THRESHOLD: u8 = 5;

fn unknown_source() -> String {
    UNKNOWN_SOURCE.to_string()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Article {
    pub title: String,
    pub link: String,
    #[serde(default, with = "crate::timestamp::option")]
    pub publish_date: Option<DateTime<Utc>>,
    #[serde(default = "unknown_source")]
    pub source: String,
    #[serde(default)]
    pub related_links: Vec<String>,
}

impl Article {
    pub fn new(title: impl Into<String>, link: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            link: link.into(),
            publish_date: None,
            source: unknown_source(),
            related_links: Vec::new(),
        }
    }

    pub fn with_publish_date(mut self, publish_date: DateTime<Utc>) -> Self {
        self.publish_date = Some(publish_date);
        self
    }

    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = source.into();
        self
    }

    pub fn with_related_links(mut self, related_links: Vec<String>) -> Self {
        self.related_links = related_links;
        self
    }
}

/// One importance judgment produced by the analysis model and tied back to its article.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Finding {
    pub importance_score: u8,
    pub summary: String,
    pub original_title: String,
    pub original_link: String,
    #[serde(default)]
    pub reasoning: Option<String>,
    #[serde(default, alias = "description")]
    pub related_links: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    #[serde(
        default,
        with = "crate::timestamp::option",
        skip_serializing_if = "Option::is_none"
    )]
    pub publish_date: Option<DateTime<Utc>>,
}

impl Finding {
    pub fn is_important(&self) -> bool {
        self.importance_score >= IMPORTANCE_THRESHOLD
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoutReport {
    #[serde(with = "crate::timestamp")]
    pub generated_at: DateTime<Utc>,
    pub analyzed_articles: usize,
    pub important_findings: Vec<Finding>,
}

impl ScoutReport {
    /// Builds a report from every finding of a run, keeping only the important ones.
    pub fn new(analyzed_articles: usize, findings: Vec<Finding>) -> Self {
        Self {
            generated_at: Utc::now(),
            analyzed_articles,
            important_findings: findings.into_iter().filter(Finding::is_important).collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CriterionScore {
    pub criterion: String,
    pub score: u8,
    #[serde(default)]
    pub reasoning: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArticleEvaluation {
    pub article_title: String,
    pub overall_score: f64,
    pub scores: Vec<CriterionScore>,
    #[serde(default)]
    pub strengths: Vec<String>,
    #[serde(default)]
    pub weaknesses: Vec<String>,
    #[serde(default)]
    pub suggestions: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluationReport {
    #[serde(with = "crate::timestamp")]
    pub evaluated_at: DateTime<Utc>,
    pub total_articles: usize,
    pub average_score: f64,
    pub evaluations: Vec<ArticleEvaluation>,
    pub overall_feedback: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn finding(score: u8) -> Finding {
        Finding {
            importance_score: score,
            summary: "Summary".to_string(),
            original_title: format!("Title {}", score),
            original_link: "https://example.com".to_string(),
            reasoning: Some("Because".to_string()),
            related_links: Some(vec!["https://example.com/related".to_string()]),
            source: Some("Reuters".to_string()),
            publish_date: Some(Utc::now()),
        }
    }

    #[test]
    fn test_report_keeps_only_important_findings() {
        let report = ScoutReport::new(7, vec![finding(8), finding(3), finding(5), finding(4)]);
        assert_eq!(report.analyzed_articles, 7);
        assert_eq!(report.important_findings.len(), 2);
        assert!(report.important_findings.iter().all(|f| f.importance_score >= 5));
    }

    #[test]
    fn test_report_counts_articles_even_without_findings() {
        let report = ScoutReport::new(3, vec![finding(2)]);
        assert_eq!(report.analyzed_articles, 3);
        assert!(report.important_findings.is_empty());
    }

    #[test]
    fn test_report_round_trip() {
        let report = ScoutReport::new(2, vec![finding(9), finding(6)]);
        let json = serde_json::to_string_pretty(&report).unwrap();
        let loaded: ScoutReport = serde_json::from_str(&json).unwrap();
        assert_eq!(loaded, report);
    }

    #[test]
    fn test_finding_accepts_legacy_description_key() {
        let json = r#"{
            "importance_score": 7,
            "summary": "A summary",
            "original_title": "A title",
            "original_link": "https://example.com/a",
            "reasoning": null,
            "description": ["https://example.com/b"]
        }"#;
        let finding: Finding = serde_json::from_str(json).unwrap();
        assert_eq!(finding.related_links, Some(vec!["https://example.com/b".to_string()]));
        assert_eq!(finding.source, None);
        assert_eq!(finding.publish_date, None);
    }

    #[test]
    fn test_legacy_report_with_naive_timestamp_loads() {
        let json = r#"{
            "generated_at": "2025-04-02T09:30:00.250000",
            "analyzed_articles": 5,
            "important_findings": []
        }"#;
        let report: ScoutReport = serde_json::from_str(json).unwrap();
        assert_eq!(report.analyzed_articles, 5);
        assert_eq!(crate::timestamp::format(&report.generated_at), "2025-04-02T09:30:00.250Z");
    }

    #[test]
    fn test_article_defaults() {
        let article = Article::new("Title", "https://example.com");
        assert_eq!(article.source, UNKNOWN_SOURCE);
        assert!(article.publish_date.is_none());
        assert!(article.related_links.is_empty());
    }
}
