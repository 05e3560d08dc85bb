//! Judge-model assessment of scout reports.

use std::fmt;
use std::sync::Arc;
use chrono::Utc;
use serde::Deserialize;
use serde_json::Value;
use tracing::info;
use ns_core::{
    Article, ArticleEvaluation, CompletionModel, CompletionRequest, CriterionScore, Error,
    EvaluationReport, Finding, Result, ScoutReport, UNKNOWN_SOURCE,
};
use crate::json::{decimal_score, extract_json, integer_score, JsonShape};

pub mod feedback;

pub use feedback::{overall_feedback, PerformanceBand};

pub const CRITERIA: [&str; 5] = [
    "Importance Score Accuracy",
    "Summary Quality",
    "Reasoning Clarity",
    "Consistency",
    "Relevance",
];

const SYSTEM_PROMPT: &str = r#"You are an expert evaluator assessing the quality of news article analysis performed by an AI assistant editor.

Your task is to evaluate how well the AI analyzed a news article based on these criteria:

1. **Importance Score Accuracy (1-5)**: Is the importance score (1-10) appropriate for this article? Consider impact, novelty, and public interest.

2. **Summary Quality (1-5)**: Is the one-sentence summary clear, concise, and captures the story's significance?

3. **Reasoning Clarity (1-5)**: Is the reasoning behind the score logical, specific, and well-justified?

4. **Consistency (1-5)**: Does the importance score align with the summary and reasoning provided?

5. **Relevance (1-5)**: Did the AI correctly identify whether this is truly important news (score >= 5) or should be filtered out?

For each criterion, provide:
- A score from 1-5 (5 = excellent, 1 = poor)
- Brief reasoning for the score

Also provide:
- Overall score (average of all criteria)
- 2-3 key strengths
- 2-3 key weaknesses
- Actionable suggestions for improvement

Return your evaluation as valid JSON in this format:
{
  "article_title": "original article title",
  "overall_score": 4.2,
  "scores": [
    {
      "criterion": "Importance Score Accuracy",
      "score": 4,
      "reasoning": "explanation here"
    }
  ],
  "strengths": ["strength 1", "strength 2"],
  "weaknesses": ["weakness 1", "weakness 2"],
  "suggestions": "specific suggestions for improvement"
}"#;

#[derive(Debug, Deserialize)]
struct RawCriterionScore {
    criterion: String,
    score: Value,
    #[serde(default)]
    reasoning: String,
}

#[derive(Debug, Deserialize)]
struct RawEvaluation {
    #[serde(default)]
    article_title: Option<String>,
    #[serde(default)]
    overall_score: Option<Value>,
    #[serde(default)]
    scores: Vec<RawCriterionScore>,
    #[serde(default)]
    strengths: Vec<String>,
    #[serde(default)]
    weaknesses: Vec<String>,
    #[serde(default)]
    suggestions: Option<String>,
}

pub struct Evaluator {
    model: Arc<dyn CompletionModel>,
    temperature: f32,
}

impl fmt::Debug for Evaluator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Evaluator")
            .field("model", &self.model.name())
            .field("temperature", &self.temperature)
            .finish()
    }
}

impl Evaluator {
    pub fn new(model: Arc<dyn CompletionModel>) -> Self {
        Self {
            model,
            temperature: 0.3,
        }
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    /// Asks the judge model to grade one finding against the article it came from.
    pub async fn evaluate_one(&self, article: &Article, finding: &Finding) -> Result<ArticleEvaluation> {
        let request = CompletionRequest::new(SYSTEM_PROMPT, user_prompt(article, finding), self.temperature);
        let reply = self.model.complete(&request).await?;

        let value = extract_json(&reply, JsonShape::Object)?;
        let raw: RawEvaluation = serde_json::from_value(value)
            .map_err(|e| Error::parse(format!("Evaluation has an unexpected layout: {}", e), reply.as_str()))?;

        into_evaluation(raw, article)
    }

    /// Grades every (article, finding) pair in order. Lengths must agree.
    pub async fn evaluate_batch(&self, articles: &[Article], findings: &[Finding]) -> Result<EvaluationReport> {
        if articles.len() != findings.len() {
            return Err(Error::CountMismatch {
                articles: articles.len(),
                findings: findings.len(),
            });
        }

        let mut evaluations = Vec::with_capacity(articles.len());
        for (index, (article, finding)) in articles.iter().zip(findings).enumerate() {
            info!("📝 Evaluating article {}/{}: {}", index + 1, articles.len(), article.title);
            evaluations.push(self.evaluate_one(article, finding).await?);
        }

        let average = if evaluations.is_empty() {
            0.0
        } else {
            evaluations.iter().map(|e| e.overall_score).sum::<f64>() / evaluations.len() as f64
        };
        let overall_feedback = overall_feedback(&evaluations, average);

        Ok(EvaluationReport {
            evaluated_at: Utc::now(),
            total_articles: articles.len(),
            average_score: round2(average),
            evaluations,
            overall_feedback,
        })
    }
}

/// Rebuilds the evaluator's inputs from a stored report, one article per finding.
pub fn reconstruct_inputs(report: &ScoutReport) -> (Vec<Article>, Vec<Finding>) {
    let articles = report
        .important_findings
        .iter()
        .map(|finding| Article {
            title: finding.original_title.clone(),
            link: finding.original_link.clone(),
            publish_date: finding.publish_date,
            source: finding.source.clone().unwrap_or_else(|| UNKNOWN_SOURCE.to_string()),
            related_links: finding.related_links.clone().unwrap_or_default(),
        })
        .collect();

    (articles, report.important_findings.clone())
}

fn user_prompt(article: &Article, finding: &Finding) -> String {
    let published = article
        .publish_date
        .map(|d| ns_core::timestamp::format(&d))
        .unwrap_or_else(|| "Unknown".to_string());

    format!(
        "Please evaluate this article analysis:\n\n\
         ORIGINAL ARTICLE:\n\
         Title: {}\n\
         Source: {}\n\
         Published: {}\n\
         Related Links: {} similar articles\n\n\
         AI ANALYSIS:\n\
         Importance Score: {}/10\n\
         Summary: {}\n\
         Reasoning: {}\n\n\
         Evaluate the quality of this analysis based on the criteria provided.",
        article.title,
        article.source,
        published,
        article.related_links.len(),
        finding.importance_score,
        finding.summary,
        finding.reasoning.as_deref().unwrap_or("Not provided"),
    )
}

fn into_evaluation(raw: RawEvaluation, article: &Article) -> Result<ArticleEvaluation> {
    let mut scores = Vec::with_capacity(raw.scores.len());
    for item in raw.scores {
        let score = integer_score(&item.score)
            .filter(|s| (1..=5).contains(s))
            .ok_or_else(|| {
                Error::Validation(format!(
                    "Score for '{}' must be a whole number from 1 to 5, got {}",
                    item.criterion, item.score
                ))
            })?;
        scores.push(CriterionScore {
            criterion: item.criterion,
            score: score as u8,
            reasoning: item.reasoning,
        });
    }

    let overall_score = match raw.overall_score.filter(|v| !v.is_null()) {
        Some(value) => decimal_score(&value).ok_or_else(|| {
            Error::Validation(format!("Overall score must be a number, got {}", value))
        })?,
        None if !scores.is_empty() => {
            scores.iter().map(|s| f64::from(s.score)).sum::<f64>() / scores.len() as f64
        }
        None => {
            return Err(Error::Validation(
                "Evaluation has neither an overall score nor criterion scores".to_string(),
            ))
        }
    };
    if !(1.0..=5.0).contains(&overall_score) {
        return Err(Error::Validation(format!(
            "Overall score must be between 1 and 5, got {}",
            overall_score
        )));
    }

    Ok(ArticleEvaluation {
        article_title: raw
            .article_title
            .filter(|t| !t.trim().is_empty())
            .unwrap_or_else(|| article.title.clone()),
        overall_score,
        scores,
        strengths: raw.strengths,
        weaknesses: raw.weaknesses,
        suggestions: raw.suggestions.unwrap_or_default(),
    })
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
