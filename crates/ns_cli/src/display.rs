use std::fmt::Write;
use ns_core::{EvaluationReport, ScoutReport};

pub const RULE_WIDTH: usize = 80;

pub fn rule(c: char) -> String {
    c.to_string().repeat(RULE_WIDTH)
}

pub fn banner(title: &str) -> String {
    format!("{}\n{}\n{}", rule('='), title, rule('='))
}

pub fn format_scout_report(report: &ScoutReport) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Analyzed {} articles", report.analyzed_articles);
    let _ = writeln!(out, "Found {} important stories:", report.important_findings.len());

    for finding in &report.important_findings {
        let _ = writeln!(out, "\nScore: {}/10", finding.importance_score);
        let _ = writeln!(out, "Title: {}", finding.original_title);
        let _ = writeln!(out, "Summary: {}", finding.summary);
        if let Some(reasoning) = finding.reasoning.as_deref().filter(|r| !r.is_empty()) {
            let _ = writeln!(out, "Reasoning: {}", reasoning);
        }
        let _ = writeln!(out, "Link: {}", finding.original_link);
        let _ = writeln!(out, "{}", rule('-'));
    }
    out
}

pub fn format_evaluation_report(report: &EvaluationReport) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "\n{}", banner("EVALUATION REPORT"));
    let _ = writeln!(out, "Evaluated at: {}", ns_core::timestamp::format(&report.evaluated_at));
    let _ = writeln!(out, "Total Articles Evaluated: {}", report.total_articles);
    let _ = writeln!(out, "Average Score: {:.2}/5.0", report.average_score);
    let _ = writeln!(out, "\n{}", report.overall_feedback);
    let _ = writeln!(out, "\nDETAILED EVALUATIONS:");
    let _ = writeln!(out, "{}", rule('-'));

    for (index, evaluation) in report.evaluations.iter().enumerate() {
        let _ = writeln!(out, "\n{}. {}", index + 1, evaluation.article_title);
        let _ = writeln!(out, "   Overall Score: {:.1}/5.0", evaluation.overall_score);

        let _ = writeln!(out, "\n   Criterion Scores:");
        for score in &evaluation.scores {
            let _ = writeln!(out, "   - {}: {}/5", score.criterion, score.score);
            let _ = writeln!(out, "     {}", score.reasoning);
        }

        if !evaluation.strengths.is_empty() {
            let _ = writeln!(out, "\n   Strengths:");
            for strength in &evaluation.strengths {
                let _ = writeln!(out, "   ✓ {}", strength);
            }
        }

        if !evaluation.weaknesses.is_empty() {
            let _ = writeln!(out, "\n   Weaknesses:");
            for weakness in &evaluation.weaknesses {
                let _ = writeln!(out, "   ✗ {}", weakness);
            }
        }

        if !evaluation.suggestions.is_empty() {
            let _ = writeln!(out, "\n   Suggestions: {}", evaluation.suggestions);
        }
        let _ = writeln!(out, "{}", rule('-'));
    }
    out
}

/// One-line judgement printed after an evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Excellent,
    VeryGood,
    Good,
    Fair,
    Poor,
}

impl Verdict {
    pub fn from_score(score: f64) -> Self {
        match score {
            s if s >= 4.5 => Self::Excellent,
            s if s >= 4.0 => Self::VeryGood,
            s if s >= 3.5 => Self::Good,
            s if s >= 3.0 => Self::Fair,
            _ => Self::Poor,
        }
    }

    pub fn line(self) -> &'static str {
        match self {
            Self::Excellent => "✓ Agent performance: EXCELLENT - Keep it up!",
            Self::VeryGood => "✓ Agent performance: VERY GOOD - Minor improvements possible",
            Self::Good => "⚠ Agent performance: GOOD - Some improvements recommended",
            Self::Fair => "⚠ Agent performance: FAIR - Consider reviewing prompts",
            Self::Poor => "✗ Agent performance: POOR - Prompts need significant improvement",
        }
    }
}
