use std::collections::HashSet;
use std::fmt;
use ns_core::ArticleEvaluation;

const MAX_LISTED: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PerformanceBand {
    Excellent,
    VeryGood,
    Good,
    Satisfactory,
    NeedsImprovement,
}

impl PerformanceBand {
    pub fn from_score(score: f64) -> Self {
        if score >= 4.5 {
            Self::Excellent
        } else if score >= 4.0 {
            Self::VeryGood
        } else if score >= 3.5 {
            Self::Good
        } else if score >= 3.0 {
            Self::Satisfactory
        } else {
            Self::NeedsImprovement
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Excellent => "excellent",
            Self::VeryGood => "very good",
            Self::Good => "good",
            Self::Satisfactory => "satisfactory",
            Self::NeedsImprovement => "needs improvement",
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            Self::Excellent => "Excellent",
            Self::VeryGood => "Very Good",
            Self::Good => "Good",
            Self::Satisfactory => "Satisfactory",
            Self::NeedsImprovement => "Needs Improvement",
        }
    }
}

impl fmt::Display for PerformanceBand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// The first `limit` distinct items, in first-seen order.
fn first_unique<'a, I>(items: I, limit: usize) -> Vec<&'a str>
where
    I: IntoIterator<Item = &'a String>,
{
    let mut seen = HashSet::new();
    items
        .into_iter()
        .map(|s| s.trim())
        .filter(|s| !s.is_empty() && seen.insert(*s))
        .take(limit)
        .collect()
}

pub fn overall_feedback(evaluations: &[ArticleEvaluation], average_score: f64) -> String {
    let band = PerformanceBand::from_score(average_score);
    let mut feedback = format!(
        "Overall Performance: {} (Average Score: {:.2}/5.0)\n\n",
        band.title(),
        average_score
    );

    let strengths = first_unique(evaluations.iter().flat_map(|e| &e.strengths), MAX_LISTED);
    if !strengths.is_empty() {
        feedback.push_str("Common Strengths:\n");
        for strength in strengths {
            feedback.push_str(&format!("  - {}\n", strength));
        }
    }

    let weaknesses = first_unique(evaluations.iter().flat_map(|e| &e.weaknesses), MAX_LISTED);
    if !weaknesses.is_empty() {
        feedback.push_str("\nAreas for Improvement:\n");
        for weakness in weaknesses {
            feedback.push_str(&format!("  - {}\n", weakness));
        }
    }

    feedback
}
