use std::fmt;
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};
use chrono::Local;
use ns_core::{EvaluationReport, ReportEntry, ReportStorage, Result};
use ns_inference::evaluator::{reconstruct_inputs, Evaluator};
use crate::display::{banner, format_evaluation_report, rule, Verdict};

pub const DEFAULT_BATCH_SIZE: usize = 5;
const MENU_LIMIT: usize = 10;
const DATE_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

#[derive(Debug, Clone, PartialEq)]
pub struct ScoredReport {
    pub filename: String,
    pub score: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Trend {
    Improving { recent: f64, older: f64 },
    Declining { recent: f64, older: f64 },
    Stable(f64),
}

impl Trend {
    /// Compares the two newest scores with the two oldest. `scores` is newest first.
    pub fn from_scores(scores: &[f64]) -> Option<Self> {
        if scores.len() < 2 {
            return None;
        }
        let recent = (scores[0] + scores[1]) / 2.0;
        let older = (scores[scores.len() - 2] + scores[scores.len() - 1]) / 2.0;

        Some(if recent > older {
            Trend::Improving { recent, older }
        } else if recent < older {
            Trend::Declining { recent, older }
        } else {
            Trend::Stable(recent)
        })
    }
}

impl fmt::Display for Trend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Trend::Improving { recent, older } => {
                write!(f, "↗ Improving (Recent: {:.2}, Older: {:.2})", recent, older)
            }
            Trend::Declining { recent, older } => {
                write!(f, "↘ Declining (Recent: {:.2}, Older: {:.2})", recent, older)
            }
            Trend::Stable(score) => write!(f, "→ Stable ({:.2})", score),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Aggregate {
    pub count: usize,
    pub mean: f64,
    pub best: ScoredReport,
    pub worst: ScoredReport,
    pub trend: Option<Trend>,
}

impl Aggregate {
    /// `scores` is ordered newest first.
    pub fn from_scores(scores: &[ScoredReport]) -> Option<Self> {
        let first = scores.first()?;
        let mut best = first;
        let mut worst = first;
        for scored in &scores[1..] {
            if scored.score > best.score {
                best = scored;
            }
            if scored.score < worst.score {
                worst = scored;
            }
        }

        let values: Vec<f64> = scores.iter().map(|s| s.score).collect();
        Some(Self {
            count: scores.len(),
            mean: values.iter().sum::<f64>() / values.len() as f64,
            best: best.clone(),
            worst: worst.clone(),
            trend: Trend::from_scores(&values),
        })
    }
}

impl fmt::Display for Aggregate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", banner("AGGREGATE STATISTICS"))?;
        writeln!(f, "Reports Evaluated: {}", self.count)?;
        writeln!(f, "Average Score: {:.2}/5.0", self.mean)?;
        writeln!(f, "Best Score: {:.2}/5.0 ({})", self.best.score, self.best.filename)?;
        write!(f, "Worst Score: {:.2}/5.0 ({})", self.worst.score, self.worst.filename)?;
        if let Some(trend) = &self.trend {
            write!(f, "\nTrend: {}", trend)?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuChoice {
    ChooseFromList,
    Latest,
    Batch,
    Exit,
}

impl MenuChoice {
    pub fn parse(input: &str) -> Option<Self> {
        match input.trim() {
            "1" => Some(Self::ChooseFromList),
            "2" => Some(Self::Latest),
            "3" => Some(Self::Batch),
            "4" => Some(Self::Exit),
            _ => None,
        }
    }
}

/// Blank or non-numeric input falls back to the default batch size.
pub fn parse_count(input: &str) -> usize {
    input
        .trim()
        .parse()
        .ok()
        .filter(|n| *n > 0)
        .unwrap_or(DEFAULT_BATCH_SIZE)
}

fn read_line<R: BufRead>(input: &mut R) -> io::Result<Option<String>> {
    let mut line = String::new();
    if input.read_line(&mut line)? == 0 {
        return Ok(None);
    }
    Ok(Some(line.trim().to_string()))
}

/// Lists up to ten reports and asks for one until a valid number or `q` is entered.
pub fn select_report<R: BufRead, W: Write>(
    reports: &[ReportEntry],
    input: &mut R,
    out: &mut W,
) -> io::Result<Option<PathBuf>> {
    let shown = &reports[..reports.len().min(MENU_LIMIT)];

    writeln!(out, "\n{}", banner("AVAILABLE SCOUT REPORTS"))?;
    for (index, entry) in shown.iter().enumerate() {
        writeln!(out, "{}. {}", index + 1, entry.filename)?;
        writeln!(out, "   Generated: {}", entry.modified.format(DATE_FORMAT))?;
    }
    if reports.len() > MENU_LIMIT {
        writeln!(out, "\n(Showing {} most recent out of {} total reports)", MENU_LIMIT, reports.len())?;
    }
    writeln!(out, "\nSelect a report to evaluate:")?;

    loop {
        write!(out, "Enter number (1-{}), or 'q' to quit: ", shown.len())?;
        out.flush()?;

        let Some(choice) = read_line(input)? else {
            return Ok(None);
        };
        if choice.eq_ignore_ascii_case("q") {
            return Ok(None);
        }
        match choice.parse::<usize>() {
            Ok(n) if (1..=shown.len()).contains(&n) => return Ok(Some(shown[n - 1].path.clone())),
            Ok(_) => writeln!(out, "Invalid choice. Please enter a number between 1 and {}", shown.len())?,
            Err(_) => writeln!(out, "Invalid input. Please enter a number or 'q'")?,
        }
    }
}

/// Loads stored scout reports, has the judge model grade them and saves the results.
pub struct EvaluationDriver<'a> {
    storage: &'a dyn ReportStorage,
    evaluator: &'a Evaluator,
}

impl<'a> EvaluationDriver<'a> {
    pub fn new(storage: &'a dyn ReportStorage, evaluator: &'a Evaluator) -> Self {
        Self { storage, evaluator }
    }

    /// Returns `None` when the report has no findings to grade.
    pub async fn evaluate_file(&self, path: &Path) -> Result<Option<EvaluationReport>> {
        println!("[{}] Starting evaluation of existing report...", Local::now().to_rfc3339());
        println!("Report: {}", file_name(path));
        println!("{}", rule('-'));

        println!("\n1. Loading Scout Report...");
        let report = self.storage.load_scout_report(path).await?;
        println!("   ✓ Loaded report from {}", ns_core::timestamp::format(&report.generated_at));
        println!("   ✓ Report analyzed {} articles", report.analyzed_articles);
        println!("   ✓ Found {} important stories", report.important_findings.len());

        if report.important_findings.is_empty() {
            println!("\n⚠️  No important findings to evaluate in this report.");
            return Ok(None);
        }

        println!("\n2. Reconstructing Article Data...");
        let (articles, findings) = reconstruct_inputs(&report);
        println!("   ✓ Reconstructed {} articles for evaluation", articles.len());

        println!("\n3. Evaluating Analysis Quality...");
        let evaluation = self.evaluator.evaluate_batch(&articles, &findings).await?;
        print!("{}", format_evaluation_report(&evaluation));

        let saved = self.storage.store_evaluation(&evaluation, path).await?;
        println!("Evaluation report saved to {}", saved.display());

        println!("\n{}", banner("EVALUATION SUMMARY"));
        println!("Original Report: {}", file_name(path));
        println!("Generated At: {}", ns_core::timestamp::format(&report.generated_at));
        println!("Evaluated Articles: {}", articles.len());
        println!("Average Quality Score: {:.2}/5.0", evaluation.average_score);
        println!("{}", Verdict::from_score(evaluation.average_score).line());

        Ok(Some(evaluation))
    }

    pub async fn evaluate_latest(&self) -> Result<Option<EvaluationReport>> {
        let reports = self.storage.list_scout_reports().await?;
        let Some(latest) = reports.first() else {
            print_no_reports();
            return Ok(None);
        };

        println!("\nEvaluating latest report: {}", latest.filename);
        println!("Generated: {}\n", latest.modified.format(DATE_FORMAT));
        self.evaluate_file(&latest.path).await
    }

    /// Evaluates the `count` most recent reports. Failures are reported per report and
    /// excluded from the aggregate.
    pub async fn evaluate_recent(&self, count: usize) -> Result<Option<Aggregate>> {
        let reports = self.storage.list_scout_reports().await?;
        let reports = &reports[..reports.len().min(count)];
        if reports.is_empty() {
            print_no_reports();
            return Ok(None);
        }

        println!("\nEvaluating {} most recent reports...", reports.len());
        println!("{}", rule('='));

        let mut scores = Vec::new();
        for (index, entry) in reports.iter().enumerate() {
            println!("\n[{}/{}] Evaluating: {}", index + 1, reports.len(), entry.filename);
            println!("{}", rule('-'));

            match self.evaluate_file(&entry.path).await {
                Ok(Some(evaluation)) => scores.push(ScoredReport {
                    filename: entry.filename.clone(),
                    score: evaluation.average_score,
                }),
                Ok(None) => {}
                Err(e) => eprintln!("Error evaluating report: {}", e),
            }
        }

        let aggregate = Aggregate::from_scores(&scores);
        if let Some(aggregate) = &aggregate {
            println!("\n{}", aggregate);
        }
        Ok(aggregate)
    }

    /// Menu shown when `evaluate` runs without a mode flag.
    pub async fn interactive<R: BufRead, W: Write>(&self, input: &mut R, out: &mut W) -> Result<()> {
        writeln!(out, "Select evaluation mode:")?;
        writeln!(out, "1) Choose from list of existing reports")?;
        writeln!(out, "2) Evaluate the latest report")?;
        writeln!(out, "3) Evaluate last {} reports (batch)", DEFAULT_BATCH_SIZE)?;
        writeln!(out, "4) Exit")?;
        write!(out, "\nEnter choice (1-4): ")?;
        out.flush()?;

        let choice = read_line(input)?.unwrap_or_default();
        match MenuChoice::parse(&choice) {
            Some(MenuChoice::ChooseFromList) => {
                let reports = self.storage.list_scout_reports().await?;
                if reports.is_empty() {
                    print_no_reports();
                    return Ok(());
                }
                if let Some(path) = select_report(&reports, input, out)? {
                    self.report_failure(self.evaluate_file(&path).await);
                }
            }
            Some(MenuChoice::Latest) => self.report_failure(self.evaluate_latest().await),
            Some(MenuChoice::Batch) => {
                write!(out, "How many recent reports to evaluate? (default: {}): ", DEFAULT_BATCH_SIZE)?;
                out.flush()?;
                let count = parse_count(&read_line(input)?.unwrap_or_default());
                self.evaluate_recent(count).await?;
            }
            Some(MenuChoice::Exit) => writeln!(out, "Exiting...")?,
            None => writeln!(out, "Invalid choice.")?,
        }
        Ok(())
    }

    /// Prints the error of a single-report evaluation instead of propagating it.
    pub fn report_failure<T>(&self, result: Result<T>) {
        if let Err(e) = result {
            eprintln!("Error during evaluation: {}", e);
        }
    }
}

fn print_no_reports() {
    println!("No scout reports found in the reports directory.");
    println!("Run `scout run --once` first to generate some reports.");
}
