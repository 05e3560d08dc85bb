use std::fmt;
use std::io;
use std::path::PathBuf;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;
use clap::{Args, Parser, Subcommand};
use tracing::info;
use ns_core::UrlDecoder;
use ns_feeds::{DecoderConfig, GoogleNewsDecoder, RssFetcher, DEFAULT_MAX_ARTICLES};
use ns_inference::agent::AnalysisAgent;
use ns_inference::evaluator::Evaluator;
use ns_inference::{create_model, Config, DEFAULT_BASE_URL, DEFAULT_MODEL};
use ns_storage::{FileStorage, FileStorageConfig, DEFAULT_EVALUATIONS_DIR, DEFAULT_REPORTS_DIR};

mod display;
mod evaluate;
mod logging;
mod scheduler;

use evaluate::EvaluationDriver;
use scheduler::{Scheduler, ScoutSettings};

const DEFAULT_FEED_URL: &str = "https://news.google.com/rss?hl=en-US&gl=US&ceid=US:en";

#[derive(Debug, Clone, Copy, PartialEq)]
struct HumanDuration(Duration);

impl FromStr for HumanDuration {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let mut total_seconds = 0u64;
        let mut current_number = String::new();
        let mut has_value = false;

        for c in s.trim().chars() {
            if c.is_ascii_digit() {
                current_number.push(c);
            } else if c.is_whitespace() {
                continue;
            } else {
                let num: u64 = current_number
                    .parse()
                    .map_err(|_| format!("Expected a number before '{}'", c))?;
                total_seconds += match c {
                    's' => num,
                    'm' => num * 60,
                    'h' => num * 3600,
                    'd' => num * 86400,
                    _ => return Err(format!("Invalid duration unit: {}", c)),
                };
                current_number.clear();
                has_value = true;
            }
        }

        // A trailing bare number counts as seconds
        if !current_number.is_empty() {
            total_seconds += current_number
                .parse::<u64>()
                .map_err(|_| "Invalid number in duration".to_string())?;
            has_value = true;
        }

        if !has_value {
            return Err("Duration must include a number".to_string());
        }
        if total_seconds == 0 {
            return Err("Duration must be longer than zero".to_string());
        }

        Ok(HumanDuration(Duration::from_secs(total_seconds)))
    }
}

fn parse_batch_count(s: &str) -> std::result::Result<usize, String> {
    match s.trim().parse::<usize>() {
        Ok(0) => Err("Count must be at least 1".to_string()),
        Ok(count) => Ok(count),
        Err(_) => Err(format!("Invalid count: {}", s)),
    }
}

impl fmt::Display for HumanDuration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}s", self.0.as_secs())
    }
}

#[derive(Parser, Debug)]
#[command(name = "scout", author, version, about = "Scores important news from RSS feeds with an LLM and grades its own output", long_about = None)]
struct Cli {
    /// Directory scout reports are written to and read from
    #[arg(long, global = true, default_value = DEFAULT_REPORTS_DIR)]
    reports_dir: PathBuf,
    /// Directory evaluation reports are written to
    #[arg(long, global = true, default_value = DEFAULT_EVALUATIONS_DIR)]
    evaluations_dir: PathBuf,
    /// Model that analyzes the articles
    #[arg(long, global = true, env = "SCOUT_MODEL_NAME", default_value = DEFAULT_MODEL)]
    model_name: String,
    /// Model that grades the analysis
    #[arg(long, global = true, env = "SCOUT_JUDGE_MODEL_NAME", default_value = DEFAULT_MODEL)]
    judge_model_name: String,
    #[arg(long, global = true, env = "OPENAI_API_KEY", hide_env_values = true)]
    api_key: Option<String>,
    /// Base URL of the OpenAI-compatible completion API
    #[arg(long, global = true, env = "OPENAI_API_BASE_URL", default_value = DEFAULT_BASE_URL)]
    api_base_url: String,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Scout the feed now and then once per interval until Ctrl+C
    Run {
        #[arg(long, default_value = DEFAULT_FEED_URL)]
        feed: String,
        /// Label used in report filenames
        #[arg(long, default_value = "top-stories")]
        label: String,
        #[arg(long, default_value_t = DEFAULT_MAX_ARTICLES)]
        max_articles: usize,
        /// Time between runs (e.g. 1h, 30m, 1h15m30s)
        #[arg(long, default_value = "1h")]
        interval: HumanDuration,
        /// Stop after the first run
        #[arg(long)]
        once: bool,
    },
    /// Grade stored scout reports with the judge model
    Evaluate(EvaluateArgs),
}

#[derive(Args, Debug)]
#[group(multiple = false)]
struct EvaluateArgs {
    /// Evaluate the most recent report
    #[arg(long)]
    latest: bool,
    /// Evaluate a specific report
    #[arg(long, value_name = "PATH")]
    file: Option<PathBuf>,
    /// Evaluate the N most recent reports and show aggregate statistics
    #[arg(long, value_name = "COUNT", num_args = 0..=1, default_missing_value = "5", value_parser = parse_batch_count)]
    all: Option<usize>,
}

impl Cli {
    fn inference_config(&self) -> Config {
        Config {
            api_key: self.api_key.clone(),
            base_url: self.api_base_url.clone(),
            analysis_model: self.model_name.clone(),
            judge_model: self.judge_model_name.clone(),
            ..Config::default()
        }
    }

    fn storage(&self) -> FileStorage {
        FileStorage::new(FileStorageConfig::new(&self.reports_dir, &self.evaluations_dir))
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    logging::init_logging();
    let cli = Cli::parse();

    let config = cli.inference_config();
    info!("⚙️ {:?}", config);
    let storage = cli.storage();

    match cli.command {
        Commands::Run { feed, label, max_articles, interval, once } => {
            let model = create_model(&config, &config.analysis_model)?;
            let decoder: Arc<dyn UrlDecoder> = Arc::new(GoogleNewsDecoder::new(DecoderConfig::default()));
            let agent = AnalysisAgent::new(model, decoder).with_temperature(config.analysis_temperature);
            let fetcher = RssFetcher::new();

            let settings = ScoutSettings {
                feed_url: feed,
                label,
                max_articles,
                interval: interval.0,
                once,
            };
            info!("📡 Scouting {} every {}", settings.feed_url, interval);
            Scheduler::new(settings, &fetcher, &agent, &storage).run().await;
        }
        Commands::Evaluate(args) => {
            let judge = create_model(&config, &config.judge_model)?;
            let evaluator = Evaluator::new(judge).with_temperature(config.evaluation_temperature);
            let driver = EvaluationDriver::new(&storage, &evaluator);

            println!("\n--- News Scout Report Evaluator ---");
            println!("Evaluate existing scout reports from {}\n", cli.reports_dir.display());

            if args.latest {
                driver.report_failure(driver.evaluate_latest().await);
            } else if let Some(path) = args.file {
                driver.report_failure(driver.evaluate_file(&path).await);
            } else if let Some(count) = args.all {
                driver.report_failure(driver.evaluate_recent(count).await);
            } else {
                let stdin = io::stdin();
                driver.interactive(&mut stdin.lock(), &mut io::stdout()).await?;
            }
        }
    }

    Ok(())
}
