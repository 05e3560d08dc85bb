use std::time::Duration;
use chrono::Local;
use tracing::info;
use ns_core::{FeedSource, ReportEntry, ReportStorage, Result};
use ns_inference::agent::AnalysisAgent;
use ns_inference::scout::build_report;
use crate::display::format_scout_report;

#[derive(Debug, Clone)]
pub struct ScoutSettings {
    pub feed_url: String,
    pub label: String,
    pub max_articles: usize,
    pub interval: Duration,
    pub once: bool,
}

pub struct Scheduler<'a> {
    settings: ScoutSettings,
    fetcher: &'a dyn FeedSource,
    agent: &'a AnalysisAgent,
    storage: &'a dyn ReportStorage,
}

impl<'a> Scheduler<'a> {
    pub fn new(
        settings: ScoutSettings,
        fetcher: &'a dyn FeedSource,
        agent: &'a AnalysisAgent,
        storage: &'a dyn ReportStorage,
    ) -> Self {
        Self {
            settings,
            fetcher,
            agent,
            storage,
        }
    }

    /// Scouts the feed once, prints the report and persists it.
    pub async fn run_once(&self) -> Result<ReportEntry> {
        println!("[{}] Starting news scouting task...", Local::now().to_rfc3339());
        let report = build_report(
            &self.settings.feed_url,
            self.settings.max_articles,
            self.fetcher,
            self.agent,
        )
        .await?;

        print!("{}", format_scout_report(&report));
        self.storage.store_scout_report(&report, &self.settings.label).await
    }

    /// Runs immediately, then once per interval until Ctrl-C. A failed run is reported and
    /// the next one is still scheduled.
    pub async fn run(&self) {
        loop {
            tokio::select! {
                result = self.run_once() => {
                    if let Err(e) = result {
                        eprintln!("Error during scouting task: {}", e);
                    }
                }
                _ = tokio::signal::ctrl_c() => {
                    info!("🛑 Interrupted, stopping scheduler");
                    return;
                }
            }

            if self.settings.once {
                return;
            }

            info!("⏳ Next scouting run in {}s. Press Ctrl+C to exit.", self.settings.interval.as_secs());
            tokio::select! {
                _ = tokio::time::sleep(self.settings.interval) => {}
                _ = tokio::signal::ctrl_c() => {
                    info!("🛑 Interrupted, stopping scheduler");
                    return;
                }
            }
        }
    }
}
