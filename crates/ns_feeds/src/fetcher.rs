use async_trait::async_trait;
use feed_rs::model::Entry;
use reqwest::Client;
use tracing::{debug, info};
use ns_core::{Article, Error, FeedSource, Result, UNKNOWN_SOURCE};
use crate::links::extract_hrefs;

pub const DEFAULT_MAX_ARTICLES: usize = 5;

/// Fetches RSS/Atom feeds over HTTP and turns their entries into articles.
#[derive(Debug, Clone, Default)]
pub struct RssFetcher {
    client: Client,
}

impl RssFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_client(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl FeedSource for RssFetcher {
    async fn fetch(&self, feed_url: &str, max_articles: usize) -> Result<Vec<Article>> {
        info!("📡 Fetching feed {}", feed_url);
        let bytes = self.client
            .get(feed_url)
            .send()
            .await?
            .error_for_status()?
            .bytes()
            .await?;

        let articles = parse_feed(&bytes, max_articles)?;
        info!("📰 Fetched {} articles from feed", articles.len());
        Ok(articles)
    }
}

/// Parses raw feed bytes into at most `max_articles` articles, keeping feed order.
pub fn parse_feed(bytes: &[u8], max_articles: usize) -> Result<Vec<Article>> {
    let feed = feed_rs::parser::parse(bytes)
        .map_err(|e| Error::Feed(format!("Failed to parse feed: {}", e)))?;

    let mut item_sources = rss_item_sources(bytes);
    if item_sources.len() != feed.entries.len() {
        item_sources.clear();
    }
    let item_sources = item_sources.into_iter().chain(std::iter::repeat(None));

    Ok(feed
        .entries
        .into_iter()
        .zip(item_sources)
        .take(max_articles)
        .filter_map(|(entry, item_source)| article_from_entry(entry, item_source))
        .collect())
}

/// Publisher names from RSS 2.0 `<source>` elements, one slot per item. feed-rs only
/// exposes `source` for Atom entries. Empty for anything that is not an RSS channel.
fn rss_item_sources(bytes: &[u8]) -> Vec<Option<String>> {
    match rss::Channel::read_from(bytes) {
        Ok(channel) => channel
            .items()
            .iter()
            .map(|item| item.source().and_then(|s| s.title()).map(str::to_string))
            .collect(),
        Err(e) => {
            debug!("Not reading RSS <source> elements: {}", e);
            Vec::new()
        }
    }
}

fn article_from_entry(entry: Entry, item_source: Option<String>) -> Option<Article> {
    let Some(title) = entry.title.map(|t| t.content) else {
        debug!("Skipping feed entry {} without a title", entry.id);
        return None;
    };
    let Some(link) = entry.links.into_iter().next().map(|l| l.href) else {
        debug!("Skipping feed entry '{}' without a link", title);
        return None;
    };

    let source = [item_source, entry.source]
        .into_iter()
        .flatten()
        .chain(entry.authors.into_iter().map(|p| p.name))
        .map(|s| s.trim().to_string())
        .find(|s| !s.is_empty())
        .unwrap_or_else(|| UNKNOWN_SOURCE.to_string());

    let related_links = entry
        .summary
        .map(|summary| extract_hrefs(&summary.content))
        .unwrap_or_default();

    Some(Article {
        title,
        link,
        publish_date: entry.published,
        source,
        related_links,
    })
}
