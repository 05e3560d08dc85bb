//! Resolution of aggregator-wrapped article links.
//!
//! Google News hands out `news.google.com/rss/articles/<id>` links instead of publisher
//! URLs. Resolving one takes two requests: the article page carries a signature and a
//! timestamp for the id, and the `batchexecute` endpoint trades those for the real URL.

use std::time::Duration;
use async_trait::async_trait;
use reqwest::Client;
use scraper::{Html, Selector};
use serde_json::{json, Value};
use tracing::{debug, warn};
use url::Url;
use ns_core::{Error, Result, UrlDecoder};

const GOOGLE_NEWS_HOST: &str = "news.google.com";
const BATCH_EXECUTE_PATH: &str = "/_/DotsSplashUi/data/batchexecute";
const USER_AGENT: &str = "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/129.0.0.0 Safari/537.36";

#[derive(Debug, Clone)]
pub struct DecoderConfig {
    /// Where article pages and `batchexecute` are requested from
    pub base_url: String,
    /// Pause after every network decode
    pub interval: Duration,
}

impl Default for DecoderConfig {
    fn default() -> Self {
        Self {
            base_url: format!("https://{}", GOOGLE_NEWS_HOST),
            interval: Duration::from_secs(1),
        }
    }
}

/// Returns every URL unchanged.
#[derive(Debug, Clone, Default)]
pub struct PassthroughDecoder;

#[async_trait]
impl UrlDecoder for PassthroughDecoder {
    async fn decode(&self, url: &str) -> String {
        url.to_string()
    }
}

#[derive(Debug, Clone, PartialEq)]
struct DecodingParams {
    signature: String,
    timestamp: String,
}

#[derive(Debug, Clone)]
pub struct GoogleNewsDecoder {
    client: Client,
    config: DecoderConfig,
}

impl GoogleNewsDecoder {
    pub fn new(config: DecoderConfig) -> Self {
        Self {
            client: Client::new(),
            config,
        }
    }

    /// Decodes `url`, reporting why it could not be decoded.
    pub async fn try_decode(&self, url: &str) -> Result<String> {
        let article_id = article_id(url)
            .ok_or_else(|| Error::Validation(format!("Invalid Google News URL format: {}", url)))?;

        let params = self.fetch_decoding_params(&article_id).await?;
        let decoded = self.request_decoded_url(&article_id, &params).await;

        if !self.config.interval.is_zero() {
            tokio::time::sleep(self.config.interval).await;
        }

        decoded
    }

    async fn fetch_decoding_params(&self, article_id: &str) -> Result<DecodingParams> {
        let base = self.config.base_url.trim_end_matches('/');
        let candidates = [
            format!("{}/articles/{}", base, article_id),
            format!("{}/rss/articles/{}", base, article_id),
        ];

        let mut last_error = None;
        for page_url in candidates {
            match self.fetch_page(&page_url).await {
                Ok(html) => match extract_decoding_params(&html) {
                    Some(params) => return Ok(params),
                    None => {
                        last_error = Some(Error::Validation(format!(
                            "No decoding parameters found at {}",
                            page_url
                        )))
                    }
                },
                Err(e) => last_error = Some(e),
            }
        }

        Err(last_error.unwrap_or_else(|| Error::Validation("No article page to read".to_string())))
    }

    async fn fetch_page(&self, page_url: &str) -> Result<String> {
        let html = self.client
            .get(page_url)
            .header("User-Agent", USER_AGENT)
            .send()
            .await?
            .error_for_status()?
            .text()
            .await?;
        Ok(html)
    }

    async fn request_decoded_url(&self, article_id: &str, params: &DecodingParams) -> Result<String> {
        let endpoint = format!("{}{}", self.config.base_url.trim_end_matches('/'), BATCH_EXECUTE_PATH);
        let body = self.client
            .post(endpoint)
            .header("User-Agent", USER_AGENT)
            .form(&[("f.req", batch_request(article_id, params))])
            .send()
            .await?
            .error_for_status()?
            .text()
            .await?;

        parse_batch_response(&body)
    }
}

#[async_trait]
impl UrlDecoder for GoogleNewsDecoder {
    async fn decode(&self, url: &str) -> String {
        if article_id(url).is_none() {
            debug!("Not an aggregator link, keeping {}", url);
            return url.to_string();
        }

        match self.try_decode(url).await {
            Ok(decoded) => {
                debug!("🔗 Decoded {} -> {}", url, decoded);
                decoded
            }
            Err(e) => {
                warn!("⚠️ Error decoding URL {}: {}", url, e);
                url.to_string()
            }
        }
    }
}

/// The encoded article id of a Google News link, if `url` is one.
fn article_id(url: &str) -> Option<String> {
    let parsed = Url::parse(url).ok()?;
    if parsed.host_str()? != GOOGLE_NEWS_HOST {
        return None;
    }

    let segments: Vec<&str> = parsed.path_segments()?.filter(|s| !s.is_empty()).collect();
    match segments.as_slice() {
        [.., kind, id] if *kind == "articles" || *kind == "read" => Some(id.to_string()),
        _ => None,
    }
}

fn extract_decoding_params(html: &str) -> Option<DecodingParams> {
    let document = Html::parse_document(html);
    let selector = Selector::parse("c-wiz > div[jscontroller]").ok()?;
    let div = document.select(&selector).next()?;

    Some(DecodingParams {
        signature: div.value().attr("data-n-a-sg")?.to_string(),
        timestamp: div.value().attr("data-n-a-ts")?.to_string(),
    })
}

fn batch_request(article_id: &str, params: &DecodingParams) -> String {
    let inner = format!(
        r#"["garturlreq",[["X","X",["X","X"],null,null,1,1,"US:en",null,1,null,null,null,null,null,0,1],"X","X",1,[1,1,1],1,1,null,0,0,null,0],"{}",{},"{}"]"#,
        article_id, params.timestamp, params.signature
    );
    json!([[["Fbv4je", inner, null, "generic"]]]).to_string()
}

fn parse_batch_response(body: &str) -> Result<String> {
    let chunk = body
        .split("\n\n")
        .nth(1)
        .ok_or_else(|| Error::parse("Unexpected batchexecute response layout", body))?;

    let outer: Value = serde_json::from_str(chunk)?;
    let payload = outer[0][2]
        .as_str()
        .ok_or_else(|| Error::parse("Missing payload in batchexecute response", body))?;

    let inner: Value = serde_json::from_str(payload)?;
    inner[1]
        .as_str()
        .map(str::to_string)
        .ok_or_else(|| Error::parse("Missing decoded URL in batchexecute response", body))
}
