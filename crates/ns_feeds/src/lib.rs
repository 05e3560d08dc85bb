pub mod decoder;
pub mod fetcher;
pub mod links;

pub use decoder::{DecoderConfig, GoogleNewsDecoder, PassthroughDecoder};
pub use fetcher::{parse_feed, RssFetcher, DEFAULT_MAX_ARTICLES};
pub use links::extract_hrefs;

pub mod prelude {
    pub use super::decoder::{GoogleNewsDecoder, PassthroughDecoder};
    pub use super::fetcher::RssFetcher;
    pub use ns_core::{Article, Error, FeedSource, Result, UrlDecoder};
}
