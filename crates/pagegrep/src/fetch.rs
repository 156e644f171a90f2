//! HTTP fetching over a shared, reusable connection pool.
//!
//! Not a browser, just GET requests. No retries, no backoff and, unless
//! configured, no timeout: an unresponsive host blocks the caller until the
//! transport gives up or the run is cancelled.
//!
//! Transport faults never escape [`HttpPool::fetch`]. They are converted into
//! a sentinel page (status 404, placeholder body) with the fault recorded as
//! the diagnostics error, so one unreachable URL cannot abort a batch.

use std::error::Error as _;
use std::time::{Duration, Instant};

use crate::types::{FetchResult, PageContent};

/// Placeholder body returned in raw mode when a fetch fails.
pub const INVALID_RAW_BODY: &str = "<!DOCTYPE html><html><body><h1>INVALID</h1></body></html>";

/// Placeholder body returned in decoded mode when a fetch fails.
pub const INVALID_TEXT_BODY: &str = "INVALID URL!";

/// Status reported for the sentinel page.
pub const SENTINEL_STATUS: u16 = 404;

const DEFAULT_USER_AGENT: &str = concat!("pagegrep/", env!("CARGO_PKG_VERSION"));

/// Connection pool settings.
#[derive(Debug, Clone)]
pub struct PoolConfig {
    pub user_agent: String,
    pub max_redirects: usize,
    /// Whole-request timeout. `None` leaves the transport defaults in place.
    pub timeout: Option<Duration>,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            user_agent: DEFAULT_USER_AGENT.to_string(),
            max_redirects: 10,
            timeout: None,
        }
    }
}

/// A transport-level failure while fetching a page.
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error(transparent)]
    Transport(#[from] reqwest::Error),

    #[error("response body of {url} is not valid UTF-8")]
    Decode {
        url: String,
        #[source]
        source: std::string::FromUtf8Error,
    },
}

impl FetchError {
    /// One-line description including every underlying cause.
    pub fn describe(&self) -> String {
        let mut text = self.to_string();
        let mut cause = self.source();
        while let Some(err) = cause {
            let next = err.to_string();
            if !text.contains(&next) {
                text.push_str(": ");
                text.push_str(&next);
            }
            cause = err.source();
        }
        text
    }
}

/// A page that was fetched without a transport fault.
#[derive(Debug, Clone)]
pub struct FetchedPage {
    pub status: u16,
    pub content: PageContent,
}

/// HTTP connection pool shared by every fetch of a run.
#[derive(Clone)]
pub struct HttpPool {
    client: reqwest::Client,
}

impl Default for HttpPool {
    fn default() -> Self {
        Self::new()
    }
}

impl HttpPool {
    /// Create a pool with default settings.
    pub fn new() -> Self {
        Self::with_config(&PoolConfig::default())
    }

    pub fn with_config(config: &PoolConfig) -> Self {
        let mut builder = reqwest::Client::builder()
            .redirect(reqwest::redirect::Policy::limited(config.max_redirects))
            .user_agent(config.user_agent.as_str());
        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder.build().unwrap_or_default();
        Self { client }
    }

    /// GET `url` and return the page, or the transport fault.
    ///
    /// Any status code counts as success. With `decode` set, the body must
    /// be valid UTF-8.
    pub async fn try_fetch(&self, url: &str, decode: bool) -> Result<FetchedPage, FetchError> {
        let response = self.client.get(url).send().await?;
        let status = response.status().as_u16();
        let body = response.bytes().await?.to_vec();

        let content = if decode {
            let text = String::from_utf8(body).map_err(|source| FetchError::Decode {
                url: url.to_string(),
                source,
            })?;
            PageContent::Text(text)
        } else {
            PageContent::Raw(body)
        };

        Ok(FetchedPage { status, content })
    }

    /// GET `url`, folding any transport fault into a sentinel result.
    pub async fn fetch(&self, url: &str, decode: bool) -> FetchResult {
        let started = Instant::now();
        let outcome = self.try_fetch(url, decode).await;
        let elapsed_secs = started.elapsed().as_secs_f64();

        match outcome {
            Ok(page) => FetchResult {
                content: page.content,
                status: page.status,
                elapsed_secs,
                error: None,
            },
            Err(e) => {
                let reason = e.describe();
                tracing::warn!(url, error = %reason, "Problem with requesting {url}");
                sentinel(decode, elapsed_secs, reason)
            }
        }
    }
}

/// Fetch `url` through `pool`, or through a private pool when none is given.
pub async fn fetch(url: &str, pool: Option<&HttpPool>, decode: bool) -> FetchResult {
    match pool {
        Some(pool) => pool.fetch(url, decode).await,
        None => HttpPool::new().fetch(url, decode).await,
    }
}

fn sentinel(decode: bool, elapsed_secs: f64, reason: String) -> FetchResult {
    let content = if decode {
        PageContent::Text(INVALID_TEXT_BODY.to_string())
    } else {
        PageContent::Raw(INVALID_RAW_BODY.as_bytes().to_vec())
    };
    FetchResult {
        content,
        status: SENTINEL_STATUS,
        elapsed_secs,
        error: Some(reason),
    }
}
