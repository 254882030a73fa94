//! MusicBrainz web service client

use reqwest::header::ACCEPT;
use serde::Deserialize;
use serde_json::Value;
use std::time::{Duration, Instant};
use thiserror::Error;
use tracing::debug;

pub const DEFAULT_BASE_URL: &str = "https://musicbrainz.org/ws/2";

/// MusicBrainz allows one request per second per client
const MIN_INTERVAL: Duration = Duration::from_secs(1);
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Error)]
pub enum LookupError {
    #[error("Failed to start async runtime: {0}")]
    Runtime(#[source] std::io::Error),

    #[error("Request to MusicBrainz failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("MusicBrainz returned status {0}")]
    Status(reqwest::StatusCode),
}

/// A service that can search recordings by artist and title
pub trait RecordingSource {
    /// Up to `limit` raw recording candidates, in the service's relevance order
    fn search_recordings(
        &mut self,
        artist: &str,
        title: &str,
        limit: usize,
    ) -> Result<Vec<Value>, LookupError>;
}

// ============================================================================
// Response structs
// ============================================================================

/// Recordings are kept as raw JSON so they can be cached verbatim
#[derive(Debug, Deserialize)]
struct RecordingSearchResponse {
    #[serde(default)]
    recordings: Vec<Value>,
}

// ============================================================================
// Client
// ============================================================================

/// Blocking MusicBrainz client that drives reqwest on its own runtime
pub struct MusicBrainzClient {
    client: reqwest::Client,
    runtime: tokio::runtime::Runtime,
    base_url: String,
    last_request: Option<Instant>,
}

impl MusicBrainzClient {
    pub fn new(base_url: &str, contact: &str) -> Result<Self, LookupError> {
        let runtime = tokio::runtime::Runtime::new().map_err(LookupError::Runtime)?;
        let client = reqwest::Client::builder()
            .user_agent(user_agent(contact))
            .timeout(REQUEST_TIMEOUT)
            .build()?;

        Ok(Self {
            client,
            runtime,
            base_url: base_url.trim_end_matches('/').to_string(),
            last_request: None,
        })
    }
}

impl RecordingSource for MusicBrainzClient {
    fn search_recordings(
        &mut self,
        artist: &str,
        title: &str,
        limit: usize,
    ) -> Result<Vec<Value>, LookupError> {
        let url = search_url(&self.base_url, artist, title, limit);
        let last_request = self.last_request;
        let client = &self.client;

        let result = self.runtime.block_on(async {
            if let Some(last) = last_request {
                let elapsed = last.elapsed();
                if elapsed < MIN_INTERVAL {
                    let wait = MIN_INTERVAL - elapsed;
                    debug!("Rate limiting: waiting {:?}", wait);
                    tokio::time::sleep(wait).await;
                }
            }
            fetch_recordings(client, &url).await
        });

        self.last_request = Some(Instant::now());
        result
    }
}

async fn fetch_recordings(client: &reqwest::Client, url: &str) -> Result<Vec<Value>, LookupError> {
    debug!("GET {}", url);
    let response = client
        .get(url)
        .header(ACCEPT, "application/json")
        .send()
        .await?;

    if !response.status().is_success() {
        return Err(LookupError::Status(response.status()));
    }

    let body: RecordingSearchResponse = response.json().await?;
    Ok(body.recordings)
}

/// Identify ourselves as MusicBrainz asks: `app/version ( contact )`
fn user_agent(contact: &str) -> String {
    format!(
        "{}/{} ( {} )",
        env!("CARGO_PKG_NAME"),
        env!("CARGO_PKG_VERSION"),
        contact
    )
}

fn search_url(base_url: &str, artist: &str, title: &str, limit: usize) -> String {
    let query = format!(
        "recording:\"{}\" AND artist:\"{}\"",
        escape_phrase(title),
        escape_phrase(artist)
    );
    format!(
        "{}/recording?query={}&limit={}&fmt=json",
        base_url,
        urlencoding::encode(&query),
        limit
    )
}

/// Escape a value for use inside a quoted Lucene phrase
fn escape_phrase(value: &str) -> String {
    value.replace('\\', "\\\\").replace('"', "\\\"")
}
