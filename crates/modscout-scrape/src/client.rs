use async_trait::async_trait;
use modscout_core::models::RawRecord;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, info};

use crate::extract::extract_favorites;

#[derive(Error, Debug)]
pub enum ScrapeError {
    #[error("Favorites page request failed with status {status}")]
    RequestFailed { status: u16 },

    #[error("Network error: {0}")]
    NetworkError(#[from] reqwest::Error),

    #[error("No favorites found on the page - the markup may have changed")]
    NoEntries,
}

pub type Result<T> = std::result::Result<T, ScrapeError>;

/// Anything that can hand us a user's favorites page as raw markup
///
/// The real thing is `FavoritesClient`; tests swap in a mock.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PageSource: Send + Sync {
    async fn fetch_favorites_page(&self, username: &str) -> Result<String>;
}

/// HTTP client for a member's public favorites page
pub struct FavoritesClient {
    client: reqwest::Client,
    base_url: String,
}

impl FavoritesClient {
    pub fn new(base_url: &str, user_agent: &str, timeout_secs: u64) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(user_agent)
            .timeout(Duration::from_secs(timeout_secs))
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn favorites_url(&self, username: &str) -> String {
        format!(
            "{}/members/{}/favorites",
            self.base_url,
            urlencoding::encode(username)
        )
    }
}

#[async_trait]
impl PageSource for FavoritesClient {
    async fn fetch_favorites_page(&self, username: &str) -> Result<String> {
        let url = self.favorites_url(username);
        info!("Fetching favorites from: {}", url);

        let response = self.client.get(&url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(ScrapeError::RequestFailed {
                status: status.as_u16(),
            });
        }

        let body = response.text().await?;
        debug!("Fetched {} bytes of markup", body.len());
        Ok(body)
    }
}

/// Fetch a user's favorites page and extract its entries
///
/// No retries - a failed fetch is the caller's problem.
pub async fn scrape_favorites<S>(source: &S, username: &str, base_url: &str) -> Result<Vec<RawRecord>>
where
    S: PageSource + ?Sized,
{
    let html = source.fetch_favorites_page(username).await?;
    let records = extract_favorites(&html, base_url);

    if records.is_empty() {
        return Err(ScrapeError::NoEntries);
    }

    info!("Extracted {} favorites for {}", records.len(), username);
    Ok(records)
}
