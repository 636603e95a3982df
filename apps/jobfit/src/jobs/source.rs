/// Job source: the single point of entry for external job search calls.
///
/// Adzuna: `GET /v1/api/jobs/{region}/search/1`, first page only, capped at
/// [`RESULTS_PER_PAGE`] listings.
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use thiserror::Error;
use tracing::{debug, warn};

use crate::models::{JobListing, SearchResponse};

pub const ADZUNA_BASE_URL: &str = "https://api.adzuna.com";
pub const RESULTS_PER_PAGE: u32 = 50;

#[derive(Debug, Error)]
pub enum JobSourceError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Job search failed (status {status}): {message}")]
    Api { status: u16, message: String },
}

#[async_trait]
pub trait JobSource: Send + Sync {
    async fn search(&self, query: &str) -> Result<Vec<JobListing>, JobSourceError>;
}

#[derive(Clone)]
pub struct AdzunaClient {
    client: Client,
    base_url: String,
    app_id: String,
    app_key: String,
    region: String,
}

impl AdzunaClient {
    pub fn new(
        app_id: &str,
        app_key: &str,
        region: &str,
        timeout: Duration,
    ) -> Result<Self, JobSourceError> {
        Ok(Self {
            client: Client::builder().timeout(timeout).build()?,
            base_url: ADZUNA_BASE_URL.to_string(),
            app_id: app_id.to_string(),
            app_key: app_key.to_string(),
            region: region.to_string(),
        })
    }

    /// Points the client at another host, e.g. a local mock.
    pub fn with_base_url(mut self, base_url: &str) -> Self {
        self.base_url = base_url.trim_end_matches('/').to_string();
        self
    }

    fn search_url(&self) -> String {
        format!("{}/v1/api/jobs/{}/search/1", self.base_url, self.region)
    }
}

#[async_trait]
impl JobSource for AdzunaClient {
    async fn search(&self, query: &str) -> Result<Vec<JobListing>, JobSourceError> {
        let per_page = RESULTS_PER_PAGE.to_string();
        let response = self
            .client
            .get(self.search_url())
            .query(&[
                ("app_id", self.app_id.as_str()),
                ("app_key", self.app_key.as_str()),
                ("what", query),
                ("results_per_page", per_page.as_str()),
            ])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            warn!("Job search returned {status}");
            return Err(JobSourceError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let body: SearchResponse = response.json().await?;
        debug!("Job search for {query:?} returned {} listings", body.results.len());
        Ok(body.results)
    }
}
