//! Community-forum search client

use crate::error::{check_status, ProbeError};
use serde::Deserialize;

/// One post returned by the forum's full-text search
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ForumPost {
    /// Post title
    #[serde(default)]
    pub title: String,
    /// Post body or snippet, when the index returns one
    #[serde(default, alias = "story_text", alias = "snippet")]
    pub text: Option<String>,
    /// Canonical post url
    #[serde(default)]
    pub url: Option<String>,
}

impl ForumPost {
    /// Searchable text of the post: title plus body
    pub fn full_text(&self) -> String {
        match &self.text {
            Some(text) => format!("{} {}", self.title, text),
            None => self.title.clone(),
        }
    }
}

#[derive(Deserialize)]
struct ForumResponse {
    #[serde(default)]
    hits: Vec<ForumPost>,
}

/// Client for a community-forum full-text search API
pub struct ForumClient {
    endpoint: String,
    client: reqwest::Client,
}

impl ForumClient {
    /// Create a new client; the timeout bounds every search
    pub fn new(
        endpoint: impl Into<String>,
        timeout: std::time::Duration,
    ) -> Result<Self, ProbeError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ProbeError::Other(format!("Failed to build HTTP client: {}", e)))?;
        Ok(Self {
            endpoint: endpoint.into(),
            client,
        })
    }

    /// Full-text search, returning matching posts
    pub async fn search(&self, query: &str) -> Result<Vec<ForumPost>, ProbeError> {
        let url = format!("{}/search", self.endpoint.trim_end_matches('/'));
        let response = self
            .client
            .get(&url)
            .query(&[("query", query)])
            .send()
            .await
            .map_err(ProbeError::from_reqwest)?;
        check_status(&response)?;

        let body: ForumResponse = response
            .json()
            .await
            .map_err(|e| ProbeError::Parse(e.to_string()))?;
        Ok(body.hits)
    }
}
