//! Page fetcher for content heuristics

use crate::error::{check_status, ProbeError};

const USER_AGENT: &str = "Mozilla/5.0 (compatible; marlowe/0.1)";

/// Fetches page bodies with a byte cap
///
/// This is a single-page fetch for heuristic inspection, not a crawler.
pub struct PageFetcher {
    client: reqwest::Client,
    byte_cap: usize,
}

impl PageFetcher {
    /// Create a new fetcher; the timeout bounds every fetch
    pub fn new(timeout: std::time::Duration, byte_cap: usize) -> Result<Self, ProbeError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| ProbeError::Other(format!("Failed to build HTTP client: {}", e)))?;
        Ok(Self { client, byte_cap })
    }

    /// Fetch a page body, truncated to the byte cap on a char boundary
    pub async fn fetch(&self, url: &str) -> Result<String, ProbeError> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(ProbeError::from_reqwest)?;
        check_status(&response)?;

        let mut body = response
            .text()
            .await
            .map_err(|e| ProbeError::Parse(e.to_string()))?;

        if body.len() > self.byte_cap {
            let mut cut = self.byte_cap;
            while !body.is_char_boundary(cut) {
                cut -= 1;
            }
            body.truncate(cut);
        }
        Ok(body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_fetcher_builds() {
        assert!(PageFetcher::new(Duration::from_secs(10), 1024).is_ok());
    }

    #[tokio::test]
    async fn test_unreachable_host_is_probe_error() {
        let fetcher = PageFetcher::new(Duration::from_secs(2), 1024).unwrap();
        let result = fetcher.fetch("http://127.0.0.1:1/").await;
        assert!(result.is_err());
    }
}
