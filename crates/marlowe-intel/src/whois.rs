//! WHOIS lookup client

use crate::error::{check_status, ProbeError};
use chrono::{DateTime, NaiveDate, Utc};
use serde::Deserialize;
use tracing::debug;

/// Parsed registration data for a domain
#[derive(Debug, Clone, PartialEq)]
pub struct WhoisRecord {
    /// Registration timestamp, when the registry reported one
    pub created: Option<DateTime<Utc>>,
    /// Registrar name, when reported
    pub registrar: Option<String>,
}

impl WhoisRecord {
    /// Age of the registration in whole days, relative to `now`
    pub fn age_days(&self, now: DateTime<Utc>) -> Option<i64> {
        self.created.map(|created| (now - created).num_days())
    }
}

#[derive(Deserialize)]
struct WhoisResponse {
    #[serde(default, alias = "createdDate", alias = "creation_date")]
    created: Option<String>,
    #[serde(default)]
    registrar: Option<String>,
}

/// Client for a JSON WHOIS API
pub struct WhoisClient {
    endpoint: String,
    api_key: String,
    client: reqwest::Client,
}

impl WhoisClient {
    /// Create a new client; the timeout bounds every lookup
    pub fn new(
        endpoint: impl Into<String>,
        api_key: impl Into<String>,
        timeout: std::time::Duration,
    ) -> Result<Self, ProbeError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ProbeError::Other(format!("Failed to build HTTP client: {}", e)))?;
        Ok(Self {
            endpoint: endpoint.into(),
            api_key: api_key.into(),
            client,
        })
    }

    /// Look up registration data for a domain
    pub async fn lookup(&self, domain: &str) -> Result<WhoisRecord, ProbeError> {
        let url = format!("{}/whois", self.endpoint.trim_end_matches('/'));
        let response = self
            .client
            .get(&url)
            .query(&[("domain", domain), ("apiKey", &self.api_key)])
            .send()
            .await
            .map_err(ProbeError::from_reqwest)?;
        check_status(&response)?;

        let body: WhoisResponse = response
            .json()
            .await
            .map_err(|e| ProbeError::Parse(e.to_string()))?;

        let created = body.created.as_deref().and_then(parse_whois_date);
        if created.is_none() {
            debug!(domain, "WHOIS response carried no creation date");
        }

        Ok(WhoisRecord {
            created,
            registrar: body.registrar,
        })
    }
}

/// Parse the date formats WHOIS registries actually emit
///
/// Accepts RFC 3339 timestamps and bare `YYYY-MM-DD` dates.
fn parse_whois_date(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Some(ts.with_timezone(&Utc));
    }
    let date_part = raw.split(['T', ' ']).next()?;
    NaiveDate::parse_from_str(date_part, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|dt| dt.and_utc())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_parse_rfc3339_date() {
        let parsed = parse_whois_date("2023-04-01T12:30:00Z").unwrap();
        assert_eq!(parsed, Utc.with_ymd_and_hms(2023, 4, 1, 12, 30, 0).unwrap());
    }

    #[test]
    fn test_parse_bare_date() {
        let parsed = parse_whois_date("2023-04-01").unwrap();
        assert_eq!(parsed, Utc.with_ymd_and_hms(2023, 4, 1, 0, 0, 0).unwrap());
    }

    #[test]
    fn test_parse_date_with_trailing_time() {
        let parsed = parse_whois_date("2023-04-01 08:00:00").unwrap();
        assert_eq!(parsed.date_naive().to_string(), "2023-04-01");
    }

    #[test]
    fn test_unparseable_date_is_none() {
        assert_eq!(parse_whois_date("last tuesday"), None);
        assert_eq!(parse_whois_date(""), None);
    }

    #[test]
    fn test_age_days() {
        let now = Utc.with_ymd_and_hms(2026, 8, 1, 0, 0, 0).unwrap();
        let record = WhoisRecord {
            created: Some(Utc.with_ymd_and_hms(2026, 7, 26, 0, 0, 0).unwrap()),
            registrar: None,
        };
        assert_eq!(record.age_days(now), Some(6));

        let missing = WhoisRecord {
            created: None,
            registrar: None,
        };
        assert_eq!(missing.age_days(now), None);
    }
}
