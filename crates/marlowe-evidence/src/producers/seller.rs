//! Seller-verification producer
//!
//! Marketplace-aware: fetches the listing page and asks the model to extract
//! the seller profile, then applies the verification thresholds. When the
//! platform itself is the seller there is nothing to verify.

use crate::target::{failure_record, ProducerDeps, Target};
use crate::ProducerKind;
use marlowe_domain::{classify, EvidenceCategory, EvidenceRecord, FailureKind, Severity};
use marlowe_llm::parse::parse_json_value;
use marlowe_llm::ReasoningProvider;
use serde::Deserialize;
use tracing::{debug, warn};

const SOURCE: &str = "seller";

/// Tenure in months under which a seller account is a strong indicator
pub const CRITICAL_TENURE_MONTHS: u32 = 3;
/// Review-authenticity score (out of 10) under which reviews look manufactured
pub const CRITICAL_AUTHENTICITY: u32 = 4;
/// Star rating under which the seller is a mild concern
pub const WARNING_RATING: f64 = 3.5;
/// Review count under which the seller is a mild concern
pub const WARNING_REVIEW_COUNT: u32 = 10;

#[derive(Debug, Deserialize)]
struct SellerProfile {
    #[serde(default)]
    seller_name: Option<String>,
    #[serde(default)]
    platform_is_seller: bool,
    #[serde(default)]
    rating: Option<f64>,
    #[serde(default)]
    tenure_months: Option<u32>,
    #[serde(default)]
    review_count: Option<u32>,
    #[serde(default)]
    review_authenticity: Option<u32>,
}

/// Verify the seller behind the listing
pub async fn run(target: &Target, deps: &ProducerDeps) -> Vec<EvidenceRecord> {
    let page = match deps.page.fetch(&target.url).await {
        Ok(page) => page,
        Err(e) => {
            debug!(url = %target.url, error = %e, "Seller page fetch failed");
            return vec![failure_record(ProducerKind::SellerVerification, SOURCE, &e)];
        }
    };

    let prompt = build_prompt(&target.host, &page);
    let response = match deps.reasoner.generate(&prompt).await {
        Ok(response) => response,
        Err(e) => {
            debug!(host = %target.host, error = %e, "Seller extraction call failed");
            let c = classify(&FailureKind::Other);
            return vec![EvidenceRecord::new(
                EvidenceCategory::SellerVerification,
                c.severity,
                "Seller check unavailable",
                format!("Extraction call failed: {}", e),
                SOURCE,
                c.confidence(),
            )];
        }
    };

    let profile = match parse_json_value(&response).and_then(|v| {
        serde_json::from_value::<SellerProfile>(v)
            .map_err(|e| marlowe_llm::LlmError::InvalidResponse(format!("Profile shape: {}", e)))
    }) {
        Ok(profile) => profile,
        Err(e) => {
            warn!(host = %target.host, error = %e, "Unparseable seller profile");
            let c = classify(&FailureKind::MalformedResponse);
            return vec![EvidenceRecord::new(
                EvidenceCategory::SellerVerification,
                c.severity,
                "Seller check unavailable",
                format!("Extraction returned an unparseable profile: {}", e),
                SOURCE,
                c.confidence(),
            )];
        }
    };

    vec![judge(&profile)]
}

fn judge(profile: &SellerProfile) -> EvidenceRecord {
    let name = profile.seller_name.as_deref().unwrap_or("the seller");

    if profile.platform_is_seller {
        return EvidenceRecord::new(
            EvidenceCategory::SellerVerification,
            Severity::Safe,
            "Sold by the platform itself",
            "The marketplace is the seller of record; no third-party seller to verify",
            SOURCE,
            0.9,
        );
    }

    if let Some(tenure) = profile.tenure_months {
        if tenure < CRITICAL_TENURE_MONTHS {
            return EvidenceRecord::new(
                EvidenceCategory::SellerVerification,
                Severity::Critical,
                format!("Seller account only {} months old", tenure),
                format!("{} joined recently; hit-and-run sellers churn accounts", name),
                SOURCE,
                0.85,
            )
            .with_metadata("tenure_months", tenure.to_string());
        }
    }
    if let Some(authenticity) = profile.review_authenticity {
        if authenticity < CRITICAL_AUTHENTICITY {
            return EvidenceRecord::new(
                EvidenceCategory::SellerVerification,
                Severity::Critical,
                "Reviews look manufactured",
                format!(
                    "Review authenticity scored {}/10 for {}",
                    authenticity, name
                ),
                SOURCE,
                0.8,
            )
            .with_metadata("review_authenticity", authenticity.to_string());
        }
    }

    let low_rating = profile.rating.is_some_and(|r| r < WARNING_RATING);
    let few_reviews = profile
        .review_count
        .is_some_and(|c| c < WARNING_REVIEW_COUNT);
    if low_rating || few_reviews {
        let mut concerns = Vec::new();
        if let Some(rating) = profile.rating.filter(|r| *r < WARNING_RATING) {
            concerns.push(format!("rated {:.1} stars", rating));
        }
        if let Some(count) = profile.review_count.filter(|c| *c < WARNING_REVIEW_COUNT) {
            concerns.push(format!("only {} reviews", count));
        }
        return EvidenceRecord::new(
            EvidenceCategory::SellerVerification,
            Severity::Warning,
            "Thin seller track record",
            format!("{} is {}", name, concerns.join(" with ")),
            SOURCE,
            0.65,
        );
    }

    EvidenceRecord::new(
        EvidenceCategory::SellerVerification,
        Severity::Safe,
        "Seller checks out",
        format!("{} has an established, well-reviewed account", name),
        SOURCE,
        0.75,
    )
}

fn build_prompt(host: &str, page: &str) -> String {
    // Listing pages are huge; the profile block is near the top often enough
    let excerpt: String = page.chars().take(12_000).collect();
    format!(
        r#"Extract the seller profile from this marketplace listing on {}.

Respond with JSON only, no markdown:
{{"seller_name": "name or null", "platform_is_seller": true|false, "rating": 0.0-5.0 or null, "tenure_months": integer or null, "review_count": integer or null, "review_authenticity": 0-10 or null}}

Page content:
---
{}
---"#,
        host, excerpt
    )
}
