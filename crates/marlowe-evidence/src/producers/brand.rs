//! Brand-impersonation producer
//!
//! Asks the reasoning model to judge the hostname for typosquatting, keyword
//! stuffing, lookalike TLDs, and homograph tricks. The model's verdict only
//! flags critical when its confidence clears the threshold.

use crate::target::{ProducerDeps, Target};
use marlowe_domain::{classify, EvidenceCategory, EvidenceRecord, FailureKind, Severity};
use marlowe_llm::parse::parse_json_value;
use marlowe_llm::ReasoningProvider;
use serde::Deserialize;
use tracing::{debug, warn};

const SOURCE: &str = "classifier";

/// Classifier confidence required before a critical record is emitted
pub const FLAG_CONFIDENCE: f64 = 0.7;

#[derive(Debug, Deserialize)]
struct BrandVerdict {
    impersonation: bool,
    #[serde(default)]
    technique: Option<String>,
    #[serde(default)]
    target_brand: Option<String>,
    #[serde(default)]
    confidence: f64,
}

/// Judge whether the host impersonates a known brand
pub async fn run(target: &Target, deps: &ProducerDeps) -> Vec<EvidenceRecord> {
    let prompt = build_prompt(&target.host);

    let response = match deps.reasoner.generate(&prompt).await {
        Ok(response) => response,
        Err(e) => {
            debug!(host = %target.host, error = %e, "Brand classifier call failed");
            let c = classify(&FailureKind::Other);
            return vec![EvidenceRecord::new(
                EvidenceCategory::BrandImpersonation,
                c.severity,
                "Brand check unavailable",
                format!("Classifier call failed: {}", e),
                SOURCE,
                c.confidence(),
            )];
        }
    };

    let verdict = match parse_json_value(&response)
        .and_then(|v| {
            serde_json::from_value::<BrandVerdict>(v).map_err(|e| {
                marlowe_llm::LlmError::InvalidResponse(format!("Verdict shape: {}", e))
            })
        }) {
        Ok(verdict) => verdict,
        Err(e) => {
            warn!(host = %target.host, error = %e, "Unparseable brand verdict");
            let c = classify(&FailureKind::MalformedResponse);
            return vec![EvidenceRecord::new(
                EvidenceCategory::BrandImpersonation,
                c.severity,
                "Brand check unavailable",
                format!("Classifier returned an unparseable verdict: {}", e),
                SOURCE,
                c.confidence(),
            )];
        }
    };

    vec![judge(&target.host, &verdict)]
}

fn judge(host: &str, verdict: &BrandVerdict) -> EvidenceRecord {
    let confidence = verdict.confidence.clamp(0.0, 1.0);

    if verdict.impersonation && confidence >= FLAG_CONFIDENCE {
        let technique = verdict.technique.as_deref().unwrap_or("lookalike naming");
        let brand = verdict.target_brand.as_deref().unwrap_or("a known brand");
        let mut record = EvidenceRecord::new(
            EvidenceCategory::BrandImpersonation,
            Severity::Critical,
            format!("Likely impersonation of {}", brand),
            format!("{} appears to use {} to pass as {}", host, technique, brand),
            SOURCE,
            confidence,
        )
        .with_metadata("technique", technique.to_string());
        if let Some(brand) = &verdict.target_brand {
            record = record.with_metadata("target_brand", brand.clone());
        }
        record
    } else if verdict.impersonation {
        EvidenceRecord::new(
            EvidenceCategory::BrandImpersonation,
            Severity::Info,
            "Weak impersonation signal",
            format!(
                "Classifier suspects impersonation but confidence {:.2} is below the flagging bar",
                confidence
            ),
            SOURCE,
            confidence,
        )
    } else {
        EvidenceRecord::new(
            EvidenceCategory::BrandImpersonation,
            Severity::Safe,
            "No brand impersonation detected",
            format!("{} does not resemble a known brand's domain", host),
            SOURCE,
            confidence.max(0.5),
        )
    }
}

fn build_prompt(host: &str) -> String {
    format!(
        r#"You are a brand-impersonation classifier. Judge whether the hostname below
impersonates a well-known brand via typosquatting, keyword stuffing, a
lookalike TLD, or homograph characters.

Hostname: {}

Respond with JSON only, no markdown:
{{"impersonation": true|false, "technique": "typosquat|keyword_stuffing|lookalike_tld|homograph", "target_brand": "brand or null", "confidence": 0.0-1.0}}"#,
        host
    )
}
