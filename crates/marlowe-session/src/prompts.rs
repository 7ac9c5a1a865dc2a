//! Prompt building for the investigation reasoning loop

use marlowe_domain::{EvidenceRecord, Focus};
use marlowe_evidence::ProducerKind;

/// Prior-evidence lines included in a deepen prompt
const CONTEXT_RECORD_LIMIT: usize = 20;

/// Producers a turn falls back to when the model's plan is unusable
pub fn default_plan(focus: Option<Focus>) -> Vec<ProducerKind> {
    match focus {
        None => vec![
            ProducerKind::DomainAge,
            ProducerKind::Certificate,
            ProducerKind::ThreatList,
            ProducerKind::Content,
            ProducerKind::Reputation,
            ProducerKind::BrandImpersonation,
        ],
        Some(Focus::Seller) => vec![
            ProducerKind::SellerVerification,
            ProducerKind::Reputation,
        ],
        Some(Focus::Reviews) => vec![
            ProducerKind::Reputation,
            ProducerKind::SellerVerification,
        ],
        Some(Focus::Business) => vec![
            ProducerKind::DomainAge,
            ProducerKind::Content,
            ProducerKind::Reputation,
        ],
        Some(Focus::Alternatives) => vec![ProducerKind::Reputation, ProducerKind::Price],
        Some(Focus::PriceHistory) => vec![ProducerKind::Price, ProducerKind::Content],
    }
}

fn focus_hint(focus: Focus) -> &'static str {
    match focus {
        Focus::Seller => "Dig into who the seller actually is",
        Focus::Reviews => "Judge whether the reviews are authentic",
        Focus::Business => "Investigate the business operating this site",
        Focus::Alternatives => "Look for reputable places selling the same thing",
        Focus::PriceHistory => "Investigate whether the pricing is believable",
    }
}

/// Build the planning prompt: which producers should this turn invoke
pub fn plan_prompt(url: &str, focus: Option<Focus>, prior: &[EvidenceRecord]) -> String {
    let mut prompt = String::new();
    prompt.push_str("You are planning one round of a fraud investigation.\n\n");
    prompt.push_str(&format!("Target: {}\n", url));

    if let Some(focus) = focus {
        prompt.push_str(&format!(
            "This is a follow-up turn focused on: {} - {}.\n",
            focus.as_str(),
            focus_hint(focus)
        ));
    }

    if !prior.is_empty() {
        prompt.push_str("\nEvidence already gathered (do not repeat; report new evidence only):\n");
        for record in prior.iter().take(CONTEXT_RECORD_LIMIT) {
            prompt.push_str(&format!(
                "- [{}] {}: {}\n",
                record.severity.as_str(),
                record.source,
                record.title
            ));
        }
    }

    prompt.push_str("\nAvailable checks:\n");
    for kind in ProducerKind::ALL {
        prompt.push_str(&format!("- {}: {}\n", kind.as_str(), kind.description()));
    }

    prompt.push_str(
        "\nRespond with a JSON array of check names to run now, nothing else. Example: [\"domain_age\", \"certificate\"]",
    );
    prompt
}

/// Build the synthesis prompt: narrate what this round found
pub fn synthesis_prompt(url: &str, fresh: &[EvidenceRecord], score: u8) -> String {
    let mut prompt = String::new();
    prompt.push_str(&format!(
        "Summarize this round of fraud findings for {} in two or three plain sentences for a shopper. Threat score: {}/100.\n\nFindings:\n",
        url, score
    ));
    if fresh.is_empty() {
        prompt.push_str("- nothing new this round\n");
    }
    for record in fresh {
        prompt.push_str(&format!(
            "- [{}] {} ({})\n",
            record.severity.as_str(),
            record.title,
            record.detail
        ));
    }
    prompt.push_str("\nDo not invent findings. Respond with the summary text only.");
    prompt
}
