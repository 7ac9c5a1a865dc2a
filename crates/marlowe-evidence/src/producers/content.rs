//! Content-heuristics producer
//!
//! Fetches the page once, strips the HTML, and runs five independent
//! scam-pattern heuristics. Each match is its own record; a clean page
//! produces a single safe record.

use crate::target::{failure_record, ProducerDeps, Target};
use crate::ProducerKind;
use chrono::{NaiveDate, Utc};
use marlowe_domain::{EvidenceCategory, EvidenceRecord, Severity};
use regex::{Regex, RegexBuilder};
use std::sync::OnceLock;
use tracing::debug;

const SOURCE: &str = "content";

/// Missing-section count at which the policy heuristic fires
pub const MISSING_POLICY_THRESHOLD: usize = 3;
/// Discount percentage at which the too-good-to-be-true heuristic fires
pub const DISCOUNT_THRESHOLD: u32 = 70;
/// Days within which a publish date counts as very recent
pub const RECENT_PUBLISH_DAYS: i64 = 14;

/// Policy sections an ordinary storefront carries
static POLICY_SECTIONS: &[(&str, &str)] = &[
    ("privacy policy", "privacy"),
    ("terms", "terms of service"),
    ("return", "refund"),
    ("shipping", "delivery"),
    ("contact", "about us"),
];

/// Payment methods with no chargeback path
static RISKY_PAYMENTS: &[&str] = &[
    "wire transfer",
    "western union",
    "moneygram",
    "gift card",
    "zelle",
    "bitcoin",
    "crypto payment",
    "cash app",
];

fn urgency_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        RegexBuilder::new(
            r"only \d+ left|hurry|act now|limited time|offer ends|selling fast|last chance|while stocks last",
        )
        .case_insensitive(true)
        .build()
        .expect("urgency pattern compiles")
    })
}

fn tag_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        RegexBuilder::new(r"<script.*?</script>|<style.*?</style>|<[^>]+>")
            .case_insensitive(true)
            .dot_matches_new_line(true)
            .build()
            .expect("tag pattern compiles")
    })
}

fn discount_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        RegexBuilder::new(r"(\d{2,3})\s*%\s*off")
            .case_insensitive(true)
            .build()
            .expect("discount pattern compiles")
    })
}

fn published_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(
            r#"(?:datePublished|published_time)["']?\s*(?:[:=]|content=)\s*["']?(\d{4}-\d{2}-\d{2})"#,
        )
        .expect("published pattern compiles")
    })
}

/// Fetch and analyze the target page
pub async fn run(target: &Target, deps: &ProducerDeps) -> Vec<EvidenceRecord> {
    match deps.page.fetch(&target.url).await {
        Ok(html) => analyze(&html),
        Err(e) => {
            debug!(url = %target.url, error = %e, "Page fetch failed");
            vec![failure_record(ProducerKind::Content, SOURCE, &e)]
        }
    }
}

/// Run the five heuristics over raw HTML
pub fn analyze(html: &str) -> Vec<EvidenceRecord> {
    let text = strip_html(html);
    let lowered = text.to_lowercase();
    let mut records = Vec::new();

    if let Some(m) = urgency_regex().find(&text) {
        records.push(
            EvidenceRecord::new(
                EvidenceCategory::Content,
                Severity::Warning,
                "High-pressure urgency language",
                format!("Page pushes urgency: \"{}\"", m.as_str().trim()),
                SOURCE,
                0.6,
            ),
        );
    }

    let missing: Vec<&str> = POLICY_SECTIONS
        .iter()
        .filter(|(a, b)| !lowered.contains(a) && !lowered.contains(b))
        .map(|(a, _)| *a)
        .collect();
    if missing.len() >= MISSING_POLICY_THRESHOLD {
        records.push(EvidenceRecord::new(
            EvidenceCategory::Content,
            Severity::Warning,
            format!("{} of 5 standard policy sections missing", missing.len()),
            format!("No sign of: {}", missing.join(", ")),
            SOURCE,
            0.65,
        ));
    }

    if let Some(method) = RISKY_PAYMENTS.iter().find(|m| lowered.contains(*m)) {
        records.push(EvidenceRecord::new(
            EvidenceCategory::Content,
            Severity::Warning,
            "No-chargeback payment method",
            format!(
                "Page asks for payment via {}, which offers no buyer recourse",
                method
            ),
            SOURCE,
            0.7,
        ));
    }

    let max_discount = discount_regex()
        .captures_iter(&text)
        .filter_map(|c| c[1].parse::<u32>().ok())
        .filter(|d| *d <= 100)
        .max();
    if let Some(discount) = max_discount {
        if discount >= DISCOUNT_THRESHOLD {
            records.push(EvidenceRecord::new(
                EvidenceCategory::Content,
                Severity::Warning,
                format!("Claims {}% discount", discount),
                "Extreme discount claims are a common lure on scam storefronts".to_string(),
                SOURCE,
                0.6,
            ));
        }
    }

    if let Some(published) = published_date(html) {
        let age = (Utc::now().date_naive() - published).num_days();
        if (0..=RECENT_PUBLISH_DAYS).contains(&age) {
            records.push(EvidenceRecord::new(
                EvidenceCategory::Content,
                Severity::Warning,
                "Page published very recently",
                format!("Page metadata says it was published {} days ago", age),
                SOURCE,
                0.5,
            ));
        }
    }

    if records.is_empty() {
        records.push(EvidenceRecord::new(
            EvidenceCategory::Content,
            Severity::Safe,
            "No content red flags",
            "None of the content heuristics matched",
            SOURCE,
            0.7,
        ));
    }
    records
}

fn strip_html(html: &str) -> String {
    tag_regex().replace_all(html, " ").to_string()
}

fn published_date(html: &str) -> Option<NaiveDate> {
    published_regex()
        .captures(html)
        .and_then(|c| NaiveDate::parse_from_str(&c[1], "%Y-%m-%d").ok())
}
