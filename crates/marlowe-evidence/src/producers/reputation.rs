//! Reputation-search producer
//!
//! Searches a community forum for the domain alongside scam/fraud/legit/review
//! qualifiers and grades the aggregate discussion. No posts at all is an
//! ambiguous signal - a site too new or too small to judge - not a clean one.

use crate::target::{failure_record, ProducerDeps, Target};
use crate::ProducerKind;
use marlowe_domain::{EvidenceCategory, EvidenceRecord, Severity};
use marlowe_intel::ForumPost;
use tracing::debug;

const SOURCE: &str = "forum";

/// Qualifiers appended to the domain for each search
static SEARCH_QUALIFIERS: &[&str] = &["scam", "fraud", "legit", "review"];

/// Words that count a post as a scam report
static SCAM_KEYWORDS: &[&str] = &["scam", "fraud", "ripoff", "stole", "never arrived", "fake"];

/// Scam-report count at which the signal is critical
pub const CRITICAL_HIT_COUNT: usize = 3;

/// Search the forum and grade community sentiment
pub async fn run(target: &Target, deps: &ProducerDeps) -> Vec<EvidenceRecord> {
    let mut posts: Vec<ForumPost> = Vec::new();
    let mut first_error = None;
    let mut any_success = false;

    let query = |q: &str| format!("{} {}", target.host, q);
    let q0 = query(SEARCH_QUALIFIERS[0]);
    let q1 = query(SEARCH_QUALIFIERS[1]);
    let q2 = query(SEARCH_QUALIFIERS[2]);
    let q3 = query(SEARCH_QUALIFIERS[3]);
    let (scam, fraud, legit, review) = tokio::join!(
        deps.forum.search(&q0),
        deps.forum.search(&q1),
        deps.forum.search(&q2),
        deps.forum.search(&q3),
    );
    for result in [scam, fraud, legit, review] {
        match result {
            Ok(hits) => {
                any_success = true;
                posts.extend(hits);
            }
            Err(e) => {
                debug!(host = %target.host, error = %e, "Forum search failed");
                if first_error.is_none() {
                    first_error = Some(e);
                }
            }
        }
    }

    if !any_success {
        let e = first_error.expect("at least one search ran");
        return vec![failure_record(ProducerKind::Reputation, SOURCE, &e)];
    }

    // The same post routinely matches several qualifiers
    posts.sort_by(|a, b| a.title.cmp(&b.title));
    posts.dedup_by(|a, b| a.title == b.title && a.url == b.url);

    vec![grade(&target.host, &posts)]
}

fn grade(host: &str, posts: &[ForumPost]) -> EvidenceRecord {
    let scam_hits = posts
        .iter()
        .filter(|p| {
            let text = p.full_text().to_lowercase();
            SCAM_KEYWORDS.iter().any(|k| text.contains(k))
        })
        .count();

    if scam_hits >= CRITICAL_HIT_COUNT {
        EvidenceRecord::new(
            EvidenceCategory::Reputation,
            Severity::Critical,
            format!("{} community scam reports", scam_hits),
            format!(
                "Forum discussion of {} repeatedly describes scam experiences",
                host
            ),
            SOURCE,
            0.85,
        )
        .with_metadata("scam_hits", scam_hits.to_string())
    } else if scam_hits >= 1 {
        EvidenceRecord::new(
            EvidenceCategory::Reputation,
            Severity::Warning,
            "Scattered scam mentions",
            format!(
                "{} of {} forum posts about {} mention scam language",
                scam_hits,
                posts.len(),
                host
            ),
            SOURCE,
            0.6,
        )
        .with_metadata("scam_hits", scam_hits.to_string())
    } else if !posts.is_empty() {
        EvidenceRecord::new(
            EvidenceCategory::Reputation,
            Severity::Safe,
            "Discussed without scam reports",
            format!(
                "{} forum posts mention {}; none read as scam reports",
                posts.len(),
                host
            ),
            SOURCE,
            0.7,
        )
    } else {
        EvidenceRecord::new(
            EvidenceCategory::Reputation,
            Severity::Info,
            "No community footprint",
            format!(
                "No forum discussion of {} found; too new or too small to judge",
                host
            ),
            SOURCE,
            0.4,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn post(title: &str, text: &str) -> ForumPost {
        ForumPost {
            title: title.to_string(),
            text: Some(text.to_string()),
            url: Some(format!("https://forum.example/{}", title.len())),
        }
    }

    #[test]
    fn test_three_scam_hits_is_critical() {
        let posts = vec![
            post("a", "total scam, avoid"),
            post("b", "fraud alert for this shop"),
            post("c", "ordered and it never arrived"),
            post("d", "neutral mention"),
        ];
        let record = grade("shop.example", &posts);
        assert_eq!(record.severity, Severity::Critical);
        assert_eq!(record.metadata.get("scam_hits").unwrap(), "3");
    }

    #[test]
    fn test_single_scam_hit_is_warning() {
        let posts = vec![post("a", "looks like a scam to me"), post("b", "meh")];
        let record = grade("shop.example", &posts);
        assert_eq!(record.severity, Severity::Warning);
    }

    #[test]
    fn test_discussion_without_scam_language_is_safe() {
        let posts = vec![post("a", "great prices"), post("b", "fast shipping")];
        let record = grade("shop.example", &posts);
        assert_eq!(record.severity, Severity::Safe);
    }

    #[test]
    fn test_no_posts_is_ambiguous_info() {
        let record = grade("shop.example", &[]);
        assert_eq!(record.severity, Severity::Info);
        assert!(record.detail.contains("too new or too small"));
    }
}
