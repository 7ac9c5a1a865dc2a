//! Per-product fraud checking
//!
//! Four named checks per product, run concurrently, each degrading to a
//! warning on execution failure. An allow-listed domain short-circuits to
//! four passes with zero network calls - the shortcut is a cost optimization
//! as much as a scoring rule.

use crate::cohort::{is_anomalous, trusted_median};
use marlowe_domain::{
    AllowList, CheckName, CheckOutcome, CheckStatus, EvidenceRecord, ProductResult, Severity,
    Verdict,
};
use marlowe_evidence::{ProducerDeps, ProducerKind, ProducerRunner, Target};
use tokio::task::JoinSet;
use tracing::{info, warn};

/// Failed-check severity at which the verdict is pinned to danger
pub const DANGER_SEVERITY: f64 = 0.8;

/// Severity recorded when the price-anomaly override fires
pub const ANOMALY_SEVERITY: f64 = 0.9;

/// Everything the checker concluded about one product
#[derive(Debug, Clone, PartialEq)]
pub struct ProductAssessment {
    /// Product under assessment
    pub product_id: String,
    /// One outcome per named slot, in reporting order
    pub outcomes: Vec<CheckOutcome>,
    /// Trust score in [0, 100]
    pub trust_score: u8,
    /// Derived verdict
    pub verdict: Verdict,
}

/// Runs the fixed check set against products
pub struct FraudChecker {
    deps: ProducerDeps,
    runner: ProducerRunner,
    allowlist: AllowList,
}

impl FraudChecker {
    /// Create a checker over the shared producer dependencies
    pub fn new(deps: ProducerDeps, runner: ProducerRunner, allowlist: AllowList) -> Self {
        Self {
            deps,
            runner,
            allowlist,
        }
    }

    /// Check one product against its cohort
    pub async fn check_product(
        &self,
        product: &ProductResult,
        cohort: &[ProductResult],
    ) -> ProductAssessment {
        if self.allowlist.contains(&product.domain) {
            info!(domain = %product.domain, "Allow-listed retailer; skipping checks");
            return Self::trusted_assessment(product);
        }

        let target = Target::from_url(product.url.clone());
        let records = self
            .runner
            .run_selected(
                &[
                    ProducerKind::DomainAge,
                    ProducerKind::ThreatList,
                    ProducerKind::Reputation,
                    ProducerKind::SellerVerification,
                ],
                &target,
                &self.deps,
                |_, _| {},
            )
            .await;

        let mut outcomes: Vec<CheckOutcome> = CheckName::ALL
            .iter()
            .map(|&name| slot_outcome(name, &records))
            .collect();

        // Price-anomaly override: a price far below what trusted retailers
        // charge replaces the retailer-reputation outcome outright.
        if let Some(median) = trusted_median(cohort, &self.allowlist) {
            if is_anomalous(product.price, median) {
                let percent = ((median - product.price) / median * 100.0).round() as i64;
                warn!(
                    product = %product.id,
                    price = product.price,
                    median,
                    "Price anomaly override"
                );
                let override_outcome = CheckOutcome::new(
                    CheckName::RetailerReputation,
                    CheckStatus::Failed,
                    format!(
                        "Priced {}% below the trusted-retailer median of {:.2}",
                        percent, median
                    ),
                    ANOMALY_SEVERITY,
                );
                replace_slot(&mut outcomes, override_outcome);
            }
        }

        let trust_score = trust_score(&outcomes);
        let verdict = derive_verdict(&outcomes, trust_score);
        ProductAssessment {
            product_id: product.id.clone(),
            outcomes,
            trust_score,
            verdict,
        }
    }

    /// Check many products concurrently, each isolated from the others
    pub async fn check_all(
        &self,
        products: &[ProductResult],
    ) -> Vec<ProductAssessment> {
        let mut set = JoinSet::new();
        for product in products.iter().cloned() {
            let checker = self.clone_parts();
            let cohort = products.to_vec();
            set.spawn(async move { checker.check_product(&product, &cohort).await });
        }

        let mut assessments = Vec::new();
        while let Some(joined) = set.join_next().await {
            match joined {
                Ok(assessment) => assessments.push(assessment),
                Err(e) => warn!(error = %e, "Product check task failed to join"),
            }
        }
        assessments
    }

    fn clone_parts(&self) -> FraudChecker {
        FraudChecker {
            deps: self.deps.clone(),
            runner: self.runner.clone(),
            allowlist: self.allowlist.clone(),
        }
    }

    fn trusted_assessment(product: &ProductResult) -> ProductAssessment {
        let outcomes: Vec<CheckOutcome> = CheckName::ALL
            .iter()
            .map(|&name| CheckOutcome::passed(name, "Well-known trusted retailer"))
            .collect();
        ProductAssessment {
            product_id: product.id.clone(),
            outcomes,
            trust_score: 100,
            verdict: Verdict::Trusted,
        }
    }
}

/// Producer category feeding each check slot
fn slot_kind(name: CheckName) -> ProducerKind {
    match name {
        CheckName::RetailerReputation => ProducerKind::DomainAge,
        CheckName::SafetyDatabase => ProducerKind::ThreatList,
        CheckName::CommunitySentiment => ProducerKind::Reputation,
        CheckName::SellerVerification => ProducerKind::SellerVerification,
    }
}

/// Fold a slot's records into one outcome, keeping the worst instance
fn slot_outcome(name: CheckName, records: &[EvidenceRecord]) -> CheckOutcome {
    let category = slot_kind(name).category();
    let worst = records
        .iter()
        .filter(|r| r.category == category)
        .max_by_key(|r| r.severity);

    match worst {
        Some(record) => {
            let (status, severity) = match record.severity {
                Severity::Critical => (CheckStatus::Failed, 0.9),
                Severity::Warning => (CheckStatus::Warning, 0.5),
                // An inconclusive or failed check degrades to a mild warning
                Severity::Info => (CheckStatus::Warning, 0.3),
                Severity::Safe => (CheckStatus::Passed, 0.05),
            };
            CheckOutcome::new(name, status, record.detail.clone(), severity)
        }
        None => CheckOutcome::new(
            name,
            CheckStatus::Warning,
            "Check produced no result",
            0.3,
        ),
    }
}

fn replace_slot(outcomes: &mut [CheckOutcome], replacement: CheckOutcome) {
    if let Some(slot) = outcomes.iter_mut().find(|o| o.name == replacement.name) {
        if replacement.is_worse_than(slot) {
            *slot = replacement;
        }
    }
}

/// Weighted trust score over the four slots
fn trust_score(outcomes: &[CheckOutcome]) -> u8 {
    let total: f64 = outcomes
        .iter()
        .map(|o| o.name.weight() * (1.0 - o.severity))
        .sum();
    (total * 100.0).round().clamp(0.0, 100.0) as u8
}

/// Danger on any hard failure; otherwise thresholds on the score
fn derive_verdict(outcomes: &[CheckOutcome], score: u8) -> Verdict {
    let hard_failure = outcomes
        .iter()
        .any(|o| o.status == CheckStatus::Failed && o.severity >= DANGER_SEVERITY);
    if hard_failure {
        return Verdict::Danger;
    }
    Verdict::from_score(score)
}

#[cfg(test)]
mod tests {
    use super::*;
    use marlowe_domain::EvidenceCategory;

    fn record(category: EvidenceCategory, severity: Severity) -> EvidenceRecord {
        EvidenceRecord::new(category, severity, "t", "d", "s", 0.8)
    }

    fn outcome(name: CheckName, status: CheckStatus, severity: f64) -> CheckOutcome {
        CheckOutcome::new(name, status, "d", severity)
    }

    #[test]
    fn test_slot_outcome_keeps_worst_record() {
        let records = vec![
            record(EvidenceCategory::DomainAge, Severity::Safe),
            record(EvidenceCategory::DomainAge, Severity::Critical),
            record(EvidenceCategory::ThreatList, Severity::Safe),
        ];
        let outcome = slot_outcome(CheckName::RetailerReputation, &records);
        assert_eq!(outcome.status, CheckStatus::Failed);
        assert_eq!(outcome.severity, 0.9);
    }

    #[test]
    fn test_slot_without_records_degrades_to_warning() {
        let outcome = slot_outcome(CheckName::CommunitySentiment, &[]);
        assert_eq!(outcome.status, CheckStatus::Warning);
    }

    #[test]
    fn test_trust_score_weights() {
        let outcomes = vec![
            outcome(CheckName::RetailerReputation, CheckStatus::Passed, 0.0),
            outcome(CheckName::SafetyDatabase, CheckStatus::Passed, 0.0),
            outcome(CheckName::CommunitySentiment, CheckStatus::Passed, 0.0),
            outcome(CheckName::SellerVerification, CheckStatus::Passed, 0.0),
        ];
        assert_eq!(trust_score(&outcomes), 100);

        let mixed = vec![
            outcome(CheckName::RetailerReputation, CheckStatus::Failed, 1.0),
            outcome(CheckName::SafetyDatabase, CheckStatus::Passed, 0.0),
            outcome(CheckName::CommunitySentiment, CheckStatus::Passed, 0.0),
            outcome(CheckName::SellerVerification, CheckStatus::Passed, 0.0),
        ];
        // 100 * (0.30*0 + 0.30*1 + 0.20*1 + 0.20*1) = 70
        assert_eq!(trust_score(&mixed), 70);
    }

    #[test]
    fn test_hard_failure_pins_danger_regardless_of_score() {
        let outcomes = vec![
            outcome(CheckName::RetailerReputation, CheckStatus::Failed, 0.9),
            outcome(CheckName::SafetyDatabase, CheckStatus::Passed, 0.0),
            outcome(CheckName::CommunitySentiment, CheckStatus::Passed, 0.0),
            outcome(CheckName::SellerVerification, CheckStatus::Passed, 0.0),
        ];
        let score = trust_score(&outcomes);
        assert!(score >= 70, "score {} would otherwise be trusted", score);
        assert_eq!(derive_verdict(&outcomes, score), Verdict::Danger);
    }

    #[test]
    fn test_soft_failure_uses_score_thresholds() {
        let outcomes = vec![
            outcome(CheckName::RetailerReputation, CheckStatus::Warning, 0.5),
            outcome(CheckName::SafetyDatabase, CheckStatus::Warning, 0.5),
            outcome(CheckName::CommunitySentiment, CheckStatus::Warning, 0.5),
            outcome(CheckName::SellerVerification, CheckStatus::Warning, 0.5),
        ];
        let score = trust_score(&outcomes);
        assert_eq!(score, 50);
        assert_eq!(derive_verdict(&outcomes, score), Verdict::Caution);
    }

    fn unreachable_deps() -> ProducerDeps {
        use marlowe_intel::{
            CertificateInspector, ForumClient, IntelConfig, PageFetcher, ThreatListClient,
            WhoisClient,
        };
        use marlowe_llm::MockProvider;
        use std::sync::Arc;

        let config = IntelConfig {
            lookup_timeout_secs: 1,
            handshake_timeout_secs: 1,
            ..IntelConfig::default_test_config()
        };
        ProducerDeps {
            whois: Arc::new(
                WhoisClient::new(&config.whois_endpoint, "k", config.lookup_timeout()).unwrap(),
            ),
            threat: Arc::new(
                ThreatListClient::new(&config.threat_endpoint, "k", config.lookup_timeout())
                    .unwrap(),
            ),
            forum: Arc::new(
                ForumClient::new(&config.forum_endpoint, config.lookup_timeout()).unwrap(),
            ),
            page: Arc::new(PageFetcher::new(config.lookup_timeout(), 64 * 1024).unwrap()),
            cert: Arc::new(CertificateInspector::new(config.handshake_timeout())),
            reasoner: Arc::new(MockProvider::new("{}")),
        }
    }

    fn product(id: &str, domain: &str, price: f64) -> ProductResult {
        ProductResult {
            id: id.to_string(),
            title: "Widget".to_string(),
            price,
            currency: "USD".to_string(),
            retailer: domain.to_string(),
            domain: domain.to_string(),
            url: format!("https://{}/widget", domain),
            image: None,
            rating: None,
            review_count: None,
        }
    }

    #[tokio::test]
    async fn test_allowlisted_product_short_circuits() {
        let checker = FraudChecker::new(
            unreachable_deps(),
            ProducerRunner::default(),
            AllowList::builtin(),
        );
        let trusted = product("p-1", "amazon.com", 99.0);

        let assessment = checker.check_product(&trusted, &[trusted.clone()]).await;

        assert_eq!(assessment.trust_score, 100);
        assert_eq!(assessment.verdict, Verdict::Trusted);
        assert_eq!(assessment.outcomes.len(), 4);
        assert!(assessment
            .outcomes
            .iter()
            .all(|o| o.status == CheckStatus::Passed));
    }

    #[tokio::test]
    async fn test_price_anomaly_override_fails_retailer_reputation() {
        let checker = FraudChecker::new(
            unreachable_deps(),
            ProducerRunner::new(std::time::Duration::from_secs(5)),
            AllowList::builtin(),
        );
        let suspect = product("p-cheap", "sketchy.example", 35.0);
        let cohort = vec![
            product("p-a", "amazon.com", 95.0),
            product("p-b", "walmart.com", 100.0),
            product("p-c", "bestbuy.com", 105.0),
            suspect.clone(),
        ];

        let assessment = checker.check_product(&suspect, &cohort).await;

        let reputation = assessment
            .outcomes
            .iter()
            .find(|o| o.name == CheckName::RetailerReputation)
            .unwrap();
        assert_eq!(reputation.status, CheckStatus::Failed);
        assert_eq!(reputation.severity, 0.9);
        assert_eq!(assessment.verdict, Verdict::Danger);
    }

    #[tokio::test]
    async fn test_check_all_isolates_products() {
        let checker = FraudChecker::new(
            unreachable_deps(),
            ProducerRunner::new(std::time::Duration::from_secs(5)),
            AllowList::builtin(),
        );
        let products = vec![
            product("p-1", "amazon.com", 99.0),
            product("p-2", "walmart.com", 101.0),
        ];

        let mut assessments = checker.check_all(&products).await;
        assessments.sort_by(|a, b| a.product_id.cmp(&b.product_id));
        assert_eq!(assessments.len(), 2);
        assert!(assessments.iter().all(|a| a.trust_score == 100));
    }

    #[test]
    fn test_replace_slot_only_when_worse() {
        let mut outcomes = vec![outcome(CheckName::RetailerReputation, CheckStatus::Warning, 0.5)];
        replace_slot(
            &mut outcomes,
            outcome(CheckName::RetailerReputation, CheckStatus::Failed, 0.9),
        );
        assert_eq!(outcomes[0].severity, 0.9);

        replace_slot(
            &mut outcomes,
            outcome(CheckName::RetailerReputation, CheckStatus::Passed, 0.0),
        );
        assert_eq!(outcomes[0].severity, 0.9, "a milder outcome never replaces");
    }
}
