//! Evidence producer implementations
//!
//! Contract: every producer takes the target plus shared dependencies and
//! returns one or more records. Producers never raise - each converts its
//! own failures into classified low-confidence records at its boundary.

pub mod brand;
pub mod certificate;
pub mod content;
pub mod domain_age;
pub mod price;
pub mod reputation;
pub mod seller;
pub mod threat_list;

use crate::kind::ProducerKind;
use crate::target::{ProducerDeps, Target};
use marlowe_domain::EvidenceRecord;

/// Run one producer to completion
pub async fn run_one(
    kind: ProducerKind,
    target: &Target,
    deps: &ProducerDeps,
) -> Vec<EvidenceRecord> {
    match kind {
        ProducerKind::DomainAge => domain_age::run(target, deps).await,
        ProducerKind::Certificate => certificate::run(target, deps).await,
        ProducerKind::ThreatList => threat_list::run(target, deps).await,
        ProducerKind::Content => content::run(target, deps).await,
        ProducerKind::Reputation => reputation::run(target, deps).await,
        ProducerKind::BrandImpersonation => brand::run(target, deps).await,
        ProducerKind::SellerVerification => seller::run(target, deps).await,
        ProducerKind::Price => price::run(target).await,
    }
}
