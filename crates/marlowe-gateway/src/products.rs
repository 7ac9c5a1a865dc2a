//! Product-analysis streaming flow
//!
//! Search -> normalize -> per-product fraud checks -> verdicts -> best pick.
//! Products are checked concurrently and their events stream in completion
//! order; consumers correlate by product id.

use crate::handlers::AppState;
use marlowe_domain::{EventSink, ProductResult, StreamEvent, Verdict};
use marlowe_fraudcheck::{trusted_median, ProductAssessment};
use tokio::task::JoinSet;
use tracing::{info, warn};

/// Run the whole product-analysis pipeline, emitting events as work completes
pub async fn run_product_analysis(state: AppState, queries: Vec<String>, sink: Box<dyn EventSink>) {
    sink.emit(StreamEvent::Narration {
        text: format!("Searching retailers for {} queries...", queries.len()),
    });

    let products = state.aggregator.search_all(&queries).await;
    for product in &products {
        sink.emit(StreamEvent::Product {
            product: product.clone(),
        });
    }
    sink.emit(StreamEvent::AllProducts {
        count: products.len(),
    });

    if products.is_empty() {
        sink.emit(StreamEvent::Done {
            summary: "No products found for those queries".to_string(),
        });
        return;
    }

    let median = trusted_median(&products, &state.allowlist);
    info!(count = products.len(), ?median, "Checking products");

    let mut set = JoinSet::new();
    for product in products.iter().cloned() {
        let checker = state.checker.clone();
        let cohort = products.clone();
        set.spawn(async move {
            let assessment = checker.check_product(&product, &cohort).await;
            (product, assessment)
        });
    }

    let mut checked: Vec<(ProductResult, ProductAssessment)> = Vec::new();
    while let Some(joined) = set.join_next().await {
        match joined {
            Ok((product, assessment)) => {
                for outcome in &assessment.outcomes {
                    sink.emit(StreamEvent::FraudCheck {
                        product_id: product.id.clone(),
                        check: outcome.clone(),
                    });
                }
                sink.emit(StreamEvent::ProductVerdict {
                    product_id: product.id.clone(),
                    verdict: assessment.verdict,
                    trust_score: assessment.trust_score,
                });
                checked.push((product, assessment));
            }
            Err(e) => warn!(error = %e, "Product check task failed to join"),
        }
    }

    let trusted_count = checked
        .iter()
        .filter(|(_, a)| a.verdict == Verdict::Trusted)
        .count();

    if let Some((best, _)) = checked
        .iter()
        .filter(|(_, a)| a.verdict == Verdict::Trusted)
        .min_by(|(a, _), (b, _)| a.price.partial_cmp(&b.price).expect("prices are finite"))
    {
        let savings = median.map(|m| m - best.price).filter(|s| *s > 0.0);
        sink.emit(StreamEvent::BestPick {
            product_id: best.id.clone(),
            savings,
        });
    }

    sink.emit(StreamEvent::Done {
        summary: format!(
            "Checked {} products; {} came back trusted",
            checked.len(),
            trusted_count
        ),
    });
}
