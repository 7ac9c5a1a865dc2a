//! Marlowe Fraud-Check Orchestrator
//!
//! Per-product assessment: four named checks run concurrently per product
//! (retailer reputation, safety database, community sentiment, seller
//! verification), a cohort price-anomaly override, and a weighted trust
//! score with a three-way verdict. Allow-listed retailers short-circuit to
//! a perfect score with zero network calls. Products are checked
//! concurrently with each other, each isolated.

#![warn(missing_docs)]

pub mod checker;
pub mod cohort;

pub use checker::{FraudChecker, ProductAssessment, ANOMALY_SEVERITY, DANGER_SEVERITY};
pub use cohort::{is_anomalous, trusted_median, ANOMALY_DISCOUNT};
