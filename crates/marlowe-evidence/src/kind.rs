//! The closed set of evidence producers
//!
//! The reasoning loop selects producers by name; parsing model output into
//! this enum replaces string-keyed dispatch, so an unknown tool name is
//! dropped at the boundary instead of reaching a handler table.

use marlowe_domain::EvidenceCategory;

/// One invokable evidence producer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProducerKind {
    /// WHOIS registration age
    DomainAge,
    /// TLS certificate introspection
    Certificate,
    /// Malicious-URL database lookup
    ThreatList,
    /// On-page content heuristics
    Content,
    /// Community-forum reputation search
    Reputation,
    /// Brand-impersonation classification
    BrandImpersonation,
    /// Marketplace seller verification
    SellerVerification,
    /// Cohort price comparison
    Price,
}

impl ProducerKind {
    /// All producers, in default invocation order
    pub const ALL: [ProducerKind; 8] = [
        Self::DomainAge,
        Self::Certificate,
        Self::ThreatList,
        Self::Content,
        Self::Reputation,
        Self::BrandImpersonation,
        Self::SellerVerification,
        Self::Price,
    ];

    /// Tool name the reasoning model uses
    pub fn as_str(&self) -> &'static str {
        match self {
            ProducerKind::DomainAge => "domain_age",
            ProducerKind::Certificate => "certificate",
            ProducerKind::ThreatList => "threat_list",
            ProducerKind::Content => "content",
            ProducerKind::Reputation => "reputation",
            ProducerKind::BrandImpersonation => "brand_impersonation",
            ProducerKind::SellerVerification => "seller_verification",
            ProducerKind::Price => "price",
        }
    }

    /// Parse a tool name from model output
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "domain_age" => Some(ProducerKind::DomainAge),
            "certificate" => Some(ProducerKind::Certificate),
            "threat_list" => Some(ProducerKind::ThreatList),
            "content" => Some(ProducerKind::Content),
            "reputation" => Some(ProducerKind::Reputation),
            "brand_impersonation" => Some(ProducerKind::BrandImpersonation),
            "seller_verification" => Some(ProducerKind::SellerVerification),
            "price" => Some(ProducerKind::Price),
            _ => None,
        }
    }

    /// Evidence category this producer emits under
    pub fn category(&self) -> EvidenceCategory {
        match self {
            ProducerKind::DomainAge => EvidenceCategory::DomainAge,
            ProducerKind::Certificate => EvidenceCategory::Certificate,
            ProducerKind::ThreatList => EvidenceCategory::ThreatList,
            ProducerKind::Content => EvidenceCategory::Content,
            ProducerKind::Reputation => EvidenceCategory::Reputation,
            ProducerKind::BrandImpersonation => EvidenceCategory::BrandImpersonation,
            ProducerKind::SellerVerification => EvidenceCategory::SellerVerification,
            ProducerKind::Price => EvidenceCategory::Price,
        }
    }

    /// One-line tool description for the planning prompt
    pub fn description(&self) -> &'static str {
        match self {
            ProducerKind::DomainAge => "Check how long ago the domain was registered",
            ProducerKind::Certificate => "Inspect the site's TLS certificate",
            ProducerKind::ThreatList => "Look the host up in a malicious-URL database",
            ProducerKind::Content => "Scan page content for scam-pattern heuristics",
            ProducerKind::Reputation => "Search community forums for scam reports",
            ProducerKind::BrandImpersonation => "Judge whether the domain impersonates a known brand",
            ProducerKind::SellerVerification => "Verify the marketplace seller behind the listing",
            ProducerKind::Price => "Compare the listed price against the trusted-cohort median",
        }
    }
}

impl std::str::FromStr for ProducerKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| format!("Unknown producer: {}", s))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_trip_all_producers() {
        for kind in ProducerKind::ALL {
            assert_eq!(ProducerKind::parse(kind.as_str()), Some(kind));
        }
    }

    #[test]
    fn test_unknown_name_rejected() {
        assert_eq!(ProducerKind::parse("port_scan"), None);
        assert!("port_scan".parse::<ProducerKind>().is_err());
    }

    #[test]
    fn test_parse_tolerates_case_and_whitespace() {
        assert_eq!(
            ProducerKind::parse("  Domain_Age "),
            Some(ProducerKind::DomainAge)
        );
    }

    #[test]
    fn test_each_producer_has_distinct_category() {
        let mut categories: Vec<_> = ProducerKind::ALL.iter().map(|k| k.category()).collect();
        categories.dedup();
        assert_eq!(categories.len(), 8);
    }
}
