//! DPDPA 2023 legal-category defaults per PII category.
//!
//! Classification rows normally arrive with a legal tag already attached by
//! the detector; this table supplies defaults when they do not. Retention
//! periods mirror the compliance team's published schedule.

use serde::Serialize;

/// Legal handling metadata for one PII category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DpdpaMapping {
    pub category: &'static str,
    pub requires_consent: bool,
    pub retention_period_days: u32,
}

/// Fallback for categories the schedule does not name.
const DEFAULT_MAPPING: DpdpaMapping = DpdpaMapping {
    category: "Other",
    requires_consent: false,
    retention_period_days: 365,
};

/// Look up the DPDPA mapping for a PII category identifier.
pub fn dpdpa_mapping(pii_category: &str) -> DpdpaMapping {
    let (category, requires_consent, retention_period_days) = match pii_category {
        "IN_AADHAAR" => ("Government Identifier", true, 1825),
        "IN_PAN" => ("Financial Identifier", true, 2555),
        "CREDIT_CARD" => ("Financial Identifier", true, 730),
        "IN_PASSPORT" => ("Sensitive Personal Data", true, 3650),
        "IN_BANK_ACCOUNT" | "BANK_ACCOUNT" => ("Financial Identifier", true, 2555),
        "IN_IFSC" | "IFSC" => ("Financial Identifier", true, 2555),
        "EMAIL_ADDRESS" | "EMAIL" => ("Contact Information", true, 365),
        "IN_PHONE" | "PHONE" => ("Contact Information", true, 365),
        _ => return DEFAULT_MAPPING,
    };
    DpdpaMapping {
        category,
        requires_consent,
        retention_period_days,
    }
}
