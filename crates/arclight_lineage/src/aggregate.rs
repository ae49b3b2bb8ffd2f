//! Per-category finding aggregation.
//!
//! One aggregate exists per (asset, category) for the duration of a sync
//! pass; it is never persisted directly and becomes the property set of the
//! category node in the graph.

use arclight_protocol::compliance::dpdpa_mapping;
use arclight_protocol::{Classification, Finding};
use std::collections::{BTreeMap, HashMap};
use uuid::Uuid;

/// Findings whose linked classification scores below this are noise and are
/// excluded from every aggregate.
pub const MIN_CLASSIFICATION_CONFIDENCE: f64 = 0.45;

/// Rollup of one asset's findings for a single PII category.
#[derive(Debug, Clone, PartialEq)]
pub struct CategoryAggregate {
    pub category: String,
    pub dpdpa_category: String,
    pub requires_consent: bool,
    pub finding_count: u64,
    pub total_confidence: f64,
    /// Pattern name -> total match count across findings.
    pub pattern_counts: BTreeMap<String, u64>,
    /// Severity label -> finding count.
    pub severity_counts: BTreeMap<String, u64>,
}

impl CategoryAggregate {
    fn new(category: &str, classification: &Classification) -> Self {
        // The first qualifying classification fixes the legal tags; fall back
        // to the DPDPA schedule when the classifier left them empty.
        let (dpdpa_category, requires_consent) = if classification.dpdpa_category.is_empty() {
            let mapping = dpdpa_mapping(category);
            (mapping.category.to_string(), mapping.requires_consent)
        } else {
            (
                classification.dpdpa_category.clone(),
                classification.requires_consent,
            )
        };

        Self {
            category: category.to_string(),
            dpdpa_category,
            requires_consent,
            finding_count: 0,
            total_confidence: 0.0,
            pattern_counts: BTreeMap::new(),
            severity_counts: BTreeMap::new(),
        }
    }

    pub fn avg_confidence(&self) -> f64 {
        if self.finding_count == 0 {
            0.0
        } else {
            self.total_confidence / self.finding_count as f64
        }
    }

    /// Number of distinct detection patterns contributing to this category.
    pub fn pattern_diversity(&self) -> usize {
        self.pattern_counts.len()
    }
}

/// Counters describing what the aggregation pass kept and dropped.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AggregationStats {
    pub total_findings: usize,
    pub skipped_no_classification: usize,
    pub skipped_low_confidence: usize,
    pub skipped_missing_category: usize,
}

/// Group findings by PII category.
///
/// A finding contributes iff it has a linked classification with confidence
/// >= [`MIN_CLASSIFICATION_CONFIDENCE`] and a non-empty category identifier.
pub fn aggregate(
    findings: &[Finding],
    classifications: &HashMap<Uuid, Classification>,
) -> (BTreeMap<String, CategoryAggregate>, AggregationStats) {
    let mut aggregates: BTreeMap<String, CategoryAggregate> = BTreeMap::new();
    let mut stats = AggregationStats {
        total_findings: findings.len(),
        ..Default::default()
    };

    for finding in findings {
        let Some(classification) = classifications.get(&finding.id) else {
            stats.skipped_no_classification += 1;
            continue;
        };

        if classification.confidence_score < MIN_CLASSIFICATION_CONFIDENCE {
            stats.skipped_low_confidence += 1;
            continue;
        }

        let category = classification.sub_category.as_str();
        if category.is_empty() {
            stats.skipped_missing_category += 1;
            continue;
        }

        let agg = aggregates
            .entry(category.to_string())
            .or_insert_with(|| CategoryAggregate::new(category, classification));

        agg.finding_count += 1;
        agg.total_confidence += classification.confidence_score;
        *agg
            .pattern_counts
            .entry(finding.pattern_name.clone())
            .or_default() += finding.match_count() as u64;
        *agg
            .severity_counts
            .entry(finding.severity.clone())
            .or_default() += 1;
    }

    (aggregates, stats)
}
