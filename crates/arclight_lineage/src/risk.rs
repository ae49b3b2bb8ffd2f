//! Table-driven risk classification per PII category.

use arclight_protocol::RiskLevel;

/// Below this aggregate confidence the baseline severity drops one level.
const LOW_CONFIDENCE_THRESHOLD: f64 = 0.65;
/// Above this aggregate confidence the baseline severity rises one level.
const HIGH_CONFIDENCE_THRESHOLD: f64 = 0.85;

/// Baseline integer severity for a PII category identifier.
///
/// 3 = Critical (government and financial identifiers), 2 = High (regulated
/// contact and secondary government identifiers), 1 = Medium (institutional
/// codes and anything unrecognized). The table is intentionally small and
/// explicit so compliance can audit it line by line.
fn baseline_severity(category: &str) -> i32 {
    match category {
        "IN_AADHAAR" => 3,         // Government ID
        "IN_PAN" => 3,             // Financial ID
        "IN_PASSPORT" => 3,        // Government ID
        "CREDIT_CARD" => 3,        // Financial data
        "IN_BANK_ACCOUNT" => 3,    // Financial data
        "IN_DRIVING_LICENSE" => 2, // Government ID
        "IN_VOTER_ID" => 2,        // Government ID
        "IN_UPI" => 2,             // Financial
        "IN_PHONE" => 2,           // Personal contact
        "EMAIL_ADDRESS" => 2,      // Personal contact
        "IN_IFSC" => 1,            // Institutional
        _ => 1,
    }
}

/// Risk level for a category given the aggregate detection confidence.
///
/// Two-factor scoring: the category's baseline severity, adjusted down one
/// step when confidence is weak (< 0.65) and up one step when it is strong
/// (> 0.85), clamped into the four risk levels.
pub fn risk_level_for(category: &str, avg_confidence: f64) -> RiskLevel {
    let mut score = baseline_severity(category);

    if avg_confidence < LOW_CONFIDENCE_THRESHOLD {
        score -= 1;
    } else if avg_confidence > HIGH_CONFIDENCE_THRESHOLD {
        score += 1;
    }

    RiskLevel::from_score(score)
}
