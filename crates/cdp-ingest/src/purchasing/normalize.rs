// Null Canonicalization and Field Derivation
//
// Collapses the export's assorted missing-value markers into a single
// absent sentinel (Option::None) and computes the derived per-row fields
// the extractors consume: display name, synthesized email, parsed
// timestamps, the return flag, and the 1-based row position that becomes
// the purchase id.
//
// Date parsing is lossy (failure -> absent). The customer_id key is the
// one hard failure: a row whose key cannot be coerced aborts the run.

use crate::purchasing::models::{EnrichedRow, RawRecord};
use chrono::NaiveDateTime;
use thiserror::Error;

/// Substitute for an absent customer name
pub const UNKNOWN_CUSTOMER: &str = "Unknown Customer";

/// Domain for synthesized customer emails
pub const EMAIL_DOMAIN: &str = "example.com";

/// Fixed timestamp pattern used by the export
const DATE_FORMAT: &str = "%m/%d/%Y %H:%M";

// ============================================================================
// Error Types
// ============================================================================

#[derive(Debug, Error)]
pub enum TransformError {
    #[error("row {row}: customer_id '{value}' cannot be coerced to an integer")]
    MalformedKey { row: usize, value: String },
}

pub type Result<T> = std::result::Result<T, TransformError>;

// ============================================================================
// Null Canonicalizer
// ============================================================================

/// Collapse the export's missing-value markers into the absent sentinel.
///
/// A value is absent iff it is missing from the source record or its
/// trimmed, lowercased form is one of "", "n/a", "na". Present values are
/// returned unchanged -- no trimming or case folding is applied to what
/// gets stored.
pub fn canonicalize(raw: Option<&str>) -> Option<String> {
    let value = raw?;
    match value.trim().to_ascii_lowercase().as_str() {
        "" | "n/a" | "na" => None,
        _ => Some(value.to_string()),
    }
}

// ============================================================================
// Field Derivers
// ============================================================================

/// Lenient integer coercion. Accepts float-formatted values, truncating
/// toward zero the way the original export's numeric columns round-trip.
fn coerce_int(value: &str) -> Option<i64> {
    let trimmed = value.trim();
    trimmed
        .parse::<i64>()
        .ok()
        .or_else(|| trimmed.parse::<f64>().ok().filter(|f| f.is_finite()).map(|f| f as i64))
}

/// Lenient float coercion
fn coerce_float(value: &str) -> Option<f64> {
    value.trim().parse::<f64>().ok().filter(|f| f.is_finite())
}

/// Best-effort timestamp parse; failure degrades to absent, never errors
pub fn parse_timestamp(value: &str) -> Option<NaiveDateTime> {
    NaiveDateTime::parse_from_str(value.trim(), DATE_FORMAT).ok()
}

/// Synthesize a customer email from the raw name and numeric customer id.
///
/// A present name becomes `<name, lowercased, spaces -> dots>.<id>@...`;
/// an absent name falls back to `customer.<id>@...`.
pub fn synthesize_email(name: Option<&str>, customer_id: i64) -> String {
    match name {
        Some(name) => format!(
            "{}.{}@{}",
            name.trim().replace(' ', ".").to_lowercase(),
            customer_id,
            EMAIL_DOMAIN
        ),
        None => format!("customer.{}@{}", customer_id, EMAIL_DOMAIN),
    }
}

/// A purchase counts as returned iff the marker is present and its trimmed
/// lowercase form is none of "n/a", "false", "0", empty.
pub fn is_returned(marker: Option<&str>) -> bool {
    match marker {
        None => false,
        Some(value) => {
            !matches!(value.trim().to_ascii_lowercase().as_str(), "" | "n/a" | "false" | "0")
        },
    }
}

// ============================================================================
// Row Enrichment
// ============================================================================

/// Canonicalize and derive one source row. `position` is 1-based.
pub fn enrich(record: &RawRecord, position: usize) -> Result<EnrichedRow> {
    let customer_id_raw = canonicalize(record.customer_id.as_deref());
    let customer_id = customer_id_raw
        .as_deref()
        .and_then(coerce_int)
        .ok_or_else(|| TransformError::MalformedKey {
            row: position,
            value: customer_id_raw.clone().unwrap_or_default(),
        })?;

    let customer_name = canonicalize(record.customer_name.as_deref());
    let display_name =
        customer_name.clone().unwrap_or_else(|| UNKNOWN_CUSTOMER.to_string());
    let email = synthesize_email(customer_name.as_deref(), customer_id);

    let return_marker = canonicalize(record.return_marker.as_deref());

    Ok(EnrichedRow {
        position,
        customer_id,
        customer_name,
        display_name,
        email,
        age: canonicalize(record.customer_age.as_deref()).as_deref().and_then(coerce_int),
        gender: canonicalize(record.customer_gender.as_deref()),
        agent: canonicalize(record.agent.as_deref()),
        supervisor: canonicalize(record.supervisor.as_deref()),
        manager: canonicalize(record.manager.as_deref()),
        employment_length: canonicalize(record.employment_length.as_deref()),
        call_category: canonicalize(record.call_category.as_deref()),
        call_date: canonicalize(record.call_date.as_deref())
            .as_deref()
            .and_then(parse_timestamp),
        purchase_date: canonicalize(record.purchase_date.as_deref())
            .as_deref()
            .and_then(parse_timestamp),
        quantity: canonicalize(record.product_quantity.as_deref())
            .as_deref()
            .and_then(coerce_int),
        product_category: canonicalize(record.product_category.as_deref()),
        amount: canonicalize(record.purchase_amount.as_deref())
            .as_deref()
            .and_then(coerce_float),
        csat_score: canonicalize(record.csat_score.as_deref()).as_deref().and_then(coerce_int),
        returned: is_returned(return_marker.as_deref()),
    })
}

/// Enrich every source row in order, aborting on the first malformed key
pub fn enrich_rows(records: &[RawRecord]) -> Result<Vec<EnrichedRow>> {
    records
        .iter()
        .enumerate()
        .map(|(index, record)| enrich(record, index + 1))
        .collect()
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn record_with_id(id: &str) -> RawRecord {
        RawRecord {
            customer_id: Some(id.to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn test_canonicalize_markers() {
        assert_eq!(canonicalize(None), None);
        assert_eq!(canonicalize(Some("")), None);
        assert_eq!(canonicalize(Some("  ")), None);
        assert_eq!(canonicalize(Some("n/a")), None);
        assert_eq!(canonicalize(Some("N/A")), None);
        assert_eq!(canonicalize(Some("NA")), None);
        assert_eq!(canonicalize(Some(" na ")), None);
    }

    #[test]
    fn test_canonicalize_keeps_values_unchanged() {
        assert_eq!(canonicalize(Some("Ann Lee")).as_deref(), Some("Ann Lee"));
        // Present values are not trimmed
        assert_eq!(canonicalize(Some(" Bo ")).as_deref(), Some(" Bo "));
        // "nan" is a real value, not a marker
        assert_eq!(canonicalize(Some("nan")).as_deref(), Some("nan"));
    }

    #[test]
    fn test_email_synthesis() {
        assert_eq!(synthesize_email(Some("Ann Lee"), 7), "ann.lee.7@example.com");
        assert_eq!(synthesize_email(None, 9), "customer.9@example.com");
        assert_eq!(synthesize_email(Some("  Jo Ann Smith "), 12), "jo.ann.smith.12@example.com");
    }

    #[test]
    fn test_return_flag_boundary() {
        for falsy in [Some("FALSE"), Some("0"), Some(""), Some(" false "), None] {
            assert!(!is_returned(falsy), "{:?} should not count as returned", falsy);
        }
        for truthy in ["Yes", "damaged", "1", "TRUE"] {
            assert!(is_returned(Some(truthy)), "{:?} should count as returned", truthy);
        }
    }

    #[test]
    fn test_parse_timestamp() {
        let parsed = parse_timestamp("3/14/2023 9:05").unwrap();
        assert_eq!(parsed.format("%Y-%m-%d %H:%M").to_string(), "2023-03-14 09:05");
        assert_eq!(parse_timestamp("2023-03-14"), None);
        assert_eq!(parse_timestamp("not a date"), None);
    }

    #[test]
    fn test_enrich_malformed_key() {
        let result = enrich(&record_with_id("abc"), 3);
        assert!(matches!(result, Err(TransformError::MalformedKey { row: 3, .. })));

        let missing = enrich(&RawRecord::default(), 1);
        assert!(matches!(missing, Err(TransformError::MalformedKey { row: 1, .. })));
    }

    #[test]
    fn test_enrich_float_formatted_key() {
        let row = enrich(&record_with_id("1234.0"), 1).unwrap();
        assert_eq!(row.customer_id, 1234);
    }

    #[test]
    fn test_enrich_derives_fields() {
        let record = RawRecord {
            customer_id: Some("7".to_string()),
            customer_name: Some("Ann Lee".to_string()),
            customer_age: Some("0".to_string()),
            purchase_date: Some("1/2/2023 08:30".to_string()),
            call_date: Some("bogus".to_string()),
            return_marker: Some("damaged".to_string()),
            purchase_amount: Some("19.99".to_string()),
            ..Default::default()
        };

        let row = enrich(&record, 4).unwrap();
        assert_eq!(row.position, 4);
        assert_eq!(row.email, "ann.lee.7@example.com");
        assert_eq!(row.display_name, "Ann Lee");
        // Age 0 is a real age, distinct from unknown
        assert_eq!(row.age, Some(0));
        assert!(row.purchase_date.is_some());
        assert_eq!(row.call_date, None);
        assert_eq!(row.amount, Some(19.99));
        assert!(row.returned);
    }

    #[test]
    fn test_enrich_absent_name() {
        let mut record = record_with_id("9");
        record.customer_name = Some("n/a".to_string());

        let row = enrich(&record, 1).unwrap();
        assert_eq!(row.customer_name, None);
        assert_eq!(row.display_name, UNKNOWN_CUSTOMER);
        assert_eq!(row.email, "customer.9@example.com");
    }
}
