// Purchasing Data Models
//
// Rust structs for the flat export and the six destination tables it
// normalizes into. Destination field names match the destination columns
// exactly; storage binds them positionally.

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};

// ============================================================================
// Enums
// ============================================================================

/// Employee role, as stored in employee.emptitle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EmployeeTitle {
    Agent,
    Supervisor,
    Manager,
}

impl std::fmt::Display for EmployeeTitle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EmployeeTitle::Agent => write!(f, "Agent"),
            EmployeeTitle::Supervisor => write!(f, "Supervisor"),
            EmployeeTitle::Manager => write!(f, "Manager"),
        }
    }
}

impl std::str::FromStr for EmployeeTitle {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Agent" => Ok(EmployeeTitle::Agent),
            "Supervisor" => Ok(EmployeeTitle::Supervisor),
            "Manager" => Ok(EmployeeTitle::Manager),
            _ => Err(format!("Invalid employee title: {}", s)),
        }
    }
}

// ============================================================================
// Source Records
// ============================================================================

/// One row of the flat export, exactly as the CSV reader sees it.
///
/// Every field is optional: the export mixes genuinely empty cells with
/// textual markers like "n/a", and both collapse to the absent sentinel in
/// one place (normalize::canonicalize) before anything inspects them.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RawRecord {
    pub customer_id: Option<String>,
    pub customer_name: Option<String>,
    pub customer_age: Option<String>,
    pub customer_gender: Option<String>,
    pub agent: Option<String>,
    pub supervisor: Option<String>,
    pub manager: Option<String>,
    pub employment_length: Option<String>,
    pub call_category: Option<String>,
    pub call_date: Option<String>,
    pub purchase_date: Option<String>,
    pub product_quantity: Option<String>,
    pub product_category: Option<String>,
    pub purchase_amount: Option<String>,
    #[serde(rename = "return")]
    pub return_marker: Option<String>,
    pub csat_score: Option<String>,
}

/// A source row after canonicalization and field derivation.
///
/// `position` is the 1-based row number in the export; it doubles as the
/// purchase surrogate id. Absent values are `None` throughout -- the
/// distinction between "age is 0" and "age is unknown" survives until the
/// final shaping step.
#[derive(Debug, Clone, PartialEq)]
pub struct EnrichedRow {
    pub position: usize,
    pub customer_id: i64,
    pub customer_name: Option<String>,
    pub display_name: String,
    pub email: String,
    pub age: Option<i64>,
    pub gender: Option<String>,
    pub agent: Option<String>,
    pub supervisor: Option<String>,
    pub manager: Option<String>,
    pub employment_length: Option<String>,
    pub call_category: Option<String>,
    pub call_date: Option<NaiveDateTime>,
    pub purchase_date: Option<NaiveDateTime>,
    pub quantity: Option<i64>,
    pub product_category: Option<String>,
    pub amount: Option<f64>,
    pub csat_score: Option<i64>,
    pub returned: bool,
}

// ============================================================================
// Destination Records
// ============================================================================

/// customer table row (conflict key: customerid)
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CustomerRecord {
    pub customerid: i64,
    pub email: String,
    pub custname: String,
    /// -1 means unknown, not a real age
    pub age: i64,
    pub gender: Option<String>,
}

/// emaillist table row (conflict key: listid)
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EmailListRecord {
    pub listid: i64,
    pub listtitle: String,
    pub createddate: DateTime<Utc>,
}

/// employee table row (conflict key: employeeid)
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EmployeeRecord {
    pub employeeid: i64,
    pub empname: String,
    pub emptitle: EmployeeTitle,
    /// Captured for agents only; supervisors and managers have none
    pub tenure: Option<String>,
}

/// purchase table row (conflict key: purchaseid)
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PurchaseRecord {
    pub purchaseid: i64,
    pub customerid: i64,
    pub purchdate: Option<NaiveDateTime>,
    pub quantity: Option<i64>,
    pub category: Option<String>,
    pub amount: Option<f64>,
    pub returned: bool,
}

/// customeremaillist join table row (conflict key: the full row)
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct CustomerEmailListRecord {
    pub customerid: i64,
    pub listid: i64,
}

/// returns table row (conflict key: returnid)
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReturnRecord {
    pub returnid: i64,
    pub purchaseid: i64,
    /// Absent when the return was never resolved to a specific agent
    pub employeeid: Option<i64>,
    pub returndate: Option<NaiveDateTime>,
    pub csat_score: Option<i64>,
}

/// The six destination batches, in upload dependency order
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Batches {
    pub customers: Vec<CustomerRecord>,
    pub email_lists: Vec<EmailListRecord>,
    pub employees: Vec<EmployeeRecord>,
    pub purchases: Vec<PurchaseRecord>,
    pub subscriptions: Vec<CustomerEmailListRecord>,
    pub returns: Vec<ReturnRecord>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_employee_title_roundtrip() {
        for title in [EmployeeTitle::Agent, EmployeeTitle::Supervisor, EmployeeTitle::Manager] {
            assert_eq!(EmployeeTitle::from_str(&title.to_string()).unwrap(), title);
        }
    }

    #[test]
    fn test_employee_title_invalid() {
        assert!(EmployeeTitle::from_str("Director").is_err());
    }
}
