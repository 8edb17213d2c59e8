// Entity Extraction and Cross-Reference Resolution
//
// Projects the enriched row set into the six destination record sets.
// Surrogate ids are dense integers assigned in first-occurrence order;
// each extractor publishes a natural-key -> id lookup so dependent
// entities can resolve their textual references. All functions are pure
// over the row set, and scan order is source order throughout: role
// precedence and conflict tie-breaks depend on it.

use crate::purchasing::models::{
    CustomerEmailListRecord, CustomerRecord, EmailListRecord, EmployeeRecord, EmployeeTitle,
    EnrichedRow, PurchaseRecord, ReturnRecord,
};
use crate::purchasing::normalize::UNKNOWN_CUSTOMER;
use chrono::{DateTime, Utc};
use std::collections::{BTreeMap, HashMap, HashSet};

// ============================================================================
// Email Lists
// ============================================================================

/// One mailing list per distinct call category, in first-appearance order.
///
/// Returns the records plus the category -> listid lookup used to resolve
/// per-row references.
pub fn extract_email_lists(
    rows: &[EnrichedRow],
    created: DateTime<Utc>,
) -> (Vec<EmailListRecord>, HashMap<String, i64>) {
    let mut lists = Vec::new();
    let mut ids = HashMap::new();

    for row in rows {
        let Some(category) = row.call_category.as_deref() else {
            continue;
        };
        if ids.contains_key(category) {
            continue;
        }

        let listid = lists.len() as i64 + 1;
        ids.insert(category.to_string(), listid);
        lists.push(EmailListRecord {
            listid,
            listtitle: category.to_string(),
            createddate: created,
        });
    }

    (lists, ids)
}

// ============================================================================
// Employees
// ============================================================================

/// Employees from the three role columns, scanned Agent, then Supervisor,
/// then Manager. A name registered under an earlier role is never
/// re-registered under a later one, and tenure is captured for agents only
/// (first occurrence wins).
///
/// Returns the records plus the name -> employeeid lookup.
pub fn extract_employees(
    rows: &[EnrichedRow],
) -> (Vec<EmployeeRecord>, HashMap<String, i64>) {
    let mut employees = Vec::new();
    let mut ids = HashMap::new();

    register_role(rows, |row| row.agent.as_deref(), EmployeeTitle::Agent, &mut employees, &mut ids);
    register_role(
        rows,
        |row| row.supervisor.as_deref(),
        EmployeeTitle::Supervisor,
        &mut employees,
        &mut ids,
    );
    register_role(
        rows,
        |row| row.manager.as_deref(),
        EmployeeTitle::Manager,
        &mut employees,
        &mut ids,
    );

    (employees, ids)
}

fn register_role<'a>(
    rows: &'a [EnrichedRow],
    name_of: impl Fn(&'a EnrichedRow) -> Option<&'a str>,
    title: EmployeeTitle,
    employees: &mut Vec<EmployeeRecord>,
    ids: &mut HashMap<String, i64>,
) {
    for row in rows {
        let Some(name) = name_of(row) else {
            continue;
        };
        if ids.contains_key(name) {
            continue;
        }

        let employeeid = employees.len() as i64 + 1;
        let tenure = match title {
            EmployeeTitle::Agent => row.employment_length.clone(),
            _ => None,
        };

        ids.insert(name.to_string(), employeeid);
        employees.push(EmployeeRecord {
            employeeid,
            empname: name.to_string(),
            emptitle: title,
            tenure,
        });
    }
}

// ============================================================================
// Customers (Conflict Reduction)
// ============================================================================

/// One customer per customerid, picking the most complete source row:
/// real name beats unknown, then present age, then present gender, with
/// the earliest row winning ties. Emitted sorted by customerid ascending.
pub fn resolve_customers(rows: &[EnrichedRow]) -> Vec<CustomerRecord> {
    let mut best: BTreeMap<i64, &EnrichedRow> = BTreeMap::new();

    for row in rows {
        // Strictly-greater keeps the earlier row on ties
        let replace = match best.get(&row.customer_id) {
            None => true,
            Some(current) => completeness(row) > completeness(current),
        };
        if replace {
            best.insert(row.customer_id, row);
        }
    }

    best.into_values()
        .map(|row| CustomerRecord {
            customerid: row.customer_id,
            email: row.email.clone(),
            custname: row.display_name.clone(),
            age: row.age.unwrap_or(-1),
            gender: row.gender.clone(),
        })
        .collect()
}

/// Completeness rank; tuple comparison matches the priority order
fn completeness(row: &EnrichedRow) -> (bool, bool, bool) {
    (row.display_name != UNKNOWN_CUSTOMER, row.age.is_some(), row.gender.is_some())
}

// ============================================================================
// Purchases
// ============================================================================

/// One purchase per source row, no deduplication; purchaseid is the row's
/// 1-based position in the export.
pub fn extract_purchases(rows: &[EnrichedRow]) -> Vec<PurchaseRecord> {
    rows.iter()
        .map(|row| PurchaseRecord {
            purchaseid: row.position as i64,
            customerid: row.customer_id,
            purchdate: row.purchase_date,
            quantity: row.quantity,
            category: row.product_category.clone(),
            amount: row.amount,
            returned: row.returned,
        })
        .collect()
}

// ============================================================================
// Subscriptions (customeremaillist)
// ============================================================================

/// One join row per distinct (customer, mailing list) pairing observed,
/// in first-occurrence order. Rows without a resolvable category simply
/// contribute nothing.
pub fn extract_subscriptions(
    rows: &[EnrichedRow],
    list_ids: &HashMap<String, i64>,
) -> Vec<CustomerEmailListRecord> {
    let mut seen = HashSet::new();
    let mut pairs = Vec::new();

    for row in rows {
        let Some(listid) =
            row.call_category.as_deref().and_then(|category| list_ids.get(category)).copied()
        else {
            continue;
        };

        let pair = CustomerEmailListRecord { customerid: row.customer_id, listid };
        if seen.insert((pair.customerid, pair.listid)) {
            pairs.push(pair);
        }
    }

    pairs
}

// ============================================================================
// Returns
// ============================================================================

/// Returns for rows whose return marker was affirmative, with returnids
/// assigned sequentially over qualifying rows in source order.
///
/// A return whose purchaseid does not land inside the purchase batch is
/// dropped rather than nulled (it still consumes its returnid); the drop
/// count is reported so the pipeline can log it. The employee reference
/// may legitimately stay absent.
pub fn extract_returns(
    rows: &[EnrichedRow],
    employee_ids: &HashMap<String, i64>,
    purchase_count: usize,
) -> (Vec<ReturnRecord>, usize) {
    let mut returns = Vec::new();
    let mut dropped = 0usize;
    let mut next_returnid = 1i64;

    for row in rows {
        if !row.returned {
            continue;
        }

        let returnid = next_returnid;
        next_returnid += 1;

        let purchaseid = row.position as i64;
        if purchaseid < 1 || purchaseid > purchase_count as i64 {
            dropped += 1;
            continue;
        }

        let employeeid =
            row.agent.as_deref().and_then(|agent| employee_ids.get(agent)).copied();

        returns.push(ReturnRecord {
            returnid,
            purchaseid,
            employeeid,
            returndate: row.call_date,
            csat_score: row.csat_score,
        });
    }

    (returns, dropped)
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::purchasing::models::RawRecord;
    use crate::purchasing::normalize;

    fn rows_from(records: Vec<RawRecord>) -> Vec<EnrichedRow> {
        normalize::enrich_rows(&records).unwrap()
    }

    fn record(customer_id: &str) -> RawRecord {
        RawRecord {
            customer_id: Some(customer_id.to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn test_email_lists_first_appearance_order() {
        let mut a = record("1");
        a.call_category = Some("Billing".to_string());
        let mut b = record("2");
        b.call_category = Some("Support".to_string());
        let mut c = record("3");
        c.call_category = Some("Billing".to_string());
        let d = record("4");

        let rows = rows_from(vec![a, b, c, d]);
        let (lists, ids) = extract_email_lists(&rows, Utc::now());

        assert_eq!(lists.len(), 2);
        assert_eq!(lists[0].listid, 1);
        assert_eq!(lists[0].listtitle, "Billing");
        assert_eq!(lists[1].listid, 2);
        assert_eq!(lists[1].listtitle, "Support");
        assert_eq!(ids["Billing"], 1);
        assert_eq!(ids["Support"], 2);
    }

    #[test]
    fn test_employee_first_seen_role_wins() {
        let mut a = record("1");
        a.agent = Some("Sam".to_string());
        let mut b = record("2");
        b.supervisor = Some("Sam".to_string());

        let rows = rows_from(vec![a, b]);
        let (employees, ids) = extract_employees(&rows);

        assert_eq!(employees.len(), 1);
        assert_eq!(employees[0].empname, "Sam");
        assert_eq!(employees[0].emptitle, EmployeeTitle::Agent);
        assert_eq!(ids["Sam"], 1);
    }

    #[test]
    fn test_employee_roles_scanned_in_order() {
        let mut a = record("1");
        a.supervisor = Some("Vera".to_string());
        let mut b = record("2");
        b.agent = Some("Sam".to_string());
        b.manager = Some("Max".to_string());

        let rows = rows_from(vec![a, b]);
        let (employees, _) = extract_employees(&rows);

        // All agents register before any supervisor, before any manager
        assert_eq!(employees[0].empname, "Sam");
        assert_eq!(employees[0].emptitle, EmployeeTitle::Agent);
        assert_eq!(employees[1].empname, "Vera");
        assert_eq!(employees[1].emptitle, EmployeeTitle::Supervisor);
        assert_eq!(employees[2].empname, "Max");
        assert_eq!(employees[2].emptitle, EmployeeTitle::Manager);
    }

    #[test]
    fn test_employee_tenure_agent_only_first_occurrence() {
        let mut a = record("1");
        a.agent = Some("Sam".to_string());
        a.employment_length = Some("2 years".to_string());
        let mut b = record("2");
        b.agent = Some("Sam".to_string());
        b.employment_length = Some("3 years".to_string());
        let mut c = record("3");
        c.supervisor = Some("Vera".to_string());
        c.employment_length = Some("8 years".to_string());

        let rows = rows_from(vec![a, b, c]);
        let (employees, _) = extract_employees(&rows);

        assert_eq!(employees[0].tenure.as_deref(), Some("2 years"));
        // Supervisors never capture tenure, even when the row has one
        assert_eq!(employees[1].empname, "Vera");
        assert_eq!(employees[1].tenure, None);
    }

    #[test]
    fn test_customer_conflict_reduction() {
        let mut a = record("41");
        a.customer_name = Some("Jane".to_string());
        let mut b = record("41");
        b.customer_age = Some("41".to_string());

        let rows = rows_from(vec![a, b]);
        let customers = resolve_customers(&rows);

        // The named row wins even though the other carries an age
        assert_eq!(customers.len(), 1);
        assert_eq!(customers[0].custname, "Jane");
        assert_eq!(customers[0].age, -1);
        assert_eq!(customers[0].email, "jane.41@example.com");
    }

    #[test]
    fn test_customer_tie_broken_by_row_order() {
        let mut a = record("5");
        a.customer_name = Some("First".to_string());
        let mut b = record("5");
        b.customer_name = Some("Second".to_string());

        let rows = rows_from(vec![a, b]);
        let customers = resolve_customers(&rows);

        assert_eq!(customers[0].custname, "First");
    }

    #[test]
    fn test_customers_sorted_by_id() {
        let rows = rows_from(vec![record("30"), record("10"), record("20")]);
        let customers = resolve_customers(&rows);

        let ids: Vec<i64> = customers.iter().map(|c| c.customerid).collect();
        assert_eq!(ids, vec![10, 20, 30]);
    }

    #[test]
    fn test_customer_age_zero_is_real() {
        let mut a = record("6");
        a.customer_age = Some("0".to_string());

        let rows = rows_from(vec![a]);
        let customers = resolve_customers(&rows);

        assert_eq!(customers[0].age, 0);
    }

    #[test]
    fn test_purchases_dense_ids() {
        let rows = rows_from(vec![record("1"), record("1"), record("2")]);
        let purchases = extract_purchases(&rows);

        let ids: Vec<i64> = purchases.iter().map(|p| p.purchaseid).collect();
        assert_eq!(ids, vec![1, 2, 3]);
        assert_eq!(purchases[1].customerid, 1);
    }

    #[test]
    fn test_subscriptions_distinct_pairs() {
        let mut a = record("1");
        a.call_category = Some("Billing".to_string());
        let mut b = record("1");
        b.call_category = Some("Billing".to_string());
        let mut c = record("1");
        c.call_category = Some("Support".to_string());
        let d = record("2");

        let rows = rows_from(vec![a, b, c, d]);
        let (_, list_ids) = extract_email_lists(&rows, Utc::now());
        let pairs = extract_subscriptions(&rows, &list_ids);

        assert_eq!(
            pairs,
            vec![
                CustomerEmailListRecord { customerid: 1, listid: 1 },
                CustomerEmailListRecord { customerid: 1, listid: 2 },
            ]
        );
    }

    #[test]
    fn test_returns_sequential_over_returned_rows() {
        let mut a = record("1");
        a.return_marker = Some("TRUE".to_string());
        a.agent = Some("Sam".to_string());
        a.call_date = Some("3/14/2023 9:05".to_string());
        a.csat_score = Some("4".to_string());
        let b = record("2");
        let mut c = record("3");
        c.return_marker = Some("damaged".to_string());

        let rows = rows_from(vec![a, b, c]);
        let (_, employee_ids) = extract_employees(&rows);
        let (returns, dropped) = extract_returns(&rows, &employee_ids, rows.len());

        assert_eq!(dropped, 0);
        assert_eq!(returns.len(), 2);
        assert_eq!(returns[0].returnid, 1);
        assert_eq!(returns[0].purchaseid, 1);
        assert_eq!(returns[0].employeeid, Some(1));
        assert!(returns[0].returndate.is_some());
        assert_eq!(returns[0].csat_score, Some(4));
        assert_eq!(returns[1].returnid, 2);
        assert_eq!(returns[1].purchaseid, 3);
        // No agent on the row: the reference stays absent
        assert_eq!(returns[1].employeeid, None);
    }

    #[test]
    fn test_returns_out_of_range_purchase_dropped() {
        let mut a = record("1");
        a.return_marker = Some("1".to_string());
        let mut b = record("2");
        b.return_marker = Some("1".to_string());

        let rows = rows_from(vec![a, b]);
        let (returns, dropped) = extract_returns(&rows, &HashMap::new(), 1);

        // The second return's purchase lands outside the batch; its id is
        // consumed anyway
        assert_eq!(dropped, 1);
        assert_eq!(returns.len(), 1);
        assert_eq!(returns[0].returnid, 1);
    }
}
