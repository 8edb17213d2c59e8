// Purchasing Storage Layer
//
// Upserts the six destination batches into Postgres. Each table gets one
// pass, chunked into per-chunk transactions; no transaction spans tables.
// Reruns rely on the upsert conflict keys, not on atomicity. Queries are
// runtime-checked so the crate builds without a live database.
//
// Schema Reference (tables are assumed to exist; DDL is managed elsewhere):
//
// ```sql
// CREATE TABLE customer (
//     customerid BIGINT PRIMARY KEY,
//     email TEXT NOT NULL,
//     custname TEXT NOT NULL,
//     age BIGINT NOT NULL,            -- -1 means unknown
//     gender TEXT
// );
// CREATE TABLE emaillist (
//     listid BIGINT PRIMARY KEY,
//     listtitle TEXT NOT NULL,
//     createddate TIMESTAMPTZ NOT NULL
// );
// CREATE TABLE employee (
//     employeeid BIGINT PRIMARY KEY,
//     empname TEXT NOT NULL,
//     emptitle TEXT NOT NULL,         -- Agent | Supervisor | Manager
//     tenure TEXT
// );
// CREATE TABLE purchase (
//     purchaseid BIGINT PRIMARY KEY,
//     customerid BIGINT NOT NULL REFERENCES customer (customerid),
//     purchdate TIMESTAMP,
//     quantity BIGINT,
//     category TEXT,
//     amount DOUBLE PRECISION,
//     returned BOOLEAN NOT NULL
// );
// CREATE TABLE customeremaillist (
//     customerid BIGINT NOT NULL REFERENCES customer (customerid),
//     listid BIGINT NOT NULL REFERENCES emaillist (listid),
//     PRIMARY KEY (customerid, listid)
// );
// CREATE TABLE returns (
//     returnid BIGINT PRIMARY KEY,
//     purchaseid BIGINT NOT NULL REFERENCES purchase (purchaseid),
//     employeeid BIGINT REFERENCES employee (employeeid),
//     returndate TIMESTAMP,
//     csat_score BIGINT
// );
// ```

use crate::error::Error;
use crate::purchasing::models::{
    CustomerEmailListRecord, CustomerRecord, EmailListRecord, EmployeeRecord, PurchaseRecord,
    ReturnRecord,
};
use sqlx::PgPool;
use tracing::{debug, info};

// ============================================================================
// Customer
// ============================================================================

/// Upsert the customer batch (conflict key: customerid)
pub async fn upsert_customers(
    pool: &PgPool,
    batch_size: usize,
    customers: &[CustomerRecord],
) -> Result<u64, Error> {
    let mut written = 0u64;

    for chunk in customers.chunks(batch_size) {
        let mut tx = pool.begin().await?;

        for customer in chunk {
            sqlx::query(
                r#"
                INSERT INTO customer (customerid, email, custname, age, gender)
                VALUES ($1, $2, $3, $4, $5)
                ON CONFLICT (customerid) DO UPDATE SET
                    email = EXCLUDED.email,
                    custname = EXCLUDED.custname,
                    age = EXCLUDED.age,
                    gender = EXCLUDED.gender
                "#,
            )
            .bind(customer.customerid)
            .bind(&customer.email)
            .bind(&customer.custname)
            .bind(customer.age)
            .bind(&customer.gender)
            .execute(&mut *tx)
            .await?;

            written += 1;
        }

        tx.commit().await?;
        debug!("Committed chunk of {} customers", chunk.len());
    }

    info!(count = written, "Upserted customer batch");

    Ok(written)
}

// ============================================================================
// Email List
// ============================================================================

/// Upsert the emaillist batch (conflict key: listid)
pub async fn upsert_email_lists(
    pool: &PgPool,
    batch_size: usize,
    lists: &[EmailListRecord],
) -> Result<u64, Error> {
    let mut written = 0u64;

    for chunk in lists.chunks(batch_size) {
        let mut tx = pool.begin().await?;

        for list in chunk {
            sqlx::query(
                r#"
                INSERT INTO emaillist (listid, listtitle, createddate)
                VALUES ($1, $2, $3)
                ON CONFLICT (listid) DO UPDATE SET
                    listtitle = EXCLUDED.listtitle,
                    createddate = EXCLUDED.createddate
                "#,
            )
            .bind(list.listid)
            .bind(&list.listtitle)
            .bind(list.createddate)
            .execute(&mut *tx)
            .await?;

            written += 1;
        }

        tx.commit().await?;
        debug!("Committed chunk of {} email lists", chunk.len());
    }

    info!(count = written, "Upserted emaillist batch");

    Ok(written)
}

// ============================================================================
// Employee
// ============================================================================

/// Upsert the employee batch (conflict key: employeeid)
pub async fn upsert_employees(
    pool: &PgPool,
    batch_size: usize,
    employees: &[EmployeeRecord],
) -> Result<u64, Error> {
    let mut written = 0u64;

    for chunk in employees.chunks(batch_size) {
        let mut tx = pool.begin().await?;

        for employee in chunk {
            sqlx::query(
                r#"
                INSERT INTO employee (employeeid, empname, emptitle, tenure)
                VALUES ($1, $2, $3, $4)
                ON CONFLICT (employeeid) DO UPDATE SET
                    empname = EXCLUDED.empname,
                    emptitle = EXCLUDED.emptitle,
                    tenure = EXCLUDED.tenure
                "#,
            )
            .bind(employee.employeeid)
            .bind(&employee.empname)
            .bind(employee.emptitle.to_string())
            .bind(&employee.tenure)
            .execute(&mut *tx)
            .await?;

            written += 1;
        }

        tx.commit().await?;
        debug!("Committed chunk of {} employees", chunk.len());
    }

    info!(count = written, "Upserted employee batch");

    Ok(written)
}

// ============================================================================
// Purchase
// ============================================================================

/// Upsert the purchase batch (conflict key: purchaseid)
pub async fn upsert_purchases(
    pool: &PgPool,
    batch_size: usize,
    purchases: &[PurchaseRecord],
) -> Result<u64, Error> {
    let mut written = 0u64;

    for chunk in purchases.chunks(batch_size) {
        let mut tx = pool.begin().await?;

        for purchase in chunk {
            sqlx::query(
                r#"
                INSERT INTO purchase (
                    purchaseid, customerid, purchdate, quantity, category, amount, returned
                )
                VALUES ($1, $2, $3, $4, $5, $6, $7)
                ON CONFLICT (purchaseid) DO UPDATE SET
                    customerid = EXCLUDED.customerid,
                    purchdate = EXCLUDED.purchdate,
                    quantity = EXCLUDED.quantity,
                    category = EXCLUDED.category,
                    amount = EXCLUDED.amount,
                    returned = EXCLUDED.returned
                "#,
            )
            .bind(purchase.purchaseid)
            .bind(purchase.customerid)
            .bind(purchase.purchdate)
            .bind(purchase.quantity)
            .bind(&purchase.category)
            .bind(purchase.amount)
            .bind(purchase.returned)
            .execute(&mut *tx)
            .await?;

            written += 1;
        }

        tx.commit().await?;
        debug!("Committed chunk of {} purchases", chunk.len());
    }

    info!(count = written, "Upserted purchase batch");

    Ok(written)
}

// ============================================================================
// Customer Email List
// ============================================================================

/// Upsert the customeremaillist batch. The join table has no surrogate
/// key; conflicts are decided on the full row identity.
pub async fn upsert_subscriptions(
    pool: &PgPool,
    batch_size: usize,
    pairs: &[CustomerEmailListRecord],
) -> Result<u64, Error> {
    let mut written = 0u64;

    for chunk in pairs.chunks(batch_size) {
        let mut tx = pool.begin().await?;

        for pair in chunk {
            sqlx::query(
                r#"
                INSERT INTO customeremaillist (customerid, listid)
                VALUES ($1, $2)
                ON CONFLICT (customerid, listid) DO NOTHING
                "#,
            )
            .bind(pair.customerid)
            .bind(pair.listid)
            .execute(&mut *tx)
            .await?;

            written += 1;
        }

        tx.commit().await?;
        debug!("Committed chunk of {} subscriptions", chunk.len());
    }

    info!(count = written, "Upserted customeremaillist batch");

    Ok(written)
}

// ============================================================================
// Returns
// ============================================================================

/// Upsert the returns batch (conflict key: returnid)
pub async fn upsert_returns(
    pool: &PgPool,
    batch_size: usize,
    returns: &[ReturnRecord],
) -> Result<u64, Error> {
    let mut written = 0u64;

    for chunk in returns.chunks(batch_size) {
        let mut tx = pool.begin().await?;

        for ret in chunk {
            sqlx::query(
                r#"
                INSERT INTO returns (returnid, purchaseid, employeeid, returndate, csat_score)
                VALUES ($1, $2, $3, $4, $5)
                ON CONFLICT (returnid) DO UPDATE SET
                    purchaseid = EXCLUDED.purchaseid,
                    employeeid = EXCLUDED.employeeid,
                    returndate = EXCLUDED.returndate,
                    csat_score = EXCLUDED.csat_score
                "#,
            )
            .bind(ret.returnid)
            .bind(ret.purchaseid)
            .bind(ret.employeeid)
            .bind(ret.returndate)
            .bind(ret.csat_score)
            .execute(&mut *tx)
            .await?;

            written += 1;
        }

        tx.commit().await?;
        debug!("Committed chunk of {} returns", chunk.len());
    }

    info!(count = written, "Upserted returns batch");

    Ok(written)
}
