// Purchasing Export Integration Module
//
// This module ingests the flat, denormalized export of customer-service
// call and purchase records and rebuilds it as the normalized CDP schema:
// customer, emaillist, employee, purchase, customeremaillist, returns.
//
// Architecture:
// - Single-pass, in-memory transform: the whole export is read once and
//   held in source order for the duration of the run
// - Dense integer surrogate ids assigned in first-occurrence order
// - Idempotent destination writes: one ON CONFLICT upsert pass per table
//
// Data Flow:
// 1. Parse the CSV export into raw records (parser)
// 2. Canonicalize missing-value markers and derive per-row fields
//    (normalize): display name, synthesized email, timestamps, return flag
// 3. Extract entity tables, assign surrogate ids, publish natural-key
//    lookups, and resolve per-row references through them (extract)
// 4. Reduce duplicate customers to one representative per customerid
// 5. Upsert the six batches in dependency order (storage)

pub mod config;
pub mod extract;
pub mod models;
pub mod normalize;
pub mod parser;
pub mod pipeline;
pub mod storage;
