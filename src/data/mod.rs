//! Data layer: record types, loading, selections and aggregation.
//!
//! Architecture:
//! ```text
//!  data/{enrolments,naplan_results,recurrent_income}.{csv,parquet}
//!        │
//!        ▼
//!   ┌──────────┐
//!   │  loader   │  parse + validate columns → typed records
//!   └──────────┘
//!        │
//!        ▼
//!   ┌──────────────┐
//!   │ DatasetStore  │  three immutable tables, distinct values
//!   └──────────────┘
//!        │   FilterState
//!        ▼      │
//!   ┌──────────┐◄┘
//!   │ aggregate │  filter / group / mean → result rows
//!   └──────────┘
//! ```

pub mod aggregate;
pub mod filter;
pub mod loader;
pub mod model;
pub mod store;
