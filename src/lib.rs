//! crmkit: CRM client toolkit
//!
//! A client-side data layer for the CRM REST API: a typed entity cache
//! with derived counters, a relationship selector, a local-only lead
//! ledger, and a CSV bulk importer, plus the CLI that drives them.

pub mod cli;
pub mod core;
pub mod entities;
pub mod gateway;
pub mod store;
