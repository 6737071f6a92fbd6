//! Command implementations

pub mod activity;
pub mod company;
pub mod competitor;
pub mod completions;
pub mod contact;
pub mod expense;
pub mod import;
pub mod lead;
pub mod opp;
pub mod stats;
