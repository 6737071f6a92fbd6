//! Entity type definitions
//!
//! The cache manages the following entity types:
//!
//! **Backend-owned:**
//! - [`Contact`] - People, optionally attached to a company
//! - [`Company`] - Organizations with industry/sector metadata
//! - [`Opportunity`] - Deals with status, priority and amount
//! - [`Activity`] - Calls, meetings and tasks scheduled against records
//! - [`Expense`] - Costs booked against an opportunity
//! - [`Competitor`] - Competing vendors tracked per deal
//! - [`Settings`] - Singleton per-user configuration document
//!
//! **Local-only:**
//! - [`Lead`] - Unqualified prospects, persisted client-side only

pub mod activity;
pub mod company;
pub mod competitor;
pub mod contact;
pub mod expense;
pub mod lead;
pub mod opportunity;
pub mod settings;

pub use activity::{Activity, ActivityStatus};
pub use company::Company;
pub use competitor::Competitor;
pub use contact::Contact;
pub use expense::Expense;
pub use lead::Lead;
pub use opportunity::{Opportunity, OpportunityStatus, Priority};
pub use settings::Settings;

use serde::{de::DeserializeOwned, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

/// Entity type discriminator, used by the gateway to pick REST paths
/// and by generic store plumbing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityKind {
    Contact,
    Company,
    Opportunity,
    Activity,
    Expense,
    Competitor,
    Lead,
    Settings,
}

impl EntityKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EntityKind::Contact => "contact",
            EntityKind::Company => "company",
            EntityKind::Opportunity => "opportunity",
            EntityKind::Activity => "activity",
            EntityKind::Expense => "expense",
            EntityKind::Competitor => "competitor",
            EntityKind::Lead => "lead",
            EntityKind::Settings => "settings",
        }
    }

    /// REST collection path segment for this kind
    pub fn path(&self) -> &'static str {
        match self {
            EntityKind::Contact => "contacts",
            EntityKind::Company => "companies",
            EntityKind::Opportunity => "opportunities",
            EntityKind::Activity => "activities",
            EntityKind::Expense => "expenses",
            EntityKind::Competitor => "competitors",
            EntityKind::Lead => "leads",
            EntityKind::Settings => "settings",
        }
    }

    /// Kinds the cache fetches from the backend
    pub fn remote() -> &'static [EntityKind] {
        &[
            EntityKind::Contact,
            EntityKind::Company,
            EntityKind::Opportunity,
            EntityKind::Activity,
            EntityKind::Expense,
            EntityKind::Competitor,
        ]
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for EntityKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "contact" | "contacts" => Ok(EntityKind::Contact),
            "company" | "companies" => Ok(EntityKind::Company),
            "opportunity" | "opportunities" | "opp" | "opps" => Ok(EntityKind::Opportunity),
            "activity" | "activities" => Ok(EntityKind::Activity),
            "expense" | "expenses" => Ok(EntityKind::Expense),
            "competitor" | "competitors" => Ok(EntityKind::Competitor),
            "lead" | "leads" => Ok(EntityKind::Lead),
            "settings" => Ok(EntityKind::Settings),
            _ => Err(format!("Unknown entity kind: {}", s)),
        }
    }
}

/// Borrowed views of the already-loaded lookup maps, used to attach
/// denormalized snapshots at ingestion time.
pub struct RefSources<'a> {
    pub companies: &'a HashMap<String, Company>,
    pub contacts: &'a HashMap<String, Contact>,
    pub opportunities: &'a HashMap<String, Opportunity>,
}

/// Common interface for cacheable records
pub trait Record: Clone + Serialize + DeserializeOwned + Send + Sync + 'static {
    const KIND: EntityKind;

    /// Stable identifier; empty string in drafts not yet acknowledged
    /// by the backend.
    fn id(&self) -> &str;

    /// Attach denormalized snapshots of referenced entities where the
    /// foreign key resolves against the given sources. Snapshots are
    /// point-in-time joins; a resolvable key overwrites any stale
    /// embedded value, an unresolvable key leaves it as-is.
    fn attach_refs(&mut self, _refs: &RefSources<'_>) {}
}
