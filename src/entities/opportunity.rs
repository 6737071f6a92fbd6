//! Opportunity entity type - deals in the pipeline

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{Company, Contact, EntityKind, Record, RefSources};

/// Pipeline status. `closed_win` and `lost` are terminal; everything
/// else counts as active.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum OpportunityStatus {
    #[default]
    Prospect,
    Qualified,
    Proposal,
    Negotiation,
    ClosedWin,
    Lost,
}

impl OpportunityStatus {
    /// True unless the deal has reached a terminal state
    pub fn is_active(&self) -> bool {
        !matches!(self, OpportunityStatus::ClosedWin | OpportunityStatus::Lost)
    }
}

impl std::fmt::Display for OpportunityStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OpportunityStatus::Prospect => write!(f, "prospect"),
            OpportunityStatus::Qualified => write!(f, "qualified"),
            OpportunityStatus::Proposal => write!(f, "proposal"),
            OpportunityStatus::Negotiation => write!(f, "negotiation"),
            OpportunityStatus::ClosedWin => write!(f, "closed_win"),
            OpportunityStatus::Lost => write!(f, "lost"),
        }
    }
}

impl std::str::FromStr for OpportunityStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "prospect" => Ok(OpportunityStatus::Prospect),
            "qualified" => Ok(OpportunityStatus::Qualified),
            "proposal" => Ok(OpportunityStatus::Proposal),
            "negotiation" => Ok(OpportunityStatus::Negotiation),
            "closed_win" => Ok(OpportunityStatus::ClosedWin),
            "lost" => Ok(OpportunityStatus::Lost),
            _ => Err(format!("Unknown opportunity status: {}", s)),
        }
    }
}

/// Priority values
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Low,
    #[default]
    Medium,
    High,
}

impl std::fmt::Display for Priority {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Priority::Low => write!(f, "low"),
            Priority::Medium => write!(f, "medium"),
            Priority::High => write!(f, "high"),
        }
    }
}

impl std::str::FromStr for Priority {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "low" => Ok(Priority::Low),
            "medium" => Ok(Priority::Medium),
            "high" => Ok(Priority::High),
            _ => Err(format!("Unknown priority: {}", s)),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Opportunity {
    #[serde(default)]
    pub id: String,

    pub title: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub amount: Option<f64>,

    #[serde(default)]
    pub status: OpportunityStatus,

    #[serde(default)]
    pub priority: Priority,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expected_close_date: Option<DateTime<Utc>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub company_id: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contact_id: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub company: Option<Company>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contact: Option<Contact>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,

    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl Record for Opportunity {
    const KIND: EntityKind = EntityKind::Opportunity;

    fn id(&self) -> &str {
        &self.id
    }

    fn attach_refs(&mut self, refs: &RefSources<'_>) {
        if let Some(company_id) = &self.company_id {
            if let Some(company) = refs.companies.get(company_id) {
                self.company = Some(company.clone());
            }
        }
        if let Some(contact_id) = &self.contact_id {
            if let Some(contact) = refs.contacts.get(contact_id) {
                self.contact = Some(contact.clone());
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn terminal_statuses_are_not_active() {
        assert!(OpportunityStatus::Prospect.is_active());
        assert!(OpportunityStatus::Negotiation.is_active());
        assert!(!OpportunityStatus::ClosedWin.is_active());
        assert!(!OpportunityStatus::Lost.is_active());
    }

    #[test]
    fn status_serializes_snake_case() {
        let json = serde_json::to_string(&OpportunityStatus::ClosedWin).unwrap();
        assert_eq!(json, "\"closed_win\"");
        let back: OpportunityStatus = serde_json::from_str("\"lost\"").unwrap();
        assert_eq!(back, OpportunityStatus::Lost);
    }
}
