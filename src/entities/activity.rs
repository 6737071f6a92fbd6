//! Activity entity type - calls, meetings and tasks

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{Company, Contact, EntityKind, Opportunity, Record, RefSources};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ActivityStatus {
    #[default]
    Scheduled,
    Completed,
    Cancelled,
}

impl std::fmt::Display for ActivityStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ActivityStatus::Scheduled => write!(f, "scheduled"),
            ActivityStatus::Completed => write!(f, "completed"),
            ActivityStatus::Cancelled => write!(f, "cancelled"),
        }
    }
}

impl std::str::FromStr for ActivityStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "scheduled" => Ok(ActivityStatus::Scheduled),
            "completed" => Ok(ActivityStatus::Completed),
            "cancelled" => Ok(ActivityStatus::Cancelled),
            _ => Err(format!("Unknown activity status: {}", s)),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Activity {
    #[serde(default)]
    pub id: String,

    pub title: String,

    /// Free-form type from settings (Call, Email, Meeting, ...)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub activity_type: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_time: Option<DateTime<Utc>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_time: Option<DateTime<Utc>>,

    #[serde(default)]
    pub status: ActivityStatus,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contact_id: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub company_id: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub opportunity_id: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contact: Option<Contact>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub company: Option<Company>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub opportunity: Option<Opportunity>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,

    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl Activity {
    /// True when the activity starts on the given UTC date
    pub fn starts_on(&self, date: chrono::NaiveDate) -> bool {
        self.start_time
            .map(|t| t.date_naive() == date)
            .unwrap_or(false)
    }
}

impl Record for Activity {
    const KIND: EntityKind = EntityKind::Activity;

    fn id(&self) -> &str {
        &self.id
    }

    fn attach_refs(&mut self, refs: &RefSources<'_>) {
        if let Some(contact_id) = &self.contact_id {
            if let Some(contact) = refs.contacts.get(contact_id) {
                self.contact = Some(contact.clone());
            }
        }
        if let Some(company_id) = &self.company_id {
            if let Some(company) = refs.companies.get(company_id) {
                self.company = Some(company.clone());
            }
        }
        if let Some(opportunity_id) = &self.opportunity_id {
            if let Some(opportunity) = refs.opportunities.get(opportunity_id) {
                self.opportunity = Some(opportunity.clone());
            }
        }
    }
}
