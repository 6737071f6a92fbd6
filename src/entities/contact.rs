//! Contact entity type

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{Company, EntityKind, Record, RefSources};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Contact {
    #[serde(default)]
    pub id: String,

    #[serde(default)]
    pub first_name: String,

    #[serde(default)]
    pub last_name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub company_id: Option<String>,

    /// Denormalized snapshot of the referenced company at the time it
    /// was attached. Not kept in sync; see the store's refresh_relations.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub company: Option<Company>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,

    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl Contact {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
            .trim()
            .to_string()
    }
}

impl Record for Contact {
    const KIND: EntityKind = EntityKind::Contact;

    fn id(&self) -> &str {
        &self.id
    }

    fn attach_refs(&mut self, refs: &RefSources<'_>) {
        if let Some(company_id) = &self.company_id {
            if let Some(company) = refs.companies.get(company_id) {
                self.company = Some(company.clone());
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn attach_refs_resolves_loaded_company() {
        let mut companies = HashMap::new();
        companies.insert(
            "co1".to_string(),
            Company {
                id: "co1".to_string(),
                name: "Acme".to_string(),
                ..Company::default()
            },
        );
        let contacts = HashMap::new();
        let opportunities = HashMap::new();
        let refs = RefSources {
            companies: &companies,
            contacts: &contacts,
            opportunities: &opportunities,
        };

        let mut contact = Contact {
            id: "ct1".to_string(),
            company_id: Some("co1".to_string()),
            ..Contact::default()
        };
        contact.attach_refs(&refs);
        assert_eq!(contact.company.as_ref().unwrap().name, "Acme");

        let mut orphan = Contact {
            id: "ct2".to_string(),
            company_id: Some("co-missing".to_string()),
            ..Contact::default()
        };
        orphan.attach_refs(&refs);
        assert!(orphan.company.is_none());
    }
}
