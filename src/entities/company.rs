//! Company entity type

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{EntityKind, Record};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Company {
    #[serde(default)]
    pub id: String,

    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub industry: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub website: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sector: Option<String>,

    /// Branch location; the API also accepts the camelCase form
    #[serde(
        default,
        alias = "placeOfOffice",
        skip_serializing_if = "Option::is_none"
    )]
    pub place_of_office: Option<String>,

    #[serde(default, alias = "headOffice", skip_serializing_if = "Option::is_none")]
    pub head_office: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,

    /// Open-ended wire payload the cache carries through untouched
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl Record for Company {
    const KIND: EntityKind = EntityKind::Company;

    fn id(&self) -> &str {
        &self.id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn camelcase_aliases_decode() {
        let company: Company = serde_json::from_str(
            r#"{"id":"c1","name":"Acme","placeOfOffice":"New York","headOffice":"SF"}"#,
        )
        .unwrap();
        assert_eq!(company.place_of_office.as_deref(), Some("New York"));
        assert_eq!(company.head_office.as_deref(), Some("SF"));
    }

    #[test]
    fn unknown_wire_fields_survive_roundtrip() {
        let company: Company =
            serde_json::from_str(r#"{"id":"c1","name":"Acme","employee_count":40}"#).unwrap();
        let back = serde_json::to_value(&company).unwrap();
        assert_eq!(back["employee_count"], 40);
    }
}
