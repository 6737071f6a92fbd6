//! Settings - singleton per-user configuration document

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{EntityKind, Record};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub id: String,

    #[serde(default)]
    pub user_name: String,

    #[serde(default)]
    pub user_email: String,

    /// Industry sectors offered in company forms
    #[serde(default)]
    pub sectors: Vec<String>,

    /// Activity types offered in activity forms
    #[serde(default)]
    pub activity_types: Vec<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,

    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl Default for Settings {
    /// Fallback presented when the backend settings fetch fails
    fn default() -> Self {
        Settings {
            id: "default".to_string(),
            user_name: "Demo User".to_string(),
            user_email: "demo@example.com".to_string(),
            sectors: [
                "Technology",
                "Healthcare",
                "Finance",
                "Manufacturing",
                "Energy",
                "Education",
                "Retail",
                "Media",
            ]
            .iter()
            .map(|s| s.to_string())
            .collect(),
            activity_types: ["Call", "Email", "Meeting", "Demo", "Proposal", "Follow-up"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            created_at: None,
            updated_at: None,
            extra: serde_json::Map::new(),
        }
    }
}

impl Record for Settings {
    const KIND: EntityKind = EntityKind::Settings;

    fn id(&self) -> &str {
        &self.id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_settings_carry_form_options() {
        let settings = Settings::default();
        assert_eq!(settings.id, "default");
        assert!(settings.sectors.contains(&"Technology".to_string()));
        assert!(settings.activity_types.contains(&"Call".to_string()));
    }
}
