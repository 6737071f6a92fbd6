//! Competitor entity type

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{EntityKind, Record};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Competitor {
    #[serde(default)]
    pub id: String,

    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub website: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub strengths: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weaknesses: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,

    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl Record for Competitor {
    const KIND: EntityKind = EntityKind::Competitor;

    fn id(&self) -> &str {
        &self.id
    }
}
