//! Store error taxonomy shared by the gateway and the cache

use thiserror::Error;

/// Summary fields of a pre-existing record reported by a duplicate-create
/// envelope. Enough for the caller to render a "use existing" prompt.
#[derive(Debug, Clone, Default, serde::Serialize, serde::Deserialize)]
pub struct DuplicateRecord {
    #[serde(default, alias = "_id")]
    pub id: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub website: Option<String>,
}

impl DuplicateRecord {
    /// One-line summary for messages and prompts
    pub fn summary(&self) -> String {
        let mut s = self.name.clone().unwrap_or_else(|| "<unnamed>".to_string());
        if let Some(email) = &self.email {
            s.push_str(&format!(" ({})", email));
        }
        if let Some(phone) = &self.phone {
            s.push_str(&format!(" ({})", phone));
        }
        if let Some(website) = &self.website {
            s.push_str(&format!(" ({})", website));
        }
        s
    }
}

/// Errors surfaced by store operations
#[derive(Debug, Error)]
pub enum StoreError {
    /// Gateway unreachable, or a non-success envelope without a
    /// recognized structured reason
    #[error("gateway error: {0}")]
    Transport(String),

    /// A create was rejected because a conflicting record already exists
    #[error("record already exists: {}", existing.summary())]
    Duplicate { existing: DuplicateRecord },

    /// An update/delete targeted an id the backend no longer recognizes
    #[error("no record with id '{id}'")]
    NotFound { id: String },

    /// A row failed local format checks before reaching the gateway
    #[error("validation failed: {0}")]
    Validation(String),

    #[error("local store error: {0}")]
    Storage(#[from] rusqlite::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),

    #[error("malformed record: {0}")]
    Decode(#[from] serde_json::Error),
}

impl StoreError {
    pub fn is_duplicate(&self) -> bool {
        matches!(self, StoreError::Duplicate { .. })
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, StoreError::NotFound { .. })
    }
}

pub type Result<T> = std::result::Result<T, StoreError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn duplicate_summary_includes_contact_fields() {
        let dup = DuplicateRecord {
            id: Some("64f0".to_string()),
            name: Some("Acme Corp".to_string()),
            email: Some("info@acme.example.com".to_string()),
            phone: None,
            website: Some("https://acme.example.com".to_string()),
        };
        assert_eq!(
            dup.summary(),
            "Acme Corp (info@acme.example.com) (https://acme.example.com)"
        );
    }

    #[test]
    fn duplicate_record_accepts_wire_id() {
        let dup: DuplicateRecord =
            serde_json::from_str(r#"{"_id":"64f0","name":"Acme"}"#).unwrap();
        assert_eq!(dup.id.as_deref(), Some("64f0"));
    }
}
