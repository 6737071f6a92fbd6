//! Local-only lead ledger
//!
//! Leads never touch the backend. The ledger holds the full list in memory
//! and rewrites the entire array to [`LocalStore`] on every mutation, then
//! reloads from storage so the in-memory view always reflects what was
//! actually persisted.

use chrono::Utc;
use serde_json::Value;

use crate::core::{local_id, Result, StoreError};
use crate::entities::Lead;
use crate::store::local::{LocalStore, LEADS_KEY};

pub struct LeadLedger {
    leads: Vec<Lead>,
}

impl LeadLedger {
    /// Load the ledger from storage. A missing or malformed key yields an
    /// empty ledger rather than an error; a corrupt payload is not worth
    /// refusing to start over.
    pub fn load(store: &LocalStore) -> Result<Self> {
        let leads = match store.get(LEADS_KEY)? {
            Some(raw) => serde_json::from_str(&raw).unwrap_or_default(),
            None => Vec::new(),
        };
        Ok(Self { leads })
    }

    pub fn leads(&self) -> &[Lead] {
        &self.leads
    }

    pub fn get(&self, id: &str) -> Option<&Lead> {
        self.leads.iter().find(|l| l.id == id)
    }

    /// Append a lead, assigning a fresh client-side id and timestamps
    pub fn add(&mut self, store: &LocalStore, mut lead: Lead) -> Result<Lead> {
        let now = Utc::now();
        lead.id = local_id();
        lead.created_at = Some(now);
        lead.updated_at = Some(now);
        self.leads.push(lead.clone());
        self.persist(store)?;
        Ok(lead)
    }

    /// Merge the given patch fields into the lead with this id and
    /// refresh its updated_at
    pub fn update(&mut self, store: &LocalStore, id: &str, patch: &Value) -> Result<Lead> {
        let pos = self
            .leads
            .iter()
            .position(|l| l.id == id)
            .ok_or_else(|| StoreError::NotFound { id: id.to_string() })?;
        let mut merged = serde_json::to_value(&self.leads[pos])?;
        if let (Value::Object(base), Value::Object(fields)) = (&mut merged, patch) {
            for (k, v) in fields {
                base.insert(k.clone(), v.clone());
            }
        }
        let mut updated: Lead = serde_json::from_value(merged)?;
        updated.updated_at = Some(Utc::now());
        self.leads[pos] = updated.clone();
        self.persist(store)?;
        Ok(updated)
    }

    /// Remove a lead, reporting whether anything matched. Removing an
    /// absent id is a no-op.
    pub fn remove(&mut self, store: &LocalStore, id: &str) -> Result<bool> {
        let before = self.leads.len();
        self.leads.retain(|l| l.id != id);
        let removed = self.leads.len() != before;
        if removed {
            self.persist(store)?;
        }
        Ok(removed)
    }

    /// Write the whole array, then read it back to confirm the durable copy
    fn persist(&mut self, store: &LocalStore) -> Result<()> {
        store.put(LEADS_KEY, &serde_json::to_string(&self.leads)?)?;
        if let Some(raw) = store.get(LEADS_KEY)? {
            self.leads = serde_json::from_str(&raw)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn lead(name: &str) -> Lead {
        Lead {
            name: name.to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn add_assigns_id_and_appends() {
        let store = LocalStore::open_in_memory().unwrap();
        let mut ledger = LeadLedger::load(&store).unwrap();
        let a = ledger.add(&store, lead("Ada")).unwrap();
        let b = ledger.add(&store, lead("Bob")).unwrap();
        assert_eq!(a.id.len(), 26);
        assert_ne!(a.id, b.id);
        assert!(a.created_at.is_some());
        assert_eq!(a.updated_at, a.created_at);
        let names: Vec<_> = ledger.leads().iter().map(|l| l.name.as_str()).collect();
        assert_eq!(names, ["Ada", "Bob"]);
    }

    #[test]
    fn survives_reload() {
        let store = LocalStore::open_in_memory().unwrap();
        let mut ledger = LeadLedger::load(&store).unwrap();
        let added = ledger.add(&store, lead("Ada")).unwrap();

        let reloaded = LeadLedger::load(&store).unwrap();
        assert_eq!(reloaded.leads().len(), 1);
        assert_eq!(reloaded.leads()[0].id, added.id);
        assert_eq!(reloaded.leads()[0].name, "Ada");
    }

    #[test]
    fn update_merges_patch() {
        let store = LocalStore::open_in_memory().unwrap();
        let mut ledger = LeadLedger::load(&store).unwrap();
        let added = ledger.add(&store, lead("Ada")).unwrap();

        let updated = ledger
            .update(&store, &added.id, &json!({"email": "ada@example.com"}))
            .unwrap();
        assert_eq!(updated.email.as_deref(), Some("ada@example.com"));
        assert_eq!(updated.name, "Ada");
        assert_eq!(updated.created_at, added.created_at);
        assert!(updated.updated_at.unwrap() >= added.updated_at.unwrap());

        let err = ledger.update(&store, "missing", &json!({})).unwrap_err();
        assert!(err.is_not_found());
    }

    #[test]
    fn remove_is_idempotent() {
        let store = LocalStore::open_in_memory().unwrap();
        let mut ledger = LeadLedger::load(&store).unwrap();
        let added = ledger.add(&store, lead("Ada")).unwrap();
        assert!(ledger.remove(&store, &added.id).unwrap());
        assert!(!ledger.remove(&store, &added.id).unwrap());
        assert!(ledger.leads().is_empty());
    }
}
