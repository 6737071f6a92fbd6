//! In-memory gateway for tests
//!
//! Emulates the wire contract faithfully: records are keyed by `_id`,
//! timestamps are ISO strings, and failure modes (transport errors,
//! duplicate envelopes, slow responses) are scriptable per call.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

use chrono::Utc;
use serde_json::{json, Value};

use crate::core::{DuplicateRecord, Result, StoreError};
use crate::entities::EntityKind;

use super::{wire, Backend};

#[derive(Default)]
struct MockState {
    records: HashMap<EntityKind, Vec<Value>>,
    settings: Option<Value>,
    list_calls: HashMap<EntityKind, usize>,
    fail_next_list: Option<String>,
    fail_next_create: Option<String>,
    duplicate_next_create: Option<DuplicateRecord>,
    related_delay: Option<Duration>,
    next_id: u64,
}

#[derive(Default)]
pub struct MockGateway {
    state: Mutex<MockState>,
}

impl MockGateway {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed raw wire records (keyed by `_id`) for a kind
    pub fn seed(&self, kind: EntityKind, records: Vec<Value>) {
        self.state.lock().unwrap().records.insert(kind, records);
    }

    pub fn seed_settings(&self, settings: Value) {
        self.state.lock().unwrap().settings = Some(settings);
    }

    /// How many times `list` was called for a kind
    pub fn list_calls(&self, kind: EntityKind) -> usize {
        *self
            .state
            .lock()
            .unwrap()
            .list_calls
            .get(&kind)
            .unwrap_or(&0)
    }

    /// Make the next `list` call fail with a transport error
    pub fn fail_next_list(&self, message: &str) {
        self.state.lock().unwrap().fail_next_list = Some(message.to_string());
    }

    /// Make the next `create` call fail with a transport error
    pub fn fail_next_create(&self, message: &str) {
        self.state.lock().unwrap().fail_next_create = Some(message.to_string());
    }

    /// Make the next `create` call report a duplicate conflict
    pub fn reject_next_create_as_duplicate(&self, existing: DuplicateRecord) {
        self.state.lock().unwrap().duplicate_next_create = Some(existing);
    }

    /// Delay the next `contacts_by_company` response (for in-flight
    /// overlap tests)
    pub fn delay_next_related(&self, delay: Duration) {
        self.state.lock().unwrap().related_delay = Some(delay);
    }

    fn record_matches(record: &Value, id: &str) -> bool {
        record.get("_id").and_then(Value::as_str) == Some(id)
            || record.get("id").and_then(Value::as_str) == Some(id)
    }
}

impl Backend for MockGateway {
    fn list(&self, kind: EntityKind) -> Result<Vec<Value>> {
        let mut state = self.state.lock().unwrap();
        *state.list_calls.entry(kind).or_insert(0) += 1;
        if let Some(message) = state.fail_next_list.take() {
            return Err(StoreError::Transport(message));
        }
        Ok(state.records.get(&kind).cloned().unwrap_or_default())
    }

    fn get(&self, kind: EntityKind, id: &str) -> Result<Value> {
        let state = self.state.lock().unwrap();
        state
            .records
            .get(&kind)
            .and_then(|records| records.iter().find(|r| Self::record_matches(r, id)))
            .cloned()
            .ok_or_else(|| StoreError::NotFound { id: id.to_string() })
    }

    fn create(&self, kind: EntityKind, input: Value) -> Result<Value> {
        let mut state = self.state.lock().unwrap();
        if let Some(message) = state.fail_next_create.take() {
            return Err(StoreError::Transport(message));
        }
        if let Some(existing) = state.duplicate_next_create.take() {
            return Err(StoreError::Duplicate { existing });
        }

        state.next_id += 1;
        let now = Utc::now().to_rfc3339();
        let mut record = json!({
            "_id": format!("mock-{}", state.next_id),
            "created_at": now,
            "updated_at": now,
        });
        wire::merge_shallow(&mut record, &input);
        // merge_shallow would let the input clobber _id; restore it
        if let Some(map) = record.as_object_mut() {
            map.insert("_id".to_string(), json!(format!("mock-{}", state.next_id)));
        }

        state.records.entry(kind).or_default().push(record.clone());
        Ok(record)
    }

    fn update(&self, kind: EntityKind, id: &str, partial: Value) -> Result<Value> {
        let mut state = self.state.lock().unwrap();
        let records = state.records.entry(kind).or_default();
        let record = records
            .iter_mut()
            .find(|r| Self::record_matches(r, id))
            .ok_or_else(|| StoreError::NotFound { id: id.to_string() })?;
        wire::merge_shallow(record, &partial);
        if let Some(map) = record.as_object_mut() {
            map.insert("updated_at".to_string(), json!(Utc::now().to_rfc3339()));
        }
        Ok(record.clone())
    }

    fn delete(&self, kind: EntityKind, id: &str) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        let records = state.records.entry(kind).or_default();
        let before = records.len();
        records.retain(|r| !Self::record_matches(r, id));
        if records.len() == before {
            return Err(StoreError::NotFound { id: id.to_string() });
        }
        Ok(())
    }

    fn contacts_by_company(&self, company_id: &str) -> Result<Vec<Value>> {
        let delay = self.state.lock().unwrap().related_delay.take();
        if let Some(delay) = delay {
            std::thread::sleep(delay);
        }

        let state = self.state.lock().unwrap();
        let contacts = state
            .records
            .get(&EntityKind::Contact)
            .cloned()
            .unwrap_or_default();
        Ok(contacts
            .into_iter()
            .filter(|record| match record.get("company_id") {
                Some(Value::String(id)) => id == company_id,
                Some(Value::Object(embedded)) => {
                    embedded.get("_id").and_then(Value::as_str) == Some(company_id)
                        || embedded.get("id").and_then(Value::as_str) == Some(company_id)
                }
                _ => false,
            })
            .collect())
    }

    fn import_batch(&self, kind: EntityKind, records: Vec<Value>) -> Result<Vec<Value>> {
        records
            .into_iter()
            .map(|record| self.create(kind, record))
            .collect()
    }

    fn settings(&self) -> Result<Value> {
        self.state
            .lock()
            .unwrap()
            .settings
            .clone()
            .ok_or_else(|| StoreError::Transport("settings unavailable".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_assigns_wire_id_and_timestamps() {
        let mock = MockGateway::new();
        let record = mock
            .create(EntityKind::Company, json!({"name": "Acme"}))
            .unwrap();
        assert_eq!(record["_id"], "mock-1");
        assert_eq!(record["name"], "Acme");
        assert!(record["created_at"].is_string());
    }

    #[test]
    fn delete_missing_reports_not_found() {
        let mock = MockGateway::new();
        let err = mock.delete(EntityKind::Contact, "nope").unwrap_err();
        assert!(err.is_not_found());
    }

    #[test]
    fn contacts_by_company_accepts_both_fk_forms() {
        let mock = MockGateway::new();
        mock.seed(
            EntityKind::Contact,
            vec![
                json!({"_id": "ct1", "first_name": "Ada", "company_id": "co1"}),
                json!({"_id": "ct2", "first_name": "Grace", "company_id": {"_id": "co1", "name": "Acme"}}),
                json!({"_id": "ct3", "first_name": "Edsger", "company_id": "co2"}),
            ],
        );
        let related = mock.contacts_by_company("co1").unwrap();
        assert_eq!(related.len(), 2);
    }

    #[test]
    fn list_counter_increments() {
        let mock = MockGateway::new();
        mock.list(EntityKind::Company).unwrap();
        mock.list(EntityKind::Company).unwrap();
        assert_eq!(mock.list_calls(EntityKind::Company), 2);
    }
}
