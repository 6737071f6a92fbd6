//! Ordered collection + id-indexed lookup map for one entity type
//!
//! Invariant: the vector and the map always contain exactly the same
//! id set. New records are prepended (newest-first); updates keep their
//! position; fetched collections preserve backend order.

use std::collections::HashMap;

use crate::entities::Record;

#[derive(Debug, Clone)]
pub struct Collection<T> {
    items: Vec<T>,
    by_id: HashMap<String, T>,
    /// Gates the once-per-session fetch; false also after a failed fetch
    /// so a later caller can retry.
    pub loaded: bool,
}

impl<T> Default for Collection<T> {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            by_id: HashMap::new(),
            loaded: false,
        }
    }
}

impl<T: Record> Collection<T> {
    /// Atomically replace both the ordered items and the lookup map
    pub fn replace_all(&mut self, items: Vec<T>) {
        self.by_id = items
            .iter()
            .map(|item| (item.id().to_string(), item.clone()))
            .collect();
        self.items = items;
    }

    /// Prepend a record (most-recent-first ordering)
    pub fn insert_head(&mut self, record: T) {
        self.by_id.insert(record.id().to_string(), record.clone());
        self.items.insert(0, record);
    }

    /// Replace the record with the same id in place, preserving its
    /// position. Returns false when the id is not present.
    pub fn replace(&mut self, record: T) -> bool {
        let Some(slot) = self.items.iter_mut().find(|item| item.id() == record.id()) else {
            return false;
        };
        self.by_id.insert(record.id().to_string(), record.clone());
        *slot = record;
        true
    }

    /// Remove by id from both structures; absent ids are a no-op
    pub fn remove(&mut self, id: &str) -> bool {
        let removed = self.by_id.remove(id).is_some();
        if removed {
            self.items.retain(|item| item.id() != id);
        }
        removed
    }

    pub fn get(&self, id: &str) -> Option<&T> {
        self.by_id.get(id)
    }

    pub fn items(&self) -> &[T] {
        &self.items
    }

    pub fn by_id(&self) -> &HashMap<String, T> {
        &self.by_id
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// True when the vector and the map hold the same id set
    pub fn ids_in_sync(&self) -> bool {
        self.items.len() == self.by_id.len()
            && self.items.iter().all(|item| self.by_id.contains_key(item.id()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::Company;

    fn company(id: &str, name: &str) -> Company {
        Company {
            id: id.to_string(),
            name: name.to_string(),
            ..Company::default()
        }
    }

    #[test]
    fn insert_head_prepends_and_indexes() {
        let mut col = Collection::default();
        col.insert_head(company("a", "First"));
        col.insert_head(company("b", "Second"));
        assert_eq!(col.items()[0].id, "b");
        assert_eq!(col.get("a").unwrap().name, "First");
        assert!(col.ids_in_sync());
    }

    #[test]
    fn replace_preserves_position() {
        let mut col = Collection::default();
        col.replace_all(vec![company("a", "A"), company("b", "B"), company("c", "C")]);
        assert!(col.replace(company("b", "B2")));
        assert_eq!(col.items()[1].name, "B2");
        assert_eq!(col.by_id().get("b").unwrap().name, "B2");
        assert!(!col.replace(company("zz", "missing")));
        assert!(col.ids_in_sync());
    }

    #[test]
    fn remove_is_idempotent() {
        let mut col = Collection::default();
        col.replace_all(vec![company("a", "A")]);
        assert!(col.remove("a"));
        assert!(!col.remove("a"));
        assert!(col.is_empty());
        assert!(col.ids_in_sync());
    }
}
