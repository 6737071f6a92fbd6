//! Backend gateway - the request/response contract with the CRM API
//!
//! The store talks to an abstract [`Backend`] trait working in raw
//! `serde_json::Value` records; typed decoding happens in the cache
//! after [`wire`] normalization. Adapters: [`http::HttpGateway`] for the
//! REST API and [`mock::MockGateway`] for tests.

pub mod http;
pub mod mock;
pub mod wire;

pub use http::HttpGateway;
pub use mock::MockGateway;

use serde_json::Value;

use crate::core::Result;
use crate::entities::EntityKind;

/// CRUD plus the two specialized queries the UI needs. All methods are
/// blocking; timeout/retry policy belongs to the adapter, not the cache.
pub trait Backend: Send + Sync {
    fn list(&self, kind: EntityKind) -> Result<Vec<Value>>;

    fn get(&self, kind: EntityKind, id: &str) -> Result<Value>;

    fn create(&self, kind: EntityKind, input: Value) -> Result<Value>;

    fn update(&self, kind: EntityKind, id: &str, partial: Value) -> Result<Value>;

    fn delete(&self, kind: EntityKind, id: &str) -> Result<()>;

    /// Targeted query backing the relationship selector
    fn contacts_by_company(&self, company_id: &str) -> Result<Vec<Value>>;

    /// Bulk-create endpoint; returns the canonical created records
    fn import_batch(&self, kind: EntityKind, records: Vec<Value>) -> Result<Vec<Value>>;

    /// The singleton settings document
    fn settings(&self) -> Result<Value>;
}
