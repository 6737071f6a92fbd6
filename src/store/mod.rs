//! The client-side cache
//!
//! [`CrmStore`] is the single source of truth between the gateway and any
//! frontend (here, the CLI). It owns one [`Collection`] per backend entity
//! kind, the denormalized [`AggregateCounts`], the relationship selector
//! state, and the local-only lead ledger. All reads come from the cache;
//! every mutation goes through the gateway first and is applied to the
//! cache only from the gateway's canonical response.

pub mod aggregates;
pub mod collection;
pub mod import;
pub mod ledger;
pub mod local;
pub mod relations;

pub use aggregates::AggregateCounts;
pub use collection::Collection;
pub use import::{ImportSummary, RowFailure};
pub use ledger::LeadLedger;
pub use local::LocalStore;

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, RwLock};

use chrono::Utc;
use serde_json::Value;

use crate::core::{Config, Result};
use crate::entities::{
    Activity, Company, Competitor, Contact, Expense, Lead, Opportunity, Record, RefSources,
    Settings,
};
use crate::gateway::{wire, Backend};

/// Cooperative cancellation token for in-flight fetches. A fetch checked
/// against a cancelled flag returns without writing anything to the cache.
#[derive(Clone, Debug, Default)]
pub struct CancelFlag(Arc<AtomicBool>);

impl CancelFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Everything guarded by the store's single state lock
#[derive(Default)]
pub(crate) struct CacheState {
    pub contacts: Collection<Contact>,
    pub companies: Collection<Company>,
    pub opportunities: Collection<Opportunity>,
    pub activities: Collection<Activity>,
    pub expenses: Collection<Expense>,
    pub competitors: Collection<Competitor>,
    pub settings: Option<Settings>,
    pub counts: AggregateCounts,
    pub selected_company: Option<String>,
    pub selected_contact: Option<String>,
    pub related_contacts: Vec<Contact>,
    pub related_loading: bool,
}

impl CacheState {
    fn refs(&self) -> RefSources<'_> {
        RefSources {
            companies: self.companies.by_id(),
            contacts: self.contacts.by_id(),
            opportunities: self.opportunities.by_id(),
        }
    }

    /// Counters are always recomputed from scratch after a mutation,
    /// never adjusted incrementally.
    fn recompute(&mut self) {
        self.counts = aggregates::compute(
            self.contacts.items(),
            self.companies.items(),
            self.opportunities.items(),
            self.activities.items(),
            self.expenses.items(),
            Utc::now().date_naive(),
        );
    }
}

fn decode_one<T: Record>(mut value: Value, refs: &RefSources<'_>) -> Result<T> {
    wire::normalize_record(&mut value);
    let mut record: T = serde_json::from_value(value)?;
    record.attach_refs(refs);
    Ok(record)
}

fn decode_records<T: Record>(wire: Vec<Value>, refs: &RefSources<'_>) -> Result<Vec<T>> {
    wire.into_iter().map(|v| decode_one(v, refs)).collect()
}

type Proj<T> = fn(&mut CacheState) -> &mut Collection<T>;

pub struct CrmStore {
    backend: Arc<dyn Backend>,
    state: RwLock<CacheState>,
    local: LocalStore,
    ledger: Mutex<LeadLedger>,
    /// Monotonic token for related-contact loads; a finishing load whose
    /// token is no longer current discards its result.
    related_generation: AtomicU64,
    id_locks: Mutex<HashMap<String, Arc<Mutex<()>>>>,
}

impl CrmStore {
    pub fn new(backend: Arc<dyn Backend>, local: LocalStore) -> Result<Self> {
        let ledger = LeadLedger::load(&local)?;
        Ok(Self {
            backend,
            state: RwLock::new(CacheState::default()),
            local,
            ledger: Mutex::new(ledger),
            related_generation: AtomicU64::new(0),
            id_locks: Mutex::new(HashMap::new()),
        })
    }

    pub fn open(backend: Arc<dyn Backend>, config: &Config) -> Result<Self> {
        let local = LocalStore::open(&config.local_db_path())?;
        Self::new(backend, local)
    }

    /// Serializes mutations racing on the same record id
    fn id_lock(&self, id: &str) -> Arc<Mutex<()>> {
        let mut locks = self.id_locks.lock().unwrap();
        locks.entry(id.to_string()).or_default().clone()
    }

    // --- generic plumbing ---

    fn fetch_collection<T: Record>(
        &self,
        proj: Proj<T>,
        force: bool,
        cancel: &CancelFlag,
    ) -> Result<()> {
        {
            let mut state = self.state.write().unwrap();
            let col = proj(&mut state);
            if col.loaded {
                if !force {
                    return Ok(());
                }
                // Mark stale for the duration of the refresh; a failed
                // refresh leaves the flag down so the next fetch retries.
                col.loaded = false;
            }
        }
        let wire = self.backend.list(T::KIND)?;
        if cancel.is_cancelled() {
            return Ok(());
        }
        let mut state = self.state.write().unwrap();
        let records = decode_records::<T>(wire, &state.refs())?;
        let col = proj(&mut state);
        col.replace_all(records);
        col.loaded = true;
        state.recompute();
        Ok(())
    }

    fn add_record<T: Record>(&self, proj: Proj<T>, input: &T) -> Result<T> {
        let mut payload = serde_json::to_value(input)?;
        wire::strip_server_fields(&mut payload);
        let created = self.backend.create(T::KIND, payload)?;
        let mut state = self.state.write().unwrap();
        let record: T = decode_one(created, &state.refs())?;
        proj(&mut state).insert_head(record.clone());
        state.recompute();
        Ok(record)
    }

    fn update_record<T: Record>(&self, proj: Proj<T>, id: &str, patch: Value) -> Result<T> {
        let lock = self.id_lock(id);
        let _guard = lock.lock().unwrap();
        let mut payload = patch;
        wire::strip_server_fields(&mut payload);
        let updated = self.backend.update(T::KIND, id, payload)?;
        let mut state = self.state.write().unwrap();
        let record: T = decode_one(updated, &state.refs())?;
        // An id the cache never held stays out; the canonical record is
        // still returned to the caller.
        proj(&mut state).replace(record.clone());
        state.recompute();
        Ok(record)
    }

    fn remove_record<T: Record>(&self, proj: Proj<T>, id: &str) -> Result<()> {
        let lock = self.id_lock(id);
        let guard = lock.lock().unwrap();
        match self.backend.delete(T::KIND, id) {
            Ok(()) => {}
            // The backend already forgot the id; the end state is the
            // same either way, so removal stays idempotent.
            Err(err) if err.is_not_found() => {}
            Err(err) => return Err(err),
        }
        {
            let mut state = self.state.write().unwrap();
            proj(&mut state).remove(id);
            state.recompute();
        }
        drop(guard);
        // Prune the lock entry once nobody else holds it, or the table
        // would grow with every id ever mutated.
        let mut locks = self.id_locks.lock().unwrap();
        if let Some(entry) = locks.get(id) {
            if Arc::strong_count(entry) == 2 {
                locks.remove(id);
            }
        }
        Ok(())
    }

    // --- per-kind operations ---

    pub fn fetch_contacts(&self, cancel: &CancelFlag) -> Result<()> {
        self.fetch_collection(|s| &mut s.contacts, false, cancel)
    }

    pub fn refresh_contacts(&self, cancel: &CancelFlag) -> Result<()> {
        self.fetch_collection(|s| &mut s.contacts, true, cancel)
    }

    pub fn add_contact(&self, contact: &Contact) -> Result<Contact> {
        self.add_record(|s| &mut s.contacts, contact)
    }

    pub fn update_contact(&self, id: &str, patch: Value) -> Result<Contact> {
        self.update_record(|s| &mut s.contacts, id, patch)
    }

    pub fn remove_contact(&self, id: &str) -> Result<()> {
        self.remove_record::<Contact>(|s| &mut s.contacts, id)
    }

    pub fn fetch_companies(&self, cancel: &CancelFlag) -> Result<()> {
        self.fetch_collection(|s| &mut s.companies, false, cancel)
    }

    pub fn refresh_companies(&self, cancel: &CancelFlag) -> Result<()> {
        self.fetch_collection(|s| &mut s.companies, true, cancel)
    }

    pub fn add_company(&self, company: &Company) -> Result<Company> {
        self.add_record(|s| &mut s.companies, company)
    }

    pub fn update_company(&self, id: &str, patch: Value) -> Result<Company> {
        self.update_record(|s| &mut s.companies, id, patch)
    }

    pub fn remove_company(&self, id: &str) -> Result<()> {
        self.remove_record::<Company>(|s| &mut s.companies, id)
    }

    pub fn fetch_opportunities(&self, cancel: &CancelFlag) -> Result<()> {
        self.fetch_collection(|s| &mut s.opportunities, false, cancel)
    }

    pub fn refresh_opportunities(&self, cancel: &CancelFlag) -> Result<()> {
        self.fetch_collection(|s| &mut s.opportunities, true, cancel)
    }

    pub fn add_opportunity(&self, opp: &Opportunity) -> Result<Opportunity> {
        self.add_record(|s| &mut s.opportunities, opp)
    }

    pub fn update_opportunity(&self, id: &str, patch: Value) -> Result<Opportunity> {
        self.update_record(|s| &mut s.opportunities, id, patch)
    }

    pub fn remove_opportunity(&self, id: &str) -> Result<()> {
        self.remove_record::<Opportunity>(|s| &mut s.opportunities, id)
    }

    pub fn fetch_activities(&self, cancel: &CancelFlag) -> Result<()> {
        self.fetch_collection(|s| &mut s.activities, false, cancel)
    }

    pub fn refresh_activities(&self, cancel: &CancelFlag) -> Result<()> {
        self.fetch_collection(|s| &mut s.activities, true, cancel)
    }

    pub fn add_activity(&self, activity: &Activity) -> Result<Activity> {
        self.add_record(|s| &mut s.activities, activity)
    }

    pub fn update_activity(&self, id: &str, patch: Value) -> Result<Activity> {
        self.update_record(|s| &mut s.activities, id, patch)
    }

    pub fn remove_activity(&self, id: &str) -> Result<()> {
        self.remove_record::<Activity>(|s| &mut s.activities, id)
    }

    pub fn fetch_expenses(&self, cancel: &CancelFlag) -> Result<()> {
        self.fetch_collection(|s| &mut s.expenses, false, cancel)
    }

    pub fn refresh_expenses(&self, cancel: &CancelFlag) -> Result<()> {
        self.fetch_collection(|s| &mut s.expenses, true, cancel)
    }

    pub fn add_expense(&self, expense: &Expense) -> Result<Expense> {
        self.add_record(|s| &mut s.expenses, expense)
    }

    pub fn update_expense(&self, id: &str, patch: Value) -> Result<Expense> {
        self.update_record(|s| &mut s.expenses, id, patch)
    }

    pub fn remove_expense(&self, id: &str) -> Result<()> {
        self.remove_record::<Expense>(|s| &mut s.expenses, id)
    }

    pub fn fetch_competitors(&self, cancel: &CancelFlag) -> Result<()> {
        self.fetch_collection(|s| &mut s.competitors, false, cancel)
    }

    pub fn refresh_competitors(&self, cancel: &CancelFlag) -> Result<()> {
        self.fetch_collection(|s| &mut s.competitors, true, cancel)
    }

    pub fn add_competitor(&self, competitor: &Competitor) -> Result<Competitor> {
        self.add_record(|s| &mut s.competitors, competitor)
    }

    pub fn update_competitor(&self, id: &str, patch: Value) -> Result<Competitor> {
        self.update_record(|s| &mut s.competitors, id, patch)
    }

    pub fn remove_competitor(&self, id: &str) -> Result<()> {
        self.remove_record::<Competitor>(|s| &mut s.competitors, id)
    }

    /// Fetch every backend collection the dashboard needs. Referenced
    /// collections load before their referrers so snapshots attach at
    /// ingestion: companies before contacts, both before opportunities,
    /// and so on down the FK chain.
    pub fn fetch_all(&self, cancel: &CancelFlag) -> Result<()> {
        self.fetch_companies(cancel)?;
        self.fetch_contacts(cancel)?;
        self.fetch_opportunities(cancel)?;
        self.fetch_activities(cancel)?;
        self.fetch_expenses(cancel)?;
        self.fetch_competitors(cancel)
    }

    // --- settings ---

    /// Cached settings, fetching once per session. A gateway failure
    /// falls back to the built-in defaults so the UI always has sectors
    /// and activity types to offer.
    pub fn fetch_settings(&self, force: bool) -> Result<Settings> {
        if !force {
            if let Some(settings) = self.state.read().unwrap().settings.clone() {
                return Ok(settings);
            }
        }
        let settings = match self.backend.settings() {
            Ok(mut value) => {
                wire::normalize_record(&mut value);
                serde_json::from_value(value)?
            }
            Err(_) => Settings::default(),
        };
        self.state.write().unwrap().settings = Some(settings.clone());
        Ok(settings)
    }

    /// Merge a patch into the cached settings. Settings writes stay
    /// local; the singleton document is read-only on the wire.
    pub fn update_settings(&self, patch: Value) -> Result<Settings> {
        let current = self.fetch_settings(false)?;
        let mut payload = patch;
        wire::strip_server_fields(&mut payload);
        let mut merged = serde_json::to_value(&current)?;
        wire::merge_shallow(&mut merged, &payload);
        let mut settings: Settings = serde_json::from_value(merged)?;
        settings.updated_at = Some(Utc::now());
        self.state.write().unwrap().settings = Some(settings.clone());
        Ok(settings)
    }

    // --- lead ledger ---

    pub fn leads(&self) -> Vec<Lead> {
        self.ledger.lock().unwrap().leads().to_vec()
    }

    pub fn lead(&self, id: &str) -> Option<Lead> {
        self.ledger.lock().unwrap().get(id).cloned()
    }

    pub fn add_lead(&self, lead: Lead) -> Result<Lead> {
        self.ledger.lock().unwrap().add(&self.local, lead)
    }

    pub fn update_lead(&self, id: &str, patch: &Value) -> Result<Lead> {
        self.ledger.lock().unwrap().update(&self.local, id, patch)
    }

    /// Remove a lead, reporting whether anything matched
    pub fn remove_lead(&self, id: &str) -> Result<bool> {
        self.ledger.lock().unwrap().remove(&self.local, id)
    }

    // --- read accessors ---

    pub fn contacts(&self) -> Vec<Contact> {
        self.state.read().unwrap().contacts.items().to_vec()
    }

    pub fn contact(&self, id: &str) -> Option<Contact> {
        self.state.read().unwrap().contacts.get(id).cloned()
    }

    pub fn companies(&self) -> Vec<Company> {
        self.state.read().unwrap().companies.items().to_vec()
    }

    pub fn company(&self, id: &str) -> Option<Company> {
        self.state.read().unwrap().companies.get(id).cloned()
    }

    pub fn opportunities(&self) -> Vec<Opportunity> {
        self.state.read().unwrap().opportunities.items().to_vec()
    }

    pub fn opportunity(&self, id: &str) -> Option<Opportunity> {
        self.state.read().unwrap().opportunities.get(id).cloned()
    }

    pub fn activities(&self) -> Vec<Activity> {
        self.state.read().unwrap().activities.items().to_vec()
    }

    pub fn activity(&self, id: &str) -> Option<Activity> {
        self.state.read().unwrap().activities.get(id).cloned()
    }

    pub fn expenses(&self) -> Vec<Expense> {
        self.state.read().unwrap().expenses.items().to_vec()
    }

    pub fn competitors(&self) -> Vec<Competitor> {
        self.state.read().unwrap().competitors.items().to_vec()
    }

    pub fn counts(&self) -> AggregateCounts {
        self.state.read().unwrap().counts.clone()
    }

    pub fn contacts_loaded(&self) -> bool {
        self.state.read().unwrap().contacts.loaded
    }

    pub fn companies_loaded(&self) -> bool {
        self.state.read().unwrap().companies.loaded
    }

    pub fn opportunities_loaded(&self) -> bool {
        self.state.read().unwrap().opportunities.loaded
    }
}
