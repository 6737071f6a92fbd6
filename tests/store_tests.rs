//! Integration tests for the cache against the mock gateway
//!
//! These exercise the store contract end-to-end: fetch gating, head
//! insertion, counter recomputation, denormalization, the lead ledger,
//! the import pipeline, and the in-flight overlap behaviors of the
//! relationship selector.

use std::sync::Arc;
use std::thread;
use std::time::Duration;

use chrono::Utc;
use serde_json::json;

use crmkit::core::DuplicateRecord;
use crmkit::entities::{
    Contact, EntityKind, Opportunity, OpportunityStatus, Priority,
};
use crmkit::gateway::MockGateway;
use crmkit::store::import::ImportRow;
use crmkit::store::{CancelFlag, CrmStore, LocalStore};

fn store_with(mock: &Arc<MockGateway>) -> CrmStore {
    CrmStore::new(mock.clone(), LocalStore::open_in_memory().unwrap()).unwrap()
}

#[test]
fn fetch_runs_once_per_session_and_refresh_forces() {
    let mock = Arc::new(MockGateway::new());
    mock.seed(
        EntityKind::Company,
        vec![json!({"_id": "co1", "name": "Acme"})],
    );
    let store = store_with(&mock);
    let cancel = CancelFlag::new();

    store.fetch_companies(&cancel).unwrap();
    store.fetch_companies(&cancel).unwrap();
    store.fetch_companies(&cancel).unwrap();
    assert_eq!(mock.list_calls(EntityKind::Company), 1);
    assert!(store.companies_loaded());
    assert_eq!(store.companies().len(), 1);

    store.refresh_companies(&cancel).unwrap();
    assert_eq!(mock.list_calls(EntityKind::Company), 2);
}

#[test]
fn failed_fetch_leaves_collection_untouched_and_retryable() {
    let mock = Arc::new(MockGateway::new());
    mock.seed(
        EntityKind::Company,
        vec![json!({"_id": "co1", "name": "Acme"})],
    );
    let store = store_with(&mock);
    let cancel = CancelFlag::new();

    mock.fail_next_list("connection refused");
    assert!(store.fetch_companies(&cancel).is_err());
    assert!(!store.companies_loaded());
    assert!(store.companies().is_empty());

    // Next attempt goes back to the gateway and succeeds
    store.fetch_companies(&cancel).unwrap();
    assert!(store.companies_loaded());
    assert_eq!(store.companies().len(), 1);
    assert_eq!(mock.list_calls(EntityKind::Company), 2);
}

#[test]
fn cancelled_fetch_writes_nothing() {
    let mock = Arc::new(MockGateway::new());
    mock.seed(
        EntityKind::Contact,
        vec![json!({"_id": "ct1", "first_name": "Ada", "last_name": "L"})],
    );
    let store = store_with(&mock);

    let cancel = CancelFlag::new();
    cancel.cancel();
    store.fetch_contacts(&cancel).unwrap();

    assert_eq!(mock.list_calls(EntityKind::Contact), 1);
    assert!(!store.contacts_loaded());
    assert!(store.contacts().is_empty());
}

#[test]
fn add_prepends_and_recomputes_counters() {
    let mock = Arc::new(MockGateway::new());
    let store = store_with(&mock);
    let cancel = CancelFlag::new();
    store.fetch_opportunities(&cancel).unwrap();

    let first = store
        .add_opportunity(&Opportunity {
            title: "First deal".into(),
            amount: Some(100.0),
            status: OpportunityStatus::Prospect,
            priority: Priority::High,
            ..Default::default()
        })
        .unwrap();
    let second = store
        .add_opportunity(&Opportunity {
            title: "Won deal".into(),
            amount: Some(500.0),
            status: OpportunityStatus::ClosedWin,
            ..Default::default()
        })
        .unwrap();

    // Newest first
    let titles: Vec<String> = store.opportunities().iter().map(|o| o.title.clone()).collect();
    assert_eq!(titles, ["Won deal", "First deal"]);
    assert!(!first.id.is_empty());
    assert_ne!(first.id, second.id);

    let counts = store.counts();
    assert_eq!(counts.opportunities, 2);
    assert_eq!(counts.active_opportunities, 1);
    assert_eq!(counts.high_priority_opportunities, 1);
    assert_eq!(counts.won_opportunity_amount, 500.0);
}

#[test]
fn status_change_updates_derived_counters() {
    let mock = Arc::new(MockGateway::new());
    let store = store_with(&mock);
    let cancel = CancelFlag::new();
    store.fetch_opportunities(&cancel).unwrap();

    let created = store
        .add_opportunity(&Opportunity {
            title: "Hot deal".into(),
            amount: Some(250.0),
            status: OpportunityStatus::Negotiation,
            priority: Priority::High,
            ..Default::default()
        })
        .unwrap();
    assert_eq!(store.counts().active_opportunities, 1);
    assert_eq!(store.counts().high_priority_opportunities, 1);

    let updated = store
        .update_opportunity(&created.id, json!({"status": "lost"}))
        .unwrap();
    assert_eq!(updated.status, OpportunityStatus::Lost);

    let counts = store.counts();
    assert_eq!(counts.opportunities, 1);
    assert_eq!(counts.active_opportunities, 0);
    assert_eq!(counts.high_priority_opportunities, 0);
    // Lost is not won
    assert_eq!(counts.won_opportunity_amount, 0.0);

    // Position preserved in the ordered view
    assert_eq!(store.opportunities()[0].id, created.id);
}

#[test]
fn remove_is_idempotent_even_when_backend_forgot_the_id() {
    let mock = Arc::new(MockGateway::new());
    mock.seed(
        EntityKind::Contact,
        vec![json!({"_id": "ct1", "first_name": "Ada", "last_name": "L"})],
    );
    let store = store_with(&mock);
    let cancel = CancelFlag::new();
    store.fetch_contacts(&cancel).unwrap();
    assert_eq!(store.counts().contacts, 1);

    store.remove_contact("ct1").unwrap();
    assert!(store.contacts().is_empty());
    assert_eq!(store.counts().contacts, 0);

    // The backend no longer knows the id; the end state is already
    // what the caller asked for, so this is a no-op success
    store.remove_contact("ct1").unwrap();
    store.remove_contact("never-existed").unwrap();
    assert!(store.contacts().is_empty());
}

#[test]
fn contacts_attach_company_snapshots_when_fk_resolves() {
    let mock = Arc::new(MockGateway::new());
    mock.seed(
        EntityKind::Company,
        vec![json!({"_id": "co1", "name": "Acme"})],
    );
    mock.seed(
        EntityKind::Contact,
        vec![
            json!({"_id": "ct1", "first_name": "Ada", "last_name": "L", "company_id": "co1"}),
            json!({"_id": "ct2", "first_name": "Grace", "last_name": "H", "company_id": "co-gone"}),
            json!({"_id": "ct3", "first_name": "Edsger", "last_name": "D",
                   "company_id": {"_id": "co9", "name": "Embedded Inc"}}),
        ],
    );
    let store = store_with(&mock);
    let cancel = CancelFlag::new();
    store.fetch_companies(&cancel).unwrap();
    store.fetch_contacts(&cancel).unwrap();

    let matched = store.contact("ct1").unwrap();
    assert_eq!(matched.company_id.as_deref(), Some("co1"));
    assert_eq!(matched.company.as_ref().map(|c| c.name.as_str()), Some("Acme"));

    // Unresolvable key keeps the bare id, no snapshot invented
    let unmatched = store.contact("ct2").unwrap();
    assert_eq!(unmatched.company_id.as_deref(), Some("co-gone"));
    assert!(unmatched.company.is_none());

    // Embedded FK object splits into bare id + snapshot
    let embedded = store.contact("ct3").unwrap();
    assert_eq!(embedded.company_id.as_deref(), Some("co9"));
    assert_eq!(
        embedded.company.as_ref().map(|c| c.name.as_str()),
        Some("Embedded Inc")
    );

    // Snapshot-first resolution without a gateway round trip
    let resolved = store.company_for_contact("ct1").unwrap();
    assert_eq!(resolved.name, "Acme");
}

#[test]
fn fetch_all_loads_referenced_collections_first() {
    let mock = Arc::new(MockGateway::new());
    mock.seed(
        EntityKind::Company,
        vec![json!({"_id": "co1", "name": "Acme"})],
    );
    mock.seed(
        EntityKind::Contact,
        vec![json!({"_id": "ct1", "first_name": "Ada", "last_name": "L", "company_id": "co1"})],
    );
    mock.seed(
        EntityKind::Opportunity,
        vec![json!({"_id": "op1", "title": "Deal", "status": "prospect",
                   "company_id": "co1", "contact_id": "ct1"})],
    );
    let store = store_with(&mock);

    store.fetch_all(&CancelFlag::new()).unwrap();

    let contact = store.contact("ct1").unwrap();
    assert_eq!(contact.company.as_ref().map(|c| c.name.as_str()), Some("Acme"));
    let opp = store.opportunity("op1").unwrap();
    assert_eq!(opp.company.as_ref().map(|c| c.name.as_str()), Some("Acme"));
    assert_eq!(
        opp.contact.as_ref().map(|c| c.first_name.as_str()),
        Some("Ada")
    );
}

#[test]
fn related_contacts_follow_latest_selection() {
    let mock = Arc::new(MockGateway::new());
    mock.seed(
        EntityKind::Contact,
        vec![
            json!({"_id": "ct1", "first_name": "Ada", "last_name": "L", "company_id": "co1"}),
            json!({"_id": "ct2", "first_name": "Grace", "last_name": "H", "company_id": "co2"}),
        ],
    );
    let store = Arc::new(store_with(&mock));

    // First selection is slow; the second lands while it sleeps
    mock.delay_next_related(Duration::from_millis(300));
    let slow = {
        let store = store.clone();
        thread::spawn(move || store.select_company(Some("co1"), &CancelFlag::new()))
    };
    thread::sleep(Duration::from_millis(100));
    store.select_company(Some("co2"), &CancelFlag::new()).unwrap();
    slow.join().unwrap().unwrap();

    assert_eq!(store.selected_company().as_deref(), Some("co2"));
    let related = store.related_contacts();
    assert_eq!(related.len(), 1);
    assert_eq!(related[0].id, "ct2");
    assert!(!store.related_loading());
}

#[test]
fn clearing_selection_clears_related_contacts() {
    let mock = Arc::new(MockGateway::new());
    mock.seed(
        EntityKind::Contact,
        vec![json!({"_id": "ct1", "first_name": "Ada", "last_name": "L", "company_id": "co1"})],
    );
    let store = store_with(&mock);
    let cancel = CancelFlag::new();

    store.select_company(Some("co1"), &cancel).unwrap();
    assert_eq!(store.related_contacts().len(), 1);

    store.select_company(None, &cancel).unwrap();
    assert!(store.selected_company().is_none());
    assert!(store.related_contacts().is_empty());
}

#[test]
fn import_accounts_every_row() {
    let mock = Arc::new(MockGateway::new());
    let store = store_with(&mock);
    let cancel = CancelFlag::new();

    let rows = vec![
        ImportRow {
            name: Some("Acme".into()),
            industry: Some("Robotics".into()),
            ..Default::default()
        },
        // No name: rejected before submission
        ImportRow {
            email: Some("sales@acme.example".into()),
            ..Default::default()
        },
        // Schemeless website: rejected before submission
        ImportRow {
            name: Some("Globex".into()),
            website: Some("not-a-url".into()),
            ..Default::default()
        },
    ];
    let summary = store.import_companies(&rows, &cancel).unwrap();

    assert_eq!(summary.imported, 1);
    assert_eq!(summary.skipped, 2);
    assert_eq!(summary.duplicates, 0);
    assert_eq!(summary.failed, 0);
    assert_eq!(summary.errors.len(), 2);
    assert!(summary.errors[0].contains("row 2"));
    assert!(summary.errors[1].contains("Globex"));
    assert!(summary.errors[1].contains("invalid website"));

    // The post-import refresh made the created record visible
    assert_eq!(store.companies().len(), 1);
    assert_eq!(store.companies()[0].name, "Acme");
    assert_eq!(store.counts().companies, 1);
}

#[test]
fn import_counts_duplicates_and_failures_separately() {
    let mock = Arc::new(MockGateway::new());
    let store = store_with(&mock);
    let cancel = CancelFlag::new();

    let rows = vec![
        ImportRow {
            name: Some("Acme".into()),
            ..Default::default()
        },
        ImportRow {
            name: Some("Globex".into()),
            ..Default::default()
        },
    ];

    mock.reject_next_create_as_duplicate(DuplicateRecord {
        id: Some("co-existing".into()),
        name: Some("Acme".into()),
        ..Default::default()
    });
    let summary = store.import_companies(&rows[..1], &cancel).unwrap();
    assert_eq!(summary.duplicates, 1);
    assert_eq!(summary.imported, 0);
    assert_eq!(summary.failed, 0);

    mock.fail_next_create("gateway timeout");
    let summary = store.import_companies(&rows[1..], &cancel).unwrap();
    assert_eq!(summary.failed, 1);
    assert_eq!(summary.failures.len(), 1);
    assert_eq!(summary.failures[0].name, "Globex");
    assert!(summary.failures[0].reason.contains("gateway timeout"));
}

#[test]
fn contact_batch_import_prepends_canonical_records() {
    let mock = Arc::new(MockGateway::new());
    mock.seed(
        EntityKind::Contact,
        vec![json!({"_id": "ct0", "first_name": "Old", "last_name": "Timer"})],
    );
    let store = store_with(&mock);
    let cancel = CancelFlag::new();
    store.fetch_contacts(&cancel).unwrap();

    let drafts = vec![
        Contact {
            first_name: "Ada".into(),
            last_name: "L".into(),
            ..Default::default()
        },
        Contact {
            first_name: "Grace".into(),
            last_name: "H".into(),
            ..Default::default()
        },
    ];
    let created = store.import_contacts(&drafts).unwrap();
    assert_eq!(created.len(), 2);
    assert!(created.iter().all(|c| !c.id.is_empty()));

    let names: Vec<String> = store.contacts().iter().map(|c| c.full_name()).collect();
    assert_eq!(names, ["Grace H", "Ada L", "Old Timer"]);
    assert_eq!(store.counts().contacts, 3);
}

#[test]
fn lead_ledger_survives_restart() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("crm.db");
    let mock = Arc::new(MockGateway::new());

    let added = {
        let store =
            CrmStore::new(mock.clone(), LocalStore::open(&path).unwrap()).unwrap();
        store
            .add_lead(crmkit::entities::Lead {
                name: "Walk-in".into(),
                source: Some("event".into()),
                ..Default::default()
            })
            .unwrap()
    };
    assert_eq!(added.id.len(), 26);

    let store = CrmStore::new(mock.clone(), LocalStore::open(&path).unwrap()).unwrap();
    let leads = store.leads();
    assert_eq!(leads.len(), 1);
    assert_eq!(leads[0].id, added.id);
    assert_eq!(leads[0].name, "Walk-in");

    store
        .update_lead(&added.id, &json!({"notes": "follow up Friday"}))
        .unwrap();
    assert!(!store.remove_lead("no-such-id").unwrap());
    assert_eq!(
        store.lead(&added.id).unwrap().notes.as_deref(),
        Some("follow up Friday")
    );
}

#[test]
fn settings_fall_back_to_defaults_when_gateway_fails() {
    let mock = Arc::new(MockGateway::new());
    let store = store_with(&mock);

    // No settings seeded: the gateway errors, the cache serves defaults
    let settings = store.fetch_settings(false).unwrap();
    assert_eq!(settings.user_name, "Demo User");
    assert!(!settings.sectors.is_empty());
    assert!(!settings.activity_types.is_empty());

    mock.seed_settings(json!({
        "_id": "st1",
        "user_name": "Real User",
        "user_email": "real@example.com",
        "sectors": ["Energy"],
        "activity_types": ["Call"],
    }));
    // Cached fallback is returned until forced
    assert_eq!(store.fetch_settings(false).unwrap().user_name, "Demo User");
    let refreshed = store.fetch_settings(true).unwrap();
    assert_eq!(refreshed.user_name, "Real User");
    assert_eq!(refreshed.sectors, ["Energy"]);
}

#[test]
fn settings_updates_merge_locally_without_a_round_trip() {
    let mock = Arc::new(MockGateway::new());
    mock.seed_settings(json!({
        "_id": "st1",
        "user_name": "Real User",
        "sectors": ["Energy"],
        "activity_types": ["Call"],
    }));
    let store = store_with(&mock);

    let updated = store
        .update_settings(json!({"user_name": "Renamed User"}))
        .unwrap();
    assert_eq!(updated.user_name, "Renamed User");
    assert_eq!(updated.sectors, ["Energy"]);
    assert!(updated.updated_at.is_some());
    assert_eq!(store.fetch_settings(false).unwrap().user_name, "Renamed User");

    // The write never reached the gateway; a forced fetch serves the
    // untouched remote document again
    assert_eq!(store.fetch_settings(true).unwrap().user_name, "Real User");
}

#[test]
fn today_activity_counters() {
    let mock = Arc::new(MockGateway::new());
    let now = Utc::now().to_rfc3339();
    mock.seed(
        EntityKind::Activity,
        vec![
            json!({"_id": "ac1", "title": "Call Acme", "start_time": now, "status": "scheduled"}),
            json!({"_id": "ac2", "title": "Old meeting", "start_time": "2020-01-05T10:00:00Z",
                   "status": "completed"}),
        ],
    );
    let store = store_with(&mock);
    let cancel = CancelFlag::new();
    store.fetch_activities(&cancel).unwrap();

    let counts = store.counts();
    assert_eq!(counts.activities, 2);
    assert_eq!(counts.today_activities, 1);
    assert_eq!(counts.scheduled_today_activities, 1);
}
