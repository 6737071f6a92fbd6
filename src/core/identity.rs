//! Client-side identifier synthesis for local-only records
//!
//! Backend-owned entities get their ids from the server. Local-only
//! records (the lead ledger) synthesize a ULID at creation time: the
//! millisecond-timestamp prefix keeps ids monotonic-enough for a
//! single-user, single-device ledger. No cross-process uniqueness is
//! guaranteed or needed.

use ulid::Ulid;

/// Synthesize an id for a locally-owned record
pub fn local_id() -> String {
    Ulid::new().to_string()
}
