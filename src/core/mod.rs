//! Core module - configuration, errors, identity

pub mod config;
pub mod error;
pub mod identity;

pub use config::Config;
pub use error::{DuplicateRecord, Result, StoreError};
pub use identity::local_id;
