//! Shared helper functions for CLI commands

use std::sync::Arc;

use miette::{IntoDiagnostic, Result};
use tabled::{builder::Builder, settings::Style};

use crate::cli::GlobalOpts;
use crate::core::Config;
use crate::gateway::HttpGateway;
use crate::store::CrmStore;

/// Build a store wired to the configured HTTP gateway
pub fn open_store(global: &GlobalOpts) -> Result<CrmStore> {
    let mut config = Config::load();
    if let Some(api_url) = &global.api_url {
        config.api_url = Some(api_url.clone());
    }
    let gateway = HttpGateway::new(&config.api_url(), config.api_key.clone());
    CrmStore::open(Arc::new(gateway), &config).into_diagnostic()
}

/// Render a header row plus data rows as a table on stdout
pub fn print_table<R, C>(headers: &[&str], rows: R)
where
    R: IntoIterator<Item = C>,
    C: IntoIterator<Item = String>,
{
    let mut builder = Builder::default();
    builder.push_record(headers.iter().copied());
    for row in rows {
        builder.push_record(row);
    }
    println!("{}", builder.build().with(Style::sharp()));
}

/// Truncate a string to max_len characters, adding "..." if truncated.
/// Cuts on char boundaries so non-ASCII values are safe.
pub fn truncate_str(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        return s.to_string();
    }
    let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
    format!("{}...", kept.trim_end())
}

/// Render an optional field for table output
pub fn opt_cell(value: Option<&str>) -> String {
    value.unwrap_or("-").to_string()
}
