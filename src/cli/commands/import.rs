//! `crmkit import` command - CSV bulk import

use std::path::PathBuf;

use console::style;
use miette::{IntoDiagnostic, Result};

use crate::cli::helpers::open_store;
use crate::cli::GlobalOpts;
use crate::store::import::rows_from_csv_path;
use crate::store::CancelFlag;

#[derive(clap::Args, Debug)]
pub struct ImportArgs {
    /// CSV file with company rows. Headers may use either titles
    /// ("Company Name") or snake_case keys (company_name).
    pub file: PathBuf,

    /// Validate only; do not submit anything
    #[arg(long)]
    pub dry_run: bool,
}

pub fn run(args: ImportArgs, global: &GlobalOpts) -> Result<()> {
    let rows = rows_from_csv_path(&args.file).into_diagnostic()?;
    if rows.is_empty() {
        println!("No rows in {}.", args.file.display());
        return Ok(());
    }

    if args.dry_run {
        let mut valid = 0usize;
        let mut rejected = 0usize;
        let mut messages = Vec::new();
        for (index, row) in rows.iter().enumerate() {
            match row.validate(index + 1) {
                Ok(_) => valid += 1,
                Err(reasons) => {
                    rejected += 1;
                    messages.extend(reasons);
                }
            }
        }
        println!("{} row(s): {} valid, {} rejected", rows.len(), valid, rejected);
        for reason in &messages {
            println!("  {} {}", style("✗").red(), reason);
        }
        return Ok(());
    }

    let store = open_store(global)?;
    let cancel = CancelFlag::new();
    let summary = store.import_companies(&rows, &cancel).into_diagnostic()?;

    println!(
        "{} Imported {} company(ies); {} skipped, {} duplicate(s), {} failed",
        style("✓").green(),
        summary.imported,
        summary.skipped,
        summary.duplicates,
        summary.failed
    );
    for reason in &summary.errors {
        println!("  {} {}", style("✗").red(), reason);
    }
    for failure in &summary.failures {
        println!(
            "  {} row {} ({}): {}",
            style("✗").red(),
            failure.row,
            failure.name,
            failure.reason
        );
    }
    Ok(())
}
