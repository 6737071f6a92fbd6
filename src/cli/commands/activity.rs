//! `crmkit activity` command - activity listing

use chrono::Utc;
use clap::Subcommand;
use miette::{IntoDiagnostic, Result};

use crate::cli::helpers::{open_store, opt_cell, print_table, truncate_str};
use crate::cli::GlobalOpts;
use crate::entities::Activity;
use crate::store::CancelFlag;

#[derive(Subcommand, Debug)]
pub enum ActivityCommands {
    /// List activities
    List(ListArgs),
}

#[derive(clap::Args, Debug)]
pub struct ListArgs {
    /// Re-fetch from the API even if already loaded this session
    #[arg(long)]
    pub refresh: bool,

    /// Show only activities starting today
    #[arg(long)]
    pub today: bool,
}

pub fn run(cmd: ActivityCommands, global: &GlobalOpts) -> Result<()> {
    match cmd {
        ActivityCommands::List(args) => run_list(args, global),
    }
}

fn run_list(args: ListArgs, global: &GlobalOpts) -> Result<()> {
    let store = open_store(global)?;
    let cancel = CancelFlag::new();
    store.fetch_companies(&cancel).into_diagnostic()?;
    store.fetch_contacts(&cancel).into_diagnostic()?;
    if args.refresh {
        store.refresh_activities(&cancel).into_diagnostic()?;
    } else {
        store.fetch_activities(&cancel).into_diagnostic()?;
    }

    let today = Utc::now().date_naive();
    let activities: Vec<Activity> = store
        .activities()
        .into_iter()
        .filter(|a| !args.today || a.starts_on(today))
        .collect();

    if activities.is_empty() {
        println!("No activities found.");
        return Ok(());
    }
    print_table(
        &["ID", "Title", "Type", "Status", "Starts", "Contact"],
        activities.iter().map(|a| {
            let contact = a.contact.as_ref().map(|c| c.full_name());
            vec![
                truncate_str(&a.id, 16),
                truncate_str(&a.title, 32),
                opt_cell(a.activity_type.as_deref()),
                a.status.to_string(),
                a.start_time
                    .map_or("-".to_string(), |t| t.format("%Y-%m-%d %H:%M").to_string()),
                opt_cell(contact.as_deref()),
            ]
        }),
    );
    if !global.quiet {
        let counts = store.counts();
        println!(
            "{} activity(ies), {} today ({} still scheduled)",
            counts.activities, counts.today_activities, counts.scheduled_today_activities
        );
    }
    Ok(())
}
