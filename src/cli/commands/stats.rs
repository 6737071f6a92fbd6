//! `crmkit stats` command - aggregate counters

use miette::{IntoDiagnostic, Result};

use crate::cli::helpers::{open_store, print_table};
use crate::cli::GlobalOpts;
use crate::store::CancelFlag;

#[derive(clap::Args, Debug)]
pub struct StatsArgs {}

pub fn run(_args: StatsArgs, global: &GlobalOpts) -> Result<()> {
    let store = open_store(global)?;
    let cancel = CancelFlag::new();
    store.fetch_all(&cancel).into_diagnostic()?;

    let counts = store.counts();
    let rows = vec![
        vec!["Contacts".to_string(), counts.contacts.to_string()],
        vec!["Companies".to_string(), counts.companies.to_string()],
        vec!["Opportunities".to_string(), counts.opportunities.to_string()],
        vec![
            "  active".to_string(),
            counts.active_opportunities.to_string(),
        ],
        vec![
            "  high priority".to_string(),
            counts.high_priority_opportunities.to_string(),
        ],
        vec![
            "  won amount".to_string(),
            format!("{:.2}", counts.won_opportunity_amount),
        ],
        vec!["Activities".to_string(), counts.activities.to_string()],
        vec![
            "  today".to_string(),
            counts.today_activities.to_string(),
        ],
        vec![
            "  scheduled today".to_string(),
            counts.scheduled_today_activities.to_string(),
        ],
        vec!["Expenses".to_string(), counts.expenses.to_string()],
        vec!["Leads (local)".to_string(), store.leads().len().to_string()],
    ];
    print_table(&["Metric", "Count"], rows);
    Ok(())
}
