//! `crmkit opp` command - opportunity management

use clap::Subcommand;
use console::style;
use miette::{IntoDiagnostic, Result};

use crate::cli::helpers::{open_store, opt_cell, print_table, truncate_str};
use crate::cli::GlobalOpts;
use crate::entities::{Opportunity, OpportunityStatus, Priority};
use crate::store::CancelFlag;

#[derive(Subcommand, Debug)]
pub enum OppCommands {
    /// List opportunities
    List(ListArgs),

    /// Create a new opportunity
    Add(AddArgs),

    /// Change the pipeline status of an opportunity
    Status(StatusArgs),

    /// Delete an opportunity
    Rm(RmArgs),
}

#[derive(clap::Args, Debug)]
pub struct ListArgs {
    /// Re-fetch from the API even if already loaded this session
    #[arg(long)]
    pub refresh: bool,

    /// Show only active (non-terminal) opportunities
    #[arg(long)]
    pub active: bool,
}

#[derive(clap::Args, Debug)]
pub struct AddArgs {
    #[arg(long, short = 't')]
    pub title: String,

    #[arg(long, short = 'a')]
    pub amount: Option<f64>,

    #[arg(long, short = 's', default_value = "prospect")]
    pub status: OpportunityStatus,

    #[arg(long, short = 'p', default_value = "medium")]
    pub priority: Priority,

    /// Company id the deal belongs to
    #[arg(long, short = 'c')]
    pub company: Option<String>,

    /// Primary contact id
    #[arg(long)]
    pub contact: Option<String>,
}

#[derive(clap::Args, Debug)]
pub struct StatusArgs {
    /// Opportunity ID
    pub id: String,

    /// New status
    pub status: OpportunityStatus,
}

#[derive(clap::Args, Debug)]
pub struct RmArgs {
    /// Opportunity ID
    pub id: String,
}

pub fn run(cmd: OppCommands, global: &GlobalOpts) -> Result<()> {
    match cmd {
        OppCommands::List(args) => run_list(args, global),
        OppCommands::Add(args) => run_add(args, global),
        OppCommands::Status(args) => run_status(args, global),
        OppCommands::Rm(args) => run_rm(args, global),
    }
}

fn run_list(args: ListArgs, global: &GlobalOpts) -> Result<()> {
    let store = open_store(global)?;
    let cancel = CancelFlag::new();
    store.fetch_companies(&cancel).into_diagnostic()?;
    if args.refresh {
        store.refresh_opportunities(&cancel).into_diagnostic()?;
    } else {
        store.fetch_opportunities(&cancel).into_diagnostic()?;
    }

    let opportunities: Vec<Opportunity> = store
        .opportunities()
        .into_iter()
        .filter(|o| !args.active || o.status.is_active())
        .collect();

    if opportunities.is_empty() {
        println!("No opportunities found.");
        return Ok(());
    }
    print_table(
        &["ID", "Title", "Status", "Priority", "Amount", "Company"],
        opportunities.iter().map(|o| {
            let company = o
                .company
                .as_ref()
                .map(|c| c.name.clone())
                .or_else(|| o.company_id.clone());
            vec![
                truncate_str(&o.id, 16),
                truncate_str(&o.title, 32),
                o.status.to_string(),
                o.priority.to_string(),
                o.amount.map_or("-".to_string(), |a| format!("{:.2}", a)),
                opt_cell(company.as_deref()),
            ]
        }),
    );
    if !global.quiet {
        let counts = store.counts();
        println!(
            "{} opportunity(ies), {} active, won total {:.2}",
            counts.opportunities, counts.active_opportunities, counts.won_opportunity_amount
        );
    }
    Ok(())
}

fn run_add(args: AddArgs, global: &GlobalOpts) -> Result<()> {
    let store = open_store(global)?;
    let cancel = CancelFlag::new();
    store.fetch_companies(&cancel).into_diagnostic()?;
    store.fetch_contacts(&cancel).into_diagnostic()?;

    let draft = Opportunity {
        title: args.title,
        amount: args.amount,
        status: args.status,
        priority: args.priority,
        company_id: args.company,
        contact_id: args.contact,
        ..Default::default()
    };
    let created = store.add_opportunity(&draft).into_diagnostic()?;
    println!(
        "{} Created opportunity {} ({})",
        style("✓").green(),
        style(&created.title).bold(),
        created.id
    );
    Ok(())
}

fn run_status(args: StatusArgs, global: &GlobalOpts) -> Result<()> {
    let store = open_store(global)?;
    let patch = serde_json::json!({ "status": args.status });
    let updated = store.update_opportunity(&args.id, patch).into_diagnostic()?;
    println!(
        "{} {} is now {}",
        style("✓").green(),
        updated.title,
        style(updated.status).bold()
    );
    Ok(())
}

fn run_rm(args: RmArgs, global: &GlobalOpts) -> Result<()> {
    let store = open_store(global)?;
    store.remove_opportunity(&args.id).into_diagnostic()?;
    println!("{} Deleted opportunity {}", style("✓").green(), args.id);
    Ok(())
}
