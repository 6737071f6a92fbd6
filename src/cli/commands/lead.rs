//! `crmkit lead` command - local-only lead tracking
//!
//! Leads live entirely in the local database; none of these subcommands
//! touch the API.

use clap::Subcommand;
use console::style;
use miette::{IntoDiagnostic, Result};
use serde_json::json;

use crate::cli::helpers::{open_store, opt_cell, print_table};
use crate::cli::GlobalOpts;
use crate::entities::Lead;

#[derive(Subcommand, Debug)]
pub enum LeadCommands {
    /// List leads
    List,

    /// Record a new lead
    Add(AddArgs),

    /// Update fields on a lead
    Edit(EditArgs),

    /// Delete a lead
    Rm(RmArgs),
}

#[derive(clap::Args, Debug)]
pub struct AddArgs {
    #[arg(long, short = 'n')]
    pub name: String,

    #[arg(long, short = 'e')]
    pub email: Option<String>,

    #[arg(long, short = 'p')]
    pub phone: Option<String>,

    #[arg(long, short = 'c')]
    pub company: Option<String>,

    /// Where the lead came from (referral, web, event, ...)
    #[arg(long, short = 's')]
    pub source: Option<String>,

    #[arg(long)]
    pub notes: Option<String>,
}

#[derive(clap::Args, Debug)]
pub struct EditArgs {
    /// Lead ID
    pub id: String,

    #[arg(long, short = 'n')]
    pub name: Option<String>,

    #[arg(long, short = 'e')]
    pub email: Option<String>,

    #[arg(long, short = 'p')]
    pub phone: Option<String>,

    #[arg(long)]
    pub notes: Option<String>,
}

#[derive(clap::Args, Debug)]
pub struct RmArgs {
    /// Lead ID
    pub id: String,
}

pub fn run(cmd: LeadCommands, global: &GlobalOpts) -> Result<()> {
    match cmd {
        LeadCommands::List => run_list(global),
        LeadCommands::Add(args) => run_add(args, global),
        LeadCommands::Edit(args) => run_edit(args, global),
        LeadCommands::Rm(args) => run_rm(args, global),
    }
}

fn run_list(global: &GlobalOpts) -> Result<()> {
    let store = open_store(global)?;
    let leads = store.leads();
    if leads.is_empty() {
        println!("No leads recorded.");
        return Ok(());
    }
    print_table(
        &["ID", "Name", "Email", "Phone", "Company", "Source"],
        leads.iter().map(|l| {
            vec![
                // Full id; it is the handle for edit/rm
                l.id.clone(),
                l.name.clone(),
                opt_cell(l.email.as_deref()),
                opt_cell(l.phone.as_deref()),
                opt_cell(l.company_name.as_deref()),
                opt_cell(l.source.as_deref()),
            ]
        }),
    );
    if !global.quiet {
        println!("{} lead(s)", leads.len());
    }
    Ok(())
}

fn run_add(args: AddArgs, global: &GlobalOpts) -> Result<()> {
    let store = open_store(global)?;
    let draft = Lead {
        name: args.name,
        email: args.email,
        phone: args.phone,
        company_name: args.company,
        source: args.source,
        notes: args.notes,
        ..Default::default()
    };
    let created = store.add_lead(draft).into_diagnostic()?;
    println!(
        "{} Recorded lead {} ({})",
        style("✓").green(),
        style(&created.name).bold(),
        created.id
    );
    Ok(())
}

fn run_edit(args: EditArgs, global: &GlobalOpts) -> Result<()> {
    let store = open_store(global)?;
    let mut patch = serde_json::Map::new();
    if let Some(name) = args.name {
        patch.insert("name".into(), json!(name));
    }
    if let Some(email) = args.email {
        patch.insert("email".into(), json!(email));
    }
    if let Some(phone) = args.phone {
        patch.insert("phone".into(), json!(phone));
    }
    if let Some(notes) = args.notes {
        patch.insert("notes".into(), json!(notes));
    }
    if patch.is_empty() {
        println!("Nothing to update.");
        return Ok(());
    }
    let updated = store
        .update_lead(&args.id, &serde_json::Value::Object(patch))
        .into_diagnostic()?;
    println!("{} Updated lead {}", style("✓").green(), updated.name);
    Ok(())
}

fn run_rm(args: RmArgs, global: &GlobalOpts) -> Result<()> {
    let store = open_store(global)?;
    if store.remove_lead(&args.id).into_diagnostic()? {
        println!("{} Deleted lead {}", style("✓").green(), args.id);
    } else {
        println!("No lead with id {}.", args.id);
    }
    Ok(())
}
