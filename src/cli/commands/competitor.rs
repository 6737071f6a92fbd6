//! `crmkit competitor` command - competitor management

use clap::Subcommand;
use console::style;
use miette::{IntoDiagnostic, Result};

use crate::cli::helpers::{open_store, opt_cell, print_table, truncate_str};
use crate::cli::GlobalOpts;
use crate::entities::Competitor;
use crate::store::CancelFlag;

#[derive(Subcommand, Debug)]
pub enum CompetitorCommands {
    /// List competitors
    List(ListArgs),

    /// Create a new competitor
    Add(AddArgs),

    /// Delete a competitor
    Rm(RmArgs),
}

#[derive(clap::Args, Debug)]
pub struct ListArgs {
    /// Re-fetch from the API even if already loaded this session
    #[arg(long)]
    pub refresh: bool,
}

#[derive(clap::Args, Debug)]
pub struct AddArgs {
    #[arg(long, short = 'n')]
    pub name: String,

    #[arg(long, short = 'w')]
    pub website: Option<String>,

    #[arg(long)]
    pub strengths: Option<String>,

    #[arg(long)]
    pub weaknesses: Option<String>,

    #[arg(long)]
    pub notes: Option<String>,
}

#[derive(clap::Args, Debug)]
pub struct RmArgs {
    /// Competitor ID
    pub id: String,
}

pub fn run(cmd: CompetitorCommands, global: &GlobalOpts) -> Result<()> {
    match cmd {
        CompetitorCommands::List(args) => run_list(args, global),
        CompetitorCommands::Add(args) => run_add(args, global),
        CompetitorCommands::Rm(args) => run_rm(args, global),
    }
}

fn run_list(args: ListArgs, global: &GlobalOpts) -> Result<()> {
    let store = open_store(global)?;
    let cancel = CancelFlag::new();
    if args.refresh {
        store.refresh_competitors(&cancel).into_diagnostic()?;
    } else {
        store.fetch_competitors(&cancel).into_diagnostic()?;
    }

    let competitors = store.competitors();
    if competitors.is_empty() {
        println!("No competitors found.");
        return Ok(());
    }
    print_table(
        &["ID", "Name", "Website", "Strengths", "Weaknesses"],
        competitors.iter().map(|c| {
            vec![
                truncate_str(&c.id, 16),
                c.name.clone(),
                opt_cell(c.website.as_deref()),
                truncate_str(c.strengths.as_deref().unwrap_or("-"), 24),
                truncate_str(c.weaknesses.as_deref().unwrap_or("-"), 24),
            ]
        }),
    );
    if !global.quiet {
        println!("{} competitor(s)", competitors.len());
    }
    Ok(())
}

fn run_add(args: AddArgs, global: &GlobalOpts) -> Result<()> {
    let store = open_store(global)?;
    let draft = Competitor {
        name: args.name,
        website: args.website,
        strengths: args.strengths,
        weaknesses: args.weaknesses,
        notes: args.notes,
        ..Default::default()
    };
    let created = store.add_competitor(&draft).into_diagnostic()?;
    println!(
        "{} Created competitor {} ({})",
        style("✓").green(),
        style(&created.name).bold(),
        created.id
    );
    Ok(())
}

fn run_rm(args: RmArgs, global: &GlobalOpts) -> Result<()> {
    let store = open_store(global)?;
    store.remove_competitor(&args.id).into_diagnostic()?;
    println!("{} Deleted competitor {}", style("✓").green(), args.id);
    Ok(())
}
