//! CLI argument definitions using clap derive

use clap::{Parser, Subcommand};

use crate::cli::commands::{
    activity::ActivityCommands,
    company::CompanyCommands,
    competitor::CompetitorCommands,
    completions::CompletionsArgs,
    contact::ContactCommands,
    expense::ExpenseCommands,
    import::ImportArgs,
    lead::LeadCommands,
    opp::OppCommands,
    stats::StatsArgs,
};

#[derive(Parser)]
#[command(name = "crmkit")]
#[command(author, version, about = "CRM client toolkit")]
#[command(long_about = "A command-line client for the CRM REST API with a local cache, \
local-only lead tracking and CSV bulk import.")]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    #[command(flatten)]
    pub global: GlobalOpts,
}

#[derive(clap::Args, Clone, Debug)]
pub struct GlobalOpts {
    /// API base URL (overrides config and CRMKIT_API_URL)
    #[arg(long, global = true)]
    pub api_url: Option<String>,

    /// Suppress non-essential output
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Contact management
    #[command(subcommand)]
    Contact(ContactCommands),

    /// Company management
    #[command(subcommand)]
    Company(CompanyCommands),

    /// Opportunity management
    #[command(subcommand)]
    Opp(OppCommands),

    /// Activity management
    #[command(subcommand)]
    Activity(ActivityCommands),

    /// Expense management
    #[command(subcommand)]
    Expense(ExpenseCommands),

    /// Competitor management
    #[command(subcommand)]
    Competitor(CompetitorCommands),

    /// Lead tracking (stored locally, never sent to the API)
    #[command(subcommand)]
    Lead(LeadCommands),

    /// Bulk import from CSV
    Import(ImportArgs),

    /// Show aggregate counters across all collections
    Stats(StatsArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}
