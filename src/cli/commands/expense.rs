//! `crmkit expense` command - expense listing

use clap::Subcommand;
use miette::{IntoDiagnostic, Result};

use crate::cli::helpers::{open_store, opt_cell, print_table, truncate_str};
use crate::cli::GlobalOpts;
use crate::store::CancelFlag;

#[derive(Subcommand, Debug)]
pub enum ExpenseCommands {
    /// List expenses
    List(ListArgs),
}

#[derive(clap::Args, Debug)]
pub struct ListArgs {
    /// Re-fetch from the API even if already loaded this session
    #[arg(long)]
    pub refresh: bool,
}

pub fn run(cmd: ExpenseCommands, global: &GlobalOpts) -> Result<()> {
    match cmd {
        ExpenseCommands::List(args) => run_list(args, global),
    }
}

fn run_list(args: ListArgs, global: &GlobalOpts) -> Result<()> {
    let store = open_store(global)?;
    let cancel = CancelFlag::new();
    store.fetch_opportunities(&cancel).into_diagnostic()?;
    if args.refresh {
        store.refresh_expenses(&cancel).into_diagnostic()?;
    } else {
        store.fetch_expenses(&cancel).into_diagnostic()?;
    }

    let expenses = store.expenses();
    if expenses.is_empty() {
        println!("No expenses found.");
        return Ok(());
    }
    print_table(
        &["ID", "Description", "Amount", "Category", "Opportunity"],
        expenses.iter().map(|e| {
            let opportunity = e
                .opportunity
                .as_ref()
                .map(|o| o.title.clone())
                .or_else(|| e.opportunity_id.clone());
            vec![
                truncate_str(&e.id, 16),
                truncate_str(&e.description, 32),
                e.amount.map_or("-".to_string(), |a| format!("{:.2}", a)),
                opt_cell(e.category.as_deref()),
                opt_cell(opportunity.as_deref()),
            ]
        }),
    );
    if !global.quiet {
        println!("{} expense(s)", expenses.len());
    }
    Ok(())
}
