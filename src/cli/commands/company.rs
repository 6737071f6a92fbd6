//! `crmkit company` command - company management

use clap::Subcommand;
use console::style;
use dialoguer::{theme::ColorfulTheme, Confirm};
use miette::{IntoDiagnostic, Result};

use crate::cli::helpers::{open_store, opt_cell, print_table, truncate_str};
use crate::cli::GlobalOpts;
use crate::core::StoreError;
use crate::entities::Company;
use crate::store::CancelFlag;

#[derive(Subcommand, Debug)]
pub enum CompanyCommands {
    /// List all companies
    List(ListArgs),

    /// Create a new company
    Add(AddArgs),

    /// Delete a company
    Rm(RmArgs),
}

#[derive(clap::Args, Debug)]
pub struct ListArgs {
    /// Re-fetch from the API even if already loaded this session
    #[arg(long)]
    pub refresh: bool,

    /// Search in name and industry
    #[arg(long)]
    pub search: Option<String>,
}

#[derive(clap::Args, Debug)]
pub struct AddArgs {
    #[arg(long, short = 'n')]
    pub name: String,

    #[arg(long, short = 'i')]
    pub industry: Option<String>,

    #[arg(long, short = 'w')]
    pub website: Option<String>,

    #[arg(long, short = 'p')]
    pub phone: Option<String>,

    #[arg(long, short = 'e')]
    pub email: Option<String>,

    #[arg(long)]
    pub sector: Option<String>,

    /// Accept the API's existing record when it reports a duplicate
    #[arg(long, short = 'y')]
    pub yes: bool,
}

#[derive(clap::Args, Debug)]
pub struct RmArgs {
    /// Company ID
    pub id: String,
}

pub fn run(cmd: CompanyCommands, global: &GlobalOpts) -> Result<()> {
    match cmd {
        CompanyCommands::List(args) => run_list(args, global),
        CompanyCommands::Add(args) => run_add(args, global),
        CompanyCommands::Rm(args) => run_rm(args, global),
    }
}

fn run_list(args: ListArgs, global: &GlobalOpts) -> Result<()> {
    let store = open_store(global)?;
    let cancel = CancelFlag::new();
    if args.refresh {
        store.refresh_companies(&cancel).into_diagnostic()?;
    } else {
        store.fetch_companies(&cancel).into_diagnostic()?;
    }

    let companies: Vec<Company> = store
        .companies()
        .into_iter()
        .filter(|c| match &args.search {
            Some(term) => {
                let term = term.to_lowercase();
                c.name.to_lowercase().contains(&term)
                    || c.industry
                        .as_ref()
                        .map_or(false, |i| i.to_lowercase().contains(&term))
            }
            None => true,
        })
        .collect();

    if companies.is_empty() {
        println!("No companies found.");
        return Ok(());
    }
    print_table(
        &["ID", "Name", "Industry", "Sector", "Website"],
        companies.iter().map(|c| {
            vec![
                truncate_str(&c.id, 16),
                c.name.clone(),
                opt_cell(c.industry.as_deref()),
                opt_cell(c.sector.as_deref()),
                opt_cell(c.website.as_deref()),
            ]
        }),
    );
    if !global.quiet {
        println!("{} company(ies)", companies.len());
    }
    Ok(())
}

fn run_add(args: AddArgs, global: &GlobalOpts) -> Result<()> {
    let store = open_store(global)?;

    let draft = Company {
        name: args.name,
        industry: args.industry,
        website: args.website,
        phone: args.phone,
        email: args.email,
        sector: args.sector,
        ..Default::default()
    };
    match store.add_company(&draft) {
        Ok(created) => {
            println!(
                "{} Created company {} ({})",
                style("✓").green(),
                style(&created.name).bold(),
                created.id
            );
            Ok(())
        }
        Err(StoreError::Duplicate { existing }) => {
            println!(
                "{} The API reports an existing record: {}",
                style("!").yellow(),
                existing.summary()
            );
            let keep = args.yes
                || Confirm::with_theme(&ColorfulTheme::default())
                    .with_prompt("Use the existing record instead?")
                    .default(true)
                    .interact()
                    .into_diagnostic()?;
            if keep {
                println!(
                    "Keeping existing record {}",
                    existing.id.as_deref().unwrap_or("(unknown id)")
                );
                Ok(())
            } else {
                Err(miette::miette!("duplicate company rejected"))
            }
        }
        Err(err) => Err(err).into_diagnostic(),
    }
}

fn run_rm(args: RmArgs, global: &GlobalOpts) -> Result<()> {
    let store = open_store(global)?;
    store.remove_company(&args.id).into_diagnostic()?;
    println!("{} Deleted company {}", style("✓").green(), args.id);
    Ok(())
}
