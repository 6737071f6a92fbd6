//! `crmkit contact` command - contact management

use clap::Subcommand;
use console::style;
use miette::{IntoDiagnostic, Result};

use crate::cli::helpers::{open_store, opt_cell, print_table, truncate_str};
use crate::cli::GlobalOpts;
use crate::entities::Contact;
use crate::store::CancelFlag;

#[derive(Subcommand, Debug)]
pub enum ContactCommands {
    /// List all contacts
    List(ListArgs),

    /// Create a new contact
    Add(AddArgs),

    /// Delete a contact
    Rm(RmArgs),

    /// List the contacts of one company
    ByCompany(ByCompanyArgs),
}

#[derive(clap::Args, Debug)]
pub struct ListArgs {
    /// Re-fetch from the API even if already loaded this session
    #[arg(long)]
    pub refresh: bool,
}

#[derive(clap::Args, Debug)]
pub struct AddArgs {
    #[arg(long)]
    pub first_name: String,

    #[arg(long)]
    pub last_name: String,

    #[arg(long, short = 'e')]
    pub email: Option<String>,

    #[arg(long, short = 'p')]
    pub phone: Option<String>,

    #[arg(long)]
    pub position: Option<String>,

    /// Company id to attach the contact to
    #[arg(long, short = 'c')]
    pub company: Option<String>,
}

#[derive(clap::Args, Debug)]
pub struct RmArgs {
    /// Contact ID
    pub id: String,
}

#[derive(clap::Args, Debug)]
pub struct ByCompanyArgs {
    /// Company ID
    pub company_id: String,
}

pub fn run(cmd: ContactCommands, global: &GlobalOpts) -> Result<()> {
    match cmd {
        ContactCommands::List(args) => run_list(args, global),
        ContactCommands::Add(args) => run_add(args, global),
        ContactCommands::Rm(args) => run_rm(args, global),
        ContactCommands::ByCompany(args) => run_by_company(args, global),
    }
}

fn run_list(args: ListArgs, global: &GlobalOpts) -> Result<()> {
    let store = open_store(global)?;
    let cancel = CancelFlag::new();
    // Companies first so contact rows can show the company snapshot
    store.fetch_companies(&cancel).into_diagnostic()?;
    if args.refresh {
        store.refresh_contacts(&cancel).into_diagnostic()?;
    } else {
        store.fetch_contacts(&cancel).into_diagnostic()?;
    }

    let contacts = store.contacts();
    if contacts.is_empty() {
        println!("No contacts found.");
        return Ok(());
    }
    print_table(
        &["ID", "Name", "Email", "Phone", "Company"],
        contacts.iter().map(contact_row),
    );
    if !global.quiet {
        println!("{} contact(s)", contacts.len());
    }
    Ok(())
}

fn contact_row(contact: &Contact) -> Vec<String> {
    let company = contact
        .company
        .as_ref()
        .map(|c| c.name.clone())
        .or_else(|| contact.company_id.clone());
    vec![
        truncate_str(&contact.id, 16),
        contact.full_name(),
        opt_cell(contact.email.as_deref()),
        opt_cell(contact.phone.as_deref()),
        opt_cell(company.as_deref()),
    ]
}

fn run_add(args: AddArgs, global: &GlobalOpts) -> Result<()> {
    let store = open_store(global)?;
    let cancel = CancelFlag::new();
    store.fetch_companies(&cancel).into_diagnostic()?;

    let draft = Contact {
        first_name: args.first_name,
        last_name: args.last_name,
        email: args.email,
        phone: args.phone,
        position: args.position,
        company_id: args.company,
        ..Default::default()
    };
    let created = store.add_contact(&draft).into_diagnostic()?;
    println!(
        "{} Created contact {} ({})",
        style("✓").green(),
        style(created.full_name()).bold(),
        created.id
    );
    Ok(())
}

fn run_rm(args: RmArgs, global: &GlobalOpts) -> Result<()> {
    let store = open_store(global)?;
    store.remove_contact(&args.id).into_diagnostic()?;
    println!("{} Deleted contact {}", style("✓").green(), args.id);
    Ok(())
}

fn run_by_company(args: ByCompanyArgs, global: &GlobalOpts) -> Result<()> {
    let store = open_store(global)?;
    let cancel = CancelFlag::new();
    store
        .select_company(Some(&args.company_id), &cancel)
        .into_diagnostic()?;

    let related = store.related_contacts();
    if related.is_empty() {
        println!("No contacts for company {}.", args.company_id);
        return Ok(());
    }
    print_table(
        &["ID", "Name", "Email", "Position"],
        related.iter().map(|c| {
            vec![
                truncate_str(&c.id, 16),
                c.full_name(),
                opt_cell(c.email.as_deref()),
                opt_cell(c.position.as_deref()),
            ]
        }),
    );
    Ok(())
}
