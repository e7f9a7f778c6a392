//! Company directory CLI commands

use std::path::PathBuf;

use clap::Subcommand;

use super::load_directory;
use crate::config::{EtlPaths, Settings};
use crate::directory::CompanyDirectory;
use crate::display::format_company_list;
use crate::error::EtlResult;

/// Company subcommands
#[derive(Subcommand, Debug)]
pub enum CompaniesCommands {
    /// List every company in the directory
    List {
        /// Directory CSV (defaults to the configured file)
        #[arg(short, long)]
        directory: Option<PathBuf>,
    },
    /// Show the RUT registered for a company name
    Lookup {
        /// Company name as it appears in the directory
        name: String,
        /// Directory CSV (defaults to the configured file)
        #[arg(short, long)]
        directory: Option<PathBuf>,
    },
    /// Show the company registered for a RUT
    Name {
        /// RUT without dash or check digit separator
        rut: String,
        /// Directory CSV (defaults to the configured file)
        #[arg(short, long)]
        directory: Option<PathBuf>,
    },
}

/// Handle a companies command
pub fn handle_companies_command(
    paths: &EtlPaths,
    settings: &Settings,
    cmd: CompaniesCommands,
) -> EtlResult<()> {
    match cmd {
        CompaniesCommands::List { directory } => {
            let directory = load_directory(paths, settings, directory)?;
            print!("{}", format_company_list(&directory.list_company_names()));
            if directory.is_empty() {
                println!();
            }
        }
        CompaniesCommands::Lookup { name, directory } => {
            let directory = load_directory(paths, settings, directory)?;
            let rut = directory.resolve_company_tax_id(&name)?;
            println!("{}", rut);
        }
        CompaniesCommands::Name { rut, directory } => {
            let directory = load_directory(paths, settings, directory)?;
            let name = directory.company_name_for(&rut)?;
            println!("{}", name);
        }
    }

    Ok(())
}
