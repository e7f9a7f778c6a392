use anyhow::Result;
use clap::{Parser, Subcommand};

use ledger_etl::cli::{handle_companies_command, handle_extract_command, CompaniesCommands, ExtractArgs};
use ledger_etl::config::{EtlPaths, Settings};
use ledger_etl::logging::init_tracing;

#[derive(Parser)]
#[command(
    name = "ledger-etl",
    version,
    about = "Extract a company's general ledger into JSON and Excel",
    long_about = "ledger-etl pulls a company's general ledger from the accounting API \
                  month by month, from January through the chosen month, and exports \
                  the consolidated entries as JSON and Excel files."
)]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Extract and export a company's ledger
    Extract(ExtractArgs),

    /// Company directory commands
    #[command(subcommand)]
    Companies(CompaniesCommands),

    /// Write the default configuration file
    Init,

    /// Show current configuration and paths
    Config,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    // Initialize paths and settings
    let paths = EtlPaths::new()?;
    let settings = Settings::load_or_create(&paths)?;

    match cli.command {
        Some(Commands::Extract(args)) => {
            handle_extract_command(&paths, settings, args)?;
        }
        Some(Commands::Companies(cmd)) => {
            handle_companies_command(&paths, &settings, cmd)?;
        }
        Some(Commands::Init) => {
            println!("Initializing ledger-etl at: {}", paths.base_dir().display());
            settings.save(&paths)?;
            println!("Initialization complete!");
            println!();
            println!("Settings written to {}", paths.settings_file().display());
            println!(
                "Place the company directory export at {}",
                paths.directory_file().display()
            );
        }
        Some(Commands::Config) => {
            println!("ledger-etl Configuration");
            println!("========================");
            println!("Config directory:  {}", paths.base_dir().display());
            println!("Settings file:     {}", paths.settings_file().display());
            println!(
                "Initialized:       {}",
                if paths.is_initialized() { "yes" } else { "no (run 'ledger-etl init')" }
            );
            println!(
                "Company directory: {}",
                settings.directory_path(&paths).display()
            );
            println!(
                "Output directory:  {}",
                settings
                    .output_dir
                    .clone()
                    .unwrap_or_else(|| paths.exports_dir())
                    .display()
            );
            println!();
            println!("Settings:");
            println!("  API base URL:      {}", settings.api_base_url);
            println!("  Ledger kind:       {}", settings.ledger_kind);
            println!("  Page size:         {}", settings.page_size);
            println!("  Max pages/month:   {}", settings.max_pages);
            println!("  Request timeout:   {}s", settings.request_timeout_secs);
            println!("  Max attempts:      {}", settings.retry.max_attempts);
            println!("  Detail max chars:  {}", settings.detail_max_chars);
            println!("  Cost center:       {}", settings.cost_center_placeholder);
            println!("  Cache plan:        {}", settings.cache_account_plan);
            println!("  Pretty JSON:       {}", settings.pretty_json);
        }
        None => {
            println!("ledger-etl - general ledger extraction");
            println!();
            println!("Run 'ledger-etl --help' for usage information.");
            println!("Run 'ledger-etl extract --help' to export a company's ledger.");
        }
    }

    Ok(())
}
