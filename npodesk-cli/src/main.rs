//! npodesk CLI — query the nonprofit filings platform from the terminal.
//!
//! Commands:
//! - `options` — list available years, months, states, or cities
//! - `fields` — show the exportable field catalog, grouped by category
//! - `screen` — run the screening step of a query config and preview candidates
//! - `run` — execute a query config end-to-end and save run artifacts
//!
//! `--offline` swaps the hosted backend for the built-in sample dataset.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};

use npodesk_core::backend::{BackendGateway, FixtureGateway, HttpGateway, OutageGuard};
use npodesk_core::domain::month_name;
use npodesk_runner::{run_query, run_screening, save_artifacts, QueryConfig};

#[derive(Parser)]
#[command(
    name = "npodesk",
    about = "npodesk CLI — guided queries over nonprofit financial filings"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

/// Connection options shared by every command.
#[derive(Args)]
struct Connection {
    /// Backend base URL.
    #[arg(long, default_value = "http://localhost:8000")]
    base_url: String,

    /// Use the built-in sample dataset instead of the hosted backend.
    #[arg(long, default_value_t = false)]
    offline: bool,
}

impl Connection {
    fn gateway(&self) -> Box<dyn BackendGateway> {
        if self.offline {
            Box::new(FixtureGateway::sample())
        } else {
            let guard = Arc::new(OutageGuard::default_backend());
            Box::new(HttpGateway::new(self.base_url.clone(), guard))
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// List available option values for a query dimension.
    Options {
        #[command(subcommand)]
        kind: OptionsCommand,
    },
    /// Show the exportable field catalog, grouped by category.
    Fields {
        #[command(flatten)]
        connection: Connection,
    },
    /// Run the screening step of a query config and preview the candidates.
    Screen {
        /// Path to a query config TOML file.
        #[arg(long)]
        config: PathBuf,

        #[command(flatten)]
        connection: Connection,
    },
    /// Execute a query config end-to-end and save run artifacts.
    Run {
        /// Path to a query config TOML file.
        #[arg(long)]
        config: PathBuf,

        /// Output directory for run artifacts.
        #[arg(long, default_value = "runs")]
        output_dir: PathBuf,

        #[command(flatten)]
        connection: Connection,
    },
}

#[derive(Subcommand)]
enum OptionsCommand {
    /// Fiscal years with filings.
    Years {
        #[command(flatten)]
        connection: Connection,
    },
    /// Fiscal ending months available for a year.
    Months {
        #[arg(long)]
        year: i32,

        #[command(flatten)]
        connection: Connection,
    },
    /// States with filings in a year.
    States {
        #[arg(long)]
        year: i32,

        #[command(flatten)]
        connection: Connection,
    },
    /// Cities with filings in a year and state.
    Cities {
        #[arg(long)]
        year: i32,

        #[arg(long)]
        state: String,

        #[command(flatten)]
        connection: Connection,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Options { kind } => run_options(kind),
        Commands::Fields { connection } => run_fields(&connection),
        Commands::Screen { config, connection } => run_screen(&config, &connection),
        Commands::Run {
            config,
            output_dir,
            connection,
        } => run_full(&config, &output_dir, &connection),
    }
}

fn run_options(kind: OptionsCommand) -> Result<()> {
    match kind {
        OptionsCommand::Years { connection } => {
            let years = connection.gateway().fiscal_years()?;
            for year in years {
                println!("FY {year}");
            }
        }
        OptionsCommand::Months { year, connection } => {
            let months = connection.gateway().fiscal_months(year)?;
            if months.is_empty() {
                println!("No ending months recorded for FY {year}.");
            }
            for month in months {
                match month_name(month) {
                    Some(name) => println!("{month:>2}  {name}"),
                    None => println!("{month:>2}"),
                }
            }
        }
        OptionsCommand::States { year, connection } => {
            for state in connection.gateway().states(year)? {
                println!("{state}");
            }
        }
        OptionsCommand::Cities {
            year,
            state,
            connection,
        } => {
            for city in connection.gateway().cities(year, &state)? {
                println!("{city}");
            }
        }
    }
    Ok(())
}

fn run_fields(connection: &Connection) -> Result<()> {
    let fields = connection.gateway().field_catalog()?;
    let catalog = npodesk_core::domain::FieldCatalog::new(fields);

    for category in catalog.categories() {
        println!("{category}");
        for field in catalog.fields_in(category) {
            println!("  {:<40} {}", field.name, field.display_name);
        }
        println!();
    }
    Ok(())
}

fn run_screen(config_path: &PathBuf, connection: &Connection) -> Result<()> {
    let config = QueryConfig::from_file(config_path)
        .with_context(|| format!("loading {}", config_path.display()))?;
    let gateway = connection.gateway();

    let candidates = run_screening(&config, gateway.as_ref())?;

    println!(
        "{:<12} {:<36} {:<18} {:<4}",
        "EIN", "Organization", "City", "St"
    );
    println!("{}", "-".repeat(72));
    for org in &candidates {
        println!(
            "{:<12} {:<36} {:<18} {:<4}",
            org.ein, org.name, org.city, org.state
        );
    }
    println!();
    println!("{} organizations matched.", candidates.len());
    Ok(())
}

fn run_full(config_path: &PathBuf, output_dir: &PathBuf, connection: &Connection) -> Result<()> {
    let config = QueryConfig::from_file(config_path)
        .with_context(|| format!("loading {}", config_path.display()))?;
    let gateway = connection.gateway();

    let outcome = run_query(&config, gateway.as_ref())?;

    println!();
    println!("=== Query Run ===");
    println!("Backend:        {}", gateway.name());
    println!("Fiscal Year:    {}", config.fiscal.year);
    if let Some(month) = config.fiscal.month {
        println!(
            "Ending Month:   {}",
            month_name(month).unwrap_or("(unknown)")
        );
    }
    println!("Candidates:     {}", outcome.candidates.len());
    println!("Confirmed:      {}", outcome.confirmed.len());
    println!("Fields:         {}", outcome.fields.len());
    println!("Format:         {}", outcome.format);
    println!("Payload:        {} bytes", outcome.payload.bytes.len());
    for warning in &outcome.warnings {
        println!("WARNING: {warning}");
    }

    let run_dir = save_artifacts(&outcome, &config, output_dir)?;
    println!("Artifacts saved to: {}", run_dir.display());

    Ok(())
}
