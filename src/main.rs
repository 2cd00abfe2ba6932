// Entrypoint for the importer.
// - Parses flags, fills in missing credentials and loads the CSV.
// - Every failure ends up as a single "Error: ..." line and exit code 1.

use anyhow::{Context, Result};
use clap::{ArgAction, Parser};
use mio_resource_importer::api::ApiClient;
use mio_resource_importer::config::{Credentials, RunConfig, RunFlags};
use mio_resource_importer::csv_loader::CsvTable;
use mio_resource_importer::importer::Importer;
use mio_resource_importer::logging;
use mio_resource_importer::ui::{self, ProvidedCredentials};
use mio_resource_importer::validation::ResourceType;
use std::path::PathBuf;
use std::process::ExitCode;

/// Create MIO storage, folder and inbox resources from a CSV file.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None, disable_version_flag = true)]
struct Cli {
    /// Print version
    #[arg(short = 'v', long = "version", action = ArgAction::Version)]
    version: Option<bool>,

    /// MIO base URL, e.g. https://mio.example.com
    #[arg(short = 'u', long, env = "MIO_URL")]
    url: Option<String>,

    /// API username
    #[arg(short = 'U', long, env = "MIO_USERNAME")]
    username: Option<String>,

    /// API password
    #[arg(short = 'P', long, env = "MIO_PASSWORD", hide_env_values = true)]
    password: Option<String>,

    /// Show what would be created without calling the API
    #[arg(short = 'd', long)]
    dry_run: bool,

    /// Print request payloads and responses
    #[arg(short = 'V', long)]
    verbose: bool,

    /// Skip remote existence and dependency checks
    #[arg(short = 's', long)]
    skip_validation: bool,

    /// Create resources even if one with the same name exists
    #[arg(short = 'f', long)]
    force: bool,

    /// CSV file describing the resources
    csv: Option<PathBuf>,
}

fn init_tracing(verbose: bool) {
    let rust_log = std::env::var("RUST_LOG").ok();
    tracing_subscriber::fmt()
        .with_env_filter(logging::env_filter(verbose, rust_log.as_deref()))
        .with_target(false)
        .with_writer(std::io::stdout)
        .init();
}

fn run(cli: Cli) -> Result<()> {
    let csv_path = cli
        .csv
        .context("missing CSV path, usage: mio-resource-importer [options] <csv-path>")?;
    let table = CsvTable::load(&csv_path)?;

    let (url, username, password) = ui::complete_credentials(ProvidedCredentials {
        url: cli.url,
        username: cli.username,
        password: cli.password,
    })?;
    let flags = RunFlags {
        dry_run: cli.dry_run,
        verbose: cli.verbose,
        skip_validation: cli.skip_validation,
        force: cli.force,
    };
    let config = RunConfig::new(&url, Credentials::new(&username, &password), flags);
    let api = ApiClient::new(&config).context("Failed to build HTTP client")?;

    if flags.dry_run {
        ui::warning("Dry run: nothing will be created");
    }
    let ctx = Importer::new(&config, &api).run(&table)?;

    ui::heading("Summary");
    for resource_type in ResourceType::ALL {
        let pass = ctx.summary.pass(resource_type);
        let done = if flags.dry_run {
            format!("{} planned", pass.planned)
        } else {
            format!("{} created", pass.created)
        };
        println!(
            "  {:<8} {}, {} skipped, {} failed, {} failed steps",
            resource_type, done, pass.skipped, pass.failed, pass.step_failures
        );
    }
    if ctx.summary.total_failed() > 0 {
        ui::warning("Import completed with errors");
    } else {
        ui::success("Import completed successfully");
    }
    Ok(())
}

fn main() -> ExitCode {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) if e.use_stderr() => {
            print!("{}", e.render());
            return ExitCode::from(1);
        }
        Err(e) => {
            // Help and version are not errors.
            let _ = e.print();
            return ExitCode::SUCCESS;
        }
    };
    init_tracing(cli.verbose);

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            println!("Error: {:#}", e);
            ExitCode::from(1)
        }
    }
}
