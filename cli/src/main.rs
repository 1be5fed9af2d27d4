use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use log::{debug, info};
use std::path::PathBuf;

use labreport_core::LabConfig;

mod commands;
mod display;

#[derive(Parser, Debug)]
#[clap(author, version, about = "Browse lab test databases and build PDF test reports")]
struct Args {
    /// Config file path
    #[clap(short, long, env = "LABREPORT_CONFIG")]
    config: Option<String>,

    /// Directory reports are written to
    #[clap(long, env = "LABREPORT_REPORTS_DIR")]
    reports_dir: Option<PathBuf>,

    /// Directory holding logos and the header info file
    #[clap(long, env = "LABREPORT_RESOURCES_DIR")]
    resources_dir: Option<PathBuf>,

    /// Directory of local test databases
    #[clap(long, env = "LABREPORT_DATABASES_DIR")]
    databases_dir: Option<PathBuf>,

    /// Log level when RUST_LOG is not set
    #[clap(long, env = "LABREPORT_LOG_LEVEL")]
    log_level: Option<String>,

    #[clap(subcommand)]
    command: Command,
}

/// Test selection shared by the per-test commands
#[derive(clap::Args, Debug)]
struct TestArgs {
    /// Test database
    db: PathBuf,

    /// Test identifier
    #[clap(long)]
    id: String,

    /// Test type (DSC_OIT, MFI, VICAT); inferred from the file name if omitted
    #[clap(long = "type")]
    test_type: Option<String>,

    /// Line number, required for VICAT
    #[clap(long)]
    line: Option<i64>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List known databases and the roles of their tables
    Tables {
        /// Databases to inspect; defaults to the databases directory
        dbs: Vec<PathBuf>,
    },

    /// Show the summary tables of a database
    Browse {
        /// Test database
        db: PathBuf,

        /// Only rows whose id contains this text
        #[clap(long)]
        id: Option<String>,

        /// Only rows of this day (yyyy-mm-dd)
        #[clap(long)]
        date: Option<String>,
    },

    /// Show the detail rows of one test
    Details(TestArgs),

    /// Build the PDF report of one test
    Report {
        #[clap(flatten)]
        test: TestArgs,

        /// Output file name inside the reports directory
        #[clap(short, long)]
        output: Option<String>,
    },

    /// Export the smoothed charts of one test as PNG images
    Plot {
        #[clap(flatten)]
        test: TestArgs,

        /// Directory for the images
        #[clap(long, default_value = "plots")]
        out_dir: PathBuf,
    },

    /// Fetch a database from a lab machine
    Fetch {
        /// Remote file path
        remote: String,

        /// Host; omit to use a saved credential
        #[clap(long)]
        host: Option<String>,

        /// User name
        #[clap(long)]
        user: Option<String>,

        /// Password
        #[clap(long, env = "LABREPORT_PASSWORD", hide_env_values = true)]
        password: Option<String>,

        /// Index of a saved credential
        #[clap(long)]
        saved: Option<usize>,

        /// Save the given credential for later use
        #[clap(long)]
        save: bool,
    },

    /// Export a raw material summary as text or QR code
    Material {
        /// Raw material
        #[clap(long)]
        raw: String,

        /// Component as name:percent:supplier, repeatable
        #[clap(long = "component")]
        components: Vec<String>,

        /// Manufacturing date
        #[clap(long)]
        date: String,

        /// Write the summary to this text file
        #[clap(long)]
        txt: Option<PathBuf>,

        /// Write the summary as a QR code PNG
        #[clap(long)]
        qr: Option<PathBuf>,
    },
}

fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    // Parse command-line arguments
    let args = Args::parse();

    // Load configuration
    let mut config = LabConfig::new();
    if let Some(config_path) = &args.config {
        config = LabConfig::from_file(config_path)
            .with_context(|| format!("failed to load config {}", config_path))?;
    }

    // Override config with command-line arguments
    if let Some(reports_dir) = args.reports_dir {
        config.report.reports_dir = reports_dir;
    }
    if let Some(resources_dir) = args.resources_dir {
        config.report.resources_dir = resources_dir;
    }
    if let Some(databases_dir) = args.databases_dir {
        config.client.databases_dir = databases_dir;
    }
    if let Some(log_level) = args.log_level {
        config.log_level = log_level;
    }

    // Initialize logging
    env_logger::init_from_env(
        env_logger::Env::default().filter_or(env_logger::DEFAULT_FILTER_ENV, config.log_level.as_str()),
    );
    debug!("Using configuration {:?}", config);

    match args.command {
        Command::Tables { dbs } => commands::tables(&config, &dbs),
        Command::Browse { db, id, date } => commands::browse(&db, id.as_deref(), date.as_deref()),
        Command::Details(test) => commands::details(&config, &test),
        Command::Report { test, output } => {
            let path = commands::report(&config, &test, output.as_deref())?;
            info!("Report ready");
            println!("{}", path.display());
            Ok(())
        }
        Command::Plot { test, out_dir } => commands::plot(&config, &test, &out_dir),
        Command::Fetch {
            remote,
            host,
            user,
            password,
            saved,
            save,
        } => commands::fetch(&config, &remote, host, user, password, saved, save),
        Command::Material {
            raw,
            components,
            date,
            txt,
            qr,
        } => commands::material(&raw, &components, &date, txt.as_deref(), qr.as_deref()),
    }
}
