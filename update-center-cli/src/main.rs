//! update-center CLI - Command-line interface
//!
//! Drives the update-center library against a Nexus repository: list plugin
//! and core artifacts, inspect one artifact, or emit catalog metadata.
//!
//! Credentials are read from `NXRM_USERNAME` and `NXRM_PASSWORD`.

mod commands;
mod error;
mod runner;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use commands::catalog::CatalogArgs;
use commands::list::DEFAULT_CORE_GROUP;
use error::CliError;
use runner::{CliRunner, GlobalOptions};

#[derive(Parser)]
#[command(name = "update-center")]
#[command(version = update_center::VERSION)]
#[command(about = "Resolve plugin and core artifact metadata from a Nexus repository", long_about = None)]
struct Cli {
    #[command(flatten)]
    global: GlobalOptions,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List all plugin archives
    Plugins,

    /// List all core web archives
    Wars {
        /// Group of the core artifact
        #[arg(long, default_value = DEFAULT_CORE_GROUP)]
        group: String,
    },

    /// Show checksums, timestamp and size of an artifact
    Metadata {
        /// Coordinate as group:artifact:version[:packaging]
        coordinate: String,
    },

    /// Show the manifest embedded in an artifact
    Manifest {
        /// Coordinate as group:artifact:version[:packaging]
        coordinate: String,
    },

    /// Obtain an artifact, from the local repository when present
    Resolve {
        /// Coordinate as group:artifact:version[:packaging]
        coordinate: String,

        /// Copy the artifact to this path
        #[arg(long, short)]
        output: Option<PathBuf>,
    },

    /// Emit metadata for every listed artifact as JSON lines
    Catalog(CatalogArgs),
}

fn main() {
    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        e.exit();
    }
}

fn run(cli: Cli) -> Result<(), CliError> {
    let runner = CliRunner::new(cli.global)?;

    match cli.command {
        Commands::Plugins => commands::list::run_plugins(&runner),
        Commands::Wars { group } => commands::list::run_wars(&runner, &group),
        Commands::Metadata { coordinate } => commands::artifact::run_metadata(&runner, &coordinate),
        Commands::Manifest { coordinate } => commands::artifact::run_manifest(&runner, &coordinate),
        Commands::Resolve { coordinate, output } => {
            commands::artifact::run_resolve(&runner, &coordinate, output.as_deref())
        }
        Commands::Catalog(args) => commands::catalog::run(&runner, args),
    }
}
