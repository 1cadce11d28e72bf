//! Catalog command - metadata for every listed artifact as JSON lines.

use std::io::{self, Write};

use clap::Args;
use update_center::batch::{BatchReport, BatchResolver};
use update_center::repository::MavenRepository;

use super::list::DEFAULT_CORE_GROUP;
use crate::error::CliError;
use crate::runner::CliRunner;

/// Arguments for the catalog command.
#[derive(Debug, Clone, Args)]
pub struct CatalogArgs {
    /// Worker threads (defaults to the config file, then the CPU count)
    #[arg(long)]
    pub threads: Option<usize>,

    /// Also include core web archives
    #[arg(long)]
    pub include_core: bool,
}

/// Run the catalog command.
pub fn run(runner: &CliRunner, args: CatalogArgs) -> Result<(), CliError> {
    runner.log_startup("catalog");
    let repository = runner.create_repository()?;

    let mut coordinates: Vec<_> = repository.list_all_plugins()?.into_iter().collect();
    if args.include_core {
        coordinates.extend(repository.list_all_wars(DEFAULT_CORE_GROUP)?);
    }

    let threads = args.threads.or(runner.config().batch.threads);
    let report = BatchResolver::new(&repository)
        .with_threads(threads)
        .resolve_all(&coordinates)?;

    let stdout = io::stdout();
    write_report(&mut stdout.lock(), &report)?;

    eprintln!(
        "{} resolved, {} without metadata, {} failed",
        report.entries.len(),
        report.missing.len(),
        report.failed.len()
    );
    for (coordinate, error) in &report.failed {
        eprintln!("  {}: {}", coordinate, error);
    }
    Ok(())
}

fn write_report(out: &mut impl Write, report: &BatchReport) -> Result<(), CliError> {
    let write_error = |e| CliError::FileWrite {
        path: "<stdout>".to_string(),
        error: e,
    };
    for entry in &report.entries {
        let line = serde_json::to_string(entry)?;
        writeln!(out, "{}", line).map_err(write_error)?;
    }
    out.flush().map_err(write_error)
}

#[cfg(test)]
mod tests {
    use super::*;
    use update_center::batch::CatalogEntry;
    use update_center::repository::ArtifactMetadata;

    #[test]
    fn test_write_report_json_lines() {
        let report = BatchReport {
            entries: vec![CatalogEntry {
                coordinate: "org.example:foo:1.0:hpi".to_string(),
                metadata: ArtifactMetadata {
                    sha1: "qg==".to_string(),
                    sha256: "uw==".to_string(),
                    timestamp: 5,
                    size: 42,
                },
            }],
            ..Default::default()
        };

        let mut out = Vec::new();
        write_report(&mut out, &report).unwrap();

        let text = String::from_utf8(out).unwrap();
        assert_eq!(text.lines().count(), 1);
        let value: serde_json::Value = serde_json::from_str(text.trim()).unwrap();
        assert_eq!(value["coordinate"], "org.example:foo:1.0:hpi");
        assert_eq!(value["size"], 42);
    }
}
