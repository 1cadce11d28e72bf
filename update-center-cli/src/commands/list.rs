//! Listing commands.

use std::collections::BTreeSet;
use std::io::{self, Write};

use update_center::coord::Coordinate;
use update_center::repository::MavenRepository;

use crate::error::CliError;
use crate::runner::CliRunner;

/// Default group passed to the core listing.
pub const DEFAULT_CORE_GROUP: &str = "org.jenkins-ci.main";

/// Print every plugin coordinate, one per line.
pub fn run_plugins(runner: &CliRunner) -> Result<(), CliError> {
    runner.log_startup("plugins");
    let repository = runner.create_repository()?;
    print_coordinates(&repository.list_all_plugins()?)
}

/// Print every core coordinate, one per line.
pub fn run_wars(runner: &CliRunner, group: &str) -> Result<(), CliError> {
    runner.log_startup("wars");
    let repository = runner.create_repository()?;
    print_coordinates(&repository.list_all_wars(group)?)
}

fn print_coordinates(coordinates: &BTreeSet<Coordinate>) -> Result<(), CliError> {
    let stdout = io::stdout();
    let mut out = stdout.lock();
    write_coordinates(&mut out, coordinates).map_err(|e| CliError::FileWrite {
        path: "<stdout>".to_string(),
        error: e,
    })
}

fn write_coordinates(out: &mut impl Write, coordinates: &BTreeSet<Coordinate>) -> io::Result<()> {
    for coordinate in coordinates {
        writeln!(out, "{}", coordinate)?;
    }
    out.flush()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_write_coordinates_sorted() {
        let coordinates: BTreeSet<Coordinate> = [
            Coordinate::plugin("org.example", "zeta", "1.0"),
            Coordinate::plugin("org.example", "alpha", "2.0"),
        ]
        .into_iter()
        .collect();

        let mut out = Vec::new();
        write_coordinates(&mut out, &coordinates).unwrap();
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "org.example:alpha:2.0:hpi\norg.example:zeta:1.0:hpi\n"
        );
    }
}
