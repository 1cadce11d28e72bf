//! Single-artifact commands: metadata, manifest and resolve.

use std::fs;
use std::io::{self, Write};
use std::path::Path;

use update_center::coord::Coordinate;
use update_center::manifest::Manifest;
use update_center::repository::MavenRepository;

use crate::error::CliError;
use crate::runner::CliRunner;

/// Print the metadata of one artifact as JSON.
pub fn run_metadata(runner: &CliRunner, coordinate: &str) -> Result<(), CliError> {
    runner.log_startup("metadata");
    let coordinate: Coordinate = coordinate.parse()?;
    let repository = runner.create_repository()?;

    match repository.get_metadata(&coordinate)? {
        Some(metadata) => println!("{}", serde_json::to_string_pretty(&metadata)?),
        None => eprintln!("No metadata available for {}", coordinate),
    }
    Ok(())
}

/// Print the manifest attributes of one artifact.
pub fn run_manifest(runner: &CliRunner, coordinate: &str) -> Result<(), CliError> {
    runner.log_startup("manifest");
    let coordinate: Coordinate = coordinate.parse()?;
    let repository = runner.create_repository()?;

    let manifest = repository.get_manifest(&coordinate)?;
    if manifest.is_empty() {
        eprintln!("{} has no manifest", coordinate);
        return Ok(());
    }

    let stdout = io::stdout();
    write_manifest(&mut stdout.lock(), &manifest).map_err(|e| CliError::FileWrite {
        path: "<stdout>".to_string(),
        error: e,
    })
}

/// Obtain the artifact bytes and print where they are.
///
/// With `output`, the artifact is copied there; otherwise a downloaded
/// artifact is kept at its temporary location.
pub fn run_resolve(
    runner: &CliRunner,
    coordinate: &str,
    output: Option<&Path>,
) -> Result<(), CliError> {
    runner.log_startup("resolve");
    let coordinate: Coordinate = coordinate.parse()?;
    let repository = runner.create_repository()?;

    let artifact = repository.resolve(&coordinate)?;
    let source = if artifact.is_local() { "local" } else { "remote" };

    match output {
        Some(output) => {
            fs::copy(artifact.path(), output).map_err(|e| CliError::FileWrite {
                path: output.display().to_string(),
                error: e,
            })?;
            println!("{} ({})", output.display(), source);
        }
        None => {
            let path = artifact.keep()?;
            println!("{} ({})", path.display(), source);
        }
    }
    Ok(())
}

fn write_manifest(out: &mut impl Write, manifest: &Manifest) -> io::Result<()> {
    for (name, value) in manifest.main_attributes() {
        writeln!(out, "{}: {}", name, value)?;
    }
    for section in manifest.section_names() {
        writeln!(out)?;
        writeln!(out, "[{}]", section)?;
        if let Some(attributes) = manifest.section(section) {
            for (name, value) in attributes {
                writeln!(out, "  {}: {}", name, value)?;
            }
        }
    }
    out.flush()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_write_manifest_main_and_sections() {
        let manifest = Manifest::parse(
            b"Manifest-Version: 1.0\nShort-Name: foo\n\nName: lib/a.jar\nDigest: abc\n",
        )
        .unwrap();

        let mut out = Vec::new();
        write_manifest(&mut out, &manifest).unwrap();
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "Manifest-Version: 1.0\nShort-Name: foo\n\n[lib/a.jar]\n  Digest: abc\n  Name: lib/a.jar\n"
        );
    }
}
