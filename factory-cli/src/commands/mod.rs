//! Subcommand handlers.

use anyhow::{Context, Result};
use std::fs;
use std::path::Path;
use std::process::ExitCode;

use factory_loader::{Devfile, RawSource, ResourcePair};

use crate::cli::{Args, Command, SourceFile};

mod id;
mod prepare;
mod simulate;

pub async fn execute_command(args: Args) -> Result<ExitCode> {
    match args.command {
        Command::Id { query } => id::handle_id(&query).map(|()| ExitCode::SUCCESS),
        Command::Prepare {
            query,
            source,
            append_suffix,
        } => prepare::handle_prepare(&query, &source, append_suffix).map(|()| ExitCode::SUCCESS),
        Command::Simulate {
            query,
            source,
            existing,
            config,
            on_conflict,
        } => {
            simulate::handle_simulate(
                &query,
                &source,
                existing.as_deref(),
                config.as_deref(),
                on_conflict,
            )
            .await
        }
    }
}

fn read(path: &Path) -> Result<String> {
    fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))
}

/// Load the raw source named on the command line.
pub(crate) fn load_source(source: &SourceFile) -> Result<RawSource> {
    if let Some(path) = &source.devfile {
        let devfile: Devfile = serde_yaml_ng::from_str(&read(path)?)
            .with_context(|| format!("Invalid devfile {}", path.display()))?;
        return Ok(RawSource::Devfile(devfile));
    }
    if let Some(path) = &source.resources {
        let pair = ResourcePair::from_yaml(&read(path)?)
            .with_context(|| format!("Invalid resources {}", path.display()))?;
        return Ok(RawSource::Resources(pair));
    }
    anyhow::bail!("Either --devfile or --resources is required")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use tempfile::TempDir;

    #[test]
    fn test_load_devfile_source() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("devfile.yaml");
        fs::write(&path, "schemaVersion: 2.2.0\nmetadata:\n  name: demo\n").unwrap();

        let source = SourceFile {
            devfile: Some(path),
            resources: None,
        };
        let raw = load_source(&source).unwrap();
        assert_eq!(raw.candidate_name(), Some("demo"));
    }

    #[test]
    fn test_missing_file_names_the_path() {
        let source = SourceFile {
            devfile: Some(PathBuf::from("/nonexistent/devfile.yaml")),
            resources: None,
        };
        let error = load_source(&source).unwrap_err();
        assert!(format!("{error:#}").contains("/nonexistent/devfile.yaml"));
    }
}
