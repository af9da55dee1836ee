// CLI argument parsing and definitions

use clap::{Args as ClapArgs, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Debug, Clone, Parser)]
#[command(name = "factory-loader")]
#[command(about = "Inspect and simulate workspace creation from factory links")]
#[command(version)]
pub struct Args {
    #[command(subcommand)]
    pub command: Command,
}

/// Where the raw source comes from. Exactly one is required.
#[derive(Debug, Clone, ClapArgs)]
#[group(required = true, multiple = false)]
pub struct SourceFile {
    /// Devfile YAML standing in for the resolved repository devfile
    #[arg(long)]
    pub devfile: Option<PathBuf>,

    /// Multi-document YAML with a workspace and its template
    #[arg(long)]
    pub resources: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OnConflict {
    OpenExisting,
    CreateNew,
}

#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Show the factory id and parsed parameters of a query
    Id {
        /// Factory query string, e.g. "url=https://github.com/org/repo&policies.create=perclick"
        query: String,
    },

    /// Print the resource that would be submitted for a query
    Prepare {
        /// Factory query string
        query: String,

        #[command(flatten)]
        source: SourceFile,

        /// Append a random suffix to the workspace name
        #[arg(long)]
        append_suffix: bool,
    },

    /// Run the whole pipeline against in-memory collaborators
    Simulate {
        /// Factory query string
        query: String,

        #[command(flatten)]
        source: SourceFile,

        /// YAML list of workspaces that already exist
        #[arg(long)]
        existing: Option<PathBuf>,

        /// Loader configuration file (defaults to environment variables)
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Answer to a conflict prompt; without it the run stops at the prompt
        #[arg(long, value_enum)]
        on_conflict: Option<OnConflict>,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_args_are_consistent() {
        Args::command().debug_assert();
    }

    #[test]
    fn test_prepare_requires_a_source() {
        let result = Args::try_parse_from(["factory-loader", "prepare", "url=https://a"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_sources_are_exclusive() {
        let result = Args::try_parse_from([
            "factory-loader",
            "prepare",
            "url=https://a",
            "--devfile",
            "devfile.yaml",
            "--resources",
            "resources.yaml",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_simulate_arguments() {
        let args = Args::try_parse_from([
            "factory-loader",
            "simulate",
            "url=https://a",
            "--devfile",
            "devfile.yaml",
            "--existing",
            "existing.yaml",
            "--on-conflict",
            "create-new",
        ])
        .unwrap();
        match args.command {
            Command::Simulate {
                source,
                existing,
                config,
                on_conflict,
                ..
            } => {
                assert_eq!(source.devfile, Some(PathBuf::from("devfile.yaml")));
                assert_eq!(existing, Some(PathBuf::from("existing.yaml")));
                assert!(config.is_none());
                assert_eq!(on_conflict, Some(OnConflict::CreateNew));
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }
}
