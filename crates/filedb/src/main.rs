//! filedb CLI - embedded JSON document store.
//!
//! Provides commands for:
//! - `write`: Store a JSON record
//! - `read`: Print a record
//! - `read-all`: Print every record of a collection
//! - `delete`: Remove a record or a whole collection
//! - `seed`: Populate a `users` collection with sample data

mod commands;
mod error;
mod output;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use commands::{DeleteArgs, ReadAllArgs, ReadArgs, SeedArgs, StoreArgs, WriteArgs};
use error::CliError;
use output::Output;

/// filedb - embedded JSON document store.
#[derive(Parser)]
#[command(name = "filedb", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Store a JSON record as <collection>/<resource>.json.
    Write(WriteArgs),
    /// Print a record.
    Read(ReadArgs),
    /// Print the raw text of every record in a collection.
    ReadAll(ReadAllArgs),
    /// Delete a record, or a whole collection when no resource is given.
    Delete(DeleteArgs),
    /// Write sample users and read them back.
    Seed(SeedArgs),
}

impl Commands {
    fn store_args(&self) -> &StoreArgs {
        match self {
            Self::Write(args) => &args.store,
            Self::Read(args) => &args.store,
            Self::ReadAll(args) => &args.store,
            Self::Delete(args) => &args.store,
            Self::Seed(args) => &args.store,
        }
    }
}

fn main() {
    let cli = Cli::parse();
    let output = Output::new();

    if let Err(err) = run(cli, &output) {
        output.error(&format!("Error: {err}"));
        std::process::exit(1);
    }
}

fn run(cli: Cli, output: &Output) -> Result<(), CliError> {
    let store_args = cli.command.store_args();
    let config = store_args.load_config()?;

    // --verbose forces DEBUG, otherwise use RUST_LOG or fall back to log.level
    let filter = if store_args.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log.level))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    if let Some(path) = &config.config_path {
        tracing::debug!("using config {}", path.display());
    }
    let db = commands::open_driver(&config)?;

    match cli.command {
        Commands::Write(args) => args.execute(&db, output),
        Commands::Read(args) => args.execute(&db, output),
        Commands::ReadAll(args) => args.execute(&db, output),
        Commands::Delete(args) => args.execute(&db, output),
        Commands::Seed(args) => args.execute(&db, output),
    }
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use clap::CommandFactory;

    use super::*;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_write() {
        let cli = Cli::try_parse_from([
            "filedb",
            "write",
            "--root",
            "/tmp/db",
            "users",
            "alice",
            r#"{"name": "Alice"}"#,
        ])
        .unwrap();

        assert!(matches!(cli.command, Commands::Write(_)));
        assert!(!cli.command.store_args().verbose);
    }

    #[test]
    fn test_parse_delete_without_resource() {
        let cli = Cli::try_parse_from(["filedb", "delete", "-v", "users"]).unwrap();

        assert!(cli.command.store_args().verbose);
        assert!(matches!(cli.command, Commands::Delete(_)));
    }

    #[test]
    fn test_parse_read_requires_resource() {
        assert!(Cli::try_parse_from(["filedb", "read", "users"]).is_err());
    }

    #[test]
    fn test_root_flag_overrides_config() {
        let tmp = tempfile::TempDir::new().unwrap();
        let config_path = tmp.path().join("filedb.toml");
        std::fs::write(&config_path, "[store]\nroot = \"from-file\"\n").unwrap();
        let config_arg = config_path.to_string_lossy().into_owned();

        let cli = Cli::try_parse_from([
            "filedb",
            "read-all",
            "--config",
            config_arg.as_str(),
            "--root",
            "/override",
            "users",
        ])
        .unwrap();
        let config = cli.command.store_args().load_config().unwrap();

        assert_eq!(config.store_resolved.root, Path::new("/override"));
    }
}
