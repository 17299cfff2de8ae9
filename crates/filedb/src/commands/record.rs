//! `filedb write|read|read-all|delete` command implementations.

use clap::Args;
use filedb_store::{Driver, JsonCodec};
use serde_json::Value;

use super::StoreArgs;
use crate::error::CliError;
use crate::output::Output;

/// Arguments for the write command.
#[derive(Args, Debug)]
pub(crate) struct WriteArgs {
    #[command(flatten)]
    pub store: StoreArgs,

    /// Collection name.
    collection: String,

    /// Resource name (stored as `<resource>.json`).
    resource: String,

    /// Record as a JSON document.
    record: String,
}

impl WriteArgs {
    /// Execute the write command.
    ///
    /// # Errors
    ///
    /// Returns an error if the record is not valid JSON or the write fails.
    pub(crate) fn execute(self, db: &Driver<JsonCodec>, output: &Output) -> Result<(), CliError> {
        let record: Value = serde_json::from_str(&self.record)?;
        db.write(&self.collection, &self.resource, &record)?;
        output.success(&format!("Wrote {}/{}", self.collection, self.resource));
        Ok(())
    }
}

/// Arguments for the read command.
#[derive(Args, Debug)]
pub(crate) struct ReadArgs {
    #[command(flatten)]
    pub store: StoreArgs,

    /// Collection name.
    collection: String,

    /// Resource name.
    resource: String,
}

impl ReadArgs {
    /// Execute the read command, printing the record to stdout.
    ///
    /// # Errors
    ///
    /// Returns an error if the record is missing or cannot be decoded.
    pub(crate) fn execute(self, db: &Driver<JsonCodec>, output: &Output) -> Result<(), CliError> {
        let record: Value = db.read(&self.collection, &self.resource)?;
        let mut text = serde_json::to_string_pretty(&record)?;
        text.push('\n');
        output.record(&text);
        Ok(())
    }
}

/// Arguments for the read-all command.
#[derive(Args, Debug)]
pub(crate) struct ReadAllArgs {
    #[command(flatten)]
    pub store: StoreArgs,

    /// Collection name.
    collection: String,
}

impl ReadAllArgs {
    /// Execute the read-all command, printing every raw record to stdout.
    ///
    /// # Errors
    ///
    /// Returns an error if the collection is missing or a file can't be read.
    pub(crate) fn execute(self, db: &Driver<JsonCodec>, output: &Output) -> Result<(), CliError> {
        let records = db.read_all(&self.collection)?;
        for text in &records {
            output.record(text);
        }
        output.info(&format!(
            "{} record(s) in {}",
            records.len(),
            self.collection
        ));
        Ok(())
    }
}

/// Arguments for the delete command.
#[derive(Args, Debug)]
pub(crate) struct DeleteArgs {
    #[command(flatten)]
    pub store: StoreArgs,

    /// Collection name.
    collection: String,

    /// Resource name. Omit to delete the whole collection.
    resource: Option<String>,
}

impl DeleteArgs {
    /// Execute the delete command.
    ///
    /// # Errors
    ///
    /// Returns an error if nothing exists at the target or removal fails.
    pub(crate) fn execute(self, db: &Driver<JsonCodec>, output: &Output) -> Result<(), CliError> {
        let resource = self.resource.unwrap_or_default();
        db.delete(&self.collection, &resource)?;
        if resource.is_empty() {
            output.success(&format!("Deleted collection {}", self.collection));
        } else {
            output.success(&format!("Deleted {}/{resource}", self.collection));
        }
        Ok(())
    }
}
