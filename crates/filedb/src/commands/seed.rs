//! `filedb seed` command implementation.
//!
//! Writes a small `users` collection and reads it back, as a smoke test of
//! a fresh store.

use clap::Args;
use filedb_store::{Driver, JsonCodec};
use serde::{Deserialize, Serialize};

use super::StoreArgs;
use crate::error::CliError;
use crate::output::Output;

/// Collection the sample users are written to.
const USERS: &str = "users";

/// Postal address of a sample user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub(crate) struct Address {
    pub city: String,
    pub state: String,
    pub country: String,
    pub pin_code: u32,
}

/// Sample user record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub(crate) struct User {
    pub name: String,
    pub age: u32,
    pub contact: String,
    pub company: String,
    pub address: Address,
}

/// Arguments for the seed command.
#[derive(Args, Debug)]
pub(crate) struct SeedArgs {
    #[command(flatten)]
    pub store: StoreArgs,
}

impl SeedArgs {
    /// Execute the seed command.
    ///
    /// # Errors
    ///
    /// Returns an error if writing or reading back any record fails.
    pub(crate) fn execute(self, db: &Driver<JsonCodec>, output: &Output) -> Result<(), CliError> {
        let users = seed(db)?;

        output.highlight(&format!("{} users in {}", users.len(), db.root().display()));
        output.separator();
        for user in &users {
            output.info(&format!(
                "{} ({}) - {}, {}",
                user.name, user.age, user.company, user.address.city
            ));
        }
        Ok(())
    }
}

/// Write the sample users and return what the store holds afterwards.
pub(crate) fn seed(db: &Driver<JsonCodec>) -> Result<Vec<User>, CliError> {
    for user in sample_users() {
        db.write(USERS, &user.name, &user)?;
    }
    tracing::debug!("seeded {USERS} collection");
    Ok(db.read_all_as(USERS)?)
}

fn sample_users() -> Vec<User> {
    [
        ("Surya", "Josh Software"),
        ("Rahul", "Google"),
        ("Sai", "Microsoft"),
        ("Ritesh", "FaceBook"),
        ("Nitesh", "Remote"),
        ("Keerthi", "Tracxn"),
        ("Nisha", "Walmart"),
    ]
    .into_iter()
    .map(|(name, company)| User {
        name: name.to_owned(),
        age: 23,
        contact: "7068528089".to_owned(),
        company: company.to_owned(),
        address: Address {
            city: "Bengaluru".to_owned(),
            state: "Karnataka".to_owned(),
            country: "India".to_owned(),
            pin_code: 273_303,
        },
    })
    .collect()
}
