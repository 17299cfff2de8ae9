//! Embedded document store for filedb.
//!
//! Records are persisted as individual JSON files, grouped into collections
//! (directories) under a root directory:
//!
//! ```text
//! {root}/{collection}/{resource}.json
//! ```
//!
//! # Architecture
//!
//! The crate provides:
//! - [`Driver`] with `write()`, `read()`, `read_all()` and `delete()`
//! - [`LockRegistry`] serializing writes and deletes per collection
//! - [`Codec`] / [`JsonCodec`] for record (de)serialization
//! - [`Logger`] / [`TracingLogger`] for injected diagnostics
//!
//! # Example
//!
//! ```no_run
//! use filedb_store::Driver;
//! use serde::{Deserialize, Serialize};
//!
//! #[derive(Serialize, Deserialize)]
//! struct User {
//!     name: String,
//!     age: u32,
//! }
//!
//! let db = Driver::open("./data")?;
//! db.write("users", "alice", &User { name: "Alice".into(), age: 30 })?;
//! let users: Vec<User> = db.read_all_as("users")?;
//! db.delete("users", "alice")?;
//! # Ok::<(), filedb_store::StoreError>(())
//! ```

mod codec;
mod driver;
mod error;
mod logger;
mod registry;

pub use codec::{Codec, DEFAULT_INDENT, JsonCodec};
pub use driver::{Driver, Options, RECORD_EXTENSION, STAGING_SUFFIX};
pub use error::{CodecError, CodecErrorKind, Result, StoreError, StoreErrorKind};
pub use logger::{Level, Logger, NullLogger, TracingLogger};
pub use registry::{CollectionLock, LockRegistry};
