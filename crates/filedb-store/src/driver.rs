//! The storage driver.
//!
//! Maps `(collection, resource)` keys to files under a root directory:
//!
//! ```text
//! {root}/
//! +-- users/                 # collection "users"
//! |   +-- alice.json         # resource "alice"
//! |   +-- bob.json.tmp       # staging file of an in-flight write
//! +-- orders/
//!     +-- ...
//! ```
//!
//! Writes go to `<resource>.json.tmp` first and are renamed over
//! `<resource>.json`, so readers see either the previous record or the new
//! one in full. Writes and deletes hold the collection's lock from the
//! [`LockRegistry`]; reads take no lock.

use std::fmt;
use std::fs::{self, File, Metadata};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::codec::{Codec, JsonCodec};
use crate::error::{Result, StoreError};
use crate::logger::{Logger, TracingLogger};
use crate::registry::{self, LockRegistry};

/// File extension of resource files.
pub const RECORD_EXTENSION: &str = "json";

/// Suffix appended to a resource file name while a write is staged.
pub const STAGING_SUFFIX: &str = ".tmp";

/// Construction options for [`Driver::open_with`].
pub struct Options<C = JsonCodec> {
    /// Diagnostics sink. Defaults to [`TracingLogger`] at `INFO`.
    pub logger: Option<Arc<dyn Logger>>,
    /// Record codec.
    pub codec: C,
}

impl Default for Options<JsonCodec> {
    fn default() -> Self {
        Self::new(JsonCodec::default())
    }
}

impl<C> Options<C> {
    /// Options with the given codec and the default logger.
    #[must_use]
    pub fn new(codec: C) -> Self {
        Self {
            logger: None,
            codec,
        }
    }

    /// Use `logger` for diagnostics.
    #[must_use]
    pub fn with_logger(mut self, logger: Arc<dyn Logger>) -> Self {
        self.logger = Some(logger);
        self
    }

    /// Replace the codec.
    #[must_use]
    pub fn with_codec<D>(self, codec: D) -> Options<D> {
        Options {
            logger: self.logger,
            codec,
        }
    }
}

/// Embedded document store rooted at a directory.
///
/// `Driver` is `Send + Sync`; share it between threads by reference or
/// through an `Arc`.
///
/// # Example
///
/// ```no_run
/// use filedb_store::Driver;
/// use serde_json::{Value, json};
///
/// let db = Driver::open("./data")?;
/// db.write("users", "alice", &json!({"name": "Alice", "age": 30}))?;
/// let alice: Value = db.read("users", "alice")?;
/// assert_eq!(alice["age"], 30);
/// # Ok::<(), filedb_store::StoreError>(())
/// ```
pub struct Driver<C = JsonCodec> {
    root: PathBuf,
    locks: LockRegistry,
    log: Arc<dyn Logger>,
    codec: C,
}

impl Driver<JsonCodec> {
    /// Open a store at `root` with the default logger and JSON codec.
    ///
    /// See [`Driver::open_with`].
    pub fn open(root: impl Into<PathBuf>) -> Result<Self> {
        Self::open_with(root, Options::default())
    }
}

impl<C: Codec> Driver<C> {
    /// Open a store at `root`.
    ///
    /// An existing root is reused as is. A missing root is created, but only
    /// the last path component: missing parents are an error.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Io`] if the root directory cannot be created.
    pub fn open_with(root: impl Into<PathBuf>, options: Options<C>) -> Result<Self> {
        let root = root.into();
        let log = options
            .logger
            .unwrap_or_else(|| Arc::new(TracingLogger::default()));

        if root.exists() {
            log.debug(format_args!(
                "Using '{}' (database already exists)",
                root.display()
            ));
        } else {
            log.debug(format_args!("Creating new database '{}'", root.display()));
            match fs::create_dir(&root) {
                Ok(()) => log.info(format_args!("Created database '{}'", root.display())),
                // Another opener got there first. A dangling symlink also
                // reports AlreadyExists but leaves no usable directory.
                Err(e) if e.kind() == io::ErrorKind::AlreadyExists && root.is_dir() => {}
                Err(source) => return Err(StoreError::Io { path: root, source }),
            }
        }

        Ok(Self {
            root,
            locks: LockRegistry::new(),
            log,
            codec: options.codec,
        })
    }

    /// Root directory of the store.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Codec used for records.
    #[must_use]
    pub fn codec(&self) -> &C {
        &self.codec
    }

    /// Path of the file holding `resource` in `collection`.
    #[must_use]
    pub fn resource_path(&self, collection: &str, resource: &str) -> PathBuf {
        self.collection_dir(collection)
            .join(format!("{resource}.{RECORD_EXTENSION}"))
    }

    /// Store `record` as `resource` in `collection`, replacing any previous
    /// version.
    ///
    /// # Errors
    ///
    /// - [`StoreError::Validation`] if either name is empty; nothing on disk
    ///   is touched.
    /// - [`StoreError::Format`] if the codec rejects the record.
    /// - [`StoreError::Io`] if creating the collection directory, writing the
    ///   staging file or renaming it fails.
    pub fn write<T: Serialize + ?Sized>(
        &self,
        collection: &str,
        resource: &str,
        record: &T,
    ) -> Result<()> {
        require_name(collection, "collection is not present")?;
        require_name(resource, "resource is not present")?;

        let lock = self.locks.lock_for(collection);
        let _guard = registry::acquire(&lock);

        let dir = self.collection_dir(collection);
        let final_path = self.resource_path(collection, resource);
        let bytes = self
            .codec
            .encode(record)
            .map_err(|e| StoreError::format(e, &final_path))?;

        fs::create_dir_all(&dir).map_err(io_failure(&dir))?;

        let mut staging = StagingFile::new(staging_path(&final_path));
        self.log
            .debug(format_args!("Writing {}", final_path.display()));
        staging.write(&bytes)?;
        staging.commit(&final_path)
    }

    /// Load `resource` from `collection` and decode it as `T`.
    ///
    /// `resource` may name the file with or without its `.json` extension:
    /// an existing regular file at the bare name is read first, then
    /// `<resource>.json`.
    ///
    /// # Errors
    ///
    /// - [`StoreError::Validation`] if either name is empty.
    /// - [`StoreError::NotFound`] if no such resource exists.
    /// - [`StoreError::Format`] if the stored bytes are malformed or do not
    ///   fit `T`.
    /// - [`StoreError::Io`] for other filesystem failures.
    pub fn read<T: DeserializeOwned>(&self, collection: &str, resource: &str) -> Result<T> {
        require_name(collection, "missing collection")?;
        require_name(resource, "missing resource")?;

        let bare = self.collection_dir(collection).join(resource);
        let path = match resolve_existing(&bare)? {
            (path, meta) if meta.is_file() => path,
            _ => with_record_extension(&bare),
        };

        self.log.trace(format_args!("Reading {}", path.display()));
        let bytes = fs::read(&path).map_err(|e| StoreError::io(e, &path))?;
        self.codec
            .decode(&bytes)
            .map_err(|e| StoreError::format(e, &path))
    }

    /// Return the raw text of every record in `collection`.
    ///
    /// Records come back undecoded, in directory-listing order. Staging files
    /// (`*.json.tmp`) and subdirectories are skipped. An existing empty
    /// collection yields an empty vector. Every other file in the collection
    /// must hold UTF-8 text.
    ///
    /// # Errors
    ///
    /// - [`StoreError::Validation`] if `collection` is empty.
    /// - [`StoreError::NotFound`] if the collection directory does not exist,
    ///   or a file vanished between listing and reading.
    /// - [`StoreError::Io`] if listing or reading any file fails, including
    ///   a file that is not valid UTF-8 (`io::ErrorKind::InvalidData`).
    pub fn read_all(&self, collection: &str) -> Result<Vec<String>> {
        Ok(self
            .read_entries(collection)?
            .into_iter()
            .map(|(_, text)| text)
            .collect())
    }

    /// Like [`Driver::read_all`], decoding every record as `T`.
    ///
    /// # Errors
    ///
    /// Same as [`Driver::read_all`], plus [`StoreError::Format`] for the
    /// first record that fails to decode.
    pub fn read_all_as<T: DeserializeOwned>(&self, collection: &str) -> Result<Vec<T>> {
        self.read_entries(collection)?
            .into_iter()
            .map(|(path, text)| {
                self.codec
                    .decode(text.as_bytes())
                    .map_err(|e| StoreError::format(e, path))
            })
            .collect()
    }

    /// Remove `resource` from `collection`.
    ///
    /// An empty `resource` removes the whole collection directory. A resource
    /// that resolves to a directory is removed recursively. When `resource`
    /// names a regular file without its `.json` extension, `<resource>.json`
    /// is what gets removed, even if a bare file of that name exists.
    ///
    /// # Errors
    ///
    /// - [`StoreError::Validation`] if `collection` is empty.
    /// - [`StoreError::NotFound`] if nothing exists at the resolved path.
    /// - [`StoreError::Io`] if removal fails.
    pub fn delete(&self, collection: &str, resource: &str) -> Result<()> {
        require_name(collection, "missing collection")?;

        let lock = self.locks.lock_for(collection);
        let _guard = registry::acquire(&lock);

        let dir = self.collection_dir(collection);
        let target = if resource.is_empty() {
            fs::metadata(&dir).map_err(|e| StoreError::io(e, &dir))?;
            dir
        } else {
            let bare = dir.join(resource);
            match resolve_existing(&bare)? {
                // A bare file never shadows the record itself.
                (path, meta)
                    if meta.is_file() && path == bare && !has_record_extension(resource) =>
                {
                    with_record_extension(&bare)
                }
                (path, _) => path,
            }
        };

        self.log
            .debug(format_args!("Removing {}", target.display()));
        remove_all(&target).map_err(io_failure(&target))
    }

    fn collection_dir(&self, collection: &str) -> PathBuf {
        self.root.join(collection)
    }

    fn read_entries(&self, collection: &str) -> Result<Vec<(PathBuf, String)>> {
        require_name(collection, "missing collection")?;

        let dir = self.collection_dir(collection);
        let entries = fs::read_dir(&dir).map_err(|e| StoreError::io(e, &dir))?;

        let mut records = Vec::new();
        for entry in entries {
            let entry = entry.map_err(io_failure(&dir))?;
            let path = entry.path();
            if entry.file_type().is_ok_and(|t| t.is_dir()) || is_staging_file(&path) {
                continue;
            }
            let text = fs::read_to_string(&path).map_err(|e| StoreError::io(e, &path))?;
            records.push((path, text));
        }

        self.log.trace(format_args!(
            "Read {} record(s) from {}",
            records.len(),
            dir.display()
        ));
        Ok(records)
    }
}

impl<C: fmt::Debug> fmt::Debug for Driver<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Driver")
            .field("root", &self.root)
            .field("locks", &self.locks)
            .field("codec", &self.codec)
            .finish_non_exhaustive()
    }
}

/// Reject empty collection or resource names.
fn require_name(name: &str, message: &str) -> Result<()> {
    if name.is_empty() {
        return Err(StoreError::Validation(message.to_owned()));
    }
    Ok(())
}

/// Map an I/O error to [`StoreError::Io`] without reinterpreting its kind.
fn io_failure(path: &Path) -> impl FnOnce(io::Error) -> StoreError + '_ {
    move |source| StoreError::Io {
        path: path.to_path_buf(),
        source,
    }
}

/// Stat `path`, falling back to `path.json` when the bare path is missing.
///
/// This is the only place an initial "not found" is swallowed.
fn resolve_existing(path: &Path) -> Result<(PathBuf, Metadata)> {
    match fs::metadata(path) {
        Ok(meta) => Ok((path.to_path_buf(), meta)),
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            let suffixed = with_record_extension(path);
            match fs::metadata(&suffixed) {
                Ok(meta) => Ok((suffixed, meta)),
                Err(e) if e.kind() == io::ErrorKind::NotFound => {
                    Err(StoreError::NotFound(path.to_path_buf()))
                }
                Err(e) => Err(StoreError::io(e, suffixed)),
            }
        }
        Err(e) => Err(StoreError::io(e, path)),
    }
}

/// Append `.json` to the last path component (`alice` -> `alice.json`).
fn with_record_extension(path: &Path) -> PathBuf {
    let mut name = path.as_os_str().to_owned();
    name.push(".");
    name.push(RECORD_EXTENSION);
    PathBuf::from(name)
}

fn staging_path(final_path: &Path) -> PathBuf {
    let mut name = final_path.as_os_str().to_owned();
    name.push(STAGING_SUFFIX);
    PathBuf::from(name)
}

fn is_staging_file(path: &Path) -> bool {
    let suffix = format!(".{RECORD_EXTENSION}{STAGING_SUFFIX}");
    path.file_name()
        .and_then(|n| n.to_str())
        .is_some_and(|n| n.ends_with(&suffix))
}

fn has_record_extension(name: &str) -> bool {
    Path::new(name)
        .extension()
        .is_some_and(|e| e == RECORD_EXTENSION)
}

/// Remove a file or directory tree, re-checking its type at removal time.
///
/// A path that disappeared in the meantime counts as removed.
fn remove_all(path: &Path) -> io::Result<()> {
    let result = match fs::symlink_metadata(path) {
        Ok(meta) if meta.is_dir() => fs::remove_dir_all(path),
        Ok(_) => fs::remove_file(path),
        Err(e) => Err(e),
    };
    match result {
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
        other => other,
    }
}

/// Staging file for an atomic write.
///
/// Removed on drop unless [`StagingFile::commit`] renamed it into place, so
/// failed writes do not leave partial files behind when cleanup is possible.
struct StagingFile {
    path: PathBuf,
    armed: bool,
}

impl StagingFile {
    fn new(path: PathBuf) -> Self {
        Self { path, armed: true }
    }

    /// Write `bytes` and flush them to stable storage.
    fn write(&mut self, bytes: &[u8]) -> Result<()> {
        let mut file = File::create(&self.path).map_err(io_failure(&self.path))?;
        file.write_all(bytes).map_err(io_failure(&self.path))?;
        file.sync_all().map_err(io_failure(&self.path))
    }

    /// Atomically replace `final_path` with the staged contents.
    fn commit(mut self, final_path: &Path) -> Result<()> {
        fs::rename(&self.path, final_path).map_err(io_failure(final_path))?;
        self.armed = false;
        Ok(())
    }
}

impl Drop for StagingFile {
    fn drop(&mut self) {
        if self.armed {
            // Best effort: the write error is already being returned.
            let _ = fs::remove_file(&self.path);
        }
    }
}
