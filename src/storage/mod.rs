pub mod codec;
pub mod cursor;
pub mod names;

pub use codec::Body;
pub use cursor::{CursorState, Records};
pub use names::NameGenerator;

use std::{
    fmt,
    fs::{self, OpenOptions},
    io::{self, Write},
    path::{Path, PathBuf},
};

use log::{debug, info, warn};
use serde_json::Value;

use crate::{Error, Result};

/// Attempts at finding a free record name before giving up on an insert
const MAX_PUBLISH_ATTEMPTS: usize = 4;

pub trait RecordStore {
    type Records: Iterator<Item = Result<Record>>;

    /// Persists a new record
    ///
    /// # Params
    ///
    /// - `database`: Database the record belongs to; created if missing.
    /// - `payload`: JSON document to store.
    fn put(&self, database: &Database, payload: &Value) -> Result<RecordId>;

    /// Enumerates every record of a database
    ///
    /// # Params
    ///
    /// - `database`: Database to list. A database that does not exist lists
    ///   as empty.
    fn list_all(&self, database: &Database) -> Result<Self::Records>;
}

/// Name of a database; always a single path component.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Database(String);

impl Database {
    pub fn new(name: impl Into<String>) -> Result<Self> {
        let name = name.into();
        let valid = !name.is_empty()
            && name != "."
            && name != ".."
            && !name.contains(['/', '\\', '\0']);

        if valid {
            Ok(Self(name))
        } else {
            Err(Error::InvalidDatabase(name))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Database {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Identifier of a record, which is also its file name
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RecordId(String);

impl RecordId {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    pub id: RecordId,
    pub body: Body,
}

/// Record store keeping one directory per database under a root directory.
///
/// Records are create-only files, so concurrent writers never touch each
/// other's data and readers never see a half written record.
#[derive(Debug)]
pub struct Storage {
    root: PathBuf,
    names: NameGenerator,
}

impl Storage {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            names: NameGenerator::new(),
        }
    }

    pub fn database_dir(&self, database: &Database) -> PathBuf {
        self.root.join(database.as_str())
    }

    pub fn record_path(&self, database: &Database, id: &RecordId) -> PathBuf {
        self.database_dir(database).join(id.as_str())
    }

    /// Writes `bytes` to a hidden temp file and links it under the record's
    /// final name. Linking fails with `AlreadyExists` instead of overwriting.
    fn publish(dir: &Path, id: &RecordId, bytes: &[u8]) -> io::Result<()> {
        let temp = dir.join(format!(".{id}.tmp"));
        let target = dir.join(id.as_str());

        let published = write_new(&temp, bytes).and_then(|()| {
            match fs::hard_link(&temp, &target) {
                Err(e) if e.kind() == io::ErrorKind::Unsupported => {
                    debug!("hard links unsupported in {}; writing in place", dir.display());
                    write_new(&target, bytes)
                }
                linked => linked,
            }
        });

        if let Err(e) = fs::remove_file(&temp) {
            if e.kind() != io::ErrorKind::NotFound {
                warn!("failed to remove temp file {}: {e}", temp.display());
            }
        }

        published
    }

    /// Publishes `bytes` under the first free name drawn from `next_id`.
    fn publish_fresh(
        dir: &Path,
        bytes: &[u8],
        mut next_id: impl FnMut() -> RecordId,
    ) -> Result<RecordId> {
        for _ in 0..MAX_PUBLISH_ATTEMPTS {
            let id = next_id();

            match Self::publish(dir, &id, bytes) {
                Ok(()) => return Ok(id),
                Err(e) if e.kind() == io::ErrorKind::AlreadyExists => {
                    warn!("record name {id} already taken; drawing another");
                }
                Err(source) => {
                    return Err(Error::Write {
                        path: dir.join(id.as_str()),
                        source,
                    })
                }
            }
        }

        Err(Error::Write {
            path: dir.to_path_buf(),
            source: io::Error::new(
                io::ErrorKind::AlreadyExists,
                "no free record name after repeated attempts",
            ),
        })
    }
}

/// Creates `path` with `bytes`, failing if it already exists
fn write_new(path: &Path, bytes: &[u8]) -> io::Result<()> {
    let mut file = OpenOptions::new().write(true).create_new(true).open(path)?;
    file.write_all(bytes)?;
    file.sync_all()
}

impl RecordStore for Storage {
    type Records = Records;

    fn put(&self, database: &Database, payload: &Value) -> Result<RecordId> {
        let dir = self.database_dir(database);
        fs::create_dir_all(&dir).map_err(|source| Error::Write {
            path: dir.clone(),
            source,
        })?;

        let body = codec::encode(payload);
        let id = Self::publish_fresh(&dir, body.as_bytes(), || self.names.next())?;

        info!("inserted record {id} into {database}");
        Ok(id)
    }

    fn list_all(&self, database: &Database) -> Result<Records> {
        let dir = self.database_dir(database);

        let entries = match fs::read_dir(&dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                debug!("database {database} does not exist; listing as empty");
                return Ok(Records::empty(dir));
            }
            Err(source) => return Err(Error::Read { path: dir, source }),
        };

        let mut names = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|source| Error::Read {
                path: dir.clone(),
                source,
            })?;

            match entry.file_type() {
                Ok(kind) if kind.is_file() => {}
                _ => continue,
            }

            match entry.file_name().into_string() {
                Ok(name) if is_record_name(&name) => names.push(RecordId::new(name)),
                Ok(_) => {}
                Err(name) => warn!("skipping non UTF-8 file name {name:?}"),
            }
        }

        debug!("listing {} records from {database}", names.len());
        Ok(Records::new(dir, names))
    }
}

fn is_record_name(name: &str) -> bool {
    !name.starts_with('.')
        && name
            .strip_suffix(names::RECORD_EXTENSION)
            .and_then(|stem| stem.strip_suffix('.'))
            .is_some_and(|stem| !stem.is_empty())
}
