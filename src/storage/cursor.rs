use std::{fs, path::PathBuf, vec};

use log::debug;

use super::{codec, Record, RecordId};
use crate::{Error, Result};

#[derive(Debug, Clone, PartialEq)]
pub enum CursorState {
    AtStart,
    InProgress,
    AtEnd,
}

/// Lazy enumeration over the records of one database.
///
/// Record names are gathered when the cursor is created; bodies are read one
/// at a time as the cursor advances. Each call to
/// [`Storage::list_all`](super::Storage::list_all) builds a fresh cursor.
#[derive(Debug)]
pub struct Records {
    dir: PathBuf,
    names: vec::IntoIter<RecordId>,
    state: CursorState,
}

impl Records {
    pub(super) fn new(dir: PathBuf, mut names: Vec<RecordId>) -> Self {
        names.sort();

        let state = match names.len() {
            0 => CursorState::AtEnd,
            _ => CursorState::AtStart,
        };

        Self {
            dir,
            names: names.into_iter(),
            state,
        }
    }

    /// Cursor over a database that does not exist yet
    pub(super) fn empty(dir: PathBuf) -> Self {
        Self::new(dir, Vec::new())
    }

    pub fn state(&self) -> &CursorState {
        &self.state
    }

    fn read(&self, id: RecordId) -> Result<Record> {
        let path = self.dir.join(id.as_str());
        debug!("reading record {}", path.display());

        let bytes = fs::read(&path).map_err(|source| Error::Read { path, source })?;
        let text = String::from_utf8_lossy(&bytes);

        Ok(Record {
            body: codec::decode(&text),
            id,
        })
    }
}

impl Iterator for Records {
    type Item = Result<Record>;

    fn next(&mut self) -> Option<Self::Item> {
        let Some(id) = self.names.next() else {
            self.state = CursorState::AtEnd;
            return None;
        };

        self.state = CursorState::InProgress;
        Some(self.read(id))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.names.size_hint()
    }
}
