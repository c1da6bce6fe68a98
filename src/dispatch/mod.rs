pub mod commands;

pub use commands::{Command, Invocation};

use std::io::Write;

use log::{debug, error};

use crate::{
    protocol,
    storage::{codec, Database, RecordStore, Storage},
    Error, Result,
};

/// Runs single invocations against a record store and renders the results.
pub struct Dispatcher<S = Storage> {
    store: S,
}

impl<S: RecordStore> Dispatcher<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Executes `invocation`, writing its output to `out`.
    ///
    /// Nothing is written to `out` when the invocation is rejected before
    /// touching the store.
    pub fn run<W: Write>(&self, invocation: &Invocation, out: &mut W) -> Result<()> {
        let command = Command::try_from(invocation)?;
        let database = Database::new(invocation.database.as_str())?;
        debug!("running {command:?} on {database}");

        match command {
            Command::Select => self.select(&database, out)?,
            Command::Insert(payload) => self.insert(&database, &payload, out)?,
        }

        out.flush().map_err(Error::Output)
    }

    /// Streams every readable record. A record that cannot be read does not
    /// stop the listing, but the first such failure is returned at the end.
    fn select<W: Write>(&self, database: &Database, out: &mut W) -> Result<()> {
        let mut failure = None;

        for record in self.store.list_all(database)? {
            match record {
                Ok(record) => protocol::render(out, &record).map_err(Error::Output)?,
                Err(e) => {
                    error!("skipping record: {e}");
                    failure.get_or_insert(e);
                }
            }
        }

        match failure {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }

    fn insert<W: Write>(&self, database: &Database, payload: &str, out: &mut W) -> Result<()> {
        let value = codec::parse_payload(payload)?;
        let id = self.store.put(database, &value)?;

        writeln!(out, "Data inserted successfully into: {database}/{id}").map_err(Error::Output)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::protocol::parse_blocks;
    use crate::storage::{Body, Record, RecordId};
    use assert_fs::{prelude::*, TempDir};
    use serde_json::{json, Value};
    use std::{io, vec};

    /// Store whose listing is fixed up front
    struct FixedStore {
        records: fn() -> Vec<Result<Record>>,
    }

    impl RecordStore for FixedStore {
        type Records = vec::IntoIter<Result<Record>>;

        fn put(&self, _: &Database, _: &Value) -> Result<RecordId> {
            unreachable!("listing only")
        }

        fn list_all(&self, _: &Database) -> Result<Self::Records> {
            Ok((self.records)().into_iter())
        }
    }

    fn run(dispatcher: &Dispatcher, invocation: Invocation) -> Result<String> {
        let mut out = Vec::new();
        dispatcher.run(&invocation, &mut out)?;
        Ok(String::from_utf8(out).unwrap())
    }

    #[test]
    fn insert_then_select() {
        let dir = TempDir::new().unwrap();
        let dispatcher = Dispatcher::new(Storage::new(dir.path()));

        let confirmation = run(
            &dispatcher,
            Invocation::new(
                "clientes",
                "insert",
                Some(r#"{"nombre":"Francisco","age":25}"#.into()),
            ),
        )
        .unwrap();
        assert!(confirmation.starts_with("Data inserted successfully into: clientes/record_"));

        let output = run(&dispatcher, Invocation::new("clientes", "select", None)).unwrap();
        assert!(output.starts_with("File: record_"));
        assert!(output.ends_with("Content:\n{\"nombre\":\"Francisco\",\"age\":25}\n\n"));

        let records: Vec<_> = parse_blocks(&output).collect::<std::result::Result<_, _>>().unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(
            records[0].body,
            Body::Parsed(json!({"nombre": "Francisco", "age": 25}))
        );
        assert!(confirmation.trim_end().ends_with(records[0].id.as_str()));
    }

    #[test]
    fn select_on_missing_database_prints_nothing() {
        let dir = TempDir::new().unwrap();
        let dispatcher = Dispatcher::new(Storage::new(dir.path()));

        let output = run(&dispatcher, Invocation::new("doesNotExist", "select", None)).unwrap();
        assert_eq!(output, "");
    }

    #[test]
    fn select_renders_raw_bodies() {
        let dir = TempDir::new().unwrap();
        dir.child("db/record_1.json").write_str("not json\n").unwrap();
        let dispatcher = Dispatcher::new(Storage::new(dir.path()));

        let output = run(&dispatcher, Invocation::new("db", "select", None)).unwrap();
        assert_eq!(output, "File: record_1.json\nContent:\nnot json\n\n");
    }

    #[test]
    fn unreadable_record_fails_select_after_listing_the_rest() {
        let dispatcher = Dispatcher::new(FixedStore {
            records: || {
                vec![
                    Ok(Record {
                        id: RecordId::new("record_1.json"),
                        body: Body::Raw("x".into()),
                    }),
                    Err(Error::Read {
                        path: "db/record_2.json".into(),
                        source: io::Error::from(io::ErrorKind::PermissionDenied),
                    }),
                    Ok(Record {
                        id: RecordId::new("record_3.json"),
                        body: Body::Parsed(json!(3)),
                    }),
                ]
            },
        });

        let mut out = Vec::new();
        let err = dispatcher
            .run(&Invocation::new("db", "select", None), &mut out)
            .unwrap_err();

        assert!(matches!(err, Error::Read { .. }));
        assert_eq!(err.exit_code(), 1);
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "File: record_1.json\nContent:\nx\n\nFile: record_3.json\nContent:\n3\n\n"
        );
    }

    #[test]
    fn invalid_payload_is_not_stored() {
        let dir = TempDir::new().unwrap();
        let dispatcher = Dispatcher::new(Storage::new(dir.path()));

        let err = run(
            &dispatcher,
            Invocation::new("db", "insert", Some("{\"a\":".into())),
        )
        .unwrap_err();
        assert!(matches!(err, Error::Parse(_)));
        dir.child("db").assert(predicates::path::missing());
    }

    #[test]
    fn rejects_bad_invocations() {
        let dir = TempDir::new().unwrap();
        let dispatcher = Dispatcher::new(Storage::new(dir.path()));

        let err = run(&dispatcher, Invocation::new("db", "drop", None)).unwrap_err();
        assert!(matches!(err, Error::Usage(_)));

        let err = run(&dispatcher, Invocation::new("../db", "select", None)).unwrap_err();
        assert!(matches!(err, Error::InvalidDatabase(_)));
    }
}
