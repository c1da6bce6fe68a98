use crate::{Error, Result};

/// Raw invocation as received on the command line
#[derive(Debug, Clone)]
pub struct Invocation {
    pub database: String,
    pub operation: String,
    pub payload: Option<String>,
}

impl Invocation {
    pub fn new(
        database: impl Into<String>,
        operation: impl Into<String>,
        payload: Option<String>,
    ) -> Self {
        Self {
            database: database.into(),
            operation: operation.into(),
            payload,
        }
    }
}

/// Operations understood by the engine.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    /// List every record of the database
    Select,
    /// Store the contained JSON text as a new record
    Insert(String),
}

impl TryFrom<&Invocation> for Command {
    type Error = Error;

    fn try_from(invocation: &Invocation) -> Result<Self> {
        match (invocation.operation.as_str(), &invocation.payload) {
            ("select", None) => Ok(Command::Select),
            ("select", Some(_)) => Err(Error::Usage(
                "`select` does not take a payload".to_string(),
            )),
            ("insert", Some(payload)) => Ok(Command::Insert(payload.clone())),
            ("insert", None) => Err(Error::Usage(
                "missing JSON data for `insert`".to_string(),
            )),
            (other, _) => Err(Error::Usage(format!(
                "unknown operation `{other}`; use `select` or `insert`"
            ))),
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn command(operation: &str, payload: Option<&str>) -> Result<Command> {
        Command::try_from(&Invocation::new("db", operation, payload.map(String::from)))
    }

    #[test]
    fn known_shapes() {
        assert_eq!(command("select", None).unwrap(), Command::Select);
        assert_eq!(
            command("insert", Some("{}")).unwrap(),
            Command::Insert("{}".into())
        );
    }

    #[test]
    fn other_shapes_are_usage_errors() {
        for (operation, payload) in [
            ("select", Some("{}")),
            ("insert", None),
            ("delete", None),
            ("SELECT", None),
            ("", Some("{}")),
        ] {
            assert!(
                matches!(command(operation, payload), Err(Error::Usage(_))),
                "{operation:?} {payload:?}"
            );
        }
    }
}
