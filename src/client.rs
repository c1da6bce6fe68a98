//! Connector that drives the engine executable as a child process.
//!
//! Every call spawns one engine process with `<database> <operation> [payload]`
//! as its arguments. Arguments go straight to the process, never through a
//! shell, so payloads need no quoting. A non-zero exit status is always an
//! error, which keeps a failed `select` apart from an empty database.

use std::{
    path::PathBuf,
    process::{Command, Output},
    string::FromUtf8Error,
};

use log::{debug, warn};
use serde_json::Value;
use thiserror::Error;

use crate::{config::EngineConfig, protocol, storage::codec, Record};

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("could not start engine {}: {source}", .executable.display())]
    Spawn {
        executable: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("engine exited with {}: {stderr}", describe_status(.status))]
    Engine { status: Option<i32>, stderr: String },

    #[error("engine produced invalid UTF-8 output: {0}")]
    Utf8(#[from] FromUtf8Error),
}

pub type ClientResult<T> = Result<T, ClientError>;

fn describe_status(status: &Option<i32>) -> String {
    match status {
        Some(code) => format!("status {code}"),
        None => "a signal".to_string(),
    }
}

/// Handle on one database served by an engine executable
#[derive(Debug, Clone)]
pub struct Connector {
    config: EngineConfig,
    database: String,
}

impl Connector {
    pub fn new(config: EngineConfig, database: impl Into<String>) -> Self {
        Self {
            config,
            database: database.into(),
        }
    }

    /// Raw `select` output, exactly as printed by the engine
    pub fn select_raw(&self) -> ClientResult<String> {
        self.invoke(&["select"])
    }

    /// Records of the database. Malformed blocks are logged and dropped.
    pub fn select(&self) -> ClientResult<Vec<Record>> {
        let output = self.select_raw()?;

        let records = protocol::parse_blocks(&output)
            .filter_map(|block| match block {
                Ok(record) => Some(record),
                Err(e) => {
                    warn!("ignoring malformed block from engine: {e}");
                    None
                }
            })
            .collect();

        Ok(records)
    }

    /// Inserts `value`, returning the engine's confirmation line.
    pub fn insert(&self, value: &Value) -> ClientResult<String> {
        self.insert_raw(&codec::encode(value))
    }

    /// Inserts already serialized JSON text; the engine validates it.
    pub fn insert_raw(&self, json: &str) -> ClientResult<String> {
        let output = self.invoke(&["insert", json])?;
        Ok(output.trim_end().to_string())
    }

    fn invoke(&self, args: &[&str]) -> ClientResult<String> {
        let executable = &self.config.executable;
        debug!(
            "running {} {} {}",
            executable.display(),
            self.database,
            args[0]
        );

        let Output {
            status,
            stdout,
            stderr,
        } = Command::new(executable)
            .arg(&self.database)
            .args(args)
            .output()
            .map_err(|source| ClientError::Spawn {
                executable: executable.clone(),
                source,
            })?;

        if !status.success() {
            return Err(ClientError::Engine {
                status: status.code(),
                stderr: String::from_utf8_lossy(&stderr).trim().to_string(),
            });
        }

        Ok(String::from_utf8(stdout)?)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn missing_engine_is_a_spawn_error() {
        let connector = Connector::new(EngineConfig::new("/nonexistent/cyan-engine"), "db");

        assert!(matches!(
            connector.select_raw(),
            Err(ClientError::Spawn { .. })
        ));
    }

    #[test]
    fn engine_error_message() {
        let err = ClientError::Engine {
            status: Some(2),
            stderr: "error: unknown operation".into(),
        };

        assert_eq!(
            err.to_string(),
            "engine exited with status 2: error: unknown operation"
        );
    }
}
