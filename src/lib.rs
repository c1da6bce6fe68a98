pub mod client;
pub mod config;
mod dispatch;
mod error;
pub mod protocol;
mod storage;

pub use client::{ClientError, Connector};
pub use config::{EngineConfig, StoreConfig};
pub use dispatch::*;
pub use error::{Error, Result};
pub use storage::{
    codec, Body, CursorState, Database, NameGenerator, Record, RecordId, RecordStore, Records,
    Storage,
};
