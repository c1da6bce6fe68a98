use std::sync::atomic::{AtomicI64, Ordering};

use chrono::Utc;

use super::RecordId;

pub const RECORD_PREFIX: &str = "record_";
pub const RECORD_EXTENSION: &str = "json";

/// Generates record identifiers of the form `record_<micros>_<salt>.json`.
///
/// `<micros>` is the Unix time in microseconds, zero padded so identifiers
/// sort lexically in creation order, and strictly increasing for a single
/// generator. `<salt>` is 64 random bits. Two processes only collide when
/// they pick the same microsecond and the same salt.
#[derive(Debug, Default)]
pub struct NameGenerator {
    last: AtomicI64,
}

impl NameGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn next(&self) -> RecordId {
        let stamp = self.next_stamp(Utc::now().timestamp_micros());
        let salt: u64 = rand::random();

        RecordId::new(format!(
            "{RECORD_PREFIX}{stamp:016}_{salt:016x}.{RECORD_EXTENSION}"
        ))
    }

    fn next_stamp(&self, now: i64) -> i64 {
        let previous = self
            .last
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |last| {
                Some(now.max(last + 1))
            })
            .unwrap_or_else(|last| last);

        now.max(previous + 1)
    }
}
