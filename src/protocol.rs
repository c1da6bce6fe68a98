//! Text format used on the engine's stdout for `select`.
//!
//! Every record is rendered as a block:
//!
//! ```text
//! File: <identifier>
//! Content:
//! <body, one or more lines>
//!
//! ```
//!
//! The blank line ends the block. Parsing is lenient per block: a malformed
//! block is reported on its own and parsing resumes at the next header.

use std::{
    io::{self, Write},
    iter::Peekable,
    str::Lines,
};

use thiserror::Error;

use crate::storage::{
    codec::{self, JSON_WHITESPACE},
    Record, RecordId,
};

pub const FORMAT_VERSION: u32 = 1;

pub const HEADER_PREFIX: &str = "File: ";
pub const CONTENT_MARKER: &str = "Content:";

#[derive(Debug, Clone, PartialEq, Error)]
pub enum MalformedBlock {
    #[error("line {line}: unexpected text outside of a record block")]
    StrayText { line: usize },

    #[error("line {line}: block for `{id}` is missing the `Content:` marker")]
    MissingMarker { line: usize, id: String },

    #[error("line {line}: record header without an identifier")]
    EmptyIdentifier { line: usize },
}

/// Writes one record block.
pub fn render<W: Write>(out: &mut W, record: &Record) -> io::Result<()> {
    writeln!(out, "{HEADER_PREFIX}{}", record.id)?;
    writeln!(out, "{CONTENT_MARKER}")?;
    writeln!(out, "{}", record.body.to_text())?;
    writeln!(out)
}

/// Parses `select` output into records, one item per block.
pub fn parse_blocks(text: &str) -> Blocks<'_> {
    Blocks {
        lines: text.lines().peekable(),
        line: 0,
    }
}

pub struct Blocks<'a> {
    lines: Peekable<Lines<'a>>,
    line: usize,
}

impl<'a> Blocks<'a> {
    fn next_line(&mut self) -> Option<&'a str> {
        let line = self.lines.next()?;
        self.line += 1;
        Some(line.trim_end_matches(JSON_WHITESPACE))
    }

    fn at_header(&mut self) -> bool {
        self.lines.peek().is_some_and(|line| header(line).is_some())
    }

    /// Drops lines up to the next header
    fn skip_block(&mut self) {
        while !self.at_header() && self.next_line().is_some() {}
    }

    fn body(&mut self) -> String {
        let mut lines = Vec::new();
        while !self.at_header() {
            match self.next_line() {
                Some(line) => lines.push(line),
                None => break,
            }
        }

        while lines.last().is_some_and(|line| line.is_empty()) {
            lines.pop();
        }

        lines.join("\n")
    }
}

/// Identifier carried by a header line, empty when the header names nothing
fn header(line: &str) -> Option<&str> {
    let line = line.trim_end();
    if line == HEADER_PREFIX.trim_end() {
        return Some("");
    }

    line.strip_prefix(HEADER_PREFIX).map(str::trim)
}

impl<'a> Iterator for Blocks<'a> {
    type Item = Result<Record, MalformedBlock>;

    fn next(&mut self) -> Option<Self::Item> {
        let id = loop {
            let line = self.next_line()?;
            if let Some(id) = header(line) {
                break id;
            }
            if !line.is_empty() {
                let line = self.line;
                self.skip_block();
                return Some(Err(MalformedBlock::StrayText { line }));
            }
        };
        let header_line = self.line;

        if id.is_empty() {
            self.skip_block();
            return Some(Err(MalformedBlock::EmptyIdentifier { line: header_line }));
        }

        if self.at_header() || self.next_line() != Some(CONTENT_MARKER) {
            self.skip_block();
            return Some(Err(MalformedBlock::MissingMarker {
                line: header_line,
                id: id.to_string(),
            }));
        }

        Some(Ok(Record {
            id: RecordId::new(id),
            body: codec::decode(&self.body()),
        }))
    }
}
