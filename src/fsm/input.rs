//! Line input and decoding
//!
//! Reading and decoding happen before the state machine sees a line. The engine only
//! ever deals with text that has its terminator removed.

use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::io::{self, BufRead};

/// How raw input bytes become line text.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Decoding {
    /// UTF-8; a line with invalid bytes fails the parse.
    #[default]
    Utf8,
    /// UTF-8 with invalid sequences replaced by U+FFFD.
    Utf8Lossy,
    /// No decoding: every byte becomes the char with the same value (ISO-8859-1), so
    /// binary-tagged data passes through unchanged.
    Raw,
}

impl Decoding {
    /// Decode one line of bytes. `None` only for invalid bytes under [`Decoding::Utf8`].
    pub fn decode<'b>(&self, bytes: &'b [u8]) -> Option<Cow<'b, str>> {
        match self {
            Decoding::Utf8 => std::str::from_utf8(bytes).ok().map(Cow::Borrowed),
            Decoding::Utf8Lossy => Some(String::from_utf8_lossy(bytes)),
            Decoding::Raw => Some(Cow::Owned(bytes.iter().copied().map(char::from).collect())),
        }
    }
}

/// Remove one trailing `\n` or `\r\n`.
pub fn strip_terminator(line: &str) -> &str {
    match line.strip_suffix('\n') {
        Some(rest) => rest.strip_suffix('\r').unwrap_or(rest),
        None => line,
    }
}

/// Iterator over the raw byte lines of a reader, terminators included.
pub struct RawLines<R> {
    reader: R,
}

impl<R: BufRead> RawLines<R> {
    pub fn new(reader: R) -> Self {
        Self { reader }
    }
}

impl<R: BufRead> Iterator for RawLines<R> {
    type Item = io::Result<Vec<u8>>;

    fn next(&mut self) -> Option<Self::Item> {
        let mut buf = Vec::new();
        match self.reader.read_until(b'\n', &mut buf) {
            Ok(0) => None,
            Ok(_) => Some(Ok(buf)),
            Err(err) => Some(Err(err)),
        }
    }
}
