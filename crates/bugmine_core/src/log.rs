//! Streaming parser for `git log` output.
//!
//! The log is a sequence of blocks, each opened by a `commit <hash>` line.
//! Indented lines inside a block form the commit message; every other line
//! (`Author:`, `Date:`, `Merge:`) is ignored. A block is only complete once
//! the next marker or the end of the stream has been read.

use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::Path;

const MARKER: &str = "commit";

/// One commit read from the log.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitEntry {
    /// Full commit hash.
    pub hash: String,
    /// Message lines, trimmed, in log order.
    pub message: Vec<String>,
}

impl CommitEntry {
    /// Creates an entry with an empty message.
    #[must_use]
    pub fn new(hash: impl Into<String>) -> Self {
        Self {
            hash: hash.into(),
            message: Vec::new(),
        }
    }

    /// Returns the message lines joined with `\n`.
    #[must_use]
    pub fn message_text(&self) -> String {
        self.message.join("\n")
    }
}

/// Lazy iterator over the commits of a log stream.
///
/// Yields one [`CommitEntry`] per marker line in stream order. Invalid UTF-8
/// is decoded lossily. After an I/O error is yielded the stream is exhausted.
#[derive(Debug)]
pub struct CommitStream<R> {
    reader: R,
    line: Vec<u8>,
    pending: Option<CommitEntry>,
    finished: bool,
}

impl<R: BufRead> CommitStream<R> {
    /// Wraps a buffered reader.
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            line: Vec::new(),
            pending: None,
            finished: false,
        }
    }
}

impl CommitStream<BufReader<File>> {
    /// Opens a log file for streaming.
    pub fn open(path: &Path) -> io::Result<Self> {
        Ok(Self::new(BufReader::new(File::open(path)?)))
    }
}

impl<R: BufRead> Iterator for CommitStream<R> {
    type Item = io::Result<CommitEntry>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }

        loop {
            self.line.clear();
            match self.reader.read_until(b'\n', &mut self.line) {
                Err(e) => {
                    self.finished = true;
                    return Some(Err(e));
                }
                Ok(0) => {
                    self.finished = true;
                    return self.pending.take().map(Ok);
                }
                Ok(_) => {}
            }

            let decoded = String::from_utf8_lossy(&self.line);
            let line = decoded.trim_end_matches(['\n', '\r']);

            if let Some(hash) = marker_hash(line) {
                if let Some(done) = self.pending.replace(CommitEntry::new(hash)) {
                    return Some(Ok(done));
                }
            } else if is_message_line(line)
                && let Some(entry) = self.pending.as_mut()
            {
                entry.message.push(line.trim().to_string());
            }
        }
    }
}

fn marker_hash(line: &str) -> Option<&str> {
    if line.starts_with(char::is_whitespace) {
        return None;
    }
    let mut tokens = line.split_whitespace();
    if tokens.next()? != MARKER {
        return None;
    }
    tokens.next()
}

fn is_message_line(line: &str) -> bool {
    line.starts_with("    ") || line.starts_with('\t')
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(log: &str) -> Vec<CommitEntry> {
        CommitStream::new(log.as_bytes()).collect::<io::Result<_>>().unwrap()
    }

    const LOG: &str = "\
commit aaa111
Author: Jane <jane@example.com>
Date:   Mon Jan 1 00:00:00 2024 +0000

    Initial import

commit bbb222
Merge: aaa111 ccc333
Author: Jane <jane@example.com>
Date:   Tue Jan 2 00:00:00 2024 +0000

    Fixes ABC-1: null check
    
    Second paragraph
";

    #[test]
    fn yields_one_entry_per_marker() {
        let entries = parse(LOG);
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].hash, "aaa111");
        assert_eq!(entries[1].hash, "bbb222");
    }

    #[test]
    fn keeps_indented_lines_trimmed_and_ignores_headers() {
        let entries = parse(LOG);
        assert_eq!(entries[0].message, ["Initial import"]);
        assert_eq!(entries[1].message, ["Fixes ABC-1: null check", "", "Second paragraph"]);
        assert_eq!(entries[1].message_text(), "Fixes ABC-1: null check\n\nSecond paragraph");
    }

    #[test]
    fn final_block_without_trailing_newline_is_kept() {
        let entries = parse("commit aaa\n    one\ncommit bbb\n    two");
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[1].message, ["two"]);
    }

    #[test]
    fn marker_without_message_still_yields_entry() {
        let entries = parse("commit aaa\ncommit bbb\n    msg\n");
        assert_eq!(entries.len(), 2);
        assert!(entries[0].message.is_empty());
    }

    #[test]
    fn lines_before_first_marker_are_ignored() {
        let entries = parse("    stray\nnoise\ncommit aaa\n    msg\n");
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].message, ["msg"]);
    }

    #[test]
    fn indented_commit_word_is_message_not_marker() {
        let entries = parse("commit aaa\n    commit bbb was reverted\n");
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].message, ["commit bbb was reverted"]);
    }

    #[test]
    fn invalid_utf8_is_replaced() {
        let bytes = b"commit aaa\n    caf\xe9 fix\n";
        let entries: Vec<CommitEntry> = CommitStream::new(&bytes[..]).collect::<io::Result<_>>().unwrap();
        assert_eq!(entries[0].message, ["caf\u{fffd} fix"]);
    }

    #[test]
    fn crlf_line_endings_are_handled() {
        let entries = parse("commit aaa\r\n    msg\r\n");
        assert_eq!(entries[0].hash, "aaa");
        assert_eq!(entries[0].message, ["msg"]);
    }

    #[test]
    fn empty_stream_yields_nothing() {
        assert!(parse("").is_empty());
    }
}
