use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::Path;

use crate::config::STDIN_SOURCE;
use crate::error::{Result, ScanError};

/// One line read from a log source, without its terminator
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogLine {
    Text(String),
    /// Line that is not valid UTF-8; carries its length in bytes
    Undecodable(usize),
}

/// Forward-only line reader over a single log source
pub struct LogReader {
    origin: String,
    reader: Box<dyn BufRead>,
    buffer: Vec<u8>,
    line_number: u64,
}

impl LogReader {
    /// Wrap an already opened reader
    pub fn new(origin: impl Into<String>, reader: Box<dyn BufRead>) -> Self {
        LogReader {
            origin: origin.into(),
            reader,
            buffer: Vec::new(),
            line_number: 0,
        }
    }

    /// Open a log file, or standard input for "-"
    pub fn open(path: &Path) -> Result<Self> {
        if path.as_os_str() == STDIN_SOURCE {
            return Ok(Self::new("<stdin>", Box::new(io::stdin().lock())));
        }

        let file = File::open(path).map_err(|source| ScanError::Open {
            path: path.to_path_buf(),
            source,
        })?;

        Ok(Self::new(
            path.display().to_string(),
            Box::new(BufReader::new(file)),
        ))
    }

    /// Name of the source, for diagnostics
    pub fn origin(&self) -> &str {
        &self.origin
    }

    /// Number of lines read so far
    pub fn line_number(&self) -> u64 {
        self.line_number
    }

    /// Read the next line; `Ok(None)` at end of input
    pub fn read_line(&mut self) -> Result<Option<LogLine>> {
        self.buffer.clear();

        let bytes_read = self
            .reader
            .read_until(b'\n', &mut self.buffer)
            .map_err(|source| ScanError::Read {
                origin: self.origin.clone(),
                source,
            })?;

        if bytes_read == 0 {
            return Ok(None); // EOF
        }
        self.line_number += 1;

        if self.buffer.last() == Some(&b'\n') {
            self.buffer.pop();
            if self.buffer.last() == Some(&b'\r') {
                self.buffer.pop();
            }
        }

        match std::str::from_utf8(&self.buffer) {
            Ok(text) => Ok(Some(LogLine::Text(text.to_string()))),
            Err(_) => Ok(Some(LogLine::Undecodable(self.buffer.len()))),
        }
    }
}

impl Iterator for LogReader {
    type Item = Result<LogLine>;

    fn next(&mut self) -> Option<Self::Item> {
        self.read_line().transpose()
    }
}
