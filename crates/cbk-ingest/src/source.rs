//! Line-oriented data sources.
//!
//! A [`LineSource`] yields one record line at a time with the terminator
//! stripped. Failures here (missing file, permissions, bad encoding) are
//! fatal for the run and are kept apart from per-line decode errors.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};

use cbk_model::DataSourceError;
use tracing::debug;

/// Streaming reader over fixed-width record lines.
pub struct LineSource<R> {
    reader: R,
    path: Option<PathBuf>,
    lines_read: usize,
    buf: Vec<u8>,
    finished: bool,
}

impl LineSource<BufReader<File>> {
    /// Open a UTF-8 text file.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, DataSourceError> {
        let path = path.as_ref().to_path_buf();
        let file = File::open(&path)
            .map_err(|source| DataSourceError::from_io(Some(path.clone()), source))?;
        debug!(path = %path.display(), "opened data source");
        Ok(Self {
            path: Some(path),
            ..Self::from_reader(BufReader::new(file))
        })
    }
}

impl<R: BufRead> LineSource<R> {
    /// Wrap any buffered reader (stdin, in-memory data).
    pub fn from_reader(reader: R) -> Self {
        Self {
            reader,
            path: None,
            lines_read: 0,
            buf: Vec::new(),
            finished: false,
        }
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Lines yielded so far.
    pub fn lines_read(&self) -> usize {
        self.lines_read
    }
}

impl<R: BufRead> Iterator for LineSource<R> {
    type Item = Result<String, DataSourceError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }
        self.buf.clear();
        match self.reader.read_until(b'\n', &mut self.buf) {
            Ok(0) => {
                self.finished = true;
                None
            }
            Ok(_) => {
                self.lines_read += 1;
                if self.buf.last() == Some(&b'\n') {
                    self.buf.pop();
                    if self.buf.last() == Some(&b'\r') {
                        self.buf.pop();
                    }
                }
                match String::from_utf8(std::mem::take(&mut self.buf)) {
                    Ok(line) => Some(Ok(line)),
                    Err(_) => {
                        self.finished = true;
                        Some(Err(DataSourceError::Encoding {
                            line_number: self.lines_read,
                        }))
                    }
                }
            }
            Err(source) => {
                self.finished = true;
                Some(Err(DataSourceError::from_io(self.path.clone(), source)))
            }
        }
    }
}
