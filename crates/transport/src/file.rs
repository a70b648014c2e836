use std::fs::OpenOptions;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::traits::NextHop;

/// Appends each envelope, newline-terminated, to a local file.
#[derive(Debug, Clone)]
pub struct FileHop {
    path: PathBuf,
}

impl FileHop {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn append(&self, payload: &[u8]) -> io::Result<()> {
        let mut file = OpenOptions::new().create(true).append(true).open(&self.path)?;
        file.write_all(payload)?;
        file.write_all(b"\n")?;
        file.flush()
    }
}

impl NextHop for FileHop {
    fn deliver(&self, payload: &[u8]) -> bool {
        match self.append(payload) {
            Ok(()) => {
                debug!(path = %self.path.display(), bytes = payload.len(), "appended envelope");
                true
            }
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "file delivery failed");
                false
            }
        }
    }

    fn describe(&self) -> String {
        format!("file://{}", self.path.display())
    }
}
