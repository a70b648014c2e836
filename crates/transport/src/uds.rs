use std::io::{self, Read, Write};
use std::os::unix::net::UnixStream;
use std::path::{Path, PathBuf};
use std::time::Duration;

use tracing::{debug, warn};

use crate::traits::NextHop;

const ACK: &[u8] = b"OK";
const MAX_REPLY: usize = 1024;
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Writes each envelope over a fresh Unix-domain socket connection and waits
/// for a literal `OK`.
#[derive(Debug, Clone)]
pub struct UdsHop {
    path: PathBuf,
    timeout: Duration,
}

impl UdsHop {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn exchange(&self, payload: &[u8]) -> io::Result<Vec<u8>> {
        let mut stream = UnixStream::connect(&self.path)?;
        stream.set_read_timeout(Some(self.timeout))?;
        stream.set_write_timeout(Some(self.timeout))?;
        stream.write_all(payload)?;
        stream.flush()?;

        let mut reply = vec![0u8; MAX_REPLY];
        let n = stream.read(&mut reply)?;
        reply.truncate(n);
        Ok(reply)
    }
}

fn trim_line_end(mut reply: &[u8]) -> &[u8] {
    while let [rest @ .., b'\r' | b'\n'] = reply {
        reply = rest;
    }
    reply
}

impl NextHop for UdsHop {
    fn deliver(&self, payload: &[u8]) -> bool {
        match self.exchange(payload) {
            Ok(reply) => {
                let accepted = trim_line_end(&reply) == ACK;
                debug!(path = %self.path.display(), accepted, "uds reply");
                accepted
            }
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "uds delivery failed");
                false
            }
        }
    }

    fn describe(&self) -> String {
        format!("uds:{}", self.path.display())
    }
}
