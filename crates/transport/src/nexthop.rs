//! Picks a transport from a nexthop URI.

use tracing::info;

use crate::error::TransportError;
use crate::file::FileHop;
use crate::http::{HttpHop, TlsConfig};
use crate::traits::NextHop;
use crate::uds::UdsHop;

/// Builds the transport for `uri`:
///
/// - `http://...` / `https://...` → [`HttpHop`]
/// - `uds:<path>` → [`UdsHop`]
/// - `file://<path>` → [`FileHop`]
pub fn connect(uri: &str, tls: Option<&TlsConfig>) -> Result<Box<dyn NextHop>, TransportError> {
    let hop: Box<dyn NextHop> = if uri.starts_with("http://") || uri.starts_with("https://") {
        Box::new(HttpHop::new(uri, tls)?)
    } else if let Some(path) = uri.strip_prefix("uds:") {
        Box::new(UdsHop::new(path))
    } else if let Some(path) = uri.strip_prefix("file://") {
        Box::new(FileHop::new(path))
    } else {
        return Err(TransportError::UnsupportedScheme(uri.to_string()));
    };
    info!(nexthop = %hop.describe(), "nexthop configured");
    Ok(hop)
}
