use std::fs;
use std::path::PathBuf;
use std::time::Duration;

use reqwest::StatusCode;
use reqwest::blocking::Client;
use serde::Deserialize;
use tracing::{debug, warn};

use crate::error::TransportError;
use crate::traits::NextHop;

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Client certificate presented to an HTTPS nexthop.
///
/// No `Default` impl because certificate paths have no sensible defaults.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct TlsConfig {
    /// PEM private key.
    pub key_file: PathBuf,
    /// PEM certificate chain matching `key_file`.
    pub cert_file: PathBuf,
}

/// `PUT`s each envelope to a fixed URL; only `200 OK` counts as delivered.
#[derive(Debug, Clone)]
pub struct HttpHop {
    url: String,
    client: Client,
}

impl HttpHop {
    pub fn new(url: impl Into<String>, tls: Option<&TlsConfig>) -> Result<Self, TransportError> {
        let mut builder = Client::builder().timeout(DEFAULT_TIMEOUT);
        if let Some(tls) = tls {
            let mut pem = fs::read(&tls.key_file)?;
            pem.push(b'\n');
            pem.extend(fs::read(&tls.cert_file)?);
            builder = builder.identity(reqwest::Identity::from_pem(&pem)?);
        }
        Ok(Self {
            url: url.into(),
            client: builder.build()?,
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

impl NextHop for HttpHop {
    fn deliver(&self, payload: &[u8]) -> bool {
        match self.client.put(&self.url).body(payload.to_vec()).send() {
            Ok(response) => {
                let status = response.status();
                debug!(url = %self.url, %status, "http reply");
                status == StatusCode::OK
            }
            Err(e) => {
                warn!(url = %self.url, error = %e, "http delivery failed");
                false
            }
        }
    }

    fn describe(&self) -> String {
        self.url.clone()
    }
}
