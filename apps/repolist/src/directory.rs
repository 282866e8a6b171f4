//! Owner lookups against the bug tracker's user directory.
//!
//! The check is best effort: a transport failure yields
//! [`Lookup::Unavailable`], which the validator reports as a warning.

use crate::error::{Error, Result};
use std::time::Duration;

pub const DEFAULT_URL: &str = "https://bugs.gentoo.org";
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// Result of asking the directory about one address.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Lookup {
    Found,
    NotFound { status: u16 },
    Unavailable(String),
}

/// A read-only user directory. Lookups may run from several threads.
pub trait Directory: Sync {
    fn lookup(&self, email: &str) -> Lookup;
}

/// Directory backed by `GET {base}/rest/user?names=<email>`.
///
/// One client (and its connection pool) is built per instance and released
/// when the instance is dropped.
pub struct HttpDirectory {
    client: reqwest::blocking::Client,
    endpoint: String,
}

impl HttpDirectory {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("repolist/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| Error::Config(format!("cannot build HTTP client: {e}")))?;
        Ok(HttpDirectory {
            client,
            endpoint: format!("{}/rest/user", base_url.trim_end_matches('/')),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

impl Directory for HttpDirectory {
    fn lookup(&self, email: &str) -> Lookup {
        let response = self
            .client
            .get(&self.endpoint)
            .query(&[("names", email)])
            .send();
        let lookup = match response {
            Ok(resp) => {
                let status = resp.status();
                // Drain the body so the connection can be reused.
                if let Err(e) = resp.bytes() {
                    return Lookup::Unavailable(format!("reading response failed: {e}"));
                }
                if status == reqwest::StatusCode::OK {
                    Lookup::Found
                } else {
                    Lookup::NotFound {
                        status: status.as_u16(),
                    }
                }
            }
            Err(e) => Lookup::Unavailable(e.to_string()),
        };
        tracing::debug!(email, ?lookup, "directory lookup");
        lookup
    }
}
