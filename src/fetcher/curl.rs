//! HTTP fetcher that shells out to `curl`.

#![allow(missing_docs)]

use std::path::PathBuf;
use std::process::Command;

use super::{FetchError, Fetcher, Request};
use crate::core::config::ConnectionConfig;

/// curl exit code for "operation timed out".
const CURL_TIMEOUT_EXIT: i32 = 28;
/// Separator written by `--write-out` between body and status code.
const STATUS_MARKER: &str = "\n__clustermon_status__:";

/// Fetcher backed by the system `curl` binary.
#[derive(Debug, Clone)]
pub struct CurlFetcher {
    base_url: String,
    curl: PathBuf,
    timeout_secs: u64,
    insecure: bool,
    credentials: Option<String>,
}

impl CurlFetcher {
    /// Build from connection settings. The password, if any, is read from
    /// `CLUSTERMON_PASSWORD` so it never lands in the config file.
    #[must_use]
    pub fn new(conn: &ConnectionConfig) -> Self {
        let credentials = conn.username.as_ref().map(|user| {
            let password = std::env::var("CLUSTERMON_PASSWORD").unwrap_or_default();
            format!("{user}:{password}")
        });
        Self {
            base_url: conn.url.trim_end_matches('/').to_string(),
            curl: conn.curl_binary.clone(),
            timeout_secs: conn.request_timeout_secs,
            insecure: conn.insecure_tls,
            credentials,
        }
    }

    fn url_for(&self, request: &Request) -> String {
        let path = request.path();
        if path == "/" {
            self.base_url.clone()
        } else {
            format!("{}{path}", self.base_url)
        }
    }
}

impl Fetcher for CurlFetcher {
    fn fetch(&self, request: &Request) -> Result<Vec<u8>, FetchError> {
        let mut cmd = Command::new(&self.curl);
        cmd.args(["-sS", "-H", "Accept: application/json", "--max-time"])
            .arg(self.timeout_secs.to_string())
            .arg("--write-out")
            .arg(format!("{STATUS_MARKER}%{{http_code}}"));
        if self.insecure {
            cmd.arg("-k");
        }
        if let Some(creds) = &self.credentials {
            cmd.arg("-u").arg(creds);
        }
        cmd.arg(self.url_for(request));

        let output = cmd.output().map_err(|e| FetchError::Transport {
            details: format!("curl not found or failed: {e}"),
        })?;

        if !output.status.success() {
            if output.status.code() == Some(CURL_TIMEOUT_EXIT) {
                return Err(FetchError::Timeout {
                    secs: self.timeout_secs,
                });
            }
            return Err(FetchError::Transport {
                details: format!(
                    "curl exited with {}: {}",
                    output.status,
                    String::from_utf8_lossy(&output.stderr).trim()
                ),
            });
        }

        let (body, status) = split_status(&output.stdout)?;
        classify_status(status)?;
        Ok(body)
    }

    fn endpoint(&self) -> String {
        self.base_url.clone()
    }
}

/// Split the `--write-out` trailer from the response body.
fn split_status(stdout: &[u8]) -> Result<(Vec<u8>, u16), FetchError> {
    let marker = STATUS_MARKER.as_bytes();
    let pos = stdout
        .windows(marker.len())
        .rposition(|w| w == marker)
        .ok_or_else(|| FetchError::Transport {
            details: "curl output missing status trailer".to_string(),
        })?;
    let code = String::from_utf8_lossy(&stdout[pos + marker.len()..])
        .trim()
        .parse::<u16>()
        .map_err(|e| FetchError::Transport {
            details: format!("unparseable HTTP status: {e}"),
        })?;
    Ok((stdout[..pos].to_vec(), code))
}

fn classify_status(status: u16) -> Result<(), FetchError> {
    match status {
        200..=299 => Ok(()),
        404 => Err(FetchError::NotFound),
        401 | 403 => Err(FetchError::Auth { status }),
        0 => Err(FetchError::Transport {
            details: "no HTTP response".to_string(),
        }),
        other => Err(FetchError::Transport {
            details: format!("HTTP {other}"),
        }),
    }
}
