//! Offline fetcher serving payloads from a directory of JSON files.

#![allow(missing_docs)]

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use super::{FetchError, Fetcher, Request};

/// Serves `<dir>/<request.fixture_name()>`; a missing file is `NotFound`.
#[derive(Debug, Clone)]
pub struct FixtureFetcher {
    dir: PathBuf,
}

impl FixtureFetcher {
    #[must_use]
    pub fn new(dir: impl AsRef<Path>) -> Self {
        Self {
            dir: dir.as_ref().to_path_buf(),
        }
    }
}

impl Fetcher for FixtureFetcher {
    fn fetch(&self, request: &Request) -> Result<Vec<u8>, FetchError> {
        let path = self.dir.join(request.fixture_name());
        match fs::read(&path) {
            Ok(bytes) => Ok(bytes),
            Err(e) if e.kind() == ErrorKind::NotFound => Err(FetchError::NotFound),
            Err(e) => Err(FetchError::Transport {
                details: format!("{}: {e}", path.display()),
            }),
        }
    }

    fn endpoint(&self) -> String {
        format!("fixtures:{}", self.dir.display())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serves_files_and_reports_missing_as_not_found() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("members.json"), br#"{"items":[]}"#).unwrap();
        let fetcher = FixtureFetcher::new(dir.path());

        assert_eq!(
            fetcher.fetch(&Request::Members).unwrap(),
            br#"{"items":[]}"#.to_vec()
        );
        assert_eq!(fetcher.fetch(&Request::Health), Err(FetchError::NotFound));
        assert!(fetcher.endpoint().starts_with("fixtures:"));
    }
}
