//! MON-prefixed error types with structured error codes.

#![allow(missing_docs)]

use std::path::{Path, PathBuf};

use thiserror::Error;

/// Shared `Result` alias for the project.
pub type Result<T> = std::result::Result<T, MonError>;

/// Failure reported by a [`crate::fetcher::Fetcher`] for a single request.
///
/// `NotFound` is distinguished from the other kinds so that the aggregator
/// can treat "nothing there" as an empty result rather than a failure.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchError {
    #[error("not found")]
    NotFound,

    #[error("authentication rejected (HTTP {status})")]
    Auth { status: u16 },

    #[error("timed out after {secs}s")]
    Timeout { secs: u64 },

    #[error("transport failure: {details}")]
    Transport { details: String },
}

impl FetchError {
    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound)
    }
}

/// Top-level error type for clustermon.
#[derive(Debug, Error)]
pub enum MonError {
    #[error("[MON-1001] invalid configuration: {details}")]
    InvalidConfig { details: String },

    #[error("[MON-1002] missing configuration file: {path}")]
    MissingConfig { path: PathBuf },

    #[error("[MON-1003] configuration parse failure in {context}: {details}")]
    ConfigParse {
        context: &'static str,
        details: String,
    },

    #[error("[MON-1101] invalid layout {spec:?}: {details}")]
    InvalidLayout { spec: String, details: String },

    #[error("[MON-1102] unknown panel or layout: {panel}")]
    UnknownPanel { panel: String },

    #[error("[MON-1103] panel {panel} is already registered")]
    DuplicatePanel { panel: String },

    #[error("[MON-1104] panel {panel} requires a selected {what}")]
    MissingSelection {
        panel: String,
        what: &'static str,
    },

    #[error("[MON-1105] panel {panel} declares no data groups")]
    PanelWithoutData { panel: String },

    #[error("[MON-2001] unable to connect to cluster at {endpoint}: {source}")]
    Connect {
        endpoint: String,
        #[source]
        source: FetchError,
    },

    #[error("[MON-2002] {failed} data group(s) failed: {summary}")]
    PartialFetch { failed: usize, summary: String },

    #[error("[MON-2003] request {request} failed: {source}")]
    Fetch {
        request: String,
        #[source]
        source: FetchError,
    },

    #[error("[MON-2004] unable to decode {context}: {details}")]
    Decode { context: String, details: String },

    #[error("[MON-2101] serialization failure in {context}: {details}")]
    Serialization {
        context: &'static str,
        details: String,
    },

    #[error("[MON-3001] rendering failure: {details}")]
    Rendering { details: String },

    #[error("[MON-3002] IO failure at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("[MON-3003] channel closed in component {component}")]
    ChannelClosed { component: &'static str },

    #[error("[MON-3900] runtime failure: {details}")]
    Runtime { details: String },
}

impl MonError {
    /// Stable machine-parseable error code.
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::InvalidConfig { .. } => "MON-1001",
            Self::MissingConfig { .. } => "MON-1002",
            Self::ConfigParse { .. } => "MON-1003",
            Self::InvalidLayout { .. } => "MON-1101",
            Self::UnknownPanel { .. } => "MON-1102",
            Self::DuplicatePanel { .. } => "MON-1103",
            Self::MissingSelection { .. } => "MON-1104",
            Self::PanelWithoutData { .. } => "MON-1105",
            Self::Connect { .. } => "MON-2001",
            Self::PartialFetch { .. } => "MON-2002",
            Self::Fetch { .. } => "MON-2003",
            Self::Decode { .. } => "MON-2004",
            Self::Serialization { .. } => "MON-2101",
            Self::Rendering { .. } => "MON-3001",
            Self::Io { .. } => "MON-3002",
            Self::ChannelClosed { .. } => "MON-3003",
            Self::Runtime { .. } => "MON-3900",
        }
    }

    /// Whether retrying might resolve the failure.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::Connect { .. }
                | Self::PartialFetch { .. }
                | Self::Fetch { .. }
                | Self::Io { .. }
                | Self::ChannelClosed { .. }
                | Self::Runtime { .. }
        )
    }

    /// Convenience constructor for IO errors with a known path.
    #[must_use]
    pub fn io(path: impl AsRef<Path>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.as_ref().to_path_buf(),
            source,
        }
    }

    /// Collapse a batch of group errors into a single `PartialFetch`.
    #[must_use]
    pub fn partial(errors: &[Self]) -> Self {
        let summary = errors
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join("; ");
        Self::PartialFetch {
            failed: errors.len(),
            summary,
        }
    }
}

impl From<serde_json::Error> for MonError {
    fn from(value: serde_json::Error) -> Self {
        Self::Serialization {
            context: "serde_json",
            details: value.to_string(),
        }
    }
}

impl From<toml::de::Error> for MonError {
    fn from(value: toml::de::Error) -> Self {
        Self::ConfigParse {
            context: "toml",
            details: value.to_string(),
        }
    }
}

impl From<toml::ser::Error> for MonError {
    fn from(value: toml::ser::Error) -> Self {
        Self::Serialization {
            context: "toml",
            details: value.to_string(),
        }
    }
}
