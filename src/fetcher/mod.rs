//! Data-fetching seam: one [`Request`] per management-endpoint query, answered
//! with raw payload bytes by a [`Fetcher`] implementation.

#![allow(missing_docs)]

pub mod curl;
pub mod fixture;

use std::fmt;

pub use crate::core::errors::FetchError;

/// Federation traffic direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    /// Destinations this member sends to.
    Outgoing,
    /// Origins that send to this member.
    Incoming,
}

impl Direction {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Outgoing => "outgoing",
            Self::Incoming => "incoming",
        }
    }
}

/// Elastic-data journal kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Journal {
    Flash,
    Ram,
}

impl Journal {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Flash => "flash",
            Self::Ram => "ram",
        }
    }
}

/// Every query the aggregator can issue against the management endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Request {
    Cluster,
    Members,
    MemberOs { node_id: String },
    Services,
    Caches { service: String },
    Topics { service: String },
    TopicMembers { service: String, topic: String },
    TopicSubscribers { service: String, topic: String },
    Health,
    Storage,
    Proxies,
    Reporters,
    Federation { service: String, direction: Direction },
    ElasticData { journal: Journal },
    HttpSessions,
    Executors,
    ViewCaches { service: String },
    ServiceMembers { service: String },
    CacheMembers { service: String, cache: String },
}

impl Request {
    /// REST path relative to the cluster management URL.
    #[must_use]
    pub fn path(&self) -> String {
        match self {
            Self::Cluster => "/".to_string(),
            Self::Members => "/members/".to_string(),
            Self::MemberOs { node_id } => {
                format!("/members/{}/platform/operatingSystem", encode_segment(node_id))
            }
            Self::Services => "/services/members/".to_string(),
            Self::Caches { service } => format!("/services/{}/caches", encode_segment(service)),
            Self::Topics { service } => format!("/services/{}/topics", encode_segment(service)),
            Self::TopicMembers { service, topic } => format!(
                "/services/{}/topics/{}/members",
                encode_segment(service),
                encode_segment(topic)
            ),
            Self::TopicSubscribers { service, topic } => format!(
                "/services/{}/topics/{}/subscribers",
                encode_segment(service),
                encode_segment(topic)
            ),
            Self::Health => "/health/members".to_string(),
            Self::Storage => "/storage/members".to_string(),
            Self::Proxies => "/services/proxy/members/".to_string(),
            Self::Reporters => "/reporters".to_string(),
            Self::Federation { service, direction } => format!(
                "/services/{}/federation/statistics/{}/participants",
                encode_segment(service),
                direction.as_str()
            ),
            Self::ElasticData { journal } => format!("/journal/{}/members", journal.as_str()),
            Self::HttpSessions => "/webApplications".to_string(),
            Self::Executors => "/executors/members".to_string(),
            Self::ViewCaches { service } => {
                format!("/services/{}/views/members", encode_segment(service))
            }
            Self::ServiceMembers { service } => {
                format!("/services/{}/members/", encode_segment(service))
            }
            Self::CacheMembers { service, cache } => format!(
                "/services/{}/caches/{}/members",
                encode_segment(service),
                encode_segment(cache)
            ),
        }
    }

    /// Flat file name used by [`fixture::FixtureFetcher`].
    #[must_use]
    pub fn fixture_name(&self) -> String {
        let stem = match self {
            Self::Cluster => "cluster".to_string(),
            Self::Members => "members".to_string(),
            Self::MemberOs { node_id } => format!("member-os-{node_id}"),
            Self::Services => "services".to_string(),
            Self::Caches { service } => format!("caches-{service}"),
            Self::Topics { service } => format!("topics-{service}"),
            Self::TopicMembers { service, topic } => format!("topic-members-{service}-{topic}"),
            Self::TopicSubscribers { service, topic } => {
                format!("topic-subscribers-{service}-{topic}")
            }
            Self::Health => "health".to_string(),
            Self::Storage => "storage".to_string(),
            Self::Proxies => "proxies".to_string(),
            Self::Reporters => "reporters".to_string(),
            Self::Federation { service, direction } => {
                format!("federation-{}-{service}", direction.as_str())
            }
            Self::ElasticData { journal } => format!("journal-{}", journal.as_str()),
            Self::HttpSessions => "http-sessions".to_string(),
            Self::Executors => "executors".to_string(),
            Self::ViewCaches { service } => format!("view-caches-{service}"),
            Self::ServiceMembers { service } => format!("service-members-{service}"),
            Self::CacheMembers { service, cache } => format!("cache-members-{service}-{cache}"),
        };
        let safe: String = stem
            .chars()
            .map(|c| {
                if c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.') {
                    c
                } else {
                    '_'
                }
            })
            .collect();
        format!("{safe}.json")
    }
}

impl fmt::Display for Request {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.path())
    }
}

/// Source of raw management payloads.
///
/// Implementations must be shareable across the aggregator's worker threads.
pub trait Fetcher: Send + Sync {
    /// Issue one request and return the raw response body.
    fn fetch(&self, request: &Request) -> Result<Vec<u8>, FetchError>;

    /// Human-readable description of where requests go.
    fn endpoint(&self) -> String;
}

impl<T: Fetcher + ?Sized> Fetcher for &T {
    fn fetch(&self, request: &Request) -> Result<Vec<u8>, FetchError> {
        (**self).fetch(request)
    }

    fn endpoint(&self) -> String {
        (**self).endpoint()
    }
}

impl<T: Fetcher + ?Sized> Fetcher for Box<T> {
    fn fetch(&self, request: &Request) -> Result<Vec<u8>, FetchError> {
        (**self).fetch(request)
    }

    fn endpoint(&self) -> String {
        (**self).endpoint()
    }
}

impl<T: Fetcher + ?Sized> Fetcher for std::sync::Arc<T> {
    fn fetch(&self, request: &Request) -> Result<Vec<u8>, FetchError> {
        (**self).fetch(request)
    }

    fn endpoint(&self) -> String {
        (**self).endpoint()
    }
}

/// Percent-encode a single path segment (RFC 3986 unreserved set passes through).
fn encode_segment(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for byte in raw.bytes() {
        if byte.is_ascii_alphanumeric() || matches!(byte, b'-' | b'_' | b'.' | b'~' | b'$') {
            out.push(char::from(byte));
        } else {
            out.push_str(&format!("%{byte:02X}"));
        }
    }
    out
}
