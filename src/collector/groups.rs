//! Data groups: the independently fetchable categories of cluster statistics.

#![allow(missing_docs)]

use std::collections::BTreeSet;
use std::fmt;

/// One independently fetchable category of cluster statistics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum DataGroup {
    Members,
    Machines,
    Services,
    Caches,
    Topics,
    Health,
    Storage,
    Proxies,
    Reporters,
    Federation,
    ElasticData,
    HttpSessions,
    Executors,
    ViewCaches,
    /// Per-member detail of the selected service.
    ServiceMembers,
    /// Per-member detail of the selected cache.
    CacheMembers,
}

/// Set of data groups, ordered for stable iteration.
pub type GroupSet = BTreeSet<DataGroup>;

impl DataGroup {
    /// Groups collected when no explicit set is requested.
    pub const CATALOGUE: [Self; 14] = [
        Self::Members,
        Self::Machines,
        Self::Services,
        Self::Caches,
        Self::Topics,
        Self::Health,
        Self::Storage,
        Self::Proxies,
        Self::Reporters,
        Self::Federation,
        Self::ElasticData,
        Self::HttpSessions,
        Self::Executors,
        Self::ViewCaches,
    ];

    /// Every group, including those scoped to a selection.
    pub const ALL: [Self; 16] = [
        Self::Members,
        Self::Machines,
        Self::Services,
        Self::Caches,
        Self::Topics,
        Self::Health,
        Self::Storage,
        Self::Proxies,
        Self::Reporters,
        Self::Federation,
        Self::ElasticData,
        Self::HttpSessions,
        Self::Executors,
        Self::ViewCaches,
        Self::ServiceMembers,
        Self::CacheMembers,
    ];

    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Members => "members",
            Self::Machines => "machines",
            Self::Services => "services",
            Self::Caches => "caches",
            Self::Topics => "topics",
            Self::Health => "health",
            Self::Storage => "storage",
            Self::Proxies => "proxies",
            Self::Reporters => "reporters",
            Self::Federation => "federation",
            Self::ElasticData => "elastic-data",
            Self::HttpSessions => "http-sessions",
            Self::Executors => "executors",
            Self::ViewCaches => "view-caches",
            Self::ServiceMembers => "service-members",
            Self::CacheMembers => "cache-members",
        }
    }

    /// Full catalogue as a set.
    #[must_use]
    pub fn catalogue() -> GroupSet {
        Self::CATALOGUE.into_iter().collect()
    }
}

impl fmt::Display for DataGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// The currently selected service/cache/topic/subscriber, used by
/// selection-scoped groups and panel title tokens.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selection {
    pub service: Option<String>,
    pub cache: Option<String>,
    pub topic: Option<String>,
    pub subscriber: Option<String>,
}

impl Selection {
    #[must_use]
    pub fn service(&self) -> Option<&str> {
        self.service.as_deref()
    }

    #[must_use]
    pub fn cache(&self) -> Option<&str> {
        self.cache.as_deref()
    }

    #[must_use]
    pub fn topic(&self) -> Option<&str> {
        self.topic.as_deref()
    }

    #[must_use]
    pub fn subscriber(&self) -> Option<&str> {
        self.subscriber.as_deref()
    }
}
