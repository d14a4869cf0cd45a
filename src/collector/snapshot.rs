//! The merged result of one collection cycle.

#![allow(missing_docs)]

use std::time::Duration;

use chrono::{DateTime, Local};

use super::groups::{DataGroup, GroupSet};
use crate::model::payloads::{
    CacheMember, CacheSummary, ClusterInfo, ElasticData, Executor, FederationSummary,
    HealthSummary, HttpSessionSummary, MachineInfo, Member, ProxySummary, Reporter,
    ServiceMember, ServiceSummary, StorageDetail, TopicSummary, ViewCache,
};

/// Aggregate of every statistics feed gathered in one refresh cycle.
///
/// Built once by the aggregator and never mutated afterwards. A field whose
/// group was skipped or failed keeps its zero value.
#[derive(Debug, Clone, Default)]
pub struct ClusterSnapshot {
    pub cluster: ClusterInfo,
    /// When the identity check for this snapshot succeeded.
    pub retrieved_at: Option<DateTime<Local>>,
    /// Wall time spent building the snapshot.
    pub duration: Duration,
    /// Groups that were launched.
    pub requested: GroupSet,
    /// Launched groups that raised at least one error.
    pub failed: GroupSet,

    pub members: Vec<Member>,
    pub machines: Vec<MachineInfo>,
    pub services: Vec<ServiceSummary>,
    pub caches: Vec<CacheSummary>,
    pub topics: Vec<TopicSummary>,
    pub health: Vec<HealthSummary>,
    pub storage: Vec<StorageDetail>,
    pub proxies: Vec<ProxySummary>,
    pub reporters: Vec<Reporter>,
    pub federation_destinations: Vec<FederationSummary>,
    pub federation_origins: Vec<FederationSummary>,
    pub elastic_flash: Vec<ElasticData>,
    pub elastic_ram: Vec<ElasticData>,
    pub http_sessions: Vec<HttpSessionSummary>,
    pub executors: Vec<Executor>,
    /// One row per view per member hosting it.
    pub view_caches: Vec<ViewCache>,
    pub service_members: Vec<ServiceMember>,
    pub cache_members: Vec<CacheMember>,
}

/// The fields produced by one successful group task.
#[derive(Debug, Clone)]
pub enum GroupData {
    Members(Vec<Member>),
    Machines(Vec<MachineInfo>),
    Services(Vec<ServiceSummary>),
    Caches(Vec<CacheSummary>),
    Topics(Vec<TopicSummary>),
    Health(Vec<HealthSummary>),
    Storage(Vec<StorageDetail>),
    Proxies(Vec<ProxySummary>),
    Reporters(Vec<Reporter>),
    Federation {
        destinations: Vec<FederationSummary>,
        origins: Vec<FederationSummary>,
    },
    ElasticData {
        flash: Vec<ElasticData>,
        ram: Vec<ElasticData>,
    },
    HttpSessions(Vec<HttpSessionSummary>),
    Executors(Vec<Executor>),
    ViewCaches(Vec<ViewCache>),
    ServiceMembers(Vec<ServiceMember>),
    CacheMembers(Vec<CacheMember>),
}

impl GroupData {
    #[must_use]
    pub const fn group(&self) -> DataGroup {
        match self {
            Self::Members(_) => DataGroup::Members,
            Self::Machines(_) => DataGroup::Machines,
            Self::Services(_) => DataGroup::Services,
            Self::Caches(_) => DataGroup::Caches,
            Self::Topics(_) => DataGroup::Topics,
            Self::Health(_) => DataGroup::Health,
            Self::Storage(_) => DataGroup::Storage,
            Self::Proxies(_) => DataGroup::Proxies,
            Self::Reporters(_) => DataGroup::Reporters,
            Self::Federation { .. } => DataGroup::Federation,
            Self::ElasticData { .. } => DataGroup::ElasticData,
            Self::HttpSessions(_) => DataGroup::HttpSessions,
            Self::Executors(_) => DataGroup::Executors,
            Self::ViewCaches(_) => DataGroup::ViewCaches,
            Self::ServiceMembers(_) => DataGroup::ServiceMembers,
            Self::CacheMembers(_) => DataGroup::CacheMembers,
        }
    }
}

impl ClusterSnapshot {
    /// Fresh snapshot for a verified cluster identity.
    #[must_use]
    pub fn new(cluster: ClusterInfo, requested: GroupSet) -> Self {
        Self {
            cluster,
            retrieved_at: Some(Local::now()),
            requested,
            ..Self::default()
        }
    }

    /// Whether `group` was fetched successfully into this snapshot.
    #[must_use]
    pub fn is_populated(&self, group: DataGroup) -> bool {
        self.requested.contains(&group) && !self.failed.contains(&group)
    }

    /// Whether any requested group failed.
    #[must_use]
    pub fn is_partial(&self) -> bool {
        !self.failed.is_empty()
    }

    /// Store one group's result in its own field(s).
    pub fn apply(&mut self, data: GroupData) {
        match data {
            GroupData::Members(v) => self.members = v,
            GroupData::Machines(v) => self.machines = v,
            GroupData::Services(v) => self.services = v,
            GroupData::Caches(v) => self.caches = v,
            GroupData::Topics(v) => self.topics = v,
            GroupData::Health(v) => self.health = v,
            GroupData::Storage(v) => self.storage = v,
            GroupData::Proxies(v) => self.proxies = v,
            GroupData::Reporters(v) => self.reporters = v,
            GroupData::Federation {
                destinations,
                origins,
            } => {
                self.federation_destinations = destinations;
                self.federation_origins = origins;
            }
            GroupData::ElasticData { flash, ram } => {
                self.elastic_flash = flash;
                self.elastic_ram = ram;
            }
            GroupData::HttpSessions(v) => self.http_sessions = v,
            GroupData::Executors(v) => self.executors = v,
            GroupData::ViewCaches(v) => self.view_caches = v,
            GroupData::ServiceMembers(v) => self.service_members = v,
            GroupData::CacheMembers(v) => self.cache_members = v,
        }
    }

    /// Mark `group` failed; its fields stay at their zero value.
    pub fn mark_failed(&mut self, group: DataGroup) {
        self.failed.insert(group);
    }

    /// Whether the field(s) owned by `group` hold any data.
    #[must_use]
    pub fn has_data(&self, group: DataGroup) -> bool {
        match group {
            DataGroup::Members => !self.members.is_empty(),
            DataGroup::Machines => !self.machines.is_empty(),
            DataGroup::Services => !self.services.is_empty(),
            DataGroup::Caches => !self.caches.is_empty(),
            DataGroup::Topics => !self.topics.is_empty(),
            DataGroup::Health => !self.health.is_empty(),
            DataGroup::Storage => !self.storage.is_empty(),
            DataGroup::Proxies => !self.proxies.is_empty(),
            DataGroup::Reporters => !self.reporters.is_empty(),
            DataGroup::Federation => {
                !self.federation_destinations.is_empty() || !self.federation_origins.is_empty()
            }
            DataGroup::ElasticData => !self.elastic_flash.is_empty() || !self.elastic_ram.is_empty(),
            DataGroup::HttpSessions => !self.http_sessions.is_empty(),
            DataGroup::Executors => !self.executors.is_empty(),
            DataGroup::ViewCaches => !self.view_caches.is_empty(),
            DataGroup::ServiceMembers => !self.service_members.is_empty(),
            DataGroup::CacheMembers => !self.cache_members.is_empty(),
        }
    }
}
