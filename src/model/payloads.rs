//! Serde models for management endpoint payloads.
//!
//! Every struct tolerates missing fields so that older or newer cluster
//! versions decode without error.

#![allow(missing_docs)]

use serde::{Deserialize, Serialize};

/// `{"items": [...]}` list envelope.
#[derive(Debug, Clone, Deserialize)]
pub struct Items<T> {
    #[serde(default = "Vec::new")]
    pub items: Vec<T>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ClusterInfo {
    pub cluster_name: String,
    pub cluster_size: u32,
    pub license_mode: String,
    pub version: String,
    pub running: bool,
    pub members_departure_count: u32,
    pub members_departed: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Member {
    pub node_id: String,
    pub unicast_address: String,
    pub unicast_port: u32,
    pub role_name: String,
    pub member_name: String,
    pub machine_name: String,
    pub rack_name: String,
    pub site_name: String,
    pub process_name: String,
    #[serde(rename = "memoryMaxMB")]
    pub memory_max_mb: i64,
    #[serde(rename = "memoryAvailableMB")]
    pub memory_available_mb: i64,
    pub receiver_success_rate: f64,
    pub publisher_success_rate: f64,
    pub packets_sent: i64,
    pub packets_received: i64,
    pub packets_resent: i64,
    pub storage_enabled: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct StorageDetail {
    pub node_id: String,
    pub owned_partitions_primary: i64,
}

/// Operating-system view of one machine, fetched through one of its members.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct MachineInfo {
    #[serde(skip_deserializing)]
    pub machine_name: String,
    pub available_processors: i64,
    pub system_load_average: f64,
    pub system_cpu_load: f64,
    pub total_physical_memory_size: i64,
    pub free_physical_memory_size: i64,
    pub arch: String,
    pub name: String,
    pub version: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ServiceSummary {
    pub node_id: String,
    #[serde(rename = "name")]
    pub service_name: String,
    #[serde(rename = "type")]
    pub service_type: String,
    pub member_count: i64,
    pub storage_enabled_count: i64,
    #[serde(rename = "statusHA")]
    pub status_ha: String,
    pub partitions_all: i64,
    pub partitions_endangered: i64,
    pub partitions_vulnerable: i64,
    pub partitions_unbalanced: i64,
    pub storage_enabled: bool,
    pub quorum_status: String,
    pub persistence_mode: String,
    pub persistence_active_space_used: i64,
    pub persistence_backup_space_used: i64,
    pub persistence_latency_max: i64,
    pub persistence_latency_average: f64,
}

impl ServiceSummary {
    /// Partitioned cache services (plain or federated) own caches.
    #[must_use]
    pub fn is_cache_service(&self) -> bool {
        matches!(
            self.service_type.as_str(),
            "DistributedCache" | "FederatedCache" | "PagedTopic"
        )
    }

    #[must_use]
    pub fn is_federated(&self) -> bool {
        self.service_type == "FederatedCache"
    }

    #[must_use]
    pub fn is_topic_service(&self) -> bool {
        self.service_type == "PagedTopic"
    }

    #[must_use]
    pub fn has_persistence(&self) -> bool {
        !self.persistence_mode.is_empty() && self.persistence_mode != "n/a"
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CacheSummary {
    #[serde(rename = "service")]
    pub service_name: String,
    #[serde(rename = "name")]
    pub cache_name: String,
    #[serde(rename = "size")]
    pub cache_size: i64,
    pub units_bytes: i64,
    pub total_puts: i64,
    pub total_gets: i64,
    #[serde(rename = "removeCount")]
    pub total_removes: i64,
    pub cache_hits: i64,
    pub cache_misses: i64,
}

/// One member's copy of a view (continuous query cache).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ViewCache {
    #[serde(rename = "service")]
    pub service_name: String,
    #[serde(rename = "name")]
    pub view_name: String,
    pub node_id: String,
    pub size: i64,
    pub read_only: bool,
    pub transformed: bool,
    pub filter: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TopicDetail {
    #[serde(rename = "service")]
    pub service_name: String,
    #[serde(rename = "name")]
    pub topic_name: String,
    pub channel_count: i64,
    pub published_count: i64,
    pub page_capacity: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TopicMember {
    pub node_id: String,
    pub published_count: i64,
    pub published_mean_rate: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TopicSubscriber {
    pub id: i64,
    pub node_id: String,
    pub state_name: String,
    pub channels: i64,
    pub received_count: i64,
    pub backlog: i64,
    pub subscriber_group: String,
}

/// A topic with its per-member and per-subscriber detail rolled up.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TopicSummary {
    pub detail: TopicDetail,
    pub member_count: usize,
    pub published_total: i64,
    pub subscriber_count: usize,
    pub subscribers: Vec<TopicSubscriber>,
    pub backlog_total: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct HealthSummary {
    #[serde(rename = "type")]
    pub health_type: String,
    pub sub_type: String,
    pub name: String,
    pub description: String,
    pub node_id: String,
    pub member_health_check: bool,
    pub ready: bool,
    pub started: bool,
    pub live: bool,
    pub safe: bool,
}

/// Health checks of one name/sub-type rolled up across members.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HealthRollup {
    pub name: String,
    pub sub_type: String,
    pub total: usize,
    pub started: usize,
    pub ready: usize,
    pub live: usize,
    pub safe: usize,
}

impl HealthRollup {
    /// Whether every member reports every flag.
    #[must_use]
    pub fn is_healthy(&self) -> bool {
        [self.started, self.ready, self.live, self.safe]
            .iter()
            .all(|count| *count == self.total)
    }
}

/// Roll health entries up per (name, sub-type), keeping first-seen order.
#[must_use]
pub fn summarise_health(entries: &[HealthSummary]) -> Vec<HealthRollup> {
    let mut rollups: Vec<HealthRollup> = Vec::new();
    for entry in entries {
        let index = match rollups
            .iter()
            .position(|r| r.name == entry.name && r.sub_type == entry.sub_type)
        {
            Some(index) => index,
            None => {
                rollups.push(HealthRollup {
                    name: entry.name.clone(),
                    sub_type: entry.sub_type.clone(),
                    ..HealthRollup::default()
                });
                rollups.len() - 1
            }
        };
        let rollup = &mut rollups[index];
        rollup.total += 1;
        rollup.started += usize::from(entry.started);
        rollup.ready += usize::from(entry.ready);
        rollup.live += usize::from(entry.live);
        rollup.safe += usize::from(entry.safe);
    }
    rollups
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ProxySummary {
    #[serde(rename = "hostIP")]
    pub host_ip: String,
    pub node_id: String,
    #[serde(rename = "name")]
    pub service_name: String,
    #[serde(rename = "type")]
    pub proxy_type: String,
    pub protocol: String,
    pub connection_count: i64,
    pub outgoing_message_backlog: i64,
    pub outgoing_byte_backlog: i64,
    pub total_bytes_received: i64,
    pub total_bytes_sent: i64,
    pub total_messages_received: i64,
    pub total_messages_sent: i64,
    #[serde(rename = "unauthorizedConnectionAttempts")]
    pub unauth_connection_attempts: i64,
    pub http_server_type: String,
    pub total_request_count: i64,
    pub total_error_count: i64,
    pub response_count_1xx: i64,
    pub response_count_2xx: i64,
    pub response_count_3xx: i64,
    pub response_count_4xx: i64,
    pub response_count_5xx: i64,
}

impl ProxySummary {
    #[must_use]
    pub fn is_http(&self) -> bool {
        self.protocol.eq_ignore_ascii_case("http")
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Reporter {
    pub node_id: String,
    pub state: String,
    pub output_path: String,
    pub config_file: String,
    pub last_report: String,
    #[serde(rename = "runLastMillis")]
    pub last_run_millis: i64,
    pub current_batch: i64,
    pub interval_seconds: i64,
    pub run_average_millis: f64,
    pub auto_start: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct StatsSummary {
    pub count: i64,
    pub average: f64,
    pub min: f64,
    pub max: f64,
    pub sum: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct FederationSummary {
    pub service_name: String,
    pub participant_name: String,
    pub state: Vec<String>,
    pub member: Vec<String>,
    pub total_msg_sent: StatsSummary,
    pub total_bytes_sent: StatsSummary,
    pub total_records_sent: StatsSummary,
    pub msg_network_round_trip_time_percentile_millis: StatsSummary,
    pub record_backlog_delay_time_percentile_millis: StatsSummary,
    pub replicate_all_percent_complete: StatsSummary,
    pub current_bandwidth: StatsSummary,
    pub total_msg_received: StatsSummary,
    pub total_bytes_received: StatsSummary,
    pub total_records_received: StatsSummary,
    pub current_connection_count: StatsSummary,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ElasticData {
    pub node_id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub journal_type: String,
    pub file_count: i64,
    pub max_journal_files_number: i64,
    pub current_collector_load_factor: f64,
    pub highest_load_factor: f64,
    pub compaction_count: i64,
    pub exhaustive_compaction_count: i64,
    pub max_file_size: i64,
    pub total_data_size: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct HttpSessionSummary {
    pub node_id: String,
    pub app_id: String,
    #[serde(rename = "type")]
    pub session_type: String,
    pub session_cache_name: String,
    pub overflow_cache_name: String,
    pub session_timeout: i64,
    pub session_average_size: i64,
    pub reaped_sessions_total: i64,
    pub average_reap_duration: i64,
    pub last_reap_duration: i64,
    pub session_updates: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Executor {
    pub name: String,
    pub id: String,
    pub description: String,
    pub member_id: String,
    pub state: String,
    pub location: String,
    pub tasks_in_progress_count: i64,
    pub tasks_completed_count: i64,
    pub tasks_rejected_count: i64,
    pub member_count: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ServiceMember {
    pub node_id: String,
    pub thread_count: i64,
    pub thread_idle_count: i64,
    pub task_count: i64,
    pub task_backlog: i64,
    pub owned_partitions_primary: i64,
    pub owned_partitions_backup: i64,
    pub request_average_duration: f64,
    pub task_average_duration: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CacheMember {
    pub node_id: String,
    pub tier: String,
    pub units_bytes: i64,
    #[serde(rename = "size")]
    pub cache_size: i64,
    pub total_puts: i64,
    pub total_gets: i64,
    #[serde(rename = "removeCount")]
    pub total_removes: i64,
    pub cache_hits: i64,
    pub cache_misses: i64,
    pub store_reads: i64,
    pub store_writes: i64,
    pub store_failures: i64,
}
