//! Panel content: pure functions from a snapshot to rendered lines.
//!
//! Nothing here fetches or mutates; every function reads the snapshot it is
//! handed and the explicit [`RenderOptions`].

#![allow(missing_docs)]
#![allow(clippy::cast_possible_truncation, clippy::cast_precision_loss)]

use std::collections::BTreeMap;

use crate::collector::{ClusterSnapshot, Selection};
use crate::core::errors::Result;
use crate::format::highlight;
use crate::format::units::{
    format_bytes, format_count, format_float, format_mb, format_millis, format_percent,
};
use crate::format::table::Align::{Left as L, Right as R};
use crate::format::{RenderOptions, Rendered, Table};
use crate::model::departed::decode_departed;
use crate::model::payloads::{
    FederationSummary, Member, ProxySummary, ServiceSummary, ViewCache, summarise_health,
};

use super::registry::{Panel, PanelKind};

/// Inputs a content function may read besides the snapshot.
#[derive(Debug, Clone, Copy)]
pub struct ContentContext<'a> {
    pub options: &'a RenderOptions,
    pub selection: &'a Selection,
}

/// Render `panel` from `snapshot`. Empty output means "no content".
pub fn produce_lines(
    panel: &Panel,
    snapshot: &ClusterSnapshot,
    ctx: &ContentContext<'_>,
) -> Result<Rendered> {
    panel.check_selection(ctx.selection)?;
    let opts = ctx.options;
    let out = match panel.kind {
        PanelKind::Members => members(snapshot, opts, true, true),
        PanelKind::MembersShort => members(snapshot, opts, false, true),
        PanelKind::MembersSummary => members(snapshot, opts, true, false),
        PanelKind::DepartedMembers => departed(snapshot, opts)?,
        PanelKind::NetworkStats => network_stats(&snapshot.members, opts),
        PanelKind::Machines => machines(snapshot, opts),
        PanelKind::Services => services(&snapshot.services, opts),
        PanelKind::Persistence => persistence(&snapshot.services, opts),
        PanelKind::Caches => caches(snapshot, opts),
        PanelKind::Topics => topics(snapshot, opts),
        PanelKind::TopicSubscribers => topic_subscribers(snapshot, ctx.selection, opts),
        PanelKind::HealthSummary => health(snapshot, opts),
        PanelKind::Proxies => tcp_proxies(&snapshot.proxies, opts),
        PanelKind::HttpServers => http_servers(&snapshot.proxies, opts),
        PanelKind::Reporters => reporters(snapshot, opts),
        PanelKind::FederationAll => {
            let mut out = federation(&snapshot.federation_destinations, Flow::Outgoing, opts);
            let origins = federation(&snapshot.federation_origins, Flow::Incoming, opts);
            if !out.is_empty() && !origins.is_empty() {
                out.lines.push("".into());
            }
            out.append(origins);
            out
        }
        PanelKind::FederationDestinations => {
            federation(&snapshot.federation_destinations, Flow::Outgoing, opts)
        }
        PanelKind::FederationOrigins => {
            federation(&snapshot.federation_origins, Flow::Incoming, opts)
        }
        PanelKind::ElasticData => elastic_data(snapshot, opts),
        PanelKind::HttpSessions => http_sessions(snapshot, opts),
        PanelKind::Executors => executors(snapshot, opts),
        PanelKind::ViewCaches => view_caches(snapshot, opts),
        PanelKind::ServiceMembers => service_members(snapshot, opts),
        PanelKind::CacheDetails => cache_details(snapshot, opts),
    };
    Ok(out)
}

// ──────────────────── members ────────────────────

fn node_order(node_id: &str) -> u64 {
    node_id.trim().parse().unwrap_or(u64::MAX)
}

fn members(
    snapshot: &ClusterSnapshot,
    opts: &RenderOptions,
    with_summary: bool,
    with_table: bool,
) -> Rendered {
    let list = &snapshot.members;
    if list.is_empty() {
        return Rendered::default();
    }
    let storage: BTreeMap<&str, bool> = snapshot
        .storage
        .iter()
        .map(|s| (s.node_id.as_str(), s.owned_partitions_primary > 0))
        .collect();
    let is_storage = |m: &Member| {
        storage
            .get(m.node_id.as_str())
            .copied()
            .unwrap_or(m.storage_enabled)
    };

    let mut out = Rendered::default();
    if with_summary {
        let max: i64 = list.iter().map(|m| m.memory_max_mb).sum();
        let available: i64 = list.iter().map(|m| m.memory_available_mb).sum();
        let available_pct = if max > 0 {
            format!("{:4.1}%", available as f64 / max as f64 * 100.0)
        } else {
            "n/a".to_string()
        };
        out.lines.push(format!("Total cluster members: {}", list.len()).into());
        out.lines.push(
            format!(
                "Storage enabled count: {}, Departure count: {}",
                list.iter().filter(|m| is_storage(m)).count(),
                snapshot.cluster.members_departure_count
            )
            .into(),
        );
        out.lines.push(
            format!(
                "Cluster Heap - Total: {}, Used: {}, Available: {} ({available_pct})",
                format_mb(max),
                format_mb(max - available),
                format_mb(available)
            )
            .into(),
        );
    }
    if !with_table {
        return out;
    }

    let mut table = Table::new(&[
        "NODE ID", "ADDRESS", "PORT", "PROCESS", "MEMBER", "ROLE", "STORAGE", "MAX HEAP",
        "USED HEAP", "AVAIL HEAP",
    ])
    .aligned(&[R, L, R, L, L, L, L, R, R, R]);
    if opts.wide {
        table = table
            .with_extra_columns(
                &["MACHINE", "RACK", "SITE", "PUBLISHER", "RECEIVER"],
                &[L, L, L, R, R],
            )
            .highlight(13, highlight::network_rate)
            .highlight(14, highlight::network_rate);
    }
    let mut sorted: Vec<&Member> = list.iter().collect();
    sorted.sort_by_key(|m| node_order(&m.node_id));
    for m in sorted {
        table.add_row([
            m.node_id.clone(),
            m.unicast_address.clone(),
            m.unicast_port.to_string(),
            m.process_name.clone(),
            m.member_name.clone(),
            m.role_name.clone(),
            is_storage(m).to_string(),
            format_mb(m.memory_max_mb),
            format_mb(m.memory_max_mb - m.memory_available_mb),
            format_mb(m.memory_available_mb),
        ]);
        if opts.wide {
            table.append_to_last_row([
                m.machine_name.clone(),
                m.rack_name.clone(),
                m.site_name.clone(),
                format_float(m.publisher_success_rate),
                format_float(m.receiver_success_rate),
            ]);
        }
    }
    if with_summary {
        out.lines.push("".into());
    }
    out.append(table.render(opts));
    out
}

fn departed(snapshot: &ClusterSnapshot, opts: &RenderOptions) -> Result<Rendered> {
    let departed = decode_departed(&snapshot.cluster.members_departed)?;
    if departed.is_empty() {
        return Ok(Rendered::default());
    }
    let mut table = Table::new(&["NODE ID", "TIMESTAMP", "ADDRESS", "MACHINE ID", "LOCATION", "ROLE"])
        .aligned(&[R, L, L, L, L, L])
        .sorted_by("NODE ID");
    for d in departed {
        table.add_row([d.node_id, d.timestamp, d.address, d.machine_id, d.location, d.role]);
    }
    Ok(table.render(opts))
}

fn network_stats(list: &[Member], opts: &RenderOptions) -> Rendered {
    if list.is_empty() {
        return Rendered::default();
    }
    let mut table = Table::new(&[
        "NODE ID", "ADDRESS", "PORT", "ROLE", "PUBLISHER", "RECEIVER", "SENT", "RECEIVED",
        "RESENT",
    ])
    .aligned(&[R, L, R, L, R, R, R, R, R])
    .highlight(4, highlight::network_rate)
    .highlight(5, highlight::network_rate)
    .highlight(8, highlight::packets);
    let mut sorted: Vec<&Member> = list.iter().collect();
    sorted.sort_by_key(|m| node_order(&m.node_id));
    for m in sorted {
        table.add_row([
            m.node_id.clone(),
            m.unicast_address.clone(),
            m.unicast_port.to_string(),
            m.role_name.clone(),
            format_float(m.publisher_success_rate),
            format_float(m.receiver_success_rate),
            format_count(m.packets_sent),
            format_count(m.packets_received),
            format_count(m.packets_resent),
        ]);
    }
    table.render(opts)
}

fn machines(snapshot: &ClusterSnapshot, opts: &RenderOptions) -> Rendered {
    if snapshot.machines.is_empty() {
        return Rendered::default();
    }
    let mut table = Table::new(&[
        "MACHINE", "PROCESSORS", "LOAD", "TOTAL MEMORY", "FREE MEMORY", "% FREE", "OS", "ARCH",
        "VERSION",
    ])
    .aligned(&[L, R, R, R, R, R, L, L, L])
    .highlight(5, highlight::machine_memory);
    for m in &snapshot.machines {
        let load = if m.system_load_average >= 0.0 {
            m.system_load_average
        } else {
            m.system_cpu_load
        };
        let free = if m.total_physical_memory_size > 0 {
            m.free_physical_memory_size as f64 / m.total_physical_memory_size as f64
        } else {
            -1.0
        };
        table.add_row([
            m.machine_name.clone(),
            m.available_processors.to_string(),
            format_float(load),
            format_mb(m.total_physical_memory_size / 1024 / 1024),
            format_mb(m.free_physical_memory_size / 1024 / 1024),
            format_percent(free),
            m.name.clone(),
            m.arch.clone(),
            m.version.clone(),
        ]);
    }
    table.render(opts)
}

// ──────────────────── services ────────────────────

/// The services payload has one row per member; keep every row per name.
fn by_service<'a>(
    services: &'a [ServiceSummary],
    keep: impl Fn(&ServiceSummary) -> bool,
) -> BTreeMap<&'a str, Vec<&'a ServiceSummary>> {
    let mut grouped: BTreeMap<&str, Vec<&ServiceSummary>> = BTreeMap::new();
    for s in services.iter().filter(|s| keep(s)) {
        grouped.entry(s.service_name.as_str()).or_default().push(s);
    }
    grouped
}

fn service_status(s: &ServiceSummary) -> String {
    if s.storage_enabled_count < 0 || s.status_ha == "n/a" {
        "n/a".to_string()
    } else if s.status_ha == "ENDANGERED" {
        "StatusHA is ENDANGERED".to_string()
    } else if s.partitions_endangered > 0 {
        format!("{} partitions are endangered", s.partitions_endangered)
    } else if s.partitions_vulnerable > 0 {
        format!("{} partitions are vulnerable", s.partitions_vulnerable)
    } else if s.partitions_unbalanced > 0 {
        format!("{} partitions are unbalanced", s.partitions_unbalanced)
    } else {
        "Safe".to_string()
    }
}

fn services(list: &[ServiceSummary], opts: &RenderOptions) -> Rendered {
    let grouped = by_service(list, |_| true);
    if grouped.is_empty() {
        return Rendered::default();
    }
    let mut table = Table::new(&["SERVICE NAME", "TYPE", "MEMBERS", "STATUS HA", "STORAGE", "PARTITIONS"])
        .aligned(&[L, L, R, L, R, R])
        .highlight(3, highlight::status_ha);
    if opts.wide {
        table = table
            .with_extra_columns(
                &["ENDANGERED", "VULNERABLE", "UNBALANCED", "STATUS", "SUSPENDED"],
                &[R, R, R, L, L],
            )
            .highlight(6, highlight::error_count)
            .highlight(7, highlight::error_count)
            .highlight(9, highlight::status_ha);
    }
    for rows in grouped.values() {
        let s = rows[0];
        table.add_row([
            s.service_name.clone(),
            s.service_type.clone(),
            s.member_count.to_string(),
            s.status_ha.clone(),
            s.storage_enabled_count.to_string(),
            s.partitions_all.to_string(),
        ]);
        if opts.wide {
            let suspended = if s.quorum_status == "Suspended" {
                "yes"
            } else if s.is_cache_service() {
                "no"
            } else {
                "n/a"
            };
            table.append_to_last_row([
                s.partitions_endangered.to_string(),
                s.partitions_vulnerable.to_string(),
                s.partitions_unbalanced.to_string(),
                service_status(s),
                suspended.to_string(),
            ]);
        }
    }
    table.render(opts)
}

fn persistence(list: &[ServiceSummary], opts: &RenderOptions) -> Rendered {
    let grouped = by_service(list, ServiceSummary::has_persistence);
    if grouped.is_empty() {
        return Rendered::default();
    }
    let mut active_total = 0;
    let mut table = Table::new(&[
        "SERVICE NAME", "STORAGE COUNT", "PERSISTENCE MODE", "ACTIVE SPACE", "BACKUP SPACE",
        "AVG LATENCY", "MAX LATENCY", "STATUS HA",
    ])
    .aligned(&[L, R, L, R, R, R, R, L])
    .highlight(7, highlight::status_ha);
    for rows in grouped.values() {
        let first = rows[0];
        let active: i64 = rows.iter().map(|s| s.persistence_active_space_used).sum();
        let backup: i64 = rows.iter().map(|s| s.persistence_backup_space_used).sum();
        let max_latency = rows.iter().map(|s| s.persistence_latency_max).max().unwrap_or(0);
        let avg_latency =
            rows.iter().map(|s| s.persistence_latency_average).sum::<f64>() / rows.len() as f64;
        active_total += active;
        table.add_row([
            first.service_name.clone(),
            first.storage_enabled_count.to_string(),
            first.persistence_mode.clone(),
            format_bytes(active, opts.bytes_unit),
            format_bytes(backup, opts.bytes_unit),
            format_millis(avg_latency),
            format!("{max_latency}ms"),
            first.status_ha.clone(),
        ]);
    }
    let mut out = Rendered::from_lines([
        format!("Total Active Space Used: {}", format_bytes(active_total, opts.bytes_unit)),
        String::new(),
    ]);
    out.append(table.render(opts));
    out
}

// ──────────────────── caches and topics ────────────────────

fn hit_rate(hits: i64, misses: i64) -> String {
    let total = hits + misses;
    if total == 0 {
        format_percent(-1.0)
    } else {
        format_percent(hits as f64 / total as f64)
    }
}

fn caches(snapshot: &ClusterSnapshot, opts: &RenderOptions) -> Rendered {
    let list = &snapshot.caches;
    if list.is_empty() {
        return Rendered::default();
    }
    let total_bytes: i64 = list.iter().map(|c| c.units_bytes).sum();
    let mut table = Table::new(&["SERVICE", "CACHE", "COUNT", "SIZE"]).aligned(&[L, L, R, R]);
    if opts.wide {
        table = table
            .with_extra_columns(
                &["PUTS", "GETS", "REMOVES", "HITS", "MISSES", "HIT RATE"],
                &[R, R, R, R, R, R],
            )
            .highlight(9, highlight::hit_rate);
    }
    for c in list {
        table.add_row([
            c.service_name.clone(),
            c.cache_name.clone(),
            format_count(c.cache_size),
            format_bytes(c.units_bytes, opts.bytes_unit),
        ]);
        if opts.wide {
            table.append_to_last_row([
                format_count(c.total_puts),
                format_count(c.total_gets),
                format_count(c.total_removes),
                format_count(c.cache_hits),
                format_count(c.cache_misses),
                hit_rate(c.cache_hits, c.cache_misses),
            ]);
        }
    }
    let mut out = Rendered::from_lines([
        format!(
            "Total Caches: {}, Total primary storage: {}",
            list.len(),
            format_bytes(total_bytes, opts.bytes_unit)
        ),
        String::new(),
    ]);
    out.append(table.render(opts));
    out
}

fn topics(snapshot: &ClusterSnapshot, opts: &RenderOptions) -> Rendered {
    if snapshot.topics.is_empty() {
        return Rendered::default();
    }
    let mut table = Table::new(&[
        "SERVICE", "TOPIC", "CHANNELS", "MEMBERS", "PUBLISHED", "SUBSCRIBERS", "BACKLOG",
    ])
    .aligned(&[L, L, R, R, R, R, R])
    .highlight(6, highlight::error_count);
    for t in &snapshot.topics {
        table.add_row([
            t.detail.service_name.clone(),
            t.detail.topic_name.clone(),
            t.detail.channel_count.to_string(),
            t.member_count.to_string(),
            format_count(t.published_total),
            t.subscriber_count.to_string(),
            format_count(t.backlog_total),
        ]);
    }
    table.render(opts)
}

fn topic_subscribers(
    snapshot: &ClusterSnapshot,
    selection: &Selection,
    opts: &RenderOptions,
) -> Rendered {
    let Some(topic) = snapshot.topics.iter().find(|t| {
        Some(t.detail.service_name.as_str()) == selection.service()
            && Some(t.detail.topic_name.as_str()) == selection.topic()
    }) else {
        return Rendered::default();
    };
    let mut table = Table::new(&[
        "SUBSCRIBER", "NODE ID", "STATE", "CHANNELS", "RECEIVED", "BACKLOG", "GROUP",
    ])
    .aligned(&[R, R, L, R, R, R, L])
    .highlight(5, highlight::error_count);
    for s in &topic.subscribers {
        let id = s.id.to_string();
        if selection.subscriber().is_some_and(|wanted| wanted != id) {
            continue;
        }
        table.add_row([
            id,
            s.node_id.clone(),
            s.state_name.clone(),
            s.channels.to_string(),
            format_count(s.received_count),
            format_count(s.backlog),
            s.subscriber_group.clone(),
        ]);
    }
    if table.is_empty() {
        return Rendered::default();
    }
    table.render(opts)
}

// ──────────────────── health, proxies, reporters ────────────────────

fn health(snapshot: &ClusterSnapshot, opts: &RenderOptions) -> Rendered {
    let rollups = summarise_health(&snapshot.health);
    if rollups.is_empty() {
        return Rendered::default();
    }
    let unhealthy = rollups.iter().filter(|r| !r.is_healthy()).count();
    let mut table = Table::new(&["NAME", "SUB TYPE", "MEMBERS", "STARTED", "LIVE", "READY", "SAFE"])
        .aligned(&[L, L, R, R, R, R, R]);
    for column in 3..=6 {
        table = table.highlight(column, highlight::health_ratio);
    }
    for r in &rollups {
        let ratio = |n: usize| format!("{n}/{}", r.total);
        table.add_row([
            r.name.clone(),
            r.sub_type.clone(),
            r.total.to_string(),
            ratio(r.started),
            ratio(r.live),
            ratio(r.ready),
            ratio(r.safe),
        ]);
    }
    let mut out = Rendered::from_lines([
        format!("Health checks: {}, not healthy: {unhealthy}", rollups.len()),
        String::new(),
    ]);
    out.append(table.render(opts));
    out
}

fn sorted_proxies(list: &[ProxySummary], http: bool) -> Vec<&ProxySummary> {
    let mut proxies: Vec<&ProxySummary> = list.iter().filter(|p| p.is_http() == http).collect();
    proxies.sort_by(|a, b| {
        a.service_name
            .cmp(&b.service_name)
            .then_with(|| node_order(&a.node_id).cmp(&node_order(&b.node_id)))
    });
    proxies
}

fn tcp_proxies(list: &[ProxySummary], opts: &RenderOptions) -> Rendered {
    let proxies = sorted_proxies(list, false);
    if proxies.is_empty() {
        return Rendered::default();
    }
    let mut table = Table::new(&[
        "NODE ID", "HOST IP", "SERVICE NAME", "CONNECTIONS", "BYTES SENT", "BYTES REC",
    ])
    .aligned(&[R, L, L, R, R, R]);
    if opts.wide {
        table = table
            .with_extra_columns(
                &["MSG SENT", "MSG RCV", "BYTES BACKLOG", "MSG BACKLOG", "UNAUTH"],
                &[R, R, R, R, R],
            )
            .highlight(10, highlight::error_count);
    }
    for p in proxies {
        table.add_row([
            p.node_id.clone(),
            p.host_ip.clone(),
            p.service_name.clone(),
            format_count(p.connection_count),
            format_count(p.total_bytes_sent),
            format_count(p.total_bytes_received),
        ]);
        if opts.wide {
            table.append_to_last_row([
                format_count(p.total_messages_sent),
                format_count(p.total_messages_received),
                format_count(p.outgoing_byte_backlog),
                format_count(p.outgoing_message_backlog),
                format_count(p.unauth_connection_attempts),
            ]);
        }
    }
    table.render(opts)
}

fn http_servers(list: &[ProxySummary], opts: &RenderOptions) -> Rendered {
    let proxies = sorted_proxies(list, true);
    if proxies.is_empty() {
        return Rendered::default();
    }
    let mut table = Table::new(&[
        "NODE ID", "HOST IP", "SERVICE NAME", "SERVER TYPE", "REQUESTS", "ERRORS",
    ])
    .aligned(&[R, L, L, L, R, R])
    .highlight(5, highlight::error_count);
    if opts.wide {
        table = table
            .with_extra_columns(&["1xx", "2xx", "3xx", "4xx", "5xx"], &[R, R, R, R, R])
            .highlight(9, highlight::error_count)
            .highlight(10, highlight::error_count);
    }
    for p in proxies {
        table.add_row([
            p.node_id.clone(),
            p.host_ip.clone(),
            p.service_name.clone(),
            p.http_server_type.clone(),
            format_count(p.total_request_count),
            format_count(p.total_error_count),
        ]);
        if opts.wide {
            table.append_to_last_row([
                format_count(p.response_count_1xx),
                format_count(p.response_count_2xx),
                format_count(p.response_count_3xx),
                format_count(p.response_count_4xx),
                format_count(p.response_count_5xx),
            ]);
        }
    }
    table.render(opts)
}

fn reporters(snapshot: &ClusterSnapshot, opts: &RenderOptions) -> Rendered {
    if snapshot.reporters.is_empty() {
        return Rendered::default();
    }
    let mut table = Table::new(&[
        "NODE ID", "STATE", "CONFIG FILE", "OUTPUT PATH", "BATCH#", "LAST REPORT", "LAST RUN",
        "AVG RUN", "INTERVAL", "AUTO START",
    ])
    .aligned(&[R, L, L, L, R, L, R, R, R, L])
    .sorted_by("NODE ID");
    for r in &snapshot.reporters {
        table.add_row([
            r.node_id.clone(),
            r.state.clone(),
            r.config_file.clone(),
            r.output_path.clone(),
            format_count(r.current_batch),
            r.last_report.clone(),
            format!("{}ms", r.last_run_millis),
            format_millis(r.run_average_millis),
            format!("{}s", r.interval_seconds),
            r.auto_start.to_string(),
        ]);
    }
    table.render(opts)
}

// ──────────────────── federation ────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Flow {
    Outgoing,
    Incoming,
}

fn federation_state(summary: &FederationSummary) -> String {
    let mut states: Vec<&str> = summary.state.iter().map(String::as_str).collect();
    states.sort_unstable();
    states.dedup();
    states.join(",")
}

fn federation(list: &[FederationSummary], flow: Flow, opts: &RenderOptions) -> Rendered {
    if list.is_empty() {
        return Rendered::default();
    }
    let (heading, headers) = match flow {
        Flow::Outgoing => (
            "Destinations",
            [
                "SERVICE", "DESTINATION", "STATE", "MEMBERS", "DATA SENT", "MSG SENT",
                "REC SENT", "RTT", "BANDWIDTH",
            ],
        ),
        Flow::Incoming => (
            "Origins",
            [
                "SERVICE", "ORIGIN", "STATE", "MEMBERS", "DATA REC", "MSG REC", "REC REC",
                "CONNECTIONS", "BACKLOG DELAY",
            ],
        ),
    };
    let mut table = Table::new(&headers)
        .aligned(&[L, L, L, R, R, R, R, R, R])
        .highlight(2, highlight::federation_state);
    for s in list {
        let mut row = vec![
            s.service_name.clone(),
            s.participant_name.clone(),
            federation_state(s),
            s.member.len().to_string(),
        ];
        match flow {
            Flow::Outgoing => row.extend([
                format_bytes(s.total_bytes_sent.sum as i64, opts.bytes_unit),
                format_count(s.total_msg_sent.sum as i64),
                format_count(s.total_records_sent.sum as i64),
                format_millis(s.msg_network_round_trip_time_percentile_millis.average),
                format!("{:.1}Mbps", s.current_bandwidth.sum),
            ]),
            Flow::Incoming => row.extend([
                format_bytes(s.total_bytes_received.sum as i64, opts.bytes_unit),
                format_count(s.total_msg_received.sum as i64),
                format_count(s.total_records_received.sum as i64),
                format_count(s.current_connection_count.sum as i64),
                format_millis(s.record_backlog_delay_time_percentile_millis.average),
            ]),
        }
        table.add_row(row);
    }
    let mut out = Rendered::from_lines([heading]);
    out.append(table.render(opts));
    out
}

// ──────────────────── elastic data, sessions, executors ────────────────────

fn elastic_data(snapshot: &ClusterSnapshot, opts: &RenderOptions) -> Rendered {
    let mut table = Table::new(&[
        "NAME", "USED FILES", "TOTAL FILES", "% USED", "MAX FILE SIZE", "USED SPACE",
        "COMPACTIONS", "EXHAUSTIVE",
    ])
    .aligned(&[L, R, R, R, R, R, R, R]);
    for (name, journal) in [
        ("RamJournalRM", &snapshot.elastic_ram),
        ("FlashJournalRM", &snapshot.elastic_flash),
    ] {
        if journal.is_empty() {
            continue;
        }
        let used: i64 = journal.iter().map(|e| e.file_count).sum();
        let total: i64 = journal.iter().map(|e| e.max_journal_files_number).sum();
        let pct = if total > 0 {
            used as f64 / total as f64
        } else {
            -1.0
        };
        table.add_row([
            name.to_string(),
            format_count(used),
            format_count(total),
            format_percent(pct),
            format_bytes(journal[0].max_file_size, opts.bytes_unit),
            format_bytes(journal.iter().map(|e| e.total_data_size).sum(), opts.bytes_unit),
            format_count(journal.iter().map(|e| e.compaction_count).sum()),
            format_count(journal.iter().map(|e| e.exhaustive_compaction_count).sum()),
        ]);
    }
    if table.is_empty() {
        return Rendered::default();
    }
    table.render(opts)
}

fn http_sessions(snapshot: &ClusterSnapshot, opts: &RenderOptions) -> Rendered {
    let mut apps: BTreeMap<&str, Vec<_>> = BTreeMap::new();
    for s in &snapshot.http_sessions {
        apps.entry(s.app_id.as_str()).or_default().push(s);
    }
    if apps.is_empty() {
        return Rendered::default();
    }
    let mut table = Table::new(&[
        "APPLICATION", "TYPE", "MEMBERS", "TIMEOUT", "CACHE", "AVG SIZE", "REAPED", "AVG REAP",
        "UPDATES",
    ])
    .aligned(&[L, L, R, R, L, R, R, R, R]);
    for (app, rows) in apps {
        let first = rows[0];
        let n = rows.len() as i64;
        table.add_row([
            app.to_string(),
            first.session_type.clone(),
            rows.len().to_string(),
            format!("{}s", first.session_timeout),
            first.session_cache_name.clone(),
            format_count(rows.iter().map(|s| s.session_average_size).sum::<i64>() / n),
            format_count(rows.iter().map(|s| s.reaped_sessions_total).sum()),
            format!("{}ms", rows.iter().map(|s| s.average_reap_duration).sum::<i64>() / n),
            format_count(rows.iter().map(|s| s.session_updates).sum()),
        ]);
    }
    table.render(opts)
}

fn executors(snapshot: &ClusterSnapshot, opts: &RenderOptions) -> Rendered {
    let mut named: BTreeMap<&str, Vec<_>> = BTreeMap::new();
    for e in &snapshot.executors {
        named.entry(e.name.as_str()).or_default().push(e);
    }
    if named.is_empty() {
        return Rendered::default();
    }
    let mut table = Table::new(&[
        "NAME", "MEMBERS", "IN PROGRESS", "COMPLETED", "REJECTED", "DESCRIPTION",
    ])
    .aligned(&[L, R, R, R, R, L])
    .highlight(4, highlight::error_count);
    for (name, rows) in named {
        table.add_row([
            name.to_string(),
            rows.len().to_string(),
            format_count(rows.iter().map(|e| e.tasks_in_progress_count).sum()),
            format_count(rows.iter().map(|e| e.tasks_completed_count).sum()),
            format_count(rows.iter().map(|e| e.tasks_rejected_count).sum()),
            rows[0].description.clone(),
        ]);
    }
    table.render(opts)
}

/// One row per (service, view); every member holds the whole view, so the
/// size is the largest copy seen.
fn view_caches(snapshot: &ClusterSnapshot, opts: &RenderOptions) -> Rendered {
    let mut views: BTreeMap<(&str, &str), Vec<&ViewCache>> = BTreeMap::new();
    for v in &snapshot.view_caches {
        views
            .entry((v.service_name.as_str(), v.view_name.as_str()))
            .or_default()
            .push(v);
    }
    if views.is_empty() {
        return Rendered::default();
    }
    let mut table = Table::new(&["SERVICE", "VIEW NAME", "MEMBERS", "SIZE"]).aligned(&[L, L, R, R]);
    if opts.wide {
        table = table.with_extra_columns(&["READ ONLY", "TRANSFORMED", "FILTER"], &[L, L, L]);
    }
    for ((service, view), copies) in &views {
        table.add_row([
            (*service).to_string(),
            (*view).to_string(),
            copies.len().to_string(),
            format_count(copies.iter().map(|c| c.size).max().unwrap_or(0)),
        ]);
        if opts.wide {
            let first = copies[0];
            table.append_to_last_row([
                first.read_only.to_string(),
                first.transformed.to_string(),
                first.filter.clone(),
            ]);
        }
    }
    let mut out = Rendered::from_lines([format!("Total Views: {}", views.len()), String::new()]);
    out.append(table.render(opts));
    out
}

// ──────────────────── selection-scoped ────────────────────

fn service_members(snapshot: &ClusterSnapshot, opts: &RenderOptions) -> Rendered {
    if snapshot.service_members.is_empty() {
        return Rendered::default();
    }
    let mut table = Table::new(&[
        "NODE ID", "THREADS", "IDLE", "TASKS", "BACKLOG", "PRIMARY", "BACKUP", "REQ AVG",
        "TASK AVG",
    ])
    .aligned(&[R, R, R, R, R, R, R, R, R])
    .highlight(4, highlight::error_count)
    .sorted_by("NODE ID");
    for m in &snapshot.service_members {
        table.add_row([
            m.node_id.clone(),
            m.thread_count.to_string(),
            m.thread_idle_count.to_string(),
            format_count(m.task_count),
            format_count(m.task_backlog),
            m.owned_partitions_primary.to_string(),
            m.owned_partitions_backup.to_string(),
            format_millis(m.request_average_duration),
            format_millis(m.task_average_duration),
        ]);
    }
    table.render(opts)
}

fn cache_details(snapshot: &ClusterSnapshot, opts: &RenderOptions) -> Rendered {
    if snapshot.cache_members.is_empty() {
        return Rendered::default();
    }
    let mut table = Table::new(&[
        "NODE ID", "TIER", "COUNT", "SIZE", "PUTS", "GETS", "REMOVES", "HITS", "MISSES",
        "HIT RATE",
    ])
    .aligned(&[R, L, R, R, R, R, R, R, R, R])
    .highlight(9, highlight::hit_rate)
    .sorted_by("NODE ID");
    if opts.wide {
        table = table
            .with_extra_columns(&["STORE READS", "STORE WRITES", "STORE FAILURES"], &[R, R, R])
            .highlight(12, highlight::error_count);
    }
    for c in &snapshot.cache_members {
        table.add_row([
            c.node_id.clone(),
            c.tier.clone(),
            format_count(c.cache_size),
            format_bytes(c.units_bytes, opts.bytes_unit),
            format_count(c.total_puts),
            format_count(c.total_gets),
            format_count(c.total_removes),
            format_count(c.cache_hits),
            format_count(c.cache_misses),
            hit_rate(c.cache_hits, c.cache_misses),
        ]);
        if opts.wide {
            table.append_to_last_row([
                format_count(c.store_reads),
                format_count(c.store_writes),
                format_count(c.store_failures),
            ]);
        }
    }
    table.render(opts)
}
