//! Snapshot aggregator: sequential identity check, then one concurrent task
//! per requested data group, joined by a barrier.
//!
//! Each group task owns the snapshot field(s) of its group. Groups with
//! intra-group sequencing (machines, caches, topics, federation) resolve
//! their discovery query first and then fan out nested requests over a small
//! worker pool; nested results are appended to a mutex-guarded vector scoped
//! to that group.

#![allow(missing_docs)]

use std::collections::{BTreeMap, BTreeSet};
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::Instant;

use crossbeam_channel as channel;
use parking_lot::Mutex;
use serde::de::DeserializeOwned;

use super::error_sink::ErrorSink;
use super::groups::{DataGroup, GroupSet, Selection};
use super::snapshot::{ClusterSnapshot, GroupData};
use crate::core::errors::{FetchError, MonError, Result};
use crate::fetcher::{Direction, Fetcher, Journal, Request};
use crate::model::payloads::{
    CacheSummary, ClusterInfo, ElasticData, FederationSummary, MachineInfo, Member,
    ServiceSummary, TopicDetail, TopicMember, TopicSubscriber, TopicSummary, ViewCache,
};
use crate::model::{decode, decode_items};

/// Knobs for one aggregator instance.
#[derive(Debug, Clone)]
pub struct CollectOptions {
    /// Reporters are only collected when verbose output or a dashboard is active.
    pub verbose: bool,
    pub dashboard_active: bool,
    pub selection: Selection,
    /// Upper bound on concurrent nested requests inside one group.
    pub max_parallel: usize,
}

impl Default for CollectOptions {
    fn default() -> Self {
        Self {
            verbose: false,
            dashboard_active: false,
            selection: Selection::default(),
            max_parallel: 8,
        }
    }
}

/// Gathers a [`ClusterSnapshot`] from a [`Fetcher`].
#[derive(Debug)]
pub struct Aggregator<F> {
    fetcher: F,
    options: CollectOptions,
}

impl<F: Fetcher> Aggregator<F> {
    pub fn new(fetcher: F, options: CollectOptions) -> Self {
        Self { fetcher, options }
    }

    pub fn options(&self) -> &CollectOptions {
        &self.options
    }

    pub fn fetcher(&self) -> &F {
        &self.fetcher
    }

    /// Groups that `collect(required)` will launch.
    pub fn plan(&self, required: &GroupSet) -> GroupSet {
        let mut groups = if required.is_empty() {
            DataGroup::catalogue()
        } else {
            required.clone()
        };
        if !(self.options.verbose || self.options.dashboard_active) {
            groups.remove(&DataGroup::Reporters);
        }
        groups
    }

    /// Sequential identity query. Any failure here is fatal for the cycle.
    pub fn identity(&self) -> Result<ClusterInfo> {
        let bytes = self
            .fetcher
            .fetch(&Request::Cluster)
            .map_err(|source| MonError::Connect {
                endpoint: self.fetcher.endpoint(),
                source,
            })?;
        decode("cluster", &bytes)
    }

    /// Build one snapshot, returning it with every error raised along the way.
    ///
    /// Groups outside `required` (when non-empty) are neither fetched nor
    /// marked failed. A failed group leaves its fields at their zero value.
    pub fn collect(&self, required: &GroupSet) -> Result<(ClusterSnapshot, Vec<MonError>)> {
        let started = Instant::now();
        let cluster = self.identity()?;
        let groups = self.plan(required);
        let mut snapshot = ClusterSnapshot::new(cluster, groups.clone());
        let sink = ErrorSink::new();

        let outcomes: Vec<(DataGroup, Option<GroupData>)> = thread::scope(|scope| {
            let handles: Vec<_> = groups
                .iter()
                .map(|&group| {
                    let sink = &sink;
                    (group, scope.spawn(move || self.run_group(group, sink)))
                })
                .collect();
            handles
                .into_iter()
                .map(|(group, handle)| {
                    let data = handle.join().unwrap_or_else(|_| {
                        sink.append(MonError::Runtime {
                            details: format!("{group} collection task panicked"),
                        });
                        None
                    });
                    (group, data)
                })
                .collect()
        });

        for (group, data) in outcomes {
            match data {
                Some(data) => snapshot.apply(data),
                None => snapshot.mark_failed(group),
            }
        }
        snapshot.duration = started.elapsed();
        Ok((snapshot, sink.drain()))
    }

    // ──────────────────── group tasks ────────────────────

    fn run_group(&self, group: DataGroup, sink: &ErrorSink<MonError>) -> Option<GroupData> {
        match group {
            DataGroup::Members => self.items(&Request::Members, sink).map(GroupData::Members),
            DataGroup::Machines => self.machines(sink).map(GroupData::Machines),
            DataGroup::Services => self.items(&Request::Services, sink).map(GroupData::Services),
            DataGroup::Caches => self.caches(sink).map(GroupData::Caches),
            DataGroup::Topics => self.topics(sink).map(GroupData::Topics),
            DataGroup::Health => self.items(&Request::Health, sink).map(GroupData::Health),
            DataGroup::Storage => self.items(&Request::Storage, sink).map(GroupData::Storage),
            DataGroup::Proxies => self.items(&Request::Proxies, sink).map(GroupData::Proxies),
            DataGroup::Reporters => self
                .items(&Request::Reporters, sink)
                .map(GroupData::Reporters),
            DataGroup::Federation => self.federation(sink),
            DataGroup::ElasticData => self.elastic_data(sink),
            DataGroup::HttpSessions => self
                .items(&Request::HttpSessions, sink)
                .map(GroupData::HttpSessions),
            DataGroup::Executors => self
                .items(&Request::Executors, sink)
                .map(GroupData::Executors),
            DataGroup::ViewCaches => self.view_caches(sink).map(GroupData::ViewCaches),
            DataGroup::ServiceMembers => {
                let service = self.require(self.options.selection.service(), group, "service", sink)?;
                self.items(
                    &Request::ServiceMembers {
                        service: service.to_string(),
                    },
                    sink,
                )
                .map(GroupData::ServiceMembers)
            }
            DataGroup::CacheMembers => {
                let service = self.require(self.options.selection.service(), group, "service", sink)?;
                let cache = self.require(self.options.selection.cache(), group, "cache", sink)?;
                self.items(
                    &Request::CacheMembers {
                        service: service.to_string(),
                        cache: cache.to_string(),
                    },
                    sink,
                )
                .map(GroupData::CacheMembers)
            }
        }
    }

    /// Members -> one OS query per distinct machine.
    fn machines(&self, sink: &ErrorSink<MonError>) -> Option<Vec<MachineInfo>> {
        let members: Vec<Member> = self.items(&Request::Members, sink)?;
        let mut first_node: BTreeMap<String, String> = BTreeMap::new();
        for member in members {
            first_node
                .entry(member.machine_name)
                .or_insert(member.node_id);
        }
        let mut machines = fan_out(
            self.options.max_parallel,
            first_node.into_iter().collect(),
            |(machine, node_id)| {
                let os: Option<MachineInfo> = self.object(&Request::MemberOs { node_id }, sink)?;
                Some(
                    os.map(|mut info| {
                        info.machine_name = machine;
                        info
                    })
                    .into_iter()
                    .collect(),
                )
            },
        )?;
        machines.sort_by(|a, b| a.machine_name.cmp(&b.machine_name));
        Some(machines)
    }

    /// Services -> caches of every partitioned service.
    fn caches(&self, sink: &ErrorSink<MonError>) -> Option<Vec<CacheSummary>> {
        let services: Vec<ServiceSummary> = self.items(&Request::Services, sink)?;
        let names = distinct_services(&services, |s| s.is_cache_service() && !s.is_topic_service());
        let mut caches = fan_out(self.options.max_parallel, names, |service| {
            let mut found: Vec<CacheSummary> = self.items(
                &Request::Caches {
                    service: service.clone(),
                },
                sink,
            )?;
            for cache in &mut found {
                if cache.service_name.is_empty() {
                    cache.service_name.clone_from(&service);
                }
            }
            Some(found)
        })?;
        caches.sort_by(|a, b| {
            (a.service_name.as_str(), a.cache_name.as_str())
                .cmp(&(b.service_name.as_str(), b.cache_name.as_str()))
        });
        Some(caches)
    }

    /// Services -> views hosted by every partitioned service.
    fn view_caches(&self, sink: &ErrorSink<MonError>) -> Option<Vec<ViewCache>> {
        let services: Vec<ServiceSummary> = self.items(&Request::Services, sink)?;
        let names = distinct_services(&services, |s| s.is_cache_service() && !s.is_topic_service());
        let mut views = fan_out(self.options.max_parallel, names, |service| {
            let mut found: Vec<ViewCache> = self.items(
                &Request::ViewCaches {
                    service: service.clone(),
                },
                sink,
            )?;
            for view in &mut found {
                if view.service_name.is_empty() {
                    view.service_name.clone_from(&service);
                }
            }
            Some(found)
        })?;
        views.sort_by(|a, b| {
            (a.service_name.as_str(), a.view_name.as_str(), a.node_id.as_str())
                .cmp(&(b.service_name.as_str(), b.view_name.as_str(), b.node_id.as_str()))
        });
        Some(views)
    }

    /// Services -> topics per topic service -> members + subscribers per topic.
    fn topics(&self, sink: &ErrorSink<MonError>) -> Option<Vec<TopicSummary>> {
        let services: Vec<ServiceSummary> = self.items(&Request::Services, sink)?;
        let names = distinct_services(&services, ServiceSummary::is_topic_service);
        let details = fan_out(self.options.max_parallel, names, |service| {
            let mut found: Vec<TopicDetail> = self.items(
                &Request::Topics {
                    service: service.clone(),
                },
                sink,
            )?;
            for topic in &mut found {
                if topic.service_name.is_empty() {
                    topic.service_name.clone_from(&service);
                }
            }
            Some(found)
        })?;

        let mut topics = fan_out(self.options.max_parallel, details, |detail| {
            let service = detail.service_name.clone();
            let topic = detail.topic_name.clone();
            let members: Vec<TopicMember> = self.items(
                &Request::TopicMembers {
                    service: service.clone(),
                    topic: topic.clone(),
                },
                sink,
            )?;
            let subscribers: Vec<TopicSubscriber> =
                self.items(&Request::TopicSubscribers { service, topic }, sink)?;
            Some(vec![TopicSummary {
                member_count: members.len(),
                published_total: members.iter().map(|m| m.published_count).sum(),
                subscriber_count: subscribers.len(),
                backlog_total: subscribers.iter().map(|s| s.backlog).sum(),
                subscribers,
                detail,
            }])
        })?;
        topics.sort_by(|a, b| {
            (a.detail.service_name.as_str(), a.detail.topic_name.as_str())
                .cmp(&(b.detail.service_name.as_str(), b.detail.topic_name.as_str()))
        });
        Some(topics)
    }

    /// Services -> federated services -> participants per direction.
    fn federation(&self, sink: &ErrorSink<MonError>) -> Option<GroupData> {
        let services: Vec<ServiceSummary> = self.items(&Request::Services, sink)?;
        let pairs: Vec<(String, Direction)> = distinct_services(&services, ServiceSummary::is_federated)
            .into_iter()
            .flat_map(|svc| {
                [
                    (svc.clone(), Direction::Outgoing),
                    (svc, Direction::Incoming),
                ]
            })
            .collect();
        let results = fan_out(self.options.max_parallel, pairs, |(service, direction)| {
            let found: Vec<FederationSummary> = self.items(
                &Request::Federation {
                    service: service.clone(),
                    direction,
                },
                sink,
            )?;
            Some(
                found
                    .into_iter()
                    .map(|mut summary| {
                        if summary.service_name.is_empty() {
                            summary.service_name.clone_from(&service);
                        }
                        (direction, summary)
                    })
                    .collect(),
            )
        })?;

        let (mut destinations, mut origins): (Vec<_>, Vec<_>) = results
            .into_iter()
            .partition(|(direction, _)| *direction == Direction::Outgoing);
        let key = |(_, s): &(Direction, FederationSummary)| {
            (s.service_name.clone(), s.participant_name.clone())
        };
        destinations.sort_by_key(key);
        origins.sort_by_key(key);
        Some(GroupData::Federation {
            destinations: destinations.into_iter().map(|(_, s)| s).collect(),
            origins: origins.into_iter().map(|(_, s)| s).collect(),
        })
    }

    /// Flash and RAM journals, fetched side by side.
    fn elastic_data(&self, sink: &ErrorSink<MonError>) -> Option<GroupData> {
        let results = fan_out(
            self.options.max_parallel,
            vec![Journal::Flash, Journal::Ram],
            |journal| {
                let found: Vec<ElasticData> = self.items(&Request::ElasticData { journal }, sink)?;
                Some(found.into_iter().map(|e| (journal, e)).collect())
            },
        )?;
        let (flash, ram): (Vec<_>, Vec<_>) = results
            .into_iter()
            .partition(|(journal, _)| *journal == Journal::Flash);
        let by_node = |v: Vec<(Journal, ElasticData)>| {
            let mut v: Vec<ElasticData> = v.into_iter().map(|(_, e)| e).collect();
            v.sort_by(|a, b| a.node_id.cmp(&b.node_id));
            v
        };
        Some(GroupData::ElasticData {
            flash: by_node(flash),
            ram: by_node(ram),
        })
    }

    // ──────────────────── request helpers ────────────────────

    /// Fetch and decode an item list. `NotFound` is an empty list.
    fn items<T: DeserializeOwned>(
        &self,
        request: &Request,
        sink: &ErrorSink<MonError>,
    ) -> Option<Vec<T>> {
        match self.fetcher.fetch(request) {
            Ok(bytes) => match decode_items(&request.path(), &bytes) {
                Ok(items) => Some(items),
                Err(err) => {
                    sink.append(err);
                    None
                }
            },
            Err(FetchError::NotFound) => Some(Vec::new()),
            Err(source) => {
                sink.append(MonError::Fetch {
                    request: request.path(),
                    source,
                });
                None
            }
        }
    }

    /// Fetch and decode a single object. `NotFound` is `Some(None)`.
    fn object<T: DeserializeOwned>(
        &self,
        request: &Request,
        sink: &ErrorSink<MonError>,
    ) -> Option<Option<T>> {
        match self.fetcher.fetch(request) {
            Ok(bytes) => match decode(&request.path(), &bytes) {
                Ok(value) => Some(Some(value)),
                Err(err) => {
                    sink.append(err);
                    None
                }
            },
            Err(FetchError::NotFound) => Some(None),
            Err(source) => {
                sink.append(MonError::Fetch {
                    request: request.path(),
                    source,
                });
                None
            }
        }
    }

    fn require<'a>(
        &self,
        value: Option<&'a str>,
        group: DataGroup,
        what: &'static str,
        sink: &ErrorSink<MonError>,
    ) -> Option<&'a str> {
        if value.is_none() {
            sink.append(MonError::MissingSelection {
                panel: group.name().to_string(),
                what,
            });
        }
        value
    }
}

/// Distinct service names matching `keep`; the services payload has one row per member.
fn distinct_services(
    services: &[ServiceSummary],
    keep: impl Fn(&ServiceSummary) -> bool,
) -> Vec<String> {
    services
        .iter()
        .filter(|s| keep(s))
        .map(|s| s.service_name.clone())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

/// Run `work` over `items` on at most `max_parallel` scoped workers.
///
/// Returns `None` when any item failed; failing items have already reported
/// their errors to the caller's sink.
fn fan_out<I, R, W>(max_parallel: usize, items: Vec<I>, work: W) -> Option<Vec<R>>
where
    I: Send,
    R: Send,
    W: Fn(I) -> Option<Vec<R>> + Sync,
{
    if items.is_empty() {
        return Some(Vec::new());
    }
    let workers = max_parallel.clamp(1, items.len());
    let (work_tx, work_rx) = channel::unbounded::<I>();
    for item in items {
        let _ = work_tx.send(item);
    }
    drop(work_tx);

    let results: Mutex<Vec<R>> = Mutex::new(Vec::new());
    let failed = AtomicBool::new(false);
    thread::scope(|scope| {
        for _ in 0..workers {
            let work_rx = work_rx.clone();
            let (work, results, failed) = (&work, &results, &failed);
            scope.spawn(move || {
                for item in &work_rx {
                    match work(item) {
                        Some(batch) => results.lock().extend(batch),
                        None => failed.store(true, Ordering::Relaxed),
                    }
                }
            });
        }
    });

    if failed.load(Ordering::Relaxed) {
        None
    } else {
        Some(results.into_inner())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::sync::atomic::AtomicUsize;

    struct MapFetcher {
        responses: HashMap<String, std::result::Result<String, FetchError>>,
        calls: AtomicUsize,
    }

    impl MapFetcher {
        fn new(pairs: &[(&str, std::result::Result<&str, FetchError>)]) -> Self {
            Self {
                responses: pairs
                    .iter()
                    .map(|(path, r)| ((*path).to_string(), r.clone().map(str::to_string)))
                    .collect(),
                calls: AtomicUsize::new(0),
            }
        }
    }

    impl Fetcher for MapFetcher {
        fn fetch(&self, request: &Request) -> std::result::Result<Vec<u8>, FetchError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.responses
                .get(&request.path())
                .cloned()
                .unwrap_or(Err(FetchError::NotFound))
                .map(String::into_bytes)
        }

        fn endpoint(&self) -> String {
            "map".to_string()
        }
    }

    const CLUSTER: &str = r#"{"clusterName":"c1","clusterSize":2,"version":"14.1.2","running":true}"#;
    const SERVICES: &str = r#"{"items":[
        {"nodeId":"1","name":"Dist","type":"DistributedCache"},
        {"nodeId":"2","name":"Dist","type":"DistributedCache"},
        {"nodeId":"1","name":"Fed","type":"FederatedCache"},
        {"nodeId":"1","name":"Proxy","type":"Proxy"}]}"#;

    fn groups(list: &[DataGroup]) -> GroupSet {
        list.iter().copied().collect()
    }

    #[test]
    fn identity_failure_is_connect_error_and_fails_fast() {
        let fetcher = MapFetcher::new(&[(
            "/",
            Err(FetchError::Transport {
                details: "refused".to_string(),
            }),
        )]);
        let agg = Aggregator::new(&fetcher, CollectOptions::default());
        let err = agg.collect(&GroupSet::new()).unwrap_err();
        assert_eq!(err.code(), "MON-2001");
        assert_eq!(fetcher.calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn caches_are_collected_once_per_distinct_service() {
        let fetcher = MapFetcher::new(&[
            ("/", Ok(CLUSTER)),
            ("/services/members/", Ok(SERVICES)),
            (
                "/services/Dist/caches",
                Ok(r#"{"items":[{"name":"b","size":2},{"name":"a","size":1}]}"#),
            ),
            ("/services/Fed/caches", Err(FetchError::NotFound)),
        ]);
        let agg = Aggregator::new(&fetcher, CollectOptions::default());
        let (snap, errors) = agg.collect(&groups(&[DataGroup::Caches])).unwrap();
        assert!(errors.is_empty(), "{errors:?}");
        let names: Vec<&str> = snap.caches.iter().map(|c| c.cache_name.as_str()).collect();
        assert_eq!(names, vec!["a", "b"]);
        assert!(snap.caches.iter().all(|c| c.service_name == "Dist"));
        // identity + services + two distinct cache services
        assert_eq!(fetcher.calls.load(Ordering::SeqCst), 4);
    }

    #[test]
    fn view_caches_are_collected_per_cache_service() {
        let fetcher = MapFetcher::new(&[
            ("/", Ok(CLUSTER)),
            ("/services/members/", Ok(SERVICES)),
            (
                "/services/Dist/views/members",
                Ok(r#"{"items":[
                    {"name":"orders-view","nodeId":"2","size":5},
                    {"name":"orders-view","nodeId":"1","size":5}]}"#),
            ),
        ]);
        let agg = Aggregator::new(&fetcher, CollectOptions::default());
        let (snap, errors) = agg.collect(&groups(&[DataGroup::ViewCaches])).unwrap();
        assert!(errors.is_empty(), "{errors:?}");
        let nodes: Vec<&str> = snap.view_caches.iter().map(|v| v.node_id.as_str()).collect();
        assert_eq!(nodes, vec!["1", "2"]);
        assert!(snap.view_caches.iter().all(|v| v.service_name == "Dist"));
        assert!(snap.is_populated(DataGroup::ViewCaches));
    }

    #[test]
    fn federation_splits_directions() {
        let fetcher = MapFetcher::new(&[
            ("/", Ok(CLUSTER)),
            ("/services/members/", Ok(SERVICES)),
            (
                "/services/Fed/federation/statistics/outgoing/participants",
                Ok(r#"{"items":[{"participantName":"london"}]}"#),
            ),
            (
                "/services/Fed/federation/statistics/incoming/participants",
                Ok(r#"{"items":[{"participantName":"paris"},{"participantName":"berlin"}]}"#),
            ),
        ]);
        let agg = Aggregator::new(&fetcher, CollectOptions::default());
        let (snap, errors) = agg.collect(&groups(&[DataGroup::Federation])).unwrap();
        assert!(errors.is_empty());
        assert_eq!(snap.federation_destinations.len(), 1);
        assert_eq!(snap.federation_destinations[0].service_name, "Fed");
        let origins: Vec<&str> = snap
            .federation_origins
            .iter()
            .map(|s| s.participant_name.as_str())
            .collect();
        assert_eq!(origins, vec!["berlin", "paris"]);
    }

    #[test]
    fn nested_failure_zeroes_the_whole_group() {
        let fetcher = MapFetcher::new(&[
            ("/", Ok(CLUSTER)),
            (
                "/members/",
                Ok(r#"{"items":[{"nodeId":"1","machineName":"m1"},{"nodeId":"2","machineName":"m2"}]}"#),
            ),
            (
                "/members/1/platform/operatingSystem",
                Ok(r#"{"availableProcessors":4}"#),
            ),
            (
                "/members/2/platform/operatingSystem",
                Err(FetchError::Auth { status: 403 }),
            ),
        ]);
        let agg = Aggregator::new(&fetcher, CollectOptions::default());
        let (snap, errors) = agg
            .collect(&groups(&[DataGroup::Machines, DataGroup::Members]))
            .unwrap();
        assert_eq!(errors.len(), 1);
        assert!(snap.machines.is_empty());
        assert!(snap.failed.contains(&DataGroup::Machines));
        assert_eq!(snap.members.len(), 2);
        assert!(snap.is_populated(DataGroup::Members));
    }

    #[test]
    fn reporters_require_verbose_or_dashboard() {
        let fetcher = MapFetcher::new(&[("/", Ok(CLUSTER))]);
        let quiet = Aggregator::new(&fetcher, CollectOptions::default());
        assert!(!quiet.plan(&GroupSet::new()).contains(&DataGroup::Reporters));

        let dashboard = Aggregator::new(
            &fetcher,
            CollectOptions {
                dashboard_active: true,
                ..CollectOptions::default()
            },
        );
        assert!(dashboard.plan(&GroupSet::new()).contains(&DataGroup::Reporters));
    }

    #[test]
    fn cache_members_without_selection_fails_group() {
        let fetcher = MapFetcher::new(&[("/", Ok(CLUSTER))]);
        let agg = Aggregator::new(&fetcher, CollectOptions::default());
        let (snap, errors) = agg.collect(&groups(&[DataGroup::CacheMembers])).unwrap();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].code(), "MON-1104");
        assert!(snap.failed.contains(&DataGroup::CacheMembers));
    }

    #[test]
    fn fan_out_honours_every_item() {
        let out = fan_out(3, (0..50).collect(), |i: i32| Some(vec![i * 2])).unwrap();
        let mut out = out;
        out.sort_unstable();
        assert_eq!(out, (0..50).map(|i| i * 2).collect::<Vec<_>>());
        assert!(fan_out(3, vec![1, 2, 3], |i: i32| (i != 2).then(Vec::<i32>::new)).is_none());
    }
}
