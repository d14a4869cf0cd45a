//! Snapshot aggregation against a scripted fetcher: partial failure, skip
//! exactness, nested fan-out, and error sink concurrency.

mod common;

use std::sync::Arc;
use std::thread;

use clustermon::collector::{Aggregator, CollectOptions, DataGroup, ErrorSink, GroupSet, Selection};
use clustermon::core::errors::{FetchError, MonError};
use clustermon::fetcher::Request;

use common::{ScriptedFetcher, healthy_cluster};

fn groups(list: &[DataGroup]) -> GroupSet {
    list.iter().copied().collect()
}

#[test]
fn one_failed_group_yields_exactly_one_error() {
    let fetcher = healthy_cluster().fail(
        Request::Health,
        FetchError::Transport {
            details: "connection reset".to_string(),
        },
    );
    let aggregator = Aggregator::new(fetcher, CollectOptions::default());
    let required = groups(&[DataGroup::Members, DataGroup::Services, DataGroup::Health]);

    let (snapshot, errors) = aggregator.collect(&required).unwrap();

    assert_eq!(errors.len(), 1, "errors: {errors:?}");
    assert_eq!(errors[0].code(), "MON-2003");
    assert!(snapshot.failed.contains(&DataGroup::Health));
    assert!(snapshot.health.is_empty());
    assert_eq!(snapshot.members.len(), 2);
    assert!(snapshot.is_populated(DataGroup::Services));
    assert!(snapshot.is_partial());
}

#[test]
fn skipped_groups_issue_no_requests() {
    let aggregator = Aggregator::new(healthy_cluster(), CollectOptions::default());
    let (snapshot, errors) = aggregator.collect(&groups(&[DataGroup::Members])).unwrap();

    assert!(errors.is_empty());
    let fetcher = aggregator.fetcher();
    assert_eq!(fetcher.calls(&Request::Cluster), 1);
    assert_eq!(fetcher.calls(&Request::Members), 1);
    assert_eq!(fetcher.total_calls(), 2, "requested: {:?}", fetcher.requested());
    assert!(snapshot.services.is_empty());
    assert!(!snapshot.failed.contains(&DataGroup::Services));
}

#[test]
fn not_found_is_an_empty_result_not_an_error() {
    let fetcher = ScriptedFetcher::new().respond(Request::Cluster, common::CLUSTER);
    let aggregator = Aggregator::new(fetcher, CollectOptions::default());
    let (snapshot, errors) = aggregator
        .collect(&groups(&[DataGroup::Executors, DataGroup::HttpSessions]))
        .unwrap();

    assert!(errors.is_empty(), "errors: {errors:?}");
    assert!(snapshot.executors.is_empty());
    assert!(snapshot.failed.is_empty());
}

#[test]
fn identity_failure_aborts_before_any_group() {
    let fetcher = healthy_cluster().fail(Request::Cluster, FetchError::Timeout { secs: 30 });
    let aggregator = Aggregator::new(fetcher, CollectOptions::default());
    let err = aggregator.collect(&GroupSet::new()).unwrap_err();

    assert!(matches!(err, MonError::Connect { .. }), "{err}");
    assert_eq!(aggregator.fetcher().total_calls(), 1);
}

#[test]
fn nested_failure_zeroes_the_whole_group() {
    let fetcher = healthy_cluster().fail(
        Request::Caches {
            service: "PartitionedCache".to_string(),
        },
        FetchError::Auth { status: 403 },
    );
    let aggregator = Aggregator::new(fetcher, CollectOptions::default());
    let (snapshot, errors) = aggregator.collect(&groups(&[DataGroup::Caches])).unwrap();

    assert_eq!(errors.len(), 1);
    assert!(snapshot.caches.is_empty());
    assert!(snapshot.failed.contains(&DataGroup::Caches));
}

#[test]
fn caches_fan_out_once_per_distinct_service() {
    let aggregator = Aggregator::new(healthy_cluster(), CollectOptions::default());
    let (snapshot, errors) = aggregator.collect(&groups(&[DataGroup::Caches])).unwrap();

    assert!(errors.is_empty());
    let caches_request = Request::Caches {
        service: "PartitionedCache".to_string(),
    };
    assert_eq!(aggregator.fetcher().calls(&caches_request), 1);
    assert_eq!(snapshot.caches.len(), 1);
    assert_eq!(snapshot.caches[0].service_name, "PartitionedCache");
}

#[test]
fn reporters_only_when_verbose_or_dashboard() {
    let quiet = Aggregator::new(healthy_cluster(), CollectOptions::default());
    assert!(!quiet.plan(&GroupSet::new()).contains(&DataGroup::Reporters));

    let dashboard = Aggregator::new(
        healthy_cluster(),
        CollectOptions {
            dashboard_active: true,
            ..CollectOptions::default()
        },
    );
    assert!(dashboard.plan(&GroupSet::new()).contains(&DataGroup::Reporters));
}

#[test]
fn selection_groups_need_a_selection() {
    let fetcher = healthy_cluster().respond(
        Request::ServiceMembers {
            service: "PartitionedCache".to_string(),
        },
        r#"{"items":[{"nodeId":"1"}]}"#,
    );
    let aggregator = Aggregator::new(
        fetcher,
        CollectOptions {
            selection: Selection {
                service: Some("PartitionedCache".to_string()),
                ..Selection::default()
            },
            ..CollectOptions::default()
        },
    );
    let (snapshot, errors) = aggregator
        .collect(&groups(&[DataGroup::ServiceMembers]))
        .unwrap();
    assert!(errors.is_empty(), "errors: {errors:?}");
    assert_eq!(snapshot.service_members.len(), 1);
}

#[test]
fn error_sink_keeps_every_append_under_contention() {
    let sink = Arc::new(ErrorSink::new());
    let handles: Vec<_> = (0..16)
        .map(|t| {
            let sink = Arc::clone(&sink);
            thread::spawn(move || {
                for i in 0..250 {
                    sink.append(format!("{t}-{i}"));
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }
    let sink = Arc::try_unwrap(sink).unwrap();
    assert_eq!(sink.len(), 16 * 250);
    let mut all = sink.drain();
    all.sort();
    all.dedup();
    assert_eq!(all.len(), 16 * 250);
}
