//! Concurrent fan-out collection of cluster statistics into one snapshot.

pub mod aggregator;
pub mod error_sink;
pub mod groups;
pub mod snapshot;

pub use aggregator::{Aggregator, CollectOptions};
pub use error_sink::ErrorSink;
pub use groups::{DataGroup, GroupSet, Selection};
pub use snapshot::ClusterSnapshot;
