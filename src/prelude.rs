//! Convenience re-exports for library consumers.
//!
//! ```rust,no_run
//! use clustermon::prelude::*;
//! ```

// Core
pub use crate::core::config::Config;
pub use crate::core::errors::{FetchError, MonError, Result};

// Collection
pub use crate::collector::{
    Aggregator, ClusterSnapshot, CollectOptions, DataGroup, ErrorSink, GroupSet, Selection,
};
pub use crate::fetcher::{Fetcher, Request};

// Panels and formatting
pub use crate::format::{RenderOptions, Rendered, Table};
pub use crate::panels::{ContentContext, Layout, Panel, PanelRegistry, produce_lines};

// Dashboard
#[cfg(feature = "tui")]
pub use crate::tui::{DashboardController, DashboardSettings, run_dashboard};
