#![forbid(unsafe_code)]

//! clustermon: live multi-panel terminal dashboard for distributed data-grid
//! clusters.
//!
//! The library is organised around one refresh cycle:
//! 1. **Collector**: concurrent fan-out of REST requests into one [`collector::ClusterSnapshot`]
//! 2. **Panels**: pure content functions over the snapshot, arranged by a layout string
//! 3. **Format**: the table engine that aligns, sorts, truncates and highlights rows
//! 4. **TUI**: the interactive render loop (feature `tui`)
//!
//! # Library usage
//!
//! ```rust,no_run
//! use clustermon::prelude::*;
//! ```

pub mod prelude;

pub mod collector;
pub mod core;
pub mod fetcher;
pub mod format;
pub mod logger;
pub mod model;
pub mod panels;
#[cfg(feature = "tui")]
pub mod tui;
