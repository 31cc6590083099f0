// crates/exports/src/lib.rs
//! Client-side reconciliation engine for long-running export jobs.
//!
//! Maintains the live state of zero-or-more concurrent exports, merges
//! unordered/at-least-once push updates and recovery snapshots into it,
//! derives the indicator views, and emits at most one toast per job's
//! terminal transition. See `registry` for the merge rules and `monitor`
//! for the runtime wiring.

pub mod config;
pub mod monitor;
pub mod notify;
pub mod reconcile;
pub mod registry;
pub mod tracker;
pub mod view;

pub use config::TrackerConfig;
pub use monitor::{ExportMonitor, InboundSignal};
pub use notify::NotificationLedger;
pub use registry::ExportRegistry;
pub use tracker::{ExportEvent, ExportTracker};
pub use view::IndicatorView;
