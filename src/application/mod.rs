//! Application Layer - Use cases
//!
//! - `SpreadPipeline`: batch run over an aligned pair
//! - `SpreadMonitor`: tick-by-tick run with the same semantics
//! - `report`: console and JSON output of a run

pub mod pipeline;
pub mod monitor;
pub mod report;

pub use pipeline::{BacktestResult, PipelineError, SpreadPipeline, StepRecord};
pub use monitor::{MonitorError, SpreadMonitor};
pub use report::{export_json, render_text, summary_json, ReportError};
