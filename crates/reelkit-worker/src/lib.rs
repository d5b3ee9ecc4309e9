//! Job orchestration engine for ReelKit.
//!
//! This crate provides:
//! - The dispatcher loop with a bounded in-flight cap
//! - Per-kind job handlers and their registry
//! - Retry policy with failure classification
//! - The reaper for old terminal jobs
//! - The `JobService` submission/inspection surface

pub mod config;
pub mod dispatcher;
pub mod error;
pub mod handler;
pub mod handlers;
pub mod logging;
pub mod reaper;
pub mod retry;
pub mod service;
pub mod telemetry;

pub use config::WorkerConfig;
pub use dispatcher::Dispatcher;
pub use error::{WorkerError, WorkerResult};
pub use handler::{HandlerRegistry, JobHandler, StageContext};
pub use handlers::{GenerateClipHandler, GenerateSubtitlesHandler, ProcessVideoHandler};
pub use logging::JobLogger;
pub use reaper::Reaper;
pub use service::JobService;
