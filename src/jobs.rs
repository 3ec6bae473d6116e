//! Job orchestration: validation, the per-track status machine and the
//! background worker that performs remote calls.
//!
//! `Orchestrator` is the entry point. Front ends build `JobRequest`s,
//! consult `Orchestrator::options_for` to present choices and listen to
//! `SessionEvent`s for changes.

mod download;
mod options;
mod orchestrator;
mod plan;
mod types;
mod worker;

pub use options::{ConvertOptions, ImageInput, format_label};
pub use orchestrator::Orchestrator;
pub use types::*;
