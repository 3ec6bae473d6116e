//! Track model and helpers for the media assets known to a session.
//!
//! `model` holds the `Track` record and its opaque server references,
//! `display` renders tracks for list views and `scan` expands a user
//! selection into the files to upload.

mod display;
mod model;
mod scan;

pub use display::{format_time, track_summary};
pub use model::*;
pub use scan::collect_uploads;
