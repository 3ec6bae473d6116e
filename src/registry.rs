//! Track registry: the authoritative in-memory list of session tracks.
//!
//! The `TrackRegistry` lives in `registry::model` and holds the ordered
//! tracks, the focused track and the timeline cursor.

mod model;

pub use model::*;
