//! The `TrackRegistry`: ordered tracks, the focused track and the timeline
//! cursor.

use crate::error::PreconditionError;
use crate::library::{Track, TrackId, TrackState};

/// The timeline never shrinks below this many seconds, even when empty.
pub const MIN_TIMELINE_SECONDS: f64 = 300.0;

/// Session-scoped collection of tracks in insertion order.
#[derive(Debug, Default)]
pub struct TrackRegistry {
    tracks: Vec<Track>,
    selected: Option<TrackId>,
    cursor_seconds: f64,
}

impl TrackRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append `track`, rejecting ids that are already present.
    pub fn add(&mut self, track: Track) -> Result<(), PreconditionError> {
        if self.contains(&track.id) {
            return Err(PreconditionError::DuplicateId(track.id));
        }
        self.tracks.push(track);
        Ok(())
    }

    /// Remove the track with `id`, if any. Clears the selection only when it
    /// pointed at the removed track.
    pub fn remove(&mut self, id: &TrackId) -> Option<Track> {
        let pos = self.tracks.iter().position(|t| &t.id == id)?;
        let removed = self.tracks.remove(pos);
        if self.selected.as_ref() == Some(id) {
            self.selected = None;
        }
        Some(removed)
    }

    pub fn find(&self, id: &TrackId) -> Option<&Track> {
        self.tracks.iter().find(|t| &t.id == id)
    }

    pub fn contains(&self, id: &TrackId) -> bool {
        self.find(id).is_some()
    }

    /// Apply `mutator` to the mutable part of the matching track.
    pub fn update<R>(
        &mut self,
        id: &TrackId,
        mutator: impl FnOnce(&mut TrackState) -> R,
    ) -> Result<R, PreconditionError> {
        let track = self
            .tracks
            .iter_mut()
            .find(|t| &t.id == id)
            .ok_or_else(|| PreconditionError::NotFound(id.clone()))?;
        Ok(mutator(&mut track.state))
    }

    pub fn select(&mut self, id: &TrackId) -> Result<(), PreconditionError> {
        if !self.contains(id) {
            return Err(PreconditionError::NotFound(id.clone()));
        }
        self.selected = Some(id.clone());
        Ok(())
    }

    pub fn clear_selection(&mut self) {
        self.selected = None;
    }

    pub fn selected_id(&self) -> Option<&TrackId> {
        self.selected.as_ref()
    }

    pub fn selected(&self) -> Option<&Track> {
        self.selected.as_ref().and_then(|id| self.find(id))
    }

    /// Nominal timeline extent: the longest track, but never below
    /// `MIN_TIMELINE_SECONDS`.
    pub fn max_duration(&self) -> f64 {
        self.tracks
            .iter()
            .map(|t| t.duration_seconds)
            .fold(MIN_TIMELINE_SECONDS, f64::max)
    }

    /// Move the timeline cursor to a fraction of `max_duration()`.
    pub fn seek_fraction(&mut self, fraction: f64) {
        let fraction = if fraction.is_nan() {
            0.0
        } else {
            fraction.clamp(0.0, 1.0)
        };
        self.cursor_seconds = fraction * self.max_duration();
    }

    pub fn cursor_seconds(&self) -> f64 {
        self.cursor_seconds
    }

    /// Cursor position relative to the current timeline extent. Can exceed
    /// 1.0 when the track that defined the extent was removed.
    pub fn cursor_fraction(&self) -> f64 {
        self.cursor_seconds / self.max_duration()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Track> {
        self.tracks.iter()
    }

    pub fn len(&self) -> usize {
        self.tracks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }
}
