//! Search filter and multi-select.

use super::Coordinator;
use crate::engine::PlaybackService;
use crate::library::TrackId;

impl<S: PlaybackService> Coordinator<S> {
    pub fn set_query(&mut self, query: &str) {
        self.query = query.to_string();
        self.refilter();
    }

    /// Case-insensitive substring match on title and artist.
    pub(super) fn refilter(&mut self) {
        let needle = self.query.to_lowercase();
        self.filtered = self
            .tracks
            .iter()
            .enumerate()
            .filter(|(_, t)| {
                needle.is_empty()
                    || t.title.to_lowercase().contains(&needle)
                    || t
                        .artist
                        .as_deref()
                        .is_some_and(|a| a.to_lowercase().contains(&needle))
            })
            .map(|(i, _)| i)
            .collect();
    }

    /// Long-press gesture: enter selection mode with `id` selected.
    pub fn long_press(&mut self, id: TrackId) {
        if self.selection_mode {
            return;
        }
        self.selection_mode = true;
        self.toggle_selection(id);
    }

    pub fn toggle_selection(&mut self, id: TrackId) {
        if !self.selection.remove(&id) {
            self.selection.insert(id);
        }
        self.selection_mode = !self.selection.is_empty();
    }

    /// Select every track matching the current filter.
    pub fn select_all(&mut self) {
        let ids: Vec<TrackId> = self.visible().map(|t| t.id).collect();
        self.selection.extend(ids);
        self.selection_mode = !self.selection.is_empty();
    }

    pub fn clear_selection(&mut self) {
        self.selection.clear();
        self.selection_mode = false;
    }

    /// Drop the selected tracks from the in-memory list. Files are untouched.
    pub fn delete_selected(&mut self) {
        let selection = std::mem::take(&mut self.selection);
        self.tracks.retain(|t| !selection.contains(&t.id));
        self.refilter();
        self.clear_selection();
    }

    pub fn selection_mode(&self) -> bool {
        self.selection_mode
    }

    pub fn is_selected(&self, id: TrackId) -> bool {
        self.selection.contains(&id)
    }

    pub fn selection_len(&self) -> usize {
        self.selection.len()
    }
}
