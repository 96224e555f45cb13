//! Playing, transport delegation and list navigation.

use std::time::Duration;

use tracing::debug;

use super::{Coordinator, clamp_speed, updates};
use crate::engine::PlaybackService;
use crate::library::Track;

impl<S: PlaybackService> Coordinator<S> {
    /// Make `track` current and start it.
    pub fn play(&mut self, track: Track) {
        debug!(track = %track.title, "play");
        self.last_track = Some(track.id);
        self.persist();

        if track.lyrics.is_none() {
            updates::spawn_lyrics(self.updates_tx.clone(), &track);
        }

        let speed = self.speed;
        self.with_service(|s| {
            s.load_and_play(&track, true);
            s.set_speed(speed);
        });

        self.position = Duration::ZERO;
        self.duration = track.duration;
        self.current = Some(track);
        self.playing = true;
    }

    pub fn toggle_play_pause(&mut self) {
        if self.current.is_none() {
            return;
        }
        self.with_service(|s| s.toggle_play_pause());
        self.playing = !self.playing;
    }

    pub fn seek(&mut self, position: Duration) {
        if self.current.is_none() {
            return;
        }
        let target = if self.duration.is_zero() {
            position
        } else {
            position.min(self.duration)
        };
        self.with_service(|s| s.seek(target));
        self.position = target;
    }

    /// Seek by one step forward or backward from the current position.
    pub fn seek_relative(&mut self, forward: bool) {
        let target = if forward {
            self.position.saturating_add(self.seek_step)
        } else {
            self.position.saturating_sub(self.seek_step)
        };
        self.seek(target);
    }

    pub fn skip_next(&mut self) {
        if self.tracks.is_empty() {
            return;
        }

        let next = if self.shuffle {
            rand::random_range(0..self.tracks.len())
        } else {
            let candidate = self.current_index().map_or(0, |i| i + 1);
            if candidate < self.tracks.len() {
                candidate
            } else if self.repeat {
                0
            } else {
                return;
            }
        };

        let track = self.tracks[next].clone();
        self.play(track);
    }

    pub fn skip_previous(&mut self) {
        let Some(index) = self.current_index() else {
            return;
        };
        if index == 0 {
            return;
        }
        let track = self.tracks[index - 1].clone();
        self.play(track);
    }

    pub fn set_speed(&mut self, factor: f32) {
        let factor = clamp_speed(factor);
        self.speed = factor;
        self.with_service(|s| s.set_speed(factor));
    }

    pub fn toggle_shuffle(&mut self) {
        self.shuffle = !self.shuffle;
        self.notices.push(if self.shuffle {
            "Shuffle on".to_string()
        } else {
            "Shuffle off".to_string()
        });
    }

    pub fn toggle_repeat(&mut self) {
        self.repeat = !self.repeat;
        self.notices.push(if self.repeat {
            "Repeat on".to_string()
        } else {
            "Repeat off".to_string()
        });
    }

    /// Pull position and duration from the engine. Only while playing and connected.
    pub(super) fn refresh_progress(&mut self) {
        if !self.playing {
            return;
        }
        let Some(service) = &self.service else {
            return;
        };
        let status = service.status();
        self.duration = status.duration;
        self.position = if status.duration.is_zero() {
            status.position
        } else {
            status.position.min(status.duration)
        };
    }

    fn current_index(&self) -> Option<usize> {
        let id = self.current.as_ref()?.id;
        self.tracks.iter().position(|t| t.id == id)
    }
}
