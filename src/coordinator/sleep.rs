use std::sync::mpsc::{self, RecvTimeoutError, Sender};
use std::thread;
use std::time::{Duration, Instant};

use super::Coordinator;
use super::updates::Update;
use crate::engine::PlaybackService;

/// One-shot deadline on a helper thread.
///
/// Re-arming or cancelling drops the previous thread's cancel sender, which
/// wakes it without firing. A generation counter guards against an expiry
/// that was already in flight.
#[derive(Default)]
pub(super) struct SleepTimer {
    generation: u64,
    cancel: Option<Sender<()>>,
    deadline: Option<Instant>,
}

impl SleepTimer {
    pub fn arm(&mut self, after: Duration, updates: Sender<Update>) {
        self.cancel();
        self.generation += 1;
        let generation = self.generation;

        let (cancel_tx, cancel_rx) = mpsc::channel::<()>();
        thread::spawn(move || {
            if let Err(RecvTimeoutError::Timeout) = cancel_rx.recv_timeout(after) {
                let _ = updates.send(Update::SleepTimerExpired(generation));
            }
        });

        self.cancel = Some(cancel_tx);
        self.deadline = Some(Instant::now() + after);
    }

    pub fn cancel(&mut self) {
        self.cancel = None;
        self.deadline = None;
    }

    /// Consume an expiry if it belongs to the live arming.
    pub fn take_expired(&mut self, generation: u64) -> bool {
        if generation != self.generation || self.deadline.is_none() {
            return false;
        }
        self.cancel();
        true
    }

    pub fn remaining(&self) -> Option<Duration> {
        self.deadline
            .map(|d| d.saturating_duration_since(Instant::now()))
    }
}

impl<S: PlaybackService> Coordinator<S> {
    /// Arm the sleep timer for `minutes`, replacing any earlier one. Zero cancels.
    pub fn set_sleep_timer(&mut self, minutes: u32) {
        let was_armed = self.sleep_minutes > 0;
        self.sleep.cancel();
        self.sleep_minutes = minutes;

        if minutes == 0 {
            if was_armed {
                self.notices.push("Sleep timer cancelled".to_string());
            }
            return;
        }

        self.sleep
            .arm(self.sleep_unit * minutes, self.updates_tx.clone());
        self.notices
            .push(format!("Playback will pause in {minutes} min"));
    }

    pub(super) fn on_sleep_expired(&mut self, generation: u64) {
        if !self.sleep.take_expired(generation) {
            return;
        }
        if self.playing && self.current.is_some() {
            self.with_service(|s| s.toggle_play_pause());
            self.playing = false;
        }
        self.sleep_minutes = 0;
        self.notices.push("Sleep timer: playback paused".to_string());
    }

    pub fn sleep_minutes(&self) -> u32 {
        self.sleep_minutes
    }

    pub fn sleep_remaining(&self) -> Option<Duration> {
        self.sleep.remaining()
    }
}
