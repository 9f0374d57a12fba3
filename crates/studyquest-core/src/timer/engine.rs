//! Focus timer implementation.
//!
//! The timer is a wall-clock-based state machine. It does not use internal
//! threads - the caller is responsible for calling `tick()` periodically.
//!
//! ## State Transitions
//!
//! ```text
//! Idle -> Running <-> Paused
//!           |
//!           v
//!        Finished -(claim)-> Idle
//! ```
//!
//! Points are not handled here; the session awards them around `start` and
//! `claim`.

use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::events::Event;

pub const DEFAULT_FOCUS_MINUTES: u32 = 25;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimerState {
    Idle,
    Running,
    Paused,
    /// Reached zero; waiting for the user to claim the session.
    Finished,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FocusTimer {
    duration_ms: u64,
    state: TimerState,
    /// Remaining time in milliseconds for the current session.
    remaining_ms: u64,
    /// Timestamp (ms since epoch) of the last start/resume/tick while running.
    #[serde(default)]
    last_tick_epoch_ms: Option<u64>,
}

impl Default for FocusTimer {
    fn default() -> Self {
        Self::new(DEFAULT_FOCUS_MINUTES)
    }
}

impl FocusTimer {
    pub fn new(focus_minutes: u32) -> Self {
        let duration_ms = minutes_to_ms(focus_minutes);
        Self {
            duration_ms,
            state: TimerState::Idle,
            remaining_ms: duration_ms,
            last_tick_epoch_ms: None,
        }
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn state(&self) -> TimerState {
        self.state
    }

    pub fn remaining_ms(&self) -> u64 {
        self.remaining_ms
    }

    pub fn duration_ms(&self) -> u64 {
        self.duration_ms
    }

    pub fn is_running(&self) -> bool {
        self.state == TimerState::Running
    }

    /// 0.0 .. 1.0 progress within the session.
    pub fn progress(&self) -> f64 {
        if self.duration_ms == 0 {
            return 0.0;
        }
        1.0 - (self.remaining_ms as f64 / self.duration_ms as f64)
    }

    /// Remaining time as `mm:ss`.
    pub fn format_remaining(&self) -> String {
        let secs = self.remaining_ms.div_ceil(1000);
        format!("{:02}:{:02}", secs / 60, secs % 60)
    }

    // ── Commands ─────────────────────────────────────────────────────

    pub fn start(&mut self) -> Option<Event> {
        self.start_at(now_ms())
    }

    pub fn pause(&mut self) -> Option<Event> {
        self.pause_at(now_ms())
    }

    /// Call periodically. Returns `Some(Event::TimerFinished)` when the
    /// session reaches zero.
    pub fn tick(&mut self) -> Option<Event> {
        self.tick_at(now_ms())
    }

    /// Leave `Finished` for a fresh `Idle` session. Returns whether there was
    /// a finished session to claim.
    pub fn claim(&mut self) -> bool {
        if self.state != TimerState::Finished {
            return false;
        }
        self.rewind();
        true
    }

    pub fn reset(&mut self) -> Option<Event> {
        self.rewind();
        Some(Event::TimerReset { at: Utc::now() })
    }

    /// Change the session length. Only applies while idle.
    pub fn set_focus_minutes(&mut self, focus_minutes: u32) -> bool {
        if self.state != TimerState::Idle {
            return false;
        }
        self.duration_ms = minutes_to_ms(focus_minutes);
        self.remaining_ms = self.duration_ms;
        true
    }

    // ── Clock-explicit variants ──────────────────────────────────────

    pub fn start_at(&mut self, now: u64) -> Option<Event> {
        match self.state {
            TimerState::Idle | TimerState::Paused => {
                self.state = TimerState::Running;
                self.last_tick_epoch_ms = Some(now);
                Some(Event::TimerStarted {
                    remaining_ms: self.remaining_ms,
                    at: Utc::now(),
                })
            }
            TimerState::Running | TimerState::Finished => None,
        }
    }

    pub fn pause_at(&mut self, now: u64) -> Option<Event> {
        if self.state != TimerState::Running {
            return None;
        }
        if let Some(finished) = self.tick_at(now) {
            return Some(finished);
        }
        self.state = TimerState::Paused;
        self.last_tick_epoch_ms = None;
        Some(Event::TimerPaused {
            remaining_ms: self.remaining_ms,
            at: Utc::now(),
        })
    }

    pub fn tick_at(&mut self, now: u64) -> Option<Event> {
        if self.state != TimerState::Running {
            return None;
        }
        self.flush_elapsed(now);
        if self.remaining_ms == 0 {
            self.state = TimerState::Finished;
            self.last_tick_epoch_ms = None;
            return Some(Event::TimerFinished { at: Utc::now() });
        }
        None
    }

    // ── Internal ─────────────────────────────────────────────────────

    fn flush_elapsed(&mut self, now: u64) {
        if let Some(last) = self.last_tick_epoch_ms {
            let elapsed = now.saturating_sub(last);
            self.remaining_ms = self.remaining_ms.saturating_sub(elapsed);
            self.last_tick_epoch_ms = Some(now);
        }
    }

    fn rewind(&mut self) {
        self.state = TimerState::Idle;
        self.remaining_ms = self.duration_ms;
        self.last_tick_epoch_ms = None;
    }
}

fn minutes_to_ms(minutes: u32) -> u64 {
    (minutes as u64).saturating_mul(60).saturating_mul(1000)
}

fn now_ms() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as u64
}

#[cfg(test)]
mod tests {
    use super::*;

    const MIN: u64 = 60_000;

    #[test]
    fn start_pause_resume() {
        let mut timer = FocusTimer::default();
        assert_eq!(timer.state(), TimerState::Idle);
        assert_eq!(timer.format_remaining(), "25:00");

        assert!(timer.start_at(0).is_some());
        assert_eq!(timer.state(), TimerState::Running);
        assert!(timer.start_at(10).is_none());

        assert!(timer.pause_at(MIN).is_some());
        assert_eq!(timer.state(), TimerState::Paused);
        assert_eq!(timer.remaining_ms(), 24 * MIN);
        assert_eq!(timer.format_remaining(), "24:00");

        // Paused time does not count.
        assert!(timer.start_at(10 * MIN).is_some());
        assert!(timer.tick_at(11 * MIN).is_none());
        assert_eq!(timer.remaining_ms(), 23 * MIN);
    }

    #[test]
    fn finishes_and_claims() {
        let mut timer = FocusTimer::new(1);
        timer.start_at(0);
        assert!(timer.tick_at(30_000).is_none());
        assert_eq!(timer.format_remaining(), "00:30");
        assert!(matches!(timer.tick_at(MIN + 5), Some(Event::TimerFinished { .. })));
        assert_eq!(timer.state(), TimerState::Finished);
        assert_eq!(timer.format_remaining(), "00:00");
        assert!(timer.start_at(2 * MIN).is_none());

        assert!(timer.claim());
        assert_eq!(timer.state(), TimerState::Idle);
        assert_eq!(timer.remaining_ms(), MIN);
        assert!(!timer.claim());
    }

    #[test]
    fn pause_after_deadline_finishes() {
        let mut timer = FocusTimer::new(1);
        timer.start_at(0);
        assert!(matches!(timer.pause_at(2 * MIN), Some(Event::TimerFinished { .. })));
        assert_eq!(timer.state(), TimerState::Finished);
    }

    #[test]
    fn reset_rewinds() {
        let mut timer = FocusTimer::default();
        timer.start_at(0);
        timer.tick_at(5 * MIN);
        timer.reset();
        assert_eq!(timer.state(), TimerState::Idle);
        assert_eq!(timer.remaining_ms(), 25 * MIN);
        assert_eq!(timer.progress(), 0.0);
    }

    #[test]
    fn long_sessions_keep_full_minutes() {
        let mut timer = FocusTimer::new(90);
        assert_eq!(timer.format_remaining(), "90:00");
        timer.start_at(0);
        timer.tick_at(61 * 1000);
        assert_eq!(timer.format_remaining(), "88:59");
    }

    #[test]
    fn duration_changes_only_when_idle() {
        let mut timer = FocusTimer::default();
        assert!(timer.set_focus_minutes(50));
        assert_eq!(timer.format_remaining(), "50:00");
        timer.start_at(0);
        assert!(!timer.set_focus_minutes(10));
    }

    #[test]
    fn serde_roundtrip_keeps_running_clock() {
        let mut timer = FocusTimer::default();
        timer.start_at(1_000);
        let json = serde_json::to_string(&timer).unwrap();
        let restored: FocusTimer = serde_json::from_str(&json).unwrap();
        assert_eq!(restored, timer);
    }
}
