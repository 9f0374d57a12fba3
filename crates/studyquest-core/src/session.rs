//! Study session state.
//!
//! `StudyState` owns everything a user accumulates: points, level, unlocked
//! games, tasks, calendar events, the focus timer, chat history and the
//! identity session. It is loaded once from a [`KvStore`] and writes changed
//! keys back after every operation.
//!
//! ## Persistence
//!
//! Each field maps to one store key holding JSON. Operations mark only the
//! fields they changed; [`StudyState::flush`] writes those and nothing else.
//! A failed write is logged and the key stays dirty, so the next successful
//! operation retries it. Undecodable or missing values load as defaults.

use std::collections::BTreeSet;

use chrono::{DateTime, NaiveDate, Utc};
use serde::de::DeserializeOwned;
use serde::Serialize;
use uuid::Uuid;

use crate::assistant::ChatMessage;
use crate::auth::{AuthSession, IdentityProvider};
use crate::error::{AssistantError, StoreError, ValidationError};
use crate::events::{Event, PointSource};
use crate::games::{Game, GameOutcome};
use crate::planner::{CalendarEvent, Task};
use crate::reward::{RewardDelta, RewardState, DEFAULT_LEVEL};
use crate::storage::{Config, KvStore, RewardsConfig};
use crate::timer::{FocusTimer, TimerState, DEFAULT_FOCUS_MINUTES};

/// Store keys.
pub mod keys {
    pub const POINTS: &str = "userPoints";
    pub const LEVEL: &str = "userLevel";
    pub const UNLOCKED: &str = "unlockedGames";
    pub const TASKS: &str = "userTasks";
    pub const EVENTS: &str = "userEvents";
    pub const TIMER: &str = "focusTimer";
    pub const CHAT: &str = "chatHistory";
    pub const AUTH: &str = "authSession";
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum Field {
    Points,
    Level,
    Unlocked,
    Tasks,
    Events,
    Timer,
    Chat,
    Auth,
}

impl Field {
    fn key(self) -> &'static str {
        match self {
            Field::Points => keys::POINTS,
            Field::Level => keys::LEVEL,
            Field::Unlocked => keys::UNLOCKED,
            Field::Tasks => keys::TASKS,
            Field::Events => keys::EVENTS,
            Field::Timer => keys::TIMER,
            Field::Chat => keys::CHAT,
            Field::Auth => keys::AUTH,
        }
    }
}

/// Compact view for status displays.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StatusReport {
    pub points: u64,
    pub level: u32,
    pub progress_within_level: u64,
    pub progress_fraction: f64,
    pub unlocked: Vec<String>,
    pub next_unlock: Option<NextUnlock>,
    pub tasks_open: usize,
    pub tasks_done: usize,
    pub calendar_events: usize,
    pub timer_state: TimerState,
    pub timer_remaining: String,
    pub signed_in_as: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NextUnlock {
    pub game: String,
    pub level: u32,
}

pub struct StudyState<S> {
    store: S,
    rules: RewardsConfig,
    reward: RewardState,
    tasks: Vec<Task>,
    events: Vec<CalendarEvent>,
    timer: FocusTimer,
    focus_minutes: u32,
    chat: Vec<ChatMessage>,
    auth: AuthSession,
    dirty: BTreeSet<Field>,
    pending: Vec<Event>,
}

impl<S: KvStore> StudyState<S> {
    /// Load from `store`. Never fails: anything missing or undecodable
    /// falls back to its default.
    pub fn load(store: S, config: &Config) -> Self {
        let points = read(&store, keys::POINTS).unwrap_or(0);
        let level = read(&store, keys::LEVEL).unwrap_or(DEFAULT_LEVEL);
        let unlocked: BTreeSet<String> = read(&store, keys::UNLOCKED).unwrap_or_default();
        let reward = RewardState::new(points, level, unlocked);

        let focus_minutes = if config.timer.focus_minutes == 0 {
            tracing::warn!("ignoring zero-minute focus length");
            DEFAULT_FOCUS_MINUTES
        } else {
            config.timer.focus_minutes
        };
        let mut timer: FocusTimer = read(&store, keys::TIMER).unwrap_or_default();
        timer.set_focus_minutes(focus_minutes);

        let state = Self {
            tasks: read(&store, keys::TASKS).unwrap_or_default(),
            events: read(&store, keys::EVENTS).unwrap_or_default(),
            chat: read(&store, keys::CHAT).unwrap_or_default(),
            auth: read(&store, keys::AUTH).unwrap_or_default(),
            store,
            rules: config.rewards.clone(),
            reward,
            timer,
            focus_minutes,
            dirty: BTreeSet::new(),
            pending: Vec::new(),
        };
        tracing::debug!(
            points = state.reward.points(),
            level = state.reward.level(),
            tasks = state.tasks.len(),
            "session loaded"
        );
        state
    }

    // ── Accessors ────────────────────────────────────────────────────

    pub fn reward(&self) -> &RewardState {
        &self.reward
    }

    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn calendar_events(&self) -> &[CalendarEvent] {
        &self.events
    }

    pub fn timer(&self) -> &FocusTimer {
        &self.timer
    }

    pub fn chat_history(&self) -> &[ChatMessage] {
        &self.chat
    }

    pub fn auth(&self) -> &AuthSession {
        &self.auth
    }

    /// Whether some change has not reached the store yet.
    pub fn has_unsaved_changes(&self) -> bool {
        !self.dirty.is_empty()
    }

    pub fn status(&self) -> StatusReport {
        let tasks_done = self.tasks.iter().filter(|t| t.completed).count();
        StatusReport {
            points: self.reward.points(),
            level: self.reward.level(),
            progress_within_level: self.reward.progress_within_level(),
            progress_fraction: self.reward.progress_fraction(),
            unlocked: self.reward.unlocked().iter().cloned().collect(),
            next_unlock: self.reward.next_unlock().map(|g| NextUnlock {
                game: g.id().to_string(),
                level: g.unlock_level(),
            }),
            tasks_open: self.tasks.len() - tasks_done,
            tasks_done,
            calendar_events: self.events.len(),
            timer_state: self.timer.state(),
            timer_remaining: self.timer.format_remaining(),
            signed_in_as: self.auth.display_name().map(str::to_string),
        }
    }

    /// Take the events produced since the last drain.
    pub fn drain_events(&mut self) -> Vec<Event> {
        std::mem::take(&mut self.pending)
    }

    // ── Points ───────────────────────────────────────────────────────

    pub fn add_points(&mut self, amount: u64) -> RewardDelta {
        let delta = self.award(amount, PointSource::Manual);
        self.commit();
        delta
    }

    /// Signed entry point for untrusted input. Negative amounts are rejected
    /// and leave the state untouched.
    pub fn try_add_points(&mut self, amount: i64) -> Result<RewardDelta, ValidationError> {
        let delta = self.reward.try_add_points(amount)?;
        self.record(&delta, PointSource::Manual);
        self.commit();
        Ok(delta)
    }

    // ── Tasks ────────────────────────────────────────────────────────

    pub fn add_task(&mut self, text: &str) -> Result<Task, ValidationError> {
        let text = non_empty("task", text)?;
        let task = Task::new(text);
        self.tasks.push(task.clone());
        self.dirty.insert(Field::Tasks);
        self.pending.push(Event::TaskAdded {
            task_id: task.id,
            at: Utc::now(),
        });
        self.award(self.rules.task_added, PointSource::TaskAdded);
        self.commit();
        Ok(task)
    }

    /// Flip completion. Completing awards points; un-completing does not
    /// take them back. Unknown ids are a no-op.
    pub fn toggle_task(&mut self, id: Uuid) -> Option<Task> {
        let task = self.tasks.iter_mut().find(|t| t.id == id)?;
        task.completed = !task.completed;
        let task = task.clone();
        self.dirty.insert(Field::Tasks);
        self.pending.push(Event::TaskToggled {
            task_id: id,
            completed: task.completed,
            at: Utc::now(),
        });
        if task.completed {
            self.award(self.rules.task_completed, PointSource::TaskCompleted);
        }
        self.commit();
        Some(task)
    }

    // ── Calendar ─────────────────────────────────────────────────────

    pub fn add_event(
        &mut self,
        title: &str,
        timestamp: DateTime<Utc>,
    ) -> Result<CalendarEvent, ValidationError> {
        let title = non_empty("title", title)?;
        let event = CalendarEvent::new(title, timestamp);
        self.events.push(event.clone());
        self.dirty.insert(Field::Events);
        self.pending.push(Event::CalendarEventAdded {
            event_id: event.id,
            at: Utc::now(),
        });
        self.award(self.rules.event_added, PointSource::EventAdded);
        self.commit();
        Ok(event)
    }

    pub fn delete_event(&mut self, id: Uuid) -> Option<CalendarEvent> {
        let pos = self.events.iter().position(|e| e.id == id)?;
        let event = self.events.remove(pos);
        self.dirty.insert(Field::Events);
        self.pending.push(Event::CalendarEventDeleted {
            event_id: id,
            at: Utc::now(),
        });
        self.commit();
        Some(event)
    }

    /// Events on `date`, earliest first.
    pub fn events_on(&self, date: NaiveDate) -> Vec<&CalendarEvent> {
        let mut day: Vec<_> = self.events.iter().filter(|e| e.falls_on(date)).collect();
        day.sort_by_key(|e| e.timestamp);
        day
    }

    // ── Games ────────────────────────────────────────────────────────

    pub fn ensure_unlocked(&self, game: Game) -> Result<(), ValidationError> {
        if self.reward.is_unlocked(game.id()) {
            Ok(())
        } else {
            Err(ValidationError::Locked {
                game: game.id().to_string(),
                level: game.unlock_level(),
            })
        }
    }

    /// Credit a game outcome. Zero-point outcomes change nothing.
    pub fn apply_outcome(&mut self, outcome: &GameOutcome) -> RewardDelta {
        let delta = self.award(outcome.points(), PointSource::Game(outcome.game()));
        self.commit();
        delta
    }

    // ── Focus timer ──────────────────────────────────────────────────

    /// Start or resume. Only a fresh start from idle earns points.
    pub fn timer_start(&mut self) -> Option<RewardDelta> {
        let was_idle = self.timer.state() == TimerState::Idle;
        let event = self.timer.start()?;
        self.pending.push(event);
        self.dirty.insert(Field::Timer);
        let delta = if was_idle {
            self.award(self.rules.timer_started, PointSource::TimerStarted)
        } else {
            RewardDelta::default()
        };
        self.commit();
        Some(delta)
    }

    pub fn timer_pause(&mut self) -> bool {
        let Some(event) = self.timer.pause() else {
            return false;
        };
        let paused = matches!(event, Event::TimerPaused { .. });
        self.pending.push(event);
        self.dirty.insert(Field::Timer);
        self.commit();
        paused
    }

    /// Advance the running clock. Returns `true` once the session finishes.
    pub fn timer_tick(&mut self) -> bool {
        if !self.timer.is_running() {
            return false;
        }
        let finished = self.timer.tick();
        self.dirty.insert(Field::Timer);
        let done = finished.is_some();
        self.pending.extend(finished);
        self.commit();
        done
    }

    /// Collect the reward for a finished session and return to idle.
    pub fn timer_claim(&mut self) -> Option<RewardDelta> {
        self.timer_tick();
        if !self.timer.claim() {
            return None;
        }
        self.timer.set_focus_minutes(self.focus_minutes);
        self.dirty.insert(Field::Timer);
        let delta = self.award(self.rules.timer_completed, PointSource::TimerCompleted);
        self.commit();
        Some(delta)
    }

    pub fn timer_reset(&mut self) {
        self.pending.extend(self.timer.reset());
        self.timer.set_focus_minutes(self.focus_minutes);
        self.dirty.insert(Field::Timer);
        self.commit();
    }

    // ── Assistant ────────────────────────────────────────────────────

    /// Record the user's side of an exchange.
    pub fn begin_ask(&mut self, prompt: &str) -> Result<(), ValidationError> {
        let prompt = non_empty("prompt", prompt)?;
        self.chat.push(ChatMessage::user(prompt));
        self.dirty.insert(Field::Chat);
        self.commit();
        Ok(())
    }

    /// Record the outcome of a completion. A reply earns points; a failure
    /// becomes an apology line.
    pub fn finish_ask(&mut self, result: Result<String, AssistantError>) -> &ChatMessage {
        let at = Utc::now();
        let message = match result {
            Ok(reply) => {
                self.pending.push(Event::AssistantReplied { at });
                self.award(self.rules.assistant_reply, PointSource::AssistantReply);
                ChatMessage::assistant(reply)
            }
            Err(e) => {
                tracing::warn!(error = %e, "completion failed");
                self.pending.push(Event::AssistantFailed {
                    error: e.to_string(),
                    at,
                });
                ChatMessage::failure(&e)
            }
        };
        self.chat.push(message);
        self.dirty.insert(Field::Chat);
        self.commit();
        &self.chat[self.chat.len() - 1]
    }

    pub fn clear_chat(&mut self) {
        self.chat.clear();
        self.dirty.insert(Field::Chat);
        self.commit();
    }

    // ── Identity ─────────────────────────────────────────────────────

    pub fn login<P: IdentityProvider + ?Sized>(&mut self, provider: &mut P) -> bool {
        let ok = self.auth.login(provider);
        if ok {
            self.dirty.insert(Field::Auth);
            self.commit();
        }
        ok
    }

    pub fn logout<P: IdentityProvider + ?Sized>(&mut self, provider: &mut P) {
        self.auth.logout(provider);
        self.dirty.insert(Field::Auth);
        self.commit();
    }

    // ── Persistence ──────────────────────────────────────────────────

    /// Write every dirty key. Keys that fail stay dirty; the first error is
    /// returned.
    pub fn flush(&mut self) -> Result<(), StoreError> {
        let fields = std::mem::take(&mut self.dirty);
        let mut first_err = None;
        let mut written = 0;
        for field in fields {
            match self.write(field) {
                Ok(()) => written += 1,
                Err(e) => {
                    tracing::warn!(key = field.key(), error = %e, "write-through failed");
                    self.dirty.insert(field);
                    first_err.get_or_insert(e);
                }
            }
        }
        if written > 0 {
            tracing::debug!(written, "flushed");
        }
        match first_err {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }

    fn commit(&mut self) {
        // Already logged per key; the dirty set carries the retry.
        let _ = self.flush();
    }

    fn write(&self, field: Field) -> Result<(), StoreError> {
        let encoded = match field {
            Field::Points => serde_json::to_string(&self.reward.points()),
            Field::Level => serde_json::to_string(&self.reward.level()),
            Field::Unlocked => serde_json::to_string(self.reward.unlocked()),
            Field::Tasks => serde_json::to_string(&self.tasks),
            Field::Events => serde_json::to_string(&self.events),
            Field::Timer => serde_json::to_string(&self.timer),
            Field::Chat => serde_json::to_string(&self.chat),
            Field::Auth => serde_json::to_string(&self.auth),
        }
        .map_err(|e| StoreError::Encode {
            key: field.key().to_string(),
            message: e.to_string(),
        })?;
        self.store.set(field.key(), &encoded)
    }

    fn award(&mut self, amount: u64, source: PointSource) -> RewardDelta {
        let delta = self.reward.add_points(amount);
        self.record(&delta, source);
        delta
    }

    /// Mark what a reward change touched and queue its events.
    fn record(&mut self, delta: &RewardDelta, source: PointSource) {
        if delta.is_empty() {
            return;
        }
        self.dirty.insert(Field::Points);
        if delta.leveled_up() {
            self.dirty.insert(Field::Level);
        }
        if !delta.unlocked.is_empty() {
            self.dirty.insert(Field::Unlocked);
        }
        self.pending.extend(Event::from_delta(delta, source));
    }
}

fn read<T: DeserializeOwned>(store: &impl KvStore, key: &str) -> Option<T> {
    match store.get(key) {
        Ok(Some(raw)) => match serde_json::from_str(&raw) {
            Ok(value) => Some(value),
            Err(e) => {
                tracing::warn!(key, error = %e, "discarding undecodable value");
                None
            }
        },
        Ok(None) => None,
        Err(e) => {
            tracing::warn!(key, error = %e, "store read failed; using default");
            None
        }
    }
}

fn non_empty<'a>(field: &str, text: &'a str) -> Result<&'a str, ValidationError> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::EmptyText {
            field: field.to_string(),
        });
    }
    Ok(trimmed)
}
