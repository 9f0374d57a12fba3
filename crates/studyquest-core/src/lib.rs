//! # StudyQuest Core Library
//!
//! Core logic for StudyQuest, a study-productivity companion that rewards
//! focused work with points, levels and unlockable mini-games. Every
//! operation is available through the standalone CLI binary; any other front
//! end is a thin layer over this crate.
//!
//! ## Architecture
//!
//! - **Rewards**: points, levels and the unlock set, with the level-up policy
//! - **Session**: [`StudyState`] owns the user's data and writes changed keys
//!   through a [`KvStore`] after every operation
//! - **Games**: the mini-game catalog and the logic of the turn-based games
//! - **Timer**: a wall-clock focus timer; the caller drives `tick()`
//! - **Assistant**: chat completion client and the chat log
//! - **Storage**: SQLite key-value store and TOML configuration
//!
//! ## Key Components
//!
//! - [`RewardState`]: points, level and unlocked content
//! - [`StudyState`]: session context for all operations
//! - [`FocusTimer`]: focus session state machine
//! - [`Config`]: application configuration management

pub mod assistant;
pub mod auth;
pub mod error;
pub mod events;
pub mod games;
pub mod planner;
pub mod reward;
pub mod session;
pub mod storage;
pub mod timer;

pub use assistant::{ChatMessage, CompletionClient, TextCompletion};
pub use auth::{AuthSession, IdentityProvider, LocalIdentity, UserProfile};
pub use error::{
    AssistantError, AuthError, ConfigError, CoreError, StoreError, ValidationError,
};
pub use events::{Event, PointSource};
pub use games::{Game, GameOutcome};
pub use planner::{CalendarEvent, Task};
pub use reward::{RewardDelta, RewardState, POINTS_PER_LEVEL};
pub use session::{StatusReport, StudyState};
pub use storage::{Config, KvStore, MemoryStore, SqliteStore};
pub use timer::{FocusTimer, TimerState};
