use clap::Subcommand;
use serde::Serialize;
use studyquest_core::{FocusTimer, RewardDelta, SqliteStore, StudyState, TimerState};

use super::{emit, open_state, CmdResult};

#[derive(Subcommand)]
pub enum TimerAction {
    /// Start a focus session, or resume a paused one
    Start,
    /// Pause the running session
    Pause,
    /// Print the timer state as JSON
    Status,
    /// Collect the reward for a finished session
    Claim,
    /// Abandon the session and return to idle
    Reset,
}

#[derive(Serialize)]
struct TimerSnapshot {
    state: TimerState,
    remaining: String,
    remaining_ms: u64,
    progress: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    reward: Option<RewardDelta>,
}

impl TimerSnapshot {
    fn of(timer: &FocusTimer, reward: Option<RewardDelta>) -> Self {
        Self {
            state: timer.state(),
            remaining: timer.format_remaining(),
            remaining_ms: timer.remaining_ms(),
            progress: timer.progress(),
            reward,
        }
    }
}

fn report(state: &mut StudyState<SqliteStore>, reward: Option<RewardDelta>) -> CmdResult {
    let snapshot = TimerSnapshot::of(state.timer(), reward);
    emit(state, &snapshot)
}

pub fn run(action: TimerAction) -> CmdResult {
    let (mut state, _config) = open_state()?;

    match action {
        TimerAction::Start => {
            state.timer_tick();
            match state.timer_start() {
                Some(delta) => report(&mut state, Some(delta)),
                None => Err(format!("timer is {:?}; nothing to start", state.timer().state()).into()),
            }
        }
        TimerAction::Pause => {
            state.timer_pause();
            report(&mut state, None)
        }
        TimerAction::Status => {
            state.timer_tick();
            report(&mut state, None)
        }
        TimerAction::Claim => match state.timer_claim() {
            Some(delta) => report(&mut state, Some(delta)),
            None => Err("no finished session to claim".into()),
        },
        TimerAction::Reset => {
            state.timer_reset();
            report(&mut state, None)
        }
    }
}
