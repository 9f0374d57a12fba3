use super::{emit, open_state, CmdResult};

pub fn run() -> CmdResult {
    let (mut state, _config) = open_state()?;
    // Bring a running timer up to date before reporting it.
    state.timer_tick();
    let report = state.status();
    emit(&mut state, &report)
}
