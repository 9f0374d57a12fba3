pub mod assistant;
pub mod auth;
pub mod config;
pub mod event;
pub mod game;
pub mod points;
pub mod status;
pub mod task;
pub mod timer;

use serde::Serialize;
use studyquest_core::{Config, SqliteStore, StudyState};

pub type CmdResult = Result<(), Box<dyn std::error::Error>>;

/// Open the session backed by the on-disk store and config.
pub fn open_state() -> Result<(StudyState<SqliteStore>, Config), Box<dyn std::error::Error>> {
    let config = Config::load()?;
    let store = SqliteStore::open()?;
    tracing::debug!(focus_minutes = config.timer.focus_minutes, "store opened");
    Ok((StudyState::load(store, &config), config))
}

/// Print a value as pretty JSON, followed by any events the last operation
/// produced on stderr.
pub fn emit<T: Serialize>(state: &mut StudyState<SqliteStore>, value: &T) -> CmdResult {
    println!("{}", serde_json::to_string_pretty(value)?);
    for event in state.drain_events() {
        eprintln!("{}", serde_json::to_string(&event)?);
    }
    finish(state)
}

/// Surface a write that never reached the store.
pub fn finish(state: &mut StudyState<SqliteStore>) -> CmdResult {
    state.flush()?;
    Ok(())
}

/// Match a full id or a unique prefix of one.
pub fn resolve_id(
    ids: impl IntoIterator<Item = uuid::Uuid>,
    query: &str,
) -> Result<uuid::Uuid, Box<dyn std::error::Error>> {
    let query = query.trim().to_lowercase();
    if query.is_empty() {
        return Err("id must not be empty".into());
    }
    let matches: Vec<_> = ids
        .into_iter()
        .filter(|id| id.to_string().starts_with(&query))
        .collect();
    match matches.as_slice() {
        [id] => Ok(*id),
        [] => Err(format!("no entry matches id '{query}'").into()),
        _ => Err(format!("id '{query}' is ambiguous").into()),
    }
}
