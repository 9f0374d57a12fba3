//! Calendar event commands.

use chrono::{DateTime, NaiveDate, Utc};
use clap::Subcommand;

use super::{emit, open_state, resolve_id, CmdResult};

#[derive(Subcommand)]
pub enum EventAction {
    /// Add a calendar event
    Add {
        /// Event title
        title: String,
        /// When, as RFC 3339 (e.g. 2026-05-04T09:00:00Z)
        #[arg(long)]
        at: DateTime<Utc>,
    },
    /// Delete a calendar event
    Delete {
        /// Event id or unique prefix
        id: String,
    },
    /// List calendar events
    List {
        /// Only events on this day (YYYY-MM-DD, UTC)
        #[arg(long)]
        date: Option<NaiveDate>,
    },
}

pub fn run(action: EventAction) -> CmdResult {
    let (mut state, _config) = open_state()?;

    match action {
        EventAction::Add { title, at } => {
            let event = state.add_event(&title, at)?;
            emit(&mut state, &event)
        }
        EventAction::Delete { id } => {
            let id = resolve_id(state.calendar_events().iter().map(|e| e.id), &id)?;
            let event = state
                .delete_event(id)
                .ok_or_else(|| format!("event not found: {id}"))?;
            emit(&mut state, &event)
        }
        EventAction::List { date } => {
            let events: Vec<_> = match date {
                Some(day) => state.events_on(day).into_iter().cloned().collect(),
                None => {
                    let mut all = state.calendar_events().to_vec();
                    all.sort_by_key(|e| e.timestamp);
                    all
                }
            };
            emit(&mut state, &events)
        }
    }
}
