use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::games::Game;
use crate::reward::RewardDelta;

/// What earned a batch of points.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "game", rename_all = "snake_case")]
pub enum PointSource {
    Manual,
    TaskAdded,
    TaskCompleted,
    EventAdded,
    TimerStarted,
    TimerCompleted,
    AssistantReply,
    Game(Game),
}

/// Every state change in a session produces an Event.
/// Front ends drain them after each operation to drive notifications.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Event {
    PointsAwarded {
        amount: u64,
        total: u64,
        source: PointSource,
        at: DateTime<Utc>,
    },
    LevelUp {
        from_level: u32,
        to_level: u32,
        at: DateTime<Utc>,
    },
    ContentUnlocked {
        content_id: String,
        at: DateTime<Utc>,
    },
    TaskAdded {
        task_id: Uuid,
        at: DateTime<Utc>,
    },
    TaskToggled {
        task_id: Uuid,
        completed: bool,
        at: DateTime<Utc>,
    },
    CalendarEventAdded {
        event_id: Uuid,
        at: DateTime<Utc>,
    },
    CalendarEventDeleted {
        event_id: Uuid,
        at: DateTime<Utc>,
    },
    TimerStarted {
        remaining_ms: u64,
        at: DateTime<Utc>,
    },
    TimerPaused {
        remaining_ms: u64,
        at: DateTime<Utc>,
    },
    TimerFinished {
        at: DateTime<Utc>,
    },
    TimerReset {
        at: DateTime<Utc>,
    },
    AssistantReplied {
        at: DateTime<Utc>,
    },
    AssistantFailed {
        error: String,
        at: DateTime<Utc>,
    },
}

impl Event {
    /// Expand a reward delta into the events it implies.
    pub fn from_delta(delta: &RewardDelta, source: PointSource) -> Vec<Event> {
        if delta.is_empty() {
            return Vec::new();
        }
        let at = Utc::now();
        let mut events = vec![Event::PointsAwarded {
            amount: delta.awarded,
            total: delta.points,
            source,
            at,
        }];
        if delta.leveled_up() {
            events.push(Event::LevelUp {
                from_level: delta.from_level,
                to_level: delta.to_level,
                at,
            });
        }
        events.extend(delta.unlocked.iter().map(|id| Event::ContentUnlocked {
            content_id: id.clone(),
            at,
        }));
        events
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn delta_expands_to_award_level_and_unlocks() {
        let delta = RewardDelta {
            awarded: 100,
            points: 100,
            from_level: 1,
            to_level: 2,
            unlocked: vec!["Pong".into()],
        };
        let events = Event::from_delta(&delta, PointSource::Game(Game::TicTacToe));
        assert_eq!(events.len(), 3);
        assert!(matches!(events[0], Event::PointsAwarded { amount: 100, .. }));
        assert!(matches!(events[1], Event::LevelUp { from_level: 1, to_level: 2, .. }));
        assert!(matches!(&events[2], Event::ContentUnlocked { content_id, .. } if content_id == "Pong"));
    }

    #[test]
    fn empty_delta_has_no_events() {
        assert!(Event::from_delta(&RewardDelta::default(), PointSource::Manual).is_empty());
    }

    #[test]
    fn events_serialize_with_type_tag() {
        let json = serde_json::to_value(Event::TimerFinished { at: Utc::now() }).unwrap();
        assert_eq!(json["type"], "TimerFinished");
        let source = serde_json::to_value(PointSource::Game(Game::Pong)).unwrap();
        assert_eq!(source["kind"], "game");
        assert_eq!(source["game"], "pong");
    }
}
