//! Study tasks and calendar events.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    pub id: Uuid,
    pub text: String,
    pub completed: bool,
}

impl Task {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            text: text.into(),
            completed: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalendarEvent {
    pub id: Uuid,
    pub title: String,
    #[serde(alias = "date")]
    pub timestamp: DateTime<Utc>,
}

impl CalendarEvent {
    pub fn new(title: impl Into<String>, timestamp: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            title: title.into(),
            timestamp,
        }
    }

    /// Same calendar day, in UTC.
    pub fn falls_on(&self, date: NaiveDate) -> bool {
        self.timestamp.date_naive() == date
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn task_serialization() {
        let task = Task::new("Read chapter 4");
        let json = serde_json::to_value(&task).unwrap();
        assert_eq!(json["text"], "Read chapter 4");
        assert_eq!(json["completed"], false);
        let decoded: Task = serde_json::from_value(json).unwrap();
        assert_eq!(decoded, task);
    }

    #[test]
    fn event_accepts_legacy_date_field() {
        let id = Uuid::new_v4();
        let json = format!(r#"{{"id":"{id}","title":"Exam","date":"2026-05-04T09:00:00Z"}}"#);
        let event: CalendarEvent = serde_json::from_str(&json).unwrap();
        assert_eq!(event.title, "Exam");
        assert_eq!(event.timestamp, Utc.with_ymd_and_hms(2026, 5, 4, 9, 0, 0).unwrap());
    }

    #[test]
    fn falls_on_matches_whole_day() {
        let event = CalendarEvent::new("Lab", Utc.with_ymd_and_hms(2026, 3, 2, 23, 59, 0).unwrap());
        assert!(event.falls_on(NaiveDate::from_ymd_opt(2026, 3, 2).unwrap()));
        assert!(!event.falls_on(NaiveDate::from_ymd_opt(2026, 3, 3).unwrap()));
    }
}
