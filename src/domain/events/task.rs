//! Task domain: background task progress reported as `task.*` events.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::Timestamp;

use super::wire::WireEnvelope;

/// Wire type prefix owned by task events.
pub const TASK_EVENT_PREFIX: &str = "task.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TaskEventType {
    Submitted,
    Updated,
    Finished,
    Failed,
    Removed,
    Unknown,
}

impl TaskEventType {
    fn from_suffix(suffix: &str) -> Self {
        match suffix {
            "submitted" => Self::Submitted,
            "updated" => Self::Updated,
            "finished" => Self::Finished,
            "failed" => Self::Failed,
            "removed" => Self::Removed,
            _ => Self::Unknown,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TaskState {
    Waiting,
    Running,
    Finished,
    Failed,
    #[default]
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskProgress {
    #[serde(default)]
    pub info: String,
    #[serde(default)]
    pub current: u64,
    #[serde(default)]
    pub total: u64,
}

impl TaskProgress {
    /// Completion in percent, `None` while the total is unknown.
    pub fn percent(&self) -> Option<u8> {
        if self.total == 0 {
            return None;
        }
        let ratio = u128::from(self.current.min(self.total)) * 100 / u128::from(self.total);
        u8::try_from(ratio).ok()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskInfo {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub state: TaskState,
    #[serde(default)]
    pub application: String,
    #[serde(default)]
    pub user: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_time: Option<Timestamp>,
    #[serde(default)]
    pub progress: TaskProgress,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskEvent {
    pub event_type: TaskEventType,
    pub task: TaskInfo,
}

/// Parses a `task.*` envelope whose `data` is the task info.
pub fn parse(envelope: &WireEnvelope) -> Option<TaskEvent> {
    let suffix = envelope.event_type.strip_prefix(TASK_EVENT_PREFIX)?;
    let task: TaskInfo = serde_json::from_value(envelope.data.clone()).ok()?;

    Some(TaskEvent {
        event_type: TaskEventType::from_suffix(suffix),
        task,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parses_task_progress() {
        let envelope = WireEnvelope::new(
            "task.updated",
            json!({
                "id": "7f1c",
                "name": "publish",
                "description": "Publishing site",
                "state": "RUNNING",
                "application": "com.enonic.app.contentstudio",
                "user": "user:system:su",
                "startTime": "2024-01-15T10:30:00.123Z",
                "progress": {"info": "3 of 4", "current": 3, "total": 4}
            }),
        );

        let event = parse(&envelope).unwrap();
        assert_eq!(event.event_type, TaskEventType::Updated);
        assert_eq!(event.task.state, TaskState::Running);
        assert_eq!(event.task.progress.percent(), Some(75));
        assert!(event.task.start_time.is_some());
    }

    #[test]
    fn minimal_task_uses_defaults() {
        let event = parse(&WireEnvelope::new("task.removed", json!({"id": "x"}))).unwrap();

        assert_eq!(event.event_type, TaskEventType::Removed);
        assert_eq!(event.task.state, TaskState::Unknown);
        assert_eq!(event.task.progress.percent(), None);
    }

    #[test]
    fn unlisted_suffix_is_unknown_type() {
        let event = parse(&WireEnvelope::new("task.paused", json!({"id": "x"}))).unwrap();
        assert_eq!(event.event_type, TaskEventType::Unknown);
    }

    #[test]
    fn task_without_id_is_rejected() {
        assert!(parse(&WireEnvelope::new("task.finished", json!({"name": "n"}))).is_none());
    }

    #[test]
    fn progress_is_capped_at_total() {
        let progress = TaskProgress {
            info: String::new(),
            current: 12,
            total: 10,
        };
        assert_eq!(progress.percent(), Some(100));
    }

    #[test]
    fn percent_handles_the_full_u64_range() {
        let envelope = WireEnvelope::new(
            "task.updated",
            json!({"id": "t1", "progress": {"current": u64::MAX, "total": u64::MAX}}),
        );
        let event = parse(&envelope).unwrap();
        assert_eq!(event.task.progress.percent(), Some(100));

        let half = TaskProgress {
            info: String::new(),
            current: u64::MAX / 2,
            total: u64::MAX,
        };
        assert_eq!(half.percent(), Some(49));
    }
}
