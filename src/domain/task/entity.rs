//! Task domain entities

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use tracing::debug;

use crate::domain::error::PulpError;
use crate::domain::record::{decode, FrozenList, PulpRecord};
use crate::domain::unit::{is_supported_type, Unit, CONTENT_TYPE_FIELD};

/// Tag prefix naming the repository a task operates on
pub const REPOSITORY_TAG_PREFIX: &str = "pulp:repository:";

/// Tag prefix naming the action a task performs
pub const ACTION_TAG_PREFIX: &str = "pulp:action:";

/// State of a remote task
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum TaskState {
    /// Queued but not yet started
    #[default]
    Waiting,

    Running,

    /// Completed successfully
    Finished,

    /// Completed with an error
    Error,

    Canceled,
}

impl TaskState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Finished | Self::Error | Self::Canceled)
    }

    pub fn can_transition_to(&self, target: TaskState) -> bool {
        match (self, target) {
            (Self::Waiting, Self::Running) => true,
            (Self::Waiting, Self::Canceled) => true,

            (Self::Running, Self::Finished) => true,
            (Self::Running, Self::Error) => true,
            (Self::Running, Self::Canceled) => true,

            // Terminal states cannot transition
            _ => false,
        }
    }
}

impl fmt::Display for TaskState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Waiting => write!(f, "waiting"),
            Self::Running => write!(f, "running"),
            Self::Finished => write!(f, "finished"),
            Self::Error => write!(f, "error"),
            Self::Canceled => write!(f, "canceled"),
        }
    }
}

impl FromStr for TaskState {
    type Err = PulpError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "waiting" => Ok(Self::Waiting),
            "running" => Ok(Self::Running),
            "finished" => Ok(Self::Finished),
            "error" => Ok(Self::Error),
            "canceled" => Ok(Self::Canceled),
            other => Err(PulpError::invalid_data(format!(
                "Task: unknown state '{}'",
                other
            ))),
        }
    }
}

/// A task on the remote service
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Task {
    id: String,
    state: TaskState,

    #[serde(skip_serializing_if = "Option::is_none")]
    error_summary: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    error_details: Option<String>,

    tags: FrozenList<String>,

    /// Units added, copied or removed by the task
    units: FrozenList<Unit>,

    #[serde(skip_serializing_if = "Option::is_none")]
    started_at: Option<DateTime<Utc>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    finished_at: Option<DateTime<Utc>>,
}

impl Task {
    /// Create a new waiting task
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            state: TaskState::Waiting,
            error_summary: None,
            error_details: None,
            tags: FrozenList::empty(),
            units: FrozenList::empty(),
            started_at: None,
            finished_at: None,
        }
    }

    /// Create a waiting task with a random id
    pub fn generate() -> Self {
        Self::new(uuid::Uuid::new_v4().to_string())
    }

    pub fn with_tags<I>(mut self, tags: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<String>,
    {
        self.tags = tags.into_iter().map(Into::into).collect();
        self
    }

    /// Tag the task with the repository and action it belongs to
    pub fn for_repository(self, repo_id: &str, action: &str) -> Self {
        self.with_tags([
            format!("{}{}", REPOSITORY_TAG_PREFIX, repo_id),
            format!("{}{}", ACTION_TAG_PREFIX, action),
        ])
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn state(&self) -> TaskState {
        self.state
    }

    /// True once the task reached a terminal state
    pub fn completed(&self) -> bool {
        self.state.is_terminal()
    }

    pub fn succeeded(&self) -> bool {
        self.state == TaskState::Finished
    }

    pub fn error_summary(&self) -> Option<&str> {
        self.error_summary.as_deref()
    }

    pub fn error_details(&self) -> Option<&str> {
        self.error_details.as_deref()
    }

    pub fn tags(&self) -> &FrozenList<String> {
        &self.tags
    }

    pub fn units(&self) -> &FrozenList<Unit> {
        &self.units
    }

    pub fn started_at(&self) -> Option<DateTime<Utc>> {
        self.started_at
    }

    pub fn finished_at(&self) -> Option<DateTime<Utc>> {
        self.finished_at
    }

    /// Repository named by a `pulp:repository:` tag
    pub fn repo_id(&self) -> Option<&str> {
        self.tags
            .iter()
            .find_map(|tag| tag.strip_prefix(REPOSITORY_TAG_PREFIX))
    }

    /// Action named by a `pulp:action:` tag
    pub fn action(&self) -> Option<&str> {
        self.tags
            .iter()
            .find_map(|tag| tag.strip_prefix(ACTION_TAG_PREFIX))
    }

    fn transition(&mut self, target: TaskState) -> Result<(), PulpError> {
        if !self.state.can_transition_to(target) {
            return Err(PulpError::invalid_transition(
                self.state.to_string(),
                target.to_string(),
            ));
        }
        self.state = target;
        Ok(())
    }

    pub fn mark_running(&mut self) -> Result<(), PulpError> {
        self.transition(TaskState::Running)?;
        self.started_at = Some(Utc::now());
        Ok(())
    }

    /// Mark the task finished, recording the units it touched
    pub fn mark_finished(&mut self, units: impl IntoIterator<Item = Unit>) -> Result<(), PulpError> {
        self.transition(TaskState::Finished)?;
        self.units = units.into_iter().collect();
        self.finished_at = Some(Utc::now());
        Ok(())
    }

    pub fn mark_error(
        &mut self,
        summary: impl Into<String>,
        details: Option<String>,
    ) -> Result<(), PulpError> {
        self.transition(TaskState::Error)?;
        self.error_summary = Some(summary.into());
        self.error_details = details;
        self.finished_at = Some(Utc::now());
        Ok(())
    }

    pub fn mark_canceled(&mut self) -> Result<(), PulpError> {
        self.transition(TaskState::Canceled)?;
        self.finished_at = Some(Utc::now());
        Ok(())
    }

    /// Convert a failed task into the matching error
    pub fn into_result(self) -> Result<Self, PulpError> {
        match self.state {
            TaskState::Error => Err(PulpError::task_failed(
                self.id,
                self.error_summary.unwrap_or_else(|| "<unknown error>".to_string()),
            )),
            TaskState::Canceled => Err(PulpError::task_failed(self.id, "task was canceled")),
            _ => Ok(self),
        }
    }
}

#[derive(Debug, Deserialize)]
struct RawTaskError {
    #[serde(default)]
    description: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawTask {
    task_id: String,
    state: String,

    #[serde(default)]
    error: Option<RawTaskError>,

    #[serde(default)]
    traceback: Option<String>,

    #[serde(default)]
    tags: Option<Vec<String>>,

    #[serde(default)]
    result: Option<Value>,
}

/// Decode `result.units_successful` entries of the form `{type_id, unit_key}`
///
/// Entries of content types with no [`Unit`] variant (errata and the like) are skipped.
fn units_from_result(result: Option<&Value>) -> Result<Vec<Unit>, PulpError> {
    let Some(entries) = result
        .and_then(|r| r.get("units_successful"))
        .and_then(Value::as_array)
    else {
        return Ok(Vec::new());
    };

    entries
        .iter()
        .filter(|entry| {
            let type_id = entry.get("type_id").and_then(Value::as_str).unwrap_or_default();
            let supported = is_supported_type(type_id);
            if !supported {
                debug!(type_id, "Skipping unit of unsupported type in task result");
            }
            supported
        })
        .map(|entry| {
            let type_id = entry.get("type_id").cloned().unwrap_or(Value::Null);
            let mut data = entry
                .get("unit_key")
                .and_then(Value::as_object)
                .cloned()
                .unwrap_or_default();
            data.insert(CONTENT_TYPE_FIELD.to_string(), type_id);
            Unit::from_data(&Value::Object(data))
        })
        .collect()
}

impl PulpRecord for Task {
    fn from_data(data: &Value) -> Result<Self, PulpError> {
        let raw: RawTask = decode("Task", data)?;
        let state: TaskState = raw.state.parse()?;
        let units = units_from_result(raw.result.as_ref())?;

        let error_summary = match state {
            TaskState::Error => Some(
                raw.error
                    .and_then(|e| e.description)
                    .unwrap_or_else(|| "<unknown error>".to_string()),
            ),
            _ => None,
        };

        Ok(Self {
            id: raw.task_id,
            state,
            error_summary,
            error_details: raw.traceback,
            tags: raw.tags.unwrap_or_default().into(),
            units: units.into(),
            started_at: None,
            finished_at: None,
        })
    }

    fn to_data(&self) -> Value {
        let units: Vec<Value> = self
            .units
            .iter()
            .map(|unit| {
                let mut key = match unit.to_data() {
                    Value::Object(map) => map,
                    _ => Map::new(),
                };
                key.remove(CONTENT_TYPE_FIELD);
                key.remove("repository_memberships");
                json!({"type_id": unit.content_type_id(), "unit_key": key})
            })
            .collect();

        let mut data = json!({
            "task_id": self.id,
            "state": self.state.to_string(),
            "tags": self.tags,
            "result": {"units_successful": units},
        });

        if let Some(summary) = &self.error_summary {
            data["error"] = json!({"description": summary});
        }
        if let Some(details) = &self.error_details {
            data["traceback"] = json!(details);
        }

        data
    }
}
