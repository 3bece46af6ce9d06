use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{ProcmineError, Result};

/// A single recorded step of one case.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    pub case_id: String,
    pub activity: String,
    pub timestamp: DateTime<Utc>,
    #[serde(default, alias = "employee_id", skip_serializing_if = "Option::is_none")]
    pub actor_id: Option<String>,
    #[serde(default, alias = "employee_name", skip_serializing_if = "Option::is_none")]
    pub actor_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub department_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub department_name: Option<String>,
}

impl Event {
    pub fn new(
        case_id: impl Into<String>,
        activity: impl Into<String>,
        timestamp: DateTime<Utc>,
    ) -> Self {
        Self {
            case_id: case_id.into(),
            activity: activity.into(),
            timestamp,
            actor_id: None,
            actor_name: None,
            department_id: None,
            department_name: None,
        }
    }

    pub fn with_actor(
        mut self,
        id: impl Into<String>,
        name: Option<&str>,
    ) -> Self {
        self.actor_id = Some(id.into());
        self.actor_name = name.map(str::to_string);
        self
    }

    pub fn with_department(
        mut self,
        id: impl Into<String>,
        name: Option<&str>,
    ) -> Self {
        self.department_id = Some(id.into());
        self.department_name = name.map(str::to_string);
        self
    }
}

/// A numeric outcome measured for one case.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutcomeRecord {
    pub case_id: String,
    pub metric_name: String,
    pub metric_value: f64,
    #[serde(default)]
    pub metric_unit: String,
}

impl OutcomeRecord {
    pub fn new(
        case_id: impl Into<String>,
        metric_name: impl Into<String>,
        metric_value: f64,
    ) -> Self {
        Self {
            case_id: case_id.into(),
            metric_name: metric_name.into(),
            metric_value,
            metric_unit: String::new(),
        }
    }
}

/// Event record as it arrives from an external source, before validation.
#[derive(Debug, Deserialize)]
struct RawEvent {
    #[serde(default)]
    case_id: String,
    #[serde(default)]
    activity: String,
    #[serde(default)]
    timestamp: Option<DateTime<Utc>>,
    #[serde(default, alias = "employee_id")]
    actor_id: Option<String>,
    #[serde(default, alias = "employee_name")]
    actor_name: Option<String>,
    #[serde(default)]
    department_id: Option<String>,
    #[serde(default)]
    department_name: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawEventLog {
    #[serde(default)]
    events: Vec<RawEvent>,
    #[serde(default)]
    outcomes: Vec<OutcomeRecord>,
}

/// Events plus the outcome records joined against them by case id.
///
/// Deserialization goes through the same validation as [`EventLog::from_json`].
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(try_from = "RawEventLog")]
pub struct EventLog {
    pub events: Vec<Event>,
    #[serde(default)]
    pub outcomes: Vec<OutcomeRecord>,
}

impl EventLog {
    pub fn new(events: Vec<Event>) -> Self {
        Self {
            events,
            outcomes: Vec::new(),
        }
    }

    pub fn with_outcomes(
        mut self,
        outcomes: Vec<OutcomeRecord>,
    ) -> Self {
        self.outcomes = outcomes;
        self
    }

    /// Parses `{"events": [...], "outcomes": [...]}` and validates every record.
    pub fn from_json(s: &str) -> Result<Self> {
        let raw = serde_json::from_str::<RawEventLog>(s)?;
        Self::try_from(raw)
    }

    /// Rejects records that would be silently miscounted by the analyzers.
    pub fn validate(&self) -> Result<()> {
        for (idx, e) in self.events.iter().enumerate() {
            if e.case_id.is_empty() {
                return Err(ProcmineError::InconsistentData(format!("event #{} has an empty case_id", idx)));
            }
            if e.activity.is_empty() {
                return Err(ProcmineError::InconsistentData(format!("event #{} of case '{}' has an empty activity", idx, e.case_id)));
            }
        }
        for o in self.outcomes.iter() {
            if o.case_id.is_empty() {
                return Err(ProcmineError::InconsistentData(format!("outcome '{}' has an empty case_id", o.metric_name)));
            }
            if !o.metric_value.is_finite() {
                return Err(ProcmineError::InconsistentData(format!(
                    "outcome '{}' of case '{}' is not a finite number",
                    o.metric_name, o.case_id
                )));
            }
        }
        Ok(())
    }

    /// Distinct metric names with their sample counts, sorted by name.
    pub fn metrics(&self) -> Vec<MetricInfo> {
        let mut metrics: Vec<MetricInfo> = Vec::new();
        for o in self.outcomes.iter() {
            match metrics.iter_mut().find(|m| m.metric_name == o.metric_name && m.metric_unit == o.metric_unit) {
                Some(m) => m.sample_count += 1,
                None => metrics.push(MetricInfo {
                    metric_name: o.metric_name.clone(),
                    metric_unit: o.metric_unit.clone(),
                    sample_count: 1,
                }),
            }
        }
        metrics.sort_by(|a, b| a.metric_name.cmp(&b.metric_name).then_with(|| a.metric_unit.cmp(&b.metric_unit)));
        metrics
    }
}

impl TryFrom<RawEventLog> for EventLog {
    type Error = ProcmineError;

    fn try_from(raw: RawEventLog) -> Result<Self> {
        let mut events = Vec::with_capacity(raw.events.len());
        for (idx, e) in raw.events.into_iter().enumerate() {
            let Some(timestamp) = e.timestamp else {
                return Err(ProcmineError::InconsistentData(format!("event #{} of case '{}' has no timestamp", idx, e.case_id)));
            };
            events.push(Event {
                case_id: e.case_id,
                activity: e.activity,
                timestamp,
                actor_id: e.actor_id,
                actor_name: e.actor_name,
                department_id: e.department_id,
                department_name: e.department_name,
            });
        }

        let log = Self {
            events,
            outcomes: raw.outcomes,
        };
        log.validate()?;
        Ok(log)
    }
}

/// Summary of one metric available in an event log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricInfo {
    pub metric_name: String,
    pub metric_unit: String,
    pub sample_count: usize,
}
