//! Date-window selection of the cases handed to an analysis.
//!
//! `case_start` and `case_end` keep or drop whole cases depending on when the
//! case began or finished. `event_time` keeps individual events whose own
//! timestamp falls in the window. Windows are inclusive and a missing bound
//! is open.

use std::{borrow::Cow, collections::HashMap, str::FromStr};

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::{ProcmineError, Result, common::group_traces, model::Event};

#[derive(Serialize, Deserialize, Debug, Clone, Copy, Default, PartialEq, Eq, strum::AsRefStr, strum::EnumString, strum::Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum FilterMode {
    #[default]
    All,
    CaseStart,
    CaseEnd,
    EventTime,
}

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct CaseFilter {
    #[serde(default)]
    pub mode: FilterMode,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date_from: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date_to: Option<DateTime<Utc>>,
}

/// Parses an RFC 3339 timestamp or a plain `YYYY-MM-DD` date (midnight UTC).
fn parse_bound(s: &str) -> Result<DateTime<Utc>> {
    if let Ok(t) = DateTime::parse_from_rfc3339(s) {
        return Ok(t.with_timezone(&Utc));
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|t| t.and_utc())
        .ok_or_else(|| ProcmineError::InvalidArgument(format!("invalid date '{}'", s)))
}

impl CaseFilter {
    /// Keeps every event.
    pub fn all() -> Self {
        Self::default()
    }

    pub fn new(
        mode: FilterMode,
        date_from: Option<DateTime<Utc>>,
        date_to: Option<DateTime<Utc>>,
    ) -> Self {
        Self {
            mode,
            date_from,
            date_to,
        }
    }

    /// Builds a filter from its textual form, e.g. `("case_start", Some("2025-01-01"), None)`.
    pub fn parse(
        mode: &str,
        date_from: Option<&str>,
        date_to: Option<&str>,
    ) -> Result<Self> {
        let mode = FilterMode::from_str(mode).map_err(|_| ProcmineError::InvalidArgument(format!("invalid filter_mode: {}", mode)))?;
        let filter = Self {
            mode,
            date_from: date_from.map(parse_bound).transpose()?,
            date_to: date_to.map(parse_bound).transpose()?,
        };
        filter.validate()?;
        Ok(filter)
    }

    pub fn validate(&self) -> Result<()> {
        if let (Some(from), Some(to)) = (self.date_from, self.date_to) {
            if from > to {
                return Err(ProcmineError::InvalidArgument(format!("date_from {} is after date_to {}", from, to)));
            }
        }
        Ok(())
    }

    pub fn is_unfiltered(&self) -> bool {
        self.mode == FilterMode::All || (self.date_from.is_none() && self.date_to.is_none())
    }

    fn in_window(
        &self,
        t: &DateTime<Utc>,
    ) -> bool {
        self.date_from.is_none_or(|from| *t >= from) && self.date_to.is_none_or(|to| *t <= to)
    }

    /// Returns the events selected by this filter, borrowing the input when nothing is dropped.
    pub fn apply<'a>(
        &self,
        events: &'a [Event],
    ) -> Result<Cow<'a, [Event]>> {
        trace!("filter::apply({} events, {})", events.len(), self.mode);
        self.validate()?;
        if self.is_unfiltered() {
            return Ok(Cow::Borrowed(events));
        }

        let selected: Vec<Event> = match self.mode {
            FilterMode::All => return Ok(Cow::Borrowed(events)),
            FilterMode::EventTime => events.iter().filter(|e| self.in_window(&e.timestamp)).cloned().collect(),
            FilterMode::CaseStart | FilterMode::CaseEnd => {
                let keep: HashMap<&str, bool> = group_traces(events)
                    .iter()
                    .filter_map(|t| {
                        let boundary = if self.mode == FilterMode::CaseStart { t.events.first() } else { t.events.last() };
                        boundary.map(|e| (t.case_id, self.in_window(&e.timestamp)))
                    })
                    .collect();
                events.iter().filter(|e| keep.get(e.case_id.as_str()).copied().unwrap_or(false)).cloned().collect()
            }
        };

        debug!("filter: kept {} of {} events", selected.len(), events.len());
        Ok(Cow::Owned(selected))
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct DateRange {
    pub min: Option<DateTime<Utc>>,
    pub max: Option<DateTime<Utc>>,
}

/// Scope of an analysis before running it.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Preview {
    pub event_count: usize,
    pub case_count: usize,
    pub date_range: DateRange,
    pub filter_applied: CaseFilter,
}

/// Counts the events and cases a filter selects, along with their time span.
pub fn preview(
    events: &[Event],
    filter: &CaseFilter,
) -> Result<Preview> {
    let selected = filter.apply(events)?;
    let case_count = group_traces(&selected).len();

    Ok(Preview {
        event_count: selected.len(),
        case_count,
        date_range: DateRange {
            min: selected.iter().map(|e| e.timestamp).min(),
            max: selected.iter().map(|e| e.timestamp).max(),
        },
        filter_applied: filter.clone(),
    })
}
