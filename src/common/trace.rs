//! Trace grouping shared by every analyzer.
//!
//! A trace is the chronological event sequence of one case. Cases are emitted
//! in case id order and events with equal timestamps keep their input order,
//! so every derived aggregation is reproducible for the same input.

use std::collections::BTreeMap;

use crate::{model::Event, utils::time::hours_between};

/// Chronologically ordered events of one case.
#[derive(Debug, Clone)]
pub struct Trace<'a> {
    pub case_id: &'a str,
    pub events: Vec<&'a Event>,
}

impl<'a> Trace<'a> {
    /// Activity names in trace order, duplicates kept.
    pub fn activities(&self) -> Vec<&'a str> {
        self.events.iter().map(|e| e.activity.as_str()).collect()
    }

    /// Adjacent `(earlier, later)` event pairs.
    pub fn pairs(&self) -> impl Iterator<Item = (&'a Event, &'a Event)> + '_ {
        self.events.windows(2).map(|w| (w[0], w[1]))
    }

    /// Hours between the first and last event, `None` for traces shorter than two events.
    pub fn lead_time_hours(&self) -> Option<f64> {
        if self.events.len() < 2 {
            return None;
        }
        let first = self.events.first()?;
        let last = self.events.last()?;
        Some(hours_between(&first.timestamp, &last.timestamp))
    }
}

/// Partitions events by case and sorts each partition by timestamp (stable).
pub fn group_traces(events: &[Event]) -> Vec<Trace<'_>> {
    let mut cases: BTreeMap<&str, Vec<&Event>> = BTreeMap::new();
    for event in events.iter() {
        cases.entry(event.case_id.as_str()).or_default().push(event);
    }

    cases
        .into_iter()
        .map(|(case_id, mut events)| {
            events.sort_by_key(|e| e.timestamp);
            Trace {
                case_id,
                events,
            }
        })
        .collect()
}
