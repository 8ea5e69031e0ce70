//! Dated resource-changing entries consumed by the timeline projector.

use crate::{EntryId, ResourceVector};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// What an entry does to the balance.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum EntryKind {
    /// A one-off delta.
    Fixed { delta: ResourceVector },
    /// A delta repeated every `interval_days`, `repeat` times or until the horizon.
    Recurring {
        delta: ResourceVector,
        interval_days: u32,
        #[serde(default)]
        repeat: Option<u32>,
    },
    /// A number of pulls paid for with whatever the balance holds at that date.
    PullTrial {
        pulls: u32,
        /// The pulls were already made and paid for.
        #[serde(default)]
        completed: bool,
    },
}

/// A dated event on the timeline. Immutable once placed.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimelineEntry {
    pub id: EntryId,
    pub date: NaiveDate,
    /// Human-readable label, e.g. "Daily mission".
    pub source: String,
    #[serde(flatten)]
    pub kind: EntryKind,
}

impl TimelineEntry {
    pub fn fixed(
        id: impl Into<EntryId>,
        date: NaiveDate,
        source: impl Into<String>,
        delta: ResourceVector,
    ) -> Self {
        Self {
            id: id.into(),
            date,
            source: source.into(),
            kind: EntryKind::Fixed { delta },
        }
    }

    pub fn recurring(
        id: impl Into<EntryId>,
        date: NaiveDate,
        source: impl Into<String>,
        delta: ResourceVector,
        interval_days: u32,
        repeat: Option<u32>,
    ) -> Self {
        Self {
            id: id.into(),
            date,
            source: source.into(),
            kind: EntryKind::Recurring {
                delta,
                interval_days,
                repeat,
            },
        }
    }

    pub fn pull_trial(
        id: impl Into<EntryId>,
        date: NaiveDate,
        source: impl Into<String>,
        pulls: u32,
        completed: bool,
    ) -> Self {
        Self {
            id: id.into(),
            date,
            source: source.into(),
            kind: EntryKind::PullTrial { pulls, completed },
        }
    }
}
