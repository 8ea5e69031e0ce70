#![deny(warnings)]

//! Chronological projection of pyroxene and ticket balances.
//!
//! All entries are expanded into dated occurrences, merged into one ordered
//! ledger, and walked once while keeping a running balance. Pull demands are
//! priced against the balance at their own date, not the starting one.
//!
//! The starting balance is the one observed on `start`, so occurrences dated
//! earlier are already reflected in it and are skipped. Recurring entries that
//! began earlier still contribute their occurrences from `start` on.

use chrono::NaiveDate;
use plan_core::{
    validate_entry, validate_starting_balance, EntryId, ResourceVector, TimelineEntry,
    ValidationError,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

pub mod expand;
pub mod pull;

pub use expand::{expand, horizon, system_income_entries, Effect, Occurrence};
pub use pull::PullCostPolicy;

/// One visible line of the projected ledger.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimelineRow {
    pub date: NaiveDate,
    pub entry: EntryId,
    pub source: String,
    pub delta: ResourceVector,
    /// Running balance after this row.
    pub balance: ResourceVector,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Projection {
    pub start: NaiveDate,
    pub horizon: NaiveDate,
    pub starting_balance: ResourceVector,
    pub rows: Vec<TimelineRow>,
}

impl Projection {
    pub fn final_balance(&self) -> ResourceVector {
        self.rows
            .last()
            .map_or(self.starting_balance, |r| r.balance)
    }

    /// Balance at the end of `date`.
    pub fn balance_on(&self, date: NaiveDate) -> ResourceVector {
        self.rows
            .iter()
            .take_while(|r| r.date <= date)
            .last()
            .map_or(self.starting_balance, |r| r.balance)
    }

    /// First date the pyroxene balance drops below zero.
    pub fn first_deficit(&self) -> Option<NaiveDate> {
        self.rows
            .iter()
            .find(|r| r.balance.pyroxene < 0)
            .map(|r| r.date)
    }
}

/// Project balances from `start` through `horizon`.
///
/// Occurrences dated before `start` are skipped.
pub fn project(
    start: NaiveDate,
    horizon: NaiveDate,
    starting_balance: ResourceVector,
    entries: &[TimelineEntry],
    policy: &PullCostPolicy,
) -> Result<Projection, ValidationError> {
    validate_starting_balance(&starting_balance)?;
    for entry in entries {
        validate_entry(entry)?;
    }

    let occurrences = expand(entries, horizon);
    let mut balance = starting_balance;
    let mut rows = Vec::with_capacity(occurrences.len());
    let mut past = 0usize;
    for occ in occurrences {
        if occ.date < start {
            past += 1;
            continue;
        }
        let delta = match occ.effect {
            Effect::Delta(delta) if delta.is_zero() => continue,
            Effect::Delta(delta) => delta,
            // Already paid for in the game; kept visible with no cost.
            Effect::Pulls { completed: true, .. } => ResourceVector::ZERO,
            Effect::Pulls { pulls: 0, .. } => continue,
            Effect::Pulls { pulls, .. } => {
                let cost = policy.charge(pulls, &balance);
                debug!(entry = %occ.entry.id, pulls, ?cost, "pull demand priced");
                cost
            }
        };
        balance += delta;
        rows.push(TimelineRow {
            date: occ.date,
            entry: occ.entry.id.clone(),
            source: occ.entry.source.clone(),
            delta,
            balance,
        });
    }

    if past > 0 {
        debug!(past, %start, "skipped occurrences before start");
    }
    info!(
        rows = rows.len(),
        %start,
        %horizon,
        pyroxene = balance.pyroxene,
        "timeline projected"
    );
    Ok(Projection {
        start,
        horizon,
        starting_balance,
        rows,
    })
}
