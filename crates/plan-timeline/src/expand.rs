//! Expansion of recurring entries and system income into dated occurrences.

use chrono::{Days, NaiveDate};
use plan_core::{EntryKind, IncomeConfig, ResourceVector, TimelineEntry};

/// What a single occurrence asks of the balance.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Effect {
    Delta(ResourceVector),
    Pulls { pulls: u32, completed: bool },
}

/// One concrete dated occurrence of an entry.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Occurrence<'a> {
    pub date: NaiveDate,
    pub entry: &'a TimelineEntry,
    pub effect: Effect,
}

fn add_days(date: NaiveDate, days: u64) -> Option<NaiveDate> {
    date.checked_add_days(Days::new(days))
}

/// Expand `entries` into occurrences on or before `horizon`, sorted by date.
/// Equal dates keep input order.
pub fn expand(entries: &[TimelineEntry], horizon: NaiveDate) -> Vec<Occurrence<'_>> {
    let mut out = Vec::new();
    for entry in entries {
        match entry.kind {
            EntryKind::Fixed { delta } => {
                if entry.date <= horizon {
                    out.push(Occurrence {
                        date: entry.date,
                        entry,
                        effect: Effect::Delta(delta),
                    });
                }
            }
            EntryKind::PullTrial { pulls, completed } => {
                if entry.date <= horizon {
                    out.push(Occurrence {
                        date: entry.date,
                        entry,
                        effect: Effect::Pulls { pulls, completed },
                    });
                }
            }
            EntryKind::Recurring {
                delta,
                interval_days,
                repeat,
            } => {
                let interval = u64::from(interval_days.max(1));
                let mut k: u64 = 0;
                while repeat.map_or(true, |r| k < u64::from(r)) {
                    let Some(date) = add_days(entry.date, k * interval) else {
                        break;
                    };
                    if date > horizon {
                        break;
                    }
                    out.push(Occurrence {
                        date,
                        entry,
                        effect: Effect::Delta(delta),
                    });
                    k += 1;
                }
            }
        }
    }
    out.sort_by_key(|o| o.date);
    out
}

/// Later of `reference` and the furthest entry start date.
pub fn horizon<'a>(
    reference: NaiveDate,
    dates: impl IntoIterator<Item = &'a NaiveDate>,
) -> NaiveDate {
    dates.into_iter().copied().fold(reference, NaiveDate::max)
}

/// Recurring system income starting on `start`.
///
/// Attendance is two separate cadences: one landing on day 5 and one on
/// day 10 after its start, each repeating every 10 days.
pub fn system_income_entries(income: &IncomeConfig, start: NaiveDate) -> Vec<TimelineEntry> {
    let mut out = Vec::new();
    if !income.daily_mission.is_zero() {
        out.push(TimelineEntry::recurring(
            "system:daily_mission",
            start,
            "Daily mission",
            income.daily_mission,
            1,
            None,
        ));
    }
    if !income.weekly_mission.is_zero() {
        out.push(TimelineEntry::recurring(
            "system:weekly_mission",
            start,
            "Weekly mission",
            income.weekly_mission,
            7,
            None,
        ));
    }
    if let Some(daily) = income.tactical_challenge_daily() {
        out.push(TimelineEntry::recurring(
            "system:tactical_challenge",
            start,
            "Tactical challenge",
            daily,
            1,
            None,
        ));
    }
    if let Some(att) = income.attendance {
        for (id, offset, reward) in [
            ("system:attendance_day5", 5, att.day5),
            ("system:attendance_day10", 10, att.day10),
        ] {
            if reward.is_zero() {
                continue;
            }
            if let Some(first) = add_days(att.start, offset) {
                out.push(TimelineEntry::recurring(id, first, "Attendance", reward, 10, None));
            }
        }
    }
    out
}
