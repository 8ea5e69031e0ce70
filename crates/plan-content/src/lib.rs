#![deny(warnings)]

//! Content catalog and saved user state, and their conversion into engine
//! inputs.
//!
//! A [`Scenario`] bundles what the content and persistence collaborators
//! supply: event and raid schedules with their stages, shops and bonus tables,
//! plus the player's saved selections and timeline records.

use chrono::{Days, NaiveDate};
use plan_core::{
    validate_config, BonusEntry, MaterialId, PlannerConfig, RaidTier, ResourceVector, Stage,
    StageId, StudentId, TimelineEntry, ValidationError,
};
use plan_sweep::{plan_sweep, ShopItem, ShopPurchase, SweepReport, SweepRequest};
use plan_timeline::{horizon, project, system_income_entries, Projection, PullCostPolicy};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use thiserror::Error;
use tracing::info;

#[derive(Debug, Error)]
pub enum ContentError {
    #[error("parse error: {0}")]
    Parse(String),
    #[error("unknown event: {0}")]
    UnknownEvent(String),
    #[error(transparent)]
    Invalid(#[from] ValidationError),
}

impl From<serde_yaml::Error> for ContentError {
    fn from(e: serde_yaml::Error) -> Self {
        ContentError::Parse(e.to_string())
    }
}

/// Gacha banner attached to an event.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PickupRecord {
    pub name: String,
    /// Pulls the player plans to spend on this banner.
    pub pulls: u32,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct EventRecord {
    pub id: String,
    pub name: String,
    pub start: NaiveDate,
    pub end: NaiveDate,
    /// Currency granted for finishing the event, paid on the end date.
    #[serde(default)]
    pub completion_reward: ResourceVector,
    #[serde(default)]
    pub pickup: Option<PickupRecord>,
    #[serde(default)]
    pub stages: Vec<Stage>,
    #[serde(default)]
    pub bonus: Vec<BonusEntry>,
    #[serde(default)]
    pub shop: Vec<ShopItem>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RaidRecord {
    pub id: String,
    pub name: String,
    pub start: NaiveDate,
    pub end: NaiveDate,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ContentCatalog {
    pub events: Vec<EventRecord>,
    pub raids: Vec<RaidRecord>,
}

impl ContentCatalog {
    pub fn event(&self, id: &str) -> Option<&EventRecord> {
        self.events.iter().find(|e| e.id == id)
    }

    /// Start and end dates of every event and raid.
    pub fn dates(&self) -> impl Iterator<Item = &NaiveDate> {
        self.events
            .iter()
            .flat_map(|e| [&e.start, &e.end])
            .chain(self.raids.iter().flat_map(|r| [&r.start, &r.end]))
    }
}

/// A purchased package: an instant grant plus a daily grant for `days` days.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackageRecord {
    pub id: String,
    pub name: String,
    pub purchased: NaiveDate,
    #[serde(default)]
    pub instant: ResourceVector,
    #[serde(default)]
    pub daily: ResourceVector,
    #[serde(default)]
    pub days: u32,
}

/// Saved material-farming selections for one event.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FarmingState {
    pub event: String,
    /// `None` enables every sweepable stage of the event.
    #[serde(default)]
    pub enabled_stages: Option<BTreeSet<StageId>>,
    #[serde(default)]
    pub extra_runs: BTreeMap<StageId, u64>,
    #[serde(default)]
    pub selected_students: BTreeSet<StudentId>,
    #[serde(default)]
    pub purchases: Vec<ShopPurchase>,
    #[serde(default)]
    pub owned: BTreeMap<MaterialId, u64>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct UserState {
    /// Date the starting balance was observed.
    pub reference_date: NaiveDate,
    #[serde(default)]
    pub starting_balance: ResourceVector,
    /// Manually entered timeline records.
    #[serde(default)]
    pub entries: Vec<TimelineEntry>,
    #[serde(default)]
    pub packages: Vec<PackageRecord>,
    /// Events whose pickup pulls were already made.
    #[serde(default)]
    pub completed_pickups: BTreeSet<String>,
    /// Per-event override of planned pulls.
    #[serde(default)]
    pub pickup_pulls: BTreeMap<String, u32>,
    /// Expected finishing tier per raid id.
    #[serde(default)]
    pub raid_tiers: BTreeMap<String, RaidTier>,
    #[serde(default)]
    pub farming: Option<FarmingState>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Scenario {
    #[serde(default)]
    pub config: PlannerConfig,
    #[serde(default)]
    pub content: ContentCatalog,
    pub user: UserState,
}

/// Everything computed for a scenario.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PlannerOutput {
    pub timeline: Projection,
    pub sweep: Option<SweepReport>,
}

impl Scenario {
    pub fn from_yaml_str(text: &str) -> Result<Self, ContentError> {
        let scenario: Scenario = serde_yaml::from_str(text)?;
        validate_config(&scenario.config)?;
        Ok(scenario)
    }

    /// Later of the reference date and the furthest dated content or user
    /// record.
    pub fn horizon(&self) -> NaiveDate {
        let user_dates = self
            .user
            .entries
            .iter()
            .map(|e| &e.date)
            .chain(self.user.packages.iter().map(|p| &p.purchased));
        horizon(self.user.reference_date, self.content.dates().chain(user_dates))
    }

    /// All timeline entries: system income, content-derived, then user records.
    pub fn timeline_entries(&self) -> Vec<TimelineEntry> {
        let user = &self.user;
        let mut out = system_income_entries(&self.config.income, user.reference_date);

        for event in &self.content.events {
            if let Some(pickup) = &event.pickup {
                let pulls = user.pickup_pulls.get(&event.id).copied().unwrap_or(pickup.pulls);
                out.push(TimelineEntry::pull_trial(
                    format!("event:{}:pickup", event.id).as_str(),
                    event.start,
                    format!("Pickup: {}", pickup.name),
                    pulls,
                    user.completed_pickups.contains(&event.id),
                ));
            }
            if !event.completion_reward.is_zero() {
                out.push(TimelineEntry::fixed(
                    format!("event:{}:reward", event.id).as_str(),
                    event.end,
                    format!("Event: {}", event.name),
                    event.completion_reward,
                ));
            }
        }

        for raid in &self.content.raids {
            if let Some(&tier) = user.raid_tiers.get(&raid.id) {
                out.push(TimelineEntry::fixed(
                    format!("raid:{}:reward", raid.id).as_str(),
                    raid.end,
                    format!("Raid: {} ({tier:?})", raid.name),
                    self.config.income.raid_reward(tier),
                ));
            }
        }

        for pkg in &user.packages {
            if !pkg.instant.is_zero() {
                out.push(TimelineEntry::fixed(
                    format!("package:{}", pkg.id).as_str(),
                    pkg.purchased,
                    pkg.name.clone(),
                    pkg.instant,
                ));
            }
            if pkg.days > 0 && !pkg.daily.is_zero() {
                if let Some(first) = pkg.purchased.checked_add_days(Days::new(1)) {
                    out.push(TimelineEntry::recurring(
                        format!("package:{}:daily", pkg.id).as_str(),
                        first,
                        format!("{} (daily)", pkg.name),
                        pkg.daily,
                        1,
                        Some(pkg.days),
                    ));
                }
            }
        }

        out.extend(user.entries.iter().cloned());
        out
    }

    pub fn project_timeline(&self) -> Result<Projection, ContentError> {
        let policy = PullCostPolicy::from(self.config.pull_cost);
        let projection = project(
            self.user.reference_date,
            self.horizon(),
            self.user.starting_balance,
            &self.timeline_entries(),
            &policy,
        )?;
        Ok(projection)
    }

    /// Sweep request for the saved farming selection, if any.
    pub fn sweep_request(&self) -> Result<Option<SweepRequest>, ContentError> {
        let Some(farming) = &self.user.farming else {
            return Ok(None);
        };
        let event = self
            .content
            .event(&farming.event)
            .ok_or_else(|| ContentError::UnknownEvent(farming.event.clone()))?;
        let enabled_stages = match &farming.enabled_stages {
            Some(ids) => ids.clone(),
            None => event
                .stages
                .iter()
                .filter(|s| s.is_sweepable())
                .map(|s| s.id.clone())
                .collect(),
        };
        Ok(Some(SweepRequest {
            stages: event.stages.clone(),
            enabled_stages,
            extra_runs: farming.extra_runs.clone(),
            bonus_catalog: event.bonus.clone(),
            selected_students: farming.selected_students.clone(),
            shop_items: event.shop.clone(),
            purchases: farming.purchases.clone(),
            owned: farming.owned.clone(),
        }))
    }

    pub fn plan_sweep(&self) -> Result<Option<SweepReport>, ContentError> {
        match self.sweep_request()? {
            Some(req) => Ok(Some(plan_sweep(&req, &self.config)?)),
            None => Ok(None),
        }
    }

    /// Run both the timeline projection and the sweep planner.
    pub fn run(&self) -> Result<PlannerOutput, ContentError> {
        let timeline = self.project_timeline()?;
        let sweep = self.plan_sweep()?;
        info!(
            rows = timeline.rows.len(),
            sweep = sweep.is_some(),
            "scenario computed"
        );
        Ok(PlannerOutput { timeline, sweep })
    }
}
