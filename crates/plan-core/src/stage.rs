//! Stages, rewards, bonus entries and run plans.

use crate::{MaterialId, StageId, StudentId, ValidationError};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Combat role of a student; each role has its own bonus slot cap.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Striker,
    Special,
}

/// How much a student boosts the yield of one material.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BonusEntry {
    pub student: StudentId,
    pub role: Role,
    pub material: MaterialId,
    /// Fractional boost, e.g. 0.15 for +15%. Must be >= 0.
    pub ratio: Decimal,
}

/// Applied and best-possible bonus ratio for one material.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BonusRatio {
    pub applied: Decimal,
    pub maximum: Decimal,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Difficulty {
    /// Story stages are cleared once and never swept.
    Story,
    Quest,
    Challenge,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RewardCategory {
    #[default]
    Material,
    Currency,
    Equipment,
    Other,
}

/// Special condition attached to a reward.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RewardRequirement {
    FirstClear,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Reward {
    pub material: MaterialId,
    #[serde(default)]
    pub category: RewardCategory,
    pub amount: u64,
    #[serde(default)]
    pub requirement: Option<RewardRequirement>,
    /// Drop chance in [0,1]; display only.
    #[serde(default)]
    pub chance: Option<Decimal>,
}

impl Reward {
    pub fn material(material: impl Into<MaterialId>, amount: u64) -> Self {
        Self {
            material: material.into(),
            category: RewardCategory::Material,
            amount,
            requirement: None,
            chance: None,
        }
    }

    pub fn first_clear(material: impl Into<MaterialId>, amount: u64) -> Self {
        Self {
            requirement: Some(RewardRequirement::FirstClear),
            ..Self::material(material, amount)
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Stage {
    pub id: StageId,
    /// AP consumed per run.
    pub ap: u32,
    pub difficulty: Difficulty,
    #[serde(default)]
    pub rewards: Vec<Reward>,
}

impl Stage {
    pub fn new(id: impl Into<StageId>, ap: u32, difficulty: Difficulty, rewards: Vec<Reward>) -> Self {
        Self {
            id: id.into(),
            ap,
            difficulty,
            rewards,
        }
    }

    /// Whether the stage can be run repeatedly at all.
    pub fn is_sweepable(&self) -> bool {
        self.difficulty != Difficulty::Story
    }

    /// Material rewards granted once, on the first clear. Currency and other
    /// categories are left out, as for repeated rewards.
    pub fn one_time_rewards(&self) -> impl Iterator<Item = &Reward> {
        let story = !self.is_sweepable();
        self.rewards.iter().filter(move |r| {
            (story || r.requirement.is_some()) && r.category == RewardCategory::Material
        })
    }

    /// Rewards granted on every run and counted by the optimizer.
    pub fn repeated_rewards(&self) -> impl Iterator<Item = &Reward> {
        let sweepable = self.is_sweepable();
        self.rewards.iter().filter(move |r| {
            sweepable && r.requirement.is_none() && r.category == RewardCategory::Material
        })
    }

    /// Story stages and stages with a first-clear reward are cleared once
    /// regardless of sweeping.
    pub fn has_one_time_yield(&self) -> bool {
        !self.is_sweepable() || self.rewards.iter().any(|r| r.requirement.is_some())
    }
}

/// Run counts per stage and the AP they consume.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunPlan {
    pub runs: BTreeMap<StageId, u64>,
    pub total_ap: u64,
}

impl RunPlan {
    pub fn runs_for(&self, stage: &StageId) -> u64 {
        self.runs.get(stage).copied().unwrap_or(0)
    }

    /// Add `runs` runs of `stage`. Counts that no longer fit in `u64` are
    /// rejected and leave the plan untouched.
    pub fn add_runs(&mut self, stage: &StageId, ap: u32, runs: u64) -> Result<(), ValidationError> {
        if runs == 0 {
            return Ok(());
        }
        let overflow = || ValidationError::CountOverflow(stage.to_string());
        let total_ap = u64::from(ap)
            .checked_mul(runs)
            .and_then(|n| n.checked_add(self.total_ap))
            .ok_or_else(overflow)?;
        let count = self
            .runs_for(stage)
            .checked_add(runs)
            .ok_or_else(overflow)?;
        self.runs.insert(stage.clone(), count);
        self.total_ap = total_ap;
        Ok(())
    }

    pub fn total_runs(&self) -> u64 {
        self.runs.values().fold(0, |acc, n| acc.saturating_add(*n))
    }
}
