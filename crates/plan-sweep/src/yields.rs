//! One-time and per-run yields derived from the stage catalog.

use plan_bonus::boosted_amount;
use plan_core::{BonusRatio, MaterialId, RunPlan, Stage, StageId, ValidationError};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Yield of clearing every stage with a one-time reward once.
///
/// First clears are always collected, whether or not a stage is enabled for
/// sweeping, so this ledger ignores the enabled set.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FirstClearLedger {
    pub yields: BTreeMap<MaterialId, u64>,
    pub stages: Vec<StageId>,
    /// AP spent on the first clears, kept apart from sweep AP.
    pub ap: u64,
}

impl FirstClearLedger {
    pub fn from_stages(stages: &[Stage]) -> Self {
        let mut ledger = Self::default();
        for stage in stages.iter().filter(|s| s.has_one_time_yield()) {
            for reward in stage.one_time_rewards() {
                let total = ledger.yields.entry(reward.material.clone()).or_insert(0);
                *total = total.saturating_add(reward.amount);
            }
            ledger.stages.push(stage.id.clone());
            ledger.ap = ledger.ap.saturating_add(u64::from(stage.ap));
        }
        ledger
    }

    pub fn yield_of(&self, material: &MaterialId) -> u64 {
        self.yields.get(material).copied().unwrap_or(0)
    }
}

/// A sweepable stage reduced to what one run produces.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SweepStage {
    pub id: StageId,
    pub ap: u32,
    /// Items per run including the rounded-up bonus.
    pub yields: BTreeMap<MaterialId, u64>,
}

impl SweepStage {
    /// Per-run yield of `stage` with the applied bonus ratios.
    pub fn new(stage: &Stage, ratios: &BTreeMap<MaterialId, BonusRatio>) -> Self {
        let mut yields: BTreeMap<MaterialId, u64> = BTreeMap::new();
        for reward in stage.repeated_rewards() {
            let ratio = ratios
                .get(&reward.material)
                .map(|r| r.applied)
                .unwrap_or_default();
            let total = yields.entry(reward.material.clone()).or_insert(0);
            *total = total.saturating_add(boosted_amount(reward.amount, ratio));
        }
        Self {
            id: stage.id.clone(),
            ap: stage.ap,
            yields,
        }
    }

    pub fn yield_of(&self, material: &MaterialId) -> u64 {
        self.yields.get(material).copied().unwrap_or(0)
    }
}

/// Per-run yields for every sweepable stage, in catalog order.
pub fn sweep_stages(stages: &[Stage], ratios: &BTreeMap<MaterialId, BonusRatio>) -> Vec<SweepStage> {
    stages
        .iter()
        .filter(|s| s.is_sweepable())
        .map(|s| SweepStage::new(s, ratios))
        .collect()
}

/// Items produced by the runs in `plan`.
pub fn repeated_yield(
    stages: &[SweepStage],
    plan: &RunPlan,
) -> Result<BTreeMap<MaterialId, u64>, ValidationError> {
    let mut out: BTreeMap<MaterialId, u64> = BTreeMap::new();
    for stage in stages {
        let runs = plan.runs_for(&stage.id);
        if runs == 0 {
            continue;
        }
        for (material, per_run) in &stage.yields {
            let total = out.entry(material.clone()).or_insert(0);
            *total = per_run
                .checked_mul(runs)
                .and_then(|n| n.checked_add(*total))
                .ok_or_else(|| ValidationError::CountOverflow(stage.id.to_string()))?;
        }
    }
    Ok(out)
}
