//! Greedy marginal-value stage-sweep optimizer.
//!
//! Each iteration scores every contributing stage by
//! `sum(min(remaining, per_run)) / ap` and runs the best one once. Scores are
//! recomputed every step because satisfying a target lowers the value of every
//! stage that rewards it. This is a heuristic, not a proven AP optimum.

use crate::yields::SweepStage;
use plan_core::{MaterialId, RunPlan, SweepConfig, Target};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::{debug, info, warn};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SweepStatus {
    /// Every target reached zero.
    Satisfied,
    /// No enabled stage can reduce what is left.
    Insufficient,
    /// Stopped at the iteration cap with targets left.
    IterationCapReached,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SweepResult {
    pub plan: RunPlan,
    /// Quantity still missing per target material after the plan.
    pub remaining: BTreeMap<MaterialId, u64>,
    pub status: SweepStatus,
    pub iterations: u32,
}

impl SweepResult {
    pub fn is_satisfied(&self) -> bool {
        self.status == SweepStatus::Satisfied
    }
}

fn gain(stage: &SweepStage, remaining: &BTreeMap<MaterialId, u64>) -> u64 {
    remaining
        .iter()
        .map(|(m, &left)| left.min(stage.yield_of(m)))
        .sum()
}

/// Compute a run plan covering `targets` with the given stages.
///
/// Stages are considered in input order; among equal scores the earlier stage
/// wins. Targets for the same material are summed.
pub fn optimize(stages: &[SweepStage], targets: &[Target], cfg: &SweepConfig) -> SweepResult {
    let mut remaining: BTreeMap<MaterialId, u64> = BTreeMap::new();
    for t in targets {
        let left = remaining.entry(t.material.clone()).or_insert(0);
        *left = left.saturating_add(t.quantity);
    }

    let contributing: Vec<&SweepStage> = stages
        .iter()
        .filter(|s| s.ap > 0 && gain(s, &remaining) > 0)
        .collect();
    debug!(
        stages = stages.len(),
        contributing = contributing.len(),
        targets = remaining.len(),
        "sweep search start"
    );

    let mut plan = RunPlan::default();
    let mut iterations = 0u32;
    let status = loop {
        if remaining.values().all(|&left| left == 0) {
            break SweepStatus::Satisfied;
        }
        if iterations >= cfg.max_iterations {
            break SweepStatus::IterationCapReached;
        }

        let mut best: Option<(&SweepStage, Decimal)> = None;
        for &stage in &contributing {
            let score = Decimal::from(gain(stage, &remaining)) / Decimal::from(stage.ap);
            let best_score = best.map_or(Decimal::ZERO, |(_, s)| s);
            if score > best_score {
                best = Some((stage, score));
            }
        }
        let Some((stage, _)) = best else {
            break SweepStatus::Insufficient;
        };

        // Bounded by the u32 iteration cap and u32 AP, so this cannot overflow.
        *plan.runs.entry(stage.id.clone()).or_insert(0) += 1;
        plan.total_ap += u64::from(stage.ap);
        for (material, left) in remaining.iter_mut() {
            *left = left.saturating_sub(stage.yield_of(material));
        }
        iterations += 1;
    };

    match status {
        SweepStatus::Satisfied => info!(
            runs = plan.total_runs(),
            ap = plan.total_ap,
            iterations,
            "sweep plan satisfied"
        ),
        _ => warn!(
            ?status,
            runs = plan.total_runs(),
            ap = plan.total_ap,
            missing = remaining.values().sum::<u64>(),
            "sweep plan incomplete"
        ),
    }

    SweepResult {
        plan,
        remaining,
        status,
        iterations,
    }
}
