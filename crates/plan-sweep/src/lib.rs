#![deny(warnings)]

//! Material farming planner.
//!
//! This crate provides:
//! - Shop requirements and the material targets they imply
//! - First-clear and per-run yields (with rounded-up bonuses)
//! - A greedy stage-sweep optimizer minimizing AP
//! - A per-material breakdown of where every item comes from and goes

use plan_bonus::bonus_ratios;
use plan_core::{
    validate_bonus_entries, validate_stage_refs, validate_stages, BonusEntry, BonusRatio,
    MaterialId, PlannerConfig, RunPlan, Stage, StageId, StudentId, Target, ValidationError,
};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use tracing::info;

pub mod breakdown;
pub mod optimizer;
pub mod shop;
pub mod yields;

pub use breakdown::{breakdown, ItemBreakdown};
pub use optimizer::{optimize, SweepResult, SweepStatus};
pub use shop::{shop_requirements, targets, ShopCost, ShopItem, ShopPurchase};
pub use yields::{repeated_yield, sweep_stages, FirstClearLedger, SweepStage};

/// Everything the planner needs for one sweep computation.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SweepRequest {
    pub stages: Vec<Stage>,
    /// Stages the optimizer may schedule.
    pub enabled_stages: BTreeSet<StageId>,
    /// Manual runs added on top of the computed plan.
    pub extra_runs: BTreeMap<StageId, u64>,
    pub bonus_catalog: Vec<BonusEntry>,
    pub selected_students: BTreeSet<StudentId>,
    pub shop_items: Vec<ShopItem>,
    pub purchases: Vec<ShopPurchase>,
    pub owned: BTreeMap<MaterialId, u64>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SweepReport {
    pub bonus: BTreeMap<MaterialId, BonusRatio>,
    pub requirements: BTreeMap<MaterialId, u64>,
    /// Targets after subtracting owned quantities and first-clear yield.
    pub targets: Vec<Target>,
    pub first_clear: FirstClearLedger,
    /// Runs chosen by the optimizer.
    pub plan: RunPlan,
    pub extra: RunPlan,
    pub status: SweepStatus,
    /// Target quantity the optimizer could not cover.
    pub unmet: BTreeMap<MaterialId, u64>,
    /// AP of optimizer plus extra runs.
    pub sweep_ap: u64,
    pub total_ap: u64,
    pub items: BTreeMap<MaterialId, ItemBreakdown>,
}

impl SweepReport {
    /// Optimizer and extra runs merged per stage.
    pub fn combined_runs(&self) -> BTreeMap<StageId, u64> {
        let mut out = self.plan.runs.clone();
        for (id, n) in &self.extra.runs {
            let total = out.entry(id.clone()).or_insert(0);
            *total = total.saturating_add(*n);
        }
        out
    }
}

/// Run the full sweep pipeline: bonus ratios, first clears, targets,
/// optimizer, extra runs and breakdown.
pub fn plan_sweep(req: &SweepRequest, cfg: &PlannerConfig) -> Result<SweepReport, ValidationError> {
    validate_stages(&req.stages)?;
    validate_stage_refs(&req.stages, req.enabled_stages.iter().chain(req.extra_runs.keys()))?;
    validate_bonus_entries(&req.bonus_catalog)?;

    let bonus = bonus_ratios(&req.bonus_catalog, &req.selected_students, &cfg.role_caps);
    let requirements = shop_requirements(&req.shop_items, &req.purchases)?;
    let first_clear = FirstClearLedger::from_stages(&req.stages);

    let targets: Vec<Target> = targets(&requirements, &req.owned)
        .into_iter()
        .map(|t| {
            let quantity = t.quantity.saturating_sub(first_clear.yield_of(&t.material));
            Target { quantity, ..t }
        })
        .collect();

    let all_sweep = sweep_stages(&req.stages, &bonus);
    let enabled: Vec<SweepStage> = all_sweep
        .iter()
        .filter(|s| req.enabled_stages.contains(&s.id))
        .cloned()
        .collect();
    let result = optimize(&enabled, &targets, &cfg.sweep);

    let mut extra = RunPlan::default();
    for stage in &req.stages {
        if let Some(&n) = req.extra_runs.get(&stage.id) {
            extra.add_runs(&stage.id, stage.ap, n)?;
        }
    }

    let mut produced = repeated_yield(&all_sweep, &result.plan)?;
    for (m, n) in repeated_yield(&all_sweep, &extra)? {
        let overflow = ValidationError::CountOverflow(m.to_string());
        let total = produced.entry(m).or_insert(0);
        *total = total.checked_add(n).ok_or(overflow)?;
    }
    let items = breakdown(&first_clear.yields, &produced, &requirements, &req.owned);

    let ap_overflow = || ValidationError::CountOverflow("total AP".to_string());
    let sweep_ap = result
        .plan
        .total_ap
        .checked_add(extra.total_ap)
        .ok_or_else(ap_overflow)?;
    let total_ap = sweep_ap.checked_add(first_clear.ap).ok_or_else(ap_overflow)?;
    info!(
        sweep_ap,
        first_clear_ap = first_clear.ap,
        status = ?result.status,
        "sweep report ready"
    );

    Ok(SweepReport {
        bonus,
        requirements,
        targets,
        first_clear,
        plan: result.plan,
        extra,
        status: result.status,
        unmet: result.remaining,
        sweep_ap,
        total_ap,
        items,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use plan_core::{Difficulty, Reward, Role};
    use rust_decimal::Decimal;

    fn purchase(item: &str, quantity: u32) -> ShopPurchase {
        ShopPurchase {
            item: item.to_string(),
            quantity,
        }
    }

    fn shop_item(id: &str, material: &str, amount: u64) -> ShopItem {
        ShopItem {
            id: id.to_string(),
            costs: vec![ShopCost {
                material: MaterialId::new(material),
                amount,
            }],
            purchase_limit: None,
        }
    }

    fn two_stage_request() -> SweepRequest {
        SweepRequest {
            stages: vec![
                Stage::new("A", 10, Difficulty::Quest, vec![Reward::material("X", 5)]),
                Stage::new("B", 20, Difficulty::Quest, vec![Reward::material("X", 8)]),
            ],
            enabled_stages: ["A", "B"].into_iter().map(StageId::new).collect(),
            shop_items: vec![shop_item("box", "X", 40)],
            purchases: vec![purchase("box", 1)],
            ..SweepRequest::default()
        }
    }

    #[test]
    fn two_stage_scenario() {
        let report = plan_sweep(&two_stage_request(), &PlannerConfig::default()).unwrap();
        assert_eq!(report.status, SweepStatus::Satisfied);
        assert_eq!(report.plan.runs_for(&StageId::new("A")), 8);
        assert_eq!(report.plan.runs.len(), 1);
        assert_eq!(report.plan.total_ap, 80);
        let x = report.items[&MaterialId::new("X")];
        assert_eq!(x.from_repeated_runs, 40);
        assert_eq!(x.to_buy_shop_items, -40);
        assert_eq!(x.remaining, 0);
    }

    #[test]
    fn story_first_clear_covers_target() {
        let req = SweepRequest {
            stages: vec![
                Stage::new("story", 0, Difficulty::Story, vec![Reward::first_clear("Y", 100)]),
                Stage::new("quest", 10, Difficulty::Quest, vec![Reward::material("Y", 5)]),
            ],
            enabled_stages: [StageId::new("quest")].into_iter().collect(),
            shop_items: vec![shop_item("box", "Y", 100)],
            purchases: vec![purchase("box", 1)],
            ..SweepRequest::default()
        };
        let report = plan_sweep(&req, &PlannerConfig::default()).unwrap();
        assert_eq!(report.plan.total_runs(), 0);
        assert_eq!(report.targets, vec![Target::new("Y", 0)]);
        let y = report.items[&MaterialId::new("Y")];
        assert_eq!(y.from_first_run, 100);
        assert_eq!(y.remaining, 0);
    }

    #[test]
    fn extra_runs_add_ap_and_yield_but_not_search() {
        let mut req = two_stage_request();
        req.extra_runs.insert(StageId::new("B"), 2);
        let report = plan_sweep(&req, &PlannerConfig::default()).unwrap();
        assert_eq!(report.plan.runs_for(&StageId::new("A")), 8);
        assert_eq!(report.extra.runs_for(&StageId::new("B")), 2);
        assert_eq!(report.sweep_ap, 80 + 40);
        let x = report.items[&MaterialId::new("X")];
        assert_eq!(x.from_repeated_runs, 40 + 16);
        assert_eq!(x.remaining, 16);
        assert_eq!(report.combined_runs().len(), 2);
    }

    #[test]
    fn selected_bonus_changes_plan() {
        let mut req = two_stage_request();
        req.bonus_catalog = vec![BonusEntry {
            student: StudentId::new("shiroko"),
            role: Role::Striker,
            material: MaterialId::new("X"),
            ratio: Decimal::new(50, 2),
        }];
        req.selected_students.insert(StudentId::new("shiroko"));
        let report = plan_sweep(&req, &PlannerConfig::default()).unwrap();
        // A yields 5 + ceil(2.5) = 8 per run.
        assert_eq!(report.plan.runs_for(&StageId::new("A")), 5);
        assert_eq!(report.bonus[&MaterialId::new("X")].applied, Decimal::new(50, 2));
    }

    #[test]
    fn disabled_stages_are_not_scheduled() {
        let mut req = two_stage_request();
        req.enabled_stages.remove(&StageId::new("A"));
        let report = plan_sweep(&req, &PlannerConfig::default()).unwrap();
        assert_eq!(report.plan.runs_for(&StageId::new("A")), 0);
        assert_eq!(report.plan.runs_for(&StageId::new("B")), 5);
    }

    #[test]
    fn owned_quantity_reduces_target() {
        let mut req = two_stage_request();
        req.owned.insert(MaterialId::new("X"), 25);
        let report = plan_sweep(&req, &PlannerConfig::default()).unwrap();
        assert_eq!(report.targets, vec![Target::new("X", 15)]);
        assert_eq!(report.plan.runs_for(&StageId::new("A")), 3);
        assert_eq!(report.items[&MaterialId::new("X")].remaining, 0);
    }

    #[test]
    fn unsatisfiable_request_reports_deficit() {
        let mut req = two_stage_request();
        req.enabled_stages.clear();
        let report = plan_sweep(&req, &PlannerConfig::default()).unwrap();
        assert_eq!(report.status, SweepStatus::Insufficient);
        assert_eq!(report.unmet[&MaterialId::new("X")], 40);
        assert_eq!(report.items[&MaterialId::new("X")].deficit, 40);
    }

    #[test]
    fn huge_extra_runs_are_rejected() {
        let mut req = two_stage_request();
        req.extra_runs.insert(StageId::new("A"), u64::MAX / 4);
        let err = plan_sweep(&req, &PlannerConfig::default()).unwrap_err();
        assert_eq!(err, ValidationError::CountOverflow("A".to_string()));
    }

    #[test]
    fn huge_owned_quantity_saturates() {
        let mut req = two_stage_request();
        req.owned.insert(MaterialId::new("X"), u64::MAX);
        let report = plan_sweep(&req, &PlannerConfig::default()).unwrap();
        assert_eq!(report.plan.total_runs(), 0);
        assert_eq!(report.items[&MaterialId::new("X")].remaining, u64::MAX - 40);
    }

    #[test]
    fn unknown_extra_stage_is_invalid() {
        let mut req = two_stage_request();
        req.extra_runs.insert(StageId::new("ghost"), 1);
        let err = plan_sweep(&req, &PlannerConfig::default()).unwrap_err();
        assert_eq!(err, ValidationError::UnknownStage(StageId::new("ghost")));
    }
}
