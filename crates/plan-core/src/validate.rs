//! Validation of structurally invalid input.

use crate::{
    BonusEntry, EntryKind, MaterialId, PlannerConfig, ResourceVector, Stage, StageId, StudentId,
    TimelineEntry,
};
use rust_decimal::Decimal;
use std::collections::BTreeSet;
use thiserror::Error;

/// Validation errors for domain invariants.
#[derive(Debug, Error, PartialEq)]
pub enum ValidationError {
    /// A sweepable stage must cost AP.
    #[error("stage {0} is sweepable but costs 0 AP")]
    ZeroApCost(StageId),
    #[error("duplicate stage id: {0}")]
    DuplicateStage(StageId),
    #[error("unknown stage id: {0}")]
    UnknownStage(StageId),
    #[error("unknown shop item: {0}")]
    UnknownShopItem(String),
    /// Bonus ratios must be non-negative.
    #[error("negative bonus ratio for student {student} on {material}")]
    NegativeRatio {
        student: StudentId,
        material: MaterialId,
    },
    /// Reward chance must lie within [0, 1].
    #[error("reward chance out of range on stage {0}")]
    InvalidChance(StageId),
    #[error("recurring entry {0} has a zero-day interval")]
    ZeroInterval(String),
    /// Ticket balances start non-negative.
    #[error("starting ticket balance must not be negative")]
    NegativeTickets,
    /// Fixed and recurring entries may only add tickets; spending them is a
    /// pull trial.
    #[error("entry {0} removes tickets outside a pull trial")]
    NegativeTicketDelta(String),
    /// A run count, yield or cost no longer fits in `u64`.
    #[error("count overflow on {0}")]
    CountOverflow(String),
    #[error("invalid config: {0}")]
    InvalidConfig(&'static str),
}

/// Validate a single stage.
pub fn validate_stage(stage: &Stage) -> Result<(), ValidationError> {
    if stage.is_sweepable() && stage.ap == 0 {
        return Err(ValidationError::ZeroApCost(stage.id.clone()));
    }
    for reward in &stage.rewards {
        if let Some(chance) = reward.chance {
            if chance < Decimal::ZERO || chance > Decimal::ONE {
                return Err(ValidationError::InvalidChance(stage.id.clone()));
            }
        }
    }
    Ok(())
}

/// Validate a stage catalog, including id uniqueness.
pub fn validate_stages(stages: &[Stage]) -> Result<(), ValidationError> {
    let mut ids: BTreeSet<&StageId> = BTreeSet::new();
    for stage in stages {
        validate_stage(stage)?;
        if !ids.insert(&stage.id) {
            return Err(ValidationError::DuplicateStage(stage.id.clone()));
        }
    }
    Ok(())
}

/// Check that every referenced stage id exists in the catalog.
pub fn validate_stage_refs<'a>(
    stages: &[Stage],
    refs: impl IntoIterator<Item = &'a StageId>,
) -> Result<(), ValidationError> {
    for id in refs {
        if !stages.iter().any(|s| &s.id == id) {
            return Err(ValidationError::UnknownStage(id.clone()));
        }
    }
    Ok(())
}

pub fn validate_bonus_entries(entries: &[BonusEntry]) -> Result<(), ValidationError> {
    match entries.iter().find(|e| e.ratio < Decimal::ZERO) {
        Some(e) => Err(ValidationError::NegativeRatio {
            student: e.student.clone(),
            material: e.material.clone(),
        }),
        None => Ok(()),
    }
}

pub fn validate_entry(entry: &TimelineEntry) -> Result<(), ValidationError> {
    let delta = match entry.kind {
        EntryKind::Recurring { interval_days: 0, .. } => {
            return Err(ValidationError::ZeroInterval(entry.id.0.clone()));
        }
        EntryKind::Fixed { delta } | EntryKind::Recurring { delta, .. } => delta,
        EntryKind::PullTrial { .. } => return Ok(()),
    };
    if delta.one_time_ticket < 0 || delta.ten_time_ticket < 0 {
        return Err(ValidationError::NegativeTicketDelta(entry.id.0.clone()));
    }
    Ok(())
}

pub fn validate_starting_balance(balance: &ResourceVector) -> Result<(), ValidationError> {
    if balance.one_time_ticket < 0 || balance.ten_time_ticket < 0 {
        return Err(ValidationError::NegativeTickets);
    }
    Ok(())
}

pub fn validate_config(cfg: &PlannerConfig) -> Result<(), ValidationError> {
    if cfg.pull_cost.pulls_per_ten_ticket == 0 {
        return Err(ValidationError::InvalidConfig("pulls_per_ten_ticket must be > 0"));
    }
    if cfg.pull_cost.pyroxene_per_pull < 0 {
        return Err(ValidationError::InvalidConfig("pyroxene_per_pull must be >= 0"));
    }
    let ranks: Vec<u32> = cfg
        .income
        .tactical_challenge_tiers
        .iter()
        .map(|t| t.up_to_rank)
        .collect();
    if ranks.windows(2).any(|w| w[0] >= w[1]) {
        return Err(ValidationError::InvalidConfig(
            "tactical_challenge_tiers must be sorted by up_to_rank",
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Difficulty, Reward, Role};
    use chrono::NaiveDate;

    #[test]
    fn zero_ap_only_rejected_for_sweepable() {
        let story = Stage::new("s", 0, Difficulty::Story, vec![]);
        assert!(validate_stage(&story).is_ok());
        let quest = Stage::new("q", 0, Difficulty::Quest, vec![]);
        assert_eq!(
            validate_stage(&quest),
            Err(ValidationError::ZeroApCost(StageId::new("q")))
        );
    }

    #[test]
    fn duplicate_stages_rejected() {
        let a = Stage::new("q1", 10, Difficulty::Quest, vec![Reward::material("x", 1)]);
        let err = validate_stages(&[a.clone(), a]).unwrap_err();
        assert_eq!(err, ValidationError::DuplicateStage(StageId::new("q1")));
    }

    #[test]
    fn chance_out_of_range_rejected() {
        let mut r = Reward::material("x", 1);
        r.chance = Some(Decimal::new(15, 1));
        let stage = Stage::new("q", 10, Difficulty::Quest, vec![r]);
        assert_eq!(
            validate_stage(&stage),
            Err(ValidationError::InvalidChance(StageId::new("q")))
        );
    }

    #[test]
    fn unknown_stage_ref_rejected() {
        let stages = vec![Stage::new("q1", 10, Difficulty::Quest, vec![])];
        let missing = StageId::new("q9");
        assert!(validate_stage_refs(&stages, [&stages[0].id]).is_ok());
        assert_eq!(
            validate_stage_refs(&stages, [&missing]),
            Err(ValidationError::UnknownStage(missing.clone()))
        );
    }

    #[test]
    fn negative_ratio_rejected() {
        let e = BonusEntry {
            student: StudentId::new("mika"),
            role: Role::Striker,
            material: MaterialId::new("x"),
            ratio: Decimal::new(-1, 2),
        };
        assert!(matches!(
            validate_bonus_entries(&[e]),
            Err(ValidationError::NegativeRatio { .. })
        ));
    }

    #[test]
    fn zero_interval_rejected() {
        let date = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let e = TimelineEntry::recurring("pkg", date, "Package", ResourceVector::pyroxene(20), 0, None);
        assert_eq!(
            validate_entry(&e),
            Err(ValidationError::ZeroInterval("pkg".to_string()))
        );
    }

    #[test]
    fn ticket_spending_only_through_pull_trials() {
        let date = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let spend = TimelineEntry::fixed("spend", date, "Spend", ResourceVector::new(0, 0, -1));
        assert_eq!(
            validate_entry(&spend),
            Err(ValidationError::NegativeTicketDelta("spend".to_string()))
        );
        let weekly = TimelineEntry::recurring("w", date, "W", ResourceVector::new(0, -2, 0), 7, None);
        assert!(validate_entry(&weekly).is_err());
        let shop = TimelineEntry::fixed("shop", date, "Shop", ResourceVector::new(-3_000, 10, 0));
        assert!(validate_entry(&shop).is_ok());
        let pulls = TimelineEntry::pull_trial("pickup", date, "Pickup", 50, false);
        assert!(validate_entry(&pulls).is_ok());
    }

    #[test]
    fn negative_starting_tickets_rejected() {
        assert!(validate_starting_balance(&ResourceVector::new(-500, 0, 0)).is_ok());
        assert_eq!(
            validate_starting_balance(&ResourceVector::new(0, -1, 0)),
            Err(ValidationError::NegativeTickets)
        );
    }

    #[test]
    fn unsorted_tiers_rejected() {
        let mut cfg = PlannerConfig::default();
        assert!(validate_config(&cfg).is_ok());
        cfg.income.tactical_challenge_tiers.reverse();
        assert!(validate_config(&cfg).is_err());
    }
}
