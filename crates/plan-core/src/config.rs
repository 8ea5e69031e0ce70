//! Planner configuration. Every field has a default matching the live game,
//! so callers may omit any section.

use crate::{ResourceVector, Role};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlannerConfig {
    pub pull_cost: PullCostConfig,
    pub role_caps: RoleCaps,
    pub sweep: SweepConfig,
    pub income: IncomeConfig,
}

/// Rates used when a pull demand is paid for.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PullCostConfig {
    pub pyroxene_per_pull: i64,
    pub pulls_per_ten_ticket: u32,
}

impl Default for PullCostConfig {
    fn default() -> Self {
        Self {
            pyroxene_per_pull: 120,
            pulls_per_ten_ticket: 10,
        }
    }
}

/// Maximum number of bonus-contributing students per role.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RoleCaps {
    pub striker: u32,
    pub special: u32,
}

impl Default for RoleCaps {
    fn default() -> Self {
        Self {
            striker: 4,
            special: 2,
        }
    }
}

impl RoleCaps {
    pub fn cap(&self, role: Role) -> u32 {
        match role {
            Role::Striker => self.striker,
            Role::Special => self.special,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SweepConfig {
    /// Hard cap on greedy iterations (one run per iteration).
    pub max_iterations: u32,
}

impl Default for SweepConfig {
    fn default() -> Self {
        Self {
            max_iterations: 10_000,
        }
    }
}

/// Daily reward for holding a rank band in the tactical challenge.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TacticalTier {
    /// Worst rank (inclusive) that still earns this reward.
    pub up_to_rank: u32,
    pub daily: ResourceVector,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RaidTier {
    Platinum,
    Gold,
    Silver,
    Bronze,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RaidReward {
    pub tier: RaidTier,
    pub reward: ResourceVector,
}

/// Attendance rewards land on day 5 and day 10 after `start`, each repeating
/// every 10 days.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttendanceConfig {
    pub start: NaiveDate,
    pub day5: ResourceVector,
    pub day10: ResourceVector,
}

/// Recurring system income.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IncomeConfig {
    pub daily_mission: ResourceVector,
    pub weekly_mission: ResourceVector,
    /// Rank bands sorted by `up_to_rank` ascending.
    pub tactical_challenge_tiers: Vec<TacticalTier>,
    /// Rank the player expects to hold; `None` disables the income.
    pub tactical_challenge_rank: Option<u32>,
    pub attendance: Option<AttendanceConfig>,
    pub raid_rewards: Vec<RaidReward>,
}

impl Default for IncomeConfig {
    fn default() -> Self {
        let tier = |up_to_rank, pyroxene| TacticalTier {
            up_to_rank,
            daily: ResourceVector::pyroxene(pyroxene),
        };
        let raid = |tier, pyroxene| RaidReward {
            tier,
            reward: ResourceVector::pyroxene(pyroxene),
        };
        Self {
            daily_mission: ResourceVector::pyroxene(20),
            weekly_mission: ResourceVector::pyroxene(100),
            tactical_challenge_tiers: vec![
                tier(1, 90),
                tier(10, 80),
                tier(100, 70),
                tier(1_000, 60),
                tier(5_000, 45),
                tier(15_000, 30),
            ],
            tactical_challenge_rank: None,
            attendance: None,
            raid_rewards: vec![
                raid(RaidTier::Platinum, 1_200),
                raid(RaidTier::Gold, 800),
                raid(RaidTier::Silver, 400),
                raid(RaidTier::Bronze, 200),
            ],
        }
    }
}

impl IncomeConfig {
    /// Daily tactical challenge reward for the configured rank, if any.
    pub fn tactical_challenge_daily(&self) -> Option<ResourceVector> {
        let rank = self.tactical_challenge_rank?;
        self.tactical_challenge_tiers
            .iter()
            .find(|t| rank <= t.up_to_rank)
            .map(|t| t.daily)
    }

    pub fn raid_reward(&self, tier: RaidTier) -> ResourceVector {
        self.raid_rewards
            .iter()
            .find(|r| r.tier == tier)
            .map(|r| r.reward)
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_game_rules() {
        let cfg = PlannerConfig::default();
        assert_eq!(cfg.pull_cost.pyroxene_per_pull, 120);
        assert_eq!(cfg.role_caps.cap(Role::Striker), 4);
        assert_eq!(cfg.role_caps.cap(Role::Special), 2);
        assert_eq!(cfg.sweep.max_iterations, 10_000);
    }

    #[test]
    fn tactical_rank_selects_first_band() {
        let mut income = IncomeConfig::default();
        assert_eq!(income.tactical_challenge_daily(), None);
        income.tactical_challenge_rank = Some(1);
        assert_eq!(income.tactical_challenge_daily(), Some(ResourceVector::pyroxene(90)));
        income.tactical_challenge_rank = Some(42);
        assert_eq!(income.tactical_challenge_daily(), Some(ResourceVector::pyroxene(70)));
        income.tactical_challenge_rank = Some(99_999);
        assert_eq!(income.tactical_challenge_daily(), None);
    }

    #[test]
    fn partial_config_fills_defaults() {
        let cfg: PlannerConfig =
            serde_json::from_str(r#"{"pull_cost":{"pyroxene_per_pull":100}}"#).unwrap();
        assert_eq!(cfg.pull_cost.pyroxene_per_pull, 100);
        assert_eq!(cfg.pull_cost.pulls_per_ten_ticket, 10);
        assert_eq!(cfg.income.daily_mission, ResourceVector::pyroxene(20));
        assert_eq!(cfg.income.raid_reward(RaidTier::Gold), ResourceVector::pyroxene(800));
    }
}
