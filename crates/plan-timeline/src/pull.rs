//! Converting a pull demand into a balance deduction.

use plan_core::{PullCostConfig, ResourceVector};

/// Ten-pull tickets first, then single tickets, then currency.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PullCostPolicy {
    pub pyroxene_per_pull: i64,
    pub pulls_per_ten_ticket: u32,
}

impl Default for PullCostPolicy {
    fn default() -> Self {
        PullCostConfig::default().into()
    }
}

impl From<PullCostConfig> for PullCostPolicy {
    fn from(cfg: PullCostConfig) -> Self {
        Self {
            pyroxene_per_pull: cfg.pyroxene_per_pull,
            pulls_per_ten_ticket: cfg.pulls_per_ten_ticket,
        }
    }
}

impl PullCostPolicy {
    /// Delta (non-positive in every component) paying for `pulls` out of
    /// `balance`. Tickets are never drawn below zero; currency may be.
    pub fn charge(&self, pulls: u32, balance: &ResourceVector) -> ResourceVector {
        let per_ten = i64::from(self.pulls_per_ten_ticket.max(1));
        let mut left = i64::from(pulls);

        let ten = balance.ten_time_ticket.max(0).min(left / per_ten);
        left -= ten * per_ten;
        let one = balance.one_time_ticket.max(0).min(left);
        left -= one;

        ResourceVector::new(-left * self.pyroxene_per_pull, -one, -ten)
    }

    /// Pulls the balance can pay for without going into debt.
    pub fn affordable_pulls(&self, balance: &ResourceVector) -> i64 {
        let per_ten = i64::from(self.pulls_per_ten_ticket);
        let from_currency = if self.pyroxene_per_pull > 0 {
            balance.pyroxene.max(0) / self.pyroxene_per_pull
        } else {
            0
        };
        balance.ten_time_ticket.max(0) * per_ten + balance.one_time_ticket.max(0) + from_currency
    }
}
