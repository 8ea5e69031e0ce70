//! Per-material item breakdown combining every source and sink.

use plan_core::MaterialId;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// Reported buckets for one material.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemBreakdown {
    pub from_first_run: u64,
    pub from_repeated_runs: u64,
    pub already_owned: u64,
    /// The shop requirement as a consumed (non-positive) line.
    pub to_buy_shop_items: i64,
    /// Surplus after buying, never negative.
    pub remaining: u64,
    /// Shortfall when collected plus owned does not cover the requirement.
    pub deficit: u64,
}

impl ItemBreakdown {
    pub fn collected(&self) -> u64 {
        self.from_first_run.saturating_add(self.from_repeated_runs)
    }
}

/// Combine yields, requirements and owned quantities into per-material lines.
///
/// Materials appear when collected or required; owned-only materials are left
/// out.
pub fn breakdown(
    first_run: &BTreeMap<MaterialId, u64>,
    repeated_runs: &BTreeMap<MaterialId, u64>,
    requirements: &BTreeMap<MaterialId, u64>,
    owned: &BTreeMap<MaterialId, u64>,
) -> BTreeMap<MaterialId, ItemBreakdown> {
    let get = |map: &BTreeMap<MaterialId, u64>, m: &MaterialId| map.get(m).copied().unwrap_or(0);
    let materials: BTreeSet<&MaterialId> = first_run
        .keys()
        .chain(repeated_runs.keys())
        .chain(requirements.keys())
        .collect();

    materials
        .into_iter()
        .map(|m| {
            let requirement = get(requirements, m);
            let mut line = ItemBreakdown {
                from_first_run: get(first_run, m),
                from_repeated_runs: get(repeated_runs, m),
                already_owned: get(owned, m),
                to_buy_shop_items: -i64::try_from(requirement).unwrap_or(i64::MAX),
                ..ItemBreakdown::default()
            };
            let available = line.collected().saturating_add(line.already_owned);
            line.remaining = available.saturating_sub(requirement);
            line.deficit = requirement.saturating_sub(available);
            (m.clone(), line)
        })
        .collect()
}
