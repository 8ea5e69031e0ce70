//! Shop catalog, purchase selections and the material targets they imply.

use plan_core::{MaterialId, Target, ValidationError};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShopCost {
    pub material: MaterialId,
    pub amount: u64,
}

/// A limited-quantity item bought with collected materials.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShopItem {
    pub id: String,
    pub costs: Vec<ShopCost>,
    /// `None` means unlimited stock.
    #[serde(default)]
    pub purchase_limit: Option<u32>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShopPurchase {
    pub item: String,
    pub quantity: u32,
}

/// Total material cost of the selected purchases. Quantities above an item's
/// purchase limit are clamped to the limit.
pub fn shop_requirements(
    items: &[ShopItem],
    purchases: &[ShopPurchase],
) -> Result<BTreeMap<MaterialId, u64>, ValidationError> {
    let mut req: BTreeMap<MaterialId, u64> = BTreeMap::new();
    for p in purchases {
        let item = items
            .iter()
            .find(|i| i.id == p.item)
            .ok_or_else(|| ValidationError::UnknownShopItem(p.item.clone()))?;
        let qty = match item.purchase_limit {
            Some(limit) => p.quantity.min(limit),
            None => p.quantity,
        };
        for cost in &item.costs {
            let total = req.entry(cost.material.clone()).or_insert(0);
            *total = cost
                .amount
                .checked_mul(u64::from(qty))
                .and_then(|n| n.checked_add(*total))
                .ok_or_else(|| ValidationError::CountOverflow(item.id.clone()))?;
        }
    }
    Ok(req)
}

/// Requirement minus owned quantity, floored at zero, one target per material.
pub fn targets(
    requirements: &BTreeMap<MaterialId, u64>,
    owned: &BTreeMap<MaterialId, u64>,
) -> Vec<Target> {
    requirements
        .iter()
        .map(|(m, &need)| {
            let have = owned.get(m).copied().unwrap_or(0);
            Target::new(m.clone(), need.saturating_sub(have))
        })
        .collect()
}
