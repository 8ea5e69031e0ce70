#![deny(warnings)]

//! Bonus ratio calculator.
//!
//! Given a bonus catalog and the students a player has selected, computes for
//! each material the ratio actually applied and the best ratio the catalog
//! could offer. Both respect the per-role slot caps.

use plan_core::{BonusEntry, BonusRatio, MaterialId, Role, RoleCaps, StudentId};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use std::collections::{BTreeMap, BTreeSet};
use tracing::debug;

/// Per-material ratio with the students that filled each set of slots.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct BonusDetail {
    pub ratio: BonusRatio,
    pub applied_by: Vec<(StudentId, Role)>,
    pub maximum_by: Vec<(StudentId, Role)>,
}

#[derive(Default)]
struct SlotCounter {
    striker: u32,
    special: u32,
}

impl SlotCounter {
    fn try_take(&mut self, role: Role, caps: &RoleCaps) -> bool {
        let used = match role {
            Role::Striker => &mut self.striker,
            Role::Special => &mut self.special,
        };
        if *used < caps.cap(role) {
            *used += 1;
            true
        } else {
            false
        }
    }
}

/// Compute applied and maximum ratios with the contributing students.
///
/// Materials whose best entry is zero are left out of the result.
pub fn bonus_breakdown(
    catalog: &[BonusEntry],
    selected: &BTreeSet<StudentId>,
    caps: &RoleCaps,
) -> BTreeMap<MaterialId, BonusDetail> {
    let mut by_material: BTreeMap<&MaterialId, Vec<&BonusEntry>> = BTreeMap::new();
    for entry in catalog {
        by_material.entry(&entry.material).or_default().push(entry);
    }

    let mut out = BTreeMap::new();
    for (material, mut entries) in by_material {
        // Stable: equal ratios keep catalog order.
        entries.sort_by(|a, b| b.ratio.cmp(&a.ratio));
        if entries.first().map_or(true, |e| e.ratio <= Decimal::ZERO) {
            continue;
        }

        let mut detail = BonusDetail::default();
        let mut applied_slots = SlotCounter::default();
        let mut maximum_slots = SlotCounter::default();
        for e in entries {
            if maximum_slots.try_take(e.role, caps) {
                detail.ratio.maximum += e.ratio;
                detail.maximum_by.push((e.student.clone(), e.role));
            }
            if selected.contains(&e.student) && applied_slots.try_take(e.role, caps) {
                detail.ratio.applied += e.ratio;
                detail.applied_by.push((e.student.clone(), e.role));
            }
        }
        debug!(
            material = %material,
            applied = %detail.ratio.applied,
            maximum = %detail.ratio.maximum,
            "bonus ratio"
        );
        out.insert(material.clone(), detail);
    }
    out
}

/// Applied and maximum ratio per material.
pub fn bonus_ratios(
    catalog: &[BonusEntry],
    selected: &BTreeSet<StudentId>,
    caps: &RoleCaps,
) -> BTreeMap<MaterialId, BonusRatio> {
    bonus_breakdown(catalog, selected, caps)
        .into_iter()
        .map(|(m, d)| (m, d.ratio))
        .collect()
}

/// Extra items a bonus adds to a base amount, rounded up.
///
/// Example:
/// assert_eq!(bonus_amount(12, Decimal::new(35, 2)), 5); // 4.2 -> 5
pub fn bonus_amount(base: u64, ratio: Decimal) -> u64 {
    if ratio <= Decimal::ZERO || base == 0 {
        return 0;
    }
    (Decimal::from(base) * ratio)
        .ceil()
        .to_u64()
        .unwrap_or(u64::MAX)
}

/// Base amount plus its rounded-up bonus.
pub fn boosted_amount(base: u64, ratio: Decimal) -> u64 {
    base.saturating_add(bonus_amount(base, ratio))
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn entry(student: &str, role: Role, material: &str, pct: i64) -> BonusEntry {
        BonusEntry {
            student: StudentId::new(student),
            role,
            material: MaterialId::new(material),
            ratio: Decimal::new(pct, 2),
        }
    }

    fn select(ids: &[&str]) -> BTreeSet<StudentId> {
        ids.iter().map(|s| StudentId::new(*s)).collect()
    }

    #[test]
    fn empty_catalog_yields_nothing() {
        let out = bonus_ratios(&[], &select(&["a"]), &RoleCaps::default());
        assert!(out.is_empty());
    }

    #[test]
    fn zero_only_material_is_skipped() {
        let catalog = vec![
            entry("a", Role::Striker, "token", 0),
            entry("b", Role::Striker, "point", 10),
        ];
        let out = bonus_ratios(&catalog, &select(&["a", "b"]), &RoleCaps::default());
        assert!(!out.contains_key(&MaterialId::new("token")));
        assert_eq!(out[&MaterialId::new("point")].applied, Decimal::new(10, 2));
    }

    #[test]
    fn striker_slots_capped_at_four() {
        let catalog: Vec<_> = [("a", 25), ("b", 20), ("c", 15), ("d", 10), ("e", 5)]
            .iter()
            .map(|(s, p)| entry(s, Role::Striker, "token", *p))
            .collect();
        let out = bonus_breakdown(&catalog, &select(&["a", "b", "c", "d", "e"]), &RoleCaps::default());
        let d = &out[&MaterialId::new("token")];
        assert_eq!(d.ratio.maximum, Decimal::new(70, 2));
        assert_eq!(d.ratio.applied, Decimal::new(70, 2));
        assert_eq!(d.applied_by.len(), 4);
        assert!(!d.applied_by.iter().any(|(s, _)| s.as_str() == "e"));
    }

    #[test]
    fn special_cap_independent_of_striker() {
        let catalog = vec![
            entry("s1", Role::Special, "token", 30),
            entry("s2", Role::Special, "token", 25),
            entry("s3", Role::Special, "token", 20),
            entry("t1", Role::Striker, "token", 5),
        ];
        let out = bonus_ratios(&catalog, &select(&["s1", "s3", "t1"]), &RoleCaps::default());
        let r = out[&MaterialId::new("token")];
        // maximum: s1 + s2 (special cap 2) + t1
        assert_eq!(r.maximum, Decimal::new(60, 2));
        // applied: s1 + s3 + t1
        assert_eq!(r.applied, Decimal::new(55, 2));
    }

    #[test]
    fn unselected_students_only_count_towards_maximum() {
        let catalog = vec![
            entry("a", Role::Striker, "token", 15),
            entry("b", Role::Striker, "token", 10),
        ];
        let r = bonus_ratios(&catalog, &select(&["b"]), &RoleCaps::default())[&MaterialId::new("token")];
        assert_eq!(r.applied, Decimal::new(10, 2));
        assert_eq!(r.maximum, Decimal::new(25, 2));
    }

    #[test]
    fn bonus_rounds_up() {
        assert_eq!(bonus_amount(12, Decimal::new(35, 2)), 5);
        assert_eq!(bonus_amount(20, Decimal::new(50, 2)), 10);
        assert_eq!(bonus_amount(1, Decimal::new(1, 2)), 1);
        assert_eq!(bonus_amount(10, Decimal::ZERO), 0);
        assert_eq!(boosted_amount(12, Decimal::new(35, 2)), 17);
    }

    fn arb_catalog() -> impl Strategy<Value = (Vec<BonusEntry>, BTreeSet<StudentId>)> {
        let e = (0usize..12, any::<bool>(), 0usize..3, 0i64..60);
        (proptest::collection::vec(e, 0..40), proptest::collection::btree_set(0usize..12, 0..12)).prop_map(
            |(raw, sel)| {
                let catalog: Vec<BonusEntry> = raw
                    .into_iter()
                    .map(|(s, striker, m, pct)| BonusEntry {
                        student: StudentId::new(format!("st{s}")),
                        role: if striker { Role::Striker } else { Role::Special },
                        material: MaterialId::new(format!("m{m}")),
                        ratio: Decimal::new(pct, 2),
                    })
                    .collect();
                let selected: BTreeSet<StudentId> = sel.into_iter().map(|s| StudentId::new(format!("st{s}"))).collect();
                (catalog, selected)
            },
        )
    }

    proptest! {
        #[test]
        fn applied_never_exceeds_maximum((catalog, selected) in arb_catalog()) {
            for (_, r) in bonus_ratios(&catalog, &selected, &RoleCaps::default()) {
                prop_assert!(r.applied <= r.maximum);
                prop_assert!(r.applied >= Decimal::ZERO);
            }
        }

        #[test]
        fn contributors_respect_role_caps((catalog, selected) in arb_catalog()) {
            let caps = RoleCaps::default();
            for (_, d) in bonus_breakdown(&catalog, &selected, &caps) {
                for role in [Role::Striker, Role::Special] {
                    let applied = d.applied_by.iter().filter(|(_, r)| *r == role).count() as u32;
                    let maximum = d.maximum_by.iter().filter(|(_, r)| *r == role).count() as u32;
                    prop_assert!(applied <= caps.cap(role));
                    prop_assert!(maximum <= caps.cap(role));
                }
            }
        }
    }
}
