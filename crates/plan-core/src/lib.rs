#![deny(warnings)]

//! Core domain models and invariants for the resource planner.
//!
//! This crate defines the serializable records shared by the bonus
//! calculator, the stage-sweep optimizer and the timeline projector, along
//! with validation helpers that reject structurally invalid input before any
//! numbers are produced.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign, Neg, Sub, SubAssign};

pub mod config;
pub mod stage;
pub mod timeline;
pub mod validate;

pub use config::*;
pub use stage::*;
pub use timeline::*;
pub use validate::*;

macro_rules! string_id {
    ($(#[$doc:meta])* $name:ident) => {
        $(#[$doc])*
        #[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub String);

        impl $name {
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.pad(&self.0)
            }
        }

        impl From<&str> for $name {
            fn from(s: &str) -> Self {
                Self(s.to_string())
            }
        }
    };
}

string_id!(
    /// Stable identifier of a student (character) that can grant bonuses.
    StudentId
);
string_id!(
    /// Stable identifier of a collectible material, e.g. "event_token_a".
    MaterialId
);
string_id!(
    /// Stable identifier of a stage, e.g. "quest_12".
    StageId
);
string_id!(
    /// Stable identifier of a timeline entry, used by callers for diffing.
    EntryId
);

/// A fixed tuple of currency quantities.
///
/// Arithmetic is component-wise. Values may be negative while a running
/// balance signals a deficit.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(default)]
pub struct ResourceVector {
    /// Premium gacha currency.
    pub pyroxene: i64,
    /// Tickets covering a single pull each.
    pub one_time_ticket: i64,
    /// Tickets covering ten pulls each.
    pub ten_time_ticket: i64,
}

impl ResourceVector {
    pub const ZERO: ResourceVector = ResourceVector {
        pyroxene: 0,
        one_time_ticket: 0,
        ten_time_ticket: 0,
    };

    pub const fn new(pyroxene: i64, one_time_ticket: i64, ten_time_ticket: i64) -> Self {
        Self {
            pyroxene,
            one_time_ticket,
            ten_time_ticket,
        }
    }

    pub const fn pyroxene(amount: i64) -> Self {
        Self::new(amount, 0, 0)
    }

    pub fn is_zero(&self) -> bool {
        *self == Self::ZERO
    }

    /// Multiply every component by `n`.
    pub fn scaled(&self, n: i64) -> Self {
        Self::new(
            self.pyroxene * n,
            self.one_time_ticket * n,
            self.ten_time_ticket * n,
        )
    }
}

impl fmt::Display for ResourceVector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "pyroxene {} | 1x ticket {} | 10x ticket {}",
            self.pyroxene, self.one_time_ticket, self.ten_time_ticket
        )
    }
}

impl Add for ResourceVector {
    type Output = ResourceVector;

    fn add(self, rhs: Self) -> Self {
        Self::new(
            self.pyroxene + rhs.pyroxene,
            self.one_time_ticket + rhs.one_time_ticket,
            self.ten_time_ticket + rhs.ten_time_ticket,
        )
    }
}

impl Sub for ResourceVector {
    type Output = ResourceVector;

    fn sub(self, rhs: Self) -> Self {
        self + (-rhs)
    }
}

impl Neg for ResourceVector {
    type Output = ResourceVector;

    fn neg(self) -> Self {
        Self::new(-self.pyroxene, -self.one_time_ticket, -self.ten_time_ticket)
    }
}

impl AddAssign for ResourceVector {
    fn add_assign(&mut self, rhs: Self) {
        *self = *self + rhs;
    }
}

impl SubAssign for ResourceVector {
    fn sub_assign(&mut self, rhs: Self) {
        *self = *self - rhs;
    }
}

impl Sum for ResourceVector {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::ZERO, |acc, v| acc + v)
    }
}

/// A material requirement the optimizer must satisfy.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Target {
    pub material: MaterialId,
    pub quantity: u64,
}

impl Target {
    pub fn new(material: impl Into<MaterialId>, quantity: u64) -> Self {
        Self {
            material: material.into(),
            quantity,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn vector_arithmetic_is_componentwise() {
        let a = ResourceVector::new(100, 2, 1);
        let b = ResourceVector::new(40, 3, 0);
        assert_eq!(a + b, ResourceVector::new(140, 5, 1));
        assert_eq!(a - b, ResourceVector::new(60, -1, 1));
        assert_eq!(-a, ResourceVector::new(-100, -2, -1));
        assert_eq!(a.scaled(3), ResourceVector::new(300, 6, 3));
    }

    #[test]
    fn vector_serde_defaults_missing_fields() {
        let v: ResourceVector = serde_json::from_str(r#"{"pyroxene": 600}"#).unwrap();
        assert_eq!(v, ResourceVector::pyroxene(600));
        assert!(ResourceVector::default().is_zero());
    }

    #[test]
    fn ids_serialize_transparently() {
        let id = StageId::new("quest_01");
        assert_eq!(serde_json::to_string(&id).unwrap(), "\"quest_01\"");
        assert_eq!(id.to_string(), "quest_01");
    }

    proptest! {
        #[test]
        fn sum_matches_fold(values in proptest::collection::vec((-10_000i64..10_000, -50i64..50, -5i64..5), 0..32)) {
            let vectors: Vec<ResourceVector> = values
                .iter()
                .map(|&(p, o, t)| ResourceVector::new(p, o, t))
                .collect();
            let total: ResourceVector = vectors.iter().copied().sum();
            let expected_p: i64 = values.iter().map(|v| v.0).sum();
            let expected_o: i64 = values.iter().map(|v| v.1).sum();
            let expected_t: i64 = values.iter().map(|v| v.2).sum();
            prop_assert_eq!(total, ResourceVector::new(expected_p, expected_o, expected_t));
        }
    }
}
