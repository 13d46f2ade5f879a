//! [`AllocationPool`] definitions.

use common::{unit, DateTimeOf};
use derive_more::{Display, Error, From, FromStr, Into};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[cfg(doc)]
use crate::domain::Rate;

/// Named capacity ledger of a physical inventory block.
///
/// Exists independently of [`Rate`]s so that multiple [`Rate`]s (different
/// occupancies, different room groups of a "run of house" block) draw one
/// physical capacity down without double-booking it.
#[derive(Clone, Debug)]
pub struct AllocationPool {
    /// ID of this [`AllocationPool`].
    pub id: Id,

    /// [`Name`] of this [`AllocationPool`].
    pub name: Name,

    /// Total physical capacity of this [`AllocationPool`].
    pub total_capacity: u32,

    /// Number of units currently booked from this [`AllocationPool`].
    pub booked: u32,

    /// Whether this [`AllocationPool`] may be oversubscribed.
    pub overbookable: bool,

    /// [`DateTime`] when this [`AllocationPool`] was created.
    ///
    /// [`DateTime`]: common::DateTime
    pub created_at: CreationDateTime,
}

impl AllocationPool {
    /// Returns the number of spots remaining in this [`AllocationPool`].
    ///
    /// Negative for an oversubscribed [`overbookable`] pool.
    ///
    /// [`overbookable`]: AllocationPool::overbookable
    #[must_use]
    pub fn available_spots(&self) -> i64 {
        i64::from(self.total_capacity) - i64::from(self.booked)
    }

    /// Records `quantity` booked units into this [`AllocationPool`].
    ///
    /// # Errors
    ///
    /// With [`CapacityExceeded`] when the pool is not [`overbookable`] and
    /// has fewer than `quantity` spots available.
    ///
    /// [`overbookable`]: AllocationPool::overbookable
    pub fn record(&mut self, quantity: u32) -> Result<(), CapacityExceeded> {
        let booked = self.booked.saturating_add(quantity);
        if !self.overbookable && booked > self.total_capacity {
            return Err(CapacityExceeded {
                pool: self.id,
                remaining: self.available_spots().max(0),
            });
        }
        self.booked = booked;
        Ok(())
    }

    /// Releases `quantity` previously recorded units from this
    /// [`AllocationPool`].
    ///
    /// # Errors
    ///
    /// With [`ReleaseUnderflow`] when fewer than `quantity` units are
    /// booked.
    pub fn release(&mut self, quantity: u32) -> Result<(), ReleaseUnderflow> {
        if quantity > self.booked {
            return Err(ReleaseUnderflow {
                pool: self.id,
                booked: self.booked,
            });
        }
        self.booked -= quantity;
        Ok(())
    }

    /// Adjusts the total capacity of this [`AllocationPool`].
    ///
    /// # Errors
    ///
    /// With [`CapacityExceeded`] when the new total is below the booked
    /// count of a non-[`overbookable`] pool.
    ///
    /// [`overbookable`]: AllocationPool::overbookable
    pub fn adjust_capacity(
        &mut self,
        new_total: u32,
    ) -> Result<(), CapacityExceeded> {
        if !self.overbookable && new_total < self.booked {
            return Err(CapacityExceeded {
                pool: self.id,
                remaining: self.available_spots().max(0),
            });
        }
        self.total_capacity = new_total;
        Ok(())
    }

    /// Returns the utilization of this [`AllocationPool`], in percent.
    #[must_use]
    pub fn utilization(&self) -> Decimal {
        if self.total_capacity == 0 {
            return if self.booked == 0 {
                Decimal::ZERO
            } else {
                Decimal::ONE_HUNDRED
            };
        }
        Decimal::from(self.booked) * Decimal::ONE_HUNDRED
            / Decimal::from(self.total_capacity)
    }

    /// Returns the derived [`Status`] of this [`AllocationPool`].
    #[must_use]
    pub fn status(&self) -> Status {
        use Status as S;

        if self.available_spots() < 0 {
            return S::Overbooked;
        }

        let utilization = self.utilization();
        if utilization > Decimal::from(90) {
            S::Critical
        } else if utilization >= Decimal::from(70) {
            S::Warning
        } else {
            S::Healthy
        }
    }
}

/// ID of an [`AllocationPool`].
#[derive(
    Clone,
    Copy,
    Debug,
    Default,
    Deserialize,
    Display,
    Eq,
    From,
    FromStr,
    Hash,
    Into,
    PartialEq,
    Serialize,
)]
pub struct Id(Uuid);

impl Id {
    /// Creates a new random [`Id`].
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

/// Name of an [`AllocationPool`].
#[derive(Clone, Debug, Display, Eq, PartialEq)]
pub struct Name(String);

impl Name {
    /// Creates a new [`Name`].
    ///
    /// # Safety
    ///
    /// The caller must ensure that the given `name` is not empty.
    #[expect(unsafe_code, reason = "bypass")]
    #[must_use]
    pub unsafe fn new_unchecked(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// Creates a new [`Name`] if the given `name` is valid.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Option<Self> {
        let name = name.into();
        Self::check(&name).then_some(Self(name))
    }

    /// Checks whether the given `name` is a valid [`Name`].
    fn check(name: impl AsRef<str>) -> bool {
        let name = name.as_ref();
        name.trim() == name && !name.is_empty() && name.len() <= 512
    }
}

impl FromStr for Name {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s).ok_or("invalid `Name`")
    }
}

/// Derived health status of an [`AllocationPool`].
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
#[repr(u8)]
pub enum Status {
    /// Less than 70% of the capacity is utilized.
    Healthy = 1,

    /// 70% to 90% of the capacity is utilized.
    Warning = 2,

    /// More than 90% of the capacity is utilized.
    Critical = 3,

    /// More units are booked than the capacity holds.
    Overbooked = 4,
}

/// Error of drawing more units than an [`AllocationPool`] has available.
#[derive(Clone, Copy, Debug, Display, Error)]
#[display("`AllocationPool(id: {pool})` has only {remaining} spot(s) left")]
pub struct CapacityExceeded {
    /// ID of the [`AllocationPool`].
    pub pool: Id,

    /// Number of spots remaining.
    pub remaining: i64,
}

/// Error of releasing more units than an [`AllocationPool`] has booked.
#[derive(Clone, Copy, Debug, Display, Error)]
#[display("`AllocationPool(id: {pool})` has only {booked} unit(s) booked")]
pub struct ReleaseUnderflow {
    /// ID of the [`AllocationPool`].
    pub pool: Id,

    /// Number of units booked.
    pub booked: u32,
}

/// [`DateTime`] when an [`AllocationPool`] was created.
///
/// [`DateTime`]: common::DateTime
pub type CreationDateTime = DateTimeOf<(AllocationPool, unit::Creation)>;

#[cfg(test)]
mod spec {
    use rust_decimal::Decimal;

    use super::{AllocationPool, CreationDateTime, Id, Name, Status};

    fn pool(total: u32, booked: u32) -> AllocationPool {
        AllocationPool {
            id: Id::new(),
            name: Name::new("Run of house").unwrap(),
            total_capacity: total,
            booked,
            overbookable: false,
            created_at: CreationDateTime::now(),
        }
    }

    #[test]
    fn ledger_invariant_holds_after_record_and_release() {
        let mut p = pool(50, 0);

        p.record(12).unwrap();
        assert_eq!(p.available_spots() + i64::from(p.booked), 50);

        p.release(5).unwrap();
        assert_eq!(p.available_spots() + i64::from(p.booked), 50);
        assert_eq!(p.available_spots(), 43);
    }

    #[test]
    fn refuses_to_exceed_capacity() {
        let mut p = pool(10, 8);

        let e = p.record(3).unwrap_err();
        assert_eq!(e.remaining, 2);
        assert_eq!(p.booked, 8);

        p.record(2).unwrap();
        assert_eq!(p.available_spots(), 0);
    }

    #[test]
    fn overbookable_pool_goes_negative() {
        let mut p = pool(10, 9);
        p.overbookable = true;

        p.record(3).unwrap();
        assert_eq!(p.available_spots(), -2);
        assert_eq!(p.status(), Status::Overbooked);
    }

    #[test]
    fn refuses_release_below_zero() {
        let mut p = pool(10, 1);

        assert!(p.release(2).is_err());
        p.release(1).unwrap();
        assert_eq!(p.booked, 0);
    }

    #[test]
    fn refuses_shrinking_below_booked() {
        let mut p = pool(10, 6);

        assert!(p.adjust_capacity(5).is_err());
        p.adjust_capacity(6).unwrap();
        assert_eq!(p.available_spots(), 0);
    }

    #[test]
    fn status_follows_utilization_thresholds() {
        assert_eq!(pool(100, 69).status(), Status::Healthy);
        assert_eq!(pool(100, 70).status(), Status::Warning);
        assert_eq!(pool(100, 90).status(), Status::Warning);
        assert_eq!(pool(100, 91).status(), Status::Critical);
        assert_eq!(pool(100, 0).utilization(), Decimal::ZERO);
    }
}
