//! [`Contract`] definitions.

pub mod allocation;
pub mod board;

use common::{
    define_kind, money::Currency, unit, Date, DateTimeOf, Money, Percent,
};
use derive_more::{Display, From, FromStr, Into};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::{inventory, pricing, rate::Occupancy};
#[cfg(doc)]
use crate::domain::Item;

pub use self::{allocation::Allocation, board::BoardOption};

/// Supplier contract committing [`Item`] inventory at agreed prices for a
/// validity window.
#[derive(Clone, Debug)]
pub struct Contract {
    /// ID of this [`Contract`].
    pub id: Id,

    /// [`Supplier`] this [`Contract`] is signed with.
    pub supplier: Supplier,

    /// ID of the [`Item`] this [`Contract`] commits inventory of.
    pub item_id: inventory::Id,

    /// [`Currency`] all the amounts of this [`Contract`] are in.
    pub currency: Currency,

    /// First stay date this [`Contract`] covers.
    pub valid_from: Date,

    /// Last stay date this [`Contract`] covers.
    pub valid_to: Date,

    /// Pricing [`Strategy`] of this [`Contract`].
    pub strategy: Strategy,

    /// Flat nightly rate ([`Strategy::FlatRate`]).
    pub base_rate: Option<Money>,

    /// Contract-level nightly rates per [`Occupancy`]
    /// ([`Strategy::PerOccupancy`]).
    pub occupancy_rates: Vec<OccupancyRate>,

    /// [`Allocation`]s of physical units this [`Contract`] commits.
    pub allocations: Vec<Allocation>,

    /// [`BoardOption`]s bookable under this [`Contract`].
    ///
    /// Empty means a single zero-cost room-only option.
    pub boards: Vec<BoardOption>,

    /// Default minimum stay length, in nights.
    pub min_nights: Option<u32>,

    /// Default maximum stay length, in nights.
    pub max_nights: Option<u32>,

    /// Operator markup over the contracted cost.
    pub markup: Percent,

    /// Tax applied on a stay's subtotal.
    pub tax_rate: Percent,

    /// City tax per person per night, if levied.
    pub city_tax: Option<Money>,

    /// Resort fee per room per night, if levied.
    pub resort_fee: Option<Money>,

    /// Supplier commission the contracted prices are already net of.
    ///
    /// Tracked for margin display and never deducted from totals.
    pub commission: Percent,

    /// [`DateTime`] when this [`Contract`] was created.
    ///
    /// [`DateTime`]: common::DateTime
    pub created_at: CreationDateTime,

    /// [`DateTime`] when this [`Contract`] was terminated, if it was.
    ///
    /// [`DateTime`]: common::DateTime
    pub terminated_at: Option<TerminationDateTime>,
}

impl Contract {
    /// Returns whether this [`Contract`] is active.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.terminated_at.is_none()
    }

    /// Returns whether the provided stay window lies inside this
    /// [`Contract`]'s validity window.
    #[must_use]
    pub fn covers(&self, check_in: Date, check_out: Date) -> bool {
        self.valid_from <= check_in && check_out <= self.valid_to
    }

    /// Returns the [`Allocation`] providing capacity for the provided
    /// [`inventory::Unit`].
    ///
    /// [`inventory::Unit`]: crate::domain::inventory::Unit
    #[must_use]
    pub fn allocation_covering(
        &self,
        unit_id: inventory::unit::Id,
    ) -> Option<&Allocation> {
        self.allocations.iter().find(|a| a.covers(unit_id))
    }

    /// Returns the contract-level nightly amount for the provided
    /// [`Occupancy`], if one is defined.
    #[must_use]
    pub fn occupancy_amount(&self, occupancy: Occupancy) -> Option<Money> {
        self.occupancy_rates
            .iter()
            .find(|r| r.occupancy == occupancy)
            .map(|r| r.amount)
    }

    /// Returns the [`BoardOption`]s of this [`Contract`], defaulting to a
    /// single zero-cost room-only option when none are configured.
    #[must_use]
    pub fn board_options(&self) -> Vec<BoardOption> {
        if self.boards.is_empty() {
            vec![BoardOption::room_only(self.currency)]
        } else {
            self.boards.clone()
        }
    }

    /// Returns the default cost parameters of this [`Contract`].
    #[must_use]
    pub fn cost_params(&self) -> pricing::CostParams {
        pricing::CostParams {
            markup: self.markup,
            tax_rate: self.tax_rate,
            city_tax: self.city_tax,
            resort_fee: self.resort_fee,
            commission: self.commission,
        }
    }
}

/// ID of a [`Contract`].
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

/// Supplier a [`Contract`] is signed with.
#[derive(Clone, Debug, Display, Eq, PartialEq)]
pub struct Supplier(String);

impl Supplier {
    /// Creates a new [`Supplier`].
    ///
    /// # Safety
    ///
    /// The caller must ensure that the given `name` is not empty.
    #[expect(unsafe_code, reason = "bypass")]
    #[must_use]
    pub unsafe fn new_unchecked(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// Creates a new [`Supplier`] if the given `name` is valid.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Option<Self> {
        let name = name.into();
        Self::check(&name).then_some(Self(name))
    }

    /// Checks whether the given `name` is a valid [`Supplier`].
    fn check(name: impl AsRef<str>) -> bool {
        let name = name.as_ref();
        name.trim() == name && !name.is_empty() && name.len() <= 512
    }
}

impl FromStr for Supplier {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s).ok_or("invalid `Supplier`")
    }
}

define_kind! {
    #[doc = "Pricing strategy of a [`Contract`]."]
    enum Strategy {
        #[doc = "Nightly amount varies by [`Occupancy`]."]
        PerOccupancy = 1,

        #[doc = "One nightly amount regardless of [`Occupancy`]."]
        FlatRate = 2,
    }
}

/// Nightly amount for one [`Occupancy`].
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct OccupancyRate {
    /// [`Occupancy`] this amount applies to.
    pub occupancy: Occupancy,

    /// Nightly amount per unit.
    pub amount: Money,
}

/// [`DateTime`] when a [`Contract`] was created.
///
/// [`DateTime`]: common::DateTime
pub type CreationDateTime = DateTimeOf<(Contract, unit::Creation)>;

/// [`DateTime`] when a [`Contract`] was terminated.
///
/// [`DateTime`]: common::DateTime
pub type TerminationDateTime = DateTimeOf<(Contract, unit::Deletion)>;
