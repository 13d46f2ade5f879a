//! [`Booking`] definitions.

use common::{define_kind, unit, Date, DateTimeOf, Money};
use derive_more::{Display, From, FromStr, Into};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::{contract::board, inventory, pool, rate};
#[cfg(doc)]
use crate::domain::Rate;

/// Customer booking of one or more inventory [`Line`]s for a stay.
#[derive(Clone, Debug)]
pub struct Booking {
    /// ID of this [`Booking`].
    pub id: Id,

    /// [`Customer`] this [`Booking`] belongs to.
    pub customer: Customer,

    /// Check-in date of the stay.
    pub check_in: Date,

    /// Check-out date of the stay.
    pub check_out: Date,

    /// [`Status`] of this [`Booking`].
    pub status: Status,

    /// Ordered [`Line`]s of this [`Booking`].
    pub lines: Vec<Line>,

    /// [`DateTime`] when this [`Booking`] was created.
    ///
    /// [`DateTime`]: common::DateTime
    pub created_at: CreationDateTime,
}

impl Booking {
    /// Returns the stay length of this [`Booking`], in nights.
    #[must_use]
    pub fn nights(&self) -> u32 {
        u32::try_from(self.check_in.nights_until(self.check_out))
            .unwrap_or_default()
    }

    /// Returns whether this [`Booking`] is cancelled.
    ///
    /// Cancelled [`Booking`]s don't consume any capacity.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.status == Status::Cancelled
    }

    /// Returns the [`Line`] with the provided ID, if this [`Booking`] has
    /// one.
    #[must_use]
    pub fn line(&self, id: LineId) -> Option<&Line> {
        self.lines.iter().find(|l| l.id == id)
    }
}

/// Line item of a [`Booking`]: one or more units of one [`Rate`].
#[derive(Clone, Debug)]
pub struct Line {
    /// ID of this [`Line`].
    pub id: LineId,

    /// ID of the booked [`Rate`].
    pub rate_id: rate::Id,

    /// ID of the booked [`inventory::Unit`].
    ///
    /// [`inventory::Unit`]: crate::domain::inventory::Unit
    pub unit_id: inventory::unit::Id,

    /// Booked [`Occupancy`].
    ///
    /// [`Occupancy`]: rate::Occupancy
    pub occupancy: rate::Occupancy,

    /// Booked meal plan.
    pub board: board::Kind,

    /// Number of booked units.
    pub quantity: u32,

    /// How the inventory of this [`Line`] is sourced.
    pub purchase: Purchase,

    /// Customer-facing total price of this [`Line`].
    ///
    /// Never changes after creation, conversions included.
    pub price: Money,

    /// Capacity pool this [`Line`] consumes.
    ///
    /// Always populated for [`Purchase::Inventory`] lines at booking
    /// time; [`None`] for buy-to-order ones.
    pub pool_id: Option<pool::Id>,

    /// [`Conversion`] stamp, present once this [`Line`] was converted
    /// from buy-to-order sourcing.
    pub conversion: Option<Conversion>,
}

/// Conversion stamp of a [`Line`] remapped onto contracted inventory.
#[derive(Clone, Debug)]
pub struct Conversion {
    /// [`DateTime`] when the [`Line`] was converted.
    ///
    /// [`DateTime`]: common::DateTime
    pub converted_at: ConversionDateTime,

    /// [`Purchase`] kind the [`Line`] had before the conversion.
    pub original: Purchase,

    /// Operator [`Notes`] attached to the conversion.
    pub notes: Option<Notes>,
}

/// ID of a [`Booking`].
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

/// ID of a [`Line`].
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
pub struct LineId(Uuid);

impl LineId {
    /// Creates a new random [`LineId`].
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

/// Customer a [`Booking`] belongs to.
#[derive(Clone, Debug, Display, Eq, PartialEq)]
pub struct Customer(String);

impl Customer {
    /// Creates a new [`Customer`].
    ///
    /// # Safety
    ///
    /// The caller must ensure that the given `name` is not empty.
    #[expect(unsafe_code, reason = "bypass")]
    #[must_use]
    pub unsafe fn new_unchecked(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// Creates a new [`Customer`] if the given `name` is valid.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Option<Self> {
        let name = name.into();
        Self::check(&name).then_some(Self(name))
    }

    /// Checks whether the given `name` is a valid [`Customer`].
    fn check(name: impl AsRef<str>) -> bool {
        let name = name.as_ref();
        name.trim() == name && !name.is_empty() && name.len() <= 512
    }
}

impl FromStr for Customer {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s).ok_or("invalid `Customer`")
    }
}

/// Free-text operator notes.
#[derive(Clone, Debug, Display, Eq, PartialEq)]
pub struct Notes(String);

impl Notes {
    /// Creates a new [`Notes`].
    ///
    /// # Safety
    ///
    /// The caller must ensure that the given `notes` are not empty.
    #[expect(unsafe_code, reason = "bypass")]
    #[must_use]
    pub unsafe fn new_unchecked(notes: impl Into<String>) -> Self {
        Self(notes.into())
    }

    /// Creates a new [`Notes`] if the given `notes` are valid.
    #[must_use]
    pub fn new(notes: impl Into<String>) -> Option<Self> {
        let notes = notes.into();
        Self::check(&notes).then_some(Self(notes))
    }

    /// Checks whether the given `notes` are valid [`Notes`].
    fn check(notes: impl AsRef<str>) -> bool {
        let notes = notes.as_ref();
        notes.trim() == notes && !notes.is_empty() && notes.len() <= 2048
    }
}

impl FromStr for Notes {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s).ok_or("invalid `Notes`")
    }
}

define_kind! {
    #[doc = "Status of a [`Booking`]."]
    enum Status {
        #[doc = "The [`Booking`] awaits confirmation."]
        Pending = 1,

        #[doc = "The [`Booking`] is confirmed."]
        Confirmed = 2,

        #[doc = "The [`Booking`] is cancelled."]
        Cancelled = 3,
    }
}

define_kind! {
    #[doc = "How a [`Line`]'s inventory is sourced."]
    enum Purchase {
        #[doc = "Drawn from pre-purchased contracted capacity."]
        Inventory = 1,

        #[doc = "Purchased on demand at time of need."]
        BuyToOrder = 2,
    }
}

/// [`DateTime`] when a [`Booking`] was created.
///
/// [`DateTime`]: common::DateTime
pub type CreationDateTime = DateTimeOf<(Booking, unit::Creation)>;

/// [`DateTime`] when a [`Line`] was converted.
///
/// [`DateTime`]: common::DateTime
pub type ConversionDateTime = DateTimeOf<(Line, unit::Conversion)>;
