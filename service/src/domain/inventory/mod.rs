//! Inventory [`Item`] definitions.

pub mod unit;

use common::{define_kind, unit as marker, DateTimeOf};
use derive_more::{Display, From, FromStr, Into};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub use self::unit::Unit;

/// Inventory item: anything the operator contracts from suppliers and
/// sells to customers.
#[derive(Clone, Debug, From)]
pub enum Item {
    #[doc(hidden)]
    Hotel(Hotel),
    #[doc(hidden)]
    Transfer(Transfer),
    #[doc(hidden)]
    Ticket(Ticket),
}

impl Item {
    /// Returns ID of this [`Item`].
    #[must_use]
    pub fn id(&self) -> Id {
        match self {
            Self::Hotel(i) => i.id,
            Self::Transfer(i) => i.id,
            Self::Ticket(i) => i.id,
        }
    }

    /// Returns [`Kind`] of this [`Item`].
    #[must_use]
    pub fn kind(&self) -> Kind {
        match self {
            Self::Hotel(_) => Kind::Hotel,
            Self::Transfer(_) => Kind::Transfer,
            Self::Ticket(_) => Kind::Ticket,
        }
    }

    /// Returns [`Name`] of this [`Item`].
    #[must_use]
    pub fn name(&self) -> &Name {
        match self {
            Self::Hotel(i) => &i.name,
            Self::Transfer(i) => &i.name,
            Self::Ticket(i) => &i.name,
        }
    }

    /// Returns the sellable [`Unit`]s of this [`Item`]: room groups for a
    /// [`Hotel`], service categories otherwise.
    #[must_use]
    pub fn units(&self) -> &[Unit] {
        match self {
            Self::Hotel(i) => &i.room_groups,
            Self::Transfer(i) => &i.categories,
            Self::Ticket(i) => &i.categories,
        }
    }

    /// Returns the [`Unit`] with the provided ID, if this [`Item`] owns one.
    #[must_use]
    pub fn unit(&self, id: unit::Id) -> Option<&Unit> {
        self.units().iter().find(|u| u.id == id)
    }

    /// Returns [`DateTime`] when this [`Item`] was created.
    ///
    /// [`DateTime`]: common::DateTime
    #[must_use]
    pub fn created_at(&self) -> CreationDateTime {
        match self {
            Self::Hotel(i) => i.created_at,
            Self::Transfer(i) => i.created_at,
            Self::Ticket(i) => i.created_at,
        }
    }
}

/// Hotel with its bookable room groups.
#[derive(Clone, Debug)]
pub struct Hotel {
    /// ID of this [`Hotel`].
    pub id: Id,

    /// [`Name`] of this [`Hotel`].
    pub name: Name,

    /// Room groups of this [`Hotel`].
    pub room_groups: Vec<Unit>,

    /// [`DateTime`] when this [`Hotel`] was created.
    ///
    /// [`DateTime`]: common::DateTime
    pub created_at: CreationDateTime,
}

/// Transfer service with its vehicle categories.
#[derive(Clone, Debug)]
pub struct Transfer {
    /// ID of this [`Transfer`].
    pub id: Id,

    /// [`Name`] of this [`Transfer`].
    pub name: Name,

    /// Vehicle categories of this [`Transfer`].
    pub categories: Vec<Unit>,

    /// [`DateTime`] when this [`Transfer`] was created.
    ///
    /// [`DateTime`]: common::DateTime
    pub created_at: CreationDateTime,
}

/// Admission ticket with its categories.
#[derive(Clone, Debug)]
pub struct Ticket {
    /// ID of this [`Ticket`].
    pub id: Id,

    /// [`Name`] of this [`Ticket`].
    pub name: Name,

    /// Admission categories of this [`Ticket`].
    pub categories: Vec<Unit>,

    /// [`DateTime`] when this [`Ticket`] was created.
    ///
    /// [`DateTime`]: common::DateTime
    pub created_at: CreationDateTime,
}

/// ID of an [`Item`].
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

/// Name of an [`Item`].
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

define_kind! {
    #[doc = "Kind of an [`Item`]."]
    enum Kind {
        #[doc = "[`Hotel`] [`Item`]."]
        Hotel = 1,

        #[doc = "[`Transfer`] [`Item`]."]
        Transfer = 2,

        #[doc = "[`Ticket`] [`Item`]."]
        Ticket = 3,
    }
}

/// [`DateTime`] when an [`Item`] was created.
///
/// [`DateTime`]: common::DateTime
pub type CreationDateTime = DateTimeOf<(Item, marker::Creation)>;
