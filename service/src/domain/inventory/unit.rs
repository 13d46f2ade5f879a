//! Sellable [`Unit`] definitions.

use derive_more::{Display, From, FromStr, Into};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[cfg(doc)]
use super::{Hotel, Item};

/// Sellable unit of an [`Item`]: a [`Hotel`] room group or a service
/// category.
///
/// Immutable once referenced by a rate.
#[derive(Clone, Debug)]
pub struct Unit {
    /// ID of this [`Unit`].
    pub id: Id,

    /// [`Name`] of this [`Unit`].
    pub name: Name,

    /// Guest capacity bounds of this [`Unit`].
    pub pax: PaxBounds,
}

/// ID of a [`Unit`].
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
    Ord,
    PartialEq,
    PartialOrd,
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

/// Name of a [`Unit`].
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

/// Guest capacity bounds of a [`Unit`].
///
/// A hotel room group bounds the guests one room sleeps; a service
/// category bounds the pax one booking may carry.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct PaxBounds {
    /// Minimum number of guests.
    pub min: u8,

    /// Maximum number of guests.
    pub max: u8,
}

impl PaxBounds {
    /// Creates new [`PaxBounds`] if `min` doesn't exceed `max`.
    #[must_use]
    pub fn new(min: u8, max: u8) -> Option<Self> {
        (min <= max && min > 0).then_some(Self { min, max })
    }

    /// Indicates whether the provided headcount fits these bounds.
    #[must_use]
    pub fn admit(&self, headcount: u8) -> bool {
        (self.min..=self.max).contains(&headcount)
    }
}
