//! [`BoardOption`] definitions.

use common::{define_kind, money::Currency, Money};

#[cfg(doc)]
use super::Contract;

define_kind! {
    #[doc = "Meal plan inclusion level."]
    enum Kind {
        #[doc = "No meals included."]
        RoomOnly = 1,

        #[doc = "Breakfast included."]
        BedAndBreakfast = 2,

        #[doc = "Breakfast and dinner included."]
        HalfBoard = 3,

        #[doc = "All daily meals included."]
        FullBoard = 4,

        #[doc = "All meals and drinks included."]
        AllInclusive = 5,
    }
}

/// Board option bookable under a [`Contract`]: a meal plan and its
/// additional cost.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct BoardOption {
    /// Meal plan of this [`BoardOption`].
    pub board: Kind,

    /// Additional cost per person per night.
    pub cost: Money,
}

impl BoardOption {
    /// Creates the zero-cost room-only [`BoardOption`] every [`Contract`]
    /// falls back to.
    #[must_use]
    pub const fn room_only(currency: Currency) -> Self {
        Self {
            board: Kind::RoomOnly,
            cost: Money::zero(currency),
        }
    }
}
