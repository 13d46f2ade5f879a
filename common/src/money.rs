//! [`Money`]-related definitions.

use std::{fmt, str::FromStr};

use rust_decimal::{prelude::ToPrimitive as _, Decimal};

use crate::define_kind;

/// Amount of money in some [`Currency`].
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Money {
    /// Amount of this [`Money`].
    pub amount: Decimal,

    /// [`Currency`] of this amount.
    pub currency: Currency,
}

impl Money {
    /// Creates a new [`Money`] with the provided amount.
    #[must_use]
    pub const fn new(amount: Decimal, currency: Currency) -> Self {
        Self { amount, currency }
    }

    /// Creates a new zero [`Money`] amount in the provided [`Currency`].
    #[must_use]
    pub const fn zero(currency: Currency) -> Self {
        Self {
            amount: Decimal::ZERO,
            currency,
        }
    }

    /// Indicates whether this [`Money`] amount is zero.
    #[must_use]
    pub fn is_zero(&self) -> bool {
        self.amount.is_zero()
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let Self { amount, currency } = self;
        if amount.is_integer() {
            write!(f, "{}{currency}", amount.to_i128().expect("integer"))
        } else {
            write!(f, "{amount}{currency}")
        }
    }
}

impl FromStr for Money {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.len() < 4 {
            return Err("too short");
        }

        let (amount, currency) = s.split_at(s.len() - 3);
        let amount = Decimal::from_str(amount).map_err(|_| "invalid amount")?;
        let currency =
            Currency::from_str(currency).map_err(|_| "invalid currency")?;

        Ok(Self { amount, currency })
    }
}

define_kind! {
    #[doc = "Currency of a [`Money`] amount."]
    enum Currency {
        #[doc = "US Dollar."]
        Usd = 1,

        #[doc = "Euro."]
        Eur = 2,

        #[doc = "Pound Sterling."]
        Gbp = 3,
    }
}

#[cfg(test)]
mod spec {
    use std::str::FromStr as _;

    use rust_decimal::Decimal;

    use super::{Currency, Money};

    fn decimal(s: &str) -> Decimal {
        s.parse().unwrap()
    }

    #[test]
    fn from_str() {
        assert_eq!(
            Money::from_str("89.90USD").unwrap(),
            Money {
                amount: decimal("89.90"),
                currency: Currency::Usd,
            },
        );

        assert_eq!(
            Money::from_str("89.90EUR").unwrap(),
            Money {
                amount: decimal("89.90"),
                currency: Currency::Eur,
            },
        );

        assert_eq!(
            Money::from_str("89.90GBP").unwrap(),
            Money {
                amount: decimal("89.90"),
                currency: Currency::Gbp,
            },
        );

        assert!(Money::from_str("89.90").is_err());
        assert!(Money::from_str("89.90Us").is_err());
        assert!(Money::from_str("89.90Usdollar").is_err());

        assert!(Money::from_str("89.00USD").is_ok());
        assert!(Money::from_str("89.0USD").is_ok());
        assert!(Money::from_str("89USD").is_ok());
    }

    #[test]
    fn to_string() {
        assert_eq!(
            Money {
                amount: decimal("89.90"),
                currency: Currency::Usd,
            }
            .to_string(),
            "89.90USD",
        );

        assert_eq!(
            Money {
                amount: decimal("89.90"),
                currency: Currency::Gbp,
            }
            .to_string(),
            "89.90GBP",
        );

        assert_eq!(
            Money {
                amount: decimal("89.00"),
                currency: Currency::Eur,
            }
            .to_string(),
            "89EUR",
        );
        assert_eq!(
            Money {
                amount: decimal("89"),
                currency: Currency::Eur,
            }
            .to_string(),
            "89EUR",
        );
    }

    #[test]
    fn zero() {
        let zero = Money::zero(Currency::Usd);
        assert!(zero.is_zero());
        assert_eq!(zero.to_string(), "0USD");
    }
}
