//! Pricing definitions: cost parameters and the per-unit cost breakdown.

use common::{Money, Percent};
use rust_decimal::Decimal;

use crate::domain::{rate::Occupancy, Contract};
#[cfg(doc)]
use crate::domain::Rate;

/// Normalized cost parameters of a [`Rate`], regardless of whether it is
/// contract-backed or buy-to-order.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct CostParams {
    /// Operator markup over the contracted cost.
    pub markup: Percent,

    /// Tax applied on a stay's subtotal.
    pub tax_rate: Percent,

    /// City tax per person per night, if levied.
    pub city_tax: Option<Money>,

    /// Resort fee per room per night, if levied.
    pub resort_fee: Option<Money>,

    /// Supplier commission the prices are already net of.
    ///
    /// Tracked for margin display only and never deducted from totals.
    pub commission: Percent,
}

impl CostParams {
    /// Applies the provided field-wise [`CostOverrides`] on top of these
    /// [`CostParams`].
    #[must_use]
    pub fn overridden(self, overrides: &CostOverrides) -> Self {
        Self {
            markup: overrides.markup.unwrap_or(self.markup),
            tax_rate: overrides.tax_rate.unwrap_or(self.tax_rate),
            city_tax: overrides.city_tax.or(self.city_tax),
            resort_fee: overrides.resort_fee.or(self.resort_fee),
            commission: overrides.commission.unwrap_or(self.commission),
        }
    }
}

/// Field-wise overrides of [`CostParams`] carried by a [`Rate`].
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct CostOverrides {
    /// Overriding operator markup.
    pub markup: Option<Percent>,

    /// Overriding tax rate.
    pub tax_rate: Option<Percent>,

    /// Overriding city tax per person per night.
    pub city_tax: Option<Money>,

    /// Overriding resort fee per room per night.
    pub resort_fee: Option<Money>,

    /// Overriding supplier commission.
    pub commission: Option<Percent>,
}

/// Source a [`Rate`]'s pricing parameters are drawn from.
#[derive(Clone, Copy, Debug)]
pub enum RateSource<'c> {
    /// [`Rate`] backed by a supplier [`Contract`].
    Contracted(&'c Contract),

    /// Standalone buy-to-order [`Rate`] carrying its own parameters.
    BuyToOrder(CostParams),
}

impl RateSource<'_> {
    /// Resolves the default [`CostParams`] of this [`RateSource`].
    #[must_use]
    pub fn cost_params(&self) -> CostParams {
        match self {
            Self::Contracted(contract) => contract.cost_params(),
            Self::BuyToOrder(params) => *params,
        }
    }
}

/// Itemized cost of one unit for a stay.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Breakdown {
    /// Nightly amount times the stay length.
    pub room_cost: Money,

    /// Board cost over all the guests and nights.
    pub board_cost: Money,

    /// City tax over all the guests and nights.
    pub city_tax: Money,

    /// Resort fee over all the nights, per unit.
    pub resort_fee: Money,

    /// Tax on the subtotal.
    pub tax_amount: Money,

    /// Grand total of the stay.
    pub total: Money,
}

impl Breakdown {
    /// Derives the itemized cost of one unit booked at `base_rate` for
    /// the provided [`Occupancy`] and stay length.
    ///
    /// `board_cost` is the additional per-person-per-night amount of the
    /// booked board, if any. Missing optional parameters contribute zero.
    /// The supplier commission of `params` is deliberately not deducted:
    /// contracted amounts are already net of it.
    ///
    /// Pure and deterministic: identical inputs produce identical output,
    /// so the cart and the confirmation always agree.
    #[must_use]
    pub fn of(
        base_rate: Money,
        params: &CostParams,
        occupancy: Occupancy,
        nights: u32,
        board_cost: Option<Money>,
    ) -> Self {
        let currency = base_rate.currency;
        let nights = Decimal::from(nights);
        let heads = Decimal::from(occupancy.headcount());

        let room = base_rate.amount * nights;
        let board =
            board_cost.map_or(Decimal::ZERO, |b| b.amount * heads * nights);
        let city_tax = params
            .city_tax
            .map_or(Decimal::ZERO, |t| t.amount * heads * nights);
        let resort_fee =
            params.resort_fee.map_or(Decimal::ZERO, |f| f.amount * nights);

        let subtotal = room + board + city_tax + resort_fee;
        let tax = params.tax_rate.of(subtotal);

        Self {
            room_cost: Money::new(room, currency),
            board_cost: Money::new(board, currency),
            city_tax: Money::new(city_tax, currency),
            resort_fee: Money::new(resort_fee, currency),
            tax_amount: Money::new(tax, currency),
            total: Money::new(subtotal + tax, currency),
        }
    }

    /// Returns the pre-tax subtotal of this [`Breakdown`].
    #[must_use]
    pub fn subtotal(&self) -> Money {
        Money::new(
            self.total.amount - self.tax_amount.amount,
            self.total.currency,
        )
    }
}
