//! Buy-to-order conversion definitions.

use common::{unit, DateTimeOf, Money};
use derive_more::{Display, From, FromStr, Into};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::{booking, rate, Booking, Contract, Rate};

/// Candidate remapping of a buy-to-order [`booking::Line`] onto newly
/// available contracted inventory.
///
/// Computed on demand and never persisted.
#[derive(Clone, Debug)]
pub struct Candidate {
    /// ID of the [`Booking`] holding the line.
    pub booking_id: booking::Id,

    /// ID of the [`booking::Line`] to convert.
    pub line_id: booking::LineId,

    /// ID of the matched contracted [`Rate`].
    pub rate_id: rate::Id,

    /// Contracted cost of the line: the matched nightly amount over the
    /// stay and quantity.
    pub new_price: Money,

    /// Paid price minus [`new_price`]; positive means cheaper sourcing.
    ///
    /// Reported for margin purposes only: converting never changes what
    /// the customer paid.
    ///
    /// [`new_price`]: Candidate::new_price
    pub price_difference: Money,

    /// Human-readable recommendation reason.
    pub reason: String,
}

/// Append-only audit record of an accepted conversion.
#[derive(Clone, Debug)]
pub struct Record {
    /// ID of this [`Record`].
    pub id: Id,

    /// ID of the converted [`Booking`].
    pub booking_id: booking::Id,

    /// ID of the converted [`booking::Line`].
    pub line_id: booking::LineId,

    /// ID of the [`Rate`] the line was remapped onto.
    pub rate_id: rate::Id,

    /// [`DateTime`] when the conversion was accepted.
    ///
    /// [`DateTime`]: common::DateTime
    pub converted_at: ConversionDateTime,

    /// [`booking::Purchase`] kind the line had before the conversion.
    pub original: booking::Purchase,

    /// Sourcing-cost difference at conversion time, for margin reporting.
    pub price_difference: Money,

    /// Operator [`booking::Notes`] attached to the conversion.
    pub notes: Option<booking::Notes>,
}

/// ID of a [`Record`].
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

/// [`DateTime`] when a conversion was accepted.
///
/// [`DateTime`]: common::DateTime
pub type ConversionDateTime = DateTimeOf<(Record, unit::Conversion)>;

/// Finds the [`Rate`] under the provided [`Contract`] a buy-to-order
/// [`booking::Line`] could be remapped onto.
///
/// A match shares the line's occupancy and board, and admits the
/// booking's stay.
#[must_use]
pub fn matching_rate<'r>(
    line: &booking::Line,
    booking: &Booking,
    contract: &Contract,
    rates: &'r [Rate],
) -> Option<&'r Rate> {
    rates.iter().find(|r| {
        r.contract_id == Some(contract.id)
            && r.occupancy == line.occupancy
            && r.board == line.board
            && r.bookable_for(
                booking.check_in,
                booking.check_out,
                Some(contract),
            )
    })
}

/// Builds [`Candidate`]s for every buy-to-order line of the provided
/// bookings convertible onto the provided [`Contract`].
///
/// Cancelled bookings and already converted lines are never candidates.
#[must_use]
pub fn candidates(
    contract: &Contract,
    rates: &[Rate],
    bookings: &[Booking],
) -> Vec<Candidate> {
    let mut found = Vec::new();
    for booking in bookings.iter().filter(|b| !b.is_cancelled()) {
        for line in booking.lines.iter().filter(|l| {
            l.purchase == booking::Purchase::BuyToOrder
                && l.conversion.is_none()
        }) {
            let Some(rate) = matching_rate(line, booking, contract, rates)
            else {
                continue;
            };

            let amount = rate.amount.amount
                * Decimal::from(booking.nights())
                * Decimal::from(line.quantity);
            let new_price = Money::new(amount, rate.amount.currency);
            let difference = Money::new(
                line.price.amount - new_price.amount,
                new_price.currency,
            );

            found.push(Candidate {
                booking_id: booking.id,
                line_id: line.id,
                rate_id: rate.id,
                new_price,
                price_difference: difference,
                reason: format!(
                    "{} {} under `{}` covers the {}-night stay at {new_price}",
                    rate.occupancy,
                    rate.board,
                    contract.supplier,
                    booking.nights(),
                ),
            });
        }
    }
    found
}

#[cfg(test)]
mod spec {
    use common::{money::Currency, Date, Money, Percent};

    use crate::domain::{
        booking::{self, Booking, Customer, Line, Purchase, Status},
        contract::{
            self, board, Allocation, Contract, OccupancyRate, Strategy,
            Supplier,
        },
        inventory::{self, unit::PaxBounds, Hotel, Item, Unit},
        rate::{Occupancy, Rate},
    };

    use super::candidates;

    fn usd(s: &str) -> Money {
        Money::new(s.parse().unwrap(), Currency::Usd)
    }

    fn fixture() -> (Item, Contract, Vec<Rate>, Unit) {
        let room = Unit {
            id: inventory::unit::Id::new(),
            name: inventory::unit::Name::new("Standard").unwrap(),
            pax: PaxBounds::new(1, 4).unwrap(),
        };
        let item = Item::from(Hotel {
            id: inventory::Id::new(),
            name: inventory::Name::new("Seaside Palace").unwrap(),
            room_groups: vec![room.clone()],
            created_at: inventory::CreationDateTime::now(),
        });
        let contract = Contract {
            id: contract::Id::new(),
            supplier: Supplier::new("Sunline DMC").unwrap(),
            item_id: item.id(),
            currency: Currency::Usd,
            valid_from: Date::from_ymd(2025, 5, 1).unwrap(),
            valid_to: Date::from_ymd(2025, 10, 31).unwrap(),
            strategy: Strategy::PerOccupancy,
            base_rate: None,
            occupancy_rates: vec![OccupancyRate {
                occupancy: Occupancy::Double,
                amount: usd("110"),
            }],
            allocations: vec![Allocation {
                unit_ids: vec![room.id],
                quantity: 20,
                occupancy_rates: vec![],
                base_rate: None,
                pool_id: None,
            }],
            boards: vec![],
            min_nights: None,
            max_nights: None,
            markup: Percent::ZERO,
            tax_rate: Percent::ZERO,
            city_tax: None,
            resort_fee: None,
            commission: Percent::ZERO,
            created_at: contract::CreationDateTime::now(),
            terminated_at: None,
        };
        let rates = Rate::generate(&contract, &item);
        (item, contract, rates, room)
    }

    fn buy_to_order_booking(room: &Unit) -> Booking {
        Booking {
            id: booking::Id::new(),
            customer: Customer::new("Ada Deane").unwrap(),
            check_in: Date::from_ymd(2025, 6, 10).unwrap(),
            check_out: Date::from_ymd(2025, 6, 12).unwrap(),
            status: Status::Confirmed,
            lines: vec![Line {
                id: booking::LineId::new(),
                rate_id: crate::domain::rate::Id::new(),
                unit_id: room.id,
                occupancy: Occupancy::Double,
                board: board::Kind::RoomOnly,
                quantity: 1,
                purchase: Purchase::BuyToOrder,
                price: usd("260"),
                pool_id: None,
                conversion: None,
            }],
            created_at: booking::CreationDateTime::now(),
        }
    }

    #[test]
    fn matches_occupancy_and_board_and_prices_the_delta() {
        let (_item, contract, rates, room) = fixture();
        let booking = buy_to_order_booking(&room);

        let found = candidates(&contract, &rates, &[booking.clone()]);

        assert_eq!(found.len(), 1);
        let candidate = &found[0];
        assert_eq!(candidate.booking_id, booking.id);
        // 110 a night for 2 nights against the 260 paid.
        assert_eq!(candidate.new_price, usd("220"));
        assert_eq!(candidate.price_difference, usd("40"));
    }

    #[test]
    fn skips_cancelled_and_mismatched_lines() {
        let (_item, contract, rates, room) = fixture();

        let mut cancelled = buy_to_order_booking(&room);
        cancelled.status = Status::Cancelled;
        assert!(candidates(&contract, &rates, &[cancelled]).is_empty());

        let mut mismatched = buy_to_order_booking(&room);
        mismatched.lines[0].occupancy = Occupancy::Quad;
        assert!(candidates(&contract, &rates, &[mismatched]).is_empty());

        let mut inventory_backed = buy_to_order_booking(&room);
        inventory_backed.lines[0].purchase = Purchase::Inventory;
        assert!(
            candidates(&contract, &rates, &[inventory_backed]).is_empty(),
        );
    }
}
