//! [`Command`] for converting buy-to-order [`Booking`] lines onto
//! contracted inventory.

use std::collections::HashMap;

use common::{
    operations::{By, Commit, Insert, Select, Transact, Transacted, Update},
    Money,
};
use derive_more::{Display, Error, From};
use rust_decimal::Decimal;
use tracerr::Traced;

use crate::{
    domain::{
        availability::{self, Stay},
        booking::{self, Notes, Purchase},
        contract, conversion, pool, Booking, Contract, Rate,
    },
    infra::{storage, Storage},
    read, Service,
};

use super::Command;

/// [`Command`] for converting buy-to-order lines of a [`Booking`] onto
/// the inventory of a (presumably newly signed) [`Contract`].
///
/// Converting changes sourcing and cost risk only: the customer-facing
/// price of a line never changes, and the computed price difference is
/// recorded on the audit trail purely for margin reporting. Converted
/// lines start consuming contracted capacity, so availability is
/// re-checked here the same way [`CreateBooking`] does.
///
/// [`CreateBooking`]: super::CreateBooking
#[derive(Clone, Debug)]
pub struct ConvertBooking {
    /// ID of the [`Booking`] to convert.
    pub booking_id: booking::Id,

    /// IDs of the lines to convert.
    ///
    /// Empty means every convertible line of the [`Booking`].
    pub line_ids: Vec<booking::LineId>,

    /// ID of the [`Contract`] to source from.
    pub contract_id: contract::Id,

    /// Operator [`Notes`] to stamp the conversion with.
    pub notes: Option<Notes>,
}

impl<Db> Command<ConvertBooking> for Service<Db>
where
    Db: Storage<Transact, Err = Traced<storage::Error>>,
    Transacted<Db>: Storage<
            Select<By<Option<Booking>, booking::Id>>,
            Ok = Option<Booking>,
            Err = Traced<storage::Error>,
        > + Storage<
            Select<By<Option<Contract>, contract::Id>>,
            Ok = Option<Contract>,
            Err = Traced<storage::Error>,
        > + Storage<
            Select<By<Vec<Rate>, contract::Id>>,
            Ok = Vec<Rate>,
            Err = Traced<storage::Error>,
        > + Storage<
            Select<By<Vec<Booking>, read::booking::NonCancelled>>,
            Ok = Vec<Booking>,
            Err = Traced<storage::Error>,
        > + Storage<Update<Booking>, Err = Traced<storage::Error>>
        + Storage<Insert<conversion::Record>, Err = Traced<storage::Error>>
        + Storage<Commit, Err = Traced<storage::Error>>,
{
    type Ok = Vec<conversion::Record>;
    type Err = Traced<ExecutionError>;

    #[expect(clippy::too_many_lines, reason = "still readable")]
    async fn execute(
        &self,
        cmd: ConvertBooking,
    ) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let ConvertBooking {
            booking_id,
            line_ids,
            contract_id,
            notes,
        } = cmd;

        let tx = self
            .storage()
            .execute(Transact)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        let mut booking = tx
            .execute(Select(By::<Option<Booking>, _>::new(booking_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .ok_or(E::BookingNotExists(booking_id))
            .map_err(tracerr::wrap!())?;
        if booking.is_cancelled() {
            return Err(tracerr::new!(E::BookingCancelled(booking_id)));
        }

        let contract = tx
            .execute(Select(By::<Option<Contract>, _>::new(contract_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .ok_or(E::ContractNotExists(contract_id))
            .map_err(tracerr::wrap!())?;
        if !contract.is_active() {
            return Err(tracerr::new!(E::ContractTerminated(contract_id)));
        }

        let rates = tx
            .execute(Select(By::<Vec<Rate>, _>::new(contract_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;
        let bookings = tx
            .execute(Select(By::<Vec<Booking>, _>::new(
                read::booking::NonCancelled,
            )))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        let targets = if line_ids.is_empty() {
            booking
                .lines
                .iter()
                .filter(|l| {
                    l.purchase == Purchase::BuyToOrder
                        && l.conversion.is_none()
                })
                .map(|l| l.id)
                .collect()
        } else {
            line_ids
        };
        if targets.is_empty() {
            return Err(tracerr::new!(E::NothingToConvert(booking_id)));
        }

        let stay = Stay {
            check_in: booking.check_in,
            check_out: booking.check_out,
        };
        let nights = booking.nights();

        let mut drawn = HashMap::<pool::Id, u32>::new();
        let mut records = Vec::with_capacity(targets.len());
        for line_id in targets {
            let line = booking
                .line(line_id)
                .ok_or(E::LineNotExists(line_id))
                .map_err(tracerr::wrap!())?
                .clone();
            if line.purchase != Purchase::BuyToOrder {
                return Err(tracerr::new!(E::NotBuyToOrder(line_id)));
            }

            let rate =
                conversion::matching_rate(&line, &booking, &contract, &rates)
                    .ok_or(E::NoMatchingRate(line_id))
                    .map_err(tracerr::wrap!())?
                    .clone();

            let available =
                availability::units(&rate, Some(&contract), &bookings, stay)
                    .ok_or(E::NoMatchingRate(line_id))
                    .map_err(tracerr::wrap!())?;
            let pool = rate
                .pool_id
                .ok_or(E::NoMatchingRate(line_id))
                .map_err(tracerr::wrap!())?;
            let drawn = drawn.entry(pool).or_default();
            let remaining = available.saturating_sub(*drawn);
            if line.quantity > remaining {
                return Err(tracerr::new!(E::CapacityExceeded {
                    line: line_id,
                    remaining,
                }));
            }
            *drawn += line.quantity;

            let contracted = rate.amount.amount
                * Decimal::from(nights)
                * Decimal::from(line.quantity);
            let difference = Money::new(
                line.price.amount - contracted,
                rate.amount.currency,
            );

            let stamped = booking
                .lines
                .iter_mut()
                .find(|l| l.id == line_id)
                .expect("present above");
            stamped.purchase = Purchase::Inventory;
            stamped.rate_id = rate.id;
            stamped.unit_id = rate.unit_id;
            stamped.pool_id = Some(pool);
            stamped.conversion = Some(booking::Conversion {
                converted_at: booking::ConversionDateTime::now(),
                original: Purchase::BuyToOrder,
                notes: notes.clone(),
            });

            records.push(conversion::Record {
                id: conversion::Id::new(),
                booking_id,
                line_id,
                rate_id: rate.id,
                converted_at: conversion::ConversionDateTime::now(),
                original: Purchase::BuyToOrder,
                price_difference: difference,
                notes: notes.clone(),
            });
        }

        tx.execute(Update(booking))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;
        for record in records.clone() {
            tx.execute(Insert(record))
                .await
                .map_err(tracerr::map_from_and_wrap!(=> E))
                .map(drop)?;
        }

        tx.execute(Commit)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;

        Ok(records)
    }
}

/// Error of [`ConvertBooking`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Booking`] is cancelled.
    #[display("`Booking(id: {_0})` is cancelled")]
    BookingCancelled(#[error(not(source))] booking::Id),

    /// [`Booking`] with the provided ID does not exist.
    #[display("`Booking(id: {_0})` does not exist")]
    BookingNotExists(#[error(not(source))] booking::Id),

    /// The matched rate's pool cannot cover the line's quantity.
    #[display("`Line(id: {line})` needs more than {remaining} unit(s)")]
    CapacityExceeded {
        /// ID of the line short on capacity.
        line: booking::LineId,

        /// Number of units remaining available.
        remaining: u32,
    },

    /// [`Contract`] with the provided ID does not exist.
    #[display("`Contract(id: {_0})` does not exist")]
    ContractNotExists(#[error(not(source))] contract::Id),

    /// [`Contract`] is terminated.
    #[display("`Contract(id: {_0})` is terminated")]
    ContractTerminated(#[error(not(source))] contract::Id),

    /// Line with the provided ID does not exist on the [`Booking`].
    #[display("`Line(id: {_0})` does not exist")]
    LineNotExists(#[error(not(source))] booking::LineId),

    /// No rate of the [`Contract`] matches the line.
    #[display("no `Rate` matches `Line(id: {_0})`")]
    NoMatchingRate(#[error(not(source))] booking::LineId),

    /// The line is not sourced buy-to-order.
    #[display("`Line(id: {_0})` is not buy-to-order")]
    NotBuyToOrder(#[error(not(source))] booking::LineId),

    /// The [`Booking`] has no convertible lines.
    #[display("`Booking(id: {_0})` has no convertible lines")]
    NothingToConvert(#[error(not(source))] booking::Id),

    /// [`Storage`] error.
    #[display("`Storage` operation failed: {_0}")]
    #[from]
    Storage(storage::Error),
}

#[cfg(test)]
mod spec {
    use std::time::Duration;

    use common::{money::Currency, operations::Insert, Date, Money, Percent};

    use crate::{
        command::{
            create_booking::LineDraft, create_item::UnitDraft,
            ConvertBooking, CreateBooking, CreateContract, CreateItem,
            GenerateRates,
        },
        domain::{
            booking::{Customer, Purchase},
            contract::{
                board, Allocation, OccupancyRate, Strategy, Supplier,
            },
            inventory::{self, unit::PaxBounds},
            pricing, rate,
            rate::Occupancy,
            Rate,
        },
        infra::storage::InMemory,
        query::AvailableUnits,
        task, Command as _, Config, Service,
    };

    fn usd(s: &str) -> Money {
        Money::new(s.parse().unwrap(), Currency::Usd)
    }

    fn service() -> Service<InMemory> {
        let config = Config {
            recheck_conversions: task::recheck_conversions::Config {
                interval: Duration::from_secs(60 * 60),
            },
        };
        Service::new(config, InMemory::new()).0
    }

    fn buy_to_order_rate() -> Rate {
        Rate {
            id: rate::Id::new(),
            contract_id: None,
            unit_id: inventory::unit::Id::new(),
            occupancy: Occupancy::Double,
            board: board::Kind::RoomOnly,
            amount: usd("130"),
            board_cost: Money::zero(Currency::Usd),
            valid_from: Some(Date::from_ymd(2025, 5, 1).unwrap()),
            valid_to: Some(Date::from_ymd(2025, 10, 31).unwrap()),
            min_nights: None,
            max_nights: None,
            cost_overrides: pricing::CostOverrides::default(),
            pool_id: None,
            active: true,
            created_at: rate::CreationDateTime::now(),
        }
    }

    #[tokio::test]
    async fn conversion_flips_sourcing_but_not_the_price() {
        let svc = service();

        // A buy-to-order booking made before any contract existed.
        let bto = buy_to_order_rate();
        svc.storage()
            .execute(Insert(vec![bto.clone()]))
            .await
            .unwrap();
        let check_in = Date::from_ymd(2025, 6, 10).unwrap();
        let check_out = Date::from_ymd(2025, 6, 12).unwrap();
        let booking = svc
            .execute(CreateBooking {
                customer: Customer::new("Ada Deane").unwrap(),
                check_in,
                check_out,
                lines: vec![LineDraft {
                    rate_id: bto.id,
                    quantity: 1,
                }],
            })
            .await
            .unwrap();
        let paid = booking.lines[0].price;
        assert_eq!(paid, usd("260"));

        // A newly signed contract covering the same stay, cheaper.
        let item = svc
            .execute(CreateItem {
                kind: inventory::Kind::Hotel,
                name: inventory::Name::new("Seaside Palace").unwrap(),
                units: vec![UnitDraft {
                    name: inventory::unit::Name::new("rg-1").unwrap(),
                    pax: PaxBounds::new(1, 4).unwrap(),
                }],
            })
            .await
            .unwrap();
        let contract = svc
            .execute(CreateContract {
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
                    unit_ids: vec![item.units()[0].id],
                    quantity: 10,
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
            })
            .await
            .unwrap();
        let rates = svc
            .execute(GenerateRates {
                contract_id: contract.id,
            })
            .await
            .unwrap();

        let records = svc
            .execute(ConvertBooking {
                booking_id: booking.id,
                line_ids: vec![],
                contract_id: contract.id,
                notes: None,
            })
            .await
            .unwrap();

        assert_eq!(records.len(), 1);
        // 260 paid against 110 × 2 contracted.
        assert_eq!(records[0].price_difference, usd("40"));
        assert_eq!(records[0].original, Purchase::BuyToOrder);

        // The line is inventory-sourced now, at an unchanged price, and
        // consumes the contract's pool.
        let converted = svc
            .execute(crate::query::BookingById::by(booking.id))
            .await
            .unwrap()
            .unwrap();
        let line = &converted.lines[0];
        assert_eq!(line.purchase, Purchase::Inventory);
        assert_eq!(line.price, paid);
        assert_eq!(line.rate_id, rates[0].id);
        assert!(line.conversion.is_some());

        let available = svc
            .execute(AvailableUnits {
                rate_id: rates[0].id,
                check_in,
                check_out,
            })
            .await
            .unwrap();
        assert_eq!(available, Some(9));
    }
}
