//! [`Command`] for cancelling a [`Booking`].

use common::operations::{By, Commit, Select, Transact, Transacted, Update};
use derive_more::{Display, Error, From};
use tracerr::Traced;

use crate::{
    domain::{
        booking::{self, Status},
        Booking,
    },
    infra::{storage, Storage},
    Service,
};

use super::Command;

/// [`Command`] for cancelling a [`Booking`].
///
/// Cancellation is a status transition only: the [`Booking`] drops out of
/// the consumption sums, while explicit pool ledgers move only through
/// the dedicated pool commands.
#[derive(Clone, Copy, Debug)]
pub struct CancelBooking {
    /// ID of the [`Booking`] to cancel.
    pub booking_id: booking::Id,
}

impl<Db> Command<CancelBooking> for Service<Db>
where
    Db: Storage<Transact, Err = Traced<storage::Error>>,
    Transacted<Db>: Storage<
            Select<By<Option<Booking>, booking::Id>>,
            Ok = Option<Booking>,
            Err = Traced<storage::Error>,
        > + Storage<Update<Booking>, Err = Traced<storage::Error>>
        + Storage<Commit, Err = Traced<storage::Error>>,
{
    type Ok = Booking;
    type Err = Traced<ExecutionError>;

    async fn execute(
        &self,
        cmd: CancelBooking,
    ) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let CancelBooking { booking_id } = cmd;

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
            return Err(tracerr::new!(E::AlreadyCancelled(booking_id)));
        }
        booking.status = Status::Cancelled;

        tx.execute(Update(booking.clone()))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;

        tx.execute(Commit)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;

        Ok(booking)
    }
}

/// Error of [`CancelBooking`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Booking`] is already cancelled.
    #[display("`Booking(id: {_0})` is already cancelled")]
    AlreadyCancelled(#[error(not(source))] booking::Id),

    /// [`Booking`] with the provided ID does not exist.
    #[display("`Booking(id: {_0})` does not exist")]
    BookingNotExists(#[error(not(source))] booking::Id),

    /// [`Storage`] error.
    #[display("`Storage` operation failed: {_0}")]
    #[from]
    Storage(storage::Error),
}

#[cfg(test)]
mod spec {
    use std::time::Duration;

    use common::{money::Currency, Date, Money, Percent};

    use crate::{
        command::{
            create_booking::LineDraft, create_item::UnitDraft, CancelBooking,
            CreateBooking, CreateContract, CreateItem, GenerateRates,
        },
        domain::{
            booking::Customer,
            contract::{Allocation, OccupancyRate, Strategy, Supplier},
            inventory::{self, unit::PaxBounds},
            rate::Occupancy,
        },
        infra::storage::InMemory,
        query::AvailableUnits,
        task, Command as _, Config, Service,
    };

    use super::ExecutionError;

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

    #[tokio::test]
    async fn cancellation_restores_availability_logically() {
        let svc = service();

        // An explicit ledger on the side: bookings must never move it.
        let ledger = svc
            .execute(crate::command::CreatePool {
                name: crate::domain::pool::Name::new("Overflow block")
                    .unwrap(),
                total_capacity: 5,
                overbookable: false,
            })
            .await
            .unwrap();

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
                    amount: usd("130"),
                }],
                allocations: vec![Allocation {
                    unit_ids: vec![item.units()[0].id],
                    quantity: 5,
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

        let check_in = Date::from_ymd(2025, 6, 10).unwrap();
        let check_out = Date::from_ymd(2025, 6, 12).unwrap();
        let booking = svc
            .execute(CreateBooking {
                customer: Customer::new("Ada Deane").unwrap(),
                check_in,
                check_out,
                lines: vec![LineDraft {
                    rate_id: rates[0].id,
                    quantity: 3,
                }],
            })
            .await
            .unwrap();

        let available = svc
            .execute(AvailableUnits {
                rate_id: rates[0].id,
                check_in,
                check_out,
            })
            .await
            .unwrap();
        assert_eq!(available, Some(2));

        let cancelled = svc
            .execute(CancelBooking {
                booking_id: booking.id,
            })
            .await
            .unwrap();
        assert!(cancelled.is_cancelled());

        // Re-querying yields the pre-booking value again.
        let available = svc
            .execute(AvailableUnits {
                rate_id: rates[0].id,
                check_in,
                check_out,
            })
            .await
            .unwrap();
        assert_eq!(available, Some(5));

        let err = svc
            .execute(CancelBooking {
                booking_id: booking.id,
            })
            .await
            .unwrap_err();
        assert!(matches!(
            err.split().0,
            ExecutionError::AlreadyCancelled(_),
        ));

        // The standalone ledger never moved: booking and cancellation
        // are logical, pool counters change only through the pool
        // commands.
        let ledger = svc
            .execute(crate::query::PoolById::by(ledger.id))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(ledger.booked, 0);
        assert_eq!(ledger.available_spots(), 5);
    }
}
