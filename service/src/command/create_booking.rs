//! [`Command`] for creating a new [`Booking`].

use std::collections::HashMap;

use common::{
    operations::{By, Commit, Insert, Select, Transact, Transacted},
    Date, Money,
};
use derive_more::{Display, Error, From};
use rust_decimal::Decimal;
use tracerr::Traced;

use crate::{
    domain::{
        availability::{self, Stay},
        booking::{self, Customer, Line, Purchase, Status},
        contract, inventory, pool,
        pricing::{Breakdown, CostParams, RateSource},
        rate, Booking, Contract, Rate,
    },
    infra::{storage, Storage},
    read, Service,
};

use super::Command;

/// [`Command`] for creating a new [`Booking`].
///
/// Availability is checked and the [`Booking`] inserted within one
/// storage transaction, so two concurrent requests can never both
/// observe the last unit and oversubscribe a pool.
#[derive(Clone, Debug)]
pub struct CreateBooking {
    /// [`Customer`] the new [`Booking`] belongs to.
    pub customer: Customer,

    /// Check-in date of the stay.
    pub check_in: Date,

    /// Check-out date of the stay.
    pub check_out: Date,

    /// Drafts of the new [`Booking`]'s [`Line`]s.
    pub lines: Vec<LineDraft>,
}

/// Draft of a [`Line`] of a new [`Booking`].
#[derive(Clone, Copy, Debug)]
pub struct LineDraft {
    /// ID of the [`Rate`] to book.
    pub rate_id: rate::Id,

    /// Number of units to book.
    pub quantity: u32,
}

impl<Db> Command<CreateBooking> for Service<Db>
where
    Db: Storage<Transact, Err = Traced<storage::Error>>,
    Transacted<Db>: Storage<
            Select<By<Option<Rate>, rate::Id>>,
            Ok = Option<Rate>,
            Err = Traced<storage::Error>,
        > + Storage<
            Select<By<Option<Contract>, contract::Id>>,
            Ok = Option<Contract>,
            Err = Traced<storage::Error>,
        > + Storage<
            Select<By<Vec<Booking>, read::booking::NonCancelled>>,
            Ok = Vec<Booking>,
            Err = Traced<storage::Error>,
        > + Storage<Insert<Booking>, Err = Traced<storage::Error>>
        + Storage<Commit, Err = Traced<storage::Error>>,
{
    type Ok = Booking;
    type Err = Traced<ExecutionError>;

    async fn execute(
        &self,
        cmd: CreateBooking,
    ) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let CreateBooking {
            customer,
            check_in,
            check_out,
            lines,
        } = cmd;

        let stay = Stay {
            check_in,
            check_out,
        };
        let nights = u32::try_from(stay.nights())
            .ok()
            .filter(|n| *n > 0)
            .ok_or(E::InvalidStayWindow)
            .map_err(tracerr::wrap!())?;
        if lines.is_empty() {
            return Err(tracerr::new!(E::NoLines));
        }
        if lines.iter().any(|l| l.quantity == 0) {
            return Err(tracerr::new!(E::EmptyLine));
        }

        let tx = self
            .storage()
            .execute(Transact)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        let bookings = tx
            .execute(Select(By::<Vec<Booking>, _>::new(
                read::booking::NonCancelled,
            )))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        let mut drawn = HashMap::<pool::Id, u32>::new();
        let mut booked = Vec::with_capacity(lines.len());
        for draft in lines {
            let rate = tx
                .execute(Select(By::<Option<Rate>, _>::new(draft.rate_id)))
                .await
                .map_err(tracerr::map_from_and_wrap!(=> E))?
                .ok_or(E::RateNotExists(draft.rate_id))
                .map_err(tracerr::wrap!())?;

            let contract = match rate.contract_id {
                Some(contract_id) => {
                    let contract = tx
                        .execute(Select(By::<Option<Contract>, _>::new(
                            contract_id,
                        )))
                        .await
                        .map_err(tracerr::map_from_and_wrap!(=> E))?
                        .ok_or(E::ContractNotExists(contract_id))
                        .map_err(tracerr::wrap!())?;
                    if !contract.is_active() {
                        return Err(tracerr::new!(E::ContractTerminated(
                            contract_id
                        )));
                    }
                    Some(contract)
                }
                None => None,
            };

            let available =
                availability::units(&rate, contract.as_ref(), &bookings, stay)
                    .ok_or(E::RateNotBookable(rate.id))
                    .map_err(tracerr::wrap!())?;

            if !rate.is_buy_to_order() {
                let pool = rate
                    .pool_id
                    .ok_or(E::RateNotBookable(rate.id))
                    .map_err(tracerr::wrap!())?;
                // Lines drawing from one pool consume it together.
                let drawn = drawn.entry(pool).or_default();
                let remaining = available.saturating_sub(*drawn);
                if draft.quantity > remaining {
                    return Err(tracerr::new!(E::CapacityExceeded {
                        unit: rate.unit_id,
                        remaining,
                    }));
                }
                *drawn += draft.quantity;
            }

            let params = match contract.as_ref() {
                Some(contract) => RateSource::Contracted(contract),
                None => RateSource::BuyToOrder(CostParams::default()),
            }
            .cost_params()
            .overridden(&rate.cost_overrides);
            let breakdown = Breakdown::of(
                rate.amount,
                &params,
                rate.occupancy,
                nights,
                Some(rate.board_cost),
            );

            booked.push(Line {
                id: booking::LineId::new(),
                rate_id: rate.id,
                unit_id: rate.unit_id,
                occupancy: rate.occupancy,
                board: rate.board,
                quantity: draft.quantity,
                purchase: if rate.is_buy_to_order() {
                    Purchase::BuyToOrder
                } else {
                    Purchase::Inventory
                },
                price: Money::new(
                    breakdown.total.amount * Decimal::from(draft.quantity),
                    breakdown.total.currency,
                ),
                pool_id: rate.pool_id,
                conversion: None,
            });
        }

        let booking = Booking {
            id: booking::Id::new(),
            customer,
            check_in,
            check_out,
            status: Status::Pending,
            lines: booked,
            created_at: booking::CreationDateTime::now(),
        };
        tx.execute(Insert(booking.clone()))
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

/// Error of [`CreateBooking`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// A [`Line`]'s quantity exceeds the remaining capacity.
    #[display("`Unit(id: {unit})` has only {remaining} unit(s) available")]
    CapacityExceeded {
        /// ID of the [`inventory::Unit`] short on capacity.
        ///
        /// [`inventory::Unit`]: crate::domain::inventory::Unit
        unit: inventory::unit::Id,

        /// Number of units remaining available.
        remaining: u32,
    },

    /// [`Contract`] referenced by a [`Rate`] does not exist.
    #[display("`Contract(id: {_0})` does not exist")]
    ContractNotExists(#[error(not(source))] contract::Id),

    /// [`Contract`] referenced by a [`Rate`] is terminated.
    #[display("`Contract(id: {_0})` is terminated")]
    ContractTerminated(#[error(not(source))] contract::Id),

    /// A [`Line`] books zero units.
    #[display("`Line` must book at least one unit")]
    EmptyLine,

    /// The stay window is empty or reversed.
    #[display("`check_in` must precede `check_out`")]
    InvalidStayWindow,

    /// The [`Booking`] has no [`Line`]s.
    #[display("`Booking` must have at least one `Line`")]
    NoLines,

    /// [`Rate`] doesn't admit the requested stay.
    #[display("`Rate(id: {_0})` doesn't admit the requested stay")]
    RateNotBookable(#[error(not(source))] rate::Id),

    /// [`Rate`] with the provided ID does not exist.
    #[display("`Rate(id: {_0})` does not exist")]
    RateNotExists(#[error(not(source))] rate::Id),

    /// [`Storage`] error.
    #[display("`Storage` operation failed: {_0}")]
    #[from]
    Storage(storage::Error),
}

#[cfg(test)]
mod spec {
    use std::time::Duration;

    use common::{money::Currency, operations::Insert, Date, Money, Percent};
    use rust_decimal::Decimal;

    use crate::{
        command::{
            create_item::UnitDraft, CreateBooking, CreateContract,
            CreateItem, GenerateRates,
        },
        domain::{
            booking::{Customer, Purchase, Status},
            contract::{board, Allocation, BoardOption, OccupancyRate,
                Strategy, Supplier,
            },
            inventory::{self, unit::PaxBounds},
            pricing, rate,
            rate::Occupancy,
            Contract, Item, Rate,
        },
        infra::storage::InMemory,
        query::AvailableUnits,
        task, Command as _, Config, Service,
    };

    use super::{ExecutionError, LineDraft};

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

    async fn seeded(
        svc: &Service<InMemory>,
        quantity: u32,
        occupancy_rates: Vec<OccupancyRate>,
    ) -> (Item, Contract, Vec<Rate>) {
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
                occupancy_rates,
                allocations: vec![Allocation {
                    unit_ids: vec![item.units()[0].id],
                    quantity,
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

        (item, contract, rates)
    }

    fn default_rates() -> Vec<OccupancyRate> {
        vec![
            OccupancyRate {
                occupancy: Occupancy::Single,
                amount: usd("100"),
            },
            OccupancyRate {
                occupancy: Occupancy::Double,
                amount: usd("130"),
            },
            OccupancyRate {
                occupancy: Occupancy::Triple,
                amount: usd("150"),
            },
        ]
    }

    fn stay_dates() -> (Date, Date) {
        (
            Date::from_ymd(2025, 6, 10).unwrap(),
            Date::from_ymd(2025, 6, 12).unwrap(),
        )
    }

    #[tokio::test]
    async fn booking_decrements_every_occupancy_of_the_pool() {
        let svc = service();
        let (_item, _contract, rates) =
            seeded(&svc, 60, default_rates()).await;
        let (check_in, check_out) = stay_dates();

        let double = rates
            .iter()
            .find(|r| r.occupancy == Occupancy::Double)
            .unwrap();
        let booking = svc
            .execute(CreateBooking {
                customer: Customer::new("Ada Deane").unwrap(),
                check_in,
                check_out,
                lines: vec![LineDraft {
                    rate_id: double.id,
                    quantity: 2,
                }],
            })
            .await
            .unwrap();

        assert_eq!(booking.status, Status::Pending);
        assert_eq!(booking.lines[0].purchase, Purchase::Inventory);
        assert_eq!(booking.lines[0].pool_id, double.pool_id);
        // 130 a night, 2 nights, 2 rooms.
        assert_eq!(booking.lines[0].price, usd("520"));

        // Every occupancy variant of the shared pool drops to 58.
        for rate in &rates {
            let available = svc
                .execute(AvailableUnits {
                    rate_id: rate.id,
                    check_in,
                    check_out,
                })
                .await
                .unwrap();
            assert_eq!(available, Some(58), "occupancy {}", rate.occupancy);
        }
    }

    #[tokio::test]
    async fn refuses_to_oversubscribe_the_pool() {
        let svc = service();
        let (_item, _contract, rates) =
            seeded(&svc, 2, default_rates()).await;
        let (check_in, check_out) = stay_dates();

        let single = rates
            .iter()
            .find(|r| r.occupancy == Occupancy::Single)
            .unwrap();
        let triple = rates
            .iter()
            .find(|r| r.occupancy == Occupancy::Triple)
            .unwrap();

        // Two lines of the same pool are drawn together: 1 + 2 > 2.
        let err = svc
            .execute(CreateBooking {
                customer: Customer::new("Ada Deane").unwrap(),
                check_in,
                check_out,
                lines: vec![
                    LineDraft {
                        rate_id: single.id,
                        quantity: 1,
                    },
                    LineDraft {
                        rate_id: triple.id,
                        quantity: 2,
                    },
                ],
            })
            .await
            .unwrap_err();

        match err.split().0 {
            ExecutionError::CapacityExceeded { remaining, .. } => {
                assert_eq!(remaining, 1);
            }
            e => panic!("unexpected error: {e}"),
        }
    }

    #[tokio::test]
    async fn prices_lines_with_the_full_breakdown() {
        let svc = service();
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
                    amount: usd("120"),
                }],
                allocations: vec![Allocation {
                    unit_ids: vec![item.units()[0].id],
                    quantity: 10,
                    occupancy_rates: vec![],
                    base_rate: None,
                    pool_id: None,
                }],
                boards: vec![BoardOption {
                    board: board::Kind::HalfBoard,
                    cost: usd("15"),
                }],
                min_nights: None,
                max_nights: None,
                markup: Percent::ZERO,
                tax_rate: Percent::new(Decimal::TEN).unwrap(),
                city_tax: Some(usd("2.5")),
                resort_fee: Some(usd("5")),
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

        let booking = svc
            .execute(CreateBooking {
                customer: Customer::new("Ada Deane").unwrap(),
                check_in: Date::from_ymd(2025, 6, 10).unwrap(),
                check_out: Date::from_ymd(2025, 6, 13).unwrap(),
                lines: vec![LineDraft {
                    rate_id: rates[0].id,
                    quantity: 1,
                }],
            })
            .await
            .unwrap();

        // 120 × 3 + 15 × 2 × 3 + 2.5 × 2 × 3 + 5 × 3, plus 10% tax.
        assert_eq!(booking.lines[0].price, usd("528"));
    }

    #[tokio::test]
    async fn buy_to_order_line_skips_pool_accounting() {
        let svc = service();
        let rate = Rate {
            id: rate::Id::new(),
            contract_id: None,
            unit_id: inventory::unit::Id::new(),
            occupancy: Occupancy::Double,
            board: board::Kind::RoomOnly,
            amount: usd("70"),
            board_cost: Money::zero(Currency::Usd),
            valid_from: Some(Date::from_ymd(2025, 6, 1).unwrap()),
            valid_to: Some(Date::from_ymd(2025, 6, 30).unwrap()),
            min_nights: None,
            max_nights: None,
            cost_overrides: pricing::CostOverrides::default(),
            pool_id: None,
            active: true,
            created_at: rate::CreationDateTime::now(),
        };
        svc.storage()
            .execute(Insert(vec![rate.clone()]))
            .await
            .unwrap();
        let (check_in, check_out) = stay_dates();

        let booking = svc
            .execute(CreateBooking {
                customer: Customer::new("Ada Deane").unwrap(),
                check_in,
                check_out,
                lines: vec![LineDraft {
                    rate_id: rate.id,
                    quantity: 3,
                }],
            })
            .await
            .unwrap();

        assert_eq!(booking.lines[0].purchase, Purchase::BuyToOrder);
        assert_eq!(booking.lines[0].pool_id, None);
        assert_eq!(booking.lines[0].price, usd("420"));
    }

    #[tokio::test]
    async fn rejects_stays_outside_the_validity_window() {
        let svc = service();
        let (_item, _contract, rates) =
            seeded(&svc, 10, default_rates()).await;

        let err = svc
            .execute(CreateBooking {
                customer: Customer::new("Ada Deane").unwrap(),
                check_in: Date::from_ymd(2025, 12, 1).unwrap(),
                check_out: Date::from_ymd(2025, 12, 3).unwrap(),
                lines: vec![LineDraft {
                    rate_id: rates[0].id,
                    quantity: 1,
                }],
            })
            .await
            .unwrap_err();

        assert!(matches!(
            err.split().0,
            ExecutionError::RateNotBookable(_),
        ));
    }
}
