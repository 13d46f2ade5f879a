//! [`Query`] aggregating the distinct capacity of a whole [`Item`].

use common::{
    operations::{By, Select},
    Date,
};
use derive_more::{Display, Error, From};
use tracerr::Traced;
use tracing as log;

use crate::{
    domain::{
        availability::{self, Stay},
        inventory, Booking, Contract, Item, Rate,
    },
    infra::{storage, Storage},
    read, Service,
};

use super::Query;

/// [`Query`] aggregating the remaining capacity across a whole [`Item`]
/// for display purposes.
///
/// Each unique allocation is counted exactly once, however many
/// occupancy variants expose it. Rates referencing a missing
/// [`Contract`] are skipped with a warning rather than failing the whole
/// aggregation.
#[derive(Clone, Copy, Debug)]
pub struct ItemAvailability {
    /// ID of the [`Item`] to aggregate.
    pub item_id: inventory::Id,

    /// Check-in date of the stay.
    pub check_in: Date,

    /// Check-out date of the stay.
    pub check_out: Date,
}

impl<Db> Query<ItemAvailability> for Service<Db>
where
    Db: Storage<
            Select<By<Option<Item>, inventory::Id>>,
            Ok = Option<Item>,
            Err = Traced<storage::Error>,
        > + Storage<
            Select<By<Vec<Rate>, inventory::Id>>,
            Ok = Vec<Rate>,
            Err = Traced<storage::Error>,
        > + Storage<
            Select<By<Vec<Contract>, inventory::Id>>,
            Ok = Vec<Contract>,
            Err = Traced<storage::Error>,
        > + Storage<
            Select<By<Vec<Booking>, read::booking::NonCancelled>>,
            Ok = Vec<Booking>,
            Err = Traced<storage::Error>,
        >,
{
    type Ok = u32;
    type Err = Traced<ExecutionError>;

    async fn execute(
        &self,
        query: ItemAvailability,
    ) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let ItemAvailability {
            item_id,
            check_in,
            check_out,
        } = query;

        self.storage()
            .execute(Select(By::<Option<Item>, _>::new(item_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .ok_or(E::ItemNotExists(item_id))
            .map_err(tracerr::wrap!())
            .map(drop)?;

        let rates = self
            .storage()
            .execute(Select(By::<Vec<Rate>, _>::new(item_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;
        let contracts = self
            .storage()
            .execute(Select(By::<Vec<Contract>, _>::new(item_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;
        let bookings = self
            .storage()
            .execute(Select(By::<Vec<Booking>, _>::new(
                read::booking::NonCancelled,
            )))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        for rate in &rates {
            if let Some(contract_id) = rate.contract_id {
                if !contracts.iter().any(|c| c.id == contract_id) {
                    log::warn!(
                        "`Rate(id: {})` references missing \
                         `Contract(id: {contract_id})`, skipping",
                        rate.id,
                    );
                }
            }
        }
        let active = contracts
            .into_iter()
            .filter(Contract::is_active)
            .collect::<Vec<_>>();

        Ok(availability::distinct_capacity(
            &rates,
            &active,
            &bookings,
            Stay {
                check_in,
                check_out,
            },
        ))
    }
}

/// Error of [`ItemAvailability`] [`Query`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Item`] with the provided ID does not exist.
    #[display("`Item(id: {_0})` does not exist")]
    ItemNotExists(#[error(not(source))] inventory::Id),

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
            create_item::UnitDraft, CreateContract, CreateItem,
            GenerateRates,
        },
        domain::{
            contract::{Allocation, OccupancyRate, Strategy, Supplier},
            inventory::{self, unit::PaxBounds},
            rate::Occupancy,
        },
        infra::storage::InMemory,
        task, Command as _, Config, Service,
    };

    use super::ItemAvailability;

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
    async fn counts_a_shared_pool_once_across_occupancies() {
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
                occupancy_rates: vec![
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
                    OccupancyRate {
                        occupancy: Occupancy::Quad,
                        amount: usd("170"),
                    },
                ],
                allocations: vec![Allocation {
                    unit_ids: vec![item.units()[0].id],
                    quantity: 50,
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
        assert_eq!(rates.len(), 4);

        // 50 physical rooms exposed as 4 occupancy rates are still 50.
        let total = svc
            .execute(ItemAvailability {
                item_id: item.id(),
                check_in: Date::from_ymd(2025, 6, 10).unwrap(),
                check_out: Date::from_ymd(2025, 6, 12).unwrap(),
            })
            .await
            .unwrap();
        assert_eq!(total, 50);
    }
}
