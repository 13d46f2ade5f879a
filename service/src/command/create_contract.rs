//! [`Command`] for creating a new [`Contract`].

use common::{
    money::Currency,
    operations::{By, Insert, Select},
    Date, Money, Percent,
};
use derive_more::{Display, Error, From};
use tracerr::Traced;

use crate::{
    domain::{
        contract::{
            self, Allocation, BoardOption, OccupancyRate, Strategy, Supplier,
        },
        inventory, Contract, Item,
    },
    infra::{storage, Storage},
    Service,
};

use super::Command;

/// [`Command`] for creating a new [`Contract`].
#[derive(Clone, Debug)]
pub struct CreateContract {
    /// [`Supplier`] the new [`Contract`] is signed with.
    pub supplier: Supplier,

    /// ID of the [`Item`] the new [`Contract`] commits inventory of.
    pub item_id: inventory::Id,

    /// [`Currency`] of the new [`Contract`]'s amounts.
    pub currency: Currency,

    /// First stay date the new [`Contract`] covers.
    pub valid_from: Date,

    /// Last stay date the new [`Contract`] covers.
    pub valid_to: Date,

    /// Pricing [`Strategy`] of the new [`Contract`].
    pub strategy: Strategy,

    /// Flat nightly rate ([`Strategy::FlatRate`]).
    pub base_rate: Option<Money>,

    /// Contract-level nightly rates per occupancy
    /// ([`Strategy::PerOccupancy`]).
    pub occupancy_rates: Vec<OccupancyRate>,

    /// [`Allocation`]s the new [`Contract`] commits.
    pub allocations: Vec<Allocation>,

    /// [`BoardOption`]s bookable under the new [`Contract`].
    pub boards: Vec<BoardOption>,

    /// Default minimum stay length, in nights.
    pub min_nights: Option<u32>,

    /// Default maximum stay length, in nights.
    pub max_nights: Option<u32>,

    /// Operator markup.
    pub markup: Percent,

    /// Tax rate applied on a stay's subtotal.
    pub tax_rate: Percent,

    /// City tax per person per night.
    pub city_tax: Option<Money>,

    /// Resort fee per room per night.
    pub resort_fee: Option<Money>,

    /// Supplier commission.
    pub commission: Percent,
}

impl<Db> Command<CreateContract> for Service<Db>
where
    Db: Storage<
            Select<By<Option<Item>, inventory::Id>>,
            Ok = Option<Item>,
            Err = Traced<storage::Error>,
        > + Storage<Insert<Contract>, Err = Traced<storage::Error>>,
{
    type Ok = Contract;
    type Err = Traced<ExecutionError>;

    async fn execute(
        &self,
        cmd: CreateContract,
    ) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let CreateContract {
            supplier,
            item_id,
            currency,
            valid_from,
            valid_to,
            strategy,
            base_rate,
            occupancy_rates,
            allocations,
            boards,
            min_nights,
            max_nights,
            markup,
            tax_rate,
            city_tax,
            resort_fee,
            commission,
        } = cmd;

        if valid_to < valid_from {
            return Err(tracerr::new!(E::InvalidValidityWindow));
        }
        if let (Some(min), Some(max)) = (min_nights, max_nights) {
            if max < min {
                return Err(tracerr::new!(E::InvalidNightBounds));
            }
        }
        if allocations.is_empty() {
            return Err(tracerr::new!(E::NoAllocations));
        }
        if allocations
            .iter()
            .any(|a| a.unit_ids.is_empty() || a.quantity == 0)
        {
            return Err(tracerr::new!(E::EmptyAllocation));
        }

        let unpriced = match strategy {
            Strategy::FlatRate => {
                base_rate.is_none()
                    && allocations.iter().any(|a| a.base_rate.is_none())
            }
            Strategy::PerOccupancy => {
                occupancy_rates.is_empty()
                    && allocations
                        .iter()
                        .any(|a| a.occupancy_rates.is_empty())
            }
        };
        if unpriced {
            return Err(tracerr::new!(E::UnpricedAllocation));
        }

        self.storage()
            .execute(Select(By::<Option<Item>, _>::new(item_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .ok_or(E::ItemNotExists(item_id))
            .map_err(tracerr::wrap!())
            .map(drop)?;

        let contract = Contract {
            id: contract::Id::new(),
            supplier,
            item_id,
            currency,
            valid_from,
            valid_to,
            strategy,
            base_rate,
            occupancy_rates,
            allocations,
            boards,
            min_nights,
            max_nights,
            markup,
            tax_rate,
            city_tax,
            resort_fee,
            commission,
            created_at: contract::CreationDateTime::now(),
            terminated_at: None,
        };
        self.storage()
            .execute(Insert(contract.clone()))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;

        Ok(contract)
    }
}

/// Error of [`CreateContract`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// An [`Allocation`] commits no units.
    #[display("`Allocation` must commit at least one unit")]
    EmptyAllocation,

    /// The minimum night bound exceeds the maximum one.
    #[display("`min_nights` must not exceed `max_nights`")]
    InvalidNightBounds,

    /// The validity window is reversed.
    #[display("`valid_from` must not exceed `valid_to`")]
    InvalidValidityWindow,

    /// [`Item`] with the provided ID does not exist.
    #[display("`Item(id: {_0})` does not exist")]
    ItemNotExists(#[error(not(source))] inventory::Id),

    /// [`Contract`] commits no [`Allocation`]s.
    #[display("`Contract` must commit at least one `Allocation`")]
    NoAllocations,

    /// [`Storage`] error.
    #[display("`Storage` operation failed: {_0}")]
    #[from]
    Storage(storage::Error),

    /// An [`Allocation`] resolves to no price under the chosen
    /// [`Strategy`].
    #[display("`Allocation` has no price under the chosen strategy")]
    UnpricedAllocation,
}
