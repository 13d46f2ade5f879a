//! [`Command`] for partially updating a [`Contract`].

use common::{
    operations::{By, Commit, Select, Transact, Transacted, Update},
    Date, Money, Percent,
};
use derive_more::{Display, Error, From};
use tracerr::Traced;

use crate::{
    domain::{
        contract::{self, BoardOption, Supplier},
        Contract,
    },
    infra::{storage, Storage},
    Service,
};

use super::Command;

/// [`Command`] for partially updating a [`Contract`].
///
/// Only the provided fields are touched. Allocations, strategy and the
/// already generated rates are out of its reach: repricing goes through
/// regeneration.
#[derive(Clone, Debug)]
pub struct UpdateContract {
    /// ID of the [`Contract`] to update.
    pub contract_id: contract::Id,

    /// New [`Supplier`], if provided.
    pub supplier: Option<Supplier>,

    /// New first covered stay date, if provided.
    pub valid_from: Option<Date>,

    /// New last covered stay date, if provided.
    pub valid_to: Option<Date>,

    /// New [`BoardOption`]s, if provided.
    pub boards: Option<Vec<BoardOption>>,

    /// New minimum stay length, if provided.
    pub min_nights: Option<u32>,

    /// New maximum stay length, if provided.
    pub max_nights: Option<u32>,

    /// New operator markup, if provided.
    pub markup: Option<Percent>,

    /// New tax rate, if provided.
    pub tax_rate: Option<Percent>,

    /// New city tax per person per night, if provided.
    pub city_tax: Option<Money>,

    /// New resort fee per room per night, if provided.
    pub resort_fee: Option<Money>,

    /// New supplier commission, if provided.
    pub commission: Option<Percent>,
}

impl<Db> Command<UpdateContract> for Service<Db>
where
    Db: Storage<Transact, Err = Traced<storage::Error>>,
    Transacted<Db>: Storage<
            Select<By<Option<Contract>, contract::Id>>,
            Ok = Option<Contract>,
            Err = Traced<storage::Error>,
        > + Storage<Update<Contract>, Err = Traced<storage::Error>>
        + Storage<Commit, Err = Traced<storage::Error>>,
{
    type Ok = Contract;
    type Err = Traced<ExecutionError>;

    async fn execute(
        &self,
        cmd: UpdateContract,
    ) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let UpdateContract {
            contract_id,
            supplier,
            valid_from,
            valid_to,
            boards,
            min_nights,
            max_nights,
            markup,
            tax_rate,
            city_tax,
            resort_fee,
            commission,
        } = cmd;

        let tx = self
            .storage()
            .execute(Transact)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        let mut contract = tx
            .execute(Select(By::<Option<Contract>, _>::new(contract_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .ok_or(E::ContractNotExists(contract_id))
            .map_err(tracerr::wrap!())?;
        if !contract.is_active() {
            return Err(tracerr::new!(E::ContractTerminated(contract_id)));
        }

        if let Some(supplier) = supplier {
            contract.supplier = supplier;
        }
        if let Some(from) = valid_from {
            contract.valid_from = from;
        }
        if let Some(to) = valid_to {
            contract.valid_to = to;
        }
        if let Some(boards) = boards {
            contract.boards = boards;
        }
        if let Some(min) = min_nights {
            contract.min_nights = Some(min);
        }
        if let Some(max) = max_nights {
            contract.max_nights = Some(max);
        }
        if let Some(markup) = markup {
            contract.markup = markup;
        }
        if let Some(tax_rate) = tax_rate {
            contract.tax_rate = tax_rate;
        }
        if let Some(city_tax) = city_tax {
            contract.city_tax = Some(city_tax);
        }
        if let Some(resort_fee) = resort_fee {
            contract.resort_fee = Some(resort_fee);
        }
        if let Some(commission) = commission {
            contract.commission = commission;
        }

        if contract.valid_to < contract.valid_from {
            return Err(tracerr::new!(E::InvalidValidityWindow));
        }
        if let (Some(min), Some(max)) =
            (contract.min_nights, contract.max_nights)
        {
            if max < min {
                return Err(tracerr::new!(E::InvalidNightBounds));
            }
        }

        tx.execute(Update(contract.clone()))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;

        tx.execute(Commit)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;

        Ok(contract)
    }
}

/// Error of [`UpdateContract`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Contract`] with the provided ID does not exist.
    #[display("`Contract(id: {_0})` does not exist")]
    ContractNotExists(#[error(not(source))] contract::Id),

    /// [`Contract`] is terminated.
    #[display("`Contract(id: {_0})` is terminated")]
    ContractTerminated(#[error(not(source))] contract::Id),

    /// The night bounds are reversed after the patch.
    #[display("`min_nights` must not exceed `max_nights`")]
    InvalidNightBounds,

    /// The validity window is reversed after the patch.
    #[display("`valid_from` must not exceed `valid_to`")]
    InvalidValidityWindow,

    /// [`Storage`] error.
    #[display("`Storage` operation failed: {_0}")]
    #[from]
    Storage(storage::Error),
}
