//! [`Query`] finding buy-to-order conversion candidates.

use common::operations::{By, Select};
use derive_more::{Display, Error, From};
use tracerr::Traced;

use crate::{
    domain::{contract, conversion, Booking, Contract, Rate},
    infra::{storage, Storage},
    read, Service,
};

use super::Query;

/// [`Query`] finding the buy-to-order booking lines that could be
/// remapped onto the inventory of the provided (presumably newly signed)
/// [`Contract`].
#[derive(Clone, Copy, Debug)]
pub struct ConversionCandidates {
    /// ID of the [`Contract`] to source from.
    pub contract_id: contract::Id,
}

impl<Db> Query<ConversionCandidates> for Service<Db>
where
    Db: Storage<
            Select<By<Option<Contract>, contract::Id>>,
            Ok = Option<Contract>,
            Err = Traced<storage::Error>,
        > + Storage<
            Select<By<Vec<Rate>, contract::Id>>,
            Ok = Vec<Rate>,
            Err = Traced<storage::Error>,
        > + Storage<
            Select<By<Vec<Booking>, read::booking::WithBuyToOrder>>,
            Ok = Vec<Booking>,
            Err = Traced<storage::Error>,
        >,
{
    type Ok = Vec<conversion::Candidate>;
    type Err = Traced<ExecutionError>;

    async fn execute(
        &self,
        query: ConversionCandidates,
    ) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let ConversionCandidates { contract_id } = query;

        let contract = self
            .storage()
            .execute(Select(By::<Option<Contract>, _>::new(contract_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .ok_or(E::ContractNotExists(contract_id))
            .map_err(tracerr::wrap!())?;
        if !contract.is_active() {
            return Err(tracerr::new!(E::ContractTerminated(contract_id)));
        }

        let rates = self
            .storage()
            .execute(Select(By::<Vec<Rate>, _>::new(contract_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;
        let bookings = self
            .storage()
            .execute(Select(By::<Vec<Booking>, _>::new(
                read::booking::WithBuyToOrder,
            )))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        Ok(conversion::candidates(&contract, &rates, &bookings))
    }
}

/// Error of [`ConversionCandidates`] [`Query`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Contract`] with the provided ID does not exist.
    #[display("`Contract(id: {_0})` does not exist")]
    ContractNotExists(#[error(not(source))] contract::Id),

    /// [`Contract`] is terminated.
    #[display("`Contract(id: {_0})` is terminated")]
    ContractTerminated(#[error(not(source))] contract::Id),

    /// [`Storage`] error.
    #[display("`Storage` operation failed: {_0}")]
    #[from]
    Storage(storage::Error),
}
