//! [`Command`] for deleting a [`Contract`].

use common::operations::{By, Commit, Delete, Select, Transact, Transacted};
use derive_more::{Display, Error, From};
use tracerr::Traced;

use crate::{
    domain::{contract, Contract},
    infra::{storage, Storage},
    read,
    Service,
};

use super::Command;

/// [`Command`] for deleting a [`Contract`].
///
/// Deletion is refused while dependent rates or bookings exist:
/// referential integrity is enforced, never cascaded.
#[derive(Clone, Copy, Debug)]
pub struct DeleteContract {
    /// ID of the [`Contract`] to delete.
    pub contract_id: contract::Id,
}

impl<Db> Command<DeleteContract> for Service<Db>
where
    Db: Storage<Transact, Err = Traced<storage::Error>>,
    Transacted<Db>: Storage<
            Select<By<Option<Contract>, contract::Id>>,
            Ok = Option<Contract>,
            Err = Traced<storage::Error>,
        > + Storage<
            Select<By<read::contract::Dependents, contract::Id>>,
            Ok = read::contract::Dependents,
            Err = Traced<storage::Error>,
        > + Storage<
            Delete<By<Contract, contract::Id>>,
            Err = Traced<storage::Error>,
        > + Storage<Commit, Err = Traced<storage::Error>>,
{
    type Ok = Contract;
    type Err = Traced<ExecutionError>;

    async fn execute(
        &self,
        cmd: DeleteContract,
    ) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let DeleteContract { contract_id } = cmd;

        let tx = self
            .storage()
            .execute(Transact)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        let contract = tx
            .execute(Select(By::<Option<Contract>, _>::new(contract_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .ok_or(E::ContractNotExists(contract_id))
            .map_err(tracerr::wrap!())?;

        let dependents = tx
            .execute(Select(By::<read::contract::Dependents, _>::new(
                contract_id,
            )))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;
        if dependents.bookings {
            return Err(tracerr::new!(E::ContractHasBookings(contract_id)));
        }
        if dependents.rates {
            return Err(tracerr::new!(E::ContractHasRates(contract_id)));
        }

        tx.execute(Delete(By::<Contract, _>::new(contract_id)))
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

/// Error of [`DeleteContract`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Contract`] still has dependent bookings.
    #[display("`Contract(id: {_0})` is referenced by existing bookings")]
    ContractHasBookings(#[error(not(source))] contract::Id),

    /// [`Contract`] still has dependent rates.
    #[display("`Contract(id: {_0})` is referenced by existing rates")]
    ContractHasRates(#[error(not(source))] contract::Id),

    /// [`Contract`] with the provided ID does not exist.
    #[display("`Contract(id: {_0})` does not exist")]
    ContractNotExists(#[error(not(source))] contract::Id),

    /// [`Storage`] error.
    #[display("`Storage` operation failed: {_0}")]
    #[from]
    Storage(storage::Error),
}
