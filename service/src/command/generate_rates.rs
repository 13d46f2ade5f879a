//! [`Command`] for generating the rate matrix of a [`Contract`].

use common::operations::{By, Insert, Select};
use derive_more::{Display, Error, From};
use tracerr::Traced;

use crate::{
    domain::{contract, inventory, Contract, Item, Rate},
    infra::{storage, Storage},
    Service,
};

use super::Command;

/// [`Command`] for generating the rate matrix of a [`Contract`].
///
/// Produced [`Rate`]s are appended to the stored collection, never
/// replacing the previously generated ones of the same [`Contract`].
#[derive(Clone, Copy, Debug)]
pub struct GenerateRates {
    /// ID of the [`Contract`] to expand.
    pub contract_id: contract::Id,
}

impl<Db> Command<GenerateRates> for Service<Db>
where
    Db: Storage<
            Select<By<Option<Contract>, contract::Id>>,
            Ok = Option<Contract>,
            Err = Traced<storage::Error>,
        > + Storage<
            Select<By<Option<Item>, inventory::Id>>,
            Ok = Option<Item>,
            Err = Traced<storage::Error>,
        > + Storage<Insert<Vec<Rate>>, Err = Traced<storage::Error>>,
{
    type Ok = Vec<Rate>;
    type Err = Traced<ExecutionError>;

    async fn execute(
        &self,
        cmd: GenerateRates,
    ) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let GenerateRates { contract_id } = cmd;

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

        let item = self
            .storage()
            .execute(Select(By::<Option<Item>, _>::new(contract.item_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .ok_or(E::ItemNotExists(contract.item_id))
            .map_err(tracerr::wrap!())?;

        let rates = Rate::generate(&contract, &item);
        self.storage()
            .execute(Insert(rates.clone()))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;

        Ok(rates)
    }
}

/// Error of [`GenerateRates`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Contract`] with the provided ID does not exist.
    #[display("`Contract(id: {_0})` does not exist")]
    ContractNotExists(#[error(not(source))] contract::Id),

    /// [`Contract`] is terminated.
    #[display("`Contract(id: {_0})` is terminated")]
    ContractTerminated(#[error(not(source))] contract::Id),

    /// [`Item`] of the [`Contract`] does not exist.
    #[display("`Item(id: {_0})` does not exist")]
    ItemNotExists(#[error(not(source))] inventory::Id),

    /// [`Storage`] error.
    #[display("`Storage` operation failed: {_0}")]
    #[from]
    Storage(storage::Error),
}
