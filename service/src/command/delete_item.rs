//! [`Command`] for deleting an inventory [`Item`].

use common::operations::{By, Commit, Delete, Select, Transact, Transacted};
use derive_more::{Display, Error, From};
use tracerr::Traced;

use crate::{
    domain::{inventory, Item, Rate},
    infra::{storage, Storage},
    Service,
};

use super::Command;

/// [`Command`] for deleting an inventory [`Item`].
///
/// Deletion is refused while any [`Rate`] references one of the
/// [`Item`]'s units: referential integrity is enforced, never cascaded.
#[derive(Clone, Copy, Debug)]
pub struct DeleteItem {
    /// ID of the [`Item`] to delete.
    pub item_id: inventory::Id,
}

impl<Db> Command<DeleteItem> for Service<Db>
where
    Db: Storage<Transact, Err = Traced<storage::Error>>,
    Transacted<Db>: Storage<
            Select<By<Option<Item>, inventory::Id>>,
            Ok = Option<Item>,
            Err = Traced<storage::Error>,
        > + Storage<
            Select<By<Vec<Rate>, inventory::Id>>,
            Ok = Vec<Rate>,
            Err = Traced<storage::Error>,
        > + Storage<Delete<By<Item, inventory::Id>>, Err = Traced<storage::Error>>
        + Storage<Commit, Err = Traced<storage::Error>>,
{
    type Ok = Item;
    type Err = Traced<ExecutionError>;

    async fn execute(&self, cmd: DeleteItem) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let DeleteItem { item_id } = cmd;

        let tx = self
            .storage()
            .execute(Transact)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        let item = tx
            .execute(Select(By::<Option<Item>, _>::new(item_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .ok_or(E::ItemNotExists(item_id))
            .map_err(tracerr::wrap!())?;

        let rates = tx
            .execute(Select(By::<Vec<Rate>, _>::new(item_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;
        if !rates.is_empty() {
            return Err(tracerr::new!(E::ItemInUse(item_id)));
        }

        tx.execute(Delete(By::<Item, _>::new(item_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;

        tx.execute(Commit)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;

        Ok(item)
    }
}

/// Error of [`DeleteItem`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Item`] still has dependent [`Rate`]s.
    #[display("`Item(id: {_0})` is referenced by existing `Rate`s")]
    ItemInUse(#[error(not(source))] inventory::Id),

    /// [`Item`] with the provided ID does not exist.
    #[display("`Item(id: {_0})` does not exist")]
    ItemNotExists(#[error(not(source))] inventory::Id),

    /// [`Storage`] error.
    #[display("`Storage` operation failed: {_0}")]
    #[from]
    Storage(storage::Error),
}
