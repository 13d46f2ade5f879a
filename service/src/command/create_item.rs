//! [`Command`] for creating a new inventory [`Item`].

use common::operations::Insert;
use derive_more::{Display, Error, From};
use tracerr::Traced;

use crate::{
    domain::{
        inventory::{self, unit::PaxBounds, Hotel, Ticket, Transfer, Unit},
        Item,
    },
    infra::{storage, Storage},
    Service,
};

use super::Command;

/// [`Command`] for creating a new inventory [`Item`].
#[derive(Clone, Debug)]
pub struct CreateItem {
    /// [`Kind`] of the new [`Item`].
    ///
    /// [`Kind`]: inventory::Kind
    pub kind: inventory::Kind,

    /// Name of the new [`Item`].
    pub name: inventory::Name,

    /// Drafts of the new [`Item`]'s sellable [`Unit`]s.
    pub units: Vec<UnitDraft>,
}

/// Draft of a sellable [`Unit`] of a new [`Item`].
#[derive(Clone, Debug)]
pub struct UnitDraft {
    /// Name of the [`Unit`].
    pub name: inventory::unit::Name,

    /// Guest capacity bounds of the [`Unit`].
    pub pax: PaxBounds,
}

impl<Db> Command<CreateItem> for Service<Db>
where
    Db: Storage<Insert<Item>, Err = Traced<storage::Error>>,
{
    type Ok = Item;
    type Err = Traced<ExecutionError>;

    async fn execute(&self, cmd: CreateItem) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let CreateItem { kind, name, units } = cmd;

        if units.is_empty() {
            return Err(tracerr::new!(E::NoUnits));
        }

        let units = units
            .into_iter()
            .map(|draft| Unit {
                id: inventory::unit::Id::new(),
                name: draft.name,
                pax: draft.pax,
            })
            .collect::<Vec<_>>();

        let id = inventory::Id::new();
        let created_at = inventory::CreationDateTime::now();
        let item = match kind {
            inventory::Kind::Hotel => Item::from(Hotel {
                id,
                name,
                room_groups: units,
                created_at,
            }),
            inventory::Kind::Transfer => Item::from(Transfer {
                id,
                name,
                categories: units,
                created_at,
            }),
            inventory::Kind::Ticket => Item::from(Ticket {
                id,
                name,
                categories: units,
                created_at,
            }),
        };

        self.storage()
            .execute(Insert(item.clone()))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;

        Ok(item)
    }
}

/// Error of [`CreateItem`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Item`] has no sellable [`Unit`]s.
    #[display("`Item` must have at least one `Unit`")]
    NoUnits,

    /// [`Storage`] error.
    #[display("`Storage` operation failed: {_0}")]
    #[from]
    Storage(storage::Error),
}
