//! [`Item`]-related [`Storage`] implementations.

use common::operations::{By, Delete, Insert, Select};
use tracerr::Traced;

use crate::{
    domain::{inventory, Item},
    infra::{
        storage::{
            self,
            memory::{Access, Error, InMemory},
        },
        Storage,
    },
};

impl<A: Access> Storage<Insert<Item>> for InMemory<A> {
    type Ok = ();
    type Err = Traced<storage::Error>;

    async fn execute(
        &self,
        Insert(item): Insert<Item>,
    ) -> Result<Self::Ok, Self::Err> {
        self.0
            .with(|state| {
                if state.items.iter().any(|i| i.id() == item.id()) {
                    return Err(Error::Collision(format!(
                        "Item(id: {})",
                        item.id(),
                    )));
                }
                state.items.push(item);
                Ok(())
            })
            .await
            .map_err(tracerr::from_and_wrap!(=> storage::Error))
    }
}

impl<A: Access> Storage<Select<By<Option<Item>, inventory::Id>>>
    for InMemory<A>
{
    type Ok = Option<Item>;
    type Err = Traced<storage::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Option<Item>, inventory::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        let id = by.into_inner();
        Ok(self
            .0
            .with(|state| {
                state.items.iter().find(|i| i.id() == id).cloned()
            })
            .await)
    }
}

impl<A: Access> Storage<Delete<By<Item, inventory::Id>>> for InMemory<A> {
    type Ok = ();
    type Err = Traced<storage::Error>;

    async fn execute(
        &self,
        Delete(by): Delete<By<Item, inventory::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        let id = by.into_inner();
        self.0
            .with(|state| {
                let len = state.items.len();
                state.items.retain(|i| i.id() != id);
                if state.items.len() == len {
                    return Err(Error::Missing(format!("Item(id: {id})")));
                }
                Ok(())
            })
            .await
            .map_err(tracerr::from_and_wrap!(=> storage::Error))
    }
}
