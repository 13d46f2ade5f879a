//! [`Rate`]-related [`Storage`] implementations.

use common::operations::{By, Insert, Select};
use tracerr::Traced;

use crate::{
    domain::{contract, inventory, rate, Rate},
    infra::{
        storage::{
            self,
            memory::{Access, Error, InMemory},
        },
        Storage,
    },
};

impl<A: Access> Storage<Insert<Vec<Rate>>> for InMemory<A> {
    type Ok = ();
    type Err = Traced<storage::Error>;

    async fn execute(
        &self,
        Insert(rates): Insert<Vec<Rate>>,
    ) -> Result<Self::Ok, Self::Err> {
        self.0
            .with(|state| {
                for rate in &rates {
                    if state.rates.iter().any(|r| r.id == rate.id) {
                        return Err(Error::Collision(format!(
                            "Rate(id: {})",
                            rate.id,
                        )));
                    }
                }
                state.rates.extend(rates);
                Ok(())
            })
            .await
            .map_err(tracerr::from_and_wrap!(=> storage::Error))
    }
}

impl<A: Access> Storage<Select<By<Option<Rate>, rate::Id>>> for InMemory<A> {
    type Ok = Option<Rate>;
    type Err = Traced<storage::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Option<Rate>, rate::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        let id = by.into_inner();
        Ok(self
            .0
            .with(|state| state.rates.iter().find(|r| r.id == id).cloned())
            .await)
    }
}

impl<A: Access> Storage<Select<By<Vec<Rate>, contract::Id>>> for InMemory<A> {
    type Ok = Vec<Rate>;
    type Err = Traced<storage::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Vec<Rate>, contract::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        let id = by.into_inner();
        Ok(self
            .0
            .with(|state| {
                state
                    .rates
                    .iter()
                    .filter(|r| r.contract_id == Some(id))
                    .cloned()
                    .collect()
            })
            .await)
    }
}

impl<A: Access> Storage<Select<By<Vec<Rate>, inventory::Id>>> for InMemory<A> {
    type Ok = Vec<Rate>;
    type Err = Traced<storage::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Vec<Rate>, inventory::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        let item_id = by.into_inner();
        Ok(self
            .0
            .with(|state| {
                let Some(item) =
                    state.items.iter().find(|i| i.id() == item_id)
                else {
                    return Vec::new();
                };
                state
                    .rates
                    .iter()
                    .filter(|r| item.unit(r.unit_id).is_some())
                    .cloned()
                    .collect()
            })
            .await)
    }
}
