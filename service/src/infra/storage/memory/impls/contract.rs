//! [`Contract`]-related [`Storage`] implementations.

use common::operations::{By, Delete, Insert, Select, Update};
use tracerr::Traced;

use crate::{
    domain::{contract, inventory, Contract},
    infra::{
        storage::{
            self,
            memory::{Access, Error, InMemory},
        },
        Storage,
    },
    read,
};

impl<A: Access> Storage<Insert<Contract>> for InMemory<A> {
    type Ok = ();
    type Err = Traced<storage::Error>;

    async fn execute(
        &self,
        Insert(contract): Insert<Contract>,
    ) -> Result<Self::Ok, Self::Err> {
        self.0
            .with(|state| {
                if state.contracts.iter().any(|c| c.id == contract.id) {
                    return Err(Error::Collision(format!(
                        "Contract(id: {})",
                        contract.id,
                    )));
                }
                state.contracts.push(contract);
                Ok(())
            })
            .await
            .map_err(tracerr::from_and_wrap!(=> storage::Error))
    }
}

impl<A: Access> Storage<Update<Contract>> for InMemory<A> {
    type Ok = ();
    type Err = Traced<storage::Error>;

    async fn execute(
        &self,
        Update(contract): Update<Contract>,
    ) -> Result<Self::Ok, Self::Err> {
        self.0
            .with(|state| {
                let stored = state
                    .contracts
                    .iter_mut()
                    .find(|c| c.id == contract.id)
                    .ok_or_else(|| {
                        Error::Missing(format!(
                            "Contract(id: {})",
                            contract.id,
                        ))
                    })?;
                *stored = contract;
                Ok::<(), Error>(())
            })
            .await
            .map_err(tracerr::from_and_wrap!(=> storage::Error))
    }
}

impl<A: Access> Storage<Delete<By<Contract, contract::Id>>> for InMemory<A> {
    type Ok = ();
    type Err = Traced<storage::Error>;

    async fn execute(
        &self,
        Delete(by): Delete<By<Contract, contract::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        let id = by.into_inner();
        self.0
            .with(|state| {
                let len = state.contracts.len();
                state.contracts.retain(|c| c.id != id);
                if state.contracts.len() == len {
                    return Err(Error::Missing(format!(
                        "Contract(id: {id})",
                    )));
                }
                Ok(())
            })
            .await
            .map_err(tracerr::from_and_wrap!(=> storage::Error))
    }
}

impl<A: Access> Storage<Select<By<Option<Contract>, contract::Id>>>
    for InMemory<A>
{
    type Ok = Option<Contract>;
    type Err = Traced<storage::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Option<Contract>, contract::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        let id = by.into_inner();
        Ok(self
            .0
            .with(|state| {
                state.contracts.iter().find(|c| c.id == id).cloned()
            })
            .await)
    }
}

impl<A: Access> Storage<Select<By<Vec<Contract>, inventory::Id>>>
    for InMemory<A>
{
    type Ok = Vec<Contract>;
    type Err = Traced<storage::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Vec<Contract>, inventory::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        let item_id = by.into_inner();
        Ok(self
            .0
            .with(|state| {
                state
                    .contracts
                    .iter()
                    .filter(|c| c.item_id == item_id)
                    .cloned()
                    .collect()
            })
            .await)
    }
}

impl<A: Access> Storage<Select<By<Vec<Contract>, ()>>> for InMemory<A> {
    type Ok = Vec<Contract>;
    type Err = Traced<storage::Error>;

    async fn execute(
        &self,
        Select(_): Select<By<Vec<Contract>, ()>>,
    ) -> Result<Self::Ok, Self::Err> {
        Ok(self.0.with(|state| state.contracts.clone()).await)
    }
}

impl<A: Access>
    Storage<Select<By<read::contract::Dependents, contract::Id>>>
    for InMemory<A>
{
    type Ok = read::contract::Dependents;
    type Err = Traced<storage::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<read::contract::Dependents, contract::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        let id = by.into_inner();
        Ok(self
            .0
            .with(|state| {
                let rate_ids = state
                    .rates
                    .iter()
                    .filter(|r| r.contract_id == Some(id))
                    .map(|r| r.id)
                    .collect::<Vec<_>>();
                let bookings = state.bookings.iter().any(|b| {
                    b.lines.iter().any(|l| rate_ids.contains(&l.rate_id))
                });
                read::contract::Dependents {
                    rates: !rate_ids.is_empty(),
                    bookings,
                }
            })
            .await)
    }
}
