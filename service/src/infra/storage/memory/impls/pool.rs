//! [`AllocationPool`]-related [`Storage`] implementations.

use common::operations::{By, Insert, Select, Update};
use tracerr::Traced;

use crate::{
    domain::{pool, AllocationPool},
    infra::{
        storage::{
            self,
            memory::{Access, Error, InMemory},
        },
        Storage,
    },
};

impl<A: Access> Storage<Insert<AllocationPool>> for InMemory<A> {
    type Ok = ();
    type Err = Traced<storage::Error>;

    async fn execute(
        &self,
        Insert(pool): Insert<AllocationPool>,
    ) -> Result<Self::Ok, Self::Err> {
        self.0
            .with(|state| {
                if state.pools.iter().any(|p| p.id == pool.id) {
                    return Err(Error::Collision(format!(
                        "AllocationPool(id: {})",
                        pool.id,
                    )));
                }
                state.pools.push(pool);
                Ok(())
            })
            .await
            .map_err(tracerr::from_and_wrap!(=> storage::Error))
    }
}

impl<A: Access> Storage<Update<AllocationPool>> for InMemory<A> {
    type Ok = ();
    type Err = Traced<storage::Error>;

    async fn execute(
        &self,
        Update(pool): Update<AllocationPool>,
    ) -> Result<Self::Ok, Self::Err> {
        self.0
            .with(|state| {
                let stored = state
                    .pools
                    .iter_mut()
                    .find(|p| p.id == pool.id)
                    .ok_or_else(|| {
                        Error::Missing(format!(
                            "AllocationPool(id: {})",
                            pool.id,
                        ))
                    })?;
                *stored = pool;
                Ok::<(), Error>(())
            })
            .await
            .map_err(tracerr::from_and_wrap!(=> storage::Error))
    }
}

impl<A: Access> Storage<Select<By<Option<AllocationPool>, pool::Id>>>
    for InMemory<A>
{
    type Ok = Option<AllocationPool>;
    type Err = Traced<storage::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Option<AllocationPool>, pool::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        let id = by.into_inner();
        Ok(self
            .0
            .with(|state| state.pools.iter().find(|p| p.id == id).cloned())
            .await)
    }
}
