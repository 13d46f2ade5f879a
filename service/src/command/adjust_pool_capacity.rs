//! [`Command`] for adjusting the total capacity of an [`AllocationPool`].

use common::operations::{By, Commit, Select, Transact, Transacted, Update};
use derive_more::{Display, Error, From};
use tracerr::Traced;

use crate::{
    domain::{pool, AllocationPool},
    infra::{storage, Storage},
    Service,
};

use super::Command;

/// [`Command`] for adjusting the total capacity of an [`AllocationPool`].
#[derive(Clone, Copy, Debug)]
pub struct AdjustPoolCapacity {
    /// ID of the [`AllocationPool`] to adjust.
    pub pool_id: pool::Id,

    /// New total capacity of the [`AllocationPool`].
    pub new_total: u32,
}

impl<Db> Command<AdjustPoolCapacity> for Service<Db>
where
    Db: Storage<Transact, Err = Traced<storage::Error>>,
    Transacted<Db>: Storage<
            Select<By<Option<AllocationPool>, pool::Id>>,
            Ok = Option<AllocationPool>,
            Err = Traced<storage::Error>,
        > + Storage<Update<AllocationPool>, Err = Traced<storage::Error>>
        + Storage<Commit, Err = Traced<storage::Error>>,
{
    type Ok = AllocationPool;
    type Err = Traced<ExecutionError>;

    async fn execute(
        &self,
        cmd: AdjustPoolCapacity,
    ) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let AdjustPoolCapacity { pool_id, new_total } = cmd;

        let tx = self
            .storage()
            .execute(Transact)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        let mut pool = tx
            .execute(Select(By::<Option<AllocationPool>, _>::new(pool_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .ok_or(E::PoolNotExists(pool_id))
            .map_err(tracerr::wrap!())?;

        pool.adjust_capacity(new_total)
            .map_err(tracerr::from_and_wrap!(=> E))?;

        tx.execute(Update(pool.clone()))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;

        tx.execute(Commit)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;

        Ok(pool)
    }
}

/// Error of [`AdjustPoolCapacity`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// The new total would leave the [`AllocationPool`] oversubscribed.
    #[display("{_0}")]
    #[from]
    CapacityExceeded(pool::CapacityExceeded),

    /// [`AllocationPool`] with the provided ID does not exist.
    #[display("`AllocationPool(id: {_0})` does not exist")]
    PoolNotExists(#[error(not(source))] pool::Id),

    /// [`Storage`] error.
    #[display("`Storage` operation failed: {_0}")]
    #[from]
    Storage(storage::Error),
}
