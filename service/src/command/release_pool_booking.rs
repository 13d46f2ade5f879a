//! [`Command`] for releasing booked units from an [`AllocationPool`].

use common::operations::{By, Commit, Select, Transact, Transacted, Update};
use derive_more::{Display, Error, From};
use tracerr::Traced;

use crate::{
    domain::{pool, AllocationPool},
    infra::{storage, Storage},
    Service,
};

use super::Command;

/// [`Command`] for releasing booked units from an [`AllocationPool`].
#[derive(Clone, Copy, Debug)]
pub struct ReleasePoolBooking {
    /// ID of the [`AllocationPool`] to release into.
    pub pool_id: pool::Id,

    /// Number of units to release.
    pub quantity: u32,
}

impl<Db> Command<ReleasePoolBooking> for Service<Db>
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
        cmd: ReleasePoolBooking,
    ) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let ReleasePoolBooking { pool_id, quantity } = cmd;

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

        pool.release(quantity).map_err(tracerr::from_and_wrap!(=> E))?;

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

/// Error of [`ReleasePoolBooking`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`AllocationPool`] with the provided ID does not exist.
    #[display("`AllocationPool(id: {_0})` does not exist")]
    PoolNotExists(#[error(not(source))] pool::Id),

    /// More units would be released than are booked.
    #[display("{_0}")]
    #[from]
    ReleaseUnderflow(pool::ReleaseUnderflow),

    /// [`Storage`] error.
    #[display("`Storage` operation failed: {_0}")]
    #[from]
    Storage(storage::Error),
}
