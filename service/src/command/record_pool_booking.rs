//! [`Command`] for recording booked units into an [`AllocationPool`].

use common::operations::{By, Commit, Select, Transact, Transacted, Update};
use derive_more::{Display, Error, From};
use tracerr::Traced;

use crate::{
    domain::{pool, AllocationPool},
    infra::{storage, Storage},
    Service,
};

use super::Command;

/// [`Command`] for recording booked units into an [`AllocationPool`].
///
/// Booking beyond the capacity of a non-overbookable pool fails instead
/// of silently succeeding.
#[derive(Clone, Copy, Debug)]
pub struct RecordPoolBooking {
    /// ID of the [`AllocationPool`] to draw from.
    pub pool_id: pool::Id,

    /// Number of units to record.
    pub quantity: u32,
}

impl<Db> Command<RecordPoolBooking> for Service<Db>
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
        cmd: RecordPoolBooking,
    ) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let RecordPoolBooking { pool_id, quantity } = cmd;

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

        pool.record(quantity).map_err(tracerr::from_and_wrap!(=> E))?;

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

/// Error of [`RecordPoolBooking`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// The [`AllocationPool`] has fewer spots than requested.
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
