//! [`Command`] for creating a new [`AllocationPool`].

use common::operations::Insert;
use derive_more::{Display, Error, From};
use tracerr::Traced;

use crate::{
    domain::{pool, AllocationPool},
    infra::{storage, Storage},
    Service,
};

use super::Command;

/// [`Command`] for creating a new [`AllocationPool`].
#[derive(Clone, Debug)]
pub struct CreatePool {
    /// Name of the new [`AllocationPool`].
    pub name: pool::Name,

    /// Total physical capacity of the new [`AllocationPool`].
    pub total_capacity: u32,

    /// Whether the new [`AllocationPool`] may be oversubscribed.
    pub overbookable: bool,
}

impl<Db> Command<CreatePool> for Service<Db>
where
    Db: Storage<Insert<AllocationPool>, Err = Traced<storage::Error>>,
{
    type Ok = AllocationPool;
    type Err = Traced<ExecutionError>;

    async fn execute(&self, cmd: CreatePool) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let CreatePool {
            name,
            total_capacity,
            overbookable,
        } = cmd;

        let pool = AllocationPool {
            id: pool::Id::new(),
            name,
            total_capacity,
            booked: 0,
            overbookable,
            created_at: pool::CreationDateTime::now(),
        };
        self.storage()
            .execute(Insert(pool.clone()))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;

        Ok(pool)
    }
}

/// Error of [`CreatePool`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Storage`] error.
    #[display("`Storage` operation failed: {_0}")]
    #[from]
    Storage(storage::Error),
}
