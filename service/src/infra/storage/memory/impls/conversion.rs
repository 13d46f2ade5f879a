//! [`conversion::Record`]-related [`Storage`] implementations.

use common::operations::Insert;
use tracerr::Traced;

use crate::{
    domain::conversion,
    infra::{
        storage::{
            self,
            memory::{Access, Error, InMemory},
        },
        Storage,
    },
};

impl<A: Access> Storage<Insert<conversion::Record>> for InMemory<A> {
    type Ok = ();
    type Err = Traced<storage::Error>;

    async fn execute(
        &self,
        Insert(record): Insert<conversion::Record>,
    ) -> Result<Self::Ok, Self::Err> {
        self.0
            .with(|state| {
                // The conversion log is append-only.
                if state.conversions.iter().any(|r| r.id == record.id) {
                    return Err(Error::Collision(format!(
                        "conversion::Record(id: {})",
                        record.id,
                    )));
                }
                state.conversions.push(record);
                Ok(())
            })
            .await
            .map_err(tracerr::from_and_wrap!(=> storage::Error))
    }
}
