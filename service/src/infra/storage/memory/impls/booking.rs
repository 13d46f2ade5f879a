//! [`Booking`]-related [`Storage`] implementations.

use common::operations::{By, Insert, Select, Update};
use tracerr::Traced;

use crate::{
    domain::{
        booking::{self, Purchase},
        Booking,
    },
    infra::{
        storage::{
            self,
            memory::{Access, Error, InMemory},
        },
        Storage,
    },
    read,
};

impl<A: Access> Storage<Insert<Booking>> for InMemory<A> {
    type Ok = ();
    type Err = Traced<storage::Error>;

    async fn execute(
        &self,
        Insert(booking): Insert<Booking>,
    ) -> Result<Self::Ok, Self::Err> {
        self.0
            .with(|state| {
                if state.bookings.iter().any(|b| b.id == booking.id) {
                    return Err(Error::Collision(format!(
                        "Booking(id: {})",
                        booking.id,
                    )));
                }
                state.bookings.push(booking);
                Ok(())
            })
            .await
            .map_err(tracerr::from_and_wrap!(=> storage::Error))
    }
}

impl<A: Access> Storage<Update<Booking>> for InMemory<A> {
    type Ok = ();
    type Err = Traced<storage::Error>;

    async fn execute(
        &self,
        Update(booking): Update<Booking>,
    ) -> Result<Self::Ok, Self::Err> {
        self.0
            .with(|state| {
                let stored = state
                    .bookings
                    .iter_mut()
                    .find(|b| b.id == booking.id)
                    .ok_or_else(|| {
                        Error::Missing(format!("Booking(id: {})", booking.id))
                    })?;
                *stored = booking;
                Ok::<(), Error>(())
            })
            .await
            .map_err(tracerr::from_and_wrap!(=> storage::Error))
    }
}

impl<A: Access> Storage<Select<By<Option<Booking>, booking::Id>>>
    for InMemory<A>
{
    type Ok = Option<Booking>;
    type Err = Traced<storage::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Option<Booking>, booking::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        let id = by.into_inner();
        Ok(self
            .0
            .with(|state| {
                state.bookings.iter().find(|b| b.id == id).cloned()
            })
            .await)
    }
}

impl<A: Access>
    Storage<Select<By<Vec<Booking>, read::booking::NonCancelled>>>
    for InMemory<A>
{
    type Ok = Vec<Booking>;
    type Err = Traced<storage::Error>;

    async fn execute(
        &self,
        Select(_): Select<By<Vec<Booking>, read::booking::NonCancelled>>,
    ) -> Result<Self::Ok, Self::Err> {
        Ok(self
            .0
            .with(|state| {
                state
                    .bookings
                    .iter()
                    .filter(|b| !b.is_cancelled())
                    .cloned()
                    .collect()
            })
            .await)
    }
}

impl<A: Access>
    Storage<Select<By<Vec<Booking>, read::booking::WithBuyToOrder>>>
    for InMemory<A>
{
    type Ok = Vec<Booking>;
    type Err = Traced<storage::Error>;

    async fn execute(
        &self,
        Select(_): Select<By<Vec<Booking>, read::booking::WithBuyToOrder>>,
    ) -> Result<Self::Ok, Self::Err> {
        Ok(self
            .0
            .with(|state| {
                state
                    .bookings
                    .iter()
                    .filter(|b| {
                        !b.is_cancelled()
                            && b.lines
                                .iter()
                                .any(|l| l.purchase == Purchase::BuyToOrder)
                    })
                    .cloned()
                    .collect()
            })
            .await)
    }
}
