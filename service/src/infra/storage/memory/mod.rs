//! In-memory [`Storage`] backend.

mod impls;

use std::{
    future::Future,
    sync::{Arc, Mutex as SyncMutex},
};

use common::operations::{Commit, Transact};
use derive_more::{Display, Error as StdError};
use tokio::sync::{Mutex, OwnedMutexGuard};
use tracerr::Traced;

use crate::{
    domain::{conversion, AllocationPool, Booking, Contract, Item, Rate},
    infra::{storage, Storage},
};

/// In-memory [`Storage`] backend.
///
/// Generic over the [`Access`] strategy: [`Shared`] locks the [`State`]
/// per operation, while [`Exclusive`] holds the whole-state lock for a
/// transaction's lifetime, making check-then-mutate sequences (like
/// availability checks followed by a booking insertion) race-free.
#[derive(Clone, Debug, Default)]
pub struct InMemory<A = Shared>(A);

impl InMemory {
    /// Creates a new empty [`InMemory`] storage.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

/// Entities stored by an [`InMemory`] storage.
#[derive(Debug, Default)]
pub struct State {
    /// Stored [`Item`]s.
    items: Vec<Item>,

    /// Stored [`Contract`]s.
    contracts: Vec<Contract>,

    /// Stored [`Rate`]s.
    rates: Vec<Rate>,

    /// Stored [`Booking`]s.
    bookings: Vec<Booking>,

    /// Stored [`AllocationPool`]s.
    pools: Vec<AllocationPool>,

    /// Stored [`conversion::Record`]s.
    conversions: Vec<conversion::Record>,
}

/// Strategy of accessing the [`State`] of an [`InMemory`] storage.
pub trait Access {
    /// Runs the provided function over the [`State`].
    fn with<R>(
        &self,
        f: impl FnOnce(&mut State) -> R,
    ) -> impl Future<Output = R>;
}

/// [`Access`] locking the [`State`] for the duration of one operation.
#[derive(Clone, Debug, Default)]
pub struct Shared(Arc<Mutex<State>>);

impl Access for Shared {
    async fn with<R>(&self, f: impl FnOnce(&mut State) -> R) -> R {
        let mut state = self.0.lock().await;
        f(&mut state)
    }
}

/// [`Access`] holding the whole-[`State`] lock until dropped.
#[derive(Debug)]
pub struct Exclusive(SyncMutex<OwnedMutexGuard<State>>);

impl Access for Exclusive {
    async fn with<R>(&self, f: impl FnOnce(&mut State) -> R) -> R {
        let mut guard = self.0.lock().expect("not poisoned");
        f(&mut guard)
    }
}

impl Storage<Transact> for InMemory {
    type Ok = InMemory<Exclusive>;
    type Err = Traced<storage::Error>;

    async fn execute(&self, _: Transact) -> Result<Self::Ok, Self::Err> {
        let guard = Arc::clone(&self.0 .0).lock_owned().await;
        Ok(InMemory(Exclusive(SyncMutex::new(guard))))
    }
}

impl Storage<Commit> for InMemory<Exclusive> {
    type Ok = ();
    type Err = Traced<storage::Error>;

    async fn execute(&self, _: Commit) -> Result<Self::Ok, Self::Err> {
        // Mutations apply in place; the state lock is released once this
        // handle drops.
        Ok(())
    }
}

/// [`InMemory`] storage error.
#[derive(Clone, Debug, Display, Eq, PartialEq, StdError)]
pub enum Error {
    /// Insertion collided with an already stored entity.
    #[display("`{_0}` already exists")]
    Collision(#[error(not(source))] String),

    /// Referenced entity is not stored.
    #[display("`{_0}` does not exist")]
    Missing(#[error(not(source))] String),
}
