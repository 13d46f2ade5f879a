//! [`RecheckConversions`] [`Task`].

use std::{convert::Infallible, error::Error, time};

use common::operations::{By, Perform, Select, Start};
use tokio::time::interval;
use tracerr::Traced;
use tracing as log;

use crate::{
    domain::{contract, conversion, Booking, Contract, Rate},
    infra::{storage, Storage},
    read, Service,
};

use super::Task;

/// Configuration for [`RecheckConversions`] [`Task`].
#[derive(Clone, Copy, Debug)]
pub struct Config {
    /// Interval between buy-to-order rechecks.
    pub interval: time::Duration,
}

/// [`Task`] periodically rechecking buy-to-order bookings against the
/// active [`Contract`]s and surfacing the found conversion candidates
/// for the back office.
#[derive(Clone, Copy, Debug)]
pub struct RecheckConversions<S> {
    /// [`Config`] of this [`Task`].
    config: Config,

    /// [`Service`] instance.
    service: S,
}

impl<Db> Task<Start<By<RecheckConversions<Self>, Config>>> for Service<Db>
where
    RecheckConversions<Service<Db>>:
        Task<Perform<()>, Ok = (), Err: Error> + Send + Sync + 'static,
    Self: Clone,
{
    type Ok = ();
    type Err = Infallible;

    async fn execute(
        &self,
        Start(by): Start<By<RecheckConversions<Self>, Config>>,
    ) -> Result<Self::Ok, Self::Err> {
        let config = by.into_inner();
        let task = RecheckConversions {
            config,
            service: self.clone(),
        };

        let mut interval = interval(task.config.interval);
        loop {
            let _ = interval.tick().await;
            _ = task.execute(Perform(())).await.map_err(|e| {
                log::error!("`task::RecheckConversions` failed: {e}");
            });
        }
    }
}

impl<Db> Task<Perform<()>> for RecheckConversions<Service<Db>>
where
    Db: Storage<
            Select<By<Vec<Contract>, ()>>,
            Ok = Vec<Contract>,
            Err = Traced<storage::Error>,
        > + Storage<
            Select<By<Vec<Rate>, contract::Id>>,
            Ok = Vec<Rate>,
            Err = Traced<storage::Error>,
        > + Storage<
            Select<By<Vec<Booking>, read::booking::WithBuyToOrder>>,
            Ok = Vec<Booking>,
            Err = Traced<storage::Error>,
        >,
{
    type Ok = ();
    type Err = ExecutionError;

    async fn execute(&self, _: Perform<()>) -> Result<Self::Ok, Self::Err> {
        let contracts = self
            .service
            .storage()
            .execute(Select(By::<Vec<Contract>, _>::new(())))
            .await
            .map_err(tracerr::map_from_and_wrap!())?;
        let bookings = self
            .service
            .storage()
            .execute(Select(By::<Vec<Booking>, _>::new(
                read::booking::WithBuyToOrder,
            )))
            .await
            .map_err(tracerr::map_from_and_wrap!())?;
        if bookings.is_empty() {
            return Ok(());
        }

        for contract in contracts.iter().filter(|c| c.is_active()) {
            let rates = self
                .service
                .storage()
                .execute(Select(By::<Vec<Rate>, _>::new(contract.id)))
                .await
                .map_err(tracerr::map_from_and_wrap!())?;

            let found = conversion::candidates(contract, &rates, &bookings);
            if !found.is_empty() {
                log::info!(
                    "`Contract(id: {})`: {} buy-to-order line(s) could be \
                     converted onto contracted inventory",
                    contract.id,
                    found.len(),
                );
            }
        }

        Ok(())
    }
}

/// Error of [`RecheckConversions`] execution.
pub type ExecutionError = Traced<storage::Error>;
