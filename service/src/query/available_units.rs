//! [`Query`] resolving the remaining availability of a [`Rate`].

use common::{
    operations::{By, Select},
    Date,
};
use derive_more::{Display, Error, From};
use tracerr::Traced;

use crate::{
    domain::{
        availability::{self, Stay},
        contract, rate, Booking, Contract, Rate,
    },
    infra::{storage, Storage},
    read, Service,
};

use super::Query;

/// [`Query`] resolving how many units of a [`Rate`] remain bookable for
/// the provided stay.
///
/// `Ok(None)` means the [`Rate`] is excluded from the bookable set
/// entirely (inactive, stay outside its validity window, night count
/// outside its bounds); `Ok(Some(n))` carries the remaining count,
/// [`availability::UNCONSTRAINED`] for buy-to-order [`Rate`]s.
#[derive(Clone, Copy, Debug)]
pub struct AvailableUnits {
    /// ID of the [`Rate`] to resolve.
    pub rate_id: rate::Id,

    /// Check-in date of the stay.
    pub check_in: Date,

    /// Check-out date of the stay.
    pub check_out: Date,
}

impl<Db> Query<AvailableUnits> for Service<Db>
where
    Db: Storage<
            Select<By<Option<Rate>, rate::Id>>,
            Ok = Option<Rate>,
            Err = Traced<storage::Error>,
        > + Storage<
            Select<By<Option<Contract>, contract::Id>>,
            Ok = Option<Contract>,
            Err = Traced<storage::Error>,
        > + Storage<
            Select<By<Vec<Booking>, read::booking::NonCancelled>>,
            Ok = Vec<Booking>,
            Err = Traced<storage::Error>,
        >,
{
    type Ok = Option<u32>;
    type Err = Traced<ExecutionError>;

    async fn execute(
        &self,
        query: AvailableUnits,
    ) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let AvailableUnits {
            rate_id,
            check_in,
            check_out,
        } = query;

        let rate = self
            .storage()
            .execute(Select(By::<Option<Rate>, _>::new(rate_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .ok_or(E::RateNotExists(rate_id))
            .map_err(tracerr::wrap!())?;

        let contract = match rate.contract_id {
            Some(contract_id) => Some(
                self.storage()
                    .execute(Select(By::<Option<Contract>, _>::new(
                        contract_id,
                    )))
                    .await
                    .map_err(tracerr::map_from_and_wrap!(=> E))?
                    .ok_or(E::ContractNotExists(contract_id))
                    .map_err(tracerr::wrap!())?,
            ),
            None => None,
        };
        if contract.as_ref().is_some_and(|c| !c.is_active()) {
            // Rates of a terminated contract are not bookable anymore.
            return Ok(None);
        }

        let bookings = self
            .storage()
            .execute(Select(By::<Vec<Booking>, _>::new(
                read::booking::NonCancelled,
            )))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        Ok(availability::units(
            &rate,
            contract.as_ref(),
            &bookings,
            Stay {
                check_in,
                check_out,
            },
        ))
    }
}

/// Error of [`AvailableUnits`] [`Query`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Contract`] referenced by the [`Rate`] does not exist.
    #[display("`Contract(id: {_0})` does not exist")]
    ContractNotExists(#[error(not(source))] contract::Id),

    /// [`Rate`] with the provided ID does not exist.
    #[display("`Rate(id: {_0})` does not exist")]
    RateNotExists(#[error(not(source))] rate::Id),

    /// [`Storage`] error.
    #[display("`Storage` operation failed: {_0}")]
    #[from]
    Storage(storage::Error),
}
