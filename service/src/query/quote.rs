//! [`Query`] deriving the cost [`Breakdown`] of a [`Rate`] for a stay.

use common::{
    operations::{By, Select},
    Date,
};
use derive_more::{Display, Error, From};
use tracerr::Traced;

use crate::{
    domain::{
        contract,
        pricing::{Breakdown, CostParams, RateSource},
        rate, Contract, Rate,
    },
    infra::{storage, Storage},
    Service,
};

use super::Query;

/// [`Query`] deriving the itemized cost [`Breakdown`] of one unit of a
/// [`Rate`] over the provided stay.
///
/// The same derivation prices cart lines and confirmation pages, so both
/// always agree.
#[derive(Clone, Copy, Debug)]
pub struct Quote {
    /// ID of the [`Rate`] to price.
    pub rate_id: rate::Id,

    /// Check-in date of the stay.
    pub check_in: Date,

    /// Check-out date of the stay.
    pub check_out: Date,
}

impl<Db> Query<Quote> for Service<Db>
where
    Db: Storage<
            Select<By<Option<Rate>, rate::Id>>,
            Ok = Option<Rate>,
            Err = Traced<storage::Error>,
        > + Storage<
            Select<By<Option<Contract>, contract::Id>>,
            Ok = Option<Contract>,
            Err = Traced<storage::Error>,
        >,
{
    type Ok = Breakdown;
    type Err = Traced<ExecutionError>;

    async fn execute(&self, query: Quote) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let Quote {
            rate_id,
            check_in,
            check_out,
        } = query;

        let nights = u32::try_from(check_in.nights_until(check_out))
            .ok()
            .filter(|n| *n > 0)
            .ok_or(E::InvalidStayWindow)
            .map_err(tracerr::wrap!())?;

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

        let params = match contract.as_ref() {
            Some(contract) => RateSource::Contracted(contract),
            None => RateSource::BuyToOrder(CostParams::default()),
        }
        .cost_params()
        .overridden(&rate.cost_overrides);

        Ok(Breakdown::of(
            rate.amount,
            &params,
            rate.occupancy,
            nights,
            Some(rate.board_cost),
        ))
    }
}

/// Error of [`Quote`] [`Query`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Contract`] referenced by the [`Rate`] does not exist.
    #[display("`Contract(id: {_0})` does not exist")]
    ContractNotExists(#[error(not(source))] contract::Id),

    /// The stay window is empty or reversed.
    #[display("`check_in` must precede `check_out`")]
    InvalidStayWindow,

    /// [`Rate`] with the provided ID does not exist.
    #[display("`Rate(id: {_0})` does not exist")]
    RateNotExists(#[error(not(source))] rate::Id),

    /// [`Storage`] error.
    #[display("`Storage` operation failed: {_0}")]
    #[from]
    Storage(storage::Error),
}

#[cfg(test)]
mod spec {
    use std::time::Duration;

    use common::{money::Currency, operations::Insert, Date, Money, Percent};
    use rust_decimal::Decimal;

    use crate::{
        domain::{
            contract::board,
            pricing::CostOverrides,
            rate::{self, Occupancy},
            Rate,
        },
        infra::storage::InMemory,
        task, Command as _, Config, Service,
    };

    use super::Quote;

    fn usd(s: &str) -> Money {
        Money::new(s.parse().unwrap(), Currency::Usd)
    }

    fn service() -> Service<InMemory> {
        let config = Config {
            recheck_conversions: task::recheck_conversions::Config {
                interval: Duration::from_secs(60 * 60),
            },
        };
        Service::new(config, InMemory::new()).0
    }

    #[tokio::test]
    async fn prices_buy_to_order_rates_from_their_overrides() {
        let svc = service();

        let rate = Rate {
            id: rate::Id::new(),
            contract_id: None,
            unit_id: crate::domain::inventory::unit::Id::new(),
            occupancy: Occupancy::Double,
            board: board::Kind::HalfBoard,
            amount: usd("120"),
            board_cost: usd("15"),
            valid_from: Some(Date::from_ymd(2025, 6, 1).unwrap()),
            valid_to: Some(Date::from_ymd(2025, 6, 30).unwrap()),
            min_nights: None,
            max_nights: None,
            cost_overrides: CostOverrides {
                tax_rate: Some(Percent::new(Decimal::TEN).unwrap()),
                city_tax: Some(usd("2.5")),
                resort_fee: Some(usd("5")),
                ..CostOverrides::default()
            },
            pool_id: None,
            active: true,
            created_at: rate::CreationDateTime::now(),
        };
        svc.storage()
            .execute(Insert(vec![rate.clone()]))
            .await
            .unwrap();

        let breakdown = svc
            .execute(Quote {
                rate_id: rate.id,
                check_in: Date::from_ymd(2025, 6, 10).unwrap(),
                check_out: Date::from_ymd(2025, 6, 13).unwrap(),
            })
            .await
            .unwrap();

        assert_eq!(breakdown.room_cost, usd("360"));
        assert_eq!(breakdown.board_cost, usd("90"));
        assert_eq!(breakdown.city_tax, usd("15"));
        assert_eq!(breakdown.resort_fee, usd("15"));
        assert_eq!(breakdown.tax_amount, usd("48"));
        assert_eq!(breakdown.total, usd("528"));
    }
}
