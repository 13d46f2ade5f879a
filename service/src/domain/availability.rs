//! Pure availability resolution over in-memory snapshots.
//!
//! Everything here is state-free: callers pass full snapshots of the
//! involved entities, so the arithmetic is testable without any storage.

use common::Date;
use itertools::Itertools as _;

use crate::domain::{pool, Booking, Contract, Rate};

/// Capacity sentinel of buy-to-order [`Rate`]s: sourced on demand, never
/// constrained by an allocation.
pub const UNCONSTRAINED: u32 = u32::MAX;

/// Requested stay window.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Stay {
    /// Check-in date.
    pub check_in: Date,

    /// Check-out date.
    pub check_out: Date,
}

impl Stay {
    /// Returns the length of this [`Stay`], in nights.
    ///
    /// Negative when the dates are reversed.
    #[must_use]
    pub fn nights(&self) -> i64 {
        self.check_in.nights_until(self.check_out)
    }
}

/// Resolves the number of units of `rate` remaining bookable for `stay`.
///
/// [`None`] means the rate is excluded from the bookable set entirely:
/// inactive, the stay misses its validity window, the night count falls
/// outside its bounds, or no allocation of the parent contract covers its
/// unit. [`Some`] carries the remaining count, [`UNCONSTRAINED`] for
/// buy-to-order rates.
///
/// Consumption follows the pool-sharing rule: every non-cancelled
/// booking line drawing from the same pool counts, whatever its
/// occupancy or unit.
#[must_use]
pub fn units(
    rate: &Rate,
    contract: Option<&Contract>,
    bookings: &[Booking],
    stay: Stay,
) -> Option<u32> {
    if !rate.bookable_for(stay.check_in, stay.check_out, contract) {
        return None;
    }

    if rate.is_buy_to_order() {
        return Some(UNCONSTRAINED);
    }

    let contract = contract?;
    let allocation = contract.allocation_covering(rate.unit_id)?;
    let pool = rate
        .pool_id
        .unwrap_or_else(|| allocation.pool_key(contract.id));

    Some(allocation.quantity.saturating_sub(consumed(bookings, pool)))
}

/// Sums the quantities non-cancelled booking lines draw from the provided
/// pool.
#[must_use]
pub fn consumed(bookings: &[Booking], pool: pool::Id) -> u32 {
    bookings
        .iter()
        .filter(|b| !b.is_cancelled())
        .flat_map(|b| &b.lines)
        .filter(|l| l.pool_id == Some(pool))
        .map(|l| l.quantity)
        .sum()
}

/// Sums the remaining capacity across the provided [`Rate`]s for display,
/// counting each unique allocation exactly once.
///
/// A 50-room pool exposed through 4 occupancy variants reports 50 rooms,
/// not 200: rates are deduplicated by their pool before summing. Rates
/// whose contract is not among `contracts` are skipped (the querying
/// layer warns about them); buy-to-order rates carry no physical
/// capacity and are skipped as well.
#[must_use]
pub fn distinct_capacity(
    rates: &[Rate],
    contracts: &[Contract],
    bookings: &[Booking],
    stay: Stay,
) -> u32 {
    rates
        .iter()
        .filter_map(|rate| {
            let contract = rate
                .contract_id
                .and_then(|id| contracts.iter().find(|c| c.id == id))?;
            units(rate, Some(contract), bookings, stay)
                .map(|remaining| (rate.pool_id, remaining))
        })
        .unique_by(|(pool, _)| *pool)
        .map(|(_, remaining)| remaining)
        .sum()
}
