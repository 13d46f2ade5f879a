//! [`Allocation`] definitions.

use common::Money;
use uuid::Uuid;
use xxhash_rust::xxh3;

use crate::domain::{inventory, pool, rate::Occupancy};

use super::{Contract, Id, OccupancyRate};

/// A [`Contract`]'s commitment of physical units to one or more
/// [`inventory::Unit`]s sharing a single capacity pool.
///
/// Spanning multiple units models "run of house" blocks: any unit of the
/// set draws the same physical rooms down.
///
/// [`inventory::Unit`]: crate::domain::inventory::Unit
#[derive(Clone, Debug)]
pub struct Allocation {
    /// IDs of the [`inventory::Unit`]s sharing this [`Allocation`]'s pool.
    ///
    /// [`inventory::Unit`]: crate::domain::inventory::Unit
    pub unit_ids: Vec<inventory::unit::Id>,

    /// Total physical units committed.
    pub quantity: u32,

    /// Nightly amounts per [`Occupancy`] overriding the contract-level
    /// ones for this [`Allocation`] only.
    pub occupancy_rates: Vec<OccupancyRate>,

    /// Flat nightly rate overriding the contract-level one for this
    /// [`Allocation`] only.
    pub base_rate: Option<Money>,

    /// Explicit [`pool::Id`] this [`Allocation`] draws from.
    ///
    /// [`None`] means the pool key is derived from the unit-id set.
    pub pool_id: Option<pool::Id>,
}

impl Allocation {
    /// Indicates whether this [`Allocation`] provides capacity for the
    /// provided [`inventory::Unit`].
    ///
    /// [`inventory::Unit`]: crate::domain::inventory::Unit
    #[must_use]
    pub fn covers(&self, unit_id: inventory::unit::Id) -> bool {
        self.unit_ids.contains(&unit_id)
    }

    /// Resolves the capacity-sharing pool key of this [`Allocation`]
    /// within the [`Contract`] with the provided ID.
    ///
    /// The explicit [`pool::Id`] when one is set, otherwise a key derived
    /// deterministically from the contract ID and the sorted unit-id set,
    /// so every occupancy variant of every unit in the set lands on the
    /// same pool.
    #[must_use]
    pub fn pool_key(&self, contract_id: Id) -> pool::Id {
        use std::hash::Hash as _;

        if let Some(id) = self.pool_id {
            return id;
        }

        // WARNING: Avoid changing the hashed fields or their order,
        //          because it will change the derived keys of already
        //          booked pools.
        let mut hasher = xxh3::Xxh3Builder::new().build();
        contract_id.hash(&mut hasher);
        let mut unit_ids = self.unit_ids.clone();
        unit_ids.sort_unstable();
        unit_ids.dedup();
        unit_ids.hash(&mut hasher);

        pool::Id::from(Uuid::from_u128(hasher.digest128()))
    }

    /// Resolves the nightly amount for the provided [`Occupancy`], falling
    /// back to the contract-level rate when this [`Allocation`] doesn't
    /// override it.
    #[must_use]
    pub fn occupancy_amount(
        &self,
        occupancy: Occupancy,
        contract: &Contract,
    ) -> Option<Money> {
        self.occupancy_rates
            .iter()
            .find(|r| r.occupancy == occupancy)
            .map(|r| r.amount)
            .or_else(|| contract.occupancy_amount(occupancy))
    }
}
