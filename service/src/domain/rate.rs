//! [`Rate`] definitions.

use common::{define_kind, unit, Date, DateTimeOf, Money};
use derive_more::{Display, From, FromStr, Into};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::{
    contract::{self, board, Strategy},
    inventory, pool, pricing, Contract, Item,
};

/// Concrete sellable unit: an [`inventory::Unit`] at one [`Occupancy`]
/// and board, priced per night for a validity window.
///
/// [`inventory::Unit`]: crate::domain::inventory::Unit
#[derive(Clone, Debug)]
pub struct Rate {
    /// ID of this [`Rate`].
    pub id: Id,

    /// ID of the parent [`Contract`].
    ///
    /// [`None`] means a standalone buy-to-order [`Rate`] with
    /// unconstrained capacity.
    pub contract_id: Option<contract::Id>,

    /// ID of the [`inventory::Unit`] this [`Rate`] sells.
    ///
    /// [`inventory::Unit`]: crate::domain::inventory::Unit
    pub unit_id: inventory::unit::Id,

    /// [`Occupancy`] this [`Rate`] is priced for.
    pub occupancy: Occupancy,

    /// Meal plan included into this [`Rate`].
    pub board: board::Kind,

    /// Nightly amount per unit.
    pub amount: Money,

    /// Additional board cost per person per night.
    pub board_cost: Money,

    /// First stay date this [`Rate`] covers, overriding the contract-level
    /// one when set.
    pub valid_from: Option<Date>,

    /// Last stay date this [`Rate`] covers, overriding the contract-level
    /// one when set.
    pub valid_to: Option<Date>,

    /// Minimum stay length in nights, overriding the contract-level one
    /// when set.
    pub min_nights: Option<u32>,

    /// Maximum stay length in nights, overriding the contract-level one
    /// when set.
    pub max_nights: Option<u32>,

    /// Cost-parameter overrides taking precedence over the contract-level
    /// defaults.
    pub cost_overrides: pricing::CostOverrides,

    /// Capacity pool this [`Rate`] draws from.
    ///
    /// Populated at generation time for contract-backed [`Rate`]s;
    /// [`None`] for buy-to-order ones.
    pub pool_id: Option<pool::Id>,

    /// Whether this [`Rate`] is bookable at all.
    pub active: bool,

    /// [`DateTime`] when this [`Rate`] was created.
    ///
    /// [`DateTime`]: common::DateTime
    pub created_at: CreationDateTime,
}

impl Rate {
    /// Indicates whether this [`Rate`] sources inventory on demand rather
    /// than from contracted capacity.
    #[must_use]
    pub fn is_buy_to_order(&self) -> bool {
        self.contract_id.is_none()
    }

    /// Indicates whether this [`Rate`] admits the provided stay window.
    ///
    /// Rate-level validity and night bounds override the contract-level
    /// ones; a [`Rate`] whose resolved validity window is absent (a
    /// misconfigured buy-to-order [`Rate`]) admits nothing.
    #[must_use]
    pub fn bookable_for(
        &self,
        check_in: Date,
        check_out: Date,
        contract: Option<&Contract>,
    ) -> bool {
        if !self.active {
            return false;
        }

        let nights = check_in.nights_until(check_out);
        if nights <= 0 {
            return false;
        }

        let from = self.valid_from.or(contract.map(|c| c.valid_from));
        let to = self.valid_to.or(contract.map(|c| c.valid_to));
        let (Some(from), Some(to)) = (from, to) else {
            return false;
        };
        if check_in < from || to < check_out {
            return false;
        }

        let min = self
            .min_nights
            .or(contract.and_then(|c| c.min_nights))
            .unwrap_or(1);
        let max = self
            .max_nights
            .or(contract.and_then(|c| c.max_nights))
            .unwrap_or(u32::MAX);
        (i64::from(min)..=i64::from(max)).contains(&nights)
    }

    /// Expands the provided [`Contract`] into the concrete set of bookable
    /// [`Rate`]s: one per allocation unit × board option × resolved
    /// [`Occupancy`].
    ///
    /// Allocation unit IDs not present on the provided [`Item`] produce no
    /// [`Rate`] and no error. Validity and night bounds are left unset on
    /// the produced [`Rate`]s, following the contract-level ones until
    /// overridden.
    #[must_use]
    pub fn generate(contract: &Contract, item: &Item) -> Vec<Self> {
        let boards = contract.board_options();

        let mut rates = Vec::new();
        for allocation in &contract.allocations {
            let amounts = resolved_amounts(contract, allocation);
            if amounts.is_empty() {
                continue;
            }
            let pool_id = allocation.pool_key(contract.id);

            for unit_id in &allocation.unit_ids {
                if item.unit(*unit_id).is_none() {
                    continue;
                }

                for option in &boards {
                    for &(occupancy, amount) in &amounts {
                        rates.push(Self {
                            id: Id::new(),
                            contract_id: Some(contract.id),
                            unit_id: *unit_id,
                            occupancy,
                            board: option.board,
                            amount,
                            board_cost: option.cost,
                            valid_from: None,
                            valid_to: None,
                            min_nights: None,
                            max_nights: None,
                            cost_overrides: pricing::CostOverrides::default(),
                            pool_id: Some(pool_id),
                            active: true,
                            created_at: CreationDateTime::now(),
                        });
                    }
                }
            }
        }
        rates
    }
}

/// Resolves the set of ([`Occupancy`], nightly amount) pairs to expand
/// for the provided [`Allocation`].
///
/// [`Allocation`]: contract::Allocation
fn resolved_amounts(
    contract: &Contract,
    allocation: &contract::Allocation,
) -> Vec<(Occupancy, Money)> {
    match contract.strategy {
        Strategy::FlatRate => {
            if let Some(flat) = allocation.base_rate {
                // A flat rate is occupancy-independent, so an explicit
                // allocation override covers all the occupancy variants.
                Occupancy::all().iter().map(|&o| (o, flat)).collect()
            } else if let Some(flat) = contract.base_rate {
                vec![(Occupancy::Double, flat)]
            } else {
                vec![]
            }
        }
        Strategy::PerOccupancy => Occupancy::all()
            .iter()
            .filter_map(|&o| {
                allocation.occupancy_amount(o, contract).map(|a| (o, a))
            })
            .collect(),
    }
}

/// ID of a [`Rate`].
#[derive(
    Clone,
    Copy,
    Debug,
    Default,
    Deserialize,
    Display,
    Eq,
    From,
    FromStr,
    Hash,
    Into,
    PartialEq,
    Serialize,
)]
pub struct Id(Uuid);

impl Id {
    /// Creates a new random [`Id`].
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

define_kind! {
    #[doc = "Guest count category determining per-unit pricing."]
    enum Occupancy {
        #[doc = "One guest."]
        Single = 1,

        #[doc = "Two guests."]
        Double = 2,

        #[doc = "Three guests."]
        Triple = 3,

        #[doc = "Four guests."]
        Quad = 4,
    }
}

impl Occupancy {
    /// Returns the number of guests this [`Occupancy`] hosts.
    #[must_use]
    pub const fn headcount(self) -> u8 {
        self.u8()
    }
}

/// [`DateTime`] when a [`Rate`] was created.
///
/// [`DateTime`]: common::DateTime
pub type CreationDateTime = DateTimeOf<(Rate, unit::Creation)>;

#[cfg(test)]
mod spec {
    use common::{money::Currency, Date, Money, Percent};

    use crate::domain::{
        contract::{
            Allocation, BoardOption, Contract, OccupancyRate, Strategy,
            Supplier,
        },
        contract::{board, CreationDateTime},
        inventory::{self, unit::PaxBounds, Hotel, Item, Unit},
        rate::Occupancy,
    };

    use super::Rate;

    fn usd(s: &str) -> Money {
        Money::new(s.parse().unwrap(), Currency::Usd)
    }

    fn unit(name: &str) -> Unit {
        Unit {
            id: inventory::unit::Id::new(),
            name: inventory::unit::Name::new(name).unwrap(),
            pax: PaxBounds::new(1, 4).unwrap(),
        }
    }

    fn hotel(units: Vec<Unit>) -> Item {
        Item::from(Hotel {
            id: inventory::Id::new(),
            name: inventory::Name::new("Seaside Palace").unwrap(),
            room_groups: units,
            created_at: inventory::CreationDateTime::now(),
        })
    }

    fn contract(item: &Item, allocations: Vec<Allocation>) -> Contract {
        Contract {
            id: crate::domain::contract::Id::new(),
            supplier: Supplier::new("Sunline DMC").unwrap(),
            item_id: item.id(),
            currency: Currency::Usd,
            valid_from: Date::from_ymd(2025, 5, 1).unwrap(),
            valid_to: Date::from_ymd(2025, 10, 31).unwrap(),
            strategy: Strategy::PerOccupancy,
            base_rate: None,
            occupancy_rates: vec![],
            allocations,
            boards: vec![],
            min_nights: None,
            max_nights: None,
            markup: Percent::ZERO,
            tax_rate: Percent::ZERO,
            city_tax: None,
            resort_fee: None,
            commission: Percent::ZERO,
            created_at: CreationDateTime::now(),
            terminated_at: None,
        }
    }

    fn allocation(unit_ids: Vec<inventory::unit::Id>) -> Allocation {
        Allocation {
            unit_ids,
            quantity: 10,
            occupancy_rates: vec![],
            base_rate: None,
            pool_id: None,
        }
    }

    #[test]
    fn flat_override_expands_all_occupancies_at_one_amount() {
        let room = unit("Standard");
        let item = hotel(vec![room.clone()]);
        let mut allocation = allocation(vec![room.id]);
        allocation.base_rate = Some(usd("80"));
        let mut contract = contract(&item, vec![allocation]);
        contract.strategy = Strategy::FlatRate;
        contract.base_rate = Some(usd("95"));

        let rates = Rate::generate(&contract, &item);

        assert_eq!(rates.len(), 4);
        for occupancy in Occupancy::all() {
            assert!(rates.iter().any(|r| r.occupancy == *occupancy));
        }
        assert!(rates.iter().all(|r| r.amount == usd("80")));
    }

    #[test]
    fn flat_without_override_emits_synthetic_double() {
        let room = unit("Standard");
        let item = hotel(vec![room.clone()]);
        let mut contract = contract(&item, vec![allocation(vec![room.id])]);
        contract.strategy = Strategy::FlatRate;
        contract.base_rate = Some(usd("95"));

        let rates = Rate::generate(&contract, &item);

        assert_eq!(rates.len(), 1);
        assert_eq!(rates[0].occupancy, Occupancy::Double);
        assert_eq!(rates[0].amount, usd("95"));
    }

    #[test]
    fn per_occupancy_override_falls_back_to_contract_rates() {
        let room = unit("Standard");
        let item = hotel(vec![room.clone()]);
        let mut allocation = allocation(vec![room.id]);
        allocation.occupancy_rates = vec![OccupancyRate {
            occupancy: Occupancy::Double,
            amount: usd("120"),
        }];
        let mut contract = contract(&item, vec![allocation]);
        contract.occupancy_rates = vec![
            OccupancyRate {
                occupancy: Occupancy::Single,
                amount: usd("100"),
            },
            OccupancyRate {
                occupancy: Occupancy::Double,
                amount: usd("130"),
            },
        ];

        let rates = Rate::generate(&contract, &item);

        assert_eq!(rates.len(), 2);
        let single = rates
            .iter()
            .find(|r| r.occupancy == Occupancy::Single)
            .unwrap();
        assert_eq!(single.amount, usd("100"));
        let double = rates
            .iter()
            .find(|r| r.occupancy == Occupancy::Double)
            .unwrap();
        assert_eq!(double.amount, usd("120"));
    }

    #[test]
    fn unknown_allocation_unit_is_skipped_silently() {
        let room = unit("Standard");
        let item = hotel(vec![room.clone()]);
        let mut contract = contract(
            &item,
            vec![allocation(vec![room.id, inventory::unit::Id::new()])],
        );
        contract.occupancy_rates = vec![OccupancyRate {
            occupancy: Occupancy::Double,
            amount: usd("130"),
        }];

        let rates = Rate::generate(&contract, &item);

        assert_eq!(rates.len(), 1);
        assert_eq!(rates[0].unit_id, room.id);
    }

    #[test]
    fn defaults_to_zero_cost_room_only_board() {
        let room = unit("Standard");
        let item = hotel(vec![room.clone()]);
        let mut contract = contract(&item, vec![allocation(vec![room.id])]);
        contract.occupancy_rates = vec![OccupancyRate {
            occupancy: Occupancy::Double,
            amount: usd("130"),
        }];

        let rates = Rate::generate(&contract, &item);

        assert_eq!(rates.len(), 1);
        assert_eq!(rates[0].board, board::Kind::RoomOnly);
        assert!(rates[0].board_cost.is_zero());
    }

    #[test]
    fn boards_multiply_the_matrix() {
        let room = unit("Standard");
        let item = hotel(vec![room.clone()]);
        let mut contract = contract(&item, vec![allocation(vec![room.id])]);
        contract.occupancy_rates = vec![
            OccupancyRate {
                occupancy: Occupancy::Single,
                amount: usd("100"),
            },
            OccupancyRate {
                occupancy: Occupancy::Double,
                amount: usd("130"),
            },
        ];
        contract.boards = vec![
            BoardOption::room_only(Currency::Usd),
            BoardOption {
                board: board::Kind::HalfBoard,
                cost: usd("15"),
            },
        ];

        let rates = Rate::generate(&contract, &item);

        assert_eq!(rates.len(), 4);
        assert_eq!(
            rates
                .iter()
                .filter(|r| r.board == board::Kind::HalfBoard)
                .count(),
            2,
        );
    }

    #[test]
    fn run_of_house_units_share_one_pool_key() {
        let (a, b) = (unit("Garden view"), unit("Sea view"));
        let item = hotel(vec![a.clone(), b.clone()]);
        let allocation = allocation(vec![a.id, b.id]);
        let mut contract = contract(&item, vec![allocation]);
        contract.occupancy_rates = vec![OccupancyRate {
            occupancy: Occupancy::Double,
            amount: usd("130"),
        }];
        let expected =
            contract.allocations[0].pool_key(contract.id);

        let rates = Rate::generate(&contract, &item);

        assert_eq!(rates.len(), 2);
        assert!(rates.iter().all(|r| r.pool_id == Some(expected)));
        assert!(rates.iter().all(|r| r.valid_from.is_none()));
    }

    #[test]
    fn stay_outside_night_bounds_is_not_bookable() {
        let rate = Rate {
            id: super::Id::new(),
            contract_id: None,
            unit_id: inventory::unit::Id::new(),
            occupancy: Occupancy::Double,
            board: board::Kind::RoomOnly,
            amount: usd("70"),
            board_cost: Money::zero(Currency::Usd),
            valid_from: Some(Date::from_ymd(2025, 12, 1).unwrap()),
            valid_to: Some(Date::from_ymd(2025, 12, 31).unwrap()),
            min_nights: Some(1),
            max_nights: Some(30),
            cost_overrides: crate::domain::pricing::CostOverrides::default(),
            pool_id: None,
            active: true,
            created_at: super::CreationDateTime::now(),
        };

        let check_in = Date::from_ymd(2025, 12, 1).unwrap();
        assert!(rate.bookable_for(
            check_in,
            Date::from_ymd(2025, 12, 11).unwrap(),
            None,
        ));
        // 40 nights overflow both the window and the bounds.
        assert!(!rate.bookable_for(
            check_in,
            Date::from_ymd(2026, 1, 10).unwrap(),
            None,
        ));
    }

    #[test]
    fn missing_validity_dates_exclude_a_buy_to_order_rate() {
        let mut rate = Rate {
            id: super::Id::new(),
            contract_id: None,
            unit_id: inventory::unit::Id::new(),
            occupancy: Occupancy::Double,
            board: board::Kind::RoomOnly,
            amount: usd("70"),
            board_cost: Money::zero(Currency::Usd),
            valid_from: None,
            valid_to: None,
            min_nights: None,
            max_nights: None,
            cost_overrides: crate::domain::pricing::CostOverrides::default(),
            pool_id: None,
            active: true,
            created_at: super::CreationDateTime::now(),
        };

        let check_in = Date::from_ymd(2025, 12, 1).unwrap();
        let check_out = Date::from_ymd(2025, 12, 3).unwrap();
        assert!(!rate.bookable_for(check_in, check_out, None));

        rate.valid_from = Some(Date::from_ymd(2025, 12, 1).unwrap());
        rate.valid_to = Some(Date::from_ymd(2025, 12, 31).unwrap());
        assert!(rate.bookable_for(check_in, check_out, None));
    }
}
