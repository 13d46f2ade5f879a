//! Domain definitions.

pub mod availability;
pub mod booking;
pub mod contract;
pub mod conversion;
pub mod inventory;
pub mod pool;
pub mod pricing;
pub mod rate;

pub use self::{
    booking::Booking, contract::Contract, inventory::Item,
    pool::AllocationPool, rate::Rate,
};
