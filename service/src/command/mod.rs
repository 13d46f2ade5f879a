//! [`Command`] definition.

pub mod adjust_pool_capacity;
pub mod cancel_booking;
pub mod confirm_booking;
pub mod convert_booking;
pub mod create_booking;
pub mod create_contract;
pub mod create_item;
pub mod create_pool;
pub mod delete_contract;
pub mod delete_item;
pub mod generate_rates;
pub mod record_pool_booking;
pub mod release_pool_booking;
pub mod terminate_contract;
pub mod update_contract;

/// [`Command`] of the [`Service`].
///
/// [`Service`]: crate::Service
pub use common::Handler as Command;

pub use self::{
    adjust_pool_capacity::AdjustPoolCapacity, cancel_booking::CancelBooking,
    confirm_booking::ConfirmBooking, convert_booking::ConvertBooking,
    create_booking::CreateBooking, create_contract::CreateContract,
    create_item::CreateItem, create_pool::CreatePool,
    delete_contract::DeleteContract, delete_item::DeleteItem,
    generate_rates::GenerateRates, record_pool_booking::RecordPoolBooking,
    release_pool_booking::ReleasePoolBooking,
    terminate_contract::TerminateContract, update_contract::UpdateContract,
};
