//! [`Booking`] read model definitions.

#[cfg(doc)]
use crate::domain::{booking::Purchase, Booking};

/// Selector of every non-cancelled [`Booking`].
///
/// Only non-cancelled [`Booking`]s consume capacity.
#[derive(Clone, Copy, Debug, Default)]
pub struct NonCancelled;

/// Selector of every non-cancelled [`Booking`] with at least one
/// [`Purchase::BuyToOrder`] line.
#[derive(Clone, Copy, Debug, Default)]
pub struct WithBuyToOrder;
