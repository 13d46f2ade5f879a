//! [`Contract`] read model definition.

#[cfg(doc)]
use crate::domain::{Booking, Contract, Rate};

/// Dependency probe of a [`Contract`]: whether anything still references
/// it.
///
/// A [`Contract`] with dependents is never deleted.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct Dependents {
    /// Whether any [`Rate`] is generated from the [`Contract`].
    pub rates: bool,

    /// Whether any [`Booking`] line resolves to one of the [`Contract`]'s
    /// [`Rate`]s.
    pub bookings: bool,
}
