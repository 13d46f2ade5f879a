//! [`Query`] collection related to [`Booking`]s.

use common::operations::By;

use crate::domain::{booking, Booking};

use super::StorageQuery;

/// Queries a [`Booking`] by its ID.
pub type ById = StorageQuery<By<Option<Booking>, booking::Id>>;
