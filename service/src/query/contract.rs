//! [`Query`] collection related to [`Contract`]s.

use common::operations::By;

use crate::domain::{contract, Contract};

use super::StorageQuery;

/// Queries a [`Contract`] by its ID.
pub type ById = StorageQuery<By<Option<Contract>, contract::Id>>;
