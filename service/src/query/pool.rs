//! [`Query`] collection related to [`AllocationPool`]s.

use common::operations::By;

use crate::domain::{pool, AllocationPool};

use super::StorageQuery;

/// Queries an [`AllocationPool`] by its ID.
///
/// Utilization and the derived status are computed on the returned
/// ledger itself.
pub type ById = StorageQuery<By<Option<AllocationPool>, pool::Id>>;
