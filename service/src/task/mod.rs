//! [`Task`] definition.

pub mod background;
pub mod recheck_conversions;

/// [`Task`] of the [`Service`].
///
/// [`Service`]: crate::Service
pub use common::Handler as Task;

pub use self::{
    background::Background, recheck_conversions::RecheckConversions,
};
