//! Cache primitives shared by the staffdesk workspace.
//!
//! Nothing in here knows about users or directories. A [`QuerySlot`] holds one
//! cached query result together with its [`Freshness`], collapses concurrent
//! fetches into a single in-flight request and refuses to apply results that
//! were started before the latest invalidation.

mod error;
mod freshness;
mod slot;
mod task;

pub use error::Error;
pub use freshness::Freshness;
pub use slot::{QuerySlot, SlotState, Snapshot};
pub use task::{TaskHandle, TaskId};
