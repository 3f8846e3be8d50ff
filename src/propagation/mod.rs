//! Event-driven propagation.
//!
//! Every domain write produces a [`ModEvent`](crate::var::ModEvent). The
//! [`Scheduler`] keeps, per variable, the propagators subscribed to it and
//! the [`PropCondition`] they care about, and queues exactly those
//! propagators when a matching event fires. The fixpoint loop pops the
//! cheapest pending propagator until the queue drains or a domain empties.
//!
//! # References
//!
//! Schulte & Stuckey (2008), "Efficient Constraint Propagation Engines"

mod scheduler;
mod types;

pub use scheduler::{Fixpoint, PropQueue, Scheduler};
pub(crate) use scheduler::PropSlots;
pub use types::{
    PropCondition, PropCost, PropId, PropResult, PropStatus, Propagator, Subscription,
};
