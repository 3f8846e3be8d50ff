//! Built-in propagators.
//!
//! - [`NoOverlap`]: rectangles placed by coordinate variables must not
//!   overlap
//! - [`Linear`]: weighted sums compared against a constant
//! - [`Distinct`]: pairwise different values
//!
//! All of them are normally posted through the helpers on
//! [`Space`](crate::space::Space), which validate arguments and skip
//! posting into a failed space.

mod distinct;
mod linear;
mod no_overlap;

pub use distinct::Distinct;
pub use linear::{Linear, Relation};
pub use no_overlap::NoOverlap;
