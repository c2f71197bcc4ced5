//! Application services
//!
//! Concrete service implementations that orchestrate domain logic.
//! Services depend on the [`Container`](crate::infrastructure::traits::Container)
//! boundary trait but are themselves concrete structs, not traits.

mod diff;
mod enumerate;

pub use diff::{DatasetOutcome, DiffReport, DiffService};
pub use enumerate::{union_paths, DatasetEnumerator};
