//! Domain layer: entities and comparison logic
//!
//! This layer is independent of external concerns (no I/O, no CLI, no config loading).

pub mod compare;
pub mod entities;
pub mod error;
pub mod scaling;

pub use compare::{Comparator, Verdict, Worst};
pub use entities::*;
pub use error::DomainError;
pub use scaling::{min_max_scale, ScaleStrategy, Scaled};
