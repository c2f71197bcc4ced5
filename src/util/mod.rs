//! Small helpers shared by the CLI and the tests

pub mod path;
pub mod testing;
