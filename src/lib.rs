//! Normalized diff of the numeric datasets in two HDF5 files.
//!
//! Datasets are matched by path. Integer data is compared on raw values,
//! floating-point data after min-max scaling each array into `[0, 1]`, and
//! only the single worst element per dataset is reported.

pub mod application;
pub mod cli;
pub mod config;
pub mod domain;
pub mod exitcode;
pub mod infrastructure;
pub mod util;
