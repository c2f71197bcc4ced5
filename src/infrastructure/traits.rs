//! I/O boundary traits for testability
//!
//! Services read containers only through [`Container`], so they can be
//! tested against in-memory trees as well as real HDF5 files.

use std::io;
use std::path::Path;

use crate::domain::{Column, DatasetInfo, Node, ObjectId};

/// Read-only access to a hierarchical container of datasets.
///
/// Paths are relative to the root group, components separated by `/`;
/// the root group itself is the empty string.
pub trait Container: Send + Sync {
    /// Where the container lives, for messages.
    fn location(&self) -> &Path;

    /// Identity of the root group, `None` if the container cannot tell.
    fn root_id(&self) -> Option<ObjectId> {
        None
    }

    /// Direct members of a group.
    ///
    /// Members reached through different links to the same object carry
    /// the same [`ObjectId`].
    fn children(&self, group: &str) -> io::Result<Vec<Node>>;

    /// Check if a dataset exists at path.
    fn contains_dataset(&self, path: &str) -> bool;

    /// Element kind and shape of a dataset, without reading its data.
    fn describe(&self, path: &str) -> io::Result<DatasetInfo>;

    /// Read the whole dataset, flattened row-major.
    fn read(&self, path: &str) -> io::Result<Column>;
}
