//! HDF5-backed [`Container`]
//!
//! The `hdf5` crate serializes every library call behind a global lock,
//! so one handle can be shared by all comparison workers.

use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};

use hdf5::types::TypeDescriptor;
use hdf5::{Dataset, File, Group, LocationInfo, LocationToken, LocationType};
use tracing::{debug, instrument, warn};

use crate::domain::{Column, DatasetInfo, ElementKind, Node, NodeKind, ObjectId};
use crate::infrastructure::traits::Container;
use crate::infrastructure::{InfraError, InfraResult};

/// An HDF5 file opened read-only.
pub struct Hdf5Container {
    path: PathBuf,
    file: File,
    /// Object tokens seen so far; the position is the [`ObjectId`]
    tokens: Mutex<Vec<(u64, LocationToken)>>,
}

impl std::fmt::Debug for Hdf5Container {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Hdf5Container")
            .field("path", &self.path)
            .finish()
    }
}

impl Hdf5Container {
    /// Open an existing HDF5 file read-only.
    #[instrument]
    pub fn open(path: &Path) -> InfraResult<Self> {
        if !path.exists() {
            return Err(InfraError::Open {
                path: path.to_path_buf(),
                message: "no such file".to_string(),
            });
        }
        let file = File::open(path).map_err(|e| InfraError::Open {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        debug!("opened {}", path.display());
        Ok(Self {
            path: path.to_path_buf(),
            file,
            tokens: Mutex::new(Vec::new()),
        })
    }

    /// Stable id for the object behind `info` within this container.
    fn object_id(&self, info: &LocationInfo) -> ObjectId {
        let key = (info.fileno, info.token);
        let mut tokens = self.tokens.lock().unwrap_or_else(PoisonError::into_inner);
        let index = match tokens.iter().position(|seen| *seen == key) {
            Some(index) => index,
            None => {
                tokens.push(key);
                tokens.len() - 1
            }
        };
        ObjectId(index as u64)
    }

    fn group(&self, path: &str) -> hdf5::Result<Group> {
        if path.is_empty() {
            self.file.group("/")
        } else {
            self.file.group(path)
        }
    }

    fn dataset(&self, path: &str) -> io::Result<Dataset> {
        self.file.dataset(path).map_err(|e| h5_err(&self.path, path, e))
    }
}

fn h5_err(file: &Path, path: &str, e: hdf5::Error) -> io::Error {
    io::Error::other(format!("{}: {}: {}", file.display(), path, e))
}

/// Map an HDF5 type onto the comparator's element kinds.
pub fn element_kind(descriptor: &TypeDescriptor) -> ElementKind {
    match descriptor {
        TypeDescriptor::Integer(_) => ElementKind::Signed,
        TypeDescriptor::Unsigned(_) => ElementKind::Unsigned,
        TypeDescriptor::Boolean => ElementKind::Boolean,
        // read through the library's enum-to-integer conversion
        TypeDescriptor::Enum(e) if e.signed => ElementKind::Signed,
        TypeDescriptor::Enum(_) => ElementKind::Unsigned,
        TypeDescriptor::Float(_) => ElementKind::Float,
        other => ElementKind::Unsupported(other.to_string()),
    }
}

fn dataset_kind(dataset: &Dataset) -> ElementKind {
    match dataset.dtype().and_then(|dtype| dtype.to_descriptor()) {
        Ok(descriptor) => element_kind(&descriptor),
        Err(e) => ElementKind::Unsupported(e.to_string()),
    }
}

impl Container for Hdf5Container {
    fn location(&self) -> &Path {
        &self.path
    }

    fn root_id(&self) -> Option<ObjectId> {
        match self.group("").and_then(|root| root.loc_info()) {
            Ok(info) => Some(self.object_id(&info)),
            Err(e) => {
                warn!("cannot identify root group of {}: {e}", self.path.display());
                None
            }
        }
    }

    fn children(&self, group: &str) -> io::Result<Vec<Node>> {
        let handle = self.group(group).map_err(|e| h5_err(&self.path, group, e))?;
        let names = handle
            .member_names()
            .map_err(|e| h5_err(&self.path, group, e))?;

        let nodes = names
            .into_iter()
            .map(|name| match handle.loc_info_by_name(&name) {
                Ok(info) => {
                    let kind = match info.loc_type {
                        LocationType::Group => NodeKind::Group,
                        LocationType::Dataset => NodeKind::Dataset,
                        _ => NodeKind::Other,
                    };
                    let id = self.object_id(&info);
                    Node::new(name, kind).with_id(id)
                }
                Err(e) => {
                    warn!("cannot resolve {name} in group '{group}': {e}");
                    Node::new(name, NodeKind::Unresolved)
                }
            })
            .collect();
        Ok(nodes)
    }

    fn contains_dataset(&self, path: &str) -> bool {
        self.file.link_exists(path)
            && matches!(self.file.loc_type_by_name(path), Ok(LocationType::Dataset))
    }

    fn describe(&self, path: &str) -> io::Result<DatasetInfo> {
        let dataset = self.dataset(path)?;
        Ok(DatasetInfo {
            kind: dataset_kind(&dataset),
            shape: dataset.shape(),
        })
    }

    fn read(&self, path: &str) -> io::Result<Column> {
        let dataset = self.dataset(path)?;
        let wrap = |e| h5_err(&self.path, path, e);

        let column = match dataset_kind(&dataset) {
            ElementKind::Signed => Column::Signed(dataset.read_raw::<i64>().map_err(wrap)?),
            ElementKind::Unsigned => Column::Unsigned(dataset.read_raw::<u64>().map_err(wrap)?),
            ElementKind::Boolean => Column::Unsigned(
                dataset
                    .read_raw::<bool>()
                    .map_err(wrap)?
                    .into_iter()
                    .map(u64::from)
                    .collect(),
            ),
            ElementKind::Float => Column::Float(dataset.read_raw::<f64>().map_err(wrap)?),
            ElementKind::Unsupported(desc) => {
                return Err(io::Error::new(
                    io::ErrorKind::Unsupported,
                    format!("{}: {}: cannot read {} as numbers", self.path.display(), path, desc),
                ))
            }
        };
        debug!("read {path}: {} elements", column.len());
        Ok(column)
    }
}
