use std::collections::{BTreeMap, BTreeSet};
use std::env;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Once;

use tracing::{debug, info};
use tracing_subscriber::{
    filter::filter_fn,
    fmt::{self, format::FmtSpan},
    prelude::*,
    EnvFilter,
};

use crate::domain::{join_path, Column, DatasetInfo, ElementKind, Node, NodeKind, ObjectId};
use crate::infrastructure::traits::Container;

static TEST_SETUP: Once = Once::new();

pub fn init_test_setup() {
    TEST_SETUP.call_once(|| {
        if env::var("RUST_LOG").is_err() {
            env::set_var("RUST_LOG", "trace");
        }
        // global logging subscriber, used by all tracing log macros
        setup_test_logging();
        info!("Test Setup complete");
    });
}

fn setup_test_logging() {
    debug!("INIT: Attempting logger init from testing.rs");

    // Create a filter for noisy modules
    let noisy_modules = ["hdf5"];
    let module_filter = filter_fn(move |metadata| {
        !noisy_modules
            .iter()
            .any(|name| metadata.target().starts_with(name))
    });

    // Set up the subscriber with environment filter
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug"));

    // Build and set the subscriber
    let subscriber = tracing_subscriber::registry().with(
        fmt::layer()
            .with_writer(std::io::stderr)
            .with_target(true)
            .with_thread_names(false)
            .with_span_events(FmtSpan::ENTER)
            .with_span_events(FmtSpan::CLOSE)
            .with_filter(module_filter)
            .with_filter(env_filter),
    );

    // Only set if we haven't already set a global subscriber
    if tracing::dispatcher::has_been_set() {
        debug!("Tracing subscriber already set");
    } else {
        subscriber.try_init().unwrap_or_else(|e| {
            eprintln!("Error: Failed to set up logging: {}", e);
        });
    }
}

#[derive(Debug, Clone)]
enum Entry {
    Group,
    Broken,
    Dataset(DatasetInfo, Option<Column>),
    NamedType,
    Dangling,
    /// Hard link to the object at another path (`""` is the root group)
    Link(String),
}

/// In-memory [`Container`] for service tests.
///
/// Intermediate groups are created implicitly when a nested dataset is added.
/// Object ids are positions in the sorted entry map, the root group is 0.
#[derive(Debug, Clone)]
pub struct MemoryContainer {
    location: PathBuf,
    entries: BTreeMap<String, Entry>,
}

impl MemoryContainer {
    pub fn new(location: impl Into<PathBuf>) -> Self {
        Self {
            location: location.into(),
            entries: BTreeMap::new(),
        }
    }

    fn insert(mut self, path: &str, entry: Entry) -> Self {
        let mut parent = Self::parent_of(path);
        while !parent.is_empty() {
            self.entries
                .entry(parent.to_string())
                .or_insert(Entry::Group);
            parent = Self::parent_of(parent);
        }
        self.entries.insert(path.to_string(), entry);
        self
    }

    /// Add a dataset; its shape is one-dimensional.
    pub fn with_dataset(self, path: &str, column: Column) -> Self {
        let shape = vec![column.len()];
        self.with_shaped_dataset(path, shape, column)
    }

    pub fn with_shaped_dataset(self, path: &str, shape: Vec<usize>, column: Column) -> Self {
        let kind = match column {
            Column::Signed(_) => ElementKind::Signed,
            Column::Unsigned(_) => ElementKind::Unsigned,
            Column::Float(_) => ElementKind::Float,
        };
        self.insert(path, Entry::Dataset(DatasetInfo { kind, shape }, Some(column)))
    }

    /// Add a dataset of a kind that has no numeric column.
    pub fn with_unsupported(self, path: &str, description: &str) -> Self {
        let info = DatasetInfo {
            kind: ElementKind::Unsupported(description.to_string()),
            shape: vec![1],
        };
        self.insert(path, Entry::Dataset(info, None))
    }

    pub fn with_group(self, path: &str) -> Self {
        self.insert(path, Entry::Group)
    }

    /// Add a group whose members cannot be listed.
    pub fn with_broken_group(self, path: &str) -> Self {
        self.insert(path, Entry::Broken)
    }

    pub fn with_named_type(self, path: &str) -> Self {
        self.insert(path, Entry::NamedType)
    }

    pub fn with_dangling_link(self, path: &str) -> Self {
        self.insert(path, Entry::Dangling)
    }

    /// Add a hard link at `path` to the existing object at `target`.
    pub fn with_hard_link(self, path: &str, target: &str) -> Self {
        self.insert(path, Entry::Link(target.to_string()))
    }

    /// Path of the object `path` refers to, following hard links.
    fn resolve(&self, path: &str) -> String {
        let mut resolved = String::new();
        for part in path.split('/').filter(|p| !p.is_empty()) {
            let next = join_path(&resolved, part);
            resolved = match self.entries.get(&next) {
                Some(Entry::Link(target)) => target.clone(),
                _ => next,
            };
        }
        resolved
    }

    fn object_id(&self, resolved: &str) -> Option<ObjectId> {
        if resolved.is_empty() {
            return Some(ObjectId(0));
        }
        self.entries
            .keys()
            .position(|key| key == resolved)
            .map(|index| ObjectId(index as u64 + 1))
    }

    fn parent_of(path: &str) -> &str {
        path.rsplit_once('/').map(|(parent, _)| parent).unwrap_or("")
    }

    fn dataset(&self, path: &str) -> io::Result<(&DatasetInfo, Option<&Column>)> {
        match self.entries.get(&self.resolve(path)) {
            Some(Entry::Dataset(info, column)) => Ok((info, column.as_ref())),
            _ => Err(io::Error::new(
                io::ErrorKind::NotFound,
                format!("no dataset {path}"),
            )),
        }
    }
}

impl Container for MemoryContainer {
    fn location(&self) -> &Path {
        &self.location
    }

    fn root_id(&self) -> Option<ObjectId> {
        Some(ObjectId(0))
    }

    fn children(&self, group: &str) -> io::Result<Vec<Node>> {
        let group = self.resolve(group);
        let group = group.as_str();
        if let Some(Entry::Broken) = self.entries.get(group) {
            return Err(io::Error::new(
                io::ErrorKind::InvalidData,
                format!("corrupt group {group}"),
            ));
        }
        let names: BTreeSet<&String> = self
            .entries
            .keys()
            .filter(|path| Self::parent_of(path) == group && !path.is_empty())
            .collect();
        Ok(names
            .into_iter()
            .map(|path| {
                let name = path.rsplit('/').next().unwrap_or(path);
                let target = self.resolve(path);
                let kind = match self.entries.get(&target) {
                    _ if target.is_empty() => NodeKind::Group,
                    Some(Entry::Group | Entry::Broken) => NodeKind::Group,
                    Some(Entry::Dataset(..)) => NodeKind::Dataset,
                    Some(Entry::NamedType) => NodeKind::Other,
                    Some(Entry::Dangling | Entry::Link(_)) | None => NodeKind::Unresolved,
                };
                match self.object_id(&target) {
                    Some(id) if kind != NodeKind::Unresolved => Node::new(name, kind).with_id(id),
                    _ => Node::new(name, kind),
                }
            })
            .collect())
    }

    fn contains_dataset(&self, path: &str) -> bool {
        matches!(self.entries.get(&self.resolve(path)), Some(Entry::Dataset(..)))
    }

    fn describe(&self, path: &str) -> io::Result<DatasetInfo> {
        self.dataset(path).map(|(info, _)| info.clone())
    }

    fn read(&self, path: &str) -> io::Result<Column> {
        match self.dataset(path)? {
            (_, Some(column)) => Ok(column.clone()),
            (info, None) => Err(io::Error::new(
                io::ErrorKind::Unsupported,
                format!("cannot read {} as numbers", info.kind),
            )),
        }
    }
}
