//! Dataset enumeration
//!
//! Walks a container depth-first and collects the paths of all leaf datasets.

use std::collections::HashSet;

use tracing::{debug, instrument, warn};

use crate::application::{ApplicationError, ApplicationResult};
use crate::domain::{join_path, NodeKind, ObjectId};
use crate::infrastructure::traits::Container;

/// Collects dataset paths from a container.
#[derive(Debug, Clone, Copy)]
pub struct DatasetEnumerator {
    max_depth: usize,
}

impl DatasetEnumerator {
    /// Create an enumerator that refuses hierarchies nested deeper than `max_depth` groups.
    pub fn new(max_depth: usize) -> Self {
        Self { max_depth }
    }

    /// All dataset paths reachable from the root group.
    ///
    /// Pre-order, members of each group in increasing name order. Groups
    /// themselves are not listed; named datatypes and unresolvable links
    /// are skipped. Every object is visited once, under the first path that
    /// reaches it, so hard-link cycles end the descent.
    ///
    /// # Errors
    /// Fails if any group cannot be listed or nesting exceeds the depth bound.
    #[instrument(skip(self, container), fields(location = %container.location().display()))]
    pub fn datasets(&self, container: &dyn Container) -> ApplicationResult<Vec<String>> {
        let mut paths = Vec::new();
        let mut visited = HashSet::new();
        if let Some(root) = container.root_id() {
            visited.insert(root);
        }
        self.walk(container, "", 0, &mut visited, &mut paths)?;
        debug!("datasets: found {}", paths.len());
        Ok(paths)
    }

    fn walk(
        &self,
        container: &dyn Container,
        group: &str,
        depth: usize,
        visited: &mut HashSet<ObjectId>,
        paths: &mut Vec<String>,
    ) -> ApplicationResult<()> {
        if depth > self.max_depth {
            return Err(ApplicationError::TooDeep {
                location: container.location().to_path_buf(),
                group: group.to_string(),
                max_depth: self.max_depth,
            });
        }

        let mut children =
            container
                .children(group)
                .map_err(|source| ApplicationError::Traversal {
                    location: container.location().to_path_buf(),
                    group: group.to_string(),
                    source,
                })?;
        children.sort_by(|a, b| a.name.cmp(&b.name));

        for child in children {
            let path = join_path(group, &child.name);
            if let Some(id) = child.id {
                if !visited.insert(id) {
                    debug!("skipping {path}: object already visited");
                    continue;
                }
            }
            match child.kind {
                NodeKind::Dataset => paths.push(path),
                NodeKind::Group => self.walk(container, &path, depth + 1, visited, paths)?,
                NodeKind::Unresolved => {
                    warn!("skipping unresolvable link {path} in {}", container.location().display())
                }
                NodeKind::Other => debug!("skipping {path}: not a dataset"),
            }
        }
        Ok(())
    }
}

/// Paths of `first` in order, followed by the paths only `second` has.
pub fn union_paths(first: Vec<String>, second: Vec<String>) -> Vec<String> {
    let seen: HashSet<String> = first.iter().cloned().collect();
    let mut paths = first;
    paths.extend(second.into_iter().filter(|p| !seen.contains(p)));
    paths
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn given_overlapping_lists_when_union_then_first_order_then_extras() {
        let first = vec!["a".to_string(), "g/b".to_string()];
        let second = vec!["extra".to_string(), "a".to_string(), "z".to_string()];
        assert_eq!(
            union_paths(first, second),
            vec!["a", "g/b", "extra", "z"]
        );
    }

    #[test]
    fn given_empty_second_when_union_then_first_unchanged() {
        let first = vec!["a".to_string()];
        assert_eq!(union_paths(first.clone(), vec![]), first);
    }
}
