//! Normalized diff service
//!
//! Enumerates datasets, then compares every corresponding pair on a rayon
//! pool. Dataset-level failures become outcomes, file-level ones abort.

use std::sync::Arc;

use rayon::prelude::*;
use tracing::{debug, info, instrument};

use crate::application::services::enumerate::{union_paths, DatasetEnumerator};
use crate::application::{ApplicationError, ApplicationResult};
use crate::config::Settings;
use crate::domain::{
    Column, Comparator, ComparisonResult, DatasetInfo, DomainError, ScaleStrategy, Side, Verdict,
    Worst,
};
use crate::infrastructure::traits::Container;

/// Result of processing one dataset path.
#[derive(Debug)]
pub enum DatasetOutcome {
    /// Worst normalized difference exceeds the precision
    Differs(ComparisonResult),
    /// Compared, nothing above the precision (`worst` is `None` for empty datasets)
    Within { path: String, worst: Option<Worst> },
    /// Dataset exists on one side only
    Missing { path: String, side: Side },
    /// Dataset-level error; the run continued
    Failed(ApplicationError),
}

impl DatasetOutcome {
    pub fn path(&self) -> &str {
        match self {
            DatasetOutcome::Differs(result) => &result.path,
            DatasetOutcome::Within { path, .. } => path,
            DatasetOutcome::Missing { path, .. } => path,
            DatasetOutcome::Failed(e) => e.dataset_path().unwrap_or_default(),
        }
    }
}

/// Ordered outcomes of a whole run.
#[derive(Debug, Default)]
pub struct DiffReport {
    /// One entry per enumerated path, in enumeration order
    pub outcomes: Vec<DatasetOutcome>,
}

impl DiffReport {
    /// Reported differences, in enumeration order.
    pub fn diffs(&self) -> impl Iterator<Item = &ComparisonResult> {
        self.outcomes.iter().filter_map(|o| match o {
            DatasetOutcome::Differs(result) => Some(result),
            _ => None,
        })
    }

    /// Datasets present on one side only.
    pub fn missing(&self) -> impl Iterator<Item = (&str, Side)> {
        self.outcomes.iter().filter_map(|o| match o {
            DatasetOutcome::Missing { path, side } => Some((path.as_str(), *side)),
            _ => None,
        })
    }

    /// Dataset-level errors.
    pub fn failures(&self) -> impl Iterator<Item = &ApplicationError> {
        self.outcomes.iter().filter_map(|o| match o {
            DatasetOutcome::Failed(e) => Some(e),
            _ => None,
        })
    }

    /// Number of dataset pairs that were actually compared.
    pub fn compared(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|o| matches!(o, DatasetOutcome::Differs(_) | DatasetOutcome::Within { .. }))
            .count()
    }

    pub fn has_differences(&self) -> bool {
        self.diffs().next().is_some()
    }

    pub fn has_failures(&self) -> bool {
        self.failures().next().is_some()
    }
}

/// Service comparing two containers dataset by dataset.
pub struct DiffService {
    file1: Arc<dyn Container>,
    file2: Arc<dyn Container>,
    settings: Arc<Settings>,
}

impl DiffService {
    /// Create a new diff service.
    pub fn new(
        file1: Arc<dyn Container>,
        file2: Arc<dyn Container>,
        settings: Arc<Settings>,
    ) -> Self {
        Self {
            file1,
            file2,
            settings,
        }
    }

    /// Paths to compare: file1's datasets, plus file2-only ones in symmetric mode.
    ///
    /// # Errors
    /// Traversal failures of either file are fatal.
    pub fn paths(&self) -> ApplicationResult<Vec<String>> {
        let enumerator = DatasetEnumerator::new(self.settings.max_depth);
        let first = enumerator.datasets(self.file1.as_ref())?;
        if !self.settings.symmetric {
            return Ok(first);
        }
        let second = enumerator.datasets(self.file2.as_ref())?;
        Ok(union_paths(first, second))
    }

    /// Compare every dataset and collect the outcomes in enumeration order.
    ///
    /// Uses parallel execution with rayon when `jobs != 1`.
    #[instrument(skip(self))]
    pub fn run(&self) -> ApplicationResult<DiffReport> {
        let paths = self.paths()?;
        info!(
            "comparing {} datasets of {} against {}",
            paths.len(),
            self.file1.location().display(),
            self.file2.location().display()
        );

        let outcomes: Vec<DatasetOutcome> = if self.settings.jobs == 1 {
            paths.iter().map(|path| self.compare_dataset(path)).collect()
        } else {
            let pool = rayon::ThreadPoolBuilder::new()
                .num_threads(self.settings.jobs)
                .build()
                .map_err(|e| ApplicationError::Config {
                    message: format!("cannot start {} worker threads: {e}", self.settings.jobs),
                })?;
            // collect on an indexed iterator preserves input order
            pool.install(|| {
                paths
                    .par_iter()
                    .map(|path| self.compare_dataset(path))
                    .collect()
            })
        };

        Ok(DiffReport { outcomes })
    }

    /// Compare the dataset at `path` in both files.
    pub fn compare_dataset(&self, path: &str) -> DatasetOutcome {
        if !self.file1.contains_dataset(path) {
            debug!("compare_dataset: {path} missing in file1");
            return DatasetOutcome::Missing {
                path: path.to_string(),
                side: Side::File1,
            };
        }
        if !self.file2.contains_dataset(path) {
            debug!("compare_dataset: {path} missing in file2");
            return DatasetOutcome::Missing {
                path: path.to_string(),
                side: Side::File2,
            };
        }

        match self.try_compare(path) {
            Ok(Verdict::Differs(result)) => DatasetOutcome::Differs(result),
            Ok(Verdict::Within(worst)) => DatasetOutcome::Within {
                path: path.to_string(),
                worst,
            },
            Err(e) => DatasetOutcome::Failed(e),
        }
    }

    fn try_compare(&self, path: &str) -> ApplicationResult<Verdict> {
        let info1 = describe(self.file1.as_ref(), path, Side::File1)?;
        let info2 = describe(self.file2.as_ref(), path, Side::File2)?;

        // scale follows file1's kind; file2 only needs to be numeric
        let strategy = strategy_for(path, &info1, Side::File1)?;
        strategy_for(path, &info2, Side::File2)?;

        if info1.len() != info2.len() {
            return Err(DomainError::ShapeMismatch {
                path: path.to_string(),
                left: info1.shape,
                right: info2.shape,
            }
            .into());
        }
        if info1.shape != info2.shape {
            debug!(
                "compare_dataset: {path} shapes {:?} and {:?} differ, comparing flat",
                info1.shape, info2.shape
            );
        }

        let x = read(self.file1.as_ref(), path, Side::File1)?;
        let y = read(self.file2.as_ref(), path, Side::File2)?;

        let verdict = Comparator::new(self.settings.precision).evaluate(path, &x, &y, strategy)?;
        debug!("compare_dataset: {path} ({strategy:?}) -> {verdict:?}");
        Ok(verdict)
    }
}

fn describe(container: &dyn Container, path: &str, side: Side) -> ApplicationResult<DatasetInfo> {
    container
        .describe(path)
        .map_err(|source| ApplicationError::Read {
            path: path.to_string(),
            side,
            source,
        })
}

fn read(container: &dyn Container, path: &str, side: Side) -> ApplicationResult<Column> {
    container.read(path).map_err(|source| ApplicationError::Read {
        path: path.to_string(),
        side,
        source,
    })
}

fn strategy_for(path: &str, info: &DatasetInfo, side: Side) -> ApplicationResult<ScaleStrategy> {
    ScaleStrategy::for_kind(&info.kind).ok_or_else(|| {
        DomainError::UnsupportedKind {
            path: path.to_string(),
            file: side,
            kind: info.kind.to_string(),
        }
        .into()
    })
}
