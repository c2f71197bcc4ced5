//! Domain entities: core data structures

use std::fmt;

/// Numeric kind of a dataset's elements.
///
/// Drives the choice of [`ScaleStrategy`](crate::domain::ScaleStrategy).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ElementKind {
    Signed,
    Unsigned,
    Boolean,
    Float,
    /// Anything the comparator cannot handle (strings, compounds, ...)
    Unsupported(String),
}

impl ElementKind {
    /// Integer-like kinds compare on raw values.
    pub fn is_integer(&self) -> bool {
        matches!(
            self,
            ElementKind::Signed | ElementKind::Unsigned | ElementKind::Boolean
        )
    }
}

impl fmt::Display for ElementKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ElementKind::Signed => f.write_str("signed integer"),
            ElementKind::Unsigned => f.write_str("unsigned integer"),
            ElementKind::Boolean => f.write_str("boolean"),
            ElementKind::Float => f.write_str("float"),
            ElementKind::Unsupported(desc) => write!(f, "unsupported ({desc})"),
        }
    }
}

/// Kind of a member inside a container group.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    Group,
    Dataset,
    /// Named datatypes and other objects that are neither
    Other,
    /// Link target could not be resolved (dangling soft/external link)
    Unresolved,
}

/// Identity of an object inside a container, shared by every hard link to it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ObjectId(pub u64);

/// A direct member of a group.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Node {
    /// Member name (single path component)
    pub name: String,
    pub kind: NodeKind,
    /// Target object, `None` when the link cannot be resolved
    pub id: Option<ObjectId>,
}

impl Node {
    pub fn new(name: impl Into<String>, kind: NodeKind) -> Self {
        Self {
            name: name.into(),
            kind,
            id: None,
        }
    }

    pub fn with_id(mut self, id: ObjectId) -> Self {
        self.id = Some(id);
        self
    }
}

/// Metadata of a dataset, available without reading its data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatasetInfo {
    pub kind: ElementKind,
    pub shape: Vec<usize>,
}

impl DatasetInfo {
    /// Total number of elements (1 for scalar datasets).
    pub fn len(&self) -> usize {
        self.shape.iter().product()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Flat, row-major materialization of a dataset.
#[derive(Debug, Clone, PartialEq)]
pub enum Column {
    Signed(Vec<i64>),
    Unsigned(Vec<u64>),
    Float(Vec<f64>),
}

impl Column {
    pub fn len(&self) -> usize {
        match self {
            Column::Signed(v) => v.len(),
            Column::Unsigned(v) => v.len(),
            Column::Float(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Raw element at `index`.
    pub fn get(&self, index: usize) -> Option<Scalar> {
        match self {
            Column::Signed(v) => v.get(index).copied().map(Scalar::Signed),
            Column::Unsigned(v) => v.get(index).copied().map(Scalar::Unsigned),
            Column::Float(v) => v.get(index).copied().map(Scalar::Float),
        }
    }

    /// Lossy view of every element as `f64`.
    pub fn to_f64(&self) -> Vec<f64> {
        match self {
            Column::Signed(v) => v.iter().map(|&x| x as f64).collect(),
            Column::Unsigned(v) => v.iter().map(|&x| x as f64).collect(),
            Column::Float(v) => v.clone(),
        }
    }
}

/// A single raw element.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Scalar {
    Signed(i64),
    Unsigned(u64),
    Float(f64),
}

impl Scalar {
    /// Exact integer value, `None` for floats.
    pub fn as_i128(self) -> Option<i128> {
        match self {
            Scalar::Signed(x) => Some(x as i128),
            Scalar::Unsigned(x) => Some(x as i128),
            Scalar::Float(_) => None,
        }
    }

    pub fn as_f64(self) -> f64 {
        match self {
            Scalar::Signed(x) => x as f64,
            Scalar::Unsigned(x) => x as f64,
            Scalar::Float(x) => x,
        }
    }
}

impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scalar::Signed(x) => write!(f, "{x}"),
            Scalar::Unsigned(x) => write!(f, "{x}"),
            // Debug keeps the decimal point and switches to exponent form for tiny/huge values
            Scalar::Float(x) => write!(f, "{x:?}"),
        }
    }
}

/// Which side of the comparison a dataset is missing from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    File1,
    File2,
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Side::File1 => f.write_str("file1"),
            Side::File2 => f.write_str("file2"),
        }
    }
}

/// The single worst element of a dataset pair whose difference exceeds the precision.
#[derive(Debug, Clone, PartialEq)]
pub struct ComparisonResult {
    /// Dataset path relative to the root group
    pub path: String,
    /// Flat (row-major) index of the worst element
    pub index: usize,
    /// Raw value in file1
    pub x: Scalar,
    /// Raw value in file2
    pub y: Scalar,
    /// Normalized absolute difference that triggered the report
    pub difference: f64,
}

impl fmt::Display for ComparisonResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "# DIFF : (dataset: {}, id: {}, x (file1): {}, y (file2): {})",
            self.path, self.index, self.x, self.y
        )
    }
}

/// Join a group path and a member name into a dataset path.
///
/// The root group is the empty string, so top-level members carry no prefix.
pub fn join_path(group: &str, name: &str) -> String {
    if group.is_empty() {
        name.to_string()
    } else {
        format!("{group}/{name}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn given_integer_scalars_when_displayed_then_prints_decimal() {
        assert_eq!(Scalar::Signed(-31).to_string(), "-31");
        assert_eq!(Scalar::Unsigned(31).to_string(), "31");
    }

    #[test]
    fn given_float_scalars_when_displayed_then_keeps_float_form() {
        assert_eq!(Scalar::Float(30.0).to_string(), "30.0");
        assert_eq!(Scalar::Float(0.25).to_string(), "0.25");
        assert_eq!(Scalar::Float(f64::NAN).to_string(), "NaN");
    }

    #[test]
    fn given_comparison_result_when_displayed_then_matches_diff_line() {
        let result = ComparisonResult {
            path: "grp/b".into(),
            index: 2,
            x: Scalar::Signed(30),
            y: Scalar::Signed(31),
            difference: 1.0,
        };
        assert_eq!(
            result.to_string(),
            "# DIFF : (dataset: grp/b, id: 2, x (file1): 30, y (file2): 31)"
        );
    }

    #[test]
    fn given_root_group_when_joining_then_no_leading_slash() {
        assert_eq!(join_path("", "a"), "a");
        assert_eq!(join_path("grp", "a"), "grp/a");
        assert_eq!(join_path("grp/sub", "a"), "grp/sub/a");
    }

    #[test]
    fn given_scalar_shape_when_len_then_one() {
        let info = DatasetInfo {
            kind: ElementKind::Float,
            shape: vec![],
        };
        assert_eq!(info.len(), 1);
        assert!(!info.is_empty());
    }

    #[test]
    fn test_integer_kinds() {
        assert!(ElementKind::Signed.is_integer());
        assert!(ElementKind::Boolean.is_integer());
        assert!(!ElementKind::Float.is_integer());
        assert!(!ElementKind::Unsupported("string".into()).is_integer());
    }
}
