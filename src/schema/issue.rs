//! Validation issues - the structured failure side of every schema check.
//!
//! A failed validation never stops at the first problem. Each violated constraint
//! becomes an [`Issue`] carrying the path of the offending field, a machine-readable
//! [`IssueCode`] and a human message, and all issues of one pass are returned together
//! as [`ValidationErrors`].

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// One step in a path through a nested input value.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PathSegment {
    /// Object member name
    Key(String),
    /// Array element index
    Index(usize),
}

/// Location of a field inside the validated input, e.g. `date_range.start` or `tasks[2]`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FieldPath(Vec<PathSegment>);

impl FieldPath {
    /// The empty path, pointing at the input value itself.
    #[must_use]
    pub const fn root() -> Self {
        Self(Vec::new())
    }

    /// Returns a new path extended by an object key.
    #[must_use]
    pub fn key(&self, name: &str) -> Self {
        let mut segments = self.0.clone();
        segments.push(PathSegment::Key(name.to_string()));
        Self(segments)
    }

    /// Returns a new path extended by an array index.
    #[must_use]
    pub fn index(&self, index: usize) -> Self {
        let mut segments = self.0.clone();
        segments.push(PathSegment::Index(index));
        Self(segments)
    }

    /// Joins two paths, used when a refinement reports relative to its object.
    #[must_use]
    pub fn join(&self, other: &Self) -> Self {
        let mut segments = self.0.clone();
        segments.extend(other.0.iter().cloned());
        Self(segments)
    }

    /// Segments of the path, outermost first.
    #[must_use]
    pub fn segments(&self) -> &[PathSegment] {
        &self.0
    }

    /// Whether this is the path of the top-level input.
    #[must_use]
    pub fn is_root(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for FieldPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            return f.write_str("(root)");
        }
        for (i, segment) in self.0.iter().enumerate() {
            match segment {
                PathSegment::Key(name) if i == 0 => f.write_str(name)?,
                PathSegment::Key(name) => write!(f, ".{name}")?,
                PathSegment::Index(index) => write!(f, "[{index}]")?,
            }
        }
        Ok(())
    }
}

/// Kind of violation, grouped into shape, constraint and cross-field failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IssueCode {
    /// Value has the wrong JSON type
    InvalidType,
    /// Required field is absent
    Required,
    /// Below a minimum length, count or value
    TooSmall,
    /// Above a maximum length, count or value
    TooBig,
    /// String does not match its format or pattern
    InvalidFormat,
    /// String is not one of the allowed enumeration values
    InvalidEnumValue,
    /// A cross-field refinement failed
    Custom,
}

/// A single violated constraint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Issue {
    /// Where in the input the violation was found
    pub path: FieldPath,
    /// What kind of violation it is
    pub code: IssueCode,
    /// Message suitable for showing next to the field
    pub message: String,
}

impl Issue {
    /// Builds an issue at `path`.
    #[must_use]
    pub fn new(path: FieldPath, code: IssueCode, message: impl Into<String>) -> Self {
        Self {
            path,
            code,
            message: message.into(),
        }
    }
}

impl fmt::Display for Issue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.path, self.message)
    }
}

/// Every issue found while validating one input.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ValidationErrors(Vec<Issue>);

impl ValidationErrors {
    /// An empty list.
    #[must_use]
    pub const fn new() -> Self {
        Self(Vec::new())
    }

    /// Builds an error list holding a single issue.
    #[must_use]
    pub fn single(path: FieldPath, code: IssueCode, message: impl Into<String>) -> Self {
        Self(vec![Issue::new(path, code, message)])
    }

    /// Records one more issue.
    pub fn push(&mut self, issue: Issue) {
        self.0.push(issue);
    }

    /// Whether nothing was collected.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Number of collected issues.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Collected issues in discovery order.
    #[must_use]
    pub fn issues(&self) -> &[Issue] {
        &self.0
    }

    /// Consumes the list, returning the issues.
    #[must_use]
    pub fn into_issues(self) -> Vec<Issue> {
        self.0
    }

    /// Issues whose path renders exactly as `path` (e.g. `"confirmPassword"`, `"tasks[1]"`).
    #[must_use]
    pub fn for_field(&self, path: &str) -> Vec<&Issue> {
        self.0
            .iter()
            .filter(|issue| issue.path.to_string() == path)
            .collect()
    }

    /// Groups messages by rendered field path, the shape form handlers show to users.
    #[must_use]
    pub fn field_messages(&self) -> BTreeMap<String, Vec<String>> {
        let mut grouped: BTreeMap<String, Vec<String>> = BTreeMap::new();
        for issue in &self.0 {
            grouped
                .entry(issue.path.to_string())
                .or_default()
                .push(issue.message.clone());
        }
        grouped
    }

    /// `Ok(())` when nothing was collected, otherwise the collected errors.
    pub fn into_result(self) -> Result<(), Self> {
        if self.0.is_empty() { Ok(()) } else { Err(self) }
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "validation failed with {} issue(s)", self.0.len())?;
        for (i, issue) in self.0.iter().enumerate() {
            let sep = if i == 0 { ": " } else { "; " };
            write!(f, "{sep}{issue}")?;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationErrors {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_path_display() {
        let path = FieldPath::root().key("date_range").key("start");
        assert_eq!(path.to_string(), "date_range.start");

        let path = FieldPath::root().key("tasks").index(3);
        assert_eq!(path.to_string(), "tasks[3]");

        assert_eq!(FieldPath::root().to_string(), "(root)");
    }

    #[test]
    fn test_field_messages_groups_by_path() {
        let mut errors = ValidationErrors::new();
        errors.push(Issue::new(
            FieldPath::root().key("title"),
            IssueCode::TooSmall,
            "Title is required",
        ));
        errors.push(Issue::new(
            FieldPath::root().key("title"),
            IssueCode::InvalidFormat,
            "second",
        ));
        errors.push(Issue::new(
            FieldPath::root().key("rank"),
            IssueCode::TooBig,
            "too big",
        ));

        let grouped = errors.field_messages();
        assert_eq!(grouped.len(), 2);
        assert_eq!(grouped["title"].len(), 2);
        assert_eq!(errors.for_field("rank").len(), 1);
        assert!(errors.to_string().starts_with("validation failed with 3 issue(s)"));
    }
}
