//! Recoverable issues found while processing a design.
//!
//! Passes that degrade gracefully record what they could not handle as
//! [`Diagnostic`]s in an [`IssueSet`] instead of failing.
#![warn(missing_docs)]

use std::fmt::{Debug, Display};

use serde::{Deserialize, Serialize};


/// An issue to report to users.
pub trait Diagnostic: Debug + Display {
    /// What the user can do to resolve the issue, if anything.
    fn help(&self) -> Option<Box<dyn Display>> {
        None
    }

    /// How serious the issue is. Defaults to [`Severity::default`].
    fn severity(&self) -> Severity {
        Default::default()
    }

    /// Logs the issue at the level matching its [severity](Diagnostic::severity).
    fn log(&self) {
        match self.severity() {
            Severity::Info => tracing::info!(issue = ?self, "{}", self),
            Severity::Warning => tracing::warn!(issue = ?self, "{}", self),
            Severity::Error => tracing::error!(issue = ?self, "{}", self),
        }
    }
}

/// Severity levels, from least to most serious.
#[derive(
    Copy, Clone, Debug, Default, Hash, Eq, PartialEq, PartialOrd, Ord, Serialize, Deserialize,
)]
pub enum Severity {
    /// Informational. Nothing was lost.
    Info,
    /// Part of the input was skipped.
    #[default]
    Warning,
    /// The result is not usable.
    Error,
}

impl Severity {
    /// The `tracing` level for this severity.
    #[inline]
    pub const fn as_tracing_level(&self) -> tracing::Level {
        match *self {
            Self::Info => tracing::Level::INFO,
            Self::Warning => tracing::Level::WARN,
            Self::Error => tracing::Level::ERROR,
        }
    }

    /// Returns `true` for [`Severity::Error`].
    #[inline]
    pub fn is_error(&self) -> bool {
        matches!(*self, Self::Error)
    }
}

impl Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match *self {
            Self::Info => "info",
            Self::Warning => "warning",
            Self::Error => "error",
        })
    }
}

/// Issues in the order they were recorded, with per-severity counts.
#[derive(Debug, Clone)]
pub struct IssueSet<T> {
    issues: Vec<T>,
    counts: [usize; 3],
}

impl<T> Default for IssueSet<T> {
    fn default() -> Self {
        Self {
            issues: Vec::new(),
            counts: [0; 3],
        }
    }
}

impl<T> IssueSet<T> {
    /// Creates an empty issue set.
    #[inline]
    pub fn new() -> Self {
        Default::default()
    }

    /// Iterates over the issues in recording order.
    #[inline]
    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.issues.iter()
    }

    /// Iterates over the issues satisfying `pred`.
    pub fn matching<'a>(
        &'a self,
        mut pred: impl FnMut(&T) -> bool + 'a,
    ) -> impl Iterator<Item = &'a T> + 'a {
        self.issues.iter().filter(move |issue| pred(issue))
    }

    /// The number of issues.
    #[inline]
    pub fn len(&self) -> usize {
        self.issues.len()
    }

    /// Returns `true` if nothing was recorded.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.issues.is_empty()
    }

    /// The number of issues of the given severity.
    #[inline]
    pub fn count(&self, severity: Severity) -> usize {
        self.counts[severity as usize]
    }

    /// The number of errors.
    #[inline]
    pub fn num_errors(&self) -> usize {
        self.count(Severity::Error)
    }

    /// The number of warnings.
    #[inline]
    pub fn num_warnings(&self) -> usize {
        self.count(Severity::Warning)
    }

    /// Returns `true` if any issue is an error.
    #[inline]
    pub fn has_error(&self) -> bool {
        self.num_errors() > 0
    }

    /// Returns `true` if any issue is a warning.
    #[inline]
    pub fn has_warning(&self) -> bool {
        self.num_warnings() > 0
    }
}

impl<T: Diagnostic> IssueSet<T> {
    /// Records an issue.
    pub fn add(&mut self, issue: T) {
        self.counts[issue.severity() as usize] += 1;
        self.issues.push(issue);
    }

    /// Logs and records an issue.
    pub fn add_and_log(&mut self, issue: T) {
        issue.log();
        self.add(issue);
    }
}

impl<T: Diagnostic> Extend<T> for IssueSet<T> {
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        for issue in iter {
            self.add(issue);
        }
    }
}

impl<T: Diagnostic> FromIterator<T> for IssueSet<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let mut set = Self::new();
        set.extend(iter);
        set
    }
}

impl<T> IntoIterator for IssueSet<T> {
    type Item = T;
    type IntoIter = std::vec::IntoIter<T>;
    fn into_iter(self) -> Self::IntoIter {
        self.issues.into_iter()
    }
}

impl<'a, T> IntoIterator for &'a IssueSet<T> {
    type Item = &'a T;
    type IntoIter = std::slice::Iter<'a, T>;
    fn into_iter(self) -> Self::IntoIter {
        self.issues.iter()
    }
}

impl<T: Display> Display for IssueSet<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.issues
            .iter()
            .try_for_each(|issue| writeln!(f, "{issue}"))
    }
}
