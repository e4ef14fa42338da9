//! Recoverable issues found while importing a device.
//!
//! Import never fails on a malformed endpoint. Instead, the endpoint is left
//! unresolved and an [`ImportIssue`] is recorded and logged.

use std::fmt::Display;

use arcstr::ArcStr;
pub use diagnostics::{Diagnostic, IssueSet, Severity};
use serde::{Deserialize, Serialize};

/// The cause of an import issue.
#[derive(Clone, Debug, Hash, Eq, PartialEq, Serialize, Deserialize)]
pub enum Cause {
    /// A connection endpoint names a port that its component's cell lacks.
    MissingTerminal {
        /// The connection identity.
        connection: ArcStr,
        /// The component identity.
        component: ArcStr,
        /// The missing port label.
        port: ArcStr,
    },
    /// A connection endpoint names a component that was not imported.
    MissingCell {
        /// The connection identity.
        connection: ArcStr,
        /// The missing component identity.
        component: ArcStr,
    },
    /// A connection endpoint names a component but no port.
    UnspecifiedPort {
        /// The connection identity.
        connection: ArcStr,
        /// The component identity.
        component: ArcStr,
    },
}

impl Cause {
    /// The connection the issue was found on.
    pub fn connection(&self) -> &ArcStr {
        match self {
            Self::MissingTerminal { connection, .. }
            | Self::MissingCell { connection, .. }
            | Self::UnspecifiedPort { connection, .. } => connection,
        }
    }
}

impl Display for Cause {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingTerminal {
                connection,
                component,
                port,
            } => write!(
                f,
                "could not find terminal for port `{}` of `{}` in connection `{}`",
                port, component, connection
            ),
            Self::MissingCell {
                connection,
                component,
            } => write!(
                f,
                "connection `{}` references component `{}`, which has no cell",
                connection, component
            ),
            Self::UnspecifiedPort {
                connection,
                component,
            } => write!(
                f,
                "connection `{}` attaches to component `{}` without naming a port",
                connection, component
            ),
        }
    }
}

/// An issue identified during import.
#[derive(Clone, Debug, Hash, Eq, PartialEq, Serialize, Deserialize)]
pub struct ImportIssue {
    cause: Cause,
    severity: Severity,
}

impl ImportIssue {
    /// Creates a new import issue and logs it immediately.
    pub(crate) fn new_and_log(cause: Cause, severity: Severity) -> Self {
        let result = Self { cause, severity };
        result.log();
        result
    }

    /// The underlying cause of this issue.
    #[inline]
    pub fn cause(&self) -> &Cause {
        &self.cause
    }
}

impl Display for ImportIssue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.cause)
    }
}

impl Diagnostic for ImportIssue {
    fn severity(&self) -> Severity {
        self.severity
    }
}

/// The issues recorded by one import.
pub type ImportIssues = IssueSet<ImportIssue>;

/// Per-connection lookup of import issues.
pub trait ConnectionIssues {
    /// Iterates over the issues found on the given connection.
    fn for_connection<'a>(&'a self, id: &'a str) -> impl Iterator<Item = &'a ImportIssue> + 'a;
}

impl ConnectionIssues for ImportIssues {
    fn for_connection<'a>(&'a self, id: &'a str) -> impl Iterator<Item = &'a ImportIssue> + 'a {
        self.matching(move |issue| issue.cause.connection().as_str() == id)
    }
}
