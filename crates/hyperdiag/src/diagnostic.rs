use std::fmt;

use crate::{Location, Severity};

/// Single diagnostic report, as seen by sinks and handlers.
///
/// Reports are formatted as `<file>:<line> - <error>[: <message>]`.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct Diagnostic<'a> {
    /// Where the diagnostic was reported.
    pub location: Location<'a>,
    /// What failed, such as the text of a condition.
    pub error: &'a str,
    /// Optional explanation. Empty if there is none.
    pub message: &'a str,
    /// Category of the diagnostic.
    pub severity: Severity,
}

impl fmt::Display for Diagnostic<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} - {}", self.location, self.error)?;
        if !self.message.is_empty() {
            write!(f, ": {}", self.message)?;
        }
        Ok(())
    }
}

impl Diagnostic<'_> {
    /// Returns the name of the function that reported the diagnostic.
    pub fn function(&self) -> &str {
        self.location.function
    }
    /// Returns the path of the file that reported the diagnostic.
    pub fn file(&self) -> &str {
        self.location.file
    }
    /// Returns the line that reported the diagnostic.
    pub fn line(&self) -> u32 {
        self.location.line
    }

    /// Copies the diagnostic so that it can be kept after the report.
    pub fn to_owned_diagnostic(&self) -> OwnedDiagnostic {
        OwnedDiagnostic {
            function: self.location.function.to_owned(),
            file: self.location.file.to_owned(),
            line: self.location.line,
            error: self.error.to_owned(),
            message: self.message.to_owned(),
            severity: self.severity,
        }
    }
}

/// Owned copy of a [`Diagnostic`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[allow(missing_docs)]
pub struct OwnedDiagnostic {
    pub function: String,
    pub file: String,
    pub line: u32,
    pub error: String,
    pub message: String,
    pub severity: Severity,
}

impl fmt::Display for OwnedDiagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.as_diagnostic().fmt(f)
    }
}

impl OwnedDiagnostic {
    /// Borrows the diagnostic.
    pub fn as_diagnostic(&self) -> Diagnostic<'_> {
        Diagnostic {
            location: Location::new(&self.function, &self.file, self.line),
            error: &self.error,
            message: &self.message,
            severity: self.severity,
        }
    }
}
