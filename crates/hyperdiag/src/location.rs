use std::fmt;

/// Source location of a diagnostic: function, file, and line.
///
/// Use [`here!()`](crate::here) to capture the current location, or
/// [`Location::caller()`] from a `#[track_caller]` function.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct Location<'a> {
    /// Name of the function, or an empty string if unknown.
    pub function: &'a str,
    /// Path of the source file.
    pub file: &'a str,
    /// Line number in the source file, starting at 1.
    pub line: u32,
}

impl fmt::Display for Location<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.file, self.line)
    }
}

impl<'a> Location<'a> {
    /// Constructs a location.
    pub const fn new(function: &'a str, file: &'a str, line: u32) -> Self {
        Self {
            function,
            file,
            line,
        }
    }
}

impl Location<'static> {
    /// Returns the location of the caller.
    ///
    /// The function name is not available this way, so it is left empty.
    #[track_caller]
    pub fn caller() -> Self {
        let caller = std::panic::Location::caller();
        Self::new("", caller.file(), caller.line())
    }
}

/// Cleans up the type name of a function item so that it reads like a function
/// path.
///
/// Used by [`function_name!()`](crate::function_name).
#[doc(hidden)]
pub fn trim_function_name(type_name: &'static str) -> &'static str {
    let mut name = type_name.strip_suffix("::__f").unwrap_or(type_name);
    while let Some(outer) = name.strip_suffix("::{{closure}}") {
        name = outer;
    }
    name
}
