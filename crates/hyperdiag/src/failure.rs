use std::fmt;

use crate::Severity;

/// What went wrong at a failing check.
///
/// The [`Display`](fmt::Display) implementation produces the error text of
/// the report.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Failure<'a> {
    /// Integer index out of bounds.
    Index {
        /// Value of the index.
        index: i128,
        /// Value of the size.
        size: i128,
        /// Source text of the index expression.
        index_expr: &'a str,
        /// Source text of the size expression.
        size_expr: &'a str,
        /// Whether the failure crashes the application.
        fatal: bool,
    },
    /// Null pointer or empty option.
    Null {
        /// Source text of the parameter expression.
        param_expr: &'a str,
    },
    /// Condition was true; the current function returns.
    Cond {
        /// Source text of the condition.
        cond_expr: &'a str,
        /// Source text of the return value, if any.
        ret_expr: Option<&'a str>,
    },
    /// Condition was true; the current loop continues.
    Continue {
        /// Source text of the condition.
        cond_expr: &'a str,
    },
    /// Condition was true; the current loop breaks.
    Break {
        /// Source text of the condition.
        cond_expr: &'a str,
    },
    /// Condition was true; the application crashes.
    CrashCond {
        /// Source text of the condition.
        cond_expr: &'a str,
    },
    /// Unconditional failure; the current function returns.
    Fail {
        /// Source text of the return value, if any.
        ret_expr: Option<&'a str>,
    },
    /// Unconditional failure; the application crashes.
    CrashNow,
    /// Use of deprecated functionality.
    Deprecated,
}

impl fmt::Display for Failure<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Failure::Index {
                index,
                size,
                index_expr,
                size_expr,
                fatal,
            } => {
                if fatal {
                    write!(f, "FATAL: ")?;
                }
                write!(
                    f,
                    "Index {index_expr} = {index} is out of bounds ({size_expr} = {size}).",
                )
            }
            Failure::Null { param_expr } => write!(f, "Parameter \"{param_expr}\" is null."),
            Failure::Cond { cond_expr, ret_expr } => {
                write!(f, "Condition \"{cond_expr}\" is true.")?;
                if let Some(ret) = ret_expr {
                    write!(f, " returned: {ret}")?;
                }
                Ok(())
            }
            Failure::Continue { cond_expr } => {
                write!(f, "Condition \"{cond_expr}\" is true. Continuing.")
            }
            Failure::Break { cond_expr } => {
                write!(f, "Condition \"{cond_expr}\" is true. Breaking.")
            }
            Failure::CrashCond { cond_expr } => {
                write!(f, "FATAL: Condition \"{cond_expr}\" is true.")
            }
            Failure::Fail { ret_expr: None } => write!(f, "Method/Function Failed."),
            Failure::Fail {
                ret_expr: Some(ret),
            } => write!(f, "Method/Function Failed, returning: {ret}"),
            Failure::CrashNow => write!(f, "FATAL: Method/Function Failed."),
            Failure::Deprecated => write!(
                f,
                "This method has been deprecated and will be removed in the future.",
            ),
        }
    }
}

impl<'a> Failure<'a> {
    /// Returns a [`Failure::Index`] if `index` is out of bounds for `size`,
    /// or `None` if it is in bounds.
    pub fn out_of_bounds<I: BoundsIndex>(
        index: I,
        size: I,
        index_expr: &'a str,
        size_expr: &'a str,
    ) -> Option<Self> {
        index.is_out_of_bounds(size).then(|| Failure::Index {
            index: index.widen(),
            size: size.widen(),
            index_expr,
            size_expr,
            fatal: false,
        })
    }

    /// Marks an index failure as fatal. Other failures are returned unchanged.
    #[must_use]
    pub fn into_fatal(self) -> Self {
        match self {
            Failure::Index {
                index,
                size,
                index_expr,
                size_expr,
                fatal: _,
            } => Failure::Index {
                index,
                size,
                index_expr,
                size_expr,
                fatal: true,
            },
            other => other,
        }
    }

    /// Returns the severity with which the failure is reported.
    pub fn severity(&self) -> Severity {
        match self {
            Failure::Deprecated => Severity::Warning,
            _ => Severity::Error,
        }
    }

    /// Returns whether the failure crashes the application.
    pub fn is_fatal(&self) -> bool {
        match self {
            Failure::Index { fatal, .. } => *fatal,
            Failure::CrashCond { .. } | Failure::CrashNow => true,
            _ => false,
        }
    }
}

/// Integer type that can be bounds-checked against a size of the same type.
pub trait BoundsIndex: Copy {
    /// Returns whether `self` is not a valid index into a collection of length
    /// `size`.
    fn is_out_of_bounds(self, size: Self) -> bool;
    /// Converts the value to `i128` for display, saturating if necessary.
    fn widen(self) -> i128;
}

macro_rules! impl_bounds_index_signed {
    ($($t:ty),*) => {
        $(
            impl BoundsIndex for $t {
                fn is_out_of_bounds(self, size: Self) -> bool {
                    self < 0 || self >= size
                }
                fn widen(self) -> i128 {
                    self as i128
                }
            }
        )*
    };
}
macro_rules! impl_bounds_index_unsigned {
    ($($t:ty),*) => {
        $(
            impl BoundsIndex for $t {
                fn is_out_of_bounds(self, size: Self) -> bool {
                    self >= size
                }
                fn widen(self) -> i128 {
                    i128::try_from(self).unwrap_or(i128::MAX)
                }
            }
        )*
    };
}
impl_bounds_index_signed!(i8, i16, i32, i64, i128, isize);
impl_bounds_index_unsigned!(u8, u16, u32, u64, u128, usize);

/// Value that may be null.
pub trait Nullable {
    /// Returns whether the value is null.
    fn is_null(&self) -> bool;
}
impl<T> Nullable for Option<T> {
    fn is_null(&self) -> bool {
        self.is_none()
    }
}
impl<T: ?Sized> Nullable for *const T {
    fn is_null(&self) -> bool {
        <*const T>::is_null(*self)
    }
}
impl<T: ?Sized> Nullable for *mut T {
    fn is_null(&self) -> bool {
        <*mut T>::is_null(*self)
    }
}
impl<T: Nullable + ?Sized> Nullable for &T {
    fn is_null(&self) -> bool {
        T::is_null(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_signed_bounds() {
        assert!(!2_i32.is_out_of_bounds(3));
        assert!(!0_i32.is_out_of_bounds(3));
        assert!(3_i32.is_out_of_bounds(3));
        assert!((-1_i32).is_out_of_bounds(3));
        assert!(0_i64.is_out_of_bounds(0));
    }

    #[test]
    fn test_unsigned_bounds() {
        assert!(!2_usize.is_out_of_bounds(3));
        assert!(3_usize.is_out_of_bounds(3));
        assert!(0_u8.is_out_of_bounds(0));
        assert_eq!(u128::MAX.widen(), i128::MAX);
    }

    #[test]
    fn test_failure_text() {
        let failure = Failure::out_of_bounds(5_i64, 3, "i", "n").expect("out of bounds");
        assert_eq!(failure.to_string(), "Index i = 5 is out of bounds (n = 3).");
        assert!(!failure.is_fatal());
        let failure = failure.into_fatal();
        assert_eq!(failure.to_string(), "FATAL: Index i = 5 is out of bounds (n = 3).");
        assert!(failure.is_fatal());
        assert_eq!(Failure::out_of_bounds(1_i64, 3, "i", "n"), None);

        let cond = Failure::Cond {
            cond_expr: "x > 2",
            ret_expr: Some("None"),
        };
        assert_eq!(cond.to_string(), "Condition \"x > 2\" is true. returned: None");
        assert_eq!(
            Failure::Fail { ret_expr: Some("-1") }.to_string(),
            "Method/Function Failed, returning: -1",
        );
        assert_eq!(Failure::Deprecated.severity(), Severity::Warning);
        assert_eq!(Failure::CrashNow.severity(), Severity::Error);
    }

    #[test]
    fn test_nullable() {
        let x = 5;
        let some: Option<&i32> = Some(&x);
        assert!(!some.is_null());
        assert!(None::<i32>.is_null());
        assert!(std::ptr::null::<i32>().is_null());
        assert!(!Nullable::is_null(&std::ptr::from_ref(&x)));
        assert!(Nullable::is_null(&&None::<u8>));
    }
}
