//! Call-site sugar for the condition checks.
//!
//! Every check macro evaluates its condition exactly once, reports to the
//! process-wide reporter only on failure, and then performs its control-flow
//! action at the call site. Optional parts:
//!
//! - `=> value` returns `value` instead of `()`.
//! - `; "format", args...` adds an explanatory message, which is stripped in
//!   non-debug builds (see [`MessageMode`](crate::MessageMode)).

/// Returns the path of the enclosing function as a `&'static str`.
#[macro_export]
macro_rules! function_name {
    () => {{
        fn __f() {}
        fn type_name_of<T>(_: T) -> &'static str {
            ::std::any::type_name::<T>()
        }
        $crate::trim_function_name(type_name_of(__f))
    }};
}

/// Returns the [`Location`](crate::Location) of the call site.
#[macro_export]
macro_rules! here {
    () => {
        $crate::Location::new($crate::function_name!(), ::std::file!(), ::std::line!())
    };
}

#[doc(hidden)]
#[macro_export]
macro_rules! __message {
    () => {
        ::std::borrow::Cow::<'static, str>::Borrowed("")
    };
    ($($arg:tt)+) => {
        if $crate::MessageMode::BUILD.keeps_messages() {
            ::std::borrow::Cow::<'static, str>::Owned(::std::format!($($arg)+))
        } else {
            ::std::borrow::Cow::<'static, str>::Borrowed("")
        }
    };
}

#[doc(hidden)]
#[macro_export]
macro_rules! __ret_expr {
    () => {
        ::std::option::Option::None
    };
    ($ret:expr) => {
        ::std::option::Option::Some(::std::stringify!($ret))
    };
}

/// Ensures an integer index is in bounds. If not, reports and returns from
/// the current function.
///
/// For signed integers, the index must satisfy `0 <= index < size`. For
/// unsigned integers, it must satisfy `index < size`.
///
/// ```
/// # use hyperdiag::fail_index;
/// fn get(values: &[u8], i: usize) -> Option<u8> {
///     fail_index!(i, values.len() => None; "bad lookup");
///     Some(values[i])
/// }
/// assert_eq!(get(&[7], 3), None);
/// ```
#[macro_export]
macro_rules! fail_index {
    ($index:expr, $size:expr $(=> $ret:expr)? $(; $($msg:tt)+)?) => {
        if let ::std::option::Option::Some(failure) = $crate::Failure::out_of_bounds(
            $index,
            $size,
            ::std::stringify!($index),
            ::std::stringify!($size),
        ) {
            $crate::reporter().report_failure(
                &$crate::here!(),
                &failure,
                &$crate::__message!($($($msg)+)?),
            );
            return $($ret)?;
        }
    };
}

/// Ensures an integer index is in bounds. If not, reports and crashes the
/// application.
///
/// Only use this if there is no sensible fallback.
#[macro_export]
macro_rules! crash_bad_index {
    ($index:expr, $size:expr $(; $($msg:tt)+)?) => {
        if let ::std::option::Option::Some(failure) = $crate::Failure::out_of_bounds(
            $index,
            $size,
            ::std::stringify!($index),
            ::std::stringify!($size),
        ) {
            $crate::reporter().crash(
                &$crate::here!(),
                &failure.into_fatal(),
                &$crate::__message!($($($msg)+)?),
            );
        }
    };
}

/// Ensures a pointer or option is not null. If it is, reports and returns from
/// the current function.
#[macro_export]
macro_rules! fail_null {
    ($param:expr $(=> $ret:expr)? $(; $($msg:tt)+)?) => {
        if $crate::Nullable::is_null(&$param) {
            $crate::reporter().report_failure(
                &$crate::here!(),
                &$crate::Failure::Null {
                    param_expr: ::std::stringify!($param),
                },
                &$crate::__message!($($($msg)+)?),
            );
            return $($ret)?;
        }
    };
}

/// Ensures a condition is false. If it is true, reports and returns from the
/// current function.
///
/// If checking for null, use [`fail_null!()`] instead. If checking index
/// bounds, use [`fail_index!()`] instead.
#[macro_export]
macro_rules! fail_cond {
    ($cond:expr $(=> $ret:expr)? $(; $($msg:tt)+)?) => {
        if $cond {
            $crate::reporter().report_failure(
                &$crate::here!(),
                &$crate::Failure::Cond {
                    cond_expr: ::std::stringify!($cond),
                    ret_expr: $crate::__ret_expr!($($ret)?),
                },
                &$crate::__message!($($($msg)+)?),
            );
            return $($ret)?;
        }
    };
}

/// Ensures a condition is false. If it is true, reports and crashes the
/// application.
///
/// Only use this if there is no sensible fallback.
#[macro_export]
macro_rules! crash_cond {
    ($cond:expr $(; $($msg:tt)+)?) => {
        if $cond {
            $crate::reporter().crash(
                &$crate::here!(),
                &$crate::Failure::CrashCond {
                    cond_expr: ::std::stringify!($cond),
                },
                &$crate::__message!($($($msg)+)?),
            );
        }
    };
}

/// Ensures a condition is false. If it is true, reports and continues with
/// the next iteration of the enclosing loop.
#[macro_export]
macro_rules! err_continue {
    ($cond:expr $(; $($msg:tt)+)?) => {
        if $cond {
            $crate::reporter().report_failure(
                &$crate::here!(),
                &$crate::Failure::Continue {
                    cond_expr: ::std::stringify!($cond),
                },
                &$crate::__message!($($($msg)+)?),
            );
            continue;
        }
    };
}

/// Ensures a condition is false. If it is true, reports and breaks out of the
/// enclosing loop.
#[macro_export]
macro_rules! err_break {
    ($cond:expr $(; $($msg:tt)+)?) => {
        if $cond {
            $crate::reporter().report_failure(
                &$crate::here!(),
                &$crate::Failure::Break {
                    cond_expr: ::std::stringify!($cond),
                },
                &$crate::__message!($($($msg)+)?),
            );
            break;
        }
    };
}

/// Reports a failure and returns from the current function.
///
/// Only use this if more complex error detection or recovery is required.
///
/// ```
/// # use hyperdiag::fail;
/// fn parse_flag(s: &str) -> bool {
///     match s {
///         "on" => true,
///         "off" => false,
///         _ => fail!(=> false; "unknown flag {s:?}"),
///     }
/// }
/// assert!(!parse_flag("maybe"));
/// ```
#[macro_export]
macro_rules! fail {
    ($(=> $ret:expr)? $(; $($msg:tt)+)?) => {{
        $crate::reporter().report_failure(
            &$crate::here!(),
            &$crate::Failure::Fail {
                ret_expr: $crate::__ret_expr!($($ret)?),
            },
            &$crate::__message!($($($msg)+)?),
        );
        return $($ret)?;
    }};
    ($($msg:tt)+) => {
        $crate::fail!(; $($msg)+)
    };
}

/// Reports a failure and crashes the application.
///
/// Only use this if the application should never reach this point.
#[macro_export]
macro_rules! crash_now {
    ($($msg:tt)*) => {
        $crate::reporter().crash(
            &$crate::here!(),
            &$crate::Failure::CrashNow,
            &$crate::__message!($($msg)*),
        )
    };
}

/// Warns that the current function is deprecated. Only the first evaluation at
/// each call site reports anything.
#[macro_export]
macro_rules! warn_deprecated {
    ($($msg:tt)*) => {{
        static GUARD: $crate::OnceGuard = $crate::OnceGuard::new();
        if GUARD.first() {
            $crate::reporter().report_failure(
                &$crate::here!(),
                &$crate::Failure::Deprecated,
                &$crate::__message!($($msg)*),
            );
        }
    }};
}

/// Reports an error message without affecting control flow.
///
/// Only use this at the start of a function that has not been implemented yet,
/// or if more complex error detection or recovery is required.
#[macro_export]
macro_rules! err_print {
    ($($msg:tt)+) => {
        $crate::reporter().print(
            &$crate::here!(),
            &$crate::__message!($($msg)+),
            $crate::Severity::Error,
        )
    };
}

/// Reports an error message the first time this call site is reached.
#[macro_export]
macro_rules! err_print_once {
    ($($msg:tt)+) => {{
        static GUARD: $crate::OnceGuard = $crate::OnceGuard::new();
        $crate::reporter().print_once(
            &GUARD,
            &$crate::here!(),
            &$crate::__message!($($msg)+),
            $crate::Severity::Error,
        );
    }};
}

/// Reports a warning message without affecting control flow.
///
/// If warning about deprecated usage, use [`warn_deprecated!()`] instead.
#[macro_export]
macro_rules! warn_print {
    ($($msg:tt)+) => {
        $crate::reporter().print(
            &$crate::here!(),
            &$crate::__message!($($msg)+),
            $crate::Severity::Warning,
        )
    };
}

/// Reports a warning message the first time this call site is reached.
#[macro_export]
macro_rules! warn_print_once {
    ($($msg:tt)+) => {{
        static GUARD: $crate::OnceGuard = $crate::OnceGuard::new();
        $crate::reporter().print_once(
            &GUARD,
            &$crate::here!(),
            &$crate::__message!($($msg)+),
            $crate::Severity::Warning,
        );
    }};
}
