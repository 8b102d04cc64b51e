/// Whether descriptive messages survive into reports.
///
/// Stripping only removes the explanatory message passed to a check. It never
/// suppresses a report and never changes its severity, error text, or
/// control-flow action.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum MessageMode {
    /// Messages are passed through unchanged.
    Keep,
    /// Messages are replaced with an empty string.
    Strip,
}

impl MessageMode {
    /// Message mode for the current build.
    ///
    /// Messages are kept in debug builds or with the `debug-messages` feature,
    /// unless the `strip-messages` feature is enabled.
    pub const BUILD: Self =
        if cfg!(any(debug_assertions, feature = "debug-messages"))
            && !cfg!(feature = "strip-messages")
        {
            Self::Keep
        } else {
            Self::Strip
        };

    /// Returns whether messages are kept.
    pub const fn keeps_messages(self) -> bool {
        matches!(self, Self::Keep)
    }

    /// Returns `message`, or an empty string if messages are stripped.
    pub fn apply(self, message: &str) -> &str {
        match self {
            Self::Keep => message,
            Self::Strip => "",
        }
    }
}

impl Default for MessageMode {
    fn default() -> Self {
        Self::BUILD
    }
}
