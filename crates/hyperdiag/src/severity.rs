use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter};

/// Category of a diagnostic.
///
/// Severity is descriptive routing information for sinks and handlers. It has
/// no ordering and never changes what a check does.
#[derive(
    Debug, Default, Copy, Clone, PartialEq, Eq, Hash, Display, EnumIter, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    /// Error in engine code.
    #[default]
    #[strum(to_string = "ERROR")]
    Error,
    /// Informational notice that never alters control flow.
    #[strum(to_string = "WARNING")]
    Warning,
    /// Error in a user script.
    #[strum(to_string = "SCRIPT ERROR")]
    Script,
    /// Error in a user shader.
    #[strum(to_string = "SHADER ERROR")]
    Shader,
}

impl Severity {
    /// Returns the `log` level used when forwarding a diagnostic of this
    /// severity to the `log` facade.
    pub fn log_level(self) -> log::Level {
        match self {
            Severity::Warning => log::Level::Warn,
            Severity::Error | Severity::Script | Severity::Shader => log::Level::Error,
        }
    }
}
