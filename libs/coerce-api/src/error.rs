use std::fmt;

/// Reason a single coercion attempt failed.
///
/// Produced by every conversion step and folded into the fallback value at
/// the `convert_or_default*` boundary. Callers that need the reason use
/// [`crate::convert::try_convert`] or [`crate::Coerce::coerce`] directly.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CoerceError {
    /// Input was `Null` or `DbNull`.
    #[error("input is absent")]
    Absent,

    /// Raw input is not a declared member of an ordinary enumeration.
    #[error("{input} is not a defined member of {target}")]
    UndefinedMember { input: String, target: &'static str },

    /// Enumeration text did not name a member or a number.
    #[error("cannot parse '{text}' as {target}")]
    Parse { text: String, target: &'static str },

    /// Text is not a valid literal for a primitive target.
    #[error("invalid {target} literal '{text}'")]
    Format { text: String, target: &'static str },

    /// Numeric value does not fit into the target.
    #[error("value out of range for {target}")]
    Overflow { target: &'static str },

    /// No conversion path exists between the two types.
    #[error("invalid cast from {from} to {to}")]
    InvalidCast { from: &'static str, to: &'static str },
}

impl CoerceError {
    pub fn undefined(input: impl fmt::Display, target: &'static str) -> Self {
        Self::UndefinedMember { input: input.to_string(), target }
    }

    pub fn parse(text: impl Into<String>, target: &'static str) -> Self {
        Self::Parse { text: text.into(), target }
    }

    pub fn format(text: impl Into<String>, target: &'static str) -> Self {
        Self::Format { text: text.into(), target }
    }

    pub fn overflow(target: &'static str) -> Self {
        Self::Overflow { target }
    }

    pub fn invalid_cast(from: &'static str, to: &'static str) -> Self {
        Self::InvalidCast { from, to }
    }

    /// Rename the target in the error, keeping the kind.
    ///
    /// Used when a helper parses into an intermediate type (e.g. `i128`)
    /// and the caller wants the message to name the requested type.
    pub fn retarget(self, target: &'static str) -> Self {
        match self {
            Self::UndefinedMember { input, .. } => Self::UndefinedMember { input, target },
            Self::Parse { text, .. } => Self::Parse { text, target },
            Self::Format { text, .. } => Self::Format { text, target },
            Self::Overflow { .. } => Self::Overflow { target },
            Self::InvalidCast { from, .. } => Self::InvalidCast { from, to: target },
            Self::Absent => Self::Absent,
        }
    }
}

/// Error loading a coercion config file.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("config error: {0}")]
    Parse(String),

    #[error("no config parser registered for '{0}'")]
    UnsupportedExtension(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl ConfigError {
    /// Add context to the error.
    ///
    /// For `Parse`, context is prepended to the message. Other variants are
    /// returned unchanged.
    pub fn with_context(self, ctx: impl fmt::Display) -> Self {
        match self {
            ConfigError::Parse(msg) => ConfigError::Parse(format!("{ctx}: {msg}")),
            other => other,
        }
    }
}

impl From<toml::de::Error> for ConfigError {
    fn from(e: toml::de::Error) -> Self {
        Self::Parse(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn retarget_keeps_kind() {
        let err = CoerceError::overflow("i128").retarget("u8");
        assert_eq!(err, CoerceError::Overflow { target: "u8" });

        let err = CoerceError::format("x", "i128").retarget("i32");
        assert_eq!(err.to_string(), "invalid i32 literal 'x'");
    }

    #[test]
    fn config_context_is_prepended() {
        let err = ConfigError::Parse("bad key".into()).with_context("coerce.toml");
        assert_eq!(err.to_string(), "config error: coerce.toml: bad key");
    }
}
