//! Connection configuration for a set of delimited-file tables.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ModelError;

/// How the first record of each file is interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HeaderPolicy {
    /// Use the first record as column names when it is a valid header,
    /// otherwise synthesize names and keep it as data.
    #[default]
    Auto,
    /// The first record must be a valid header.
    On,
    /// The first record is always data.
    Off,
}

impl HeaderPolicy {
    /// Returns the configuration keyword for this policy.
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Auto => "auto",
            Self::On => "on",
            Self::Off => "off",
        }
    }
}

impl fmt::Display for HeaderPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for HeaderPolicy {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "auto" => Ok(Self::Auto),
            "on" => Ok(Self::On),
            "off" => Ok(Self::Off),
            _ => Err(ModelError::InvalidHeaderPolicy {
                value: s.to_string(),
            }),
        }
    }
}

/// What discovery does when a single file cannot be turned into a table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FailurePolicy {
    /// Record the failure, omit the table and keep going.
    #[default]
    Skip,
    /// Fail the whole discovery on the first per-file error.
    Abort,
}

impl FailurePolicy {
    /// Returns the configuration keyword for this policy.
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Skip => "skip",
            Self::Abort => "abort",
        }
    }
}

impl fmt::Display for FailurePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FailurePolicy {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "skip" => Ok(Self::Skip),
            "abort" => Ok(Self::Abort),
            _ => Err(ModelError::InvalidFailurePolicy {
                value: s.to_string(),
            }),
        }
    }
}

/// Resolved connection configuration.
///
/// Loaded once and owned by the connection for its lifetime.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceConfig {
    /// Glob patterns or exact paths, in priority order.
    #[serde(default)]
    pub paths: Vec<String>,

    /// Field separator; only the first character is used.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub separator: Option<String>,

    /// Comment marker; empty disables comments, absent keeps them disabled.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,

    #[serde(default)]
    pub header: HeaderPolicy,

    #[serde(default)]
    pub on_error: FailurePolicy,
}

impl SourceConfig {
    /// Creates a configuration for the given path patterns with default options.
    pub fn with_paths<I, S>(paths: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            paths: paths.into_iter().map(Into::into).collect(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_separator(mut self, separator: impl Into<String>) -> Self {
        self.separator = Some(separator.into());
        self
    }

    #[must_use]
    pub fn with_comment(mut self, comment: impl Into<String>) -> Self {
        self.comment = Some(comment.into());
        self
    }

    #[must_use]
    pub fn with_header(mut self, header: HeaderPolicy) -> Self {
        self.header = header;
        self
    }

    #[must_use]
    pub fn with_on_error(mut self, on_error: FailurePolicy) -> Self {
        self.on_error = on_error;
        self
    }

    /// First character of a non-empty separator option.
    pub fn separator_char(&self) -> Option<char> {
        self.separator.as_deref().and_then(|s| s.chars().next())
    }

    /// First character of a non-empty comment option; `None` means comments are disabled.
    pub fn comment_char(&self) -> Option<char> {
        self.comment.as_deref().and_then(|s| s.chars().next())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn header_policy_parses_case_insensitively() {
        assert_eq!("AUTO".parse::<HeaderPolicy>(), Ok(HeaderPolicy::Auto));
        assert_eq!(" on ".parse::<HeaderPolicy>(), Ok(HeaderPolicy::On));
        assert_eq!("off".parse::<HeaderPolicy>(), Ok(HeaderPolicy::Off));
        assert!(matches!(
            "yes".parse::<HeaderPolicy>(),
            Err(ModelError::InvalidHeaderPolicy { .. })
        ));
    }

    #[test]
    fn failure_policy_defaults_to_skip() {
        assert_eq!(FailurePolicy::default(), FailurePolicy::Skip);
        assert_eq!("abort".parse::<FailurePolicy>(), Ok(FailurePolicy::Abort));
    }

    #[test]
    fn separator_and_comment_use_first_character() {
        let config = SourceConfig::with_paths(["*.csv"])
            .with_separator(";;")
            .with_comment("#!");
        assert_eq!(config.separator_char(), Some(';'));
        assert_eq!(config.comment_char(), Some('#'));
    }

    #[test]
    fn empty_options_are_disabled() {
        let config = SourceConfig::with_paths(["*.csv"])
            .with_separator("")
            .with_comment("");
        assert_eq!(config.separator_char(), None);
        assert_eq!(config.comment_char(), None);
        assert_eq!(SourceConfig::default().comment_char(), None);
    }
}
