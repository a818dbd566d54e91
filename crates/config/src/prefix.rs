use std::{
    collections::{BTreeMap, HashMap},
    fmt,
    str::FromStr,
    sync::LazyLock,
};

use regex::Regex;

use crate::error::{Error, Result};

/// Upper snake case: starts with a letter, ends with a letter or digit.
#[allow(clippy::expect_used)]
static PREFIX_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\A[A-Z][A-Z0-9_]*[A-Z0-9]\z").expect("prefix pattern is valid")
});

/// Source of environment variable values.
///
/// Resolution only ever reads from it, so tests can hand in a fixed map
/// instead of touching the process environment.
pub trait EnvSource {
    fn var(&self, key: &str) -> Option<String>;
}

/// The environment of the current process.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessEnv;

impl EnvSource for ProcessEnv {
    fn var(&self, key: &str) -> Option<String> {
        std::env::var(key).ok()
    }
}

impl EnvSource for HashMap<String, String> {
    fn var(&self, key: &str) -> Option<String> {
        self.get(key).cloned()
    }
}

impl EnvSource for BTreeMap<String, String> {
    fn var(&self, key: &str) -> Option<String> {
        self.get(key).cloned()
    }
}

/// Validated namespace for an application's environment variables.
///
/// Holds the normalized form, which always ends with a single `_`
/// (`TEST` becomes `TEST_`).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct EnvPrefix(String);

impl EnvPrefix {
    pub fn parse(raw: &str) -> Result<Self> {
        if !PREFIX_PATTERN.is_match(raw) {
            return Err(Error::InvalidPrefix(raw.to_string()));
        }
        let normalized = raw.to_uppercase();
        Ok(Self(format!("{}_", normalized.trim_matches('_'))))
    }

    /// Normalized prefix, trailing underscore included.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Full variable name for `name`, e.g. `TEST_` + `CONFIG`.
    pub fn key(&self, name: &str) -> String {
        format!("{}{name}", self.0)
    }

    /// Value of the prefixed variable `name`, or `default` when unset.
    pub fn lookup(&self, env: &dyn EnvSource, name: &str, default: &str) -> String {
        env.var(&self.key(name))
            .unwrap_or_else(|| default.to_string())
    }

    /// Lowercase, dash separated form used as a fallback program name.
    pub(crate) fn program_name(&self) -> String {
        self.0
            .trim_end_matches('_')
            .to_lowercase()
            .replace('_', "-")
    }
}

impl FromStr for EnvPrefix {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl fmt::Display for EnvPrefix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
