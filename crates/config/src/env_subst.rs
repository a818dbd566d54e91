use std::sync::LazyLock;

use {
    regex::{Captures, Regex},
    tracing::debug,
};

use crate::prefix::{EnvPrefix, EnvSource};

/// `${NAME}` where `NAME` follows the same rules as an environment prefix.
#[allow(clippy::expect_used)]
static PLACEHOLDER_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\$\{([A-Z][A-Z0-9_]*[A-Z0-9])\}").expect("placeholder pattern is valid")
});

/// Replace `${NAME}` placeholders with the value of `<PREFIX>NAME`.
///
/// Unset variables become empty strings. Replacement is a single pass, so
/// substituted values are never scanned for further placeholders.
pub fn substitute_placeholders(input: &str, prefix: &EnvPrefix, env: &dyn EnvSource) -> String {
    PLACEHOLDER_PATTERN
        .replace_all(input, |caps: &Captures<'_>| {
            let key = prefix.key(&caps[1]);
            env.var(&key).unwrap_or_else(|| {
                debug!(%key, "placeholder variable not set, substituting empty string");
                String::new()
            })
        })
        .into_owned()
}
