use std::fmt;

use serde::{Deserialize, Serialize};

/// How and from what this binary was built.
///
/// `Display` renders the text printed for `-v/--version`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ReleaseInfo {
    /// Git commit hash the binary was built from.
    pub git_commit: String,
    /// When the binary was built.
    pub build_timestamp: String,
    /// Release version, usually the tag that was released.
    pub release_version: String,
    /// Compiler version used for the build.
    pub built_with: String,
}

impl ReleaseInfo {
    pub fn new(
        release_version: impl Into<String>,
        git_commit: impl Into<String>,
        build_timestamp: impl Into<String>,
        built_with: impl Into<String>,
    ) -> Self {
        Self {
            git_commit: git_commit.into(),
            build_timestamp: build_timestamp.into(),
            release_version: release_version.into(),
            built_with: built_with.into(),
        }
    }
}

impl fmt::Display for ReleaseInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Release: {}\nCommit: {}\nBuild Time: {}\nBuilt with: {}\n",
            self.release_version, self.git_commit, self.build_timestamp, self.built_with
        )
    }
}

/// Build a [`ReleaseInfo`] for the calling crate.
///
/// The version comes from `CARGO_PKG_VERSION`; commit, build time and
/// compiler are read from the `GIT_COMMIT`, `BUILD_TIMESTAMP` and
/// `RUSTC_VERSION` variables at compile time and are empty when unset.
#[macro_export]
macro_rules! release_info {
    () => {
        $crate::ReleaseInfo::new(
            env!("CARGO_PKG_VERSION"),
            option_env!("GIT_COMMIT").unwrap_or_default(),
            option_env!("BUILD_TIMESTAMP").unwrap_or_default(),
            option_env!("RUSTC_VERSION").unwrap_or_default(),
        )
    };
}
