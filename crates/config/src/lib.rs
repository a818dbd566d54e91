//! Command-line and environment configuration for small services.
//!
//! One call decides between printing usage, help or version text and
//! populating a configuration value from JSON:
//!
//! - `-h` / `--help` return usage or full help text.
//! - `-v` / `--version` return the [`ReleaseInfo`] text.
//! - otherwise the JSON from `-c/--config` (or `<PREFIX>_CONFIG`, or `{}`)
//!   has its `${NAME}` placeholders replaced with `<PREFIX>_NAME` and is
//!   decoded into the caller's value.
//!
//! ```
//! use {
//!     flagconf::{Outcome, Resolver},
//!     serde::{Deserialize, Serialize},
//!     std::collections::HashMap,
//! };
//!
//! #[derive(Default, Serialize, Deserialize)]
//! struct AppConfig {
//!     id: u32,
//!     name: String,
//! }
//!
//! let env = HashMap::from([("APP_NAME".to_string(), "Bob".to_string())]);
//! let mut config = AppConfig::default();
//! let outcome = Resolver::new("APP")?
//!     .args(["-c", r#"{"id":1,"name":"${NAME}"}"#])
//!     .env(env)
//!     .resolve(&mut config)?;
//!
//! assert_eq!(outcome, Outcome::Continue);
//! assert_eq!(config.name, "Bob");
//! # Ok::<(), flagconf::Error>(())
//! ```

pub mod env_subst;
pub mod error;
pub mod prefix;
pub mod release;
pub mod resolver;

pub use {
    env_subst::substitute_placeholders,
    error::{Error, Result},
    prefix::{EnvPrefix, EnvSource, ProcessEnv},
    release::ReleaseInfo,
    resolver::{Outcome, Resolver, parse},
};
