use std::{ffi::OsString, path::Path};

use {
    clap::{Arg, ArgAction, ColorChoice, Command, error::ErrorKind},
    serde::{Serialize, de::DeserializeOwned},
    serde_json::Value,
    tracing::debug,
};

use crate::{
    env_subst::substitute_placeholders,
    error::{Error, Result},
    prefix::{EnvPrefix, EnvSource, ProcessEnv},
    release::ReleaseInfo,
};

const CONFIG_ARG: &str = "config";
const VERSION_ARG: &str = "version";
const TRAILING_ARG: &str = "trailing";

/// What the caller should do after resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// `-h` usage or `--help` text. Print it and exit.
    Help(String),
    /// Release text for `-v/--version`. Print it and exit.
    Version(String),
    /// The configuration target is populated; keep running.
    Continue,
}

impl Outcome {
    /// Text to display, empty for [`Outcome::Continue`].
    pub fn text(&self) -> &str {
        match self {
            Self::Help(text) | Self::Version(text) => text,
            Self::Continue => "",
        }
    }

    pub fn should_exit(&self) -> bool {
        !matches!(self, Self::Continue)
    }
}

/// Turns command-line arguments and environment variables into a populated
/// configuration value.
///
/// The JSON configuration comes from `-c/--config`, falling back to
/// `<PREFIX>_CONFIG` and then `{}`. `${NAME}` placeholders inside it are
/// replaced with `<PREFIX>_NAME` before decoding.
pub struct Resolver {
    prefix: EnvPrefix,
    description: String,
    release: Option<ReleaseInfo>,
    program_name: Option<String>,
    args: Option<Vec<OsString>>,
    env: Box<dyn EnvSource>,
}

impl Resolver {
    /// Validate `prefix` and create a resolver reading the process arguments
    /// and environment.
    pub fn new(prefix: &str) -> Result<Self> {
        let prefix = EnvPrefix::parse(prefix)?;
        Ok(Self {
            prefix,
            description: String::new(),
            release: None,
            program_name: None,
            args: None,
            env: Box::new(ProcessEnv),
        })
    }

    /// Shown at the top of `--help`.
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn release(mut self, release: ReleaseInfo) -> Self {
        self.release = Some(release);
        self
    }

    /// Name used in usage lines. Defaults to the prefix in kebab case.
    pub fn program_name(mut self, name: impl Into<String>) -> Self {
        self.program_name = Some(name.into());
        self
    }

    /// Arguments to parse, without the program name.
    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<OsString>,
    {
        self.args = Some(args.into_iter().map(Into::into).collect());
        self
    }

    pub fn env(mut self, env: impl EnvSource + 'static) -> Self {
        self.env = Box::new(env);
        self
    }

    pub fn prefix(&self) -> &EnvPrefix {
        &self.prefix
    }

    /// Resolve and decode the configuration into `target`.
    ///
    /// Keys missing from the JSON keep the value `target` already holds.
    pub fn resolve<T>(&self, target: &mut T) -> Result<Outcome>
    where
        T: Serialize + DeserializeOwned,
    {
        self.run(Some(target))
    }

    /// Resolve without a configuration target; the JSON is not decoded.
    pub fn resolve_detached(&self) -> Result<Outcome> {
        self.run::<Value>(None)
    }

    fn run<T>(&self, target: Option<&mut T>) -> Result<Outcome>
    where
        T: Serialize + DeserializeOwned,
    {
        debug!(prefix = %self.prefix, "resolving configuration");

        let current = match target.as_deref() {
            Some(target) => serde_json::to_value(target).map_err(Error::Serialize)?,
            None => Value::Null,
        };
        let example = serde_json::to_string_pretty(&current).map_err(Error::Serialize)?;

        let mut command = self.command(&example);
        let args = match &self.args {
            Some(args) => args.clone(),
            None => std::env::args_os().skip(1).collect(),
        };
        let matches = match command.try_get_matches_from_mut(args) {
            Ok(matches) => matches,
            Err(err) if err.kind() == ErrorKind::DisplayHelp => {
                return Ok(Outcome::Help(err.render().to_string()));
            },
            Err(source) => {
                return Err(Error::Args {
                    usage: command.render_usage().to_string(),
                    source,
                });
            },
        };

        if let Some(trailing) = matches.get_many::<String>(TRAILING_ARG) {
            debug!(count = trailing.len(), "ignoring arguments after the first non-flag");
        }

        if matches.get_flag(VERSION_ARG) {
            let text = match &self.release {
                Some(release) => release.to_string(),
                None => ReleaseInfo::default().to_string(),
            };
            return Ok(Outcome::Version(text));
        }

        let raw = matches
            .get_one::<String>(CONFIG_ARG)
            .map_or("{}", String::as_str);
        let resolved = substitute_placeholders(raw, &self.prefix, self.env.as_ref());

        let Some(target) = target else {
            debug!("no configuration target, skipping decode");
            return Ok(Outcome::Continue);
        };

        let incoming: Value = serde_json::from_str(resolved.trim()).map_err(Error::Decode)?;
        let mut merged = current.clone();
        merge(&mut merged, incoming.clone(), false);
        *target = match serde_json::from_value(merged) {
            Ok(value) => value,
            Err(err) => {
                // `null` over a value the target cannot null out leaves it as is.
                debug!(error = %err, "decode failed, retrying with null values ignored");
                let mut merged = current;
                merge(&mut merged, incoming, true);
                serde_json::from_value(merged).map_err(Error::Decode)?
            },
        };

        debug!(prefix = %self.prefix, "configuration resolved");
        Ok(Outcome::Continue)
    }

    fn command(&self, example: &str) -> Command {
        let prefix = self.prefix.as_str();
        let fallback = self.prefix.key("CONFIG");
        let default_config = self.prefix.lookup(self.env.as_ref(), "CONFIG", "{}");
        let name = self
            .program_name
            .clone()
            .unwrap_or_else(|| self.prefix.program_name());

        let config_help = format!(
            "JSON string describing the configuration options. Values can be placeholders for \
             environment variables that start with '{prefix}', e.g. '${{DOMAIN}}' is replaced \
             with the value of environment variable '{domain}'. Defaults to ${fallback} when \
             set, otherwise '{{}}'.\n\nExample:\n{example}",
            domain = self.prefix.key("DOMAIN"),
        );

        let mut command = Command::new(name)
            .no_binary_name(true)
            .args_override_self(true)
            .disable_version_flag(true)
            .color(ColorChoice::Never)
            .arg(
                Arg::new(CONFIG_ARG)
                    .short('c')
                    .long("config")
                    .value_name("CONFIG")
                    .num_args(1)
                    .default_value(default_config)
                    .hide_default_value(true)
                    .help("JSON configuration string")
                    .long_help(config_help),
            )
            .arg(
                Arg::new(VERSION_ARG)
                    .short('v')
                    .long("version")
                    .action(ArgAction::SetTrue)
                    .help("Prints the version and exits"),
            )
            .arg(
                Arg::new(TRAILING_ARG)
                    .num_args(1..)
                    .trailing_var_arg(true)
                    .hide(true),
            );
        if !self.description.is_empty() {
            command = command.long_about(self.description.clone());
        }
        command
    }
}

/// Overlay `incoming` onto `base`: objects merge key by key, anything else
/// replaces. With `keep_on_null`, `null` never replaces a non-null value.
fn merge(base: &mut Value, incoming: Value, keep_on_null: bool) {
    match (base, incoming) {
        (Value::Object(base), Value::Object(incoming)) => {
            for (key, value) in incoming {
                match base.get_mut(&key) {
                    Some(slot) => merge(slot, value, keep_on_null),
                    None => {
                        base.insert(key, value);
                    },
                }
            }
        },
        (base, Value::Null) if keep_on_null && !base.is_null() => {},
        (base, incoming) => *base = incoming,
    }
}

/// Resolve configuration from the process arguments and environment.
///
/// Returns [`Outcome::Help`] or [`Outcome::Version`] when the caller should
/// print the text and exit, [`Outcome::Continue`] once `target` is populated.
pub fn parse<T>(
    prefix: &str,
    description: &str,
    release: Option<&ReleaseInfo>,
    target: &mut T,
) -> Result<Outcome>
where
    T: Serialize + DeserializeOwned,
{
    let mut resolver = Resolver::new(prefix)?.description(description);
    if let Some(release) = release {
        resolver = resolver.release(release.clone());
    }

    let mut args = std::env::args_os();
    let program = args.next();
    if let Some(name) = program.as_deref().map(Path::new).and_then(Path::file_name) {
        resolver = resolver.program_name(name.to_string_lossy().into_owned());
    }
    resolver.args(args).resolve(target)
}
