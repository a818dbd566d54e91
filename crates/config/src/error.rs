/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;

/// Everything that can stop configuration resolution.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The environment variable prefix is not upper snake case.
    #[error(
        "environment variable prefix [{0}] must start with a letter then letters or underscores"
    )]
    InvalidPrefix(String),

    /// The configuration target could not be rendered as JSON for the help example.
    #[error(transparent)]
    Serialize(serde_json::Error),

    /// The command line did not match the option surface.
    #[error("{source}")]
    Args {
        /// Usage text to show next to the error.
        usage: String,
        #[source]
        source: clap::Error,
    },

    /// The resolved JSON could not be decoded into the configuration target.
    #[error(transparent)]
    Decode(serde_json::Error),
}

impl Error {
    /// Text the caller should display along with the error, empty when there is none.
    pub fn text(&self) -> &str {
        match self {
            Self::Args { usage, .. } => usage,
            _ => "",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_prefix_message_quotes_prefix() {
        let err = Error::InvalidPrefix("bad-prefix".into());
        assert_eq!(
            err.to_string(),
            "environment variable prefix [bad-prefix] must start with a letter then letters or underscores"
        );
        assert_eq!(err.text(), "");
    }

    #[test]
    fn decode_error_is_transparent() {
        let source = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let expected = source.to_string();
        let err = Error::Decode(source);
        assert_eq!(err.to_string(), expected);
    }
}
