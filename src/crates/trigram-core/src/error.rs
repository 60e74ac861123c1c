use thiserror::Error;

/// Errors raised while reading tokens, chords and corpora
#[derive(Debug, Error)]
pub enum Error {
    #[error("Malformed token '{token}': {reason}")]
    MalformedToken { token: String, reason: String },

    #[error("Unresolvable chord symbol '{0}'")]
    UnresolvableChord(String),

    #[error("Malformed relative token '{token}'")]
    MalformedRelativeToken { token: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    pub fn malformed(token: impl Into<String>, reason: impl Into<String>) -> Self {
        Error::MalformedToken {
            token: token.into(),
            reason: reason.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
