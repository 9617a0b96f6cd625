use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("I/O error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Malformed JSON in {}: {source}", .path.display())]
    MalformedJson {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Could not serialize {}: {source}", .path.display())]
    Serialize {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Password hashing failed: {0}")]
    Hash(#[from] bcrypt::BcryptError),
}

/// Rejections of user input to the query layer, shown to the user as-is.
#[derive(Debug, PartialEq, thiserror::Error)]
pub enum QueryError {
    #[error("{0} cannot be empty!")]
    EmptyField(&'static str),

    #[error("Invalid rating input: {0:?}")]
    InvalidRating(String),
}

#[derive(Debug, PartialEq, thiserror::Error)]
pub enum ConfigError {
    #[error("PASSWORD_STORAGE must be \"plaintext\" or \"bcrypt\", got {0:?}")]
    InvalidPasswordStorage(String),

    #[error("SESSION_KEY must be at least 32 bytes, got {0}")]
    SessionKeyTooShort(usize),
}
