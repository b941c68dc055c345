use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for RustF datasources
#[derive(Error, Debug)]
pub enum Error {
    #[error("Datasource not found: {0}")]
    NotFound(String),

    #[error("Datasource '{0}' is already registered with a different descriptor")]
    Conflict(String),

    #[error("Datasource in use: {0}")]
    InUse(String),

    #[error("Failed to build datasource '{name}': {message}")]
    Construction { name: String, message: String },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[cfg(feature = "config")]
    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    pub fn not_found(name: impl Into<String>) -> Self {
        Self::NotFound(name.into())
    }

    pub fn conflict(name: impl Into<String>) -> Self {
        Self::Conflict(name.into())
    }

    pub fn in_use(name: impl Into<String>) -> Self {
        Self::InUse(name.into())
    }

    pub fn construction(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Construction {
            name: name.into(),
            message: message.into(),
        }
    }

    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    /// Check if error is retryable
    ///
    /// Only failures to reach a backend qualify; the registry itself never
    /// retries, this is a hint for callers.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Error::Construction { .. } | Error::Database(_))
    }

    /// Get error code for API responses
    pub fn error_code(&self) -> &'static str {
        match self {
            Error::NotFound(_) => "E_DS_NOT_FOUND",
            Error::Conflict(_) => "E_DS_CONFLICT",
            Error::InUse(_) => "E_DS_IN_USE",
            Error::Construction { .. } => "E_DS_CONSTRUCTION",
            Error::Config(_) => "E_CONFIG",
            Error::Database(_) => "E_DB",
            #[cfg(feature = "config")]
            Error::Toml(_) => "E_TOML",
            Error::Internal(_) => "E_INTERNAL",
        }
    }
}
