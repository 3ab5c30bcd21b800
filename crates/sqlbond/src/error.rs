//! Error types for sqlbond

use thiserror::Error;

/// Result type alias for sqlbond operations
pub type BondResult<T> = Result<T, BondError>;

/// Error types for statement compilation, sessions and stores
#[derive(Debug, Error)]
pub enum BondError {
    /// No adapter registered under the given name
    #[error("Unknown adapter: {0}")]
    UnknownAdapter(String),

    /// The engine handed to a session does not belong to the requested adapter
    #[error("Unsupported engine: {0}")]
    UnsupportedEngine(String),

    /// The session was built without an engine
    #[error("Missing engine, the session was not bound to a database or transaction")]
    MissingEngine,

    /// Malformed layout template
    #[error("Layout error: {0}")]
    Layout(String),

    /// Database connection error
    #[error("Connection error: {0}")]
    Connection(String),

    /// Pool error
    #[error("Pool error: {0}")]
    Pool(String),

    /// `save`/`delete` was called without a model
    #[error("Expecting non-nil model")]
    NilModel,

    /// Operation on a store that is not bound to any collection
    #[error("Store is not bound to a collection")]
    NoStore,

    /// Commit/rollback requested on a session that does not wrap a transaction
    #[error("Session is not a transaction")]
    NotTransaction,

    /// Validation error
    #[error("Validation error: {0}")]
    Validation(String),

    /// The transaction body failed and the rollback failed too.
    #[error("{error} (rollback failed: {rollback})")]
    Rollback {
        #[source]
        error: Box<BondError>,
        rollback: Box<BondError>,
    },

    /// Query execution error
    #[cfg(feature = "postgres")]
    #[error("Query error: {0}")]
    Query(#[from] tokio_postgres::Error),

    /// Row decode error
    #[error("Decode error on column '{column}': {message}")]
    Decode { column: String, message: String },

    /// The context deadline elapsed
    #[error("Query timeout after {0:?}")]
    Timeout(std::time::Duration),

    /// The context was cancelled
    #[error("Operation cancelled")]
    Cancelled,

    /// Other errors
    #[error("{0}")]
    Other(String),
}

impl BondError {
    /// Create a validation error
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// Create a decode error for a specific column
    pub fn decode(column: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Decode {
            column: column.into(),
            message: message.into(),
        }
    }

    /// Combine a failed unit of work with the failure of its rollback.
    pub fn rollback_failed(error: BondError, rollback: BondError) -> Self {
        Self::Rollback {
            error: Box::new(error),
            rollback: Box::new(rollback),
        }
    }

    /// The error that started the failure chain.
    ///
    /// For [`BondError::Rollback`] this is the body's error, not the rollback's.
    pub fn root_error(&self) -> &BondError {
        match self {
            Self::Rollback { error, .. } => error.root_error(),
            other => other,
        }
    }

    /// Check if this is a nil model error
    pub fn is_nil_model(&self) -> bool {
        matches!(self, Self::NilModel)
    }

    /// Check if this is a timeout error
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout(_))
    }

    /// Check if this is a configuration error (bad adapter or engine wiring)
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            Self::UnknownAdapter(_) | Self::UnsupportedEngine(_) | Self::MissingEngine | Self::Layout(_)
        )
    }
}

#[cfg(feature = "postgres")]
impl From<deadpool_postgres::PoolError> for BondError {
    fn from(err: deadpool_postgres::PoolError) -> Self {
        Self::Pool(err.to_string())
    }
}
