use thiserror::Error;

/// Result type for indexward operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for index lifecycle operations
#[derive(Error, Debug)]
pub enum Error {
    /// The namespace does not resolve to a live collection
    #[error("ns not found: {0}")]
    NamespaceNotFound(String),

    /// A namespace string could not be parsed
    #[error("Invalid namespace: {0}")]
    InvalidNamespace(String),

    /// No index matched the requested name or key pattern
    #[error("{0}")]
    IndexNotFound(String),

    /// Attempt to drop the identity index through a name or key pattern
    #[error("cannot drop _id index")]
    IdentityIndexProtected,

    /// A background structural operation is active on the namespace
    #[error("cannot perform operation: a background operation is currently running for collection {0}")]
    OperationInProgress(String),

    /// An index with the same name is already in the catalog
    #[error("index already exists with name [{0}]")]
    IndexAlreadyExists(String),

    /// The storage engine refused a catalog mutation
    #[error("Catalog mutation failed: {0}")]
    CatalogMutationFailed(String),

    /// The reindex rebuild loop stopped before recreating every index
    #[error("reIndex recreated {recreated} of {total} indexes before failing: {source}")]
    RebuildIncomplete {
        recreated: usize,
        total: usize,
        #[source]
        source: Box<Error>,
    },

    /// Caller lacks the privilege required by the command
    #[error("not authorized on {namespace} to execute {action}")]
    Unauthorized { namespace: String, action: String },

    /// Command is only allowed on a primary node
    #[error("not master")]
    NotPrimary,

    /// The `index` field of a drop request is neither a string nor an object
    #[error("invalid index name spec: {0}")]
    InvalidIndexSpec(String),

    /// Command document names no known command
    #[error("no such cmd: {0}")]
    UnknownCommand(String),

    /// A background build could not be (re)scheduled
    #[error("Scheduling error: {0}")]
    Scheduling(String),

    /// Configuration related errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// I/O related errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Generic error with context
    #[error("{context}: {source}")]
    WithContext {
        context: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Any other error
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl Error {
    /// Creates a namespace-not-found error
    pub fn namespace_not_found(ns: impl Into<String>) -> Self {
        Self::NamespaceNotFound(ns.into())
    }

    /// Creates an index-not-found error for a lookup by name
    pub fn index_not_found_by_name(name: &str) -> Self {
        Self::IndexNotFound(format!("index not found with name [{name}]"))
    }

    /// Creates an index-not-found error for a lookup by key pattern
    pub fn index_not_found_by_key(pattern: impl std::fmt::Display) -> Self {
        Self::IndexNotFound(format!("can't find index with key:{pattern}"))
    }

    /// Creates a catalog mutation error
    pub fn catalog_mutation(msg: impl Into<String>) -> Self {
        Self::CatalogMutationFailed(msg.into())
    }

    /// Creates an invalid index spec error
    pub fn invalid_index_spec(msg: impl Into<String>) -> Self {
        Self::InvalidIndexSpec(msg.into())
    }

    /// Creates a scheduling error
    pub fn scheduling(msg: impl Into<String>) -> Self {
        Self::Scheduling(msg.into())
    }

    /// Creates a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Adds context to any error
    pub fn with_context<E>(context: impl Into<String>, source: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::WithContext {
            context: context.into(),
            source: Box::new(source),
        }
    }

    /// Numeric code reported in failed command replies
    pub fn code(&self) -> i32 {
        match self {
            Self::NamespaceNotFound(_) => 26,
            Self::InvalidNamespace(_) => 73,
            Self::IndexNotFound(_) => 27,
            Self::IdentityIndexProtected => 72,
            Self::OperationInProgress(_) => 12587,
            Self::IndexAlreadyExists(_) => 86,
            Self::CatalogMutationFailed(_) => 67,
            Self::RebuildIncomplete { source, .. } => source.code(),
            Self::Unauthorized { .. } => 13,
            Self::NotPrimary => 10107,
            Self::InvalidIndexSpec(_) => 9,
            Self::UnknownCommand(_) => 59,
            Self::Scheduling(_) => 1,
            Self::Config(_) | Self::Io(_) | Self::WithContext { .. } | Self::Other(_) => 8,
        }
    }

    /// Symbolic name paired with [`Error::code`]
    pub fn code_name(&self) -> &'static str {
        match self {
            Self::NamespaceNotFound(_) => "NamespaceNotFound",
            Self::InvalidNamespace(_) => "InvalidNamespace",
            Self::IndexNotFound(_) => "IndexNotFound",
            Self::IdentityIndexProtected => "InvalidOptions",
            Self::OperationInProgress(_) => "BackgroundOperationInProgressForNamespace",
            Self::IndexAlreadyExists(_) => "IndexOptionsConflict",
            Self::CatalogMutationFailed(_) => "CannotCreateIndex",
            Self::RebuildIncomplete { source, .. } => source.code_name(),
            Self::Unauthorized { .. } => "Unauthorized",
            Self::NotPrimary => "NotMaster",
            Self::InvalidIndexSpec(_) => "FailedToParse",
            Self::UnknownCommand(_) => "CommandNotFound",
            Self::Scheduling(_) => "InternalError",
            Self::Config(_) | Self::Io(_) | Self::WithContext { .. } | Self::Other(_) => {
                "UnknownError"
            }
        }
    }
}

/// Extension trait for adding context to Results
pub trait ResultExt<T> {
    /// Add context to an error
    fn context(self, context: impl Into<String>) -> Result<T>;
}

impl<T, E> ResultExt<T> for std::result::Result<T, E>
where
    E: std::error::Error + Send + Sync + 'static,
{
    fn context(self, context: impl Into<String>) -> Result<T> {
        self.map_err(|e| Error::with_context(context, e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rebuild_incomplete_reports_inner_code() {
        let err = Error::RebuildIncomplete {
            recreated: 2,
            total: 5,
            source: Box::new(Error::catalog_mutation("disk full")),
        };
        assert_eq!(err.code(), 67);
        assert_eq!(err.code_name(), "CannotCreateIndex");
        assert!(err.to_string().contains("2 of 5"));
        assert!(err.to_string().contains("disk full"));
    }

    #[test]
    fn test_index_not_found_messages() {
        assert_eq!(
            Error::index_not_found_by_name("a_1").to_string(),
            "index not found with name [a_1]"
        );
        assert_eq!(
            Error::index_not_found_by_key("{ a: 1 }").to_string(),
            "can't find index with key:{ a: 1 }"
        );
    }

    #[test]
    fn test_context_wraps_source() {
        let res: std::result::Result<(), std::io::Error> = Err(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            "missing",
        ));
        let err = res.context("reading state").unwrap_err();
        assert_eq!(err.to_string(), "reading state: missing");
    }
}
