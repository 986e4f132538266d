//! Error handling types

use thiserror::Error;

/// Result type alias for operations that can fail
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for Service Binding
#[derive(Error, Debug)]
pub enum Error {
    /// I/O operation error
    #[error("I/O error: {message}")]
    Io {
        /// Description of the I/O error
        message: String,
        /// Optional source error
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// JSON parsing or serialization error
    #[error("JSON parsing error: {source}")]
    Json {
        /// The underlying JSON error
        #[from]
        source: serde_json::Error,
    },

    /// A collaborator broke the notification contract (unknown or
    /// duplicate reference, reference outside the slot's descriptor)
    #[error("Contract violation: {message}")]
    ContractViolation {
        /// Description of the violated contract
        message: String,
    },

    /// Resource not found error
    #[error("Not found: {resource}")]
    NotFound {
        /// The resource that was not found
        resource: String,
    },

    /// Invalid argument provided to a function
    #[error("Invalid argument: {message}")]
    InvalidArgument {
        /// Description of the invalid argument
        message: String,
    },

    /// Two dependency specs of one lifecycle share a name
    #[error("Duplicate dependency slot: {name}")]
    DuplicateSlot {
        /// Slot name declared more than once
        name: String,
    },

    /// A slot name that the lifecycle does not declare
    #[error("Unknown dependency slot: {name}")]
    UnknownSlot {
        /// Slot name that was not found
        name: String,
    },

    /// Filter string could not be parsed
    #[error("Filter parse error at position {position}: {message}")]
    FilterParse {
        /// What went wrong
        message: String,
        /// Byte offset in the filter string
        position: usize,
    },

    /// Lifecycle collaborator failed to create, update or dispose a service
    #[error("Lifecycle error: {message}")]
    Lifecycle {
        /// Description of the lifecycle failure
        message: String,
        /// Optional source error
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Operation attempted on a stopped manager
    #[error("Service manager '{manager}' is stopped")]
    ManagerStopped {
        /// Name of the stopped manager
        manager: String,
    },

    /// Configuration-related error
    #[error("Configuration error: {message}")]
    Configuration {
        /// Description of the configuration error
        message: String,
        /// Optional source error
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Internal system error
    #[error("Internal error: {message}")]
    Internal {
        /// Description of the internal error
        message: String,
    },
}

// Basic error creation methods
impl Error {
    /// Create a contract violation error
    pub fn contract_violation<S: Into<String>>(message: S) -> Self {
        Self::ContractViolation {
            message: message.into(),
        }
    }

    /// Create a not found error
    pub fn not_found<S: Into<String>>(resource: S) -> Self {
        Self::NotFound {
            resource: resource.into(),
        }
    }

    /// Create an invalid argument error
    pub fn invalid_argument<S: Into<String>>(message: S) -> Self {
        Self::InvalidArgument {
            message: message.into(),
        }
    }

    /// Create an unknown slot error
    pub fn unknown_slot<S: Into<String>>(name: S) -> Self {
        Self::UnknownSlot { name: name.into() }
    }

    /// Create a filter parse error
    pub fn filter_parse<S: Into<String>>(message: S, position: usize) -> Self {
        Self::FilterParse {
            message: message.into(),
            position,
        }
    }

    /// Create an internal error
    pub fn internal<S: Into<String>>(message: S) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }
}

// Lifecycle error creation methods
impl Error {
    /// Create a lifecycle error
    pub fn lifecycle<S: Into<String>>(message: S) -> Self {
        Self::Lifecycle {
            message: message.into(),
            source: None,
        }
    }

    /// Create a lifecycle error with source
    pub fn lifecycle_with_source<S: Into<String>, E: std::error::Error + Send + Sync + 'static>(
        message: S,
        source: E,
    ) -> Self {
        Self::Lifecycle {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }
}

// I/O error creation methods
impl Error {
    /// Create an I/O error
    pub fn io<S: Into<String>>(message: S) -> Self {
        Self::Io {
            message: message.into(),
            source: None,
        }
    }

    /// Create an I/O error with source
    pub fn io_with_source<S: Into<String>, E: std::error::Error + Send + Sync + 'static>(
        message: S,
        source: E,
    ) -> Self {
        Self::Io {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }
}

// Configuration error creation methods
impl Error {
    /// Create a configuration error
    pub fn configuration<S: Into<String>>(message: S) -> Self {
        Self::Configuration {
            message: message.into(),
            source: None,
        }
    }

    /// Create a configuration error with source
    pub fn configuration_with_source<
        S: Into<String>,
        E: std::error::Error + Send + Sync + 'static,
    >(
        message: S,
        source: E,
    ) -> Self {
        Self::Configuration {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }
}

impl Error {
    /// Whether this error reports a broken collaborator contract
    pub fn is_contract_violation(&self) -> bool {
        matches!(self, Self::ContractViolation { .. })
    }
}
