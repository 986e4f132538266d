//! Infrastructure layer constants
//!
//! Contains constants that are part of the infrastructure implementation.
//! Domain-specific constants are defined in `svb_domain::constants`.

// ============================================================================
// CONFIGURATION CONSTANTS
// ============================================================================

/// Default configuration file name
pub const DEFAULT_CONFIG_FILENAME: &str = "svb.toml";

/// Default configuration directory name
pub const DEFAULT_CONFIG_DIR: &str = "svb";

/// Environment variable prefix for configuration
pub const CONFIG_ENV_PREFIX: &str = "SVB";

/// Separator between the prefix and nested keys in environment variables
pub const CONFIG_ENV_SEPARATOR: &str = "__";

// ============================================================================
// LOGGING CONSTANTS
// ============================================================================

/// Default log level
pub const DEFAULT_LOG_LEVEL: &str = "info";

/// Environment variable overriding the configured log filter
pub const LOG_FILTER_ENV: &str = "SVB_LOG";

/// File stem used for rolled log files when the path has none
pub const LOG_DEFAULT_FILE_STEM: &str = "svb";

// ============================================================================
// EVENT BUS CONSTANTS
// ============================================================================

/// Default broadcast channel capacity for manager events
pub const DEFAULT_EVENT_CAPACITY: usize = 1024;
