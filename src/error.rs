//! Unified error handling for tilelayout
//!
//! Nothing is retried internally; every error propagates to the caller.
//!
//! Errors are grouped into categories:
//! - Contract errors (bad alignment, out-of-range index, malformed chunk list)
//! - Configuration errors (kernel parameters that cannot produce a layout)
//! - I/O errors (reading configuration or chunk files)

use std::fmt;

/// Unified error type for tilelayout
#[derive(Debug, thiserror::Error)]
pub enum LayoutError {
    // ========== Contract Errors ==========
    /// Alignment is zero or not a power of two
    #[error("Alignment must be a power of two, got {alignment}")]
    InvalidAlignment { alignment: usize },

    /// Chunk index outside the planned sequence
    #[error("Chunk index {index} out of range for {len} chunks")]
    IndexOutOfRange { index: usize, len: usize },

    /// The first chunk of a sequence was marked as reusing itself
    #[error("Chunk 0 cannot reuse the first chunk")]
    ReusedFirstChunk,

    /// Size or offset arithmetic does not fit in usize
    #[error("Size overflow: {0}")]
    SizeOverflow(String),

    /// A role was queried that was never recorded in its pool
    #[error("Role not assigned in pool: {0}")]
    UnassignedRole(String),

    // ========== Configuration Errors ==========
    /// Kernel configuration cannot produce a layout
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// Configuration or chunk file is not valid JSON for the expected shape
    #[error("Failed to parse configuration: {0}")]
    ConfigParse(String),

    // ========== I/O Errors ==========
    /// File I/O error
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),
}

impl LayoutError {
    /// Categorize the error for handling decisions
    pub fn category(&self) -> ErrorCategory {
        match self {
            LayoutError::InvalidAlignment { .. }
            | LayoutError::IndexOutOfRange { .. }
            | LayoutError::ReusedFirstChunk
            | LayoutError::SizeOverflow(_)
            | LayoutError::UnassignedRole(_) => ErrorCategory::Contract,

            LayoutError::InvalidConfiguration(_) | LayoutError::ConfigParse(_) => {
                ErrorCategory::Configuration
            }

            LayoutError::IoError(_) => ErrorCategory::Io,
        }
    }

    /// Check if this error is a caller contract violation
    ///
    /// Contract errors indicate a bug in the code assembling the chunk
    /// sequence, not in the user's input.
    pub fn is_contract_violation(&self) -> bool {
        matches!(self.category(), ErrorCategory::Contract)
    }

    /// Check if this error comes from user-supplied configuration
    pub fn is_configuration_error(&self) -> bool {
        matches!(self.category(), ErrorCategory::Configuration)
    }
}

/// Error category for handling decisions
///
/// - Contract: a bug in the caller, report it
/// - Configuration: fix the kernel parameters or input file
/// - Io: the file could not be read
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// Caller contract violation
    Contract,
    /// Invalid configuration input
    Configuration,
    /// File system failure
    Io,
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorCategory::Contract => write!(f, "Contract"),
            ErrorCategory::Configuration => write!(f, "Configuration"),
            ErrorCategory::Io => write!(f, "Io"),
        }
    }
}

impl From<serde_json::Error> for LayoutError {
    fn from(err: serde_json::Error) -> Self {
        LayoutError::ConfigParse(err.to_string())
    }
}

// Helper type alias for Results using LayoutError
pub type LayoutResult<T> = std::result::Result<T, LayoutError>;

/// Create a configuration error with context
///
/// # Examples
/// ```ignore
/// return Err(config_error!("tile_m must be > 0, got {}", tile_m));
/// ```
#[macro_export]
macro_rules! config_error {
    ($msg:expr) => {
        $crate::error::LayoutError::InvalidConfiguration($msg.to_string())
    };
    ($fmt:expr, $($arg:tt)*) => {
        $crate::error::LayoutError::InvalidConfiguration(format!($fmt, $($arg)*))
    };
}

/// Create an overflow error describing the operation that overflowed
pub fn overflow_err(what: &str) -> LayoutError {
    LayoutError::SizeOverflow(what.to_string())
}

/// Wrap an IO error with context
///
/// # Examples
/// ```ignore
/// let text = fs::read_to_string(path).map_err(|e| io_context(e, "reading kernel config"))?;
/// ```
pub fn io_context(err: std::io::Error, msg: &str) -> LayoutError {
    LayoutError::IoError(std::io::Error::new(err.kind(), format!("{}: {}", msg, err)))
}
