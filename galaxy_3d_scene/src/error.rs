//! Error types for the Galaxy3D scene core
//!
//! Every error in this crate is a contract violation raised synchronously by
//! the call that violates the contract. Nothing is retried and no operation
//! leaves partially applied state behind.

use std::fmt;

/// Result type for scene operations
pub type Result<T> = std::result::Result<T, Error>;

/// Scene errors
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// A required handle does not resolve (dead or never issued key)
    NullArgument(String),

    /// Re-parenting would create a cycle, or a transform would observe itself
    InvalidHierarchy(String),

    /// Transform already owned by a node, or component already bound to a node
    AlreadyAttached(String),
}

impl Error {
    /// Short name of the error kind (matches the variant name)
    pub fn kind(&self) -> &'static str {
        match self {
            Error::NullArgument(_) => "NullArgument",
            Error::InvalidHierarchy(_) => "InvalidHierarchy",
            Error::AlreadyAttached(_) => "AlreadyAttached",
        }
    }

    /// Detail message attached to the error
    pub fn message(&self) -> &str {
        match self {
            Error::NullArgument(msg)
            | Error::InvalidHierarchy(msg)
            | Error::AlreadyAttached(msg) => msg,
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::NullArgument(msg) => write!(f, "Null argument: {}", msg),
            Error::InvalidHierarchy(msg) => write!(f, "Invalid hierarchy: {}", msg),
            Error::AlreadyAttached(msg) => write!(f, "Already attached: {}", msg),
        }
    }
}

impl std::error::Error for Error {}

// ===== ERROR MACROS =====

/// Log an ERROR (with file:line) and build the matching [`Error`] variant
///
/// # Example
///
/// ```ignore
/// let node = self.nodes.get(key)
///     .ok_or_else(|| engine_err!("galaxy3d::Scene", NullArgument, "Unknown node {:?}", key))?;
/// ```
#[macro_export]
macro_rules! engine_err {
    ($source:expr, $kind:ident, $($arg:tt)*) => {{
        let message = format!($($arg)*);
        $crate::log::dispatch_detailed(
            $crate::log::LogSeverity::Error,
            $source,
            format!("{}: {}", stringify!($kind), message),
            file!(),
            line!(),
        );
        $crate::galaxy3d::Error::$kind(message)
    }};
}

/// Log an ERROR and return early with the matching [`Error`] variant
#[macro_export]
macro_rules! engine_bail {
    ($source:expr, $kind:ident, $($arg:tt)*) => {
        return Err($crate::engine_err!($source, $kind, $($arg)*))
    };
}

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
