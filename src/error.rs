//! Error types for instance guards.

use std::fmt;

/// Guard errors
///
/// Ordinary accessor calls never fail. These errors come from the paths that
/// step around the accessor: direct construction of a sealed instance,
/// decoding serialized bytes, fixed-set tag lookup, and configuration parsing.
///
/// # Examples
///
/// ```rust
/// use instance_guard::{GuardError, SealedGuard};
///
/// static SESSION: SealedGuard<String> = SealedGuard::new(|| "session".to_string());
///
/// let first = SESSION.get();
/// match SESSION.construct() {
///     Err(GuardError::DuplicateConstruction(name)) => {
///         assert_eq!(name, "alloc::string::String");
///     }
///     _ => unreachable!(),
/// }
/// assert!(std::ptr::eq(first, SESSION.get()));
/// ```
///
/// ```rust
/// use instance_guard::GuardError;
///
/// let duplicate = GuardError::DuplicateConstruction("Registry");
/// let decode = GuardError::Decode("expected value at line 1 column 1".to_string());
/// let unknown = GuardError::UnknownTag("Missing".to_string());
/// let not_singular = GuardError::NotSingular("Palette", 3);
///
/// println!("Error: {}", duplicate);
/// println!("Error: {}", not_singular);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GuardError {
    /// The guarded constructor ran while an instance already existed
    DuplicateConstruction(&'static str),
    /// The instance could not be serialized
    Encode(String),
    /// Serialized bytes could not be decoded into a candidate
    Decode(String),
    /// No fixed-set member carries this tag
    UnknownTag(String),
    /// Fixed-set table does not hold exactly one member (type, member count)
    NotSingular(&'static str, usize),
    /// A configuration value could not be parsed
    InvalidConfig(String),
}

impl fmt::Display for GuardError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GuardError::DuplicateConstruction(name) => {
                write!(f, "Instance already constructed: {}", name)
            }
            GuardError::Encode(msg) => write!(f, "Encode failed: {}", msg),
            GuardError::Decode(msg) => write!(f, "Decode failed: {}", msg),
            GuardError::UnknownTag(tag) => write!(f, "Unknown member tag: {}", tag),
            GuardError::NotSingular(name, count) => {
                write!(f, "{} has {} members, expected exactly 1", name, count)
            }
            GuardError::InvalidConfig(msg) => write!(f, "Invalid configuration: {}", msg),
        }
    }
}

impl std::error::Error for GuardError {}

/// Result type for guard operations
///
/// A convenience alias for `Result<T, GuardError>`.
///
/// ```rust
/// use instance_guard::{GuardError, GuardResult};
///
/// fn lookup(tag: &str) -> GuardResult<u8> {
///     match tag {
///         "one" => Ok(1),
///         other => Err(GuardError::UnknownTag(other.to_string())),
///     }
/// }
///
/// assert_eq!(lookup("one"), Ok(1));
/// assert!(lookup("two").is_err());
/// ```
pub type GuardResult<T> = Result<T, GuardError>;
