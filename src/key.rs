//! Guard identity for diagnostics.

use std::fmt;

#[cfg(feature = "serde")]
use serde::Serialize;

/// Identifies a guard in errors, observer events and snapshots.
///
/// A key is the guarded type's name plus an optional static label. Two guards
/// over the same type can be told apart by labeling them.
///
/// # Examples
///
/// ```rust
/// use instance_guard::{GuardKey, InstanceGuard, LockedGuard};
///
/// struct Registry;
///
/// static PRIMARY: LockedGuard<Registry> = LockedGuard::with_label("primary", || Registry);
///
/// let key = PRIMARY.key();
/// assert!(key.type_name().ends_with("Registry"));
/// assert_eq!(key.label(), Some("primary"));
/// assert_eq!(key.display_name(), "Registry[primary]");
/// assert_eq!(GuardKey::of::<Registry>().label(), None);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct GuardKey {
    type_name: &'static str,
    label: Option<&'static str>,
}

impl GuardKey {
    /// Key for an unlabeled guard over `T`.
    pub fn of<T: ?Sized>() -> Self {
        Self {
            type_name: std::any::type_name::<T>(),
            label: None,
        }
    }

    /// Key for a guard over `T` with an optional label.
    pub fn with_label<T: ?Sized>(label: Option<&'static str>) -> Self {
        Self {
            type_name: std::any::type_name::<T>(),
            label,
        }
    }

    /// Fully qualified name of the guarded type.
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    /// Label given to the guard, if any.
    pub fn label(&self) -> Option<&'static str> {
        self.label
    }

    /// Short human-readable name: the last path segment of the type name,
    /// followed by the label in brackets.
    ///
    /// Generic arguments are kept, so `Vec<alloc::string::String>` shortens
    /// to `Vec<alloc::string::String>` rather than `String>`.
    pub fn display_name(&self) -> String {
        let short = short_type_name(self.type_name);
        match self.label {
            Some(label) => format!("{}[{}]", short, label),
            None => short.to_string(),
        }
    }
}

impl fmt::Display for GuardKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.label {
            Some(label) => write!(f, "{}[{}]", self.type_name, label),
            None => f.write_str(self.type_name),
        }
    }
}

/// Strips the module path from the outermost type, leaving generics intact.
fn short_type_name(full: &'static str) -> &'static str {
    let head = full.split('<').next().unwrap_or(full);
    match head.rfind("::") {
        Some(idx) => &full[idx + 2..],
        None => full,
    }
}
