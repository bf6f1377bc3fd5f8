//! Fixed-set guard: a closed enumeration whose sole member is the instance.

use std::fmt;

use crate::{GuardError, GuardKey, GuardResult, InitState, InstanceGuard, Strategy};

/// A closed set of members backed by a `static` table.
///
/// Members exist from program start as static data, so nothing is constructed
/// at runtime and there is nothing to synchronize. A value obtained any other
/// way (decoded from bytes, copied, or written as a literal) is mapped back to
/// its table entry through its tag, which gives every member a single
/// canonical address.
///
/// Usually implemented with the [`fixed_set!`](crate::fixed_set) macro.
///
/// # Examples
///
/// ```rust
/// use instance_guard::{fixed_set, FixedSet};
///
/// fixed_set! {
///     /// The process-wide id generator.
///     pub enum IdSource {
///         Instance,
///     }
/// }
///
/// impl IdSource {
///     pub fn prefix(&self) -> &'static str {
///         "id-"
///     }
/// }
///
/// let a = IdSource::instance().unwrap();
/// let b = IdSource::instance().unwrap();
/// assert!(std::ptr::eq(a, b));
/// assert_eq!(a.prefix(), "id-");
///
/// // A loose copy resolves to the table entry.
/// let copy = IdSource::Instance;
/// assert!(std::ptr::eq(copy.resolve().unwrap(), a));
/// ```
pub trait FixedSet: Sized + Sync + 'static {
    /// The closed member table. Must return the same `static` slice on every
    /// call.
    fn members() -> &'static [Self];

    /// Stable name of a member, unique within the set.
    fn tag(&self) -> &'static str;

    /// The sole member of a single-member set.
    ///
    /// Fails with [`GuardError::NotSingular`] if the table holds any other
    /// number of members.
    fn instance() -> GuardResult<&'static Self> {
        match Self::members() {
            [only] => Ok(only),
            members => Err(GuardError::NotSingular(
                std::any::type_name::<Self>(),
                members.len(),
            )),
        }
    }

    /// Looks a member up by tag.
    fn by_tag(tag: &str) -> GuardResult<&'static Self> {
        Self::members()
            .iter()
            .find(|member| member.tag() == tag)
            .ok_or_else(|| GuardError::UnknownTag(tag.to_string()))
    }

    /// The canonical table entry for this value.
    fn resolve(&self) -> GuardResult<&'static Self> {
        Self::by_tag(self.tag())
    }
}

/// [`InstanceGuard`] view of a single-member [`FixedSet`].
///
/// Lets fixed-set singletons sit alongside runtime guards in code that is
/// generic over the strategy.
///
/// ```rust
/// use instance_guard::{fixed_set, FixedSetGuard, InstanceGuard, Strategy};
///
/// fixed_set! {
///     pub enum Clock {
///         Instance,
///     }
/// }
///
/// let guard = FixedSetGuard::<Clock>::new().unwrap();
/// assert_eq!(guard.strategy(), Strategy::FixedSet);
/// assert_eq!(*guard.instance(), Clock::Instance);
/// assert_eq!(guard.constructions(), 0);
/// ```
pub struct FixedSetGuard<E: 'static> {
    instance: &'static E,
}

impl<E: FixedSet> FixedSetGuard<E> {
    /// Binds to the sole member of `E`.
    pub fn new() -> GuardResult<Self> {
        Ok(Self {
            instance: E::instance()?,
        })
    }

    /// Returns the sole member.
    #[inline]
    pub fn get(&self) -> &'static E {
        self.instance
    }
}

impl<E: FixedSet> InstanceGuard for FixedSetGuard<E> {
    type Target = E;

    fn instance(&self) -> &E {
        self.instance
    }

    fn key(&self) -> GuardKey {
        GuardKey::with_label::<E>(Some(self.instance.tag()))
    }

    fn strategy(&self) -> Strategy {
        Strategy::FixedSet
    }

    fn state(&self) -> InitState {
        InitState::Initialized
    }

    /// Always 0: members are static data, not constructed at runtime.
    fn constructions(&self) -> usize {
        0
    }
}

impl<E: FixedSet> Clone for FixedSetGuard<E> {
    fn clone(&self) -> Self {
        Self {
            instance: self.instance,
        }
    }
}

impl<E: FixedSet> Copy for FixedSetGuard<E> {}

impl<E: FixedSet> fmt::Debug for FixedSetGuard<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FixedSetGuard")
            .field("member", &self.instance.tag())
            .finish()
    }
}

/// Serializes a member as its tag string.
#[cfg(feature = "serde")]
pub fn serialize_tag<E, S>(member: &E, serializer: S) -> Result<S::Ok, S::Error>
where
    E: FixedSet,
    S: serde::Serializer,
{
    serializer.serialize_str(member.tag())
}

/// Deserializes a tag string and resolves it to the canonical member.
#[cfg(feature = "serde")]
pub fn deserialize_tag<'de, E, D>(deserializer: D) -> Result<&'static E, D::Error>
where
    E: FixedSet,
    D: serde::Deserializer<'de>,
{
    use serde::Deserialize;

    let tag = std::borrow::Cow::<'de, str>::deserialize(deserializer)?;
    E::by_tag(&tag).map_err(serde::de::Error::custom)
}

/// Decodes JSON bytes holding a member tag into the canonical member.
///
/// ```rust
/// use instance_guard::{fixed_set, fixed::decode_member, FixedSet};
///
/// fixed_set! {
///     pub enum Scheduler {
///         Instance,
///     }
/// }
///
/// let bytes = serde_json::to_vec(&Scheduler::Instance).unwrap();
/// assert_eq!(bytes, b"\"Instance\"");
/// let decoded = decode_member::<Scheduler>(&bytes).unwrap();
/// assert!(std::ptr::eq(decoded, Scheduler::instance().unwrap()));
/// ```
#[cfg(feature = "serde")]
pub fn decode_member<E: FixedSet>(bytes: &[u8]) -> GuardResult<&'static E> {
    let tag: String =
        serde_json::from_slice(bytes).map_err(|e| GuardError::Decode(e.to_string()))?;
    E::by_tag(&tag)
}

/// Declares a closed enumeration and implements [`FixedSet`] for it.
///
/// The generated enum derives `Debug`, `Clone`, `Copy`, `PartialEq`, `Eq` and
/// `Hash`, displays as its tag (the variant name) and, with the `serde`
/// feature, serializes as that tag. Deserialization always goes through the
/// tag lookup.
///
/// ```rust
/// use instance_guard::{fixed_set, FixedSet, GuardError};
///
/// fixed_set! {
///     pub enum Channel {
///         Stable,
///         Beta,
///     }
/// }
///
/// assert_eq!(Channel::members().len(), 2);
/// assert_eq!(*Channel::by_tag("Beta").unwrap(), Channel::Beta);
/// assert_eq!(Channel::Stable.to_string(), "Stable");
/// assert!(matches!(Channel::instance(), Err(GuardError::NotSingular(_, 2))));
/// ```
#[macro_export]
macro_rules! fixed_set {
    (
        $(#[$meta:meta])*
        $vis:vis enum $name:ident {
            $($(#[$vmeta:meta])* $variant:ident),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        $vis enum $name {
            $($(#[$vmeta])* $variant),+
        }

        impl $crate::FixedSet for $name {
            fn members() -> &'static [Self] {
                static MEMBERS: &[$name] = &[$($name::$variant),+];
                MEMBERS
            }

            fn tag(&self) -> &'static str {
                match self {
                    $($name::$variant => stringify!($variant)),+
                }
            }
        }

        impl ::core::fmt::Display for $name {
            fn fmt(&self, f: &mut ::core::fmt::Formatter<'_>) -> ::core::fmt::Result {
                f.write_str($crate::FixedSet::tag(self))
            }
        }

        $crate::__fixed_set_serde!($name);
    };
}

#[cfg(feature = "serde")]
#[doc(hidden)]
#[macro_export]
macro_rules! __fixed_set_serde {
    ($name:ident) => {
        impl $crate::__private::serde::Serialize for $name {
            fn serialize<S>(&self, serializer: S) -> ::core::result::Result<S::Ok, S::Error>
            where
                S: $crate::__private::serde::Serializer,
            {
                $crate::fixed::serialize_tag(self, serializer)
            }
        }

        impl<'de> $crate::__private::serde::Deserialize<'de> for $name {
            fn deserialize<D>(deserializer: D) -> ::core::result::Result<Self, D::Error>
            where
                D: $crate::__private::serde::Deserializer<'de>,
            {
                $crate::fixed::deserialize_tag::<$name, D>(deserializer).map(|member| *member)
            }
        }
    };
}

#[cfg(not(feature = "serde"))]
#[doc(hidden)]
#[macro_export]
macro_rules! __fixed_set_serde {
    ($name:ident) => {};
}

#[cfg(test)]
mod tests {
    use super::*;

    crate::fixed_set! {
        enum Solo {
            Instance,
        }
    }

    crate::fixed_set! {
        enum Trio {
            Red,
            Green,
            Blue,
        }
    }

    crate::fixed_set! {
        enum Nothing {
            Only,
        }
    }

    #[test]
    fn sole_member_has_one_address() {
        let a = Solo::instance().unwrap();
        let b = Solo::instance().unwrap();
        assert!(std::ptr::eq(a, b));
        assert!(std::ptr::eq(Solo::Instance.resolve().unwrap(), a));
    }

    #[test]
    fn multi_member_sets_are_not_singular() {
        assert_eq!(
            Trio::instance(),
            Err(GuardError::NotSingular(std::any::type_name::<Trio>(), 3))
        );
        assert!(FixedSetGuard::<Trio>::new().is_err());
        assert!(std::ptr::eq(Trio::by_tag("Green").unwrap(), &Trio::members()[1]));
    }

    #[test]
    fn unknown_tag() {
        assert_eq!(
            Nothing::by_tag("Other"),
            Err(GuardError::UnknownTag("Other".to_string()))
        );
    }

    #[cfg(feature = "serde")]
    #[test]
    fn decode_goes_through_table() {
        let decoded = decode_member::<Trio>(br#""Blue""#).unwrap();
        assert!(std::ptr::eq(decoded, &Trio::members()[2]));
        assert!(matches!(decode_member::<Trio>(b"\"Purple\""), Err(GuardError::UnknownTag(_))));
        assert!(matches!(decode_member::<Trio>(b"{"), Err(GuardError::Decode(_))));

        let value: Solo = serde_json::from_str("\"Instance\"").unwrap();
        assert_eq!(value, Solo::Instance);
    }
}
