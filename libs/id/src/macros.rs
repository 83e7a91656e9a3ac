//! Macros for defining typed string IDs.

/// Macro to define a typed, opaque string ID.
///
/// This generates a newtype wrapper around `String` with:
/// - A `KIND` constant used in error messages
/// - `new()` to wrap any string without validation
/// - `parse()` to wrap a string that must be non-empty
/// - `Display`, `FromStr`, `From<&str>` and `From<String>` implementations
/// - Transparent `Serialize` and `Deserialize` implementations
/// - `Borrow<str>` so maps keyed by the ID can be queried with `&str`
///
/// # Example
///
/// ```ignore
/// define_key!(InstanceKey, "instance key");
///
/// let key = InstanceKey::new("A1B2C3");
/// let parsed: InstanceKey = "A1B2C3".parse()?;
/// ```
#[macro_export]
macro_rules! define_key {
    ($name:ident, $kind:literal) => {
        /// A typed, host-assigned identifier.
        #[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
        pub struct $name(String);

        impl $name {
            /// Human readable name of this ID kind.
            pub const KIND: &'static str = $kind;

            /// Wraps a string without validation.
            ///
            /// Values decoded from the wire go through this path: the host is
            /// allowed to send an empty value and callers decide what that means.
            #[must_use]
            pub fn new(value: impl Into<String>) -> Self {
                Self(value.into())
            }

            /// Parses an ID, rejecting empty and blank strings.
            pub fn parse(s: &str) -> Result<Self, $crate::IdError> {
                if s.is_empty() {
                    return Err($crate::IdError::Empty { kind: Self::KIND });
                }
                if s.trim().is_empty() {
                    return Err($crate::IdError::Blank { kind: Self::KIND });
                }
                Ok(Self(s.to_owned()))
            }

            /// Returns the ID as a string slice.
            #[must_use]
            pub fn as_str(&self) -> &str {
                &self.0
            }

            /// Returns true if the host sent an empty value.
            #[must_use]
            pub fn is_empty(&self) -> bool {
                self.0.is_empty()
            }

            /// Consumes the ID, returning the inner string.
            #[must_use]
            pub fn into_inner(self) -> String {
                self.0
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl std::str::FromStr for $name {
            type Err = $crate::IdError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Self::parse(s)
            }
        }

        impl From<&str> for $name {
            fn from(s: &str) -> Self {
                Self(s.to_owned())
            }
        }

        impl From<String> for $name {
            fn from(s: String) -> Self {
                Self(s)
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }

        impl std::borrow::Borrow<str> for $name {
            fn borrow(&self) -> &str {
                &self.0
            }
        }

        impl serde::Serialize for $name {
            fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
            where
                S: serde::Serializer,
            {
                serializer.serialize_str(&self.0)
            }
        }

        impl<'de> serde::Deserialize<'de> for $name {
            fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
            where
                D: serde::Deserializer<'de>,
            {
                String::deserialize(deserializer).map(Self)
            }
        }
    };
}
