//!
//! # Enum-String Mapping Module
//!
//! Defines the [enumstr] macro and its paired [EnumStr] trait, which together
//! maintain a bidirectional mapping between a fieldless enum and a set of
//! string values. Characterization-format content is full of such enumerated
//! strings: group-type tags, attribute names, pin directions, process corners.
//!
//! Example:
//!
//! ```rs
//! use charlib21utils::enumstr;
//!
//! enumstr!(
//! /// # Pin Direction
//! Direction {
//!     Input: "input",
//!     Output: "output",
//!  }
//! );
//! ```
//!

///
/// # String-Enumeration Trait
///
/// Defines two central methods:
/// * `to_str(&self) -> &'static str` converts the enum to its string value.
/// * `from_str(&str) -> Option<Self>` does the opposite, returning an [Option] indicator of success or failure.
///
/// While [EnumStr] can be implemented by hand, its primary intent is
/// implementation by the [enumstr] macro.
///
pub trait EnumStr: std::marker::Sized {
    fn to_str(&self) -> &'static str;
    fn from_str(txt: &str) -> Option<Self>;
}

///
/// # Enum-String Pairing Macro
///
/// Creates an `enum` which:
/// * (a) Has paired string-values, as commonly arrive in text-format fields.
/// * (b) Automatically implements the [EnumStr] trait for conversions to and from these strings.
/// * (c) Automatically implements [std::fmt::Display], writing the string-values.
///
/// All variants are fieldless, and include derived implementations of common
/// traits, notably including `serde::{Serialize, Deserialize}`.
///
#[macro_export]
macro_rules! enumstr {
    (   $(#[$meta: meta])*
        $enum_name: ident {
        $( $variant: ident : $strval: literal ),* $(,)?
    }) => {
        $(#[$meta])*
        #[allow(dead_code)]
        #[derive(Clone, Copy, Debug, Deserialize, Serialize, PartialEq, Eq)]
        pub enum $enum_name {
            $( #[doc=$strval]
                $variant ),*
        }
        impl EnumStr for $enum_name {
            /// Convert a [$enum_name] variant to its paired (static) string value.
            #[allow(dead_code)]
            fn to_str(&self) -> &'static str {
                match self {
                    $( Self::$variant => $strval),*,
                }
            }
            /// Create a [$enum_name] from one of its string-values.
            /// Returns `None` if input `txt` does not match one of [$enum_name]'s variants.
            /// Note `from_str` is case *sensitive*, i.e. uses a native string comparison.
            /// If case-insensitive matching is intended instead, re-case outside `from_str`.
            fn from_str(txt: &str) -> Option<Self> {
                match txt {
                    $( $strval => Some(Self::$variant)),*,
                    _ => None,
                }
            }
        }
        impl ::std::fmt::Display for $enum_name {
            fn fmt(&self, f: &mut ::std::fmt::Formatter) -> ::std::fmt::Result {
                write!(f, "{}", self.to_str())
            }
        }
    }
}

#[cfg(test)]
pub mod tests {
    use super::*;
    use serde::{Deserialize, Serialize};

    #[test]
    fn test_enumstr() {
        enumstr!(
            /// # Pin Direction
            Direction {
                Input: "input",
                Output: "output",
            }
        );

        // Conversions to string
        assert_eq!(Direction::Input.to_str(), "input");
        assert_eq!(Direction::Output.to_str(), "output");
        assert_eq!(Direction::Output.to_string(), "output");

        // Conversions from string
        assert_eq!(Direction::from_str("input"), Some(Direction::Input));
        assert_eq!(Direction::from_str("output"), Some(Direction::Output));
        assert_eq!(Direction::from_str("inout"), None);
        assert_eq!(Direction::from_str("INPUT"), None);
    }
}
