//! Macro for implementing Display and FromStr for selector enums
//!
//! Each variant has one canonical lowercase name, used by `Display`, and may
//! accept extra aliases when parsing. Parsing is case-insensitive.
//!
//! # Example
//!
//! ```rust
//! use tabauth_domain::impl_selector_conversions;
//!
//! #[derive(Debug, Clone, Copy, PartialEq, Eq)]
//! pub enum Backend {
//!     Disk,
//!     Memory,
//! }
//!
//! impl_selector_conversions!(Backend {
//!     Disk => "disk" | "file",
//!     Memory => "memory",
//! });
//!
//! assert_eq!(Backend::Disk.to_string(), "disk");
//! assert_eq!("FILE".parse::<Backend>(), Ok(Backend::Disk));
//! ```

/// Implements Display and FromStr traits for selector enums
///
/// This macro generates:
/// - Display trait: writes the canonical (first) name of the variant
/// - FromStr trait: parses the canonical name or any alias, ignoring case
#[macro_export]
macro_rules! impl_selector_conversions {
    ($enum_name:ident { $($variant:ident => $str:literal $(| $alias:literal)*),+ $(,)? }) => {
        impl std::fmt::Display for $enum_name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                match self {
                    $(Self::$variant => f.write_str($str),)+
                }
            }
        }

        impl std::str::FromStr for $enum_name {
            type Err = String;

            fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
                match s.trim().to_lowercase().as_str() {
                    $($str $(| $alias)* => Ok(Self::$variant),)+
                    _ => Err(format!("Invalid {}: {}", stringify!($enum_name), s)),
                }
            }
        }
    };
}
