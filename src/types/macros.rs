//! Macro for engine option bitmasks
//!
//! Option words cross the engine boundary as raw `u32` values. This macro
//! wraps such a word in a newtype with named constants, set operations and
//! a name table used for reporting.

#[doc(hidden)]
macro_rules! option_bits {
    (
        $(#[$meta:meta])*
        pub struct $name:ident {
            $(
                $(#[$flag_meta:meta])*
                const $flag:ident = $value:expr => $label:literal;
            )*
        }
    ) => {
        $(#[$meta])*
        #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
        pub struct $name(u32);

        impl $name {
            $(
                $(#[$flag_meta])*
                pub const $flag: Self = Self($value);
            )*

            const NAMED: &'static [(&'static str, u32)] = &[$(($label, $value)),*];

            /// No bits set
            pub const fn empty() -> Self {
                Self(0)
            }

            /// Wrap a raw option word, keeping unknown bits
            pub const fn from_bits(bits: u32) -> Self {
                Self(bits)
            }

            /// Raw option word
            pub const fn bits(self) -> u32 {
                self.0
            }

            /// Whether every bit of `other` is set
            pub const fn contains(self, other: Self) -> bool {
                self.0 & other.0 == other.0
            }

            /// Whether any bit of `other` is set
            pub const fn intersects(self, other: Self) -> bool {
                self.0 & other.0 != 0
            }

            pub const fn is_empty(self) -> bool {
                self.0 == 0
            }

            pub fn insert(&mut self, other: Self) {
                self.0 |= other.0;
            }

            pub fn remove(&mut self, other: Self) {
                self.0 &= !other.0;
            }

            /// Names of the known bits that are set, in declaration order
            pub fn names(self) -> Vec<&'static str> {
                Self::NAMED
                    .iter()
                    .filter(|(_, bits)| *bits != 0 && self.0 & bits == *bits)
                    .map(|(name, _)| *name)
                    .collect()
            }

            /// Look up a single flag by its name
            pub fn from_name(name: &str) -> Option<Self> {
                Self::NAMED
                    .iter()
                    .find(|(label, _)| *label == name)
                    .map(|(_, bits)| Self(*bits))
            }

            /// Combine flags by name; unknown names are an argument error
            pub fn from_names<'a, I>(names: I) -> $crate::core::error::XmpResult<Self>
            where
                I: IntoIterator<Item = &'a str>,
            {
                let mut flags = Self::empty();
                for name in names {
                    let flag = Self::from_name(name).ok_or_else(|| {
                        $crate::core::error::XmpError::Argument(format!(
                            "Unknown {} flag: {}",
                            stringify!($name),
                            name
                        ))
                    })?;
                    flags.insert(flag);
                }
                Ok(flags)
            }
        }

        impl ::std::ops::BitOr for $name {
            type Output = Self;

            fn bitor(self, rhs: Self) -> Self {
                Self(self.0 | rhs.0)
            }
        }

        impl ::std::ops::BitOrAssign for $name {
            fn bitor_assign(&mut self, rhs: Self) {
                self.0 |= rhs.0;
            }
        }

        impl ::std::ops::BitAnd for $name {
            type Output = Self;

            fn bitand(self, rhs: Self) -> Self {
                Self(self.0 & rhs.0)
            }
        }

        impl From<u32> for $name {
            fn from(bits: u32) -> Self {
                Self(bits)
            }
        }

        impl From<$name> for u32 {
            fn from(flags: $name) -> u32 {
                flags.0
            }
        }
    };
}
