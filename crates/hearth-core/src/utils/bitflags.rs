// Copyright 2025 eraflo
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! A macro to define bitflag sets, used for raw device button masks.
#[macro_export]
#[doc(hidden)]
macro_rules! hearth_bitflags {
    (
        $(#[$attr:meta])*
        $vis:vis struct $name:ident: $ty:ty {
            $(
                $(#[$flag_attr:meta])*
                const $flag_name:ident = $flag_value:expr;
            )*
        }
    ) => {
        $(#[$attr])*
        #[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
        $vis struct $name {
            bits: $ty,
        }

        impl $name {
            /// No flags set.
            pub const EMPTY: Self = Self { bits: 0 };

            $(
                $(#[$flag_attr])*
                pub const $flag_name: Self = Self { bits: $flag_value };
            )*

            /// Wraps raw device bits. Undefined bits are kept.
            pub const fn from_bits_truncate(bits: $ty) -> Self {
                Self { bits }
            }

            /// The raw bits.
            pub const fn bits(&self) -> $ty {
                self.bits
            }

            /// Returns `true` if no bit is set.
            pub const fn is_empty(&self) -> bool {
                self.bits == 0
            }

            /// Returns `true` if every flag in `other` is set.
            pub const fn contains(&self, other: Self) -> bool {
                (self.bits & other.bits) == other.bits
            }

            /// Returns `true` if any flag in `other` is set.
            pub const fn intersects(&self, other: Self) -> bool {
                (self.bits & other.bits) != 0
            }

            /// Sets the flags in `other`.
            pub fn insert(&mut self, other: Self) {
                self.bits |= other.bits;
            }

            /// Clears the flags in `other`.
            pub fn remove(&mut self, other: Self) {
                self.bits &= !other.bits;
            }

            /// Sets or clears the flags in `other`.
            pub fn set(&mut self, other: Self, value: bool) {
                if value {
                    self.insert(other);
                } else {
                    self.remove(other);
                }
            }
        }

        impl core::ops::BitOr for $name {
            type Output = Self;
            fn bitor(self, other: Self) -> Self {
                Self { bits: self.bits | other.bits }
            }
        }

        impl core::ops::BitOrAssign for $name {
            fn bitor_assign(&mut self, other: Self) {
                self.bits |= other.bits;
            }
        }

        impl core::fmt::Debug for $name {
            fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
                let mut bits = self.bits;
                let mut first = true;
                write!(f, "{} {{ ", stringify!($name))?;
                $(
                    if ($flag_value != 0) && (bits & $flag_value) == $flag_value {
                        if !first {
                            write!(f, " | ")?;
                        }
                        write!(f, "{}", stringify!($flag_name))?;
                        bits &= !$flag_value;
                        first = false;
                    }
                )*
                if bits != 0 {
                    if !first {
                        write!(f, " | ")?;
                    }
                    write!(f, "UNKNOWN({:#x})", bits)?;
                    first = false;
                }
                if first {
                    write!(f, "EMPTY")?;
                }
                write!(f, " }}")
            }
        }
    };
}

#[cfg(test)]
mod tests {
    use crate::hearth_bitflags;

    hearth_bitflags! {
        /// Flags for macro verification.
        pub struct Pad: u16 {
            const UP = 1 << 0;
            const DOWN = 1 << 1;
            const A = 1 << 12;
        }
    }

    #[test]
    fn empty_set_reports_nothing() {
        let flags = Pad::EMPTY;
        assert!(flags.is_empty());
        assert!(!flags.contains(Pad::UP));
        assert_eq!(Pad::default(), Pad::EMPTY);
        assert_eq!(format!("{flags:?}"), "Pad { EMPTY }");
    }

    #[test]
    fn union_and_membership() {
        let flags = Pad::UP | Pad::A;
        assert!(flags.contains(Pad::UP));
        assert!(flags.contains(Pad::A));
        assert!(!flags.contains(Pad::UP | Pad::DOWN));
        assert!(flags.intersects(Pad::UP | Pad::DOWN));
        assert_eq!(format!("{flags:?}"), "Pad { UP | A }");
    }

    #[test]
    fn set_toggles_individual_flags() {
        let mut flags = Pad::EMPTY;
        flags.set(Pad::DOWN, true);
        assert_eq!(flags.bits(), 0b10);
        flags.set(Pad::DOWN, false);
        assert!(flags.is_empty());
    }

    #[test]
    fn unknown_bits_are_kept_and_reported() {
        let flags = Pad::from_bits_truncate(0b101);
        assert_eq!(flags.bits(), 0b101);
        assert_eq!(format!("{flags:?}"), "Pad { UP | UNKNOWN(0x4) }");
    }
}
