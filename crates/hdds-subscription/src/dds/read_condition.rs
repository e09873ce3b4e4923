// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Sample, view and instance state masks used to filter read/take.
//!
//! Per DDS v1.4 spec section 2.2.2.5.4

/// Generates a state-mask newtype with `ANY`, bit accessors, `contains`,
/// `intersects` and `BitOr`.
macro_rules! state_mask {
    (
        $(#[$meta:meta])*
        $name:ident { $($(#[$cmeta:meta])* $flag:ident = $bit:expr),+ $(,)? }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq)]
        pub struct $name(u32);

        impl $name {
            $(
                $(#[$cmeta])*
                pub const $flag: $name = $name(1 << $bit);
            )+

            /// Any state
            pub const ANY: $name = $name(0 $(| (1 << $bit))+);

            pub const fn from_bits(bits: u32) -> Self {
                $name(bits)
            }

            pub const fn bits(&self) -> u32 {
                self.0
            }

            /// All bits of `other` are set in `self`.
            pub const fn contains(&self, other: $name) -> bool {
                (self.0 & other.0) == other.0
            }

            /// At least one bit of `other` is set in `self`.
            pub const fn intersects(&self, other: $name) -> bool {
                (self.0 & other.0) != 0
            }
        }

        impl std::ops::BitOr for $name {
            type Output = Self;
            fn bitor(self, rhs: Self) -> Self {
                $name(self.0 | rhs.0)
            }
        }
    };
}

state_mask! {
    /// Sample state mask
    SampleStateMask {
        /// Sample has been read
        READ = 0,
        /// Sample has not been read
        NOT_READ = 1,
    }
}

state_mask! {
    /// View state mask
    ViewStateMask {
        /// Instance not yet seen by read/take since (re)appearing
        NEW = 0,
        /// Instance already accessed
        NOT_NEW = 1,
    }
}

state_mask! {
    /// Instance state mask
    InstanceStateMask {
        /// At least one live writer
        ALIVE = 0,
        /// Instance disposed by a writer
        NOT_ALIVE_DISPOSED = 1,
        /// No live writer left
        NOT_ALIVE_NO_WRITERS = 2,
    }
}

impl InstanceStateMask {
    /// Either not-alive state.
    pub const NOT_ALIVE: InstanceStateMask = InstanceStateMask(
        Self::NOT_ALIVE_DISPOSED.0 | Self::NOT_ALIVE_NO_WRITERS.0,
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_any_masks() {
        assert_eq!(SampleStateMask::ANY.bits(), 0b11);
        assert_eq!(ViewStateMask::ANY.bits(), 0b11);
        assert_eq!(InstanceStateMask::ANY.bits(), 0b111);
        assert!(InstanceStateMask::ANY.contains(InstanceStateMask::NOT_ALIVE));
    }

    #[test]
    fn test_intersects() {
        let mask = SampleStateMask::NOT_READ;
        assert!(mask.intersects(SampleStateMask::ANY));
        assert!(!mask.intersects(SampleStateMask::READ));
        assert!((SampleStateMask::READ | SampleStateMask::NOT_READ).contains(mask));
    }
}
