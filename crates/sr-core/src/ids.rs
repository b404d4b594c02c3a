//! Dense graph identifiers.
//!
//! A `NodeId` / `EdgeId` is a position in the network's parallel arrays, so
//! it is only meaningful for the network that issued it.  Source-data ids
//! (e.g. OSM ids) live beside the dense ids; see `RoadNetwork::external_id`.
//!
//! `NodeId` ordering is the tie-break order for nearest-node lookup and for
//! equal-cost frontier entries in the path search.

use std::fmt;

/// Declare a `u32` index newtype with an `INVALID` sentinel.
macro_rules! dense_id {
    ($(#[$attr:meta])* $name:ident, $prefix:literal) => {
        $(#[$attr])*
        #[derive(Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Debug)]
        #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
        pub struct $name(pub u32);

        impl $name {
            /// Placeholder for "not set"; never a valid array position.
            pub const INVALID: $name = $name(u32::MAX);

            #[inline(always)]
            pub fn index(self) -> usize {
                self.0 as usize
            }

            /// `None` if `index` does not fit below the sentinel.
            #[inline]
            pub fn from_index(index: usize) -> Option<$name> {
                u32::try_from(index).ok().filter(|&i| i != u32::MAX).map($name)
            }

            #[inline]
            pub fn is_valid(self) -> bool {
                self != Self::INVALID
            }
        }

        impl Default for $name {
            #[inline(always)]
            fn default() -> Self {
                Self::INVALID
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, concat!($prefix, "{}"), self.0)
            }
        }
    };
}

dense_id! {
    /// A road-network node (intersection or dead end).
    NodeId, "n"
}

dense_id! {
    /// A directed road-network edge.
    EdgeId, "e"
}
