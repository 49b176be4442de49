//! Signed arc reference.

use std::fmt;
use std::ops::Not;

/// A reference to an arc together with a direction of travel.
///
/// Non-negative raw values traverse the arc forward; the bitwise complement
/// `!index` traverses arc `index` backward. `ArcId::forward(3).reversed()`
/// has the raw value `-4`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ArcId(i32);

impl ArcId {
    /// Forward reference to arc `index`.
    #[inline]
    pub const fn forward(index: usize) -> Self {
        Self(index as i32)
    }

    /// Backward reference to arc `index`.
    #[inline]
    pub const fn reverse(index: usize) -> Self {
        Self(!(index as i32))
    }

    /// Reference to arc `index` in the given direction.
    #[inline]
    pub const fn new(index: usize, forward: bool) -> Self {
        if forward {
            Self::forward(index)
        } else {
            Self::reverse(index)
        }
    }

    /// Wraps a raw signed id.
    #[inline]
    pub const fn from_raw(raw: i32) -> Self {
        Self(raw)
    }

    /// Returns the raw signed id.
    #[inline]
    pub const fn raw(self) -> i32 {
        self.0
    }

    /// Index of the referenced arc, regardless of direction.
    #[inline]
    pub const fn index(self) -> usize {
        if self.0 >= 0 {
            self.0 as usize
        } else {
            (!self.0) as usize
        }
    }

    /// Returns `true` for a forward reference.
    #[inline]
    pub const fn is_forward(self) -> bool {
        self.0 >= 0
    }

    /// The same arc traversed the other way.
    #[inline]
    pub const fn reversed(self) -> Self {
        Self(!self.0)
    }
}

impl Not for ArcId {
    type Output = Self;

    #[inline]
    fn not(self) -> Self {
        self.reversed()
    }
}

impl From<i32> for ArcId {
    fn from(raw: i32) -> Self {
        Self(raw)
    }
}

impl fmt::Display for ArcId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_forward() {
            write!(f, "{}", self.0)
        } else {
            write!(f, "~{}", self.index())
        }
    }
}
