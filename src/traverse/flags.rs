//! Per-arc traversal state.

use crate::arcs::{ArcId, ArcStore};
use num_traits::Float;

/// Visibility and availability of both directions of one arc.
///
/// A visible direction belongs to the shapes being assembled. An open
/// direction has not yet been consumed by a traced ring.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct RouteFlags(u8);

impl RouteFlags {
    const FWD_VISIBLE: u8 = 0x01;
    const FWD_OPEN: u8 = 0x02;
    const REV_VISIBLE: u8 = 0x10;
    const REV_OPEN: u8 = 0x20;

    /// Both directions visible but closed.
    pub const VISIBLE: Self = Self(Self::FWD_VISIBLE | Self::REV_VISIBLE);

    /// Returns the raw flag bits.
    pub fn bits(self) -> u8 {
        self.0
    }

    /// Returns true if no flag is set.
    pub fn is_empty(self) -> bool {
        self.0 == 0
    }

    #[inline]
    fn visible_bit(forward: bool) -> u8 {
        if forward {
            Self::FWD_VISIBLE
        } else {
            Self::REV_VISIBLE
        }
    }

    #[inline]
    fn open_bit(forward: bool) -> u8 {
        if forward {
            Self::FWD_OPEN
        } else {
            Self::REV_OPEN
        }
    }

    /// Returns true if the given direction is visible.
    #[inline]
    pub fn is_visible(self, forward: bool) -> bool {
        self.0 & Self::visible_bit(forward) != 0
    }

    /// Returns true if the given direction is open.
    #[inline]
    pub fn is_open(self, forward: bool) -> bool {
        self.0 & Self::open_bit(forward) != 0
    }

    /// Makes a direction visible and open.
    #[inline]
    pub fn open(&mut self, forward: bool) {
        self.0 |= Self::visible_bit(forward) | Self::open_bit(forward);
    }

    /// Closes a direction, leaving it visible.
    #[inline]
    pub fn close(&mut self, forward: bool) {
        self.0 &= !Self::open_bit(forward);
    }

    /// Clears both bits of a direction.
    #[inline]
    pub fn hide(&mut self, forward: bool) {
        self.0 &= !(Self::visible_bit(forward) | Self::open_bit(forward));
    }

    /// Returns true if both directions are open.
    #[inline]
    pub fn is_open_both_ways(self) -> bool {
        self.is_open(true) && self.is_open(false)
    }
}

impl std::ops::BitOr for RouteFlags {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

/// Route flags for every arc of a store, indexed by arc.
#[derive(Debug, Clone)]
pub struct RouteTable {
    flags: Vec<RouteFlags>,
}

impl RouteTable {
    /// A table with every route hidden.
    pub fn new(arc_count: usize) -> Self {
        Self {
            flags: vec![RouteFlags::default(); arc_count],
        }
    }

    /// Number of arcs covered.
    pub fn len(&self) -> usize {
        self.flags.len()
    }

    /// Returns true if the table covers no arcs.
    pub fn is_empty(&self) -> bool {
        self.flags.is_empty()
    }

    /// Flags of arc `idx`.
    #[inline]
    pub fn get(&self, idx: usize) -> RouteFlags {
        self.flags[idx]
    }

    /// Returns true if travel along `id` is visible.
    #[inline]
    pub fn is_visible(&self, id: ArcId) -> bool {
        self.flags[id.index()].is_visible(id.is_forward())
    }

    /// Returns true if travel along `id` is open.
    #[inline]
    pub fn is_open(&self, id: ArcId) -> bool {
        self.flags[id.index()].is_open(id.is_forward())
    }

    /// Consumes the route along `id`. Returns false if it was not open.
    pub fn use_route(&mut self, id: ArcId) -> bool {
        if self.is_open(id) {
            self.flags[id.index()].close(id.is_forward());
            true
        } else {
            false
        }
    }

    /// Reopens the route along `id`.
    pub fn reopen(&mut self, id: ArcId) {
        self.flags[id.index()].open(id.is_forward());
    }

    /// Hides the route along `id`.
    pub fn hide(&mut self, id: ArcId) {
        self.flags[id.index()].hide(id.is_forward());
    }

    /// Adds `extra` to the flags of arc `idx`.
    pub fn merge(&mut self, idx: usize, extra: RouteFlags) {
        self.flags[idx] = self.flags[idx] | extra;
    }

    /// Opens the arcs of `paths`.
    ///
    /// `fwd` opens the direction a path travels, `rev` the opposite one.
    /// With `dissolve` set, an arc left open in both directions is hidden,
    /// since it separates two parts of the same region. Arcs that double
    /// back on themselves enclose nothing and are always hidden.
    pub fn open_routes<'a, F: Float>(
        &mut self,
        arcs: &ArcStore<F>,
        paths: impl IntoIterator<Item = &'a Vec<ArcId>>,
        fwd: bool,
        rev: bool,
        dissolve: bool,
    ) {
        for &id in paths.into_iter().flatten() {
            let idx = id.index();
            let flags = &mut self.flags[idx];
            if fwd {
                flags.open(id.is_forward());
            }
            if rev {
                flags.open(!id.is_forward());
            }
            if dissolve && flags.is_open_both_ways() {
                *flags = RouteFlags::default();
            }
            if arcs.arc_is_lollipop(idx) {
                *flags = RouteFlags::default();
            }
        }
    }

    /// Closes both directions of every arc of `paths`, leaving visibility.
    pub fn close_routes<'a>(&mut self, paths: impl IntoIterator<Item = &'a Vec<ArcId>>) {
        for &id in paths.into_iter().flatten() {
            let flags = &mut self.flags[id.index()];
            flags.close(true);
            flags.close(false);
        }
    }

    /// Resets the arcs of `paths` to hidden.
    pub fn clear_routes<'a>(&mut self, paths: impl IntoIterator<Item = &'a Vec<ArcId>>) {
        for &id in paths.into_iter().flatten() {
            self.flags[id.index()] = RouteFlags::default();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::primitives::Point2;

    fn two_arcs() -> ArcStore<f64> {
        ArcStore::from_arcs(&[
            vec![Point2::new(0.0, 0.0), Point2::new(1.0, 0.0)],
            vec![Point2::new(1.0, 0.0), Point2::new(1.0, 1.0), Point2::new(0.0, 0.0)],
        ])
        .unwrap()
    }

    #[test]
    fn test_flag_bits() {
        let mut f = RouteFlags::default();
        f.open(true);
        assert_eq!(f.bits(), 0x03);
        f.open(false);
        assert_eq!(f.bits(), 0x33);
        f.close(true);
        assert!(f.is_visible(true) && !f.is_open(true));
        f.hide(false);
        assert_eq!(f.bits(), 0x01);
        assert_eq!((f | RouteFlags::VISIBLE).bits(), 0x11);
    }

    #[test]
    fn test_use_route_once() {
        let arcs = two_arcs();
        let mut table = RouteTable::new(2);
        let path = vec![ArcId::forward(0), ArcId::forward(1)];
        table.open_routes(&arcs, [&path], true, false, false);
        assert!(table.is_open(ArcId::forward(0)));
        assert!(!table.is_visible(ArcId::reverse(0)));
        assert!(table.use_route(ArcId::forward(0)));
        assert!(!table.use_route(ArcId::forward(0)));
        assert!(table.is_visible(ArcId::forward(0)));
    }

    #[test]
    fn test_dissolve_hides_shared_arc() {
        let arcs = two_arcs();
        let mut table = RouteTable::new(2);
        let a = vec![ArcId::forward(0)];
        let b = vec![ArcId::reverse(0), ArcId::forward(1)];
        table.open_routes(&arcs, [&a, &b], true, false, true);
        assert!(table.get(0).is_empty());
        assert!(table.is_open(ArcId::forward(1)));
        table.close_routes([&b]);
        assert!(!table.is_open(ArcId::forward(1)));
        table.clear_routes([&b]);
        assert!(table.get(1).is_empty());
    }

    #[test]
    fn test_lollipop_hidden() {
        let arcs = ArcStore::from_arcs(&[vec![
            Point2::new(0.0, 0.0),
            Point2::new(1.0, 0.0),
            Point2::new(0.0, 0.0),
        ]])
        .unwrap();
        let mut table = RouteTable::new(1);
        table.open_routes(&arcs, [&vec![ArcId::forward(0)]], true, true, false);
        assert!(table.get(0).is_empty());
    }
}
