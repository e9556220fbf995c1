//! Global tile ids and their resolution to tilesets.

use serde::Serialize;

/// Horizontal flip flag.
pub const FLIP_H: u32 = 0x8000_0000; // bit 31
/// Vertical flip flag.
pub const FLIP_V: u32 = 0x4000_0000; // bit 30
/// Diagonal (anti-diagonal) flip flag.
pub const FLIP_D: u32 = 0x2000_0000; // bit 29
/// Bits that carry the tile id.
pub const GID_MASK: u32 = 0x1FFF_FFFF; // keep lower 29 bits

/// Global tile identifier as stored in layer data and tile objects, flip flags included.
///
/// `Gid(0)` is the empty cell / "no tile graphic" marker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
pub struct Gid(pub u32);

impl Gid {
    /// The empty cell.
    pub const EMPTY: Gid = Gid(0);

    /// Value as stored, flags included.
    #[inline] pub fn raw(self) -> u32 { self.0 }
    /// Tile id with flip flags removed.
    #[inline] pub fn clean(self) -> u32 { self.0 & GID_MASK }
    /// True for an empty cell, whatever the flags.
    #[inline] pub fn is_empty(self) -> bool { self.clean() == 0 }
    /// Horizontally flipped.
    #[inline] pub fn flip_h(self) -> bool { (self.0 & FLIP_H) != 0 }
    /// Vertically flipped.
    #[inline] pub fn flip_v(self) -> bool { (self.0 & FLIP_V) != 0 }
    /// Flipped across the anti-diagonal.
    #[inline] pub fn flip_d(self) -> bool { (self.0 & FLIP_D) != 0 }
}

impl From<u32> for Gid {
    fn from(raw: u32) -> Self {
        Gid(raw)
    }
}

/// Index of a decoded tileset inside a [`TileSetRegistry`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct TileSetId(pub usize);

/// One `<tileset>` reference of the map after resolution.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TileSetBinding {
    /// First global id owned by the tileset.
    pub first_gid: u32,
    /// `source` attribute as written in the map, `None` for embedded tilesets.
    pub source: Option<String>,
    /// Bound tileset; `None` when it could not be fetched.
    pub tileset: Option<TileSetId>,
}

/// Outcome of resolving a [`Gid`] against the map's tileset references.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolvedGid {
    /// Tileset the gid belongs to.
    pub tileset: TileSetId,
    /// `first_gid` of the owning reference.
    pub first_gid: u32,
    /// `gid - first_gid`, flip flags removed.
    pub local_id: u32,
}

/// Decoded tilesets plus the map's ordered references into them.
#[derive(Debug, Clone, Default, Serialize)]
pub struct TileSetRegistry {
    pub(crate) bindings: Vec<TileSetBinding>,
    pub(crate) tilesets: Vec<crate::model::TileSet>,
}

impl TileSetRegistry {
    /// References in declaration order.
    pub fn bindings(&self) -> &[TileSetBinding] {
        &self.bindings
    }

    /// Distinct decoded tilesets, indexed by [`TileSetId`].
    pub fn tilesets(&self) -> &[crate::model::TileSet] {
        &self.tilesets
    }

    /// Tileset by id.
    #[inline]
    pub fn get(&self, id: TileSetId) -> Option<&crate::model::TileSet> {
        self.tilesets.get(id.0)
    }

    /// Find the tileset owning `gid`.
    ///
    /// References are scanned from the last declared to the first; the first one with
    /// `first_gid <= gid` is the tightest lower bound because `first_gid` increases in
    /// declaration order. Returns `None` for the empty gid, for a gid below every
    /// `first_gid`, and for a gid whose owning reference is unbound.
    pub fn resolve(&self, gid: Gid) -> Option<ResolvedGid> {
        let clean = gid.clean();
        if clean == 0 {
            return None;
        }
        let binding = self.bindings.iter().rev().find(|b| b.first_gid <= clean)?;
        Some(ResolvedGid {
            tileset: binding.tileset?,
            first_gid: binding.first_gid,
            local_id: clean - binding.first_gid,
        })
    }
}
