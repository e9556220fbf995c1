//! Source rectangles and draw commands.

use crate::animation::{AnimationClock, AnimationRegistry};
use crate::gid::{Gid, TileSetId, TileSetRegistry};
use crate::model::{LayerNode, TileSet};

/// Pixel rectangle inside a tileset image.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SourceRect {
    /// Left edge in pixels.
    pub x: u32,
    /// Top edge in pixels.
    pub y: u32,
    /// Width in pixels.
    pub w: u32,
    /// Height in pixels.
    pub h: u32,
}

impl SourceRect {
    /// Sub-rectangle of `tile_id` in `tileset`'s image, honouring margin and spacing.
    ///
    /// `None` when the tileset declares no columns, when `tile_id` is past a declared
    /// tile count, or when the offset does not fit in `u32`.
    pub fn for_tile(tileset: &TileSet, tile_id: u32) -> Option<(u32, u32, SourceRect)> {
        if tileset.columns == 0 || (tileset.tile_count != 0 && tile_id >= tileset.tile_count) {
            return None;
        }
        let col = tile_id % tileset.columns;
        let row = tile_id / tileset.columns;
        let offset = |index: u32, size: u32| {
            size.checked_add(tileset.spacing)?
                .checked_mul(index)?
                .checked_add(tileset.margin)
        };
        let rect = SourceRect {
            x: offset(col, tileset.tile_width)?,
            y: offset(row, tileset.tile_height)?,
            w: tileset.tile_width,
            h: tileset.tile_height,
        };
        Some((col, row, rect))
    }
}

/// What a gid currently shows: animation applied, sub-rectangle computed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TileDisplay {
    /// Owning tileset.
    pub tileset: TileSetId,
    /// Local id actually displayed (the current frame's tile for animated tiles).
    pub tile_id: u32,
    /// Column of the tile in the tileset image.
    pub column: u32,
    /// Row of the tile in the tileset image.
    pub row: u32,
    /// Pixel rectangle to sample.
    pub src: SourceRect,
    /// Mirror horizontally.
    pub flip_x: bool,
    /// Mirror vertically.
    pub flip_y: bool,
    /// Swap the tile's axes (Tiled's diagonal flip), applied before the mirrors.
    pub flip_d: bool,
}

pub(crate) fn display(
    tilesets: &TileSetRegistry,
    animations: &mut AnimationRegistry,
    clock: &AnimationClock,
    gid: Gid,
) -> Option<TileDisplay> {
    let resolved = tilesets.resolve(gid)?;
    let tileset = tilesets.get(resolved.tileset)?;
    let tile_id = match tileset.tile(resolved.local_id) {
        Some(tile) => animations.display_id(resolved.tileset, tile, clock),
        None => resolved.local_id,
    };
    let (column, row, src) = SourceRect::for_tile(tileset, tile_id)?;
    Some(TileDisplay {
        tileset: resolved.tileset,
        tile_id,
        column,
        row,
        src,
        flip_x: gid.flip_h(),
        flip_y: gid.flip_v(),
        flip_d: gid.flip_d(),
    })
}

/// One textured quad to blit.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DrawCommand {
    /// Position of the source layer in draw order (tile layers and object groups, pre-order).
    pub layer_index: usize,
    /// Texture to sample, by tileset.
    pub tileset: TileSetId,
    /// Pixel rectangle to sample.
    pub src: SourceRect,
    /// Destination left edge, zoom applied.
    pub dest_x: f32,
    /// Destination top edge, zoom applied.
    pub dest_y: f32,
    /// Destination width, zoom applied.
    pub dest_w: f32,
    /// Destination height, zoom applied.
    pub dest_h: f32,
    /// Mirror horizontally.
    pub flip_x: bool,
    /// Mirror vertically.
    pub flip_y: bool,
    /// Swap the tile's axes, applied before the mirrors.
    pub flip_d: bool,
}

pub(crate) struct DrawPass<'m> {
    pub tilesets: &'m TileSetRegistry,
    pub animations: &'m mut AnimationRegistry,
    pub clock: &'m AnimationClock,
    pub tile_width: f32,
    pub tile_height: f32,
    pub zoom: f32,
    pub layer_index: usize,
    pub out: Vec<DrawCommand>,
}

impl DrawPass<'_> {
    pub fn visit(&mut self, nodes: &[LayerNode]) {
        for node in nodes {
            if !node.is_visible() {
                continue;
            }
            match node {
                LayerNode::Tiles(layer) => {
                    for (y, row) in layer.rows.iter().enumerate() {
                        for (x, &gid) in row.iter().enumerate() {
                            let x = x as f32 * self.tile_width;
                            let y = y as f32 * self.tile_height;
                            self.push(gid, x, y, None);
                        }
                    }
                    self.layer_index += 1;
                }
                LayerNode::Objects(group) => {
                    for object in group.objects.iter().filter(|o| o.visible) {
                        let size = (
                            object.width.map(|w| w as f32),
                            object.height.map(|h| h as f32),
                        );
                        self.push(object.gid, object.x as f32, object.y as f32, Some(size));
                    }
                    self.layer_index += 1;
                }
                LayerNode::Group(group) => self.visit(&group.children),
            }
        }
    }

    // Tile objects are anchored at their bottom-left corner.
    fn push(&mut self, gid: Gid, x: f32, y: f32, object_size: Option<(Option<f32>, Option<f32>)>) {
        if gid.is_empty() {
            return;
        }
        let Some(shown) = display(self.tilesets, self.animations, self.clock, gid) else {
            return;
        };
        let (w, h, y) = match object_size {
            None => (shown.src.w as f32, shown.src.h as f32, y),
            Some((w, h)) => {
                let w = w.unwrap_or(shown.src.w as f32);
                let h = h.unwrap_or(shown.src.h as f32);
                (w, h, y - h)
            }
        };
        self.out.push(DrawCommand {
            layer_index: self.layer_index,
            tileset: shown.tileset,
            src: shown.src,
            dest_x: x * self.zoom,
            dest_y: y * self.zoom,
            dest_w: w * self.zoom,
            dest_h: h * self.zoom,
            flip_x: shown.flip_x,
            flip_y: shown.flip_y,
            flip_d: shown.flip_d,
        });
    }
}
