//! World-space collision shapes of placed tiles.

use crate::gid::{Gid, TileSetRegistry};
use crate::model::{LayerNode, TileSetObject};

/// Collect the collision shapes of every placed tile, translated into world space.
///
/// Walks the layer tree in document order, descending into group layers. A tile
/// layer cell at `(x, y)` offsets its tile's shapes by `(x * tile_width, y * tile_height)`;
/// a tile object offsets them by the object's position. Empty gids, unresolved gids and
/// tiles without a collision group contribute nothing. Visibility is ignored.
pub fn flatten(
    nodes: &[LayerNode],
    tilesets: &TileSetRegistry,
    tile_width: u32,
    tile_height: u32,
) -> Vec<TileSetObject> {
    let mut out = Vec::new();
    walk(nodes, tilesets, (tile_width as f64, tile_height as f64), &mut out);
    out
}

fn walk(
    nodes: &[LayerNode],
    tilesets: &TileSetRegistry,
    cell: (f64, f64),
    out: &mut Vec<TileSetObject>,
) {
    for node in nodes {
        match node {
            LayerNode::Tiles(layer) => {
                for (y, row) in layer.rows.iter().enumerate() {
                    for (x, &gid) in row.iter().enumerate() {
                        push_shapes(tilesets, gid, x as f64 * cell.0, y as f64 * cell.1, out);
                    }
                }
            }
            LayerNode::Objects(group) => {
                for object in &group.objects {
                    push_shapes(tilesets, object.gid, object.x, object.y, out);
                }
            }
            LayerNode::Group(group) => walk(&group.children, tilesets, cell, out),
        }
    }
}

fn push_shapes(tilesets: &TileSetRegistry, gid: Gid, dx: f64, dy: f64, out: &mut Vec<TileSetObject>) {
    if gid.is_empty() {
        return;
    }
    let Some(resolved) = tilesets.resolve(gid) else {
        return;
    };
    let Some(group) = tilesets
        .get(resolved.tileset)
        .and_then(|ts| ts.tile(resolved.local_id))
        .and_then(|tile| tile.collision.as_ref())
    else {
        return;
    };
    out.extend(group.objects.iter().map(|shape| {
        let mut placed = shape.clone();
        placed.x += dx;
        placed.y += dy;
        placed
    }));
}
