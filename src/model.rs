//! Plain data mirroring the TMX/TSX schema.
//!
//! Nothing here has behaviour beyond small accessors; decoding lives in
//! [`crate::loader`], resolution and queries in [`crate::TileMap`].

use std::path::PathBuf;

use serde::Serialize;

use crate::gid::Gid;

/// A custom property. `kind` is the declared type tag (`string` when absent);
/// `value` is kept raw for the consumer to interpret.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Property {
    /// Property name.
    pub name: String,
    /// Declared type tag.
    pub kind: String,
    /// Raw value text.
    pub value: String,
}

/// Ordered property list. Lookups return the first property with the given name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Properties(pub Vec<Property>);

impl Properties {
    /// No properties.
    pub fn new() -> Self {
        Self::default()
    }

    /// First property named `name`.
    pub fn get(&self, name: &str) -> Option<&Property> {
        self.0.iter().find(|p| p.name == name)
    }

    /// Raw value of `name`.
    pub fn get_str(&self, name: &str) -> Option<&str> {
        self.get(name).map(|p| p.value.as_str())
    }

    /// `name` parsed as `true`/`false`.
    pub fn get_bool(&self, name: &str) -> Option<bool> {
        match self.get_str(name)? {
            "true" | "1" => Some(true),
            "false" | "0" => Some(false),
            _ => None,
        }
    }

    /// `name` parsed as an integer.
    pub fn get_i64(&self, name: &str) -> Option<i64> {
        self.get_str(name)?.parse().ok()
    }

    /// `name` parsed as a float.
    pub fn get_f64(&self, name: &str) -> Option<f64> {
        self.get_str(name)?.parse().ok()
    }

    /// Number of properties.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// True when there are none.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Properties in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = &Property> {
        self.0.iter()
    }
}

/// Root `<map>` document as decoded, before any tileset is fetched.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MapDocument {
    /// Format version.
    pub version: String,
    /// Editor version.
    pub tiled_version: String,
    /// Map orientation.
    pub orientation: String,
    /// Tile render order.
    pub render_order: String,
    /// Width in tiles.
    pub width: u32,
    /// Height in tiles.
    pub height: u32,
    /// Tile width in pixels.
    pub tile_width: u32,
    /// Tile height in pixels.
    pub tile_height: u32,
    /// Infinite map flag.
    pub infinite: bool,
    /// Tileset references in declaration order.
    pub tilesets: Vec<TileSetRef>,
    /// Top-level layers, object groups and group layers in document order.
    pub layers: Vec<LayerNode>,
    /// Map custom properties.
    pub properties: Properties,
}

/// A `<tileset>` element of the map.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TileSetRef {
    /// First global id owned by the tileset.
    pub first_gid: u32,
    /// Where the tileset is declared.
    pub source: TileSetSource,
}

/// Where a referenced tileset lives.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum TileSetSource {
    /// Path of a `.tsx` document, relative to the map document.
    External(String),
    /// Tileset declared inline in the map.
    Embedded(Box<TileSet>),
}

/// A node of the layer tree.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum LayerNode {
    /// Tile layer.
    Tiles(Layer),
    /// Object group.
    Objects(ObjectGroup),
    /// Group layer.
    Group(GroupLayer),
}

impl LayerNode {
    /// Name of the node.
    pub fn name(&self) -> &str {
        match self {
            LayerNode::Tiles(l) => &l.name,
            LayerNode::Objects(g) => &g.name,
            LayerNode::Group(g) => &g.name,
        }
    }

    /// `visible` flag of the node.
    pub fn is_visible(&self) -> bool {
        match self {
            LayerNode::Tiles(l) => l.visible,
            LayerNode::Objects(g) => g.visible,
            LayerNode::Group(g) => g.visible,
        }
    }
}

/// Organisational container; holds no tile data of its own.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GroupLayer {
    /// Layer id.
    pub id: u32,
    /// Layer name.
    pub name: String,
    /// Visibility.
    pub visible: bool,
    /// Custom properties.
    pub properties: Properties,
    /// Children in document order.
    pub children: Vec<LayerNode>,
}

impl GroupLayer {
    /// Direct child tile layers.
    pub fn layers(&self) -> impl Iterator<Item = &Layer> {
        self.children.iter().filter_map(|n| match n {
            LayerNode::Tiles(l) => Some(l),
            _ => None,
        })
    }

    /// Direct child object groups.
    pub fn object_groups(&self) -> impl Iterator<Item = &ObjectGroup> {
        self.children.iter().filter_map(|n| match n {
            LayerNode::Objects(g) => Some(g),
            _ => None,
        })
    }

    /// Direct child group layers.
    pub fn groups(&self) -> impl Iterator<Item = &GroupLayer> {
        self.children.iter().filter_map(|n| match n {
            LayerNode::Group(g) => Some(g),
            _ => None,
        })
    }
}

/// Tile layer. `rows[y][x]` holds the cell gid, `Gid(0)` for an empty cell.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Layer {
    /// Layer id.
    pub id: u32,
    /// Layer name.
    pub name: String,
    /// Declared width in tiles.
    pub width: u32,
    /// Declared height in tiles.
    pub height: u32,
    /// Visibility.
    pub visible: bool,
    /// Custom properties.
    pub properties: Properties,
    /// Cell gids, one row per line.
    pub rows: Vec<Vec<Gid>>,
}

impl Layer {
    /// Gid at column `x`, row `y`.
    #[inline]
    pub fn gid_at(&self, x: usize, y: usize) -> Option<Gid> {
        self.rows.get(y)?.get(x).copied()
    }
}

/// Layer of placed objects.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ObjectGroup {
    /// Layer id.
    pub id: u32,
    /// Layer name.
    pub name: String,
    /// Visibility.
    pub visible: bool,
    /// Custom properties.
    pub properties: Properties,
    /// Objects in document order.
    pub objects: Vec<MapObject>,
}

/// Object placed on the map. A non-empty `gid` makes it a tile object.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MapObject {
    /// Object id.
    pub id: u32,
    /// Tile graphic, `Gid(0)` for a pure shape.
    pub gid: Gid,
    /// Object name.
    pub name: String,
    /// `type` (or `class`) tag.
    pub kind: String,
    /// X position in pixels.
    pub x: f64,
    /// Y position in pixels.
    pub y: f64,
    /// Width in pixels, when given.
    pub width: Option<f64>,
    /// Height in pixels, when given.
    pub height: Option<f64>,
    /// Visibility.
    pub visible: bool,
    /// Shape of the object.
    pub shape: ObjectShape,
    /// Custom properties.
    pub properties: Properties,
}

/// Decoded tileset.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TileSet {
    /// Tileset name.
    pub name: String,
    /// Document the tileset was decoded from; image paths are relative to it.
    pub path: PathBuf,
    /// Tile width in pixels.
    pub tile_width: u32,
    /// Tile height in pixels.
    pub tile_height: u32,
    /// Number of tiles, local ids are `0..tile_count`.
    pub tile_count: u32,
    /// Tiles per image row.
    pub columns: u32,
    /// Pixels between tiles.
    pub spacing: u32,
    /// Pixels around the tile grid.
    pub margin: u32,
    /// Backing image.
    pub image: ImageDefinition,
    /// Custom properties.
    pub properties: Properties,
    /// Only tiles carrying extra data are listed.
    pub tiles: Vec<Tile>,
}

impl TileSet {
    /// Extra data of tile `id`, if any.
    pub fn tile(&self, id: u32) -> Option<&Tile> {
        self.tiles.iter().find(|t| t.id == id)
    }
}

/// Image backing a tileset.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ImageDefinition {
    /// Path relative to the tileset document.
    pub source: String,
    /// Image width in pixels.
    pub width: u32,
    /// Image height in pixels.
    pub height: u32,
}

/// Tile with extra data.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Tile {
    /// Local id.
    pub id: u32,
    /// Custom properties.
    pub properties: Properties,
    /// Empty when the tile is not animated.
    pub animation: Vec<Frame>,
    /// Tile-local collision shapes.
    pub collision: Option<TileObjectGroup>,
}

impl Tile {
    /// True when the tile has frames.
    pub fn is_animated(&self) -> bool {
        !self.animation.is_empty()
    }
}

/// One animation step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Frame {
    /// Local id of the tile to show.
    pub tile_id: u32,
    /// How long to show it.
    pub duration_ms: u32,
}

/// Collision shapes of a tile.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TileObjectGroup {
    /// Group id.
    pub id: u32,
    /// `draworder` attribute.
    pub draw_order: Option<String>,
    /// Custom properties.
    pub properties: Properties,
    /// Shapes in document order.
    pub objects: Vec<TileSetObject>,
}

/// Collision shape declared on a tile, positioned relative to the tile's top-left
/// corner (or in world space once flattened).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TileSetObject {
    /// Object id.
    pub id: u32,
    /// Object name.
    pub name: String,
    /// `type` (or `class`) tag.
    pub kind: String,
    /// X offset in pixels.
    pub x: f64,
    /// Y offset in pixels.
    pub y: f64,
    /// Width in pixels, when given.
    pub width: Option<f64>,
    /// Height in pixels, when given.
    pub height: Option<f64>,
    /// Visibility.
    pub visible: bool,
    /// Shape.
    pub shape: ObjectShape,
    /// Custom properties.
    pub properties: Properties,
}

/// Object shape; a missing marker means rectangle.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum ObjectShape {
    /// Single point at the object position.
    Point,
    /// Ellipse inscribed in the object bounds.
    Ellipse,
    /// Polygon with relative vertices.
    Polygon(Polygon),
    /// Axis-aligned rectangle.
    Rectangle,
}

/// Vertices relative to the owning object's position, winding preserved.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Polygon {
    /// Vertices in declaration order.
    pub points: Vec<Point>,
}

/// A vertex.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct Point {
    /// X in pixels.
    pub x: f64,
    /// Y in pixels.
    pub y: f64,
}
