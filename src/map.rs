use std::path::{Path, PathBuf};

use log::debug;

use crate::animation::{AnimationClock, AnimationRegistry, AnimationState};
use crate::collision;
use crate::command::{self, DrawCommand, DrawPass, TileDisplay};
use crate::config::LoaderConfig;
use crate::error::MapError;
use crate::gid::{Gid, ResolvedGid, TileSetId, TileSetRegistry};
use crate::loader::decode_map;
use crate::model::*;
use crate::resolver::{node_at, resolve_tilesets, LayerIndex};
use crate::source::{join_relative, ByteSource};

/// A loaded map with every tileset bound.
///
/// Read-only queries take `&self`. Animation state advances through `&mut self`
/// ([`TileMap::tile_display`], [`TileMap::draw_commands`]), so a single simulation
/// thread is expected to drive ticks and draws.
#[derive(Debug, Clone)]
pub struct TileMap {
    path: PathBuf,
    /// Format version.
    pub version: String,
    /// Editor version that wrote the map.
    pub tiled_version: String,
    /// `orthogonal`, `isometric`, ...
    pub orientation: String,
    /// Tile render order, `right-down` by default.
    pub render_order: String,
    /// Width in tiles.
    pub width: u32,
    /// Height in tiles.
    pub height: u32,
    /// Tile width in pixels.
    pub tile_width: u32,
    /// Tile height in pixels.
    pub tile_height: u32,
    /// Infinite (chunked) map flag.
    pub infinite: bool,
    /// Map custom properties.
    pub properties: Properties,
    tilesets: TileSetRegistry,
    layers: Vec<LayerNode>,
    index: LayerIndex,
    collisions: Vec<TileSetObject>,
    clock: AnimationClock,
    animations: AnimationRegistry,
    zoom: f32,
}

impl TileMap {
    /// Fetch the map at `path` through `source`, then resolve its tilesets.
    pub fn load(
        path: impl AsRef<Path>,
        source: &dyn ByteSource,
        config: &LoaderConfig,
    ) -> Result<Self, MapError> {
        config.validate()?;
        let path = path.as_ref();
        let bytes = source.fetch(path).map_err(|source| MapError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_bytes(path, &bytes, source, config)
    }

    /// Build a map from already fetched bytes. `path` anchors relative tileset sources.
    pub fn from_bytes(
        path: impl AsRef<Path>,
        bytes: &[u8],
        source: &dyn ByteSource,
        config: &LoaderConfig,
    ) -> Result<Self, MapError> {
        config.validate()?;
        let path = path.as_ref();
        let doc = decode_map(bytes).map_err(|source| MapError::MalformedDocument {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_document(doc, path, source, config)
    }

    /// Finish loading an already decoded document.
    pub fn from_document(
        doc: MapDocument,
        path: impl AsRef<Path>,
        source: &dyn ByteSource,
        config: &LoaderConfig,
    ) -> Result<Self, MapError> {
        config.validate()?;
        let path = path.as_ref();
        check_layer_sizes(&doc.layers)?;

        let tilesets = resolve_tilesets(doc.tilesets, path, source, config.missing_tilesets)?;
        let index = LayerIndex::build(&doc.layers);
        // every tileset is bound (or given up on) before flattening
        let collisions = collision::flatten(&doc.layers, &tilesets, doc.tile_width, doc.tile_height);

        debug!(
            "loaded map {} ({}x{} tiles, {} tilesets, {} layers, {} collision shapes)",
            path.display(),
            doc.width,
            doc.height,
            tilesets.bindings().len(),
            index.layers.len(),
            collisions.len()
        );

        Ok(Self {
            path: path.to_path_buf(),
            version: doc.version,
            tiled_version: doc.tiled_version,
            orientation: doc.orientation,
            render_order: doc.render_order,
            width: doc.width,
            height: doc.height,
            tile_width: doc.tile_width,
            tile_height: doc.tile_height,
            infinite: doc.infinite,
            properties: doc.properties,
            tilesets,
            layers: doc.layers,
            index,
            collisions,
            clock: AnimationClock::new(config.ticks_per_second, config.wrap_seconds),
            animations: AnimationRegistry::new(),
            zoom: config.zoom,
        })
    }

    /// Path the map was loaded from.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Tileset references and decoded tilesets.
    pub fn tilesets(&self) -> &TileSetRegistry {
        &self.tilesets
    }

    /// Decoded tileset by id.
    pub fn tileset(&self, id: TileSetId) -> Option<&TileSet> {
        self.tilesets.get(id)
    }

    /// Owning tileset and local id of `gid`.
    #[inline]
    pub fn resolve_gid(&self, gid: Gid) -> Option<ResolvedGid> {
        self.tilesets.resolve(gid)
    }

    /// Top-level layer nodes in document order.
    pub fn layer_nodes(&self) -> &[LayerNode] {
        &self.layers
    }

    /// Every tile layer, group descendants included, in pre-order.
    pub fn layers(&self) -> impl Iterator<Item = &Layer> + '_ {
        self.index.layers.iter().filter_map(|p| match node_at(&self.layers, p) {
            Some(LayerNode::Tiles(layer)) => Some(layer),
            _ => None,
        })
    }

    /// Every object group, group descendants included, in pre-order.
    pub fn object_groups(&self) -> impl Iterator<Item = &ObjectGroup> + '_ {
        self.index.object_groups.iter().filter_map(|p| match node_at(&self.layers, p) {
            Some(LayerNode::Objects(group)) => Some(group),
            _ => None,
        })
    }

    /// Every group layer in pre-order.
    pub fn groups(&self) -> impl Iterator<Item = &GroupLayer> + '_ {
        self.index.groups.iter().filter_map(|p| match node_at(&self.layers, p) {
            Some(LayerNode::Group(group)) => Some(group),
            _ => None,
        })
    }

    /// First tile layer named `name` in pre-order. Duplicate names are legal.
    pub fn layer_by_name(&self, name: &str) -> Option<&Layer> {
        self.layers().find(|l| l.name == name)
    }

    /// First object group named `name` in pre-order.
    pub fn object_group_by_name(&self, name: &str) -> Option<&ObjectGroup> {
        self.object_groups().find(|g| g.name == name)
    }

    /// First group layer named `name` in pre-order.
    pub fn group_by_name(&self, name: &str) -> Option<&GroupLayer> {
        self.groups().find(|g| g.name == name)
    }

    /// World-space collision shapes of all placed tiles, computed at load.
    pub fn collisions(&self) -> &[TileSetObject] {
        &self.collisions
    }

    /// Current zoom factor.
    pub fn zoom(&self) -> f32 {
        self.zoom
    }

    /// Change the zoom used by [`TileMap::pixel_size`] and draw commands.
    pub fn set_zoom(&mut self, zoom: f32) {
        self.zoom = zoom;
    }

    /// Map size in pixels, zoom applied.
    pub fn pixel_size(&self) -> (u32, u32) {
        let zoom = self.zoom as f64;
        (
            (self.width as f64 * self.tile_width as f64 * zoom) as u32,
            (self.height as f64 * self.tile_height as f64 * zoom) as u32,
        )
    }

    /// One simulation step for tile animations.
    pub fn advance_tick(&mut self) {
        self.clock.advance();
    }

    /// Current animation tick.
    pub fn current_tick(&self) -> u32 {
        self.clock.tick()
    }

    /// The animation clock.
    pub fn clock(&self) -> &AnimationClock {
        &self.clock
    }

    /// Animation state of one tile definition.
    pub fn animation_state(&self, tileset: TileSetId, tile_id: u32) -> AnimationState {
        self.animations.state(tileset, tile_id)
    }

    /// Restart every animation from its first frame.
    pub fn reset_animations(&mut self) {
        self.animations.reset();
    }

    /// What `gid` shows right now. Advances the tile's animation.
    pub fn tile_display(&mut self, gid: Gid) -> Option<TileDisplay> {
        command::display(&self.tilesets, &mut self.animations, &self.clock, gid)
    }

    /// Quads for every visible tile cell and tile object, in draw order.
    pub fn draw_commands(&mut self) -> Vec<DrawCommand> {
        let mut pass = DrawPass {
            tilesets: &self.tilesets,
            animations: &mut self.animations,
            clock: &self.clock,
            tile_width: self.tile_width as f32,
            tile_height: self.tile_height as f32,
            zoom: self.zoom,
            layer_index: 0,
            out: Vec::new(),
        };
        pass.visit(&self.layers);
        pass.out
    }

    /// Image path of a tileset, resolved relative to the tileset document.
    pub fn image_path(&self, id: TileSetId) -> Option<PathBuf> {
        let tileset = self.tilesets.get(id)?;
        Some(join_relative(&tileset.path, &tileset.image.source))
    }
}

fn check_layer_sizes(nodes: &[LayerNode]) -> Result<(), MapError> {
    for node in nodes {
        match node {
            LayerNode::Tiles(layer) => check_layer_size(layer)?,
            LayerNode::Group(group) => check_layer_sizes(&group.children)?,
            LayerNode::Objects(_) => {}
        }
    }
    Ok(())
}

fn check_layer_size(layer: &Layer) -> Result<(), MapError> {
    let expected = (layer.width as usize, layer.height as usize);
    let bad_row = layer.rows.iter().find(|r| r.len() != expected.0);
    if layer.rows.len() != expected.1 || bad_row.is_some() {
        return Err(MapError::InvalidLayerSize {
            layer: layer.name.clone(),
            expected,
            found: (bad_row.map_or(expected.0, Vec::len), layer.rows.len()),
        });
    }
    Ok(())
}
