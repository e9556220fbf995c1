use std::collections::HashMap;
use std::path::{Path, PathBuf};

use log::{debug, warn};

use crate::config::MissingTileSets;
use crate::error::MapError;
use crate::gid::{TileSetBinding, TileSetId, TileSetRegistry};
use crate::loader::decode_tileset;
use crate::model::{LayerNode, TileSet, TileSetRef, TileSetSource};
use crate::source::{join_relative, ByteSource};

/// Fetch, decode and bind every tileset referenced by the map at `map_path`.
///
/// External sources are resolved relative to the map's directory; a path referenced
/// twice is loaded once. Fetch failures follow `policy`; decode failures are fatal.
pub(crate) fn resolve_tilesets(
    refs: Vec<TileSetRef>,
    map_path: &Path,
    source: &dyn ByteSource,
    policy: MissingTileSets,
) -> Result<TileSetRegistry, MapError> {
    let mut registry = TileSetRegistry::default();
    let mut loaded: HashMap<PathBuf, TileSetId> = HashMap::new();
    let mut previous_gid = None;

    for reference in refs {
        if previous_gid.is_some_and(|prev| reference.first_gid <= prev) {
            warn!(
                "{}: tileset firstgid {} does not increase; gid lookups may pick the wrong tileset",
                map_path.display(),
                reference.first_gid
            );
        }
        previous_gid = Some(reference.first_gid);

        let binding = match reference.source {
            TileSetSource::Embedded(mut tileset) => {
                tileset.path = map_path.to_path_buf();
                TileSetBinding {
                    first_gid: reference.first_gid,
                    source: None,
                    tileset: Some(push(&mut registry, *tileset)),
                }
            }
            TileSetSource::External(relative) => {
                let path = join_relative(map_path, &relative);
                let tileset = match loaded.get(&path) {
                    Some(&id) => Some(id),
                    None => match load_tileset(&path, source) {
                        Ok(tileset) => {
                            let id = push(&mut registry, tileset);
                            loaded.insert(path, id);
                            Some(id)
                        }
                        Err(err @ MapError::TileSetUnavailable { .. })
                            if policy == MissingTileSets::Skip =>
                        {
                            warn!("{err}; its tiles will be skipped");
                            None
                        }
                        Err(err) => return Err(err),
                    },
                };
                TileSetBinding {
                    first_gid: reference.first_gid,
                    source: Some(relative),
                    tileset,
                }
            }
        };
        registry.bindings.push(binding);
    }
    Ok(registry)
}

fn push(registry: &mut TileSetRegistry, tileset: TileSet) -> TileSetId {
    registry.tilesets.push(tileset);
    TileSetId(registry.tilesets.len() - 1)
}

fn load_tileset(path: &Path, source: &dyn ByteSource) -> Result<TileSet, MapError> {
    let bytes = source
        .fetch(path)
        .map_err(|source| MapError::TileSetUnavailable {
            path: path.to_path_buf(),
            source,
        })?;
    let mut tileset = decode_tileset(&bytes).map_err(|source| MapError::MalformedDocument {
        path: path.to_path_buf(),
        source,
    })?;
    tileset.path = path.to_path_buf();
    debug!(
        "loaded tileset '{}' from {} ({} tiles, {} with extra data)",
        tileset.name,
        path.display(),
        tileset.tile_count,
        tileset.tiles.len()
    );
    Ok(tileset)
}

/// Child-index path from the top-level layer list down to one node.
type NodePath = Vec<usize>;

/// Pre-order indexes over the layer tree, used for flat iteration and name lookup.
#[derive(Debug, Clone, Default)]
pub(crate) struct LayerIndex {
    pub layers: Vec<NodePath>,
    pub object_groups: Vec<NodePath>,
    pub groups: Vec<NodePath>,
}

impl LayerIndex {
    pub fn build(nodes: &[LayerNode]) -> Self {
        let mut index = Self::default();
        index.visit(nodes, &mut Vec::new());
        index
    }

    fn visit(&mut self, nodes: &[LayerNode], path: &mut NodePath) {
        for (i, node) in nodes.iter().enumerate() {
            path.push(i);
            match node {
                LayerNode::Tiles(_) => self.layers.push(path.clone()),
                LayerNode::Objects(_) => self.object_groups.push(path.clone()),
                LayerNode::Group(group) => {
                    self.groups.push(path.clone());
                    self.visit(&group.children, path);
                }
            }
            path.pop();
        }
    }
}

pub(crate) fn node_at<'a>(nodes: &'a [LayerNode], path: &[usize]) -> Option<&'a LayerNode> {
    let (&first, rest) = path.split_first()?;
    let node = nodes.get(first)?;
    match (rest.is_empty(), node) {
        (true, _) => Some(node),
        (false, LayerNode::Group(group)) => node_at(&group.children, rest),
        (false, _) => None,
    }
}
