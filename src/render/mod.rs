//! Texture loading seam and drawing backends.

use std::path::Path;

use log::debug;

use crate::error::MapError;
use crate::map::TileMap;
use crate::source::{join_relative, ByteSource};

#[cfg(feature = "macroquad")]
pub mod draw;

/// Turns fetched image bytes into a backend texture.
pub trait TextureLoader {
    /// Backend texture handle.
    type Texture;

    /// Build a texture from the image bytes fetched for `path`.
    fn load_texture(&mut self, path: &Path, bytes: &[u8]) -> Result<Self::Texture, MapError>;
}

impl TileMap {
    /// Load one texture per tileset, indexed by [`TileSetId`](crate::gid::TileSetId).
    ///
    /// Image paths resolve relative to the tileset document that names them.
    pub fn load_textures<L: TextureLoader>(
        &self,
        source: &dyn ByteSource,
        loader: &mut L,
    ) -> Result<Vec<L::Texture>, MapError> {
        let tilesets = self.tilesets().tilesets();
        let mut textures = Vec::with_capacity(tilesets.len());
        for tileset in tilesets {
            let path = join_relative(&tileset.path, &tileset.image.source);
            let bytes = source.fetch(&path).map_err(|e| MapError::Texture {
                path: path.clone(),
                reason: e.to_string(),
            })?;
            debug!("loading texture {} ({} bytes)", path.display(), bytes.len());
            textures.push(loader.load_texture(&path, &bytes)?);
        }
        Ok(textures)
    }
}
