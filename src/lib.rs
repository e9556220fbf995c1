#![warn(missing_docs)]

//! Tiled TMX/TSX loader for Macroquad.
//!
//! [`TileMap::load`] decodes a map document, fetches and binds its tilesets
//! through a [`ByteSource`], indexes layers by name and precomputes the world-space
//! collision shapes of every placed tile. Tile animation is driven by a wrapping
//! tick counter advanced with [`TileMap::advance_tick`].
//!
//! ```no_run
//! use macroquad_tmx::{FsSource, LoaderConfig, TileMap};
//!
//! let map = TileMap::load("assets/demo.tmx", &FsSource::new(), &LoaderConfig::default())?;
//! if let Some(hazards) = map.object_group_by_name("hazards") {
//!     println!("{} hazards", hazards.objects.len());
//! }
//! # Ok::<(), macroquad_tmx::MapError>(())
//! ```

pub mod animation;
pub mod collision;
pub mod command;
pub mod config;
pub mod error;
pub mod gid;
pub mod loader {
    //! Format decoding: XML documents into the plain [`crate::model`].
    mod encoding;
    mod tmx;

    pub use encoding::{decode_grid, decode_points};
    pub use tmx::{decode_map, decode_tileset};
}
mod map;
pub mod model;
pub mod render;
mod resolver;
pub mod source;

pub use animation::{AnimationClock, AnimationState};
pub use command::{DrawCommand, SourceRect, TileDisplay};
pub use config::{LoaderConfig, MissingTileSets};
pub use error::{DecodeError, MapError};
pub use gid::{Gid, ResolvedGid, TileSetId, TileSetRegistry};
pub use map::TileMap;
pub use render::TextureLoader;
pub use source::{ByteSource, FsSource, MemorySource};
