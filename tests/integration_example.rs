// tests/integration_example.rs

use std::path::{Path, PathBuf};

use macroquad_tmx::model::ObjectShape;
use macroquad_tmx::{FsSource, Gid, LoaderConfig, MapError, TextureLoader, TileMap, TileSetId};

fn demo() -> TileMap {
    let mut path = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    path.push("assets");
    path.push("demo.tmx");
    TileMap::load(&path, &FsSource::new(), &LoaderConfig::default())
        .expect("Example assets should load")
}

#[test]
fn example_map_loads_with_its_tileset() {
    let map = demo();
    assert_eq!((map.width, map.height), (6, 4));
    assert_eq!(map.tiled_version, "1.10.2");
    assert_eq!(map.properties.get_str("music"), Some("cave.ogg"));
    assert_eq!(map.properties.get_f64("gravity"), Some(9.8));
    assert_eq!(map.pixel_size(), (96, 64));

    let tileset = map.tileset(TileSetId(0)).expect("terrain");
    assert_eq!(tileset.name, "terrain");
    assert_eq!(tileset.tile(1).and_then(|t| t.properties.get_bool("walkable")), Some(true));
    assert!(map
        .image_path(TileSetId(0))
        .expect("image")
        .ends_with(Path::new("assets/tilesets/terrain.png")));
}

#[test]
fn example_lookups_follow_document_order() {
    let map = demo();
    let names: Vec<&str> = map.object_groups().map(|g| g.name.as_str()).collect();
    assert_eq!(names, ["hazards", "hazards", "spawns"]);

    // the grouped "hazards" comes first in pre-order
    let hazards = map.object_group_by_name("hazards").expect("hazards");
    assert_eq!(hazards.objects[0].name, "spikes");
    assert_eq!(hazards.objects[0].kind, "hazard");
    assert_eq!(map.group_by_name("decor").map(|g| g.children.len()), Some(2));
    assert_eq!(map.layer_by_name("details").and_then(|l| l.gid_at(1, 1)), Some(Gid(6)));
    assert!(map.layer_by_name("missing").is_none());

    let spawns = map.object_group_by_name("spawns").expect("spawns");
    assert_eq!(spawns.objects[0].shape, ObjectShape::Point);
    assert!(matches!(spawns.objects[1].shape, ObjectShape::Polygon(ref p) if p.points.len() == 3));
}

#[test]
fn example_collisions_are_in_world_space() {
    let map = demo();
    let shapes = map.collisions();
    // 10 walls, 6 floor strips, 2 spikes
    assert_eq!(shapes.len(), 18);
    assert_eq!((shapes[1].x, shapes[1].y), (16.0, 0.0));
    assert!(matches!(shapes[10].shape, ObjectShape::Polygon(_)));
    assert_eq!((shapes[10].x, shapes[10].y), (0.0, 56.0));
    assert_eq!((shapes[16].x, shapes[16].y), (18.0, 26.0));
    assert_eq!((shapes[17].x, shapes[17].y), (50.0, 58.0));
}

#[test]
fn example_torch_animates_with_ticks() {
    let mut map = demo();
    assert_eq!(map.tile_display(Gid(3)).map(|d| d.tile_id), Some(2));
    // 150ms at 60 ticks per second is 9 ticks; the frame changes once it is exceeded
    for _ in 0..9 {
        map.advance_tick();
    }
    assert_eq!(map.tile_display(Gid(3)).map(|d| d.tile_id), Some(2));
    map.advance_tick();
    let shown = map.tile_display(Gid(3)).expect("torch");
    assert_eq!((shown.tile_id, shown.src.x, shown.src.y), (3, 48, 0));
}

#[test]
fn example_draw_commands_cover_visible_tiles() {
    let mut map = demo();
    let cmds = map.draw_commands();
    assert_eq!(cmds.len(), 19);
    let spikes = cmds.iter().find(|c| c.layer_index == 2).expect("tile object");
    assert_eq!((spikes.dest_x, spikes.dest_y, spikes.dest_w, spikes.dest_h), (48.0, 32.0, 16.0, 16.0));
}

struct PngHeader;

impl TextureLoader for PngHeader {
    type Texture = bool;

    fn load_texture(&mut self, path: &Path, bytes: &[u8]) -> Result<bool, MapError> {
        if bytes.starts_with(b"\x89PNG") {
            Ok(true)
        } else {
            Err(MapError::Texture {
                path: path.to_path_buf(),
                reason: "not a png".into(),
            })
        }
    }
}

#[test]
fn example_texture_is_fetched_next_to_tileset() -> anyhow::Result<()> {
    let map = demo();
    let textures = map.load_textures(&FsSource::new(), &mut PngHeader)?;
    assert_eq!(textures, [true]);
    Ok(())
}
