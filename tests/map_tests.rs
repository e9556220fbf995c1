// tests/map_tests.rs

use macroquad_tmx::collision;
use macroquad_tmx::model::LayerNode;
use macroquad_tmx::{AnimationState, Gid, LoaderConfig, MapError, MemorySource, TileMap, TileSetId};

const NESTED: &str = r#"<map width="2" height="1" tilewidth="10" tileheight="10">
 <tileset firstgid="1" name="inline" tilewidth="10" tileheight="10" tilecount="4" columns="2">
  <image source="inline.png" width="20" height="20"/>
  <tile id="0">
   <objectgroup><object id="1" x="1" y="1" width="8" height="8"><ellipse/></object></objectgroup>
  </tile>
  <tile id="3">
   <animation><frame tileid="3" duration="50"/><frame tileid="2" duration="50"/></animation>
  </tile>
 </tileset>
 <layer name="bg" width="2" height="1"><data encoding="csv">1,4</data></layer>
 <group name="world">
  <objectgroup name="hazards">
   <object id="1" name="first" gid="1" x="30" y="30"/>
  </objectgroup>
  <group name="world" visible="0">
   <layer name="bg" width="2" height="1"><data encoding="csv">4,1</data></layer>
  </group>
 </group>
 <objectgroup name="hazards">
  <object id="2" name="second" x="0" y="0" width="5" height="5"/>
 </objectgroup>
</map>"#;

fn nested() -> TileMap {
    let src = MemorySource::new().with("levels/nested.tmx", NESTED);
    TileMap::load("levels/nested.tmx", &src, &LoaderConfig::default()).unwrap()
}

#[test]
fn name_lookup_returns_first_in_pre_order() {
    let map = nested();
    assert_eq!(map.object_group_by_name("hazards").unwrap().objects[0].name, "first");
    assert_eq!(map.layer_by_name("bg").unwrap().gid_at(0, 0), Some(Gid(1)));
    assert!(map.group_by_name("world").unwrap().visible);
    assert_eq!(map.groups().count(), 2);
    assert_eq!(map.layers().count(), 2);
    assert!(map.object_group_by_name("nope").is_none());
}

#[test]
fn embedded_tileset_is_bound_to_the_map() {
    let map = nested();
    let bindings = map.tilesets().bindings();
    assert_eq!(bindings.len(), 1);
    assert_eq!(bindings[0].source, None);
    assert_eq!(map.tileset(TileSetId(0)).unwrap().path, map.path());
    assert_eq!(
        map.image_path(TileSetId(0)).unwrap(),
        std::path::Path::new("levels/inline.png")
    );
}

#[test]
fn collisions_match_a_fresh_flatten() {
    let map = nested();
    let fresh = collision::flatten(map.layer_nodes(), map.tilesets(), map.tile_width, map.tile_height);
    assert_eq!(map.collisions(), fresh.as_slice());
    // bg cell (0,0), tile object at (30,30), hidden bg cell (1,0)
    let origins: Vec<(f64, f64)> = map.collisions().iter().map(|o| (o.x, o.y)).collect();
    assert_eq!(origins, [(1.0, 1.0), (31.0, 31.0), (11.0, 1.0)]);
}

#[test]
fn hidden_layers_are_not_drawn() {
    let mut map = nested();
    let cmds = map.draw_commands();
    // bg: two cells, hazards: one tile object; the hidden group is skipped
    assert_eq!(cmds.len(), 3);
    assert_eq!(cmds.iter().map(|c| c.layer_index).max(), Some(1));
    assert!(matches!(map.layer_nodes()[1], LayerNode::Group(_)));
}

#[test]
fn drawing_shares_animation_state_per_tile() {
    let mut map = nested();
    map.draw_commands();
    assert_eq!(
        map.animation_state(TileSetId(0), 3),
        AnimationState::Running { frame: 0, last_tick: 0 }
    );
    for _ in 0..4 {
        map.advance_tick();
    }
    let cmds = map.draw_commands();
    // 4 ticks = 66ms > 50ms: gid 4 now shows local tile 2
    assert_eq!((cmds[1].src.x, cmds[1].src.y), (0, 10));
    assert_eq!(map.current_tick(), 4);

    map.reset_animations();
    assert_eq!(map.animation_state(TileSetId(0), 3), AnimationState::Unstarted);
}

#[test]
fn zoom_scales_draw_commands_and_pixel_size() {
    let mut map = nested();
    map.set_zoom(3.0);
    assert_eq!(map.zoom(), 3.0);
    assert_eq!(map.pixel_size(), (60, 30));
    let cmds = map.draw_commands();
    assert_eq!((cmds[1].dest_x, cmds[1].dest_w), (30.0, 30.0));
}

#[test]
fn model_serializes_to_json() {
    let map = nested();
    let json = serde_json::to_value(map.layer_nodes()).unwrap();
    assert_eq!(json.as_array().map(Vec::len), Some(3));
    let tilesets = serde_json::to_string(map.tilesets()).unwrap();
    assert!(tilesets.contains("\"first_gid\":1"));
}

#[test]
fn layer_size_mismatch_names_the_layer() {
    let bad = NESTED.replace("<data encoding=\"csv\">4,1</data>", "<data encoding=\"csv\">4,1,1</data>");
    let src = MemorySource::new().with("levels/nested.tmx", bad);
    let err = TileMap::load("levels/nested.tmx", &src, &LoaderConfig::default()).unwrap_err();
    assert!(matches!(err, MapError::InvalidLayerSize { layer, found: (3, 1), .. } if layer == "bg"));
}
