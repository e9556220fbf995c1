use macroquad::prelude::*;
use macroquad_tmx::model::ObjectShape;
use macroquad_tmx::render::draw::{draw_collisions, draw_map, MacroquadTextures};
use macroquad_tmx::{FsSource, LoaderConfig, TileMap};

fn window_conf() -> Conf {
    Conf {
        window_title: "Objects Example".into(),
        window_width: 1280,
        window_height: 720,
        ..Default::default()
    }
}

#[macroquad::main(window_conf)]
async fn main() {
    let source = FsSource::new();
    let config = LoaderConfig {
        zoom: 4.0,
        ..LoaderConfig::default()
    };
    let mut map = TileMap::load("assets/demo.tmx", &source, &config).expect("Failed to load map");
    let textures = map
        .load_textures(&source, &mut MacroquadTextures)
        .expect("Failed to load textures");

    println!("object_groups={}", map.object_groups().count());
    println!("collision_shapes={}", map.collisions().len());

    let origin = vec2(40.0, 40.0);
    loop {
        clear_background(BLACK);

        map.advance_tick();
        draw_map(&mut map, &textures, origin);
        draw_collisions(&map, origin, GREEN);

        let zoom = map.zoom();
        if let Some(spawns) = map.object_group_by_name("spawns") {
            for obj in spawns.objects.iter().filter(|o| o.shape == ObjectShape::Point) {
                let p = origin + vec2(obj.x as f32, obj.y as f32) * zoom;
                draw_circle(p.x, p.y, 6.0, YELLOW);
                draw_text(&obj.name, p.x + 8.0, p.y, 24.0, YELLOW);
            }
        }

        draw_text("objects example", 20.0, 30.0, 32.0, WHITE);
        next_frame().await;
    }
}
