use macroquad::prelude::*;
use macroquad_tmx::render::draw::{draw_map, MacroquadTextures};
use macroquad_tmx::{FsSource, LoaderConfig, TileMap};

fn window_conf() -> Conf {
    Conf {
        window_title: "Basic Map".into(),
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

    loop {
        clear_background(BLACK);

        map.advance_tick();
        draw_map(&mut map, &textures, vec2(40.0, 40.0));

        draw_text(
            &format!("FPS: {}  tick: {}", get_fps(), map.current_tick()),
            screen_width() - 300.0,
            55.0,
            30.0,
            RED,
        );

        next_frame().await;
    }
}
