//! Macroquad backend: textures, tile quads and collision outlines.

use std::path::Path;

use macroquad::prelude::*;

use crate::command::DrawCommand;
use crate::error::MapError;
use crate::map::TileMap;
use crate::model::ObjectShape;

use super::TextureLoader;

/// Decodes images with macroquad and uploads them with nearest filtering.
#[derive(Debug, Default, Clone, Copy)]
pub struct MacroquadTextures;

impl TextureLoader for MacroquadTextures {
    type Texture = Texture2D;

    fn load_texture(&mut self, path: &Path, bytes: &[u8]) -> Result<Texture2D, MapError> {
        let image = Image::from_file_with_format(bytes, None).map_err(|e| MapError::Texture {
            path: path.to_path_buf(),
            reason: format!("{e:?}"),
        })?;
        let tex = Texture2D::from_image(&image);
        tex.set_filter(FilterMode::Nearest);
        Ok(tex)
    }
}

/// Draw every visible tile and tile object, advancing animations.
///
/// `textures` is indexed by tileset id, as returned by [`TileMap::load_textures`].
pub fn draw_map(map: &mut TileMap, textures: &[Texture2D], offset: Vec2) {
    for cmd in map.draw_commands() {
        let Some(tex) = textures.get(cmd.tileset.0) else {
            continue;
        };
        let quad = Quad::from_command(&cmd);
        draw_texture_ex(
            tex,
            offset.x + quad.x,
            offset.y + quad.y,
            WHITE,
            DrawTextureParams {
                source: Some(Rect::new(
                    cmd.src.x as f32,
                    cmd.src.y as f32,
                    cmd.src.w as f32,
                    cmd.src.h as f32,
                )),
                dest_size: Some(vec2(quad.w, quad.h)),
                rotation: quad.rotation,
                flip_x: quad.flip_x,
                flip_y: quad.flip_y,
                ..Default::default()
            },
        );
    }
}

/// Placement handed to `draw_texture_ex`.
#[derive(Debug, Clone, Copy, PartialEq)]
struct Quad {
    x: f32,
    y: f32,
    w: f32,
    h: f32,
    rotation: f32,
    flip_x: bool,
    flip_y: bool,
}

impl Quad {
    // A diagonal flip is a quarter turn followed by a vertical mirror; the later
    // horizontal/vertical mirrors swap roles once the quad is turned. The turned
    // quad keeps the command's footprint, so its size is swapped around the centre.
    fn from_command(cmd: &DrawCommand) -> Self {
        if !cmd.flip_d {
            return Self {
                x: cmd.dest_x,
                y: cmd.dest_y,
                w: cmd.dest_w,
                h: cmd.dest_h,
                rotation: 0.0,
                flip_x: cmd.flip_x,
                flip_y: cmd.flip_y,
            };
        }
        let half = (cmd.dest_w - cmd.dest_h) / 2.0;
        Self {
            x: cmd.dest_x + half,
            y: cmd.dest_y - half,
            w: cmd.dest_h,
            h: cmd.dest_w,
            rotation: std::f32::consts::FRAC_PI_2,
            flip_x: cmd.flip_y,
            flip_y: !cmd.flip_x,
        }
    }
}

/// Debug outlines of the flattened collision shapes.
pub fn draw_collisions(map: &TileMap, offset: Vec2, color: Color) {
    let zoom = map.zoom();
    for obj in map.collisions() {
        let x = offset.x + obj.x as f32 * zoom;
        let y = offset.y + obj.y as f32 * zoom;
        let w = obj.width.unwrap_or(0.0) as f32 * zoom;
        let h = obj.height.unwrap_or(0.0) as f32 * zoom;
        match &obj.shape {
            ObjectShape::Rectangle => draw_rectangle_lines(x, y, w, h, 1.0, color),
            ObjectShape::Ellipse => {
                draw_ellipse_lines(x + w / 2.0, y + h / 2.0, w / 2.0, h / 2.0, 0.0, 1.0, color)
            }
            ObjectShape::Point => draw_circle(x, y, 2.0, color),
            ObjectShape::Polygon(poly) => {
                let pts: Vec<Vec2> = poly
                    .points
                    .iter()
                    .map(|p| vec2(x + p.x as f32 * zoom, y + p.y as f32 * zoom))
                    .collect();
                for (i, a) in pts.iter().enumerate() {
                    let b = pts[(i + 1) % pts.len()];
                    draw_line(a.x, a.y, b.x, b.y, 1.0, color);
                }
            }
        }
    }
}
