//! Drawing of the arena.
use image::{Rgb, RgbImage};

const BACKGROUND: Rgb<u8> = Rgb([24, 24, 36]);
const GROUND: Rgb<u8> = Rgb([90, 90, 90]);
const PLAYER: Rgb<u8> = Rgb([60, 120, 255]);
const ENEMY: Rgb<u8> = Rgb([230, 60, 50]);
const PLAYER_LIFE: Rgb<u8> = Rgb([80, 220, 80]);
const ENEMY_LIFE: Rgb<u8> = Rgb([240, 170, 40]);

const GROUND_Y: u32 = 80;
const BAR_WIDTH: u32 = 70;

/// State of the arena needed for drawing.
pub(super) struct Scene {
    /// Player position in `[0, 1]`.
    pub player_x: f32,
    /// Enemy position in `[0, 1]`.
    pub enemy_x: f32,
    /// Player life in `[0, 1]`.
    pub player_life: f32,
    /// Enemy life in `[0, 1]`.
    pub enemy_life: f32,
    pub player_in_air: bool,
}

fn fill_rect(img: &mut RgbImage, x: u32, y: u32, w: u32, h: u32, color: Rgb<u8>) {
    let x1 = (x + w).min(img.width());
    let y1 = (y + h).min(img.height());
    for yy in y.min(y1)..y1 {
        for xx in x.min(x1)..x1 {
            img.put_pixel(xx, yy, color);
        }
    }
}

fn to_px(pos: f32, width: u32, sprite: u32) -> u32 {
    (pos.clamp(0.0, 1.0) * (width - sprite) as f32) as u32
}

/// Draws the scene on a `width` x `height` image.
///
/// `height` must be larger than the ground line.
pub(super) fn draw(scene: &Scene, width: u32, height: u32) -> RgbImage {
    let mut img = RgbImage::from_pixel(width, height, BACKGROUND);
    fill_rect(&mut img, 0, GROUND_Y, width, height - GROUND_Y, GROUND);

    let lift = if scene.player_in_air { 10 } else { 0 };
    fill_rect(&mut img, to_px(scene.player_x, width, 6), GROUND_Y - 12 - lift, 6, 12, PLAYER);
    fill_rect(&mut img, to_px(scene.enemy_x, width, 8), GROUND_Y - 14, 8, 14, ENEMY);

    let bar = |life: f32| (life.clamp(0.0, 1.0) * BAR_WIDTH as f32).round() as u32;
    fill_rect(&mut img, 4, 4, bar(scene.player_life), 4, PLAYER_LIFE);
    let enemy_bar = bar(scene.enemy_life);
    fill_rect(&mut img, width - 4 - enemy_bar, 4, enemy_bar, 4, ENEMY_LIFE);
    img
}
