use super::{Clock, Scene};
use crate::assets::Assets;
use crate::render::Canvas;
use crate::render::canvas::pack;
use rand::RngExt;
use rand::rngs::ThreadRng;

const NUM_STARS: usize = 200;
const STAR_SPEED: f64 = 100.0;
/// Depth at which a star respawns far away.
const FAR_Z: f64 = 100.0;
/// Closer than this, stars render as a plus shape.
const NEAR_Z: f64 = 20.0;

struct Star {
    x: f64,
    y: f64,
    z: f64,
}

/// 3D starfield flying toward the camera
pub struct Starfield {
    stars: Vec<Star>,
    rng: ThreadRng,
}

impl Starfield {
    pub fn new() -> Self {
        let mut rng = rand::rng();
        let stars = (0..NUM_STARS)
            .map(|_| Star {
                x: rng.random_range(-100.0..100.0),
                y: rng.random_range(-100.0..100.0),
                z: rng.random_range(0.01..FAR_Z),
            })
            .collect();
        Starfield {
            stars,
            rng: rand::rng(),
        }
    }
}

impl Default for Starfield {
    fn default() -> Self {
        Self::new()
    }
}

impl Scene for Starfield {
    fn name(&self) -> &str {
        "starfield"
    }

    fn update(&mut self, canvas: &mut Canvas, clock: &Clock, _assets: &Assets) {
        canvas.clear();
        let cx = canvas.width as f64 / 2.0;
        let cy = canvas.height as f64 / 2.0;
        // Focal length scaled so the field fills the canvas like it would a
        // full-size framebuffer.
        let focal = canvas.width as f64 * 0.16;

        for star in &mut self.stars {
            star.z -= STAR_SPEED * clock.dt;

            if star.z <= 0.0 {
                star.x = self.rng.random_range(-100.0..100.0);
                star.y = self.rng.random_range(-100.0..100.0);
                star.z = FAR_Z;
            }

            // Perspective projection
            let k = focal / star.z;
            let sx = cx + star.x * k;
            let sy = cy + star.y * k;
            if sx < 0.0 || sy < 0.0 || sx >= canvas.width as f64 || sy >= canvas.height as f64 {
                continue;
            }
            let ix = sx as usize;
            let iy = sy as usize;

            let brightness = (255.0 * (1.0 - star.z / FAR_Z)).clamp(0.0, 255.0) as u8;
            let color = pack(brightness, brightness, brightness);

            canvas.set(ix, iy, color);
            if star.z < NEAR_Z {
                // Close stars get a 5-pixel plus shape
                if ix > 0 {
                    canvas.set(ix - 1, iy, color);
                }
                canvas.set(ix + 1, iy, color);
                if iy > 0 {
                    canvas.set(ix, iy - 1, color);
                }
                canvas.set(ix, iy + 1, color);
            }
        }
    }
}
