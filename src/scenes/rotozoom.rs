use super::{Clock, Scene};
use crate::assets::Assets;
use crate::render::Canvas;
use crate::render::canvas::pack;

/// Rotozoomer: every screen pixel is inverse-mapped through a rotation and
/// breathing zoom into the decorative texture, which wraps infinitely.
pub struct Rotozoom;

impl Rotozoom {
    pub fn new() -> Self {
        Rotozoom
    }
}

impl Default for Rotozoom {
    fn default() -> Self {
        Self::new()
    }
}

impl Scene for Rotozoom {
    fn name(&self) -> &str {
        "rotozoom"
    }

    fn update(&mut self, canvas: &mut Canvas, clock: &Clock, assets: &Assets) {
        let Some(tex) = assets.decor.as_ref() else {
            canvas.clear_to(pack(16, 8, 40));
            return;
        };

        let t = clock.scene_time;
        let w = canvas.width as f64;
        let h = canvas.height as f64;

        let angle = t * 0.5;
        let (sin_a, cos_a) = angle.sin_cos();
        // Zoom breathes between roughly half and double size.
        let zoom = 1.1 + 0.75 * (t * 0.8).sin();
        let inv_zoom = 1.0 / zoom.max(0.2);

        // The rotation center drifts in a slow figure.
        let cx = w / 2.0 + (t * 0.3).sin() * w * 0.2;
        let cy = h / 2.0 + (t * 0.45).cos() * h * 0.15;

        for y in 0..canvas.height {
            let dy = y as f64 - cy;
            for x in 0..canvas.width {
                let dx = x as f64 - cx;
                let u = (dx * cos_a + dy * sin_a) * inv_zoom;
                let v = (-dx * sin_a + dy * cos_a) * inv_zoom;
                canvas.set(x, y, tex.sample_wrapped(u as i64, v as i64));
            }
        }
    }
}
