use super::{Clock, Scene};
use crate::assets::{Assets, Texture};
use crate::render::Canvas;
use crate::render::canvas::pack;

/// Draw a texture scaled about its bottom-center anchor, skipping fully
/// transparent texels. Shared by the two logo scenes.
pub(crate) fn blit_logo(
    canvas: &mut Canvas,
    tex: &Texture,
    anchor_x: f64,
    bottom_y: f64,
    scale_x: f64,
    scale_y: f64,
) {
    let px = canvas.height as f64 / 60.0; // base magnification per canvas size
    let dst_w = (tex.width as f64 * scale_x * px).max(1.0);
    let dst_h = (tex.height as f64 * scale_y * px).max(1.0);
    let x0 = anchor_x - dst_w / 2.0;
    let y0 = bottom_y - dst_h;

    for dy in 0..dst_h as usize {
        let sy = (dy as f64 / dst_h * tex.height as f64) as usize;
        let y = y0 + dy as f64;
        if y < 0.0 {
            continue;
        }
        for dx in 0..dst_w as usize {
            let sx = (dx as f64 / dst_w * tex.width as f64) as usize;
            let texel = tex.get(sx.min(tex.width - 1), sy.min(tex.height - 1));
            if texel == 0 {
                continue;
            }
            let x = x0 + dx as f64;
            if x >= 0.0 {
                canvas.set(x as usize, y as usize, texel);
            }
        }
    }
}

/// Logo bouncing on a floor line with squash on impact and stretch at the
/// top of each hop.
pub struct BouncingLogo {
    drift_x: f64,
    drift_v: f64,
}

impl BouncingLogo {
    pub fn new(width: usize, _height: usize) -> Self {
        BouncingLogo {
            drift_x: width as f64 * 0.5,
            drift_v: width as f64 * 0.07,
        }
    }
}

impl Scene for BouncingLogo {
    fn name(&self) -> &str {
        "logo"
    }

    fn update(&mut self, canvas: &mut Canvas, clock: &Clock, assets: &Assets) {
        canvas.clear_to(pack(8, 8, 24));
        let w = canvas.width as f64;
        let h = canvas.height as f64;

        let Some(tex) = assets.logo.as_ref() else {
            return;
        };

        // Slow horizontal drift, reflecting off the side edges.
        self.drift_x += self.drift_v * clock.dt;
        let margin = w * 0.2;
        if self.drift_x < margin {
            self.drift_x = margin;
            self.drift_v = self.drift_v.abs();
        } else if self.drift_x > w - margin {
            self.drift_x = w - margin;
            self.drift_v = -self.drift_v.abs();
        }

        let phase = (clock.global_time * 2.2).sin();
        let hop = phase.abs();
        let floor_line = h * 0.85;
        let hop_height = h * 0.45;

        // Near the floor the logo squashes; near the apex it stretches.
        let impact = (1.0 - hop / 0.22).clamp(0.0, 1.0);
        let stretch = ((hop - 0.85) / 0.15).clamp(0.0, 1.0);
        let scale_y = 1.0 - 0.35 * impact + 0.18 * stretch;
        let scale_x = 1.0 + 0.35 * impact - 0.12 * stretch;

        blit_logo(
            canvas,
            tex,
            self.drift_x,
            floor_line - hop * hop_height,
            scale_x,
            scale_y,
        );

        // Reflection puddle under the bounce point.
        let spread = w * 0.1 * (1.0 + impact);
        canvas.line(
            self.drift_x - spread,
            floor_line + 2.0,
            self.drift_x + spread,
            floor_line + 2.0,
            70,
            80,
            130,
            0.35,
        );
    }
}
