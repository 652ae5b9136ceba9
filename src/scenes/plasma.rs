use super::{Clock, Scene};
use crate::assets::Assets;
use crate::render::Canvas;
use crate::render::canvas::pack;
use std::f64::consts::PI;

/// Classic plasma: four overlapping sine terms per pixel, colored by three
/// phase-shifted sine waves. Synthesized into a half-resolution buffer and
/// scaled up, which keeps the per-frame cost flat.
pub struct Plasma {
    buf_w: usize,
    buf_h: usize,
    buf: Vec<u32>,
    sin_x: Vec<f64>,
    sin_y: Vec<f64>,
}

impl Plasma {
    pub fn new(width: usize, height: usize) -> Self {
        let buf_w = (width / 2).max(2);
        let buf_h = (height / 2).max(2);
        Plasma {
            buf_w,
            buf_h,
            buf: vec![0; buf_w * buf_h],
            sin_x: vec![0.0; buf_w * 2],
            sin_y: vec![0.0; buf_h * 2],
        }
    }

    fn resize(&mut self, width: usize, height: usize) {
        self.buf_w = (width / 2).max(2);
        self.buf_h = (height / 2).max(2);
        self.buf.resize(self.buf_w * self.buf_h, 0);
        self.sin_x.resize(self.buf_w * 2, 0.0);
        self.sin_y.resize(self.buf_h * 2, 0.0);
    }
}

impl Scene for Plasma {
    fn name(&self) -> &str {
        "plasma"
    }

    fn update(&mut self, canvas: &mut Canvas, clock: &Clock, _assets: &Assets) {
        if self.buf_w != (canvas.width / 2).max(2) || self.buf_h != (canvas.height / 2).max(2) {
            self.resize(canvas.width, canvas.height);
        }

        // Keyed to global time so the pattern never resets on scene change.
        let t = clock.global_time * 0.8;

        // Slow drift pushed into the LUT lookups, in buffer pixels.
        let drift_x = (clock.global_time * 0.15).sin() * self.buf_w as f64 * 0.125;
        let drift_y = (clock.global_time * 0.2).cos() * self.buf_h as f64 * 0.133;

        // Per-frame sine LUTs, twice the buffer span so drifted and summed
        // indices stay in range.
        let step_x = 8.0 / self.buf_w as f64;
        let step_y = 6.0 / self.buf_h as f64;
        for (i, v) in self.sin_x.iter_mut().enumerate() {
            *v = (i as f64 * step_x + t).sin();
        }
        for (j, v) in self.sin_y.iter_mut().enumerate() {
            *v = (j as f64 * step_y + t).sin();
        }

        let radial_k = 10.0 / self.buf_w as f64;
        let half_w = self.buf_w as f64 / 2.0;
        let half_h = self.buf_h as f64 / 2.0;

        for y in 0..self.buf_h {
            for x in 0..self.buf_w {
                let fx = ((x as f64 + drift_x) as isize)
                    .clamp(0, self.buf_w as isize * 2 - 1) as usize;
                let fy = ((y as f64 + drift_y) as isize)
                    .clamp(0, self.buf_h as isize * 2 - 1) as usize;

                let dx = x as f64 - half_w;
                let dy = y as f64 - half_h;
                let dist = (dx * dx + dy * dy).sqrt();

                let v = self.sin_x[fx]
                    + self.sin_y[fy]
                    + self.sin_x[(fx + fy) % (self.buf_w * 2)]
                    + (dist * radial_k + t * 1.2).sin();

                let r = (128.0 + 127.0 * (v * PI).sin()) as u8;
                let g = (128.0 + 127.0 * (v * PI + 2.0 * PI / 3.0).sin()) as u8;
                let b = (128.0 + 127.0 * (v * PI + 4.0 * PI / 3.0).sin()) as u8;
                self.buf[y * self.buf_w + x] = pack(r, g, b);
            }
        }

        canvas.blit_scaled(&self.buf, self.buf_w, self.buf_h);
    }
}
