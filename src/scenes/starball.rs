use super::{Clock, Scene};
use crate::assets::Assets;
use crate::gfx::{Vec3, fibonacci_sphere_point, rotate_xyz};
use crate::render::Canvas;
use crate::render::canvas::pack;
use rand::RngExt;

const NUM_POINTS: usize = 200;
const NUM_BG_STARS: usize = 40;
/// Parallax background scroll speeds, far to near, in px/s.
const LAYER_SPEEDS: [f64; 3] = [4.0, 10.0, 22.0];

struct BgStar {
    x: f64,
    y: f64,
}

/// A ball of Fibonacci-sphere stars bouncing around the screen.
///
/// Ball position, velocity and squash live here for the lifetime of the
/// process — switching scenes and back does not reset the ball.
pub struct StarBall {
    points: Vec<Vec3>,
    x: f64,
    y: f64,
    vx: f64,
    vy: f64,
    squash_x: f64,
    squash_y: f64,
    layers: [Vec<BgStar>; 3],
}

impl StarBall {
    pub fn new(width: usize, height: usize) -> Self {
        let mut rng = rand::rng();
        let w = width as f64;
        let h = height as f64;
        let layers = std::array::from_fn(|_| {
            (0..NUM_BG_STARS)
                .map(|_| BgStar {
                    x: rng.random_range(0.0..w.max(1.0)),
                    y: rng.random_range(0.0..h.max(1.0)),
                })
                .collect()
        });
        StarBall {
            points: (0..NUM_POINTS)
                .map(|i| fibonacci_sphere_point(i, NUM_POINTS))
                .collect(),
            x: w * 0.4,
            y: h * 0.35,
            vx: w * 0.11,
            vy: h * 0.13,
            squash_x: 1.0,
            squash_y: 1.0,
            layers,
        }
    }
}

impl Scene for StarBall {
    fn name(&self) -> &str {
        "starball"
    }

    fn update(&mut self, canvas: &mut Canvas, clock: &Clock, _assets: &Assets) {
        canvas.clear();
        let w = canvas.width as f64;
        let h = canvas.height as f64;
        let t = clock.global_time;
        let radius = h * 0.22;

        // Parallax star layers, far first.
        for (li, layer) in self.layers.iter().enumerate() {
            let shade = 70 + li as u8 * 55;
            for star in layer {
                let x = (star.x - t * LAYER_SPEEDS[li]).rem_euclid(w.max(1.0));
                canvas.set(x as usize, star.y as usize, pack(shade, shade, shade + 20));
            }
        }

        // Elastic bounce off all four edges, squashing on the impact axis.
        self.x += self.vx * clock.dt;
        self.y += self.vy * clock.dt;
        if self.x - radius < 0.0 {
            self.x = radius;
            self.vx = self.vx.abs();
            self.squash_x = 0.65;
            self.squash_y = 1.25;
        } else if self.x + radius > w {
            self.x = w - radius;
            self.vx = -self.vx.abs();
            self.squash_x = 0.65;
            self.squash_y = 1.25;
        }
        if self.y - radius < 0.0 {
            self.y = radius;
            self.vy = self.vy.abs();
            self.squash_y = 0.65;
            self.squash_x = 1.25;
        } else if self.y + radius > h {
            self.y = h - radius;
            self.vy = -self.vy.abs();
            self.squash_y = 0.65;
            self.squash_x = 1.25;
        }
        // Exponential recovery toward round.
        let recover = (-6.0 * clock.dt).exp();
        self.squash_x = 1.0 + (self.squash_x - 1.0) * recover;
        self.squash_y = 1.0 + (self.squash_y - 1.0) * recover;

        let ax = t * 0.9;
        let ay = t * 0.7;
        let az = t * 0.4;

        for p in &self.points {
            let r = rotate_xyz(*p, ax, ay, az);
            // Perspective with +z toward the viewer: front points spread
            // wider than back points.
            let k = 2.0 / (2.0 - r.z).max(0.5);
            let sx = self.x + r.x * k * radius * self.squash_x;
            let sy = self.y + r.y * k * radius * self.squash_y;
            if sx < 0.0 || sy < 0.0 {
                continue;
            }
            let (ix, iy) = (sx as usize, sy as usize);

            if r.z > 0.0 {
                // Front hemisphere: bright and fat
                let color = pack(255, 240, 170);
                canvas.set(ix, iy, color);
                canvas.set(ix + 1, iy, color);
                canvas.set(ix, iy + 1, color);
                canvas.set(ix + 1, iy + 1, color);
            } else {
                canvas.set(ix, iy, pack(120, 100, 70));
            }
        }
    }
}
