use super::{Clock, Scene};
use crate::assets::Assets;
use crate::render::Canvas;
use crate::render::canvas::pack;
use rand::RngExt;

/// World-unit size of one checker tile.
const TILE: f64 = 16.0;
/// Forward scroll speed over the floor, world units per second.
const SCROLL_SPEED: f64 = 30.0;
/// Bounce energy retained per floor impact.
const DAMPING: f64 = 0.85;

/// Checkered floor casting with a perpetually bouncing sphere.
///
/// The ball physics state persists for the process lifetime; re-entering
/// the scene picks up where the ball left off.
pub struct Floor {
    ball_x: f64,
    ball_y: f64,
    ball_vx: f64,
    ball_vy: f64,
}

impl Floor {
    pub fn new(width: usize, height: usize) -> Self {
        let mut rng = rand::rng();
        Floor {
            ball_x: width as f64 * rng.random_range(0.3..0.7),
            ball_y: height as f64 * 0.3,
            ball_vx: width as f64 * 0.1,
            ball_vy: 0.0,
        }
    }

    fn draw_floor(&self, canvas: &mut Canvas, t: f64) {
        let w = canvas.width as f64;
        let h = canvas.height as f64;
        let horizon = (h * 0.45) as usize;
        let focal = w * 0.5;
        let cam_height = 12.0;
        let forward = t * SCROLL_SPEED;

        // Sky above (and including) the horizon row: a plain dark band.
        for y in 0..(horizon + 1).min(canvas.height) {
            let fade = 1.0 - y as f64 / horizon.max(1) as f64;
            let color = pack((10.0 + 30.0 * fade) as u8, 0, (30.0 + 50.0 * fade) as u8);
            let row = y * canvas.width;
            canvas.argb[row..row + canvas.width].fill(color);
        }

        // One ray pair per row below the horizon, stepped across columns.
        for y in horizon + 1..canvas.height {
            let dist = cam_height * (h * 0.5) / (y - horizon) as f64;
            let fog = (1.0 - dist / (cam_height * h * 0.12)).clamp(0.0, 1.0);
            let wz = dist + forward;
            let row_z = (wz / TILE).floor() as i64;

            let wx_step = dist / focal;
            let mut wx = -(w / 2.0) * wx_step;
            let row = y * canvas.width;
            for x in 0..canvas.width {
                let checker = ((wx / TILE).floor() as i64 + row_z) & 1;
                let (r, g, b) = if checker == 0 {
                    (225.0, 215.0, 235.0)
                } else {
                    (70.0, 35.0, 110.0)
                };
                canvas.argb[row + x] = pack(
                    (r * fog) as u8,
                    (g * fog) as u8,
                    (b * fog) as u8,
                );
                wx += wx_step;
            }
        }
    }

    fn update_ball(&mut self, canvas: &Canvas, dt: f64) {
        let w = canvas.width as f64;
        let h = canvas.height as f64;
        let radius = h * 0.08;
        let floor_line = h * 0.82;
        let gravity = h * 1.4;
        // Any bounce decaying below this speed gets its energy topped back
        // up, so the ball never comes to rest.
        let min_bounce = h * 0.85;

        self.ball_vy += gravity * dt;
        self.ball_x += self.ball_vx * dt;
        self.ball_y += self.ball_vy * dt;

        if self.ball_y + radius > floor_line {
            self.ball_y = floor_line - radius;
            let mut rebound = self.ball_vy.abs() * DAMPING;
            if rebound < min_bounce {
                rebound = min_bounce;
            }
            self.ball_vy = -rebound;
        }
        if self.ball_x - radius < 0.0 {
            self.ball_x = radius;
            self.ball_vx = self.ball_vx.abs();
        } else if self.ball_x + radius > w {
            self.ball_x = w - radius;
            self.ball_vx = -self.ball_vx.abs();
        }
        // A resize can leave the ball above a lower ceiling; pull it back.
        if self.ball_y - radius < 0.0 {
            self.ball_y = radius;
            self.ball_vy = self.ball_vy.abs();
        }
    }

    fn draw_ball(&self, canvas: &mut Canvas) {
        let radius = canvas.height as f64 * 0.08;
        let r_sq = radius * radius;
        let y0 = (self.ball_y - radius).max(0.0) as usize;
        let y1 = ((self.ball_y + radius) as usize).min(canvas.height.saturating_sub(1));
        for y in y0..=y1 {
            for x in ((self.ball_x - radius).max(0.0) as usize)
                ..=(((self.ball_x + radius) as usize).min(canvas.width.saturating_sub(1)))
            {
                let dx = x as f64 - self.ball_x;
                let dy = y as f64 - self.ball_y;
                let d_sq = dx * dx + dy * dy;
                if d_sq > r_sq {
                    continue;
                }
                // Shaded toward the upper-left light, composited additively.
                let shade = (1.0 - d_sq / r_sq).sqrt();
                let light = (1.0 - (dx + dy) / (2.0 * radius)).clamp(0.4, 1.4) * shade;
                canvas.add(
                    x,
                    y,
                    (190.0 * light) as u8,
                    (120.0 * light) as u8,
                    (40.0 * light) as u8,
                );
            }
        }
    }
}

impl Scene for Floor {
    fn name(&self) -> &str {
        "floor"
    }

    fn update(&mut self, canvas: &mut Canvas, clock: &Clock, _assets: &Assets) {
        self.draw_floor(canvas, clock.global_time);
        self.update_ball(canvas, clock.dt);
        self.draw_ball(canvas);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::{ColorMode, RenderMode};
    use crate::scenes::Clock;

    #[test]
    fn test_ball_never_settles() {
        let mut canvas = Canvas::new(80, 40, RenderMode::HalfBlock, ColorMode::TrueColor);
        let mut floor = Floor::new(canvas.width, canvas.height);
        let mut max_speed_late = 0.0f64;
        for frame in 0..2000 {
            let clock = Clock {
                dt: 1.0 / 30.0,
                scene_time: frame as f64 / 30.0,
                global_time: frame as f64 / 30.0,
            };
            floor.update(&mut canvas, &clock, &Assets::empty());
            if frame > 1500 {
                max_speed_late = max_speed_late.max(floor.ball_vy.abs());
            }
        }
        // The energy floor keeps the bounce alive well past damping decay.
        assert!(max_speed_late > canvas.height as f64 * 0.5);
    }
}
