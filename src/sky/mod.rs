//! Weather-driven sky animation: clouds, precipitation, wind streaks and
//! the sun, layered onto the pixel canvas each frame.
//!
//! All populations live in fixed-capacity pools with a live count. Growing
//! or shrinking a population is a count update plus in-place respawns —
//! nothing is allocated or freed after construction.

use rand::rngs::StdRng;
use rand::{RngExt, SeedableRng};

use crate::gfx::{ColorGradient, ColorStop, lerp};
use crate::render::Canvas;
use crate::weather::{WeatherKind, WeatherSnapshot};

pub const MAX_CLOUDS: usize = 20;
pub const MAX_PARTICLES: usize = 300;
pub const MAX_STREAKS: usize = 12;

/// Minimum active particles while any precipitation is falling.
const MIN_PARTICLES: usize = 5;

#[derive(Debug, Clone, Copy, Default, PartialEq)]
struct Cloud {
    x: f64,
    y: f64,
    speed: f64,
    size: f64,
    opacity: f64,
}

/// Shared by precipitation particles and wind streaks; streaks reuse
/// `size` as their length and ignore the wobble phase.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
struct Particle {
    x: f64,
    y: f64,
    speed: f64,
    wobble_phase: f64,
    size: f64,
}

pub struct SkyAnimation {
    width: f64,
    height: f64,

    clouds: [Cloud; MAX_CLOUDS],
    cloud_count: usize,
    particles: [Particle; MAX_PARTICLES],
    particle_count: usize,
    streaks: [Particle; MAX_STREAKS],
    streak_count: usize,

    weather: WeatherSnapshot,
    time: f64,
    sun_ray_angle: f64,
    rng: StdRng,
}

impl SkyAnimation {
    /// Build the engine for a viewport. The random sequence is seeded with
    /// a fixed value so a fresh engine always lays out the same sky.
    pub fn new(width: usize, height: usize) -> Self {
        let mut sky = SkyAnimation {
            width: width as f64,
            height: height as f64,
            clouds: [Cloud::default(); MAX_CLOUDS],
            cloud_count: 0,
            particles: [Particle::default(); MAX_PARTICLES],
            particle_count: 0,
            streaks: [Particle::default(); MAX_STREAKS],
            streak_count: 0,
            weather: WeatherSnapshot::default(),
            time: 0.0,
            sun_ray_angle: 0.0,
            rng: StdRng::seed_from_u64(42),
        };

        // Pre-place every cloud slot in the upper band of the sky; the live
        // count decides how many actually show.
        for i in 0..MAX_CLOUDS {
            let x = sky.rng.random_range(0.0..sky.width.max(1.0));
            let y = sky.rng.random_range(0.0..sky.height.max(1.0) * 0.35);
            sky.clouds[i] = Cloud {
                x,
                y,
                speed: sky.rng.random_range(8.0..28.0),
                size: sky.width * sky.rng.random_range(0.05..0.125),
                opacity: sky.rng.random_range(0.25..0.60),
            };
        }
        sky
    }

    /// Viewport change between ticks. Pool contents are untouched; clouds
    /// now beyond the new right edge recycle on the next update.
    pub fn resize(&mut self, width: usize, height: usize) {
        self.width = width as f64;
        self.height = height as f64;
    }

    pub fn cloud_count(&self) -> usize {
        self.cloud_count
    }

    pub fn particle_count(&self) -> usize {
        self.particle_count
    }

    pub fn streak_count(&self) -> usize {
        self.streak_count
    }

    /// Advance the simulation by `dt` seconds under the given weather.
    /// The snapshot is assumed valid; the provider never hands errors in.
    pub fn update(&mut self, dt: f64, weather: &WeatherSnapshot) {
        self.weather = *weather;
        self.time += dt;
        self.sun_ray_angle += dt * 0.5;

        self.update_clouds(dt);
        self.update_particles(dt);
        self.update_streaks(dt);
    }

    fn update_clouds(&mut self, dt: f64) {
        let target =
            (((self.weather.cloudcover / 100.0) * MAX_CLOUDS as f64).round() as usize).max(2);
        self.cloud_count = target.min(MAX_CLOUDS);

        for i in 0..self.cloud_count {
            let c = &mut self.clouds[i];
            c.x += c.speed * dt;
            if c.x - c.size > self.width {
                // Recycle in place: fresh entry left of the screen.
                c.x = -c.size * 2.0;
                c.y = self.rng.random_range(0.0..self.height.max(1.0) * 0.35);
                c.speed = self.rng.random_range(8.0..28.0);
            }
        }
    }

    fn update_particles(&mut self, dt: f64) {
        let rain = self.weather.kind.is_rainy();
        let snow = self.weather.kind.is_snowy();

        if !rain && !snow {
            self.particle_count = 0;
            return;
        }

        let target = ((self.weather.intensity * MAX_PARTICLES as f64).round() as usize)
            .clamp(MIN_PARTICLES, MAX_PARTICLES);

        while self.particle_count < target {
            let x = self.rng.random_range(0.0..self.width.max(1.0));
            let y = -self.rng.random_range(0.0..self.height.max(1.0) * 0.3);
            self.particles[self.particle_count] = Particle {
                x,
                y,
                speed: if snow {
                    self.rng.random_range(30.0..70.0)
                } else {
                    self.rng.random_range(200.0..500.0)
                },
                wobble_phase: self.rng.random_range(0.0..std::f64::consts::TAU),
                size: if snow {
                    self.rng.random_range(2.0..5.0)
                } else {
                    self.rng.random_range(1.0..2.5)
                },
            };
            self.particle_count += 1;
        }
        // Shrinking is just a count decrement; slots past the count are inactive.
        if self.particle_count > target {
            self.particle_count = target;
        }

        for i in 0..self.particle_count {
            let p = &mut self.particles[i];
            p.y += p.speed * dt;
            if snow {
                p.wobble_phase += dt * 2.0;
                p.x += p.wobble_phase.sin() * 20.0 * dt;
            }
            if p.y > self.height {
                p.y = -10.0;
                p.x = self.rng.random_range(0.0..self.width.max(1.0));
            }
        }
    }

    fn update_streaks(&mut self, dt: f64) {
        let wind_ms = self.weather.windspeed / 3.6;
        let target = if wind_ms >= 5.0 {
            let frac = ((wind_ms - 5.0) / 10.0).min(1.0);
            ((frac * MAX_STREAKS as f64) as usize).max(1)
        } else {
            0
        };

        while self.streak_count < target {
            let x = -self.rng.random_range(0.0..self.width.max(1.0) * 0.3);
            let y = self.rng.random_range(0.0..self.height.max(1.0));
            self.streaks[self.streak_count] = Particle {
                x,
                y,
                speed: 150.0 + wind_ms * 20.0 + self.rng.random_range(0.0..100.0),
                wobble_phase: 0.0,
                size: self.rng.random_range(30.0..80.0),
            };
            self.streak_count += 1;
        }
        if self.streak_count > target {
            self.streak_count = target;
        }

        for i in 0..self.streak_count {
            let s = &mut self.streaks[i];
            s.x += s.speed * dt;
            if s.x > self.width + s.size {
                s.x = -s.size - self.rng.random_range(0.0..self.width.max(1.0) * 0.2);
                s.y = self.rng.random_range(0.0..self.height.max(1.0));
                s.speed = 150.0 + wind_ms * 20.0 + self.rng.random_range(0.0..100.0);
            }
        }
    }

    /// Paint the full sky, back to front.
    pub fn draw(&self, canvas: &mut Canvas) {
        self.draw_sky(canvas);
        self.draw_sun(canvas);
        self.draw_clouds(canvas);
        self.draw_streaks(canvas);

        if self.weather.kind.is_rainy() {
            self.draw_rain(canvas);
        } else if self.weather.kind.is_snowy() {
            self.draw_snow(canvas);
        }
    }

    fn draw_sky(&self, canvas: &mut Canvas) {
        let cg = (self.weather.cloudcover / 100.0).clamp(0.0, 1.0);
        let to8 = |v: f64| -> u8 { (v * 255.0).clamp(0.0, 255.0) as u8 };

        let (top, bottom) = if self.weather.is_day {
            // Daytime: blue fading toward gray as cover climbs
            (
                (
                    to8(lerp(0.15, 0.45, cg)),
                    to8(lerp(0.35, 0.45, cg)),
                    to8(lerp(0.75, 0.55, cg)),
                ),
                (
                    to8(lerp(0.55, 0.65, cg)),
                    to8(lerp(0.75, 0.70, cg)),
                    to8(lerp(0.95, 0.75, cg)),
                ),
            )
        } else {
            // Night: near-black blues
            (
                (
                    to8(lerp(0.02, 0.10, cg)),
                    to8(lerp(0.02, 0.08, cg)),
                    to8(lerp(0.10, 0.12, cg)),
                ),
                (
                    to8(lerp(0.05, 0.12, cg)),
                    to8(lerp(0.08, 0.10, cg)),
                    to8(lerp(0.18, 0.15, cg)),
                ),
            )
        };
        canvas.fill_vgradient(top, bottom);
    }

    fn draw_sun(&self, canvas: &mut Canvas) {
        if !self.weather.is_day {
            return;
        }
        if !matches!(
            self.weather.kind,
            WeatherKind::Clear | WeatherKind::PartlyCloudy
        ) {
            return;
        }

        let cx = self.width * 0.8;
        let cy = self.height * 0.15;
        let radius = self.height * 0.067;

        let num_rays = 12;
        for i in 0..num_rays {
            let angle =
                self.sun_ray_angle + i as f64 * (std::f64::consts::TAU / num_rays as f64);
            let inner = radius * 1.12;
            let outer = radius * 1.6 + (self.time * 2.0 + i as f64).sin() * radius * 0.2;
            canvas.line(
                cx + angle.cos() * inner,
                cy + angle.sin() * inner,
                cx + angle.cos() * outer,
                cy + angle.sin() * outer,
                255,
                230,
                77,
                0.6,
            );
        }

        // Radial disc: white-hot core cooling toward the rim.
        let disc = ColorGradient::new(vec![
            ColorStop { t: 0.0, r: 255, g: 255, b: 153 },
            ColorStop { t: 0.7, r: 255, g: 217, b: 51 },
            ColorStop { t: 1.0, r: 255, g: 179, b: 26 },
        ]);
        let y0 = (cy - radius).max(0.0) as usize;
        let y1 = ((cy + radius) as usize).min(canvas.height.saturating_sub(1));
        let x0 = (cx - radius).max(0.0) as usize;
        let x1 = ((cx + radius) as usize).min(canvas.width.saturating_sub(1));
        for y in y0..=y1 {
            for x in x0..=x1 {
                let dx = x as f64 - cx;
                let dy = y as f64 - cy;
                let d = (dx * dx + dy * dy).sqrt() / radius;
                if d > 1.0 {
                    continue;
                }
                let (r, g, b) = disc.sample(d);
                canvas.blend(x, y, r, g, b, (1.3 - d * 0.9).clamp(0.0, 1.0));
            }
        }
    }

    fn draw_clouds(&self, canvas: &mut Canvas) {
        let darkness = (self.weather.cloudcover / 100.0).clamp(0.0, 1.0);
        let gray = (lerp(0.95, 0.55, darkness) * 255.0) as u8;

        for c in &self.clouds[..self.cloud_count] {
            let alpha = c.opacity * (0.3 + darkness * 0.5);
            // A cloud is four overlapping puffs.
            canvas.fill_circle(c.x, c.y, c.size * 0.6, gray, gray, gray, alpha);
            canvas.fill_circle(
                c.x + c.size * 0.4,
                c.y - c.size * 0.15,
                c.size * 0.5,
                gray,
                gray,
                gray,
                alpha,
            );
            canvas.fill_circle(
                c.x - c.size * 0.35,
                c.y + c.size * 0.1,
                c.size * 0.45,
                gray,
                gray,
                gray,
                alpha,
            );
            canvas.fill_circle(
                c.x + c.size * 0.2,
                c.y + c.size * 0.2,
                c.size * 0.5,
                gray,
                gray,
                gray,
                alpha,
            );
        }
    }

    fn draw_streaks(&self, canvas: &mut Canvas) {
        for (i, s) in self.streaks[..self.streak_count].iter().enumerate() {
            let alpha = 0.12 + 0.06 * (self.time * 1.5 + i as f64).sin();
            let len = s.size.max(1.0);
            let steps = len as usize;
            // Gradient stroke: transparent tail, peak at 30%, fading to the tip.
            for step in 0..=steps {
                let t = step as f64 / steps.max(1) as f64;
                let ramp = if t < 0.3 { t / 0.3 } else { 1.0 - (t - 0.3) / 0.7 };
                let x = s.x - len + len * t;
                if x >= 0.0 && s.y >= 0.0 {
                    canvas.blend(x as usize, s.y as usize, 255, 255, 255, alpha * ramp);
                }
            }
        }
    }

    fn draw_rain(&self, canvas: &mut Canvas) {
        for p in &self.particles[..self.particle_count] {
            let len = p.size * 8.0;
            canvas.line(p.x, p.y, p.x - 1.0, p.y + len, 153, 178, 230, 0.5);
        }
    }

    fn draw_snow(&self, canvas: &mut Canvas) {
        for p in &self.particles[..self.particle_count] {
            canvas.fill_circle(p.x, p.y, p.size, 255, 255, 255, 0.8);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::{ColorMode, RenderMode};

    fn snapshot(kind: WeatherKind, intensity: f64) -> WeatherSnapshot {
        WeatherSnapshot {
            kind,
            intensity,
            ..WeatherSnapshot::default()
        }
    }

    #[test]
    fn test_cloud_count_tracks_cover() {
        let mut sky = SkyAnimation::new(800, 600);
        for cover in (0..=100).step_by(5) {
            let snap = WeatherSnapshot {
                cloudcover: cover as f64,
                ..WeatherSnapshot::default()
            };
            sky.update(0.016, &snap);
            let expected = ((cover as f64 / 100.0 * MAX_CLOUDS as f64).round() as usize).max(2);
            assert_eq!(sky.cloud_count(), expected, "cover {}", cover);
            assert!(sky.cloud_count() <= MAX_CLOUDS);
        }
    }

    #[test]
    fn test_particle_count_clamped_for_rain() {
        let mut sky = SkyAnimation::new(800, 600);
        for &(intensity, expected) in &[
            (0.0, 5usize),
            (0.001, 5),
            (0.3, 90),
            (0.5, 150),
            (1.0, 300),
        ] {
            sky.update(0.016, &snapshot(WeatherKind::Rain, intensity));
            assert_eq!(sky.particle_count(), expected, "intensity {}", intensity);
        }
    }

    #[test]
    fn test_particles_stop_within_one_tick_of_kind_change() {
        let mut sky = SkyAnimation::new(800, 600);
        sky.update(0.016, &snapshot(WeatherKind::Thunderstorm, 1.0));
        assert_eq!(sky.particle_count(), 300);
        sky.update(0.016, &snapshot(WeatherKind::Fog, 1.0));
        assert_eq!(sky.particle_count(), 0);
        sky.update(0.016, &snapshot(WeatherKind::Overcast, 0.8));
        assert_eq!(sky.particle_count(), 0);
    }

    #[test]
    fn test_snow_and_drizzle_both_precipitate() {
        let mut sky = SkyAnimation::new(800, 600);
        sky.update(0.016, &snapshot(WeatherKind::Snow, 0.5));
        assert_eq!(sky.particle_count(), 150);
        sky.update(0.016, &snapshot(WeatherKind::Drizzle, 0.5));
        assert_eq!(sky.particle_count(), 150);
    }

    #[test]
    fn test_zero_dt_does_not_move_anything() {
        let mut sky = SkyAnimation::new(800, 600);
        let snap = WeatherSnapshot {
            kind: WeatherKind::Snow,
            intensity: 0.7,
            windspeed: 40.0,
            cloudcover: 80.0,
            ..WeatherSnapshot::default()
        };
        // Settle the populations, then tick twice with dt = 0.
        sky.update(0.033, &snap);
        sky.update(0.0, &snap);
        let clouds = sky.clouds;
        let particles = sky.particles;
        let streaks = sky.streaks;
        sky.update(0.0, &snap);
        assert_eq!(sky.clouds, clouds);
        assert_eq!(sky.particles, particles);
        assert_eq!(sky.streaks, streaks);
    }

    #[test]
    fn test_offscreen_cloud_recycles_same_tick() {
        let mut sky = SkyAnimation::new(800, 600);
        let snap = WeatherSnapshot {
            cloudcover: 100.0,
            ..WeatherSnapshot::default()
        };
        sky.update(0.016, &snap);
        sky.clouds[0].x = sky.width + sky.clouds[0].size + 50.0;
        sky.update(0.0, &snap);
        assert!(sky.clouds[0].x <= 0.0);
        for c in &sky.clouds[..sky.cloud_count] {
            assert!(c.x - c.size <= sky.width);
        }
    }

    #[test]
    fn test_streaks_keyed_to_wind() {
        let mut sky = SkyAnimation::new(800, 600);
        let calm = WeatherSnapshot {
            windspeed: 10.0, // km/h, well under 5 m/s
            ..WeatherSnapshot::default()
        };
        sky.update(0.016, &calm);
        assert_eq!(sky.streak_count(), 0);

        let breezy = WeatherSnapshot {
            windspeed: 19.0, // ~5.3 m/s, just over the streak threshold
            ..WeatherSnapshot::default()
        };
        sky.update(0.016, &breezy);
        assert_eq!(sky.streak_count(), 1);

        let gale = WeatherSnapshot {
            windspeed: 20.0 * 3.6,
            ..WeatherSnapshot::default()
        };
        sky.update(0.016, &gale);
        assert_eq!(sky.streak_count(), MAX_STREAKS);
    }

    #[test]
    fn test_fresh_engines_are_identical() {
        let a = SkyAnimation::new(640, 480);
        let b = SkyAnimation::new(640, 480);
        assert_eq!(a.clouds, b.clouds);
    }

    #[test]
    fn test_draw_paints_the_frame() {
        let mut sky = SkyAnimation::new(100, 60);
        let mut canvas = Canvas::new(100, 30, RenderMode::HalfBlock, ColorMode::TrueColor);
        sky.update(0.033, &snapshot(WeatherKind::Clear, 0.0));
        sky.draw(&mut canvas);
        let painted = canvas
            .argb
            .iter()
            .filter(|&&p| p != crate::render::canvas::BLACK)
            .count();
        assert!(painted > canvas.argb.len() / 2);
    }
}
