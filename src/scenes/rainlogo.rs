use super::{Clock, Scene};
use crate::assets::{Assets, Texture};
use crate::render::Canvas;
use crate::render::canvas::pack;

/// Seconds between successive scanlines starting to fall.
const LINE_DELAY: f64 = 0.08;
/// Gravity for falling scanlines, in logo heights per second squared.
const GRAVITY: f64 = 2.2;
const SETTLE_TIME: f64 = 1.2;
const WOBBLE_TIME: f64 = 2.4;
const PAUSE_TIME: f64 = 1.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    /// Scanlines fall in from above, bottom line first.
    RainIn,
    /// The assembled logo oscillates into place.
    Settle,
    /// Per-scanline horizontal sine wave, decaying away.
    Wobble,
    /// Scanlines fall off the bottom, top line first.
    RainOut,
    Pause,
}

/// Logo that rains in line by line, wobbles, and rains back out.
/// The phase machine persists across scene switches.
pub struct RainingLogo {
    phase: Phase,
    phase_time: f64,
}

impl RainingLogo {
    pub fn new() -> Self {
        RainingLogo {
            phase: Phase::RainIn,
            phase_time: 0.0,
        }
    }

    fn rain_in_duration(rows: usize) -> f64 {
        // Every line has started by (rows-1)*delay; give the slowest line
        // a generous fall window on top.
        (rows.saturating_sub(1)) as f64 * LINE_DELAY + 1.4
    }

    fn advance_phase(&mut self, rows: usize) {
        let duration = match self.phase {
            Phase::RainIn => Self::rain_in_duration(rows),
            Phase::Settle => SETTLE_TIME,
            Phase::Wobble => WOBBLE_TIME,
            Phase::RainOut => Self::rain_in_duration(rows),
            Phase::Pause => PAUSE_TIME,
        };
        if self.phase_time >= duration {
            self.phase = match self.phase {
                Phase::RainIn => Phase::Settle,
                Phase::Settle => Phase::Wobble,
                Phase::Wobble => Phase::RainOut,
                Phase::RainOut => Phase::Pause,
                Phase::Pause => Phase::RainIn,
            };
            self.phase_time = 0.0;
        }
    }

    /// Vertical offset of a scanline from its rest position during the
    /// rain-in fall. `order` 0 falls first.
    fn fall_offset(&self, order: usize, travel: f64) -> f64 {
        let t = (self.phase_time - order as f64 * LINE_DELAY).max(0.0);
        let fallen = 0.5 * GRAVITY * travel * t * t;
        (travel - fallen).max(0.0)
    }

    fn draw_line(
        canvas: &mut Canvas,
        tex: &Texture,
        row: usize,
        x0: f64,
        y: f64,
        px: f64,
    ) {
        if y < 0.0 || y >= canvas.height as f64 {
            return;
        }
        let dst_w = tex.width as f64 * px;
        for dx in 0..dst_w as usize {
            let sx = (dx as f64 / px) as usize;
            let texel = tex.get(sx.min(tex.width - 1), row);
            if texel == 0 {
                continue;
            }
            let x = x0 + dx as f64;
            if x >= 0.0 {
                for sub in 0..px.max(1.0) as usize {
                    canvas.set(x as usize, y as usize + sub, texel);
                }
            }
        }
    }
}

impl Default for RainingLogo {
    fn default() -> Self {
        Self::new()
    }
}

impl Scene for RainingLogo {
    fn name(&self) -> &str {
        "rainlogo"
    }

    fn update(&mut self, canvas: &mut Canvas, clock: &Clock, assets: &Assets) {
        canvas.clear_to(pack(6, 10, 22));

        let Some(tex) = assets.logo.as_ref() else {
            return;
        };
        let rows = tex.height;
        if rows == 0 {
            return;
        }

        self.phase_time += clock.dt;
        self.advance_phase(rows);

        let w = canvas.width as f64;
        let h = canvas.height as f64;
        let px = (h / 60.0).max(1.0).floor();
        let logo_h = rows as f64 * px;
        let rest_y = h * 0.5 - logo_h / 2.0;
        let x0 = w / 2.0 - tex.width as f64 * px / 2.0;

        for row in 0..rows {
            let rest = rest_y + row as f64 * px;
            let y = match self.phase {
                Phase::RainIn => {
                    // Bottom line first: its fall starts at order 0.
                    let order = rows - 1 - row;
                    rest - self.fall_offset(order, rest + logo_h)
                }
                Phase::Settle => {
                    let decay = (-3.0 * self.phase_time).exp();
                    rest + (self.phase_time * 14.0).sin() * h * 0.04 * decay
                }
                Phase::Wobble => rest,
                Phase::RainOut => {
                    // Top line first, accelerating off the bottom edge.
                    let order = row;
                    let t = (self.phase_time - order as f64 * LINE_DELAY).max(0.0);
                    rest + 0.5 * GRAVITY * (h + logo_h) * t * t
                }
                Phase::Pause => {
                    // Everything has left the screen; draw nothing.
                    continue;
                }
            };

            let x = match self.phase {
                Phase::Wobble => {
                    let decay = (-1.4 * self.phase_time).exp();
                    x0 + (row as f64 * 0.55 + self.phase_time * 7.0).sin() * w * 0.06 * decay
                }
                _ => x0,
            };

            Self::draw_line(canvas, tex, row, x, y, px);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_phases_cycle_in_order() {
        let mut logo = RainingLogo::new();
        let rows = 7;
        let mut seen = vec![logo.phase];
        for _ in 0..4000 {
            logo.phase_time += 1.0 / 30.0;
            logo.advance_phase(rows);
            if *seen.last().unwrap() != logo.phase {
                seen.push(logo.phase);
            }
        }
        let expected = [
            Phase::RainIn,
            Phase::Settle,
            Phase::Wobble,
            Phase::RainOut,
            Phase::Pause,
            Phase::RainIn,
        ];
        assert!(seen.len() >= expected.len());
        assert_eq!(&seen[..expected.len()], &expected);
    }

    #[test]
    fn test_fall_offset_reaches_rest() {
        let logo = RainingLogo {
            phase: Phase::RainIn,
            phase_time: 10.0,
        };
        assert_eq!(logo.fall_offset(0, 50.0), 0.0);
    }

    #[test]
    fn test_fall_offset_honors_line_delay() {
        let logo = RainingLogo {
            phase: Phase::RainIn,
            phase_time: 0.0,
        };
        // Before a line's delay elapses it still sits at full offset.
        assert_eq!(logo.fall_offset(5, 80.0), 80.0);
    }
}
