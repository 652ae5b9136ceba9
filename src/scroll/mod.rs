//! Scrolling text with an inline control-code mini-language and four
//! render styles.

pub mod font;
pub mod parse;

use serde::Deserialize;
use std::f64::consts::PI;

use crate::render::Canvas;
use font::{Font, Glyph};
use parse::{CodeKind, ResolvedScroll};

/// How a scroller lays its glyphs out on screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ScrollStyle {
    /// Sinusoidal per-glyph y offset across the middle of the screen
    Wave,
    /// Rigid single line near the bottom, no per-glyph effects
    Classic,
    /// Per-glyph scale oscillation with outline/shadow/glow presets
    Roller,
    /// Per-glyph |sin| bounce with bottom squash
    Bounce,
}

/// Pixels past a code's resolved position before it fires. Keeps a code
/// from triggering the instant its glyph touches the right edge.
pub const TRIGGER_LEAD: f64 = 16.0;

/// Margin beyond the screen edges within which glyphs are still drawn.
const DRAW_MARGIN: f64 = 100.0;

/// Scroll state: offset, speed, pause deadline, tint override, style and
/// the glyph cache, all owned here.
pub struct ScrollController {
    resolved: ResolvedScroll,
    font: Font,
    offset: f64,
    speed: f64,
    default_speed: f64,
    pause_until: Option<f64>,
    color_override: Option<(u8, u8, u8)>,
    style: ScrollStyle,
    preset: u8,
    fired: Vec<bool>,
    cycle: u64,
}

impl ScrollController {
    pub fn new(
        text: &str,
        viewport_width: usize,
        viewport_height: usize,
        style: ScrollStyle,
        speed: f64,
        preset: u8,
    ) -> Self {
        let mut font = Font::new(glyph_scale(viewport_height));
        let parsed = parse::parse(text, viewport_width);
        let resolved = parse::resolve(&parsed, &mut font);
        let fired = vec![false; resolved.codes.len()];
        ScrollController {
            resolved,
            font,
            offset: 0.0,
            speed: speed.max(0.0),
            default_speed: speed.max(0.0),
            pause_until: None,
            color_override: None,
            style,
            preset: preset.min(3),
            fired,
            cycle: 0,
        }
    }

    /// Swap in new source text (or a new viewport width, which changes
    /// SKIP expansion). Restarts the scroll cycle.
    pub fn set_text(&mut self, text: &str, viewport_width: usize, viewport_height: usize) {
        self.font.set_scale(glyph_scale(viewport_height));
        let parsed = parse::parse(text, viewport_width);
        self.resolved = parse::resolve(&parsed, &mut self.font);
        self.fired = vec![false; self.resolved.codes.len()];
        self.offset = 0.0;
        self.cycle = 0;
        self.pause_until = None;
        self.speed = self.default_speed;
        self.color_override = None;
    }

    pub fn style(&self) -> ScrollStyle {
        self.style
    }

    pub fn speed(&self) -> f64 {
        self.speed
    }

    pub fn offset(&self) -> f64 {
        self.offset
    }

    pub fn is_paused(&self, global_time: f64) -> bool {
        self.pause_until.is_some_and(|until| global_time < until)
    }

    /// Advance the scroll and fire any control codes whose trigger point
    /// the offset has passed this cycle.
    pub fn update(&mut self, dt: f64, global_time: f64) {
        if let Some(until) = self.pause_until {
            if global_time < until {
                return;
            }
            self.pause_until = None;
        }
        self.offset += self.speed * dt;

        let total = self.resolved.total_width;
        if total <= 0.0 {
            return;
        }

        // Crossing into a new cycle rearms every code. A step that jumps
        // the boundary may have skipped trigger points at the tail of the
        // text; those still fire exactly once, in source order.
        let cycle = (self.offset / total) as u64;
        if cycle != self.cycle {
            for i in 0..self.resolved.codes.len() {
                if !self.fired[i] {
                    let kind = self.resolved.codes[i].kind;
                    self.apply(kind, global_time);
                }
            }
            self.cycle = cycle;
            self.fired.fill(false);
        }

        let pos = self.offset % total;
        for i in 0..self.resolved.codes.len() {
            if self.fired[i] {
                continue;
            }
            let trigger_at = (self.resolved.codes[i].pixel_pos + TRIGGER_LEAD).min(total - 1.0);
            if pos >= trigger_at {
                self.fired[i] = true;
                let kind = self.resolved.codes[i].kind;
                self.apply(kind, global_time);
            }
        }
    }

    fn apply(&mut self, kind: CodeKind, global_time: f64) {
        match kind {
            CodeKind::Pause(secs) => self.pause_until = Some(global_time + secs),
            CodeKind::Speed(speed) => self.speed = speed.max(0.0),
            CodeKind::Style(style) => self.style = style,
            CodeKind::Color(0, 0, 0) => self.color_override = None,
            CodeKind::Color(r, g, b) => self.color_override = Some((r, g, b)),
        }
    }

    /// Per-glyph tint: the override if set, otherwise the animated rainbow.
    fn glyph_color(&self, index: usize, global_time: f64) -> (u8, u8, u8) {
        if let Some(color) = self.color_override {
            return color;
        }
        let shift = (global_time * 100.0 + index as f64 * 10.0) % 360.0;
        let rad = shift * PI / 180.0;
        (
            (128.0 + 127.0 * rad.sin()) as u8,
            (128.0 + 127.0 * (rad + 2.0 * PI / 3.0).sin()) as u8,
            (128.0 + 127.0 * (rad + 4.0 * PI / 3.0).sin()) as u8,
        )
    }

    pub fn draw(&mut self, canvas: &mut Canvas, global_time: f64) {
        if self.resolved.display.is_empty() || self.resolved.total_width <= 0.0 {
            return;
        }
        match self.style {
            ScrollStyle::Wave => self.draw_wave(canvas, global_time),
            ScrollStyle::Classic => self.draw_classic(canvas),
            ScrollStyle::Roller => self.draw_roller(canvas, global_time),
            ScrollStyle::Bounce => self.draw_bounce(canvas, global_time),
        }
    }

    /// Screen x of the glyph whose resolved pen position is `pen`, with
    /// wrap-around so the text loops seamlessly.
    fn wrapped_x(&self, pen: f64, canvas_width: f64) -> f64 {
        let total = self.resolved.total_width;
        let mut x = canvas_width + pen - self.offset % total;
        while x < -DRAW_MARGIN {
            x += total;
        }
        x
    }

    fn draw_wave(&mut self, canvas: &mut Canvas, global_time: f64) {
        let w = canvas.width as f64;
        let mid = canvas.height as f64 / 2.0;
        let amp = canvas.height as f64 * 0.13;
        let chars: Vec<char> = self.resolved.display.chars().collect();

        let mut pen = 0.0;
        for (i, &ch) in chars.iter().enumerate() {
            let x = self.wrapped_x(pen, w);
            pen += self.font.advance(ch);
            if x >= w + DRAW_MARGIN {
                continue;
            }
            let wave = (global_time * 2.0 + i as f64 * 0.3).sin() * amp;
            let color = self.glyph_color(i, global_time);
            let glyph = self.font.glyph(ch);
            let y = mid + wave - glyph.height as f64 / 2.0;
            draw_glyph(canvas, glyph, x, y, 1.0, 1.0, color, Blend::Over);
        }
    }

    fn draw_classic(&mut self, canvas: &mut Canvas) {
        let w = canvas.width as f64;
        let y = canvas.height as f64 - self.font.line_height() as f64 * 1.5;
        let chars: Vec<char> = self.resolved.display.chars().collect();
        // One rigid line: constant baseline, constant tint.
        let color = self.color_override.unwrap_or((255, 255, 100));

        let mut pen = 0.0;
        for &ch in &chars {
            let x = self.wrapped_x(pen, w);
            pen += self.font.advance(ch);
            if x >= w + DRAW_MARGIN {
                continue;
            }
            let glyph = self.font.glyph(ch);
            draw_glyph(canvas, glyph, x, y, 1.0, 1.0, color, Blend::Over);
        }
    }

    fn draw_roller(&mut self, canvas: &mut Canvas, global_time: f64) {
        let w = canvas.width as f64;
        let mid = canvas.height as f64 * 0.5;
        let chars: Vec<char> = self.resolved.display.chars().collect();
        let preset = self.preset;

        let mut pen = 0.0;
        for (i, &ch) in chars.iter().enumerate() {
            let x = self.wrapped_x(pen, w);
            pen += self.font.advance(ch);
            if x >= w + DRAW_MARGIN {
                continue;
            }
            let scale = 1.0 + 0.35 * (global_time * 3.0 + i as f64 * 0.4).sin();
            let color = self.glyph_color(i, global_time);
            let gh = self.font.glyph(ch).height as f64;
            let y = mid - gh * scale / 2.0;

            if preset >= 2 {
                // Drop shadow under everything else
                let glyph = self.font.glyph(ch);
                draw_glyph(
                    canvas,
                    glyph,
                    x + 2.0,
                    y + 2.0,
                    scale,
                    scale,
                    (15, 15, 25),
                    Blend::Over,
                );
            }
            if preset >= 1 {
                let pad = self.font.scale() as f64;
                let outline = self.font.outline(ch);
                draw_glyph(
                    canvas,
                    outline,
                    x - pad,
                    y - pad,
                    scale,
                    scale,
                    (10, 10, 10),
                    Blend::Over,
                );
            }
            let glyph = self.font.glyph(ch);
            draw_glyph(canvas, glyph, x, y, scale, scale, color, Blend::Over);
            if preset >= 3 {
                // Additive glow pass, slightly enlarged and dim
                let glyph = self.font.glyph(ch);
                let dim = (color.0 / 4, color.1 / 4, color.2 / 4);
                draw_glyph(
                    canvas,
                    glyph,
                    x - 1.0,
                    y - 1.0,
                    scale * 1.1,
                    scale * 1.1,
                    dim,
                    Blend::Add,
                );
            }
        }
    }

    fn draw_bounce(&mut self, canvas: &mut Canvas, global_time: f64) {
        let w = canvas.width as f64;
        let base = canvas.height as f64 * 0.78;
        let amp = canvas.height as f64 * 0.4;
        let chars: Vec<char> = self.resolved.display.chars().collect();

        let mut pen = 0.0;
        for (i, &ch) in chars.iter().enumerate() {
            let x = self.wrapped_x(pen, w);
            pen += self.font.advance(ch);
            if x >= w + DRAW_MARGIN {
                continue;
            }
            let phase = (global_time * 2.5 + i as f64 * 0.35).sin();
            let hop = phase.abs();
            // Squash against the baseline at the bottom of each hop.
            let squash = (hop / 0.25).clamp(0.0, 1.0);
            let scale_y = 0.65 + 0.35 * squash;
            let scale_x = 1.0 + 0.3 * (1.0 - squash);

            let color = self.glyph_color(i, global_time);
            let glyph = self.font.glyph(ch);
            let gh = glyph.height as f64;
            let y = base - hop * amp - gh * scale_y;
            draw_glyph(canvas, glyph, x, y, scale_x, scale_y, color, Blend::Over);
        }
    }
}

/// Derive the glyph pixel scale from the canvas height.
fn glyph_scale(viewport_height: usize) -> usize {
    (viewport_height / 56).max(1)
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Blend {
    Over,
    Add,
}

/// Destination-sampled scaled glyph draw: every destination pixel maps
/// back into the mask, so downscaling never drops coverage unevenly.
fn draw_glyph(
    canvas: &mut Canvas,
    glyph: &Glyph,
    x: f64,
    y: f64,
    scale_x: f64,
    scale_y: f64,
    color: (u8, u8, u8),
    blend: Blend,
) {
    if glyph.width == 0 {
        return;
    }
    let dst_w = (glyph.width as f64 * scale_x).max(1.0) as usize;
    let dst_h = (glyph.height as f64 * scale_y).max(1.0) as usize;
    for dy in 0..dst_h {
        let sy = dy * glyph.height / dst_h;
        let py = y + dy as f64;
        if py < 0.0 {
            continue;
        }
        for dx in 0..dst_w {
            let sx = dx * glyph.width / dst_w;
            if !glyph.mask[sy * glyph.width + sx] {
                continue;
            }
            let px = x + dx as f64;
            if px < 0.0 {
                continue;
            }
            match blend {
                Blend::Over => canvas.blend(px as usize, py as usize, color.0, color.1, color.2, 1.0),
                Blend::Add => canvas.add(px as usize, py as usize, color.0, color.1, color.2),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::{ColorMode, RenderMode};

    fn controller(text: &str) -> ScrollController {
        ScrollController::new(text, 800, 100, ScrollStyle::Wave, 100.0, 0)
    }

    #[test]
    fn test_speed_code_changes_speed() {
        let mut ctl = controller("AB{SPEED:250}CDEFGH");
        let mut t = 0.0;
        for _ in 0..200 {
            ctl.update(0.05, t);
            t += 0.05;
        }
        assert_eq!(ctl.speed(), 250.0);
    }

    #[test]
    fn test_pause_halts_offset() {
        let mut ctl = controller("{PAUSE:5}ABCDEFGH");
        let mut t = 0.0;
        // Scroll until the pause fires.
        for _ in 0..40 {
            ctl.update(0.05, t);
            t += 0.05;
        }
        assert!(ctl.is_paused(t));
        let frozen = ctl.offset();
        for _ in 0..10 {
            ctl.update(0.05, t);
            t += 0.05;
        }
        assert_eq!(ctl.offset(), frozen);
        // After the pause deadline the scroll resumes.
        t += 5.0;
        ctl.update(0.05, t);
        assert!(ctl.offset() > frozen);
    }

    #[test]
    fn test_codes_fire_once_per_cycle() {
        let mut ctl = controller("AB{PAUSE:0.3}CD");
        let total = ctl.resolved.total_width;
        let mut t = 0.0;
        let mut pause_edges = 0;
        let mut was_paused = false;
        // Two full cycles; every cycle must pause exactly once.
        while ctl.offset() < total * 2.0 && t < 30.0 {
            ctl.update(0.02, t);
            t += 0.02;
            let now_paused = ctl.is_paused(t);
            if now_paused && !was_paused {
                pause_edges += 1;
            }
            was_paused = now_paused;
        }
        assert_eq!(pause_edges, 2);
    }

    #[test]
    fn test_color_sentinel_restores_gradient() {
        let mut ctl = controller("{COLOR:200,10,10}ABC");
        let mut t = 0.0;
        for _ in 0..20 {
            ctl.update(0.05, t);
            t += 0.05;
        }
        assert_eq!(ctl.color_override, Some((200, 10, 10)));
        ctl.apply(CodeKind::Color(0, 0, 0), t);
        assert_eq!(ctl.color_override, None);
    }

    #[test]
    fn test_style_code_switches_style() {
        let mut ctl = controller("{STYLE:bounce}ABCDEF");
        let mut t = 0.0;
        for _ in 0..30 {
            ctl.update(0.05, t);
            t += 0.05;
        }
        assert_eq!(ctl.style(), ScrollStyle::Bounce);
    }

    #[test]
    fn test_draw_all_styles_paint_pixels() {
        let mut canvas = Canvas::new(60, 24, RenderMode::HalfBlock, ColorMode::TrueColor);
        for style in [
            ScrollStyle::Wave,
            ScrollStyle::Classic,
            ScrollStyle::Roller,
            ScrollStyle::Bounce,
        ] {
            let mut ctl = ScrollController::new(
                "HELLO WORLD",
                canvas.width,
                canvas.height,
                style,
                40.0,
                3,
            );
            canvas.clear();
            ctl.update(0.1, 0.1);
            ctl.draw(&mut canvas, 0.1);
            let lit = canvas
                .argb
                .iter()
                .filter(|&&p| p != crate::render::canvas::BLACK)
                .count();
            assert!(lit > 0, "style {:?} drew nothing", style);
        }
    }
}
