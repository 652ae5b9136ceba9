use crossterm::style::Color;

/// How to render sub-cell pixels to terminal characters
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum RenderMode {
    /// Unicode braille characters (2x4 per cell = highest resolution)
    Braille,
    /// Half-block characters ▀▄█ (1x2 per cell)
    HalfBlock,
    /// Plain ASCII characters with density mapping
    Ascii,
}

/// Color output mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum ColorMode {
    /// No color — monochrome
    Mono,
    /// ANSI 16 colors
    Ansi16,
    /// 256-color palette
    Ansi256,
    /// 24-bit true color (RGB)
    TrueColor,
}

/// A pixel-level canvas that gets rendered to terminal characters.
/// Coordinates are in "sub-cell" pixel space; the backing store is a
/// full-frame ARGB8888 buffer (0xAARRGGBB, alpha currently always 0xFF).
pub struct Canvas {
    /// Width in pixels (sub-cell)
    pub width: usize,
    /// Height in pixels (sub-cell)
    pub height: usize,
    /// Pixel data, row-major ARGB8888
    pub argb: Vec<u32>,
    pub render_mode: RenderMode,
    pub color_mode: ColorMode,
}

pub const BLACK: u32 = 0xFF00_0000;

#[inline]
pub fn pack(r: u8, g: u8, b: u8) -> u32 {
    0xFF00_0000 | ((r as u32) << 16) | ((g as u32) << 8) | b as u32
}

#[inline]
pub fn unpack(argb: u32) -> (u8, u8, u8) {
    (
        ((argb >> 16) & 0xFF) as u8,
        ((argb >> 8) & 0xFF) as u8,
        (argb & 0xFF) as u8,
    )
}

/// Perceived brightness of a pixel, 0.0..=1.0. Used by the cell renderers
/// to decide whether a pixel is background.
#[inline]
pub fn luma(argb: u32) -> f64 {
    let (r, g, b) = unpack(argb);
    (0.299 * r as f64 + 0.587 * g as f64 + 0.114 * b as f64) / 255.0
}

impl Canvas {
    pub fn new(
        term_cols: usize,
        term_rows: usize,
        render_mode: RenderMode,
        color_mode: ColorMode,
    ) -> Self {
        let (px_w, px_h) = match render_mode {
            RenderMode::Braille => (term_cols * 2, term_rows * 4),
            RenderMode::HalfBlock => (term_cols, term_rows * 2),
            RenderMode::Ascii => (term_cols, term_rows),
        };
        Canvas {
            width: px_w,
            height: px_h,
            argb: vec![BLACK; px_w * px_h],
            render_mode,
            color_mode,
        }
    }

    pub fn clear(&mut self) {
        self.argb.fill(BLACK);
    }

    pub fn clear_to(&mut self, color: u32) {
        self.argb.fill(color);
    }

    /// Set a pixel opaquely. Bounds-checked.
    #[inline]
    pub fn set(&mut self, x: usize, y: usize, color: u32) {
        if x < self.width && y < self.height {
            self.argb[y * self.width + x] = color;
        }
    }

    #[inline]
    pub fn get(&self, x: usize, y: usize) -> u32 {
        if x < self.width && y < self.height {
            self.argb[y * self.width + x]
        } else {
            BLACK
        }
    }

    /// Alpha-blend a color over the existing pixel.
    #[inline]
    pub fn blend(&mut self, x: usize, y: usize, r: u8, g: u8, b: u8, alpha: f64) {
        if x >= self.width || y >= self.height {
            return;
        }
        let a = alpha.clamp(0.0, 1.0);
        let idx = y * self.width + x;
        let (dr, dg, db) = unpack(self.argb[idx]);
        let mix = |d: u8, s: u8| -> u8 { (d as f64 * (1.0 - a) + s as f64 * a) as u8 };
        self.argb[idx] = pack(mix(dr, r), mix(dg, g), mix(db, b));
    }

    /// Additively blend (saturating) a color onto the existing pixel.
    #[inline]
    pub fn add(&mut self, x: usize, y: usize, r: u8, g: u8, b: u8) {
        if x >= self.width || y >= self.height {
            return;
        }
        let idx = y * self.width + x;
        let (dr, dg, db) = unpack(self.argb[idx]);
        self.argb[idx] = pack(
            dr.saturating_add(r),
            dg.saturating_add(g),
            db.saturating_add(b),
        );
    }

    /// Fill with a vertical gradient between two colors.
    pub fn fill_vgradient(&mut self, top: (u8, u8, u8), bottom: (u8, u8, u8)) {
        for y in 0..self.height {
            let t = if self.height > 1 {
                y as f64 / (self.height - 1) as f64
            } else {
                0.0
            };
            let lerp8 = |a: u8, b: u8| -> u8 { (a as f64 + (b as f64 - a as f64) * t) as u8 };
            let color = pack(lerp8(top.0, bottom.0), lerp8(top.1, bottom.1), lerp8(top.2, bottom.2));
            let row = y * self.width;
            self.argb[row..row + self.width].fill(color);
        }
    }

    /// Filled circle, alpha-blended.
    pub fn fill_circle(&mut self, cx: f64, cy: f64, radius: f64, r: u8, g: u8, b: u8, alpha: f64) {
        if radius <= 0.0 {
            return;
        }
        let y0 = ((cy - radius).floor().max(0.0)) as usize;
        let y1 = ((cy + radius).ceil().min(self.height as f64 - 1.0)).max(0.0) as usize;
        let r_sq = radius * radius;
        for y in y0..=y1.min(self.height.saturating_sub(1)) {
            let dy = y as f64 - cy;
            let span_sq = r_sq - dy * dy;
            if span_sq < 0.0 {
                continue;
            }
            let span = span_sq.sqrt();
            let x0 = ((cx - span).floor().max(0.0)) as usize;
            let x1 = ((cx + span).ceil().min(self.width as f64 - 1.0)).max(0.0) as usize;
            for x in x0..=x1.min(self.width.saturating_sub(1)) {
                let dx = x as f64 - cx;
                if dx * dx + dy * dy <= r_sq {
                    self.blend(x, y, r, g, b, alpha);
                }
            }
        }
    }

    /// Line stroke between two points, alpha-blended.
    pub fn line(&mut self, x0: f64, y0: f64, x1: f64, y1: f64, r: u8, g: u8, b: u8, alpha: f64) {
        let dx = x1 - x0;
        let dy = y1 - y0;
        let steps = dx.abs().max(dy.abs()).ceil().max(1.0) as usize;
        for i in 0..=steps {
            let t = i as f64 / steps as f64;
            let x = x0 + dx * t;
            let y = y0 + dy * t;
            if x >= 0.0 && y >= 0.0 {
                self.blend(x as usize, y as usize, r, g, b, alpha);
            }
        }
    }

    /// Blit a smaller ARGB buffer scaled up to cover the whole canvas
    /// (nearest neighbor). Used by scenes that synthesize at low resolution.
    pub fn blit_scaled(&mut self, src: &[u32], src_w: usize, src_h: usize) {
        if src_w == 0 || src_h == 0 || src.len() < src_w * src_h {
            return;
        }
        for y in 0..self.height {
            let sy = y * src_h / self.height;
            let src_row = sy * src_w;
            let dst_row = y * self.width;
            for x in 0..self.width {
                let sx = x * src_w / self.width;
                self.argb[dst_row + x] = src[src_row + sx];
            }
        }
    }

    /// Fade the whole frame toward black. `alpha` 1.0 = untouched, 0.0 = black.
    pub fn fade(&mut self, alpha: f64) {
        let a = alpha.clamp(0.0, 1.0);
        if (a - 1.0).abs() < 1e-10 {
            return;
        }
        for px in &mut self.argb {
            let (r, g, b) = unpack(*px);
            *px = pack(
                (r as f64 * a) as u8,
                (g as f64 * a) as u8,
                (b as f64 * a) as u8,
            );
        }
    }

    /// Terminal dimensions needed for this canvas
    pub fn term_size(&self) -> (usize, usize) {
        match self.render_mode {
            RenderMode::Braille => (self.width / 2, self.height / 4),
            RenderMode::HalfBlock => (self.width, self.height / 2),
            RenderMode::Ascii => (self.width, self.height),
        }
    }

    /// Render the canvas to a string buffer for output
    pub fn render(&self) -> String {
        match self.render_mode {
            RenderMode::Braille => super::braille::render(self),
            RenderMode::HalfBlock => super::halfblock::render(self),
            RenderMode::Ascii => self.render_ascii(),
        }
    }

    fn render_ascii(&self) -> String {
        const CHARS: &[u8] = b" .:-=+*#%@";
        let (cols, rows) = self.term_size();
        let mut out = String::with_capacity(cols * rows * 10);
        let use_color = self.color_mode != ColorMode::Mono;
        let mut last_fg = String::new();

        for row in 0..rows {
            for col in 0..cols {
                let px = self.argb[row * self.width + col];
                let v = luma(px);
                let ci = (v * (CHARS.len() - 1) as f64) as usize;
                let ch = CHARS[ci.min(CHARS.len() - 1)] as char;

                if use_color {
                    let (r, g, b) = unpack(px);
                    let fg = color_to_fg(self.map_color(r, g, b));
                    if fg != last_fg {
                        out.push_str("\x1b[");
                        out.push_str(&fg);
                        out.push('m');
                        last_fg = fg;
                    }
                }
                out.push(ch);
            }
            out.push_str("\x1b[0m\x1b[");
            let next_row = row + 2;
            out.push_str(&next_row.to_string());
            out.push_str(";1H");
            last_fg.clear();
        }
        out
    }

    pub fn map_color(&self, r: u8, g: u8, b: u8) -> Color {
        match self.color_mode {
            ColorMode::Mono => Color::White,
            ColorMode::TrueColor => Color::Rgb { r, g, b },
            ColorMode::Ansi256 => {
                // Approximate RGB to 256-color
                let idx = 16 + (36 * (r as u16 / 51)) + (6 * (g as u16 / 51)) + (b as u16 / 51);
                Color::AnsiValue(idx as u8)
            }
            ColorMode::Ansi16 => {
                // Simple mapping to basic colors
                let brightness = (r as u16 + g as u16 + b as u16) / 3;
                if brightness < 64 {
                    Color::Black
                } else if r > g && r > b {
                    if brightness > 180 {
                        Color::Red
                    } else {
                        Color::DarkRed
                    }
                } else if g > r && g > b {
                    if brightness > 180 {
                        Color::Green
                    } else {
                        Color::DarkGreen
                    }
                } else if b > r && b > g {
                    if brightness > 180 {
                        Color::Blue
                    } else {
                        Color::DarkBlue
                    }
                } else if brightness > 180 {
                    Color::White
                } else {
                    Color::Grey
                }
            }
        }
    }
}

pub fn color_to_fg(color: Color) -> String {
    match color {
        Color::Rgb { r, g, b } => format!("38;2;{};{};{}", r, g, b),
        Color::AnsiValue(v) => format!("38;5;{}", v),
        Color::Black => "30".into(),
        Color::DarkRed => "31".into(),
        Color::DarkGreen => "32".into(),
        Color::DarkYellow => "33".into(),
        Color::DarkBlue => "34".into(),
        Color::DarkMagenta => "35".into(),
        Color::DarkCyan => "36".into(),
        Color::Grey => "37".into(),
        Color::DarkGrey => "90".into(),
        Color::Red => "91".into(),
        Color::Green => "92".into(),
        Color::Yellow => "93".into(),
        Color::Blue => "94".into(),
        Color::Magenta => "95".into(),
        Color::Cyan => "96".into(),
        Color::White => "97".into(),
        _ => "37".into(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pack_unpack_roundtrip() {
        let argb = pack(12, 200, 255);
        assert_eq!(unpack(argb), (12, 200, 255));
        assert_eq!(argb & 0xFF00_0000, 0xFF00_0000);
    }

    #[test]
    fn test_set_out_of_bounds_is_ignored() {
        let mut c = Canvas::new(4, 4, RenderMode::Ascii, ColorMode::TrueColor);
        c.set(100, 100, pack(255, 0, 0));
        c.blend(100, 2, 255, 0, 0, 1.0);
        c.add(2, 100, 255, 0, 0);
        assert!(c.argb.iter().all(|&p| p == BLACK));
    }

    #[test]
    fn test_term_size_matches_mode() {
        let c = Canvas::new(10, 8, RenderMode::Braille, ColorMode::Mono);
        assert_eq!((c.width, c.height), (20, 32));
        assert_eq!(c.term_size(), (10, 8));
        let c = Canvas::new(10, 8, RenderMode::HalfBlock, ColorMode::Mono);
        assert_eq!((c.width, c.height), (10, 16));
        assert_eq!(c.term_size(), (10, 8));
    }

    #[test]
    fn test_fade_scales_toward_black() {
        let mut c = Canvas::new(2, 2, RenderMode::Ascii, ColorMode::TrueColor);
        c.clear_to(pack(200, 100, 50));
        c.fade(0.5);
        let (r, g, b) = unpack(c.argb[0]);
        assert_eq!((r, g, b), (100, 50, 25));
        c.fade(0.0);
        assert_eq!(unpack(c.argb[0]), (0, 0, 0));
    }

    #[test]
    fn test_blend_full_alpha_replaces() {
        let mut c = Canvas::new(2, 2, RenderMode::Ascii, ColorMode::TrueColor);
        c.blend(0, 0, 10, 20, 30, 1.0);
        assert_eq!(unpack(c.argb[0]), (10, 20, 30));
    }

    #[test]
    fn test_blit_scaled_covers_canvas() {
        let mut c = Canvas::new(4, 4, RenderMode::Ascii, ColorMode::TrueColor);
        let src = vec![pack(255, 0, 0); 4];
        c.blit_scaled(&src, 2, 2);
        assert!(c.argb.iter().all(|&p| p == pack(255, 0, 0)));
    }
}
