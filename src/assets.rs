//! Built-in decorative textures. The engine treats these as externally
//! owned resources: scenes receive them by reference and must tolerate
//! their absence.

use crate::gfx::hsv_to_rgb;
use crate::render::canvas::pack;

/// A small ARGB8888 image.
pub struct Texture {
    pub width: usize,
    pub height: usize,
    pub argb: Vec<u32>,
}

impl Texture {
    #[inline]
    pub fn get(&self, x: usize, y: usize) -> u32 {
        if x < self.width && y < self.height {
            self.argb[y * self.width + x]
        } else {
            0xFF00_0000
        }
    }

    /// Sample with wrap-around coordinates (may be negative).
    #[inline]
    pub fn sample_wrapped(&self, x: i64, y: i64) -> u32 {
        let tx = x.rem_euclid(self.width as i64) as usize;
        let ty = y.rem_euclid(self.height as i64) as usize;
        self.argb[ty * self.width + tx]
    }

    /// Sample by normalized UV in 0..1 (clamped).
    #[inline]
    pub fn sample_uv(&self, u: f64, v: f64) -> u32 {
        let x = (u.clamp(0.0, 1.0) * (self.width - 1) as f64) as usize;
        let y = (v.clamp(0.0, 1.0) * (self.height - 1) as f64) as usize;
        self.argb[y * self.width + x]
    }
}

/// Textures shared across scenes.
pub struct Assets {
    pub decor: Option<Texture>,
    pub logo: Option<Texture>,
}

impl Assets {
    pub fn load() -> Self {
        Assets {
            decor: Some(build_decor()),
            logo: Some(build_logo()),
        }
    }

    /// No textures at all; scenes fall back to their flat backgrounds.
    pub fn empty() -> Self {
        Assets {
            decor: None,
            logo: None,
        }
    }
}

/// 64x64 tile pattern used by the cube faces and the rotozoomer: hue-cycled
/// checker tiles with dark grout lines between them.
fn build_decor() -> Texture {
    const SIZE: usize = 64;
    const TILE: usize = 8;
    let mut argb = Vec::with_capacity(SIZE * SIZE);
    for y in 0..SIZE {
        for x in 0..SIZE {
            let tx = x / TILE;
            let ty = y / TILE;
            let on_grout = x % TILE == 0 || y % TILE == 0;
            if on_grout {
                argb.push(pack(20, 16, 28));
            } else {
                let hue = ((tx + ty * (SIZE / TILE)) % 8) as f64 / 8.0;
                let v = if (tx + ty) % 2 == 0 { 0.95 } else { 0.55 };
                let (r, g, b) = hsv_to_rgb(hue, 0.75, v);
                argb.push(pack(r, g, b));
            }
        }
    }
    Texture {
        width: SIZE,
        height: SIZE,
        argb,
    }
}

/// Logo pixel art, one glyph row per line; '#' marks a lit pixel.
const LOGO_ART: &[&str] = &[
    "####. ##### #...# .###. ####. ##### ##### #....",
    "#...# #.... ##.## #...# #...# #.... #.... #....",
    "#...# #.... #.#.# #...# #...# #.... #.... #....",
    "#...# ####. #.#.# #...# ####. ####. ####. #....",
    "#...# #.... #...# #...# #.#.. #.... #.... #....",
    "#...# #.... #...# #...# #..#. #.... #.... #....",
    "####. ##### #...# .###. #...# ##### ##### #####",
];

/// Build the logo with a vertical raster gradient, demoscene style.
fn build_logo() -> Texture {
    let height = LOGO_ART.len();
    let width = LOGO_ART.iter().map(|row| row.len()).max().unwrap_or(0);
    let mut argb = vec![0u32; width * height];
    for (y, row) in LOGO_ART.iter().enumerate() {
        let hue = 0.55 + y as f64 / height as f64 * 0.25;
        let (r, g, b) = hsv_to_rgb(hue, 0.85, 1.0);
        for (x, ch) in row.chars().enumerate() {
            if ch == '#' {
                argb[y * width + x] = pack(r, g, b);
            }
        }
    }
    Texture {
        width,
        height,
        argb,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_logo_has_lit_pixels_and_transparent_background() {
        let logo = build_logo();
        assert_eq!(logo.height, 7);
        assert!(logo.width > 40);
        let lit = logo.argb.iter().filter(|&&p| p != 0).count();
        assert!(lit > 0 && lit < logo.argb.len());
    }

    #[test]
    fn test_decor_wraps() {
        let decor = build_decor();
        assert_eq!(decor.sample_wrapped(-1, -1), decor.get(63, 63));
        assert_eq!(decor.sample_wrapped(64, 0), decor.get(0, 0));
    }
}
