//! Shared math and color helpers used by the scenes and the sky engine.

use std::f64::consts::PI;

#[inline]
pub fn lerp(a: f64, b: f64, t: f64) -> f64 {
    a + (b - a) * t
}

/// Convert HSV (h in 0..1, s/v in 0..1) to RGB bytes.
pub fn hsv_to_rgb(h: f64, s: f64, v: f64) -> (u8, u8, u8) {
    let h = h.rem_euclid(1.0) * 6.0;
    let section = h as u32 % 6;
    let f = h - h.floor();
    let p = v * (1.0 - s);
    let q = v * (1.0 - s * f);
    let t = v * (1.0 - s * (1.0 - f));

    let (r, g, b) = match section {
        0 => (v, t, p),
        1 => (q, v, p),
        2 => (p, v, t),
        3 => (p, q, v),
        4 => (t, p, v),
        _ => (v, p, q),
    };
    (
        (r * 255.0).clamp(0.0, 255.0) as u8,
        (g * 255.0).clamp(0.0, 255.0) as u8,
        (b * 255.0).clamp(0.0, 255.0) as u8,
    )
}

/// A color stop in a gradient.
#[derive(Clone, Copy)]
pub struct ColorStop {
    pub t: f64,
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

/// Linear gradient between color stops. Samples by parameter t in 0.0..=1.0.
#[derive(Clone)]
pub struct ColorGradient {
    stops: Vec<ColorStop>,
}

impl ColorGradient {
    /// Create a gradient from a list of color stops. Stops should be sorted by t.
    pub fn new(stops: Vec<ColorStop>) -> Self {
        assert!(stops.len() >= 2, "ColorGradient requires at least 2 stops");
        ColorGradient { stops }
    }

    /// Sample the gradient at parameter t (0.0..=1.0).
    pub fn sample(&self, t: f64) -> (u8, u8, u8) {
        let t = t.clamp(0.0, 1.0);
        if t <= self.stops[0].t {
            return (self.stops[0].r, self.stops[0].g, self.stops[0].b);
        }
        let last = &self.stops[self.stops.len() - 1];
        if t >= last.t {
            return (last.r, last.g, last.b);
        }
        for i in 0..self.stops.len() - 1 {
            let a = &self.stops[i];
            let b = &self.stops[i + 1];
            if t >= a.t && t <= b.t {
                let frac = (t - a.t) / (b.t - a.t);
                let r = (a.r as f64 + (b.r as f64 - a.r as f64) * frac) as u8;
                let g = (a.g as f64 + (b.g as f64 - a.g as f64) * frac) as u8;
                let bl = (a.b as f64 + (b.b as f64 - a.b as f64) * frac) as u8;
                return (r, g, bl);
            }
        }
        (last.r, last.g, last.b)
    }
}

/// A point in 3D space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Vec3 {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Vec3 {
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Vec3 { x, y, z }
    }
}

/// Rotate a point by Euler angles, applied X then Y then Z. The order is
/// fixed: swapping it changes the result (rotations do not commute).
pub fn rotate_xyz(p: Vec3, ax: f64, ay: f64, az: f64) -> Vec3 {
    let (sx, cx) = ax.sin_cos();
    let (sy, cy) = ay.sin_cos();
    let (sz, cz) = az.sin_cos();

    // X axis
    let y1 = p.y * cx - p.z * sx;
    let z1 = p.y * sx + p.z * cx;
    // Y axis
    let x2 = p.x * cy + z1 * sy;
    let z2 = -p.x * sy + z1 * cy;
    // Z axis
    let x3 = x2 * cz - y1 * sz;
    let y3 = x2 * sz + y1 * cz;

    Vec3::new(x3, y3, z2)
}

/// Perspective projection onto screen coordinates.
/// `focal` scales the image, `dist` pushes the object away from the camera.
/// The denominator is clamped to keep points behind the eye finite.
pub fn project(p: Vec3, focal: f64, dist: f64, cx: f64, cy: f64) -> (f64, f64) {
    let denom = (dist + p.z).max(0.1);
    let scale = focal / denom;
    (cx + p.x * scale, cy + p.y * scale)
}

/// Golden ratio, used for the Fibonacci sphere azimuth step.
pub const GOLDEN_RATIO: f64 = 1.618_033_988_749_895;

/// The i-th of n near-uniform points on the unit sphere, as
/// (inclination, azimuth). Pure function of (i, n).
pub fn fibonacci_sphere_angles(i: usize, n: usize) -> (f64, f64) {
    let inclination = (1.0 - 2.0 * i as f64 / n as f64).clamp(-1.0, 1.0).acos();
    let azimuth = 2.0 * PI * i as f64 / GOLDEN_RATIO;
    (inclination, azimuth)
}

/// The i-th of n Fibonacci-sphere points as a unit vector.
pub fn fibonacci_sphere_point(i: usize, n: usize) -> Vec3 {
    let (inc, az) = fibonacci_sphere_angles(i, n);
    Vec3::new(inc.sin() * az.cos(), inc.cos(), inc.sin() * az.sin())
}

/// Sort face indices back-to-front by average depth (largest average z
/// first), for painter's-algorithm rendering.
pub fn sort_faces_back_to_front(depths: &[f64]) -> Vec<usize> {
    let mut order: Vec<usize> = (0..depths.len()).collect();
    order.sort_by(|&a, &b| {
        depths[b]
            .partial_cmp(&depths[a])
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    order
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fibonacci_sphere_is_deterministic() {
        for i in [0usize, 1, 57, 199] {
            let a = fibonacci_sphere_angles(i, 200);
            let b = fibonacci_sphere_angles(i, 200);
            assert_eq!(a, b);
            assert_eq!(fibonacci_sphere_point(i, 200), fibonacci_sphere_point(i, 200));
        }
    }

    #[test]
    fn test_fibonacci_sphere_points_are_unit_length() {
        for i in 0..200 {
            let p = fibonacci_sphere_point(i, 200);
            let len = (p.x * p.x + p.y * p.y + p.z * p.z).sqrt();
            assert!((len - 1.0).abs() < 1e-9, "point {} has length {}", i, len);
        }
    }

    #[test]
    fn test_fibonacci_sphere_spans_both_poles() {
        let (top, _) = fibonacci_sphere_angles(0, 200);
        let (bottom, _) = fibonacci_sphere_angles(199, 200);
        assert!(top < 0.2);
        assert!(bottom > PI - 0.3);
    }

    #[test]
    fn test_sort_faces_largest_depth_first() {
        let depths = [0.3, -1.2, 2.5, 0.0, 2.5, -0.4];
        let order = sort_faces_back_to_front(&depths);
        assert_eq!(order.len(), 6);
        // The numerically largest average z comes first.
        assert_eq!(depths[order[0]], 2.5);
        for w in order.windows(2) {
            assert!(depths[w[0]] >= depths[w[1]]);
        }
    }

    #[test]
    fn test_rotation_order_matters() {
        let p = Vec3::new(1.0, 0.0, 0.0);
        let xyz = rotate_xyz(p, 0.7, 0.5, 0.0);
        // Applying Y before X on the same angles must differ.
        let y_first = {
            let (sy, cy) = 0.5f64.sin_cos();
            let (sx, cx) = 0.7f64.sin_cos();
            let x1 = p.x * cy + p.z * sy;
            let z1 = -p.x * sy + p.z * cy;
            let y2 = p.y * cx - z1 * sx;
            let z2 = p.y * sx + z1 * cx;
            Vec3::new(x1, y2, z2)
        };
        assert!((xyz.y - y_first.y).abs() > 1e-6 || (xyz.z - y_first.z).abs() > 1e-6);
    }

    #[test]
    fn test_project_guards_eye_plane() {
        let p = Vec3::new(1.0, 1.0, -10.0);
        let (x, y) = project(p, 150.0, 4.0, 0.0, 0.0);
        assert!(x.is_finite() && y.is_finite());
    }

    #[test]
    fn test_hsv_primary_colors() {
        assert_eq!(hsv_to_rgb(0.0, 1.0, 1.0), (255, 0, 0));
        let (r, g, b) = hsv_to_rgb(1.0 / 3.0, 1.0, 1.0);
        assert!(g > 250 && r < 5 && b < 5);
    }
}
