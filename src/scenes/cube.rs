use super::{Clock, Scene};
use crate::assets::{Assets, Texture};
use crate::gfx::{Vec3, hsv_to_rgb, project, rotate_xyz, sort_faces_back_to_front};
use crate::render::Canvas;
use crate::render::canvas::{pack, unpack};

const CUBE_VERTICES: [Vec3; 8] = [
    Vec3 { x: -1.0, y: -1.0, z: -1.0 },
    Vec3 { x: 1.0, y: -1.0, z: -1.0 },
    Vec3 { x: 1.0, y: 1.0, z: -1.0 },
    Vec3 { x: -1.0, y: 1.0, z: -1.0 },
    Vec3 { x: -1.0, y: -1.0, z: 1.0 },
    Vec3 { x: 1.0, y: -1.0, z: 1.0 },
    Vec3 { x: 1.0, y: 1.0, z: 1.0 },
    Vec3 { x: -1.0, y: 1.0, z: 1.0 },
];

const CUBE_FACES: [[usize; 4]; 6] = [
    [0, 1, 2, 3],
    [4, 5, 6, 7],
    [0, 1, 5, 4],
    [2, 3, 7, 6],
    [0, 3, 7, 4],
    [1, 2, 6, 5],
];

/// Face quad corners map straight onto the texture.
const FACE_UV: [(f64, f64); 4] = [(0.0, 0.0), (1.0, 0.0), (1.0, 1.0), (0.0, 1.0)];

const NUM_BARS: usize = 8;

/// Spinning textured cube over rainbow copper bars.
pub struct Cube;

impl Cube {
    pub fn new() -> Self {
        Cube
    }
}

impl Default for Cube {
    fn default() -> Self {
        Self::new()
    }
}

/// Average rotated depth per face, the painter's-algorithm sort key.
pub fn face_depths(rotated: &[Vec3; 8]) -> [f64; 6] {
    let mut depths = [0.0; 6];
    for (f, face) in CUBE_FACES.iter().enumerate() {
        depths[f] = face.iter().map(|&v| rotated[v].z).sum::<f64>() / 4.0;
    }
    depths
}

fn draw_copper_bars(canvas: &mut Canvas, t: f64) {
    let w = canvas.width;
    let h = canvas.height as f64;
    let bar_height = (h * 0.05).max(2.0) as usize;

    for i in 0..NUM_BARS {
        let base_y = i as f64 * h / NUM_BARS as f64 + (t * 1.5 + i as f64 * 0.8).sin() * h * 0.067;
        let hue = i as f64 / NUM_BARS as f64 + t * 0.1;
        let (r, g, b) = hsv_to_rgb(hue, 1.0, 1.0);

        for dy in 0..bar_height {
            let y = base_y as i64 + dy as i64;
            if y < 0 || y >= canvas.height as i64 {
                continue;
            }
            // Squared falloff gives the bars their hard metallic sheen.
            let half = bar_height as f64 / 2.0;
            let brightness = 1.0 - (dy as f64 - half).abs() / half;
            let brightness = brightness * brightness;
            let color = pack(
                (r as f64 * brightness) as u8,
                (g as f64 * brightness) as u8,
                (b as f64 * brightness) as u8,
            );
            let row = y as usize * w;
            canvas.argb[row..row + w].fill(color);
        }
    }
}

/// Affine-textured triangle fill via barycentric coordinates.
fn fill_textured_tri(
    canvas: &mut Canvas,
    p: [(f64, f64); 3],
    uv: [(f64, f64); 3],
    tex: &Texture,
    shade: f64,
) {
    let min_x = p.iter().map(|q| q.0).fold(f64::INFINITY, f64::min).floor().max(0.0) as usize;
    let max_x = p
        .iter()
        .map(|q| q.0)
        .fold(f64::NEG_INFINITY, f64::max)
        .ceil()
        .min(canvas.width as f64 - 1.0)
        .max(0.0) as usize;
    let min_y = p.iter().map(|q| q.1).fold(f64::INFINITY, f64::min).floor().max(0.0) as usize;
    let max_y = p
        .iter()
        .map(|q| q.1)
        .fold(f64::NEG_INFINITY, f64::max)
        .ceil()
        .min(canvas.height as f64 - 1.0)
        .max(0.0) as usize;

    let area = (p[1].0 - p[0].0) * (p[2].1 - p[0].1) - (p[2].0 - p[0].0) * (p[1].1 - p[0].1);
    if area.abs() < 1e-9 {
        return;
    }

    for y in min_y..=max_y {
        for x in min_x..=max_x {
            let px = x as f64 + 0.5;
            let py = y as f64 + 0.5;
            let w0 = ((p[1].0 - px) * (p[2].1 - py) - (p[2].0 - px) * (p[1].1 - py)) / area;
            let w1 = ((p[2].0 - px) * (p[0].1 - py) - (p[0].0 - px) * (p[2].1 - py)) / area;
            let w2 = 1.0 - w0 - w1;
            if w0 < 0.0 || w1 < 0.0 || w2 < 0.0 {
                continue;
            }
            let u = uv[0].0 * w0 + uv[1].0 * w1 + uv[2].0 * w2;
            let v = uv[0].1 * w0 + uv[1].1 * w1 + uv[2].1 * w2;
            let (r, g, b) = unpack(tex.sample_uv(u, v));
            canvas.set(
                x,
                y,
                pack(
                    (r as f64 * shade) as u8,
                    (g as f64 * shade) as u8,
                    (b as f64 * shade) as u8,
                ),
            );
        }
    }
}

impl Scene for Cube {
    fn name(&self) -> &str {
        "cube"
    }

    fn update(&mut self, canvas: &mut Canvas, clock: &Clock, assets: &Assets) {
        canvas.clear();
        let t = clock.scene_time;
        draw_copper_bars(canvas, t);

        let Some(tex) = assets.decor.as_ref() else {
            // No texture: the bars carry the scene alone.
            return;
        };

        let angle_x = t * 0.7;
        let angle_y = t * 0.5;
        let angle_z = t * 0.3;

        let cx = canvas.width as f64 / 2.0;
        let cy = canvas.height as f64 / 2.0;
        let focal = canvas.width.min(canvas.height * 2) as f64 * 0.19;

        let mut rotated = [Vec3::new(0.0, 0.0, 0.0); 8];
        let mut projected = [(0.0f64, 0.0f64); 8];
        for i in 0..8 {
            let r = rotate_xyz(CUBE_VERTICES[i], angle_x, angle_y, angle_z);
            rotated[i] = r;
            projected[i] = project(r, focal, 4.0, cx, cy);
        }

        let depths = face_depths(&rotated);
        for &f in &sort_faces_back_to_front(&depths) {
            // Hidden faces hang far behind the cube center; skip them.
            if depths[f] <= -1.0 {
                continue;
            }
            let face = CUBE_FACES[f];
            let quad: [(f64, f64); 4] = [
                projected[face[0]],
                projected[face[1]],
                projected[face[2]],
                projected[face[3]],
            ];
            // Facing quads get full brightness, receding ones dim slightly.
            let shade = 0.72 + 0.28 * ((depths[f] + 1.0) / 2.0).clamp(0.0, 1.0);

            fill_textured_tri(
                canvas,
                [quad[0], quad[1], quad[2]],
                [FACE_UV[0], FACE_UV[1], FACE_UV[2]],
                tex,
                shade,
            );
            fill_textured_tri(
                canvas,
                [quad[0], quad[2], quad[3]],
                [FACE_UV[0], FACE_UV[2], FACE_UV[3]],
                tex,
                shade,
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_front_face_sorted_last() {
        // At rotation 0 the faces at z=-1 and z=+1 bracket the order.
        let rotated = CUBE_VERTICES;
        let depths = face_depths(&rotated);
        let order = sort_faces_back_to_front(&depths);
        // Face 1 lies at z=+1 (painted first), face 0 at z=-1 (painted last).
        assert_eq!(order[0], 1);
        assert_eq!(order[5], 0);
    }

    #[test]
    fn test_face_ordering_holds_under_rotation() {
        for step in 0..12 {
            let t = step as f64 * 0.53;
            let mut rotated = [Vec3::new(0.0, 0.0, 0.0); 8];
            for i in 0..8 {
                rotated[i] = rotate_xyz(CUBE_VERTICES[i], t * 0.7, t * 0.5, t * 0.3);
            }
            let depths = face_depths(&rotated);
            let order = sort_faces_back_to_front(&depths);
            let max_depth = depths.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
            assert!((depths[order[0]] - max_depth).abs() < 1e-12);
            for w in order.windows(2) {
                assert!(depths[w[0]] >= depths[w[1]]);
            }
        }
    }
}
