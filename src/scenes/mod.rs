pub mod cube;
pub mod floor;
pub mod logo;
pub mod plasma;
pub mod rainlogo;
pub mod rotozoom;
pub mod starball;
pub mod starfield;
pub mod tunnel;

use crate::assets::Assets;
use crate::render::Canvas;

/// Frame timing handed to every scene. `scene_time` resets when the
/// scheduler switches scenes; `global_time` never does.
pub struct Clock {
    pub dt: f64,
    pub scene_time: f64,
    pub global_time: f64,
}

/// Every scene implements this trait
pub trait Scene {
    /// Human-readable name
    fn name(&self) -> &str;

    /// Advance the effect and draw a full frame into the canvas
    fn update(&mut self, canvas: &mut Canvas, clock: &Clock, assets: &Assets);
}

/// List of all available scene names with descriptions.
pub const SCENES: &[(&str, &str)] = &[
    ("plasma", "Classic 4-sine plasma with drifting color waves"),
    ("starfield", "3D starfield flying toward the camera"),
    ("cube", "Textured spinning cube over rainbow copper bars"),
    ("tunnel", "XOR tunnel with a wandering eye point"),
    ("starball", "Bouncing ball of Fibonacci-sphere stars"),
    ("rotozoom", "Rotating, breathing zoom over a tiled texture"),
    ("floor", "Checkered floor casting with a bouncing sphere"),
    ("logo", "Logo bouncing with squash and stretch"),
    ("rainlogo", "Logo raining in line by line, wobbling, raining out"),
];

/// List of all available scene names.
pub const SCENE_NAMES: &[&str] = &[
    "plasma",
    "starfield",
    "cube",
    "tunnel",
    "starball",
    "rotozoom",
    "floor",
    "logo",
    "rainlogo",
];

/// Create a scene by name, sized to the canvas pixel dimensions.
/// Returns None for an unknown name; callers validate against SCENE_NAMES.
pub fn create(name: &str, width: usize, height: usize) -> Option<Box<dyn Scene>> {
    let scene: Box<dyn Scene> = match name {
        "plasma" => Box::new(plasma::Plasma::new(width, height)),
        "starfield" => Box::new(starfield::Starfield::new()),
        "cube" => Box::new(cube::Cube::new()),
        "tunnel" => Box::new(tunnel::Tunnel::new()),
        "starball" => Box::new(starball::StarBall::new(width, height)),
        "rotozoom" => Box::new(rotozoom::Rotozoom::new()),
        "floor" => Box::new(floor::Floor::new(width, height)),
        "logo" => Box::new(logo::BouncingLogo::new(width, height)),
        "rainlogo" => Box::new(rainlogo::RainingLogo::new()),
        _ => return None,
    };
    Some(scene)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::{ColorMode, RenderMode};

    #[test]
    fn test_registry_names_match_create() {
        for &name in SCENE_NAMES {
            assert!(create(name, 80, 48).is_some(), "scene {} missing", name);
        }
        assert!(create("nope", 80, 48).is_none());
        assert_eq!(SCENES.len(), SCENE_NAMES.len());
    }

    #[test]
    fn test_every_scene_renders_a_frame() {
        let assets = Assets::load();
        let mut canvas = Canvas::new(40, 20, RenderMode::HalfBlock, ColorMode::TrueColor);
        for &name in SCENE_NAMES {
            let mut scene = create(name, canvas.width, canvas.height).unwrap();
            let mut clock = Clock {
                dt: 1.0 / 30.0,
                scene_time: 0.0,
                global_time: 0.0,
            };
            for frame in 0..10 {
                clock.scene_time = frame as f64 / 30.0;
                clock.global_time = clock.scene_time;
                scene.update(&mut canvas, &clock, &assets);
            }
        }
    }

    #[test]
    fn test_texture_scenes_survive_missing_assets() {
        let assets = Assets::empty();
        let mut canvas = Canvas::new(40, 20, RenderMode::HalfBlock, ColorMode::TrueColor);
        for &name in &["cube", "rotozoom", "logo", "rainlogo"] {
            let mut scene = create(name, canvas.width, canvas.height).unwrap();
            let clock = Clock {
                dt: 1.0 / 30.0,
                scene_time: 0.5,
                global_time: 0.5,
            };
            scene.update(&mut canvas, &clock, &assets);
        }
    }
}
