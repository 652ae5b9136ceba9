//! The effects player: scene list, scheduler, scroll overlay and fade,
//! ticked once per frame.

use crate::assets::Assets;
use crate::render::Canvas;
use crate::scenes::{self, Clock, Scene};
use crate::scheduler::SceneScheduler;
use crate::scroll::{ScrollController, ScrollStyle};

pub struct DemoPlayer {
    /// Scenes are constructed once and never rebuilt, so scene-local state
    /// (ball physics, logo phases) survives scene switches.
    scenes: Vec<Box<dyn Scene>>,
    scheduler: SceneScheduler,
    scroll: ScrollController,
    assets: Assets,
    global_time: f64,
}

pub struct DemoOptions {
    pub scene_names: Vec<String>,
    pub scene_duration: f64,
    pub scroll_text: String,
    pub scroll_style: ScrollStyle,
    pub scroll_speed: f64,
    pub roller_preset: u8,
}

impl DemoPlayer {
    pub fn new(opts: &DemoOptions, width: usize, height: usize) -> Result<Self, String> {
        if opts.scene_names.is_empty() {
            return Err("scene list is empty".to_string());
        }
        let mut scene_objs = Vec::with_capacity(opts.scene_names.len());
        for name in &opts.scene_names {
            let scene = scenes::create(name, width, height)
                .ok_or_else(|| format!("unknown scene: {}", name))?;
            scene_objs.push(scene);
        }
        let scheduler = SceneScheduler::new((0..scene_objs.len()).collect(), opts.scene_duration);
        let scroll = ScrollController::new(
            &opts.scroll_text,
            width,
            height,
            opts.scroll_style,
            opts.scroll_speed,
            opts.roller_preset,
        );
        Ok(DemoPlayer {
            scenes: scene_objs,
            scheduler,
            scroll,
            assets: Assets::load(),
            global_time: 0.0,
        })
    }

    pub fn scene_name(&self) -> &str {
        self.scenes[self.scheduler.position()].name()
    }

    /// Re-resolve the scroll text for a new canvas size. Scenes size
    /// themselves off the canvas each frame and need no rebuild.
    pub fn resize(&mut self, scroll_text: &str, width: usize, height: usize) {
        self.scroll.set_text(scroll_text, width, height);
    }

    pub fn next_scene(&mut self) {
        self.scheduler.jump(true);
    }

    pub fn prev_scene(&mut self) {
        self.scheduler.jump(false);
    }

    /// Advance everything by `dt` and draw the frame.
    pub fn tick(&mut self, canvas: &mut Canvas, dt: f64) {
        self.global_time += dt;
        self.scheduler.advance(dt);

        let clock = Clock {
            dt,
            scene_time: self.scheduler.scene_time(),
            global_time: self.global_time,
        };
        let pos = self.scheduler.position();
        self.scenes[pos].update(canvas, &clock, &self.assets);

        self.scroll.update(dt, self.global_time);
        self.scroll.draw(canvas, self.global_time);

        let alpha = self.scheduler.alpha();
        if alpha < 1.0 {
            canvas.fade(alpha);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::{ColorMode, RenderMode};

    fn options(names: &[&str]) -> DemoOptions {
        DemoOptions {
            scene_names: names.iter().map(|s| s.to_string()).collect(),
            scene_duration: 1.0,
            scroll_text: "HELLO {SPEED:60}WORLD".to_string(),
            scroll_style: ScrollStyle::Wave,
            scroll_speed: 40.0,
            roller_preset: 1,
        }
    }

    #[test]
    fn test_unknown_scene_is_an_error() {
        let mut canvas = Canvas::new(40, 20, RenderMode::HalfBlock, ColorMode::TrueColor);
        let err = DemoPlayer::new(&options(&["plasma", "bogus"]), canvas.width, canvas.height);
        assert!(err.is_err());
        canvas.clear();
    }

    #[test]
    fn test_player_rotates_through_scene_list() {
        let mut canvas = Canvas::new(40, 20, RenderMode::HalfBlock, ColorMode::TrueColor);
        let mut player = DemoPlayer::new(
            &options(&["plasma", "tunnel", "starfield"]),
            canvas.width,
            canvas.height,
        )
        .unwrap();
        let mut seen = vec![player.scene_name().to_string()];
        for _ in 0..(4.0 / 0.033) as usize {
            player.tick(&mut canvas, 0.033);
            if seen.last().map(String::as_str) != Some(player.scene_name()) {
                seen.push(player.scene_name().to_string());
            }
        }
        assert!(seen.len() >= 4);
        assert_eq!(seen[0], "plasma");
        assert_eq!(seen[1], "tunnel");
        assert_eq!(seen[2], "starfield");
        assert_eq!(seen[3], "plasma");
    }

    #[test]
    fn test_manual_jump_wraps() {
        let mut canvas = Canvas::new(40, 20, RenderMode::HalfBlock, ColorMode::TrueColor);
        let mut player =
            DemoPlayer::new(&options(&["plasma", "tunnel"]), canvas.width, canvas.height).unwrap();
        player.prev_scene();
        assert_eq!(player.scene_name(), "tunnel");
        player.next_scene();
        assert_eq!(player.scene_name(), "plasma");
        player.tick(&mut canvas, 0.033);
    }
}
