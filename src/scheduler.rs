//! Rotates the active scene on a fixed duration with a short cross-fade.
//!
//! The fade is a single 300 ms window: alpha ramps 1 → 0 over the first
//! half, the scene index advances as progress crosses 0.5, and alpha ramps
//! back to 1 over the second half.

/// Length of the whole fade window, seconds.
pub const FADE_WINDOW: f64 = 0.3;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Steady,
    FadingOut,
    FadingIn,
}

pub struct SceneScheduler {
    /// Scene ids, rotated in order. A single entry disables rotation.
    list: Vec<usize>,
    pos: usize,
    duration: f64,
    scene_time: f64,
    fade_time: f64,
    phase: Phase,
}

impl SceneScheduler {
    /// `list` holds the scene ids to rotate through; `duration` is the
    /// steady time per scene in seconds.
    pub fn new(list: Vec<usize>, duration: f64) -> Self {
        assert!(!list.is_empty(), "scheduler needs at least one scene");
        SceneScheduler {
            list,
            pos: 0,
            duration: duration.max(FADE_WINDOW),
            scene_time: 0.0,
            fade_time: 0.0,
            phase: Phase::Steady,
        }
    }

    /// Id of the active scene.
    pub fn active(&self) -> usize {
        self.list[self.pos]
    }

    /// Position of the active scene within the configured list.
    pub fn position(&self) -> usize {
        self.pos
    }

    /// Seconds the active scene has been running (resets on switch).
    pub fn scene_time(&self) -> f64 {
        self.scene_time
    }

    /// Current fade alpha: 1.0 steady, dipping to 0.0 mid-switch.
    pub fn alpha(&self) -> f64 {
        match self.phase {
            Phase::Steady => 1.0,
            Phase::FadingOut | Phase::FadingIn => {
                let progress = (self.fade_time / FADE_WINDOW).clamp(0.0, 1.0);
                (2.0 * progress - 1.0).abs()
            }
        }
    }

    /// Advance the scheduler clock by `dt` seconds.
    pub fn advance(&mut self, dt: f64) {
        self.scene_time += dt;
        if self.list.len() <= 1 {
            // Fixed scene: rotation disabled, alpha pinned at 1.0.
            return;
        }

        match self.phase {
            Phase::Steady => {
                if self.scene_time > self.duration {
                    self.phase = Phase::FadingOut;
                    self.fade_time = 0.0;
                }
            }
            Phase::FadingOut => {
                self.fade_time += dt;
                if self.fade_time >= FADE_WINDOW * 0.5 {
                    self.pos = (self.pos + 1) % self.list.len();
                    self.scene_time = 0.0;
                    self.phase = Phase::FadingIn;
                }
            }
            Phase::FadingIn => {
                self.fade_time += dt;
                if self.fade_time >= FADE_WINDOW {
                    self.phase = Phase::Steady;
                }
            }
        }
    }

    /// Jump immediately to the next or previous scene (manual control).
    pub fn jump(&mut self, forward: bool) {
        let len = self.list.len();
        self.pos = if forward {
            (self.pos + 1) % len
        } else {
            (self.pos + len - 1) % len
        };
        self.scene_time = 0.0;
        self.fade_time = 0.0;
        self.phase = Phase::Steady;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cycles_in_order_and_returns_to_start() {
        let mut sched = SceneScheduler::new(vec![0, 2, 5], 1.0);
        let dt = 0.05;
        let mut visited = vec![sched.active()];
        // 3 scene durations + 2 full fade windows of margin.
        let ticks = ((3.0 + 2.0 * FADE_WINDOW) / dt).ceil() as usize;
        for _ in 0..ticks {
            sched.advance(dt);
            if *visited.last().unwrap() != sched.active() {
                visited.push(sched.active());
            }
        }
        assert_eq!(visited, vec![0, 2, 5, 0]);
    }

    #[test]
    fn test_scene_clock_resets_on_switch() {
        let mut sched = SceneScheduler::new(vec![0, 1], 1.0);
        let dt = 0.05;
        let mut switched = false;
        let mut prev = sched.active();
        for _ in 0..40 {
            sched.advance(dt);
            if sched.active() != prev {
                switched = true;
                assert!(sched.scene_time() < 0.2);
                prev = sched.active();
            }
        }
        assert!(switched);
    }

    #[test]
    fn test_alpha_dips_to_zero_mid_fade() {
        let mut sched = SceneScheduler::new(vec![0, 1], 1.0);
        let mut min_alpha = 1.0f64;
        for _ in 0..100 {
            sched.advance(0.025);
            min_alpha = min_alpha.min(sched.alpha());
        }
        assert!(min_alpha < 0.2);
        // And it comes back up after the window.
        assert!((sched.alpha() - 1.0).abs() < 1e-9 || sched.alpha() > 0.0);
    }

    #[test]
    fn test_single_scene_pins_alpha() {
        let mut sched = SceneScheduler::new(vec![3], 1.0);
        for _ in 0..200 {
            sched.advance(0.05);
            assert_eq!(sched.alpha(), 1.0);
            assert_eq!(sched.active(), 3);
        }
    }

    #[test]
    fn test_jump_is_immediate_and_wraps() {
        let mut sched = SceneScheduler::new(vec![0, 2, 5], 10.0);
        sched.jump(true);
        assert_eq!(sched.active(), 2);
        sched.jump(false);
        sched.jump(false);
        assert_eq!(sched.active(), 5);
        assert_eq!(sched.alpha(), 1.0);
    }
}
