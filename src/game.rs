//! Game loop driver.
//!
//! One tick per frame drives the whole update+render pass: compute the
//! wall-clock delta since the last tick, clamp it to the catch-up bound,
//! pump host input, start pending sprites, update the scene (unless
//! paused), then render. Rendering runs every frame regardless of pause,
//! so a paused game keeps drawing its last state.
//!
//! The loop is single-threaded; the only cross-thread piece is the
//! cloneable [`StopHandle`], so a host callback or another thread can
//! cancel [`Game::run`].

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use log::{debug, info};

use crate::behaviors::{StartCtx, TickCtx};
use crate::camera::Camera;
use crate::config::{EngineError, GameConfig};
use crate::keys::Keyboard;
use crate::scene::Scene;
use crate::surface::DrawSurface;
use crate::time::{Duration, Timestamp};

/// Cancellation handle for [`Game::run`]. Cloneable and thread-safe.
#[derive(Clone, Debug, Default)]
pub struct StopHandle(Arc<AtomicBool>);

impl StopHandle {
    pub fn stop(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_stopped(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

type CameraHook = Box<dyn FnMut(&TickCtx, &mut Camera)>;

/// The engine: scene, camera, input hub, clock, and the loop driver.
pub struct Game {
    config: GameConfig,
    scene: Scene,
    camera: Camera,
    keyboard: Keyboard,
    camera_hook: Option<CameraHook>,

    last_tick: Option<Timestamp>,
    elapsed: Duration,
    time_scale: f32,

    running: bool,
    paused: bool,

    // Runtime tunables, seeded from the config.
    fps: u32,
    max_frames_skipped: u32,
    debug_bounds: bool,

    stop: StopHandle,
}

impl Game {
    /// Validate the configuration and build a stopped game. Configuration
    /// errors are fatal here, before any loop exists.
    pub fn new(config: GameConfig) -> Result<Self, EngineError> {
        config.validate()?;
        info!(
            "Creating game: {}x{} display, element={}",
            config.display_width, config.display_height, config.element_id
        );
        Ok(Self {
            fps: config.fps,
            max_frames_skipped: config.max_frames_skipped,
            debug_bounds: config.debug_bounds,
            config,
            scene: Scene::new(),
            camera: Camera::default(),
            keyboard: Keyboard::new(),
            camera_hook: None,
            last_tick: None,
            elapsed: Duration::ZERO,
            time_scale: 1.0,
            running: false,
            paused: false,
            stop: StopHandle::default(),
        })
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn keyboard(&self) -> &Keyboard {
        &self.keyboard
    }

    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    pub fn scene_mut(&mut self) -> &mut Scene {
        &mut self.scene
    }

    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    pub fn camera_mut(&mut self) -> &mut Camera {
        &mut self.camera
    }

    /// Hook run after the scene update each unpaused tick, e.g. to keep the
    /// camera on a player sprite.
    pub fn set_camera_hook(&mut self, hook: impl FnMut(&TickCtx, &mut Camera) + 'static) {
        self.camera_hook = Some(Box::new(hook));
    }

    // ==================== RUNTIME TUNABLES ====================

    pub fn set_fps(&mut self, fps: u32) {
        self.fps = fps.max(1);
    }

    pub fn fps(&self) -> u32 {
        self.fps
    }

    pub fn set_max_frames_skipped(&mut self, frames: u32) {
        self.max_frames_skipped = frames.max(1);
    }

    pub fn set_debug_bounds(&mut self, enabled: bool) {
        self.debug_bounds = enabled;
    }

    /// Stretch or shrink every delta before it reaches the scene. `1.0` is
    /// real time.
    pub fn set_time_scale(&mut self, scale: f32) {
        self.time_scale = scale;
    }

    pub fn pause(&mut self) {
        self.paused = true;
        self.keyboard.set_paused(true);
        debug!("Paused at elapsed={}ms", self.elapsed.millis());
    }

    pub fn resume(&mut self) {
        self.paused = false;
        self.keyboard.set_paused(false);
    }

    pub fn toggle_pause(&mut self) {
        if self.paused {
            self.resume();
        } else {
            self.pause();
        }
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Accumulated game time. Pauses don't advance it.
    pub fn elapsed(&self) -> Duration {
        self.elapsed
    }

    /// Handle for cancelling [`Game::run`] from a callback or another
    /// thread.
    pub fn stop_handle(&self) -> StopHandle {
        self.stop.clone()
    }

    /// Longest delta one tick is allowed to integrate after a stall.
    fn max_tick(&self) -> Duration {
        Duration::from_millis(1000.0 / self.fps as f32 * self.max_frames_skipped as f32)
    }

    // ==================== TICKING ====================

    /// Advance game state by a pre-clamped delta: pump input, start pending
    /// sprites, and (unless paused) accumulate time, update the scene
    /// parent-before-children, then run the camera hook.
    pub fn advance(&mut self, delta: Duration) {
        self.keyboard.pump();
        let start_ctx = StartCtx {
            keyboard: &self.keyboard,
        };
        self.scene.start_pending(&start_ctx);
        if self.paused {
            return;
        }
        let delta = delta.scaled(self.time_scale);
        self.elapsed = self.elapsed + delta;
        let ctx = TickCtx::new(delta, self.elapsed, false);
        self.scene.update(&ctx);
        if let Some(hook) = self.camera_hook.as_mut() {
            hook(&ctx, &mut self.camera);
        }
    }

    /// Render the scene through the camera. Runs every frame regardless of
    /// pause state.
    pub fn render(&self, surface: &mut dyn DrawSurface) {
        self.camera.render(&self.scene, surface, self.debug_bounds);
    }

    /// One full tick at wall-clock `now`: delta since the previous frame,
    /// clamped to `(1000/fps) * max_frames_skipped` ms so catch-up work
    /// after a stall stays bounded, then update+render.
    pub fn frame(&mut self, now: Timestamp, surface: &mut dyn DrawSurface) {
        let raw = match self.last_tick {
            Some(prev) => now - prev,
            None => Duration::ZERO,
        };
        self.last_tick = Some(now);
        self.advance(raw.min(self.max_tick()));
        self.render(surface);
    }

    /// Drive a fixed-interval loop at the configured fps until the stop
    /// handle fires. The surface is checked once, fatally, before the loop
    /// starts.
    pub fn run(&mut self, surface: &mut dyn DrawSurface) -> Result<(), EngineError> {
        let (w, h) = surface.size();
        if w <= 0.0 || h <= 0.0 {
            return Err(EngineError::MissingSurface(w, h));
        }
        self.running = true;
        info!("Game loop starting at {} fps", self.fps);
        while !self.stop.is_stopped() {
            let frame_start = Timestamp::now();
            self.frame(frame_start, surface);
            let spent = Timestamp::now() - frame_start;
            let budget_ms = 1000.0 / self.fps as f32;
            let remaining_ms = budget_ms - spent.millis();
            if remaining_ms > 0.0 {
                std::thread::sleep(std::time::Duration::from_secs_f32(remaining_ms / 1000.0));
            }
        }
        self.running = false;
        info!(
            "Game loop stopped after {:.1}s of game time",
            self.elapsed.seconds()
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::behaviors::motion::momentum;
    use crate::scene::SceneNode;
    use crate::sprite::Sprite;
    use crate::surface::{DrawOp, RecordingSurface};
    use crate::vector::{Position, Velocity};

    const EPSILON: f32 = 1e-4;

    fn approx_eq(a: f32, b: f32) -> bool {
        (a - b).abs() < EPSILON
    }

    fn game_with_mover() -> Game {
        let mut game = Game::new(GameConfig::new()).unwrap();
        game.scene_mut().add_sprite(
            Sprite::at(Position::new(0.0, 0.0))
                .with_velocity(Velocity::new(10.0, 0.0))
                .with_behavior(momentum()),
        );
        game
    }

    fn mover_x(game: &Game) -> f32 {
        let SceneNode::Sprite(sprite) = &game.scene().nodes()[0] else {
            panic!("expected sprite");
        };
        sprite.state.pos.x
    }

    #[test]
    fn test_new_rejects_bad_selector() {
        let config = GameConfig::new().with_parent_selector("stage");
        assert!(matches!(
            Game::new(config),
            Err(EngineError::InvalidParentSelector(_))
        ));
    }

    #[test]
    fn test_advance_moves_sprites() {
        let mut game = game_with_mover();
        game.advance(Duration::from_millis(500.0));
        assert!(approx_eq(mover_x(&game), 5.0));
        assert!(approx_eq(game.elapsed().seconds(), 0.5));
    }

    #[test]
    fn test_pause_skips_update_but_render_still_draws() {
        let mut game = game_with_mover();
        game.advance(Duration::from_millis(100.0));
        let moved = mover_x(&game);
        game.pause();
        game.advance(Duration::from_millis(1000.0));
        assert!(approx_eq(mover_x(&game), moved)); // frozen
        assert!(approx_eq(game.elapsed().seconds(), 0.1)); // clock frozen too

        let mut surface = RecordingSurface::new(800.0, 600.0);
        game.render(&mut surface);
        assert!(!surface.ops().is_empty()); // paused games still draw
        assert_eq!(surface.ops()[0], DrawOp::ResetTransform);
    }

    #[test]
    fn test_toggle_pause_round_trips() {
        let mut game = game_with_mover();
        game.toggle_pause();
        assert!(game.is_paused());
        game.toggle_pause();
        assert!(!game.is_paused());
    }

    #[test]
    fn test_time_scale_stretches_delta() {
        let mut game = game_with_mover();
        game.set_time_scale(2.0);
        game.advance(Duration::from_millis(500.0));
        assert!(approx_eq(mover_x(&game), 10.0));
    }

    #[test]
    fn test_max_tick_clamp() {
        let mut game = game_with_mover();
        game.set_fps(100); // 10 ms budget
        game.set_max_frames_skipped(3); // clamp at 30 ms
        assert!(approx_eq(game.max_tick().millis(), 30.0));
    }

    #[test]
    fn test_first_frame_has_zero_delta() {
        let mut game = game_with_mover();
        let mut surface = RecordingSurface::new(800.0, 600.0);
        game.frame(Timestamp::now(), &mut surface);
        assert!(approx_eq(mover_x(&game), 0.0));
    }

    #[test]
    fn test_run_rejects_empty_surface() {
        let mut game = game_with_mover();
        let mut surface = RecordingSurface::new(0.0, 600.0);
        assert!(matches!(
            game.run(&mut surface),
            Err(EngineError::MissingSurface(_, _))
        ));
    }

    #[test]
    fn test_stop_handle_cancels_run() {
        let mut game = game_with_mover();
        game.set_fps(1000);
        let stop = game.stop_handle();
        stop.stop();
        let mut surface = RecordingSurface::new(800.0, 600.0);
        game.run(&mut surface).unwrap(); // returns immediately
        assert!(!game.is_running());
    }
}
