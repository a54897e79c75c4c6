//! Rotation behaviors: key-driven spin and target tracking.
//!
//! All of these use the crate's single angle convention: radians, zero
//! facing `(1, 0)`, positive toward `+y`. Rotations are wrapped into
//! `[0, 2π)` after every change.

use super::{Behavior, BehaviorFactory, TickCtx};
use crate::keys::Keys;
use crate::sprite::SpriteState;
use crate::vector::{Position, shortest_arc, wrap_angle};

/// Where a tracking behavior should look. A dynamic target may resolve to
/// `None`, in which case rotation is left unchanged for that tick.
pub enum Target {
    Fixed(Position),
    Dynamic(Box<dyn Fn(&TickCtx, &SpriteState) -> Option<Position>>),
}

impl Target {
    pub fn fixed(pos: Position) -> Self {
        Target::Fixed(pos)
    }

    pub fn dynamic(f: impl Fn(&TickCtx, &SpriteState) -> Option<Position> + 'static) -> Self {
        Target::Dynamic(Box::new(f))
    }

    fn resolve(&self, ctx: &TickCtx, sprite: &SpriteState) -> Option<Position> {
        match self {
            Target::Fixed(pos) => Some(*pos),
            Target::Dynamic(f) => f(ctx, sprite),
        }
    }
}

impl From<Position> for Target {
    fn from(pos: Position) -> Self {
        Target::Fixed(pos)
    }
}

const INCREASE: &str = "increase";
const DECREASE: &str = "decrease";

/// Two held-key labels spin the sprite at `strength` radians per second.
pub struct RotateKeys {
    keys: Keys,
    strength: f32,
}

impl Behavior for RotateKeys {
    fn update(&mut self, ctx: &TickCtx, sprite: &mut SpriteState) {
        let step = self.strength * ctx.delta.seconds();
        for label in self.keys.pulse() {
            match label.as_str() {
                INCREASE => sprite.rotation = wrap_angle(sprite.rotation + step),
                DECREASE => sprite.rotation = wrap_angle(sprite.rotation - step),
                _ => {}
            }
        }
    }
}

/// `increase_keys` spin toward `+y`, `decrease_keys` the other way.
pub fn rotate_keys(
    strength: f32,
    increase_keys: &[&str],
    decrease_keys: &[&str],
) -> BehaviorFactory {
    let increase: Vec<String> = increase_keys.iter().map(|k| k.to_string()).collect();
    let decrease: Vec<String> = decrease_keys.iter().map(|k| k.to_string()).collect();
    Box::new(move |ctx, _| {
        let mut keys = ctx.keyboard.tracker();
        keys.actions(INCREASE, &increase);
        keys.actions(DECREASE, &decrease);
        Box::new(RotateKeys { keys, strength })
    })
}

/// Turn toward (or away from, or at an offset to) a target, clamping the
/// per-tick change to `rot_speed * delta.seconds()` and always taking the
/// shorter angular path (never more than π in one decision).
pub struct RotateToward {
    target: Target,
    rot_speed: f32,
    /// Added to the bearing before turning: `0` tracks the target, `π`
    /// faces away, anything else holds an offset heading.
    offset: f32,
}

impl Behavior for RotateToward {
    fn update(&mut self, ctx: &TickCtx, sprite: &mut SpriteState) {
        let Some(target) = self.target.resolve(ctx, sprite) else {
            return; // absent target: leave rotation unchanged this tick
        };
        let bearing = (target - sprite.pos).direction() + self.offset;
        let arc = shortest_arc(sprite.rotation, bearing);
        let max_step = self.rot_speed * ctx.delta.seconds();
        let applied = arc.clamp(-max_step, max_step);
        sprite.rotation = wrap_angle(sprite.rotation + applied);
    }
}

pub fn rotate_toward(rot_speed: f32, target: impl Into<Target>) -> BehaviorFactory {
    rotate_toward_plus(rot_speed, 0.0, target)
}

pub fn rotate_toward_plus(
    rot_speed: f32,
    offset: f32,
    target: impl Into<Target>,
) -> BehaviorFactory {
    let target = target.into();
    Box::new(move |_, _| {
        Box::new(RotateToward {
            target,
            rot_speed,
            offset,
        })
    })
}

pub fn rotate_away_from(rot_speed: f32, target: impl Into<Target>) -> BehaviorFactory {
    rotate_toward_plus(rot_speed, std::f32::consts::PI, target)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::behaviors::StartCtx;
    use crate::keys::{KeyEvent, Keyboard};
    use crate::time::Duration;
    use std::f32::consts::{FRAC_PI_2, FRAC_PI_4, PI, TAU};

    const EPSILON: f32 = 1e-4;

    fn approx_eq(a: f32, b: f32) -> bool {
        (a - b).abs() < EPSILON
    }

    fn tick(delta_ms: f32) -> TickCtx {
        TickCtx::new(
            Duration::from_millis(delta_ms),
            Duration::from_millis(delta_ms),
            false,
        )
    }

    // ==================== ROTATE KEYS TESTS ====================

    #[test]
    fn test_rotate_keys_increments_while_held() {
        let keyboard = Keyboard::new();
        let ctx = StartCtx {
            keyboard: &keyboard,
        };
        let mut b = rotate_keys(PI, &["d"], &["a"])(&ctx, &SpriteState::default());
        let mut s = SpriteState::default();

        keyboard.dispatch(&KeyEvent::down("d"));
        b.update(&tick(500.0), &mut s);
        assert!(approx_eq(s.rotation, FRAC_PI_2));

        keyboard.dispatch(&KeyEvent::up("d"));
        keyboard.dispatch(&KeyEvent::down("a"));
        b.update(&tick(250.0), &mut s);
        assert!(approx_eq(s.rotation, FRAC_PI_4));
    }

    #[test]
    fn test_rotate_keys_wraps_into_tau() {
        let keyboard = Keyboard::new();
        let ctx = StartCtx {
            keyboard: &keyboard,
        };
        let mut b = rotate_keys(PI, &["d"], &["a"])(&ctx, &SpriteState::default());
        let mut s = SpriteState::default();
        keyboard.dispatch(&KeyEvent::down("a"));
        b.update(&tick(500.0), &mut s); // 0 - π/2 wraps
        assert!(approx_eq(s.rotation, TAU - FRAC_PI_2));
    }

    #[test]
    fn test_rotate_keys_idle_without_input() {
        let keyboard = Keyboard::new();
        let ctx = StartCtx {
            keyboard: &keyboard,
        };
        let mut b = rotate_keys(PI, &["d"], &["a"])(&ctx, &SpriteState::default());
        let mut s = SpriteState::default();
        b.update(&tick(500.0), &mut s);
        assert!(approx_eq(s.rotation, 0.0));
    }

    // ==================== ROTATE TOWARD TESTS ====================

    fn start_ctx(keyboard: &Keyboard) -> StartCtx<'_> {
        StartCtx { keyboard }
    }

    #[test]
    fn test_rotate_toward_clamps_step() {
        let keyboard = Keyboard::new();
        let ctx = start_ctx(&keyboard);
        // Target straight down (+y): bearing π/2, speed π rad/s, 250 ms.
        let mut b = rotate_toward(PI, Position::new(0.0, 10.0))(&ctx, &SpriteState::default());
        let mut s = SpriteState::default();
        b.update(&tick(250.0), &mut s);
        assert!(approx_eq(s.rotation, PI * 0.25));
    }

    #[test]
    fn test_rotate_toward_reaches_and_holds_bearing() {
        let keyboard = Keyboard::new();
        let ctx = start_ctx(&keyboard);
        let mut b = rotate_toward(PI, Position::new(0.0, 10.0))(&ctx, &SpriteState::default());
        let mut s = SpriteState::default();
        for _ in 0..8 {
            b.update(&tick(250.0), &mut s);
        }
        assert!(approx_eq(s.rotation, FRAC_PI_2));
    }

    #[test]
    fn test_rotate_toward_takes_shorter_path() {
        let keyboard = Keyboard::new();
        let ctx = start_ctx(&keyboard);
        // Facing almost a full turn; target at bearing 0. Short way is
        // forward through 2π, not back through the whole circle.
        let mut b = rotate_toward(PI, Position::new(10.0, 0.0))(&ctx, &SpriteState::default());
        let mut s = SpriteState::default();
        s.rotation = TAU - 0.2;
        b.update(&tick(50.0), &mut s);
        let moved = shortest_arc(TAU - 0.2, s.rotation);
        assert!(moved > 0.0); // rotated forward, the short way
        assert!(moved <= PI * 0.05 + EPSILON);
    }

    #[test]
    fn test_rotate_toward_absent_target_is_noop() {
        let keyboard = Keyboard::new();
        let ctx = start_ctx(&keyboard);
        let mut b = rotate_toward(PI, Target::dynamic(|_, _| None))(&ctx, &SpriteState::default());
        let mut s = SpriteState::default();
        s.rotation = 1.0;
        b.update(&tick(250.0), &mut s);
        assert!(approx_eq(s.rotation, 1.0));
    }

    #[test]
    fn test_rotate_away_from_faces_opposite() {
        let keyboard = Keyboard::new();
        let ctx = start_ctx(&keyboard);
        // Target to the right; away means bearing π. Generous speed so one
        // tick settles.
        let mut b =
            rotate_away_from(10.0 * PI, Position::new(10.0, 0.0))(&ctx, &SpriteState::default());
        let mut s = SpriteState::default();
        b.update(&tick(1000.0), &mut s);
        assert!(approx_eq(s.rotation, PI));
    }

    #[test]
    fn test_rotate_toward_plus_offsets_bearing() {
        let keyboard = Keyboard::new();
        let ctx = start_ctx(&keyboard);
        let mut b = rotate_toward_plus(10.0 * PI, FRAC_PI_2, Position::new(10.0, 0.0))(
            &ctx,
            &SpriteState::default(),
        );
        let mut s = SpriteState::default();
        b.update(&tick(1000.0), &mut s);
        assert!(approx_eq(s.rotation, FRAC_PI_2));
    }

    #[test]
    fn test_rotate_toward_dynamic_target_follows_sprite() {
        let keyboard = Keyboard::new();
        let ctx = start_ctx(&keyboard);
        // Bearing computed from the sprite's own position each tick.
        let target = Target::dynamic(|_, sprite| {
            Some(Position::new(sprite.pos.x, sprite.pos.y + 5.0))
        });
        let mut b = rotate_toward(10.0 * PI, target)(&ctx, &SpriteState::default());
        let mut s = SpriteState::default();
        s.pos = Position::new(42.0, -7.0);
        b.update(&tick(1000.0), &mut s);
        assert!(approx_eq(s.rotation, FRAC_PI_2));
    }
}
