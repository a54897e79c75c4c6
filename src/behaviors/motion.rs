//! Stock kinematic behaviors: integration, friction, clamping, thrust, and
//! the speed-ramp composite.

use log::warn;

use super::{Behavior, BehaviorFactory, TickCtx};
use crate::sprite::SpriteState;
use crate::vector::Velocity;

/// Integrate velocity into position: `pos = pos.advance(vel, delta)`.
pub struct Momentum;

impl Behavior for Momentum {
    fn update(&mut self, ctx: &TickCtx, sprite: &mut SpriteState) {
        sprite.pos = sprite.pos.advance(sprite.vel, ctx.delta);
    }
}

pub fn momentum() -> BehaviorFactory {
    Box::new(|_, _| Box::new(Momentum))
}

/// Integrate acceleration into velocity: `vel = vel.advance(accel, delta)`.
pub struct Accelerate;

impl Behavior for Accelerate {
    fn update(&mut self, ctx: &TickCtx, sprite: &mut SpriteState) {
        sprite.vel = sprite.vel.advance(sprite.accel, ctx.delta);
    }
}

pub fn accelerate() -> BehaviorFactory {
    Box::new(|_, _| Box::new(Accelerate))
}

/// Reduce speed by `strength * delta.seconds()`, clamping at exactly zero
/// when the reduction would overshoot.
pub struct Friction {
    pub strength: f32,
}

impl Behavior for Friction {
    fn update(&mut self, ctx: &TickCtx, sprite: &mut SpriteState) {
        let speed = sprite.vel.magnitude();
        if speed <= 0.0 {
            return;
        }
        let reduced = speed - self.strength * ctx.delta.seconds();
        sprite.vel = if reduced <= 0.0 {
            Velocity::zero()
        } else {
            sprite.vel.with_magnitude(reduced)
        };
    }
}

pub fn friction(strength: f32) -> BehaviorFactory {
    Box::new(move |_, _| Box::new(Friction { strength }))
}

/// Clamp speed to a maximum, preserving direction.
pub struct SpeedLimited {
    pub max_speed: f32,
}

impl Behavior for SpeedLimited {
    fn update(&mut self, _ctx: &TickCtx, sprite: &mut SpriteState) {
        if sprite.vel.magnitude() > self.max_speed {
            sprite.vel = sprite.vel.with_magnitude(self.max_speed);
        }
    }
}

pub fn speed_limited(max_speed: f32) -> BehaviorFactory {
    Box::new(move |_, _| Box::new(SpeedLimited { max_speed }))
}

/// Scale the sprite's current acceleration by a constant factor. Paired
/// with a behavior that assigns acceleration each tick (e.g.
/// [`super::input::thrust_keys`]), this turns unit directions into real
/// thrust.
pub struct Thrust {
    pub factor: f32,
}

impl Behavior for Thrust {
    fn update(&mut self, _ctx: &TickCtx, sprite: &mut SpriteState) {
        sprite.accel = sprite.accel.scaled(self.factor);
    }
}

pub fn thrust(factor: f32) -> BehaviorFactory {
    Box::new(move |_, _| Box::new(Thrust { factor }))
}

/// Composite ramp: packages the friction/thrust derivation so callers never
/// hand-derive it. Given `max_speed`, `ramp_up` seconds and `ramp_down`
/// seconds, derives `friction = max_speed / ramp_down` and
/// `thrust = max_speed / ramp_up + friction`, then runs, in order:
/// Thrust -> Accelerate -> Friction -> SpeedLimited -> Momentum.
///
/// The internal order matters: thrust must land in velocity before friction
/// bleeds it and the clamp bounds it, and only then is position advanced.
pub struct SpeedRamp {
    steps: Vec<Box<dyn Behavior>>,
}

impl Behavior for SpeedRamp {
    fn update(&mut self, ctx: &TickCtx, sprite: &mut SpriteState) {
        for step in &mut self.steps {
            step.update(ctx, sprite);
        }
    }
}

pub fn speed_ramp(max_speed: f32, ramp_up_secs: f32, ramp_down_secs: f32) -> BehaviorFactory {
    Box::new(move |_, _| {
        if ramp_up_secs <= 0.0 || ramp_down_secs <= 0.0 || max_speed < 0.0 {
            warn!(
                "speed_ramp misconfigured (max_speed={max_speed}, up={ramp_up_secs}, down={ramp_down_secs}); behavior is inert"
            );
            return Box::new(SpeedRamp { steps: Vec::new() });
        }
        let friction = max_speed / ramp_down_secs;
        let thrust = max_speed / ramp_up_secs + friction;
        Box::new(SpeedRamp {
            steps: vec![
                Box::new(Thrust { factor: thrust }),
                Box::new(Accelerate),
                Box::new(Friction { strength: friction }),
                Box::new(SpeedLimited { max_speed }),
                Box::new(Momentum),
            ],
        })
    })
}
