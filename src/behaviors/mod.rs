//! Composable per-sprite update behaviors.
//!
//! A [`Behavior`] is a per-tick update rule bound to exactly one sprite. A
//! sprite collects [`BehaviorFactory`] values at construction; the game
//! loop materializes them through an explicit start step before the
//! sprite's first tick (two-phase construction, no hidden first-tick
//! special case). Instantiation and every subsequent update run strictly
//! in declaration order.
//!
//! That ordering is a load-bearing contract: behaviors read and overwrite
//! any subset of the sprite's kinematic fields with no conflict detection,
//! so composition order is the only conflict-resolution mechanism. The
//! stock [`motion::speed_ramp`] composite depends on its exact internal
//! sub-step order to produce sensible motion within one tick.
//!
//! Behaviors run inside the frame loop and must not panic: a malformed
//! configuration degrades to an inert behavior instead.

pub mod bounds;
pub mod input;
pub mod motion;
pub mod steering;

use crate::keys::Keyboard;
use crate::sprite::SpriteState;
use crate::time::Duration;

/// Per-tick context shared by every behavior in the frame.
pub struct TickCtx {
    /// Elapsed simulated time for this tick, already clamped by the loop.
    pub delta: Duration,
    /// Accumulated game time (pause-aware).
    pub elapsed: Duration,
    /// Whether the game is paused. Scene updates are skipped while paused,
    /// but edge-consuming behaviors check this to discard stale input.
    pub paused: bool,
}

impl TickCtx {
    pub fn new(delta: Duration, elapsed: Duration, paused: bool) -> Self {
        Self {
            delta,
            elapsed,
            paused,
        }
    }
}

/// Context available while materializing behavior factories.
pub struct StartCtx<'a> {
    /// Keyboard hub, for behaviors that need a scoped [`crate::keys::Keys`]
    /// tracker.
    pub keyboard: &'a Keyboard,
}

/// A per-sprite, per-tick update rule.
pub trait Behavior {
    fn update(&mut self, ctx: &TickCtx, sprite: &mut SpriteState);
}

/// Deferred behavior construction: bound to one `(start ctx, sprite)` pair
/// when the sprite starts.
pub type BehaviorFactory = Box<dyn FnOnce(&StartCtx<'_>, &SpriteState) -> Box<dyn Behavior>>;

/// A behavior that does nothing. Misconfigured factories degrade to this
/// rather than panicking inside the frame loop.
pub struct Inert;

impl Behavior for Inert {
    fn update(&mut self, _ctx: &TickCtx, _sprite: &mut SpriteState) {}
}
