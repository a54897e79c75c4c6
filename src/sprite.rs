//! Sprite: kinematic state container and behavior host.
//!
//! A [`Sprite`] owns its kinematic state ([`SpriteState`]), an ordered
//! behavior chain, and an optional drawable. Behavior factories supplied at
//! construction are materialized by [`Sprite::start`], driven by the game
//! loop before the sprite's first tick. Each tick, [`Sprite::update`]
//! records `last_pos` and then runs the chain in declaration order.
//!
//! Drawing is delegated: camera-level code performs all translation and
//! rotation before [`Sprite::draw`] is invoked; the drawable renders in
//! local coordinates.

use smallvec::SmallVec;

use crate::behaviors::{Behavior, BehaviorFactory, StartCtx, TickCtx};
use crate::surface::DrawSurface;
use crate::time::Duration;
use crate::vector::{Acceleration, Position, Velocity};

/// Collision-extent placeholder. Real shape-vs-shape intersection is out of
/// scope; only the bounding extents are used (boundary checks, debug
/// overlay).
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Body {
    /// No extent; the sprite is treated as a point.
    Point,
    /// Axis-aligned box, by half extents.
    Box { half_w: f32, half_h: f32 },
    Circle { radius: f32 },
}

impl Body {
    /// Shared default for sprites without a body. Safe to share only
    /// because `Body` is stateless; a future stateful body type must not be
    /// defaulted this way.
    pub const POINT: Body = Body::Point;

    /// Bounding half extents `(half_w, half_h)`.
    pub fn half_extents(&self) -> (f32, f32) {
        match *self {
            Body::Point => (0.0, 0.0),
            Body::Box { half_w, half_h } => (half_w, half_h),
            Body::Circle { radius } => (radius, radius),
        }
    }
}

impl Default for Body {
    fn default() -> Self {
        Body::POINT
    }
}

/// An opaque token carried by generic sprite events.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Token(String);

impl Token {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// A token stamped with the game time at which it was emitted.
#[derive(Clone, Debug, PartialEq)]
pub struct TimedToken {
    pub token: Token,
    pub at: Duration,
}

/// The kinematic state behaviors read and overwrite.
#[derive(Debug)]
pub struct SpriteState {
    pub pos: Position,
    /// Position recorded at the top of the current tick, before any
    /// behavior ran.
    pub last_pos: Position,
    pub vel: Velocity,
    pub accel: Acceleration,
    /// Facing in radians; zero faces `(1, 0)`, positive turns toward `+y`.
    pub rotation: f32,
    pub body: Body,
    outbox: SmallVec<[TimedToken; 2]>,
}

impl Default for SpriteState {
    fn default() -> Self {
        Self {
            pos: Position::zero(),
            last_pos: Position::zero(),
            vel: Velocity::zero(),
            accel: Acceleration::zero(),
            rotation: 0.0,
            body: Body::POINT,
            outbox: SmallVec::new(),
        }
    }
}

impl SpriteState {
    /// Queue a timed token for the sprite's event handler. Drained at the
    /// end of the sprite's update; discarded if no handler is attached.
    pub fn emit(&mut self, token: Token, at: Duration) {
        self.outbox.push(TimedToken { token, at });
    }

    /// Number of tokens queued and not yet delivered.
    pub fn pending_events(&self) -> usize {
        self.outbox.len()
    }

    fn take_events(&mut self) -> SmallVec<[TimedToken; 2]> {
        std::mem::take(&mut self.outbox)
    }
}

/// Local-coordinate draw delegate.
pub trait Drawable {
    fn draw(&self, surface: &mut dyn DrawSurface);
}

impl<F: Fn(&mut dyn DrawSurface)> Drawable for F {
    fn draw(&self, surface: &mut dyn DrawSurface) {
        self(surface)
    }
}

type EventHandler = Box<dyn FnMut(&mut SpriteState, TimedToken)>;

/// An entity with position, rotation, and kinematic rates, updated and
/// drawn every tick.
pub struct Sprite {
    pub state: SpriteState,
    factories: Vec<BehaviorFactory>,
    behaviors: Vec<Box<dyn Behavior>>,
    started: bool,
    drawable: Option<Box<dyn Drawable>>,
    auto_rotate: bool,
    on_event: Option<EventHandler>,
}

impl Default for Sprite {
    fn default() -> Self {
        Self::new()
    }
}

impl Sprite {
    pub fn new() -> Self {
        Self {
            state: SpriteState::default(),
            factories: Vec::new(),
            behaviors: Vec::new(),
            started: false,
            drawable: None,
            auto_rotate: true,
            on_event: None,
        }
    }

    /// Construct at a position.
    pub fn at(pos: Position) -> Self {
        let mut sprite = Self::new();
        sprite.state.pos = pos;
        sprite.state.last_pos = pos;
        sprite
    }

    pub fn with_velocity(mut self, vel: Velocity) -> Self {
        self.state.vel = vel;
        self
    }

    pub fn with_rotation(mut self, radians: f32) -> Self {
        self.state.rotation = radians;
        self
    }

    pub fn with_body(mut self, body: Body) -> Self {
        self.state.body = body;
        self
    }

    /// Append a behavior factory. Declaration order is the update order.
    pub fn with_behavior(mut self, factory: BehaviorFactory) -> Self {
        self.factories.push(factory);
        self
    }

    pub fn with_drawable(mut self, drawable: impl Drawable + 'static) -> Self {
        self.drawable = Some(Box::new(drawable));
        self
    }

    /// Opt out of the camera pass rotating the surface by this sprite's
    /// rotation before drawing.
    pub fn without_auto_rotate(mut self) -> Self {
        self.auto_rotate = false;
        self
    }

    /// Attach a handler for timed tokens emitted by behaviors (see
    /// [`SpriteState::emit`]).
    pub fn with_event_handler(
        mut self,
        handler: impl FnMut(&mut SpriteState, TimedToken) + 'static,
    ) -> Self {
        self.on_event = Some(Box::new(handler));
        self
    }

    pub fn auto_rotate(&self) -> bool {
        self.auto_rotate
    }

    pub fn is_started(&self) -> bool {
        self.started
    }

    /// Materialize behavior factories, in declaration order. Idempotent;
    /// the game loop calls this for every pending sprite before its first
    /// tick.
    pub fn start(&mut self, ctx: &StartCtx<'_>) {
        if self.started {
            return;
        }
        for factory in self.factories.drain(..) {
            let behavior = factory(ctx, &self.state);
            self.behaviors.push(behavior);
        }
        self.started = true;
    }

    /// One tick: record `last_pos`, run the behavior chain in order, then
    /// deliver any queued tokens to the event handler.
    pub fn update(&mut self, ctx: &TickCtx) {
        self.state.last_pos = self.state.pos;
        for behavior in &mut self.behaviors {
            behavior.update(ctx, &mut self.state);
        }
        let events = self.state.take_events();
        if let Some(handler) = self.on_event.as_mut() {
            for event in events {
                handler(&mut self.state, event);
            }
        }
    }

    /// Invoke the drawable, if any. The surface is already translated and
    /// rotated into this sprite's local frame.
    pub fn draw(&self, surface: &mut dyn DrawSurface) {
        if let Some(drawable) = &self.drawable {
            drawable.draw(surface);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::behaviors::motion::momentum;
    use crate::keys::Keyboard;

    const EPSILON: f32 = 1e-5;

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

    #[test]
    fn test_body_half_extents() {
        assert_eq!(Body::POINT.half_extents(), (0.0, 0.0));
        assert_eq!(
            Body::Box {
                half_w: 4.0,
                half_h: 3.0
            }
            .half_extents(),
            (4.0, 3.0)
        );
        assert_eq!(Body::Circle { radius: 2.0 }.half_extents(), (2.0, 2.0));
    }

    #[test]
    fn test_start_is_explicit_and_idempotent() {
        let keyboard = Keyboard::new();
        let ctx = StartCtx {
            keyboard: &keyboard,
        };
        let mut sprite = Sprite::new().with_behavior(momentum());
        assert!(!sprite.is_started());
        sprite.start(&ctx);
        assert!(sprite.is_started());
        sprite.start(&ctx); // second start must not duplicate the chain
        assert_eq!(sprite.behaviors.len(), 1);
    }

    #[test]
    fn test_update_records_last_pos_before_behaviors() {
        let keyboard = Keyboard::new();
        let ctx = StartCtx {
            keyboard: &keyboard,
        };
        let mut sprite = Sprite::at(Position::new(1.0, 2.0))
            .with_velocity(Velocity::new(10.0, 0.0))
            .with_behavior(momentum());
        sprite.start(&ctx);
        sprite.update(&tick(1000.0));
        assert!(approx_eq(sprite.state.last_pos.x, 1.0));
        assert!(approx_eq(sprite.state.pos.x, 11.0));
    }

    #[test]
    fn test_behaviors_run_in_declaration_order() {
        struct Push(f32);
        impl Behavior for Push {
            fn update(&mut self, _ctx: &TickCtx, sprite: &mut SpriteState) {
                // Overwrites, so the last declared behavior wins.
                sprite.rotation = self.0;
            }
        }
        let keyboard = Keyboard::new();
        let ctx = StartCtx {
            keyboard: &keyboard,
        };
        let mut sprite = Sprite::new()
            .with_behavior(Box::new(|_: &StartCtx<'_>, _: &SpriteState| {
                Box::new(Push(1.0)) as Box<dyn Behavior>
            }))
            .with_behavior(Box::new(|_: &StartCtx<'_>, _: &SpriteState| {
                Box::new(Push(2.0)) as Box<dyn Behavior>
            }));
        sprite.start(&ctx);
        sprite.update(&tick(16.0));
        assert!(approx_eq(sprite.state.rotation, 2.0));
    }

    #[test]
    fn test_event_tokens_reach_handler() {
        struct Emitter;
        impl Behavior for Emitter {
            fn update(&mut self, ctx: &TickCtx, sprite: &mut SpriteState) {
                sprite.emit(Token::new("boom"), ctx.elapsed);
            }
        }
        let keyboard = Keyboard::new();
        let ctx = StartCtx {
            keyboard: &keyboard,
        };
        let seen = std::rc::Rc::new(std::cell::RefCell::new(Vec::new()));
        let sink = std::rc::Rc::clone(&seen);
        let mut sprite = Sprite::new()
            .with_behavior(Box::new(|_: &StartCtx<'_>, _: &SpriteState| {
                Box::new(Emitter) as Box<dyn Behavior>
            }))
            .with_event_handler(move |_state, event| {
                sink.borrow_mut().push(event.token.as_str().to_string());
            });
        sprite.start(&ctx);
        sprite.update(&tick(16.0));
        assert_eq!(*seen.borrow(), vec!["boom".to_string()]);
    }

    #[test]
    fn test_tokens_without_handler_are_discarded() {
        struct Emitter;
        impl Behavior for Emitter {
            fn update(&mut self, ctx: &TickCtx, sprite: &mut SpriteState) {
                sprite.emit(Token::new("lost"), ctx.elapsed);
            }
        }
        let keyboard = Keyboard::new();
        let ctx = StartCtx {
            keyboard: &keyboard,
        };
        let mut sprite = Sprite::new().with_behavior(Box::new(
            |_: &StartCtx<'_>, _: &SpriteState| Box::new(Emitter) as Box<dyn Behavior>,
        ));
        sprite.start(&ctx);
        sprite.update(&tick(16.0));
        assert!(sprite.state.outbox.is_empty());
    }
}
