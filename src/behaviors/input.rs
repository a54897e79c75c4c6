//! Keyboard-driven behaviors: directional thrust and key-to-handler
//! bridges.
//!
//! `thrust_keys` mirrors an acceleration-style input controller: held
//! directional labels become local-frame unit accelerations, summed,
//! rotated into the sprite's facing, and *assigned* to the sprite's
//! acceleration for the tick (overwriting, never accumulating across
//! ticks). Pair it with a ramp or integrator declared after it.

use log::warn;
use smallvec::SmallVec;

use super::{Behavior, BehaviorFactory, Inert, TickCtx};
use crate::keys::{KeyEdge, Keys};
use crate::sprite::{SpriteState, Token};
use crate::vector::Acceleration;

const FORWARD: &str = "forward";
const BACK: &str = "back";
const LEFT: &str = "left";
const RIGHT: &str = "right";

/// Key bindings for the four local-frame directions.
#[derive(Clone, Debug)]
pub struct ThrustBindings {
    pub forward: Vec<String>,
    pub back: Vec<String>,
    pub left: Vec<String>,
    pub right: Vec<String>,
}

impl Default for ThrustBindings {
    /// WASD plus arrows.
    fn default() -> Self {
        Self {
            forward: vec!["w".into(), "ArrowUp".into()],
            back: vec!["s".into(), "ArrowDown".into()],
            left: vec!["a".into(), "ArrowLeft".into()],
            right: vec!["d".into(), "ArrowRight".into()],
        }
    }
}

pub struct ThrustKeys {
    keys: Keys,
}

impl Behavior for ThrustKeys {
    fn update(&mut self, _ctx: &TickCtx, sprite: &mut SpriteState) {
        // Local frame: forward is +x, right is +y (toward positive
        // rotation). Sum the held directions, then rotate into the
        // sprite's facing.
        let mut local = Acceleration::zero();
        for label in self.keys.pulse() {
            local = local
                + match label.as_str() {
                    FORWARD => Acceleration::new(1.0, 0.0),
                    BACK => Acceleration::new(-1.0, 0.0),
                    LEFT => Acceleration::new(0.0, -1.0),
                    RIGHT => Acceleration::new(0.0, 1.0),
                    _ => Acceleration::zero(),
                };
        }
        sprite.accel = local.rotated(sprite.rotation);
    }
}

pub fn thrust_keys(bindings: ThrustBindings) -> BehaviorFactory {
    Box::new(move |ctx, _| {
        let mut keys = ctx.keyboard.tracker();
        keys.actions(FORWARD, &bindings.forward);
        keys.actions(BACK, &bindings.back);
        keys.actions(LEFT, &bindings.left);
        keys.actions(RIGHT, &bindings.right);
        Box::new(ThrustKeys { keys })
    })
}

type HeldHandler = Box<dyn FnMut(&TickCtx, &mut SpriteState)>;

/// One label binding for [`handle_keys`].
pub struct KeyHandler {
    label: String,
    keys: Vec<String>,
    handler: HeldHandler,
}

impl KeyHandler {
    pub fn new<I, S>(
        label: impl Into<String>,
        keys: I,
        handler: impl FnMut(&TickCtx, &mut SpriteState) + 'static,
    ) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            label: label.into(),
            keys: keys.into_iter().map(|k| k.as_ref().to_string()).collect(),
            handler: Box::new(handler),
        }
    }
}

struct HandleKeys {
    keys: Keys,
    handlers: Vec<(String, HeldHandler)>,
}

impl Behavior for HandleKeys {
    fn update(&mut self, ctx: &TickCtx, sprite: &mut SpriteState) {
        let active = self.keys.pulse();
        for (label, handler) in &mut self.handlers {
            if active.iter().any(|a| a == label) {
                handler(ctx, sprite);
            }
        }
    }
}

/// Run a handler every tick its label has a held key.
pub fn handle_keys(bindings: Vec<KeyHandler>) -> BehaviorFactory {
    Box::new(move |ctx, _| {
        let mut keys = ctx.keyboard.tracker();
        let mut handlers = Vec::with_capacity(bindings.len());
        for binding in bindings {
            keys.actions(binding.label.clone(), &binding.keys);
            handlers.push((binding.label, binding.handler));
        }
        Box::new(HandleKeys { keys, handlers })
    })
}

type EdgeHandler = Box<dyn FnMut(&TickCtx, &mut SpriteState, &KeyEdge)>;

/// Configuration for [`on_key`]: discrete down/up transitions routed to
/// handlers, or to a timed token on the sprite's event handler.
pub struct OnKeyConfig {
    keys: Vec<String>,
    on_down: Option<EdgeHandler>,
    on_up: Option<EdgeHandler>,
    token: Option<Token>,
}

impl OnKeyConfig {
    pub fn new<I, S>(keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            keys: keys.into_iter().map(|k| k.as_ref().to_string()).collect(),
            on_down: None,
            on_up: None,
            token: None,
        }
    }

    pub fn on_down(
        mut self,
        handler: impl FnMut(&TickCtx, &mut SpriteState, &KeyEdge) + 'static,
    ) -> Self {
        self.on_down = Some(Box::new(handler));
        self
    }

    pub fn on_up(
        mut self,
        handler: impl FnMut(&TickCtx, &mut SpriteState, &KeyEdge) + 'static,
    ) -> Self {
        self.on_up = Some(Box::new(handler));
        self
    }

    /// Emit this token (stamped with game time) on key-down transitions
    /// that have no `on_down` handler.
    pub fn token(mut self, token: Token) -> Self {
        self.token = Some(token);
        self
    }
}

struct OnKey {
    keys: Keys,
    on_down: Option<EdgeHandler>,
    on_up: Option<EdgeHandler>,
    token: Option<Token>,
}

impl Behavior for OnKey {
    fn update(&mut self, ctx: &TickCtx, sprite: &mut SpriteState) {
        let edges: SmallVec<[KeyEdge; 4]> = self.keys.take_edges();
        if ctx.paused {
            return; // transitions while paused are discarded
        }
        for edge in &edges {
            if edge.pressed {
                if let Some(handler) = self.on_down.as_mut() {
                    handler(ctx, sprite, edge);
                } else if let Some(token) = &self.token {
                    sprite.emit(token.clone(), ctx.elapsed);
                }
            } else if let Some(handler) = self.on_up.as_mut() {
                handler(ctx, sprite, edge);
            }
        }
    }
}

/// Bridge discrete key transitions to handlers or a generic timed-token
/// dispatch. A config with no handler and no token degrades to an inert
/// behavior rather than failing inside the frame loop.
pub fn on_key(config: OnKeyConfig) -> BehaviorFactory {
    Box::new(move |ctx, _| {
        if config.on_down.is_none() && config.on_up.is_none() && config.token.is_none() {
            warn!("on_key bound to {:?} with no handler or token; behavior is inert", config.keys);
            return Box::new(Inert);
        }
        let mut keys = ctx.keyboard.tracker();
        keys.watch(&config.keys);
        Box::new(OnKey {
            keys,
            on_down: config.on_down,
            on_up: config.on_up,
            token: config.token,
        })
    })
}
