//! Boundary detection behavior.
//!
//! [`Bounded`] checks the sprite against a rectangle each tick. The rect is
//! shrunk by the sprite's own bounding extents first, so the check treats
//! the sprite as a point at its body's edge. The callback only fires when
//! the signed exceedance is non-zero on at least one axis.

use super::{Behavior, BehaviorFactory, TickCtx};
use crate::sprite::SpriteState;

/// Axis-aligned rectangle, canvas-style: origin plus size.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub w: f32,
    pub h: f32,
}

impl Rect {
    pub fn new(x: f32, y: f32, w: f32, h: f32) -> Self {
        Self { x, y, w, h }
    }

    /// Rect centered on the origin, e.g. for camera-centered worlds.
    pub fn centered(w: f32, h: f32) -> Self {
        Self::new(-w * 0.5, -h * 0.5, w, h)
    }

    pub fn min_x(&self) -> f32 {
        self.x
    }

    pub fn min_y(&self) -> f32 {
        self.y
    }

    pub fn max_x(&self) -> f32 {
        self.x + self.w
    }

    pub fn max_y(&self) -> f32 {
        self.y + self.h
    }

    /// Inset each side by `(dx, dy)`.
    pub fn shrunk(&self, dx: f32, dy: f32) -> Self {
        Self::new(self.x + dx, self.y + dy, self.w - 2.0 * dx, self.h - 2.0 * dy)
    }

    /// Signed overshoot of a point past this rect, per axis: `0.0` while
    /// within bounds, negative past the left/top edge, positive past the
    /// right/bottom edge.
    pub fn exceedance(&self, x: f32, y: f32) -> (f32, f32) {
        let ex = if x < self.min_x() {
            x - self.min_x()
        } else if x > self.max_x() {
            x - self.max_x()
        } else {
            0.0
        };
        let ey = if y < self.min_y() {
            y - self.min_y()
        } else if y > self.max_y() {
            y - self.max_y()
        } else {
            0.0
        };
        (ex, ey)
    }
}

/// Bounds may be fixed or recomputed each tick from game/sprite state.
pub enum RectSource {
    Fixed(Rect),
    Dynamic(Box<dyn Fn(&TickCtx, &SpriteState) -> Rect>),
}

impl RectSource {
    fn resolve(&self, ctx: &TickCtx, sprite: &SpriteState) -> Rect {
        match self {
            RectSource::Fixed(rect) => *rect,
            RectSource::Dynamic(f) => f(ctx, sprite),
        }
    }
}

impl From<Rect> for RectSource {
    fn from(rect: Rect) -> Self {
        RectSource::Fixed(rect)
    }
}

type ExceedanceCallback = Box<dyn FnMut(&TickCtx, &mut SpriteState, (f32, f32))>;

pub struct Bounded {
    rect: RectSource,
    callback: ExceedanceCallback,
}

impl Behavior for Bounded {
    fn update(&mut self, ctx: &TickCtx, sprite: &mut SpriteState) {
        let rect = self.rect.resolve(ctx, sprite);
        let (half_w, half_h) = sprite.body.half_extents();
        let inner = rect.shrunk(half_w, half_h);
        let exceedance = inner.exceedance(sprite.pos.x, sprite.pos.y);
        if exceedance != (0.0, 0.0) {
            (self.callback)(ctx, sprite, exceedance);
        }
    }
}

pub fn bounded(
    rect: impl Into<RectSource>,
    callback: impl FnMut(&TickCtx, &mut SpriteState, (f32, f32)) + 'static,
) -> BehaviorFactory {
    let rect = rect.into();
    Box::new(move |_, _| {
        Box::new(Bounded {
            rect,
            callback: Box::new(callback),
        })
    })
}
