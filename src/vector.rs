//! Typed 2D kinematic vectors.
//!
//! [`Vec2`] is an immutable `(x, y)` pair parameterized by the kind of
//! quantity it is: a [`Position`] is advanced by a [`Velocity`], a
//! [`Velocity`] by an [`Acceleration`]. The tier discipline lives entirely
//! in the type system (the [`Derivable`] trait); at runtime all kinds share
//! the same representation and there are no checks.
//!
//! # Angle convention
//!
//! Angles are radians. Zero faces `(1, 0)` ("right"); positive rotation
//! turns toward `+y`, which reads as clockwise on a y-down canvas. Every
//! steering behavior and the render rotation use this convention.
//!
//! All operations are pure and return new values. `NaN`/`Infinity` inputs
//! propagate untrapped; keeping them out is the caller's responsibility.

use std::f32::consts::TAU;
use std::marker::PhantomData;
use std::ops::{Add, Sub};

/// Marker trait for vector quantity kinds.
pub trait Quantity: Copy + std::fmt::Debug + PartialEq + 'static {}

/// Kinds that can be advanced by a same-tier rate quantity.
pub trait Derivable: Quantity {
    type Rate: Quantity;
}

/// Position tier marker.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Pos;
/// Velocity tier marker.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Vel;
/// Acceleration tier marker (top tier; nothing advances it).
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Accel;

impl Quantity for Pos {}
impl Quantity for Vel {}
impl Quantity for Accel {}

impl Derivable for Pos {
    type Rate = Vel;
}
impl Derivable for Vel {
    type Rate = Accel;
}

pub type Position = Vec2<Pos>;
pub type Velocity = Vec2<Vel>;
pub type Acceleration = Vec2<Accel>;

/// An immutable 2D vector of quantity kind `Q`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Vec2<Q: Quantity> {
    pub x: f32,
    pub y: f32,
    _kind: PhantomData<Q>,
}

/// A vector in polar form: direction in radians plus magnitude.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DirMag {
    pub dir: f32,
    pub mag: f32,
}

impl<Q: Quantity> Default for Vec2<Q> {
    fn default() -> Self {
        Self::zero()
    }
}

impl<Q: Quantity> Vec2<Q> {
    pub fn new(x: f32, y: f32) -> Self {
        Self {
            x,
            y,
            _kind: PhantomData,
        }
    }

    pub fn zero() -> Self {
        Self::new(0.0, 0.0)
    }

    /// Euclidean length.
    pub fn magnitude(&self) -> f32 {
        (self.x * self.x + self.y * self.y).sqrt()
    }

    /// Direction in radians, `atan2(y, x)`. The zero vector reports `0.0`
    /// (the underlying `atan2(0, 0)` convention), not an error.
    pub fn direction(&self) -> f32 {
        self.y.atan2(self.x)
    }

    /// Rotate about the origin by `radians` using the standard rotation
    /// matrix. Positive angles turn toward `+y`.
    pub fn rotated(&self, radians: f32) -> Self {
        let (sin, cos) = radians.sin_cos();
        Self::new(self.x * cos - self.y * sin, self.x * sin + self.y * cos)
    }

    /// Component-wise scale by a factor.
    pub fn scaled(&self, factor: f32) -> Self {
        Self::new(self.x * factor, self.y * factor)
    }

    /// Convert to polar form.
    pub fn to_dir_mag(&self) -> DirMag {
        DirMag {
            dir: self.direction(),
            mag: self.magnitude(),
        }
    }

    /// Rebuild from polar form. Round-trips with [`Vec2::to_dir_mag`]
    /// within float tolerance for non-origin vectors.
    pub fn from_dir_mag(dm: DirMag) -> Self {
        Self::new(dm.dir.cos() * dm.mag, dm.dir.sin() * dm.mag)
    }

    /// Replace the magnitude, keeping the direction. Zero vectors stay zero
    /// (there is no direction to keep).
    pub fn with_magnitude(&self, mag: f32) -> Self {
        let current = self.magnitude();
        if current > 0.0 {
            self.scaled(mag / current)
        } else {
            *self
        }
    }

    /// Distance to another vector of the same kind. Symmetric, non-negative.
    pub fn distance_to(&self, other: Self) -> f32 {
        (other - *self).magnitude()
    }

    /// Project onto the direction `dir`: rotate by `-dir` and take the
    /// resulting x component. Used for directional impact/speed readings.
    pub fn magnitude_in_direction(&self, dir: f32) -> f32 {
        self.rotated(-dir).x
    }
}

/// `combine`: component-wise sum of two vectors of the same kind.
impl<Q: Quantity> Add for Vec2<Q> {
    type Output = Vec2<Q>;

    fn add(self, rhs: Self) -> Self {
        Self::new(self.x + rhs.x, self.y + rhs.y)
    }
}

/// `diff`: component-wise difference of two vectors of the same kind.
impl<Q: Quantity> Sub for Vec2<Q> {
    type Output = Vec2<Q>;

    fn sub(self, rhs: Self) -> Self {
        Self::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl<Q: Derivable> Vec2<Q> {
    /// Advance by a rate over a duration: `self + rate * duration.seconds()`
    /// component-wise. Only same-tier rates are accepted, so a `Position`
    /// cannot be advanced by an `Acceleration`.
    pub fn advance(&self, rate: Vec2<Q::Rate>, delta: crate::time::Duration) -> Self {
        let dt = delta.seconds();
        Self::new(self.x + rate.x * dt, self.y + rate.y * dt)
    }
}

/// Wrap an angle into `[0, 2π)`.
pub fn wrap_angle(radians: f32) -> f32 {
    let wrapped = radians.rem_euclid(TAU);
    // rem_euclid of a tiny negative can land exactly on TAU.
    if wrapped >= TAU { 0.0 } else { wrapped }
}

/// Signed shortest angular distance from `from` to `to`, in `(-π, π]`.
pub fn shortest_arc(from: f32, to: f32) -> f32 {
    let diff = (to - from).rem_euclid(TAU);
    if diff > std::f32::consts::PI {
        diff - TAU
    } else {
        diff
    }
}
