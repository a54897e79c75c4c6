//! Abstract 2D drawing surface.
//!
//! The engine never touches a real canvas; it renders against the
//! [`DrawSurface`] capability, which carries exactly the transform-stack
//! primitives the camera pass needs. The host supplies an implementation
//! backed by its canvas context.
//!
//! [`RecordingSurface`] is the headless implementation used by tests and
//! the demo binary: it records the op stream, which can be serialized for
//! frame traces.

use serde::Serialize;

/// Transform-stack drawing capability consumed by the render pass.
pub trait DrawSurface {
    /// Surface size in pixels, `(width, height)`.
    fn size(&self) -> (f32, f32);

    /// Reset the current transform to identity.
    fn reset_transform(&mut self);
    fn translate(&mut self, x: f32, y: f32);
    fn rotate(&mut self, radians: f32);
    fn scale(&mut self, sx: f32, sy: f32);
    /// Push the current transform (canvas `save`).
    fn save(&mut self);
    /// Pop the transform stack (canvas `restore`).
    fn restore(&mut self);

    fn begin_path(&mut self);
    /// Add a rectangle to the current path, in local coordinates.
    fn rect(&mut self, x: f32, y: f32, w: f32, h: f32);
    fn stroke(&mut self);
}

/// One recorded surface operation.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub enum DrawOp {
    ResetTransform,
    Translate { x: f32, y: f32 },
    Rotate { radians: f32 },
    Scale { sx: f32, sy: f32 },
    Save,
    Restore,
    BeginPath,
    Rect { x: f32, y: f32, w: f32, h: f32 },
    Stroke,
}

/// Headless surface that records every op it receives.
#[derive(Debug)]
pub struct RecordingSurface {
    width: f32,
    height: f32,
    ops: Vec<DrawOp>,
}

impl RecordingSurface {
    pub fn new(width: f32, height: f32) -> Self {
        Self {
            width,
            height,
            ops: Vec::new(),
        }
    }

    /// Ops recorded since construction or the last [`RecordingSurface::take_ops`].
    pub fn ops(&self) -> &[DrawOp] {
        &self.ops
    }

    /// Drain the recorded ops, e.g. one frame's worth.
    pub fn take_ops(&mut self) -> Vec<DrawOp> {
        std::mem::take(&mut self.ops)
    }
}

impl DrawSurface for RecordingSurface {
    fn size(&self) -> (f32, f32) {
        (self.width, self.height)
    }

    fn reset_transform(&mut self) {
        self.ops.push(DrawOp::ResetTransform);
    }

    fn translate(&mut self, x: f32, y: f32) {
        self.ops.push(DrawOp::Translate { x, y });
    }

    fn rotate(&mut self, radians: f32) {
        self.ops.push(DrawOp::Rotate { radians });
    }

    fn scale(&mut self, sx: f32, sy: f32) {
        self.ops.push(DrawOp::Scale { sx, sy });
    }

    fn save(&mut self) {
        self.ops.push(DrawOp::Save);
    }

    fn restore(&mut self) {
        self.ops.push(DrawOp::Restore);
    }

    fn begin_path(&mut self) {
        self.ops.push(DrawOp::BeginPath);
    }

    fn rect(&mut self, x: f32, y: f32, w: f32, h: f32) {
        self.ops.push(DrawOp::Rect { x, y, w, h });
    }

    fn stroke(&mut self) {
        self.ops.push(DrawOp::Stroke);
    }
}
