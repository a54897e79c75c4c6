//! Camera: the render-side view transform.
//!
//! The camera owns a position, rotation, and zoom used only while drawing;
//! it never reads or mutates scene entities. The transform order is the
//! usual one for a centered 2D view: origin moves to the canvas center,
//! then zoom, then the negated camera rotation, then the negated camera
//! translation, so a sprite at the camera position lands on the canvas
//! center.

use crate::scene::{Scene, SceneNode};
use crate::surface::DrawSurface;
use crate::vector::Position;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Camera {
    pub pos: Position,
    /// View rotation in radians; applied negated so the world appears to
    /// counter-rotate.
    pub rotation: f32,
    pub zoom: f32,
}

impl Default for Camera {
    fn default() -> Self {
        Self {
            pos: Position::zero(),
            rotation: 0.0,
            zoom: 1.0,
        }
    }
}

impl Camera {
    /// Establish the camera's base transform on a freshly reset surface.
    pub fn apply(&self, surface: &mut dyn DrawSurface) {
        let (w, h) = surface.size();
        surface.translate(w * 0.5, h * 0.5);
        surface.scale(self.zoom, self.zoom);
        surface.rotate(-self.rotation);
        surface.translate(-self.pos.x, -self.pos.y);
    }

    /// Render a scene tree through this camera.
    ///
    /// Per sprite: save, translate to the sprite's position, rotate by its
    /// rotation unless it opted out, draw, optionally stroke the body's
    /// bounding box, restore. Sub-scenes reset to identity and reapply the
    /// camera first: their coordinates are camera-relative, not
    /// parent-entity-relative.
    pub fn render(&self, scene: &Scene, surface: &mut dyn DrawSurface, debug_bounds: bool) {
        surface.reset_transform();
        self.apply(surface);
        self.render_nodes(scene, surface, debug_bounds);
    }

    fn render_nodes(&self, scene: &Scene, surface: &mut dyn DrawSurface, debug_bounds: bool) {
        for node in scene.nodes() {
            match node {
                SceneNode::Sprite(sprite) => {
                    surface.save();
                    surface.translate(sprite.state.pos.x, sprite.state.pos.y);
                    if sprite.auto_rotate() {
                        surface.rotate(sprite.state.rotation);
                    }
                    sprite.draw(surface);
                    if debug_bounds {
                        let (half_w, half_h) = sprite.state.body.half_extents();
                        surface.begin_path();
                        surface.rect(-half_w, -half_h, half_w * 2.0, half_h * 2.0);
                        surface.stroke();
                    }
                    surface.restore();
                }
                SceneNode::Group(sub) => {
                    surface.reset_transform();
                    self.apply(surface);
                    self.render_nodes(sub, surface, debug_bounds);
                }
            }
        }
    }
}
