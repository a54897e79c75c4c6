//! Scene tree: the ordered collection of sprites updated and rendered each
//! tick.
//!
//! Nodes are explicitly tagged — a node is either a sprite or a group of
//! child nodes — so traversal never probes values for capabilities at
//! runtime. The scene is a tree, not a DAG: a node has exactly one parent,
//! and ownership makes sharing or cycles unrepresentable.
//!
//! Update order is parent-before-children, following declaration order at
//! every level.

use crate::behaviors::{StartCtx, TickCtx};
use crate::sprite::Sprite;

/// One scene entry: a drawable/updatable sprite, or a nested sub-scene.
pub enum SceneNode {
    Sprite(Sprite),
    Group(Scene),
}

/// An ordered list of scene nodes.
#[derive(Default)]
pub struct Scene {
    nodes: Vec<SceneNode>,
}

impl Scene {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_sprite(&mut self, sprite: Sprite) -> &mut Self {
        self.nodes.push(SceneNode::Sprite(sprite));
        self
    }

    pub fn add_group(&mut self, group: Scene) -> &mut Self {
        self.nodes.push(SceneNode::Group(group));
        self
    }

    pub fn nodes(&self) -> &[SceneNode] {
        &self.nodes
    }

    pub fn nodes_mut(&mut self) -> &mut [SceneNode] {
        &mut self.nodes
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Total sprite count across the whole tree.
    pub fn sprite_count(&self) -> usize {
        self.nodes
            .iter()
            .map(|node| match node {
                SceneNode::Sprite(_) => 1,
                SceneNode::Group(scene) => scene.sprite_count(),
            })
            .sum()
    }

    /// Materialize behaviors for every sprite not yet started. The loop
    /// runs this before updating, so sprites added mid-game start on the
    /// tick after insertion.
    pub fn start_pending(&mut self, ctx: &StartCtx<'_>) {
        for node in &mut self.nodes {
            match node {
                SceneNode::Sprite(sprite) => sprite.start(ctx),
                SceneNode::Group(scene) => scene.start_pending(ctx),
            }
        }
    }

    /// Recursive tick: each sprite updates before the traversal descends
    /// into the groups that follow it.
    pub fn update(&mut self, ctx: &TickCtx) {
        for node in &mut self.nodes {
            match node {
                SceneNode::Sprite(sprite) => sprite.update(ctx),
                SceneNode::Group(scene) => scene.update(ctx),
            }
        }
    }
}
