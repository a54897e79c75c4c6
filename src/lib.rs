//! Lienzo engine library.
//!
//! A small 2D sprite engine: typed kinematic vectors, a pollable keyboard
//! tracker, composable per-sprite behaviors, a scene tree, and a camera
//! driving the frame loop. Drawing goes through the [`surface::DrawSurface`]
//! trait, so the engine runs headless in tests and hosts plug in a real
//! canvas.

pub mod behaviors;
pub mod camera;
pub mod config;
pub mod game;
pub mod keys;
pub mod scene;
pub mod sprite;
pub mod surface;
pub mod time;
pub mod vector;
