//! Portal-sector software renderer.
//!
//! * [`world`]: level geometry, textures and the camera.
//! * [`renderer`]: the [`Renderer`](renderer::Renderer) trait and its
//!   software back-end (portal traversal, occlusion, rasterizer).
//! * [`level`]: RON level files and built-in samples.
//! * [`sim`]: fixed-rate input handling for the viewers.

pub mod config;
pub mod level;
pub mod renderer;
pub mod sim;
pub mod world;
