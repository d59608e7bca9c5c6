/*
 * Viewer Module
 *
 * Interactive window for watching a flock: nannou draws the agents each
 * frame and an egui panel edits the parameters the next flock is built
 * from. Only compiled with the `viewer` feature.
 */

pub mod app;
pub mod renderer;
pub mod ui;

pub use app::{run, ViewerModel};

// Marker sizes in screen pixels
pub const BOID_RADIUS: f32 = 5.0;
pub const TRACE_RADIUS: f32 = 1.0;
