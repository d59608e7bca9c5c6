/*
 * Application Module
 *
 * This module defines the viewer model and the nannou update loop. The flock
 * itself is stepped a whole number of ticks per frame; there is no physics
 * timestep to interpolate because a tick is the unit of time.
 */

use nannou::prelude::*;
use nannou_egui::Egui;
use tracing::{info, warn};

use crate::model::Flock;
use crate::viewer::renderer;
use crate::viewer::ui::{self, Controls};

// Main model for the viewer
pub struct ViewerModel {
    pub flock: Flock,
    pub controls: Controls,
    pub egui: Egui,
    pub last_error: Option<String>,
}

// Start the viewer; blocks until the window is closed
pub fn run() {
    nannou::app(model).update(update).run();
}

// Initialize the model
fn model(app: &App) -> ViewerModel {
    let window_id = app
        .new_window()
        .title("Boid Flocking Simulation")
        .size(900, 900)
        .view(renderer::view)
        .raw_event(raw_window_event)
        .build()
        .expect("failed to open viewer window");

    let window = app.window(window_id).expect("viewer window vanished after creation");
    let egui = Egui::from_window(&window);

    let controls = Controls::default();
    let flock = Flock::new(controls.params()).expect("default viewer parameters are valid");
    info!(seed = flock.seed(), "viewer started");

    ViewerModel {
        flock,
        controls,
        egui,
        last_error: None,
    }
}

// Update the model
fn update(_app: &App, model: &mut ViewerModel, _update: Update) {
    let stats = model.flock.stats();
    let actions = ui::update_ui(
        &mut model.egui,
        &mut model.controls,
        &stats,
        model.flock.params(),
        model.last_error.as_deref(),
    );

    if actions.reset {
        reset_flock(model);
    }

    if !model.controls.paused {
        for _ in 0..model.controls.ticks_per_frame {
            if !model.flock.step() {
                break;
            }
        }
    } else if actions.step_once {
        model.flock.step();
    }
}

// Rebuild the flock from the panel's parameters, keeping the old one on error
fn reset_flock(model: &mut ViewerModel) {
    match Flock::new(model.controls.params()) {
        Ok(flock) => {
            info!(seed = flock.seed(), population = flock.params().population, "flock reset");
            model.flock = flock;
            model.last_error = None;
        }
        Err(err) => {
            warn!(%err, "rejected viewer parameters");
            model.last_error = Some(err.to_string());
        }
    }
}

// Handle raw window events for egui
fn raw_window_event(_app: &App, model: &mut ViewerModel, event: &nannou::winit::event::WindowEvent) {
    model.egui.handle_raw_event(event);
}
