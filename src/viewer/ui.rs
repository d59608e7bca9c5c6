/*
 * UI Module
 *
 * This module contains the control panel built with nannou_egui. Flock
 * parameters are only read when a flock is constructed, so the panel edits
 * a draft and the "Reset Flock" button rebuilds the flock from it.
 */

use nannou_egui::{egui, Egui};

use crate::model::FlockStats;
use crate::params::FlockParams;

pub struct Controls {
    // Parameters the next flock will be built from
    pub draft: FlockParams,
    pub fixed_seed: bool,
    pub seed: u64,
    pub paused: bool,
    pub ticks_per_frame: usize,
    pub show_labels: bool,
}

impl Default for Controls {
    fn default() -> Self {
        Self {
            draft: FlockParams {
                population: 20,
                toroidal: true,
                speed: 2.0,
                minimum_separation: 0.5,
                trace_agents: true,
                ..FlockParams::default()
            },
            fixed_seed: false,
            seed: 0,
            paused: false,
            ticks_per_frame: 1,
            show_labels: true,
        }
    }
}

impl Controls {
    // Draft parameters with the seed choice applied
    pub fn params(&self) -> FlockParams {
        FlockParams {
            seed: self.fixed_seed.then_some(self.seed),
            ..self.draft.clone()
        }
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct UiActions {
    pub reset: bool,
    pub step_once: bool,
}

pub fn update_ui(
    egui: &mut Egui,
    controls: &mut Controls,
    stats: &FlockStats,
    active: &FlockParams,
    last_error: Option<&str>,
) -> UiActions {
    let mut actions = UiActions::default();
    let ctx = egui.begin_frame();

    egui::Window::new("Flock Controls")
        .default_pos([10.0, 10.0])
        .show(&ctx, |ui| {
            ui.collapsing("Population & Space", |ui| {
                let draft = &mut controls.draft;
                ui.add(egui::Slider::new(&mut draft.population, FlockParams::population_range()).text("Population size"));
                ui.add(egui::Slider::new(&mut draft.width, FlockParams::extent_range()).text("Width"));
                ui.add(egui::Slider::new(&mut draft.height, FlockParams::extent_range()).text("Height"));
                ui.checkbox(&mut draft.toroidal, "Toroidal?");
                ui.checkbox(&mut draft.trace_agents, "Trace agents?");
                ui.add(egui::Slider::new(&mut draft.initial_age, FlockParams::initial_age_range()).text("Trace length"));
            });

            ui.collapsing("Steering", |ui| {
                let draft = &mut controls.draft;
                ui.add(egui::Slider::new(&mut draft.speed, FlockParams::speed_range()).text("Speed"));
                ui.add(egui::Slider::new(&mut draft.vision, FlockParams::vision_range()).text("Vision"));
                ui.add(
                    egui::Slider::new(&mut draft.minimum_separation, FlockParams::minimum_separation_range())
                        .text("Minimum separation"),
                );
                ui.add(
                    egui::Slider::new(&mut draft.max_separate_angle, FlockParams::max_angle_range())
                        .text("Max separation angle"),
                );
                ui.add(
                    egui::Slider::new(&mut draft.max_cohere_angle, FlockParams::max_angle_range())
                        .text("Max coherence angle"),
                );
                ui.add(egui::Slider::new(&mut draft.max_align_angle, FlockParams::max_angle_range()).text("Max align angle"));
            });

            ui.horizontal(|ui| {
                ui.checkbox(&mut controls.fixed_seed, "Fixed seed");
                ui.add(egui::DragValue::new(&mut controls.seed));
            });

            if ui.button("Reset Flock").clicked() {
                actions.reset = true;
            }
            if controls.params() != *active && !actions.reset {
                ui.label("Parameters changed: reset to apply");
            }
            if let Some(message) = last_error {
                ui.colored_label(egui::Color32::RED, message);
            }

            ui.separator();
            ui.checkbox(&mut controls.paused, "Pause Simulation");
            if controls.paused && ui.button("Step").clicked() {
                actions.step_once = true;
            }
            ui.add(egui::Slider::new(&mut controls.ticks_per_frame, 1..=20).text("Ticks per frame"));
            ui.checkbox(&mut controls.show_labels, "Show boid ids");

            ui.separator();
            ui.label(format!("Tick: {}", stats.tick));
            ui.label(format!("Boids: {}  Traces: {}", stats.boids, stats.traces));
            ui.label(format!("Polarization: {:.3}", stats.polarization));
            if let Some(distance) = stats.mean_nearest_distance {
                ui.label(format!("Mean nearest neighbour: {:.2}", distance));
            }
        });

    actions
}
